//! Canvas: the shape arena, selection state and pointer gesture loop.

use crate::config::CanvasConfig;
use crate::events::{CanvasEvent, EventBus, Target};
use crate::gesture::{CurrentTransform, TransformAction};
use crate::hit::{HitResult, hit_test};
use crate::input::{CursorIcon, MouseButton, PointerEvent};
use crate::render::{Drawable, Painter};
use crate::selection::{ActiveSelection, GroupSelector, RenderItem, objects_in_marquee, render_order};
use crate::shapes::{CanvasId, Group, GroupId, Shape, ShapeId, Transformable};
use kurbo::{Affine, Point, Rect};
use std::collections::HashMap;
use uuid::Uuid;

/// What the pointer is currently doing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Dragging out a marquee.
    Selecting(GroupSelector),
    /// Moving, scaling or rotating the selection.
    Transforming(CurrentTransform),
}

/// An interactive surface holding shapes.
///
/// Shapes live in an arena keyed by id; `z_order` lists them back to front.
/// All mutation happens through the `on_mouse_*` handlers or the explicit
/// selection and arena methods.
#[derive(Debug)]
pub struct Canvas {
    id: CanvasId,
    config: CanvasConfig,
    shapes: HashMap<ShapeId, Shape>,
    z_order: Vec<ShapeId>,
    active_object: Option<ShapeId>,
    active_group: Option<Group>,
    state: GestureState,
    cursor: CursorIcon,
    events: EventBus,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            shapes: HashMap::new(),
            z_order: Vec::new(),
            active_object: None,
            active_group: None,
            state: GestureState::Idle,
            cursor: CursorIcon::Default,
            events: EventBus::new(),
        }
    }

    pub fn id(&self) -> CanvasId {
        self.id
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Event bus for subscribing to canvas notifications.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Cursor the host should show.
    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// The live transform session, if any.
    pub fn current_transform(&self) -> Option<&CurrentTransform> {
        match &self.state {
            GestureState::Transforming(t) => Some(t),
            _ => None,
        }
    }

    /// The live marquee, if any.
    pub fn group_selector(&self) -> Option<&GroupSelector> {
        match &self.state {
            GestureState::Selecting(s) => Some(s),
            _ => None,
        }
    }

    // --- Arena ---

    /// Add a shape on top of the z-order.
    pub fn add(&mut self, mut shape: Shape) -> ShapeId {
        let id = shape.id();
        if self.shapes.contains_key(&id) {
            log::warn!("Shape {} is already on canvas {}", id, self.id);
            return id;
        }
        shape.canvas = Some(self.id);
        shape.setup_state();
        shape.set_coords();
        self.z_order.push(id);
        self.shapes.insert(id, shape);
        log::debug!("Added {} to canvas {}", id, self.id);
        self.events.emit(&CanvasEvent::ObjectAdded { target: id });
        id
    }

    /// Remove a shape, detaching it from the selection first.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        if !self.shapes.contains_key(&id) {
            log::warn!("Cannot remove unknown shape {}", id);
            return None;
        }

        let in_group = self.active_group.as_ref().is_some_and(|g| g.contains(id));
        if let GestureState::Transforming(t) = &self.state {
            if t.target == Target::Shape(id) || (in_group && matches!(t.target, Target::Group(_))) {
                log::debug!("Cancelling gesture on removed shape {}", id);
                self.state = GestureState::Idle;
            }
        }
        if in_group {
            if let Some(group) = self.active_group.as_mut() {
                group.remove_with_update(id, &mut self.shapes);
            }
            self.dissolve_if_single();
        }
        if self.active_object == Some(id) {
            self.active_object = None;
        }

        self.z_order.retain(|s| *s != id);
        let mut shape = self.shapes.remove(&id)?;
        shape.canvas = None;
        shape.set_active(false);
        log::debug!("Removed {} from canvas {}", id, self.id);
        self.events.emit(&CanvasEvent::ObjectRemoved { target: id });
        Some(shape)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Edit a shape in place and refresh its control points.
    ///
    /// Members of the active group are positioned relative to the group
    /// center while grouped.
    pub fn modify_shape(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape)) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                f(shape);
                shape.set_coords();
                true
            }
            None => {
                log::warn!("Cannot modify unknown shape {}", id);
                false
            }
        }
    }

    /// Shapes back to front.
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    pub fn z_order(&self) -> &[ShapeId] {
        &self.z_order
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Bring a shape to the front (topmost).
    pub fn bring_to_front(&mut self, id: ShapeId) {
        if self.z_order.contains(&id) {
            self.z_order.retain(|s| *s != id);
            self.z_order.push(id);
        }
    }

    /// Send a shape to the back (bottommost).
    pub fn send_to_back(&mut self, id: ShapeId) {
        if self.z_order.contains(&id) {
            self.z_order.retain(|s| *s != id);
            self.z_order.insert(0, id);
        }
    }

    /// Move a shape one layer forward. Returns false if already at front.
    pub fn bring_forward(&mut self, id: ShapeId) -> bool {
        match self.z_order.iter().position(|s| *s == id) {
            Some(pos) if pos + 1 < self.z_order.len() => {
                self.z_order.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Move a shape one layer backward. Returns false if already at back.
    pub fn send_backward(&mut self, id: ShapeId) -> bool {
        match self.z_order.iter().position(|s| *s == id) {
            Some(pos) if pos > 0 => {
                self.z_order.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    // --- Selection ---

    pub fn active_object(&self) -> Option<ShapeId> {
        self.active_object
    }

    pub fn active_group(&self) -> Option<&Group> {
        self.active_group.as_ref()
    }

    pub fn active_selection(&self) -> ActiveSelection<'_> {
        if let Some(group) = &self.active_group {
            ActiveSelection::Group {
                id: group.id(),
                members: group.members(),
            }
        } else if let Some(id) = self.active_object {
            ActiveSelection::Shape(id)
        } else {
            ActiveSelection::None
        }
    }

    /// Make `id` the single selected shape, dissolving any active group.
    pub fn set_active_object(&mut self, id: ShapeId) -> bool {
        if !self.shapes.contains_key(&id) {
            log::warn!("Cannot select unknown shape {}", id);
            return false;
        }
        if self.active_object == Some(id) && self.active_group.is_none() {
            return true;
        }
        self.discard_active_group();
        self.discard_active_object();
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.set_active(true);
        }
        self.active_object = Some(id);
        log::debug!("Selected {}", id);
        self.events.emit(&CanvasEvent::SelectionCreated {
            target: Target::Shape(id),
        });
        true
    }

    /// Select the given shapes: none clears, one becomes the active object,
    /// more form a new active group in the given order.
    pub fn select_shapes(&mut self, ids: &[ShapeId]) -> Option<Target> {
        let mut known: Vec<ShapeId> = Vec::with_capacity(ids.len());
        for id in ids {
            if self.shapes.contains_key(id) && !known.contains(id) {
                known.push(*id);
            }
        }
        match known.as_slice() {
            [] => {
                self.deactivate_all();
                None
            }
            [only] => {
                self.set_active_object(*only);
                Some(Target::Shape(*only))
            }
            _ => {
                self.discard_active_group();
                self.discard_active_object();
                let group = Group::new(&known, &mut self.shapes, self.config.group_controls);
                let id = group.id();
                self.set_active_group(group);
                Some(Target::Group(id))
            }
        }
    }

    /// Clear the selection, dissolving any active group.
    pub fn deactivate_all(&mut self) {
        let had_selection = self.active_object.is_some() || self.active_group.is_some();
        self.discard_active_group();
        self.discard_active_object();
        for shape in self.shapes.values_mut() {
            shape.set_active(false);
        }
        if had_selection {
            log::debug!("Selection cleared");
            self.events.emit(&CanvasEvent::SelectionCleared);
        }
    }

    /// Dissolve the active group, returning members to absolute coordinates.
    pub fn discard_active_group(&mut self) {
        if let Some(group) = self.active_group.take() {
            group.destroy(&mut self.shapes);
        }
    }

    pub fn discard_active_object(&mut self) {
        if let Some(id) = self.active_object.take() {
            if let Some(shape) = self.shapes.get_mut(&id) {
                shape.set_active(false);
            }
        }
    }

    fn set_active_group(&mut self, mut group: Group) {
        group.set_active(true);
        let id = group.id();
        log::debug!("Selected group {} of {} shapes", id, group.size());
        self.active_object = None;
        self.active_group = Some(group);
        self.events.emit(&CanvasEvent::SelectionCreated {
            target: Target::Group(id),
        });
    }

    /// Dissolve a group left with one member; that member becomes the active
    /// object.
    fn dissolve_if_single(&mut self) -> Option<ShapeId> {
        if !self.active_group.as_ref().is_some_and(|g| g.size() <= 1) {
            return None;
        }
        let remaining = self.active_group.take()?.destroy(&mut self.shapes);
        let last = remaining.first().copied();
        match last {
            Some(id) => {
                if let Some(shape) = self.shapes.get_mut(&id) {
                    shape.set_active(true);
                }
                self.active_object = Some(id);
                self.events.emit(&CanvasEvent::SelectionUpdated {
                    target: Target::Shape(id),
                });
            }
            None => self.events.emit(&CanvasEvent::SelectionCleared),
        }
        last
    }

    // --- Hit testing ---

    /// Pointer in the space `id`'s control points live in.
    fn normalize_pointer(&self, point: Point, id: ShapeId) -> Point {
        match &self.active_group {
            Some(group) if group.contains(id) => {
                Point::new(point.x - group.transform.left, point.y - group.transform.top)
            }
            _ => point,
        }
    }

    /// Hit-test one target. Handles count only when the target shows them.
    pub fn hit(&self, point: Point, target: Target) -> HitResult {
        match target {
            Target::Shape(id) => match self.shapes.get(&id) {
                Some(shape) => hit_test(
                    self.normalize_pointer(point, id),
                    shape.o_coords(),
                    shape.handles_enabled(),
                    shape.controls.has_rotating_point,
                ),
                None => HitResult::MISS,
            },
            Target::Group(id) => match &self.active_group {
                Some(group) if group.id() == id => hit_test(
                    point,
                    group.o_coords(),
                    group.is_active() && group.controls.has_controls,
                    group.controls.has_rotating_point,
                ),
                _ => HitResult::MISS,
            },
        }
    }

    pub fn contains_point(&self, point: Point, target: Target) -> bool {
        self.hit(point, target).inside
    }

    /// Topmost target under `point`. The active group wins unless skipped.
    pub fn find_target(&self, point: Point, skip_group: bool) -> Option<Target> {
        if !skip_group {
            if let Some(group) = &self.active_group {
                let target = Target::Group(group.id());
                if self.contains_point(point, target) {
                    return Some(target);
                }
            }
        }
        self.z_order
            .iter()
            .rev()
            .filter(|id| self.shapes.get(*id).is_some_and(|s| s.visible))
            .map(|id| Target::Shape(*id))
            .find(|target| self.contains_point(point, *target))
    }

    fn cursor_for(&self, point: Point, target: Option<Target>) -> CursorIcon {
        match target {
            None => CursorIcon::Default,
            Some(target) => match self.hit(point, target).handle {
                Some(corner) => corner.cursor(),
                None => CursorIcon::Move,
            },
        }
    }

    // --- Pointer handling ---

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { .. } => self.on_mouse_down(event),
            PointerEvent::Move { .. } => self.on_mouse_move(event),
            PointerEvent::Up { .. } => self.on_mouse_up(event),
        }
    }

    /// Select, start a marquee or start a transform.
    pub fn on_mouse_down(&mut self, event: PointerEvent) {
        if event.button() != Some(MouseButton::Left) {
            return;
        }
        if !matches!(self.state, GestureState::Idle) {
            log::debug!("Ignoring pointer-down during a gesture");
            return;
        }

        let pointer = event.position();
        let modifiers = event.modifiers();
        let mut target = self.find_target(pointer, false);

        if self.should_clear_selection(target, modifiers.shift) {
            self.deactivate_all();
            self.state = GestureState::Selecting(GroupSelector::new(pointer));
            log::debug!("Started marquee at ({:.1}, {:.1})", pointer.x, pointer.y);
        } else if let Some(found) = target {
            if self.should_handle_group_logic(found, modifiers.shift) {
                self.handle_group_logic(pointer, found);
                target = self.active_group.as_ref().map(|g| Target::Group(g.id()));
            } else if let Target::Shape(id) = found {
                self.set_active_object(id);
            }
            if let Some(target) = target {
                self.begin_transform(target, pointer);
            }
        }

        self.events.emit(&CanvasEvent::MouseDown { target, event });
    }

    /// Stretch the marquee, update the hover cursor or apply the transform.
    pub fn on_mouse_move(&mut self, event: PointerEvent) {
        let pointer = event.position();
        let target = if let GestureState::Selecting(selector) = &mut self.state {
            selector.update(pointer);
            None
        } else if matches!(self.state, GestureState::Transforming(_)) {
            self.apply_transform(event)
        } else if self.config.hover_enabled {
            let hovered = self.find_target(pointer, false);
            self.cursor = self.cursor_for(pointer, hovered);
            hovered
        } else {
            None
        };
        self.events.emit(&CanvasEvent::MouseMove { target, event });
    }

    /// Commit the transform or the marquee.
    pub fn on_mouse_up(&mut self, event: PointerEvent) {
        let pointer = event.position();
        let target = match std::mem::take(&mut self.state) {
            GestureState::Transforming(transform) => {
                self.finish_transform(&transform);
                Some(transform.target)
            }
            GestureState::Selecting(selector) => {
                self.find_selected_objects(selector.rect());
                None
            }
            GestureState::Idle => None,
        };

        if let Some(group) = self.active_group.as_mut() {
            group.set_objects_coords(&mut self.shapes);
            group.set_moving(false);
        }

        let hovered = self.find_target(pointer, false);
        self.cursor = self.cursor_for(pointer, hovered);
        self.events.emit(&CanvasEvent::MouseUp { target, event });
    }

    fn should_clear_selection(&self, target: Option<Target>, shift: bool) -> bool {
        let Some(target) = target else {
            return true;
        };
        match &self.active_group {
            Some(group) => {
                let in_group = match target {
                    Target::Shape(id) => group.contains(id),
                    Target::Group(id) => id == group.id(),
                };
                !in_group && !shift
            }
            None => false,
        }
    }

    fn should_handle_group_logic(&self, target: Target, shift: bool) -> bool {
        shift
            && (self.active_group.is_some()
                || self.active_object.is_some_and(|active| Target::Shape(active) != target))
    }

    /// Shift-click: toggle membership of the clicked shape in the selection.
    fn handle_group_logic(&mut self, pointer: Point, target: Target) {
        let id = match target {
            Target::Shape(id) => id,
            Target::Group(_) => match self.find_target(pointer, true) {
                Some(Target::Shape(id)) => id,
                _ => return,
            },
        };

        if let Some(group) = self.active_group.as_mut() {
            let updated = if group.contains(id) {
                group.remove_with_update(id, &mut self.shapes)
            } else {
                group.add_with_update(id, &mut self.shapes)
            };
            group.set_active(true);
            let group_id = group.id();
            if self.dissolve_if_single().is_none() && updated {
                log::debug!("Toggled {} in group {}", id, group_id);
                self.events.emit(&CanvasEvent::SelectionUpdated {
                    target: Target::Group(group_id),
                });
            }
        } else if let Some(active) = self.active_object {
            if active != id {
                let group = Group::new(&[active, id], &mut self.shapes, self.config.group_controls);
                self.set_active_group(group);
            }
        }
    }

    /// Replace the selection with the shapes caught by the marquee.
    fn find_selected_objects(&mut self, rect: Rect) {
        let caught = objects_in_marquee(&self.z_order, &self.shapes, rect);
        log::debug!("Marquee caught {} shapes", caught.len());
        if !caught.is_empty() {
            self.select_shapes(&caught);
        }
    }

    fn begin_transform(&mut self, target: Target, pointer: Point) {
        let corner = self.hit(pointer, target).handle;
        let transform = match target {
            Target::Shape(id) => match self.shapes.get_mut(&id) {
                Some(shape) => {
                    shape.save_state();
                    CurrentTransform::new(target, &*shape, corner, pointer)
                }
                None => return,
            },
            Target::Group(_) => match self.active_group.as_mut() {
                Some(group) => {
                    group.save_state();
                    CurrentTransform::new(target, &*group, corner, pointer)
                }
                None => return,
            },
        };
        log::debug!("Started {:?} on {:?}", transform.action, target);
        self.state = GestureState::Transforming(transform);
    }

    fn apply_transform(&mut self, event: PointerEvent) -> Option<Target> {
        let GestureState::Transforming(transform) = &mut self.state else {
            return None;
        };
        let object: &mut dyn Transformable = match transform.target {
            Target::Shape(id) => match self.shapes.get_mut(&id) {
                Some(shape) => shape,
                None => {
                    log::warn!("Gesture target {} disappeared", id);
                    return None;
                }
            },
            Target::Group(_) => match self.active_group.as_mut() {
                Some(group) => group,
                None => return None,
            },
        };
        transform.apply(object, event.position(), event.modifiers());

        let target = transform.target;
        let notification = match transform.action {
            TransformAction::Drag => {
                self.cursor = CursorIcon::Move;
                CanvasEvent::ObjectMoving { target, event }
            }
            TransformAction::Rotate => CanvasEvent::ObjectRotating { target, event },
            TransformAction::Scale | TransformAction::ScaleX | TransformAction::ScaleY => {
                CanvasEvent::ObjectScaling { target, event }
            }
        };
        self.events.emit(&notification);
        Some(target)
    }

    fn finish_transform(&mut self, transform: &CurrentTransform) {
        for shape in self.shapes.values_mut() {
            shape.set_coords();
        }
        if let Some(group) = self.active_group.as_mut() {
            group.set_coords();
        }

        let changed = match transform.target {
            Target::Shape(id) => self.shapes.get_mut(&id).map(|shape| {
                shape.set_moving(false);
                shape.has_state_changed()
            }),
            Target::Group(_) => self.active_group.as_mut().map(|group| {
                group.set_moving(false);
                group.has_state_changed()
            }),
        }
        .unwrap_or(false);

        log::debug!("Finished {:?} on {:?} (modified: {})", transform.action, transform.target, changed);
        if changed {
            self.events.emit(&CanvasEvent::ObjectModified {
                target: transform.target,
            });
        }
    }

    // --- Rendering ---

    /// Paint list for the current selection.
    pub fn objects_to_render(&self) -> Vec<RenderItem> {
        render_order(&self.z_order, self.active_selection())
    }

    /// Draw every shape, selection last.
    pub fn render_all(&self, painter: &mut dyn Painter) {
        self.events.emit(&CanvasEvent::BeforeRender);
        for item in self.objects_to_render() {
            match item {
                RenderItem::Shape(id) => {
                    if let Some(shape) = self.shapes.get(&id) {
                        shape.render(painter, Affine::IDENTITY);
                    }
                }
                RenderItem::Group(_) => {
                    if let Some(group) = &self.active_group {
                        group.render_members(painter, &self.shapes, Affine::IDENTITY);
                        group.render(painter, Affine::IDENTITY);
                    }
                }
            }
        }
        self.events.emit(&CanvasEvent::AfterRender);
    }

    /// Draw the overlay layer: the live marquee.
    pub fn render_top(&self, painter: &mut dyn Painter) {
        if let GestureState::Selecting(selector) = &self.state {
            painter.draw_marquee(
                selector.rect(),
                self.config.selection_color.into(),
                self.config.selection_border_color.into(),
                self.config.selection_line_width,
            );
        }
    }

    /// Group a member belongs to, if it is the active one.
    pub fn group_of(&self, id: ShapeId) -> Option<GroupId> {
        self.active_group.as_ref().filter(|g| g.contains(id)).map(|g| g.id())
    }
}
