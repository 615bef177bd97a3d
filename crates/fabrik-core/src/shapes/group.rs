//! Transient group used for multi-selection.
//!
//! A group never owns its members: they stay in the canvas arena and the group
//! keeps their ids. While grouped, a member's `left`/`top` are relative to the
//! group center and its own controls are hidden.

use super::{Controls, GroupId, Shape, ShapeId, StateSnapshot, Transformable};
use crate::coords::{OCoords, compute_coords};
use crate::geometry::{bounds_from_points, object_matrix, rotate_point};
use crate::render::{Drawable, Painter, draw_controls};
use crate::transform::{ObjectTransform, OriginX, OriginY};
use kurbo::{Affine, Point, Rect};
use std::collections::HashMap;
use uuid::Uuid;

/// A group of shapes that can be manipulated as a single unit.
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) id: GroupId,
    members: Vec<ShapeId>,
    pub transform: ObjectTransform,
    pub controls: Controls,
    active: bool,
    is_moving: bool,
    o_coords: OCoords,
    original_state: StateSnapshot,
}

impl Group {
    /// Group the given shapes. Unknown and duplicate ids are skipped.
    pub fn new(ids: &[ShapeId], shapes: &mut HashMap<ShapeId, Shape>, controls: Controls) -> Self {
        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            if members.contains(id) {
                continue;
            }
            if !shapes.contains_key(id) {
                log::warn!("Ignoring unknown shape {} while grouping", id);
                continue;
            }
            members.push(*id);
        }

        let mut group = Self {
            id: Uuid::new_v4(),
            members,
            transform: ObjectTransform {
                origin_x: OriginX::Center,
                origin_y: OriginY::Center,
                ..Default::default()
            },
            controls,
            active: false,
            is_moving: false,
            o_coords: OCoords::default(),
            original_state: StateSnapshot::default(),
        };
        group.recalculate(shapes);
        group.setup_state();
        log::debug!("Created group {} with {} members", group.id, group.members.len());
        group
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Member ids in z-order of insertion.
    pub fn members(&self) -> &[ShapeId] {
        &self.members
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.members.contains(&id)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Object-to-world matrix including mirroring.
    pub fn matrix(&self) -> Affine {
        let t = &self.transform;
        let sx = if t.flip_x { -t.scale_x } else { t.scale_x };
        let sy = if t.flip_y { -t.scale_y } else { t.scale_y };
        object_matrix(t.center_point(), t.angle_radians(), sx, sy)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(&self.transform, &self.controls, None, true)
    }

    pub fn setup_state(&mut self) {
        self.save_state();
    }

    pub fn save_state(&mut self) {
        self.original_state = self.snapshot();
    }

    pub fn has_state_changed(&self) -> bool {
        self.snapshot() != self.original_state
    }

    /// Add a shape, rebuilding bounds from scratch. Returns false if the shape
    /// is unknown or already a member.
    pub fn add_with_update(&mut self, id: ShapeId, shapes: &mut HashMap<ShapeId, Shape>) -> bool {
        if self.contains(id) || !shapes.contains_key(&id) {
            return false;
        }
        self.restore_objects_state(shapes);
        self.members.push(id);
        self.reset_transform();
        self.recalculate(shapes);
        true
    }

    /// Remove a shape, rebuilding bounds from scratch. The removed shape is
    /// returned to absolute coordinates and deactivated.
    pub fn remove_with_update(&mut self, id: ShapeId, shapes: &mut HashMap<ShapeId, Shape>) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.restore_objects_state(shapes);
        self.members.retain(|m| *m != id);
        self.reset_transform();
        self.recalculate(shapes);
        true
    }

    /// Dissolve the group, returning every member to absolute coordinates.
    pub fn destroy(self, shapes: &mut HashMap<ShapeId, Shape>) -> Vec<ShapeId> {
        self.restore_objects_state(shapes);
        log::debug!("Dissolved group {}", self.id);
        self.members
    }

    /// Refresh member control points in group-relative space.
    pub fn set_objects_coords(&self, shapes: &mut HashMap<ShapeId, Shape>) {
        for id in &self.members {
            if let Some(shape) = shapes.get_mut(id) {
                shape.set_coords();
            }
        }
    }

    /// Draw members through the group matrix.
    pub fn render_members(&self, painter: &mut dyn Painter, shapes: &HashMap<ShapeId, Shape>, parent: Affine) {
        let matrix = parent * self.matrix();
        for id in &self.members {
            if let Some(shape) = shapes.get(id) {
                shape.render(painter, matrix);
            }
        }
    }

    fn reset_transform(&mut self) {
        self.transform.scale_x = 1.0;
        self.transform.scale_y = 1.0;
        self.transform.flip_x = false;
        self.transform.flip_y = false;
        self.transform.set_angle(0.0);
    }

    fn recalculate(&mut self, shapes: &mut HashMap<ShapeId, Shape>) {
        self.calc_bounds(shapes);
        self.update_objects_coords(shapes);
        self.set_coords();
    }

    /// Fit the group around the members' absolute selection quads.
    fn calc_bounds(&mut self, shapes: &mut HashMap<ShapeId, Shape>) {
        let mut points = Vec::with_capacity(self.members.len() * 4);
        for id in &self.members {
            if let Some(shape) = shapes.get_mut(id) {
                shape.set_coords();
                points.extend(shape.o_coords.quad());
            }
        }
        let bounds = bounds_from_points(&points);
        let center = bounds.center();
        self.transform.width = bounds.width();
        self.transform.height = bounds.height();
        self.transform.left = center.x;
        self.transform.top = center.y;
    }

    /// Make members relative to the group center and hide their controls.
    fn update_objects_coords(&self, shapes: &mut HashMap<ShapeId, Shape>) {
        let (group_left, group_top) = (self.transform.left, self.transform.top);
        for id in &self.members {
            if let Some(shape) = shapes.get_mut(id) {
                if shape.orig_has_controls.is_none() {
                    shape.orig_has_controls = Some(shape.controls.has_controls);
                }
                shape.controls.has_controls = false;
                shape.transform.left -= group_left;
                shape.transform.top -= group_top;
                shape.group = Some(self.id);
                shape.active = true;
                shape.set_coords();
            }
        }
    }

    fn restore_objects_state(&self, shapes: &mut HashMap<ShapeId, Shape>) {
        for id in &self.members {
            if let Some(shape) = shapes.get_mut(id) {
                self.restore_object_state(shape);
            }
        }
    }

    /// Bake the group's mirroring, scale and rotation into a member and return
    /// it to absolute coordinates.
    fn restore_object_state(&self, shape: &mut Shape) {
        let g = &self.transform;
        let t = &mut shape.transform;

        let mut rel = t.center_point().to_vec2();
        let mut angle = t.angle;
        if g.flip_x {
            rel.x = -rel.x;
            t.flip_x = !t.flip_x;
            angle = -angle;
        }
        if g.flip_y {
            rel.y = -rel.y;
            t.flip_y = !t.flip_y;
            angle = -angle;
        }
        rel.x *= g.scale_x;
        rel.y *= g.scale_y;
        let center = rotate_point(rel.to_point(), Point::ZERO, g.angle_radians()) + g.center_point().to_vec2();

        t.scale_x *= g.scale_x;
        t.scale_y *= g.scale_y;
        t.set_angle(angle + g.angle);
        t.set_center_point(center);

        if let Some(has_controls) = shape.orig_has_controls.take() {
            shape.controls.has_controls = has_controls;
        }
        shape.group = None;
        shape.active = false;
        shape.set_coords();
    }
}

impl Transformable for Group {
    fn transform(&self) -> &ObjectTransform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut ObjectTransform {
        &mut self.transform
    }

    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn stroke_width(&self) -> f64 {
        0.0
    }

    fn o_coords(&self) -> &OCoords {
        &self.o_coords
    }

    fn set_coords(&mut self) {
        self.o_coords = compute_coords(&self.transform, &self.controls, 0.0);
    }

    fn set_moving(&mut self, moving: bool) {
        self.is_moving = moving;
    }
}

impl Drawable for Group {
    fn local_bounds(&self) -> Rect {
        let w = self.transform.width;
        let h = self.transform.height;
        Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
    }

    /// Draws the group's own border and handles. Members are drawn with
    /// [`Group::render_members`].
    fn render(&self, painter: &mut dyn Painter, parent: Affine) {
        if self.active && self.controls.has_controls {
            draw_controls(painter, &self.o_coords, &self.controls, self.transform.angle, self.is_moving, parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn arena(shapes: Vec<Shape>) -> (HashMap<ShapeId, Shape>, Vec<ShapeId>) {
        let ids = shapes.iter().map(|s| s.id()).collect();
        (shapes.into_iter().map(|s| (s.id(), s)).collect(), ids)
    }

    fn thin(x: f64, y: f64, w: f64, h: f64) -> Shape {
        let mut s = Shape::rectangle(x, y, w, h).unwrap();
        s.style.stroke_width = 0.0;
        s.set_coords();
        s
    }

    #[test]
    fn test_group_bounds_and_relative_members() {
        let (mut shapes, ids) = arena(vec![thin(50.0, 50.0, 20.0, 20.0), thin(150.0, 90.0, 20.0, 20.0)]);
        let group = Group::new(&ids, &mut shapes, Controls::default());

        assert_eq!(group.size(), 2);
        assert!((group.transform.width - 120.0).abs() < EPS);
        assert!((group.transform.height - 60.0).abs() < EPS);
        assert!((group.transform.left - 100.0).abs() < EPS);
        assert!((group.transform.top - 70.0).abs() < EPS);

        let a = &shapes[&ids[0]];
        assert!((a.transform.left + 50.0).abs() < EPS);
        assert!((a.transform.top + 20.0).abs() < EPS);
        assert!(!a.controls.has_controls);
        assert_eq!(a.group(), Some(group.id()));
    }

    #[test]
    fn test_duplicate_and_unknown_ids_skipped() {
        let (mut shapes, ids) = arena(vec![thin(0.0, 0.0, 10.0, 10.0), thin(30.0, 0.0, 10.0, 10.0)]);
        let group = Group::new(&[ids[0], ids[0], Uuid::new_v4(), ids[1]], &mut shapes, Controls::default());
        assert_eq!(group.members(), &ids[..]);
    }

    #[test]
    fn test_destroy_restores_absolute_coords() {
        let (mut shapes, ids) = arena(vec![thin(50.0, 50.0, 20.0, 20.0), thin(150.0, 90.0, 20.0, 20.0)]);
        let mut group = Group::new(&ids, &mut shapes, Controls::default());
        group.transform.left += 10.0;
        group.destroy(&mut shapes);

        let a = &shapes[&ids[0]];
        assert!((a.transform.left - 60.0).abs() < EPS);
        assert!((a.transform.top - 50.0).abs() < EPS);
        assert!(a.controls.has_controls);
        assert_eq!(a.group(), None);
    }

    #[test]
    fn test_destroy_bakes_rotation_and_scale() {
        let (mut shapes, ids) = arena(vec![thin(0.0, 0.0, 20.0, 20.0), thin(100.0, 0.0, 20.0, 20.0)]);
        let mut group = Group::new(&ids, &mut shapes, Controls::default());
        // Group center is (50, 0); members sit at -50 and +50.
        group.transform.set_angle(90.0);
        group.transform.scale_x = 2.0;
        group.transform.scale_y = 2.0;
        group.destroy(&mut shapes);

        let b = &shapes[&ids[1]];
        assert!((b.transform.left - 50.0).abs() < EPS);
        assert!((b.transform.top - 100.0).abs() < EPS);
        assert!((b.transform.angle - 90.0).abs() < EPS);
        assert!((b.transform.scale_x - 2.0).abs() < EPS);
    }

    #[test]
    fn test_destroy_bakes_mirroring() {
        let (mut shapes, ids) = arena(vec![thin(0.0, 0.0, 20.0, 20.0), thin(100.0, 0.0, 20.0, 20.0)]);
        for id in &ids {
            shapes.get_mut(id).unwrap().transform.set_angle(30.0);
        }
        let mut group = Group::new(&ids, &mut shapes, Controls::default());
        group.transform.flip_x = true;
        group.destroy(&mut shapes);

        let b = &shapes[&ids[1]];
        assert!(b.transform.flip_x);
        assert!((b.transform.angle - 330.0).abs() < EPS);
        // Mirrored across the group center at x = 50
        assert!(b.transform.left.abs() < 1e-6);
    }

    #[test]
    fn test_add_and_remove_with_update() {
        let (mut shapes, ids) = arena(vec![
            thin(0.0, 0.0, 20.0, 20.0),
            thin(100.0, 0.0, 20.0, 20.0),
            thin(200.0, 0.0, 20.0, 20.0),
        ]);
        let mut group = Group::new(&ids[..2], &mut shapes, Controls::default());
        group.transform.flip_y = true;

        assert!(group.add_with_update(ids[2], &mut shapes));
        assert!(!group.add_with_update(ids[2], &mut shapes));
        assert_eq!(group.size(), 3);
        assert!(!group.transform.flip_y);

        assert!(group.remove_with_update(ids[0], &mut shapes));
        assert_eq!(group.members(), &ids[1..]);
        let removed = &shapes[&ids[0]];
        assert_eq!(removed.group(), None);
        assert!(!removed.is_active());
        assert!((group.transform.width - 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_group_state_tracking() {
        let (mut shapes, ids) = arena(vec![thin(0.0, 0.0, 10.0, 10.0), thin(30.0, 0.0, 10.0, 10.0)]);
        let mut group = Group::new(&ids, &mut shapes, Controls::default());
        assert!(!group.has_state_changed());
        group.transform.top += 3.0;
        assert!(group.has_state_changed());
    }
}
