//! Gesture session: turns pointer motion into drag, scale and rotate updates.

use crate::coords::CornerId;
use crate::events::Target;
use crate::geometry::radians_to_degrees;
use crate::input::Modifiers;
use crate::shapes::Transformable;
use crate::transform::{OriginX, OriginY};
use kurbo::{Point, Vec2};

/// What a gesture does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformAction {
    Drag,
    Scale,
    ScaleX,
    ScaleY,
    Rotate,
}

impl TransformAction {
    /// Action and fixed origin for a press on `corner` (or the body).
    pub fn for_corner(corner: Option<CornerId>) -> (Self, OriginX, OriginY) {
        match corner {
            None => (TransformAction::Drag, OriginX::Center, OriginY::Center),
            Some(CornerId::Ml) => (TransformAction::ScaleX, OriginX::Right, OriginY::Center),
            Some(CornerId::Mr) => (TransformAction::ScaleX, OriginX::Left, OriginY::Center),
            Some(CornerId::Mt) => (TransformAction::ScaleY, OriginX::Center, OriginY::Bottom),
            Some(CornerId::Mb) => (TransformAction::ScaleY, OriginX::Center, OriginY::Top),
            Some(CornerId::Tl) => (TransformAction::Scale, OriginX::Right, OriginY::Bottom),
            Some(CornerId::Tr) => (TransformAction::Scale, OriginX::Left, OriginY::Bottom),
            Some(CornerId::Bl) => (TransformAction::Scale, OriginX::Right, OriginY::Top),
            Some(CornerId::Br) => (TransformAction::Scale, OriginX::Left, OriginY::Top),
            Some(CornerId::Mtr) => (TransformAction::Rotate, OriginX::Center, OriginY::Center),
        }
    }

    pub fn is_scale(self) -> bool {
        matches!(self, TransformAction::Scale | TransformAction::ScaleX | TransformAction::ScaleY)
    }
}

/// How a corner-handle resize treats the two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleMode {
    /// Both axes by the same factor (shift held).
    Equally,
    /// Each axis follows the pointer independently.
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScaleBy {
    Equally,
    Free,
    X,
    Y,
}

/// Target state frozen at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalTransform {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
}

/// An in-progress drag, scale or rotate.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentTransform {
    pub target: Target,
    pub action: TransformAction,
    /// Handle that started the gesture; `None` for a body drag.
    pub corner: Option<CornerId>,
    /// Origin kept fixed while scaling. Flips when the pointer crosses it.
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    /// World position of the fixed origin as of the last update.
    pub anchor: Point,
    pub pointer_down: Point,
    /// Pointer position minus the target's `(left, top)` at press time.
    pub offset: Vec2,
    /// Center of rotation.
    pub pivot: Point,
    /// Target angle at press time, in radians.
    pub theta: f64,
    pub original: OriginalTransform,
    pub mouse_x_sign: f64,
    pub mouse_y_sign: f64,
    pub scale_mode: Option<ScaleMode>,
    /// Resizing about the center (alt held).
    pub centered: bool,
}

impl CurrentTransform {
    /// Start a session on `object` for a press at `pointer`.
    pub fn new(target: Target, object: &dyn Transformable, corner: Option<CornerId>, pointer: Point) -> Self {
        let (action, origin_x, origin_y) = TransformAction::for_corner(corner);
        let t = object.transform();
        let center = t.center_point();
        Self {
            target,
            action,
            corner,
            origin_x,
            origin_y,
            anchor: t.translate_to_origin_point(center, origin_x, origin_y),
            pointer_down: pointer,
            offset: Vec2::new(pointer.x - t.left, pointer.y - t.top),
            pivot: center,
            theta: t.angle_radians(),
            original: OriginalTransform {
                left: t.left,
                top: t.top,
                scale_x: t.scale_x,
                scale_y: t.scale_y,
                flip_x: t.flip_x,
                flip_y: t.flip_y,
                origin_x,
                origin_y,
            },
            mouse_x_sign: 1.0,
            mouse_y_sign: 1.0,
            scale_mode: None,
            centered: false,
        }
    }

    /// Apply one pointer move and refresh the target's control points.
    pub fn apply(&mut self, object: &mut dyn Transformable, pointer: Point, modifiers: Modifiers) {
        object.set_moving(true);
        match self.action {
            TransformAction::Drag => self.translate(object, pointer),
            TransformAction::Rotate => self.rotate(object, pointer),
            TransformAction::Scale | TransformAction::ScaleX | TransformAction::ScaleY => {
                if modifiers.alt != self.centered {
                    self.reset(object, modifiers.alt);
                }
                let by = match self.action {
                    TransformAction::ScaleX => ScaleBy::X,
                    TransformAction::ScaleY => ScaleBy::Y,
                    _ => {
                        let mode = if modifiers.shift { ScaleMode::Equally } else { ScaleMode::Free };
                        if self.scale_mode.is_some_and(|m| m != mode) {
                            self.reset(object, self.centered);
                        }
                        self.scale_mode = Some(mode);
                        match mode {
                            ScaleMode::Equally => ScaleBy::Equally,
                            ScaleMode::Free => ScaleBy::Free,
                        }
                    }
                };
                self.scale(object, pointer, by);
            }
        }
        object.set_coords();
    }

    /// Restore the target to its press-time state. With `centered`, later
    /// scaling pivots on the center; otherwise on the press-time origin.
    pub fn reset(&mut self, object: &mut dyn Transformable, centered: bool) {
        let o = self.original;
        let t = object.transform_mut();
        t.left = o.left;
        t.top = o.top;
        t.scale_x = o.scale_x;
        t.scale_y = o.scale_y;
        t.flip_x = o.flip_x;
        t.flip_y = o.flip_y;

        if centered {
            self.mouse_x_sign = if o.origin_x == OriginX::Right { -1.0 } else { 1.0 };
            self.mouse_y_sign = if o.origin_y == OriginY::Bottom { -1.0 } else { 1.0 };
            self.origin_x = OriginX::Center;
            self.origin_y = OriginY::Center;
        } else {
            self.mouse_x_sign = 1.0;
            self.mouse_y_sign = 1.0;
            self.origin_x = o.origin_x;
            self.origin_y = o.origin_y;
        }
        self.centered = centered;
        log::trace!("Reset gesture on {:?} (centered: {})", self.target, centered);
    }

    fn translate(&self, object: &mut dyn Transformable, pointer: Point) {
        let t = object.transform_mut();
        t.left = pointer.x - self.offset.x;
        t.top = pointer.y - self.offset.y;
    }

    fn rotate(&self, object: &mut dyn Transformable, pointer: Point) {
        let start = self.pointer_down - self.pivot;
        let current = pointer - self.pivot;
        let delta = current.y.atan2(current.x) - start.y.atan2(start.x);
        let t = object.transform_mut();
        t.set_angle(radians_to_degrees(delta + self.theta));
        t.set_center_point(self.pivot);
    }

    fn scale(&mut self, object: &mut dyn Transformable, pointer: Point, by: ScaleBy) {
        let padding = object.controls().padding;
        let stroke_width = object.stroke_width();
        let t = *object.transform();

        let anchor = t.translate_to_origin_point(t.center_point(), self.origin_x, self.origin_y);
        self.anchor = anchor;
        let mut local = t.to_local_point(pointer, self.origin_x, self.origin_y);

        match self.origin_x {
            OriginX::Right => local.x = -local.x,
            OriginX::Center => {
                local.x *= self.mouse_x_sign * 2.0;
                if local.x < 0.0 {
                    self.mouse_x_sign = -self.mouse_x_sign;
                }
            }
            OriginX::Left => {}
        }
        match self.origin_y {
            OriginY::Bottom => local.y = -local.y,
            OriginY::Center => {
                local.y *= self.mouse_y_sign * 2.0;
                if local.y < 0.0 {
                    self.mouse_y_sign = -self.mouse_y_sign;
                }
            }
            OriginY::Top => {}
        }

        let free_x = t.width + padding;
        let free_y = t.height + padding;
        let (new_x, new_y) = match by {
            ScaleBy::Equally => {
                let extent_x = t.width * self.original.scale_x;
                let extent_y = t.height * self.original.scale_y;
                if extent_x == 0.0 || extent_y == 0.0 {
                    log::warn!("Skipping uniform scale of {:?}: degenerate size", self.target);
                    return;
                }
                let mut baseline = extent_x + extent_y + padding * 2.0 - stroke_width * 2.0 + 1.0;
                if baseline <= f64::EPSILON {
                    // Stroke wider than the shape itself
                    baseline = extent_x + extent_y;
                }
                let dist = local.x + local.y;
                (
                    Some(self.original.scale_x * dist / baseline),
                    Some(self.original.scale_y * dist / baseline),
                )
            }
            ScaleBy::Free => {
                if free_x.abs() < f64::EPSILON || free_y.abs() < f64::EPSILON {
                    log::warn!("Skipping scale of {:?}: degenerate size", self.target);
                    return;
                }
                (Some(local.x / free_x), Some(local.y / free_y))
            }
            ScaleBy::X => {
                if free_x.abs() < f64::EPSILON {
                    log::warn!("Skipping horizontal scale of {:?}: zero width", self.target);
                    return;
                }
                (Some(local.x / free_x), None)
            }
            ScaleBy::Y => {
                if free_y.abs() < f64::EPSILON {
                    log::warn!("Skipping vertical scale of {:?}: zero height", self.target);
                    return;
                }
                (None, Some(local.y / free_y))
            }
        };

        let t = object.transform_mut();
        if let Some(sx) = new_x {
            t.set_scale_x(sx);
            if sx < 0.0 {
                self.origin_x = self.origin_x.flipped();
            }
        }
        if let Some(sy) = new_y {
            t.set_scale_y(sy);
            if sy < 0.0 {
                self.origin_y = self.origin_y.flipped();
            }
        }
        t.set_position_by_origin(anchor, self.origin_x, self.origin_y);
        log::trace!("Scaled {:?} to ({:.3}, {:.3})", self.target, t.scale_x, t.scale_y);
    }
}
