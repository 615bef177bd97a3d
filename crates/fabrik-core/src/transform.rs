//! Pose of a transformable entity and the origin-point math built on it.

use crate::geometry::{degrees_to_radians, normalize_angle, rotate_point};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Horizontal anchor used to interpret `left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    Left,
    #[default]
    Center,
    Right,
}

impl OriginX {
    /// Offset of this origin from the center, as a fraction of the width.
    pub fn factor(self) -> f64 {
        match self {
            OriginX::Left => -0.5,
            OriginX::Center => 0.0,
            OriginX::Right => 0.5,
        }
    }

    /// Mirror across the center line.
    pub fn flipped(self) -> Self {
        match self {
            OriginX::Left => OriginX::Right,
            OriginX::Center => OriginX::Center,
            OriginX::Right => OriginX::Left,
        }
    }
}

/// Vertical anchor used to interpret `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    Top,
    #[default]
    Center,
    Bottom,
}

impl OriginY {
    /// Offset of this origin from the center, as a fraction of the height.
    pub fn factor(self) -> f64 {
        match self {
            OriginY::Top => -0.5,
            OriginY::Center => 0.0,
            OriginY::Bottom => 0.5,
        }
    }

    /// Mirror across the center line.
    pub fn flipped(self) -> Self {
        match self {
            OriginY::Top => OriginY::Bottom,
            OriginY::Center => OriginY::Center,
            OriginY::Bottom => OriginY::Top,
        }
    }
}

/// Position, size, scale, rotation and mirroring of an entity.
///
/// `(left, top)` is the world position of the point selected by
/// `(origin_x, origin_y)`. Scales are stored as magnitudes; mirroring lives in
/// `flip_x` / `flip_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees, kept in `[0, 360)`.
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            origin_x: OriginX::default(),
            origin_y: OriginY::default(),
        }
    }
}

impl ObjectTransform {
    /// Width including scale.
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// Height including scale.
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    pub fn angle_radians(&self) -> f64 {
        degrees_to_radians(self.angle)
    }

    /// Set the angle, normalizing into `[0, 360)`.
    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = normalize_angle(degrees);
    }

    /// Set the horizontal scale. A negative value toggles `flip_x` and the
    /// magnitude is stored.
    pub fn set_scale_x(&mut self, value: f64) {
        if value < 0.0 {
            self.flip_x = !self.flip_x;
        }
        self.scale_x = value.abs();
    }

    /// Set the vertical scale. A negative value toggles `flip_y` and the
    /// magnitude is stored.
    pub fn set_scale_y(&mut self, value: f64) {
        if value < 0.0 {
            self.flip_y = !self.flip_y;
        }
        self.scale_y = value.abs();
    }

    /// World-space center of the entity.
    pub fn center_point(&self) -> Point {
        self.translate_to_center_point(Point::new(self.left, self.top), self.origin_x, self.origin_y)
    }

    /// Given the world position of an origin point, find the center.
    pub fn translate_to_center_point(&self, point: Point, origin_x: OriginX, origin_y: OriginY) -> Point {
        let unrotated = Point::new(
            point.x - origin_x.factor() * self.scaled_width(),
            point.y - origin_y.factor() * self.scaled_height(),
        );
        if self.angle == 0.0 {
            unrotated
        } else {
            rotate_point(unrotated, point, self.angle_radians())
        }
    }

    /// Given the center, find the world position of an origin point.
    pub fn translate_to_origin_point(&self, center: Point, origin_x: OriginX, origin_y: OriginY) -> Point {
        let unrotated = Point::new(
            center.x + origin_x.factor() * self.scaled_width(),
            center.y + origin_y.factor() * self.scaled_height(),
        );
        if self.angle == 0.0 {
            unrotated
        } else {
            rotate_point(unrotated, center, self.angle_radians())
        }
    }

    /// Express a world point in the entity's unrotated frame, relative to the
    /// given origin point.
    pub fn to_local_point(&self, point: Point, origin_x: OriginX, origin_y: OriginY) -> Vec2 {
        let center = self.center_point();
        let origin = Point::new(
            center.x + origin_x.factor() * self.scaled_width(),
            center.y + origin_y.factor() * self.scaled_height(),
        );
        rotate_point(point, center, -self.angle_radians()) - origin
    }

    /// Move the entity so that its `(origin_x, origin_y)` point lands on `pos`.
    pub fn set_position_by_origin(&mut self, pos: Point, origin_x: OriginX, origin_y: OriginY) {
        let center = self.translate_to_center_point(pos, origin_x, origin_y);
        let position = self.translate_to_origin_point(center, self.origin_x, self.origin_y);
        self.left = position.x;
        self.top = position.y;
    }

    /// Move the entity so that its center lands on `center`.
    pub fn set_center_point(&mut self, center: Point) {
        self.set_position_by_origin(center, OriginX::Center, OriginY::Center);
    }
}
