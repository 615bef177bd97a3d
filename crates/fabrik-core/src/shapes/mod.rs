//! Shape entities: pose, style, control settings and the closed set of variants.

mod group;
mod image;
mod rectangle;

pub use group::Group;
pub use image::{Image, ImageFormat, ImageSource};
pub use rectangle::Rectangle;

use crate::coords::{OCoords, compute_coords};
use crate::geometry::{bounds_from_points, object_matrix, polygon_intersects_rect};
use crate::render::{Drawable, Painter, draw_controls};
use crate::transform::{ObjectTransform, OriginX, OriginY};
use kurbo::{Affine, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;
/// Unique identifier for groups.
pub type GroupId = Uuid;
/// Unique identifier for canvases.
pub type CanvasId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same color with alpha multiplied by `factor` (clamped to `[0, 1]`).
    pub fn with_alpha_factor(self, factor: f64) -> Self {
        let alpha = (self.a as f64 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Visual attributes. Only `stroke_width` affects geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    pub stroke: Option<SerializableColor>,
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Some(SerializableColor::black()),
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill.map(|c| c.with_alpha_factor(self.opacity).into())
    }

    /// Stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Option<Color> {
        self.stroke.map(|c| c.with_alpha_factor(self.opacity).into())
    }
}

/// Selection border and handle settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Controls {
    /// Gap between the shape and its selection border.
    pub padding: f64,
    /// Side length of a handle square.
    pub corner_size: f64,
    pub border_width: f64,
    /// Distance of the rotation handle above the top edge.
    pub rotating_point_offset: f64,
    pub has_controls: bool,
    pub has_rotating_point: bool,
    pub border_color: SerializableColor,
    pub corner_color: SerializableColor,
    /// Draw handles as outlines instead of filled squares.
    pub transparent_corners: bool,
    /// Border and handle opacity while the shape is being moved.
    pub border_opacity_when_moving: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            padding: 0.0,
            corner_size: 12.0,
            border_width: 1.0,
            rotating_point_offset: 40.0,
            has_controls: true,
            has_rotating_point: true,
            border_color: SerializableColor::new(102, 153, 255, 191),
            corner_color: SerializableColor::new(102, 153, 255, 191),
            transparent_corners: true,
            border_opacity_when_moving: 0.4,
        }
    }
}

/// Errors raised while constructing a shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} is out of range (got {value})")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Construction options for a [`Shape`].
///
/// Unknown keys are rejected when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeOptions {
    pub left: f64,
    pub top: f64,
    /// Design width. Zero on an image means "use the natural width".
    pub width: f64,
    /// Design height. Zero on an image means "use the natural height".
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees.
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    pub style: ShapeStyle,
    pub controls: Controls,
    pub visible: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        let t = ObjectTransform::default();
        Self {
            left: t.left,
            top: t.top,
            width: t.width,
            height: t.height,
            scale_x: t.scale_x,
            scale_y: t.scale_y,
            angle: t.angle,
            flip_x: t.flip_x,
            flip_y: t.flip_y,
            origin_x: t.origin_x,
            origin_y: t.origin_y,
            style: ShapeStyle::default(),
            controls: Controls::default(),
            visible: true,
        }
    }
}

impl ShapeOptions {
    /// Options for a shape of the given size centered on `(x, y)`.
    pub fn centered(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x,
            top: y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Check every numeric field.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let finite = [
            ("left", self.left),
            ("top", self.top),
            ("angle", self.angle),
            ("opacity", self.style.opacity),
            ("rotating_point_offset", self.controls.rotating_point_offset),
            ("border_opacity_when_moving", self.controls.border_opacity_when_moving),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ShapeError::NonFinite { field });
            }
        }

        let non_negative = [
            ("width", self.width),
            ("height", self.height),
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
            ("stroke_width", self.style.stroke_width),
            ("padding", self.controls.padding),
            ("corner_size", self.controls.corner_size),
            ("border_width", self.controls.border_width),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(ShapeError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ShapeError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("opacity", self.style.opacity),
            ("border_opacity_when_moving", self.controls.border_opacity_when_moving),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ShapeError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    fn transform(&self) -> ObjectTransform {
        let mut t = ObjectTransform {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            angle: 0.0,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            origin_x: self.origin_x,
            origin_y: self.origin_y,
        };
        t.set_angle(self.angle);
        t
    }
}

/// Properties compared to decide whether a gesture modified an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateSnapshot {
    pub transform: ObjectTransform,
    pub corner_size: f64,
    pub border_width: f64,
    pub fill: Option<SerializableColor>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: f64,
    pub visible: bool,
}

impl StateSnapshot {
    pub fn capture(transform: &ObjectTransform, controls: &Controls, style: Option<&ShapeStyle>, visible: bool) -> Self {
        Self {
            transform: *transform,
            corner_size: controls.corner_size,
            border_width: controls.border_width,
            fill: style.and_then(|s| s.fill),
            stroke: style.and_then(|s| s.stroke),
            stroke_width: style.map_or(0.0, |s| s.stroke_width),
            visible,
        }
    }
}

/// Anything the gesture controller can move, scale and rotate.
pub trait Transformable {
    fn transform(&self) -> &ObjectTransform;

    fn transform_mut(&mut self) -> &mut ObjectTransform;

    fn controls(&self) -> &Controls;

    /// Stroke width as it affects geometry.
    fn stroke_width(&self) -> f64;

    fn o_coords(&self) -> &OCoords;

    /// Recompute control points from the current pose.
    fn set_coords(&mut self);

    fn set_moving(&mut self, moving: bool);
}

/// Closed set of shape variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle(Rectangle),
    Image(Image),
}

impl ShapeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle(_) => "rect",
            ShapeKind::Image(_) => "image",
        }
    }
}

/// A transformable entity on a canvas.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) id: ShapeId,
    pub transform: ObjectTransform,
    pub style: ShapeStyle,
    pub controls: Controls,
    pub kind: ShapeKind,
    pub visible: bool,
    pub(crate) active: bool,
    pub(crate) is_moving: bool,
    pub(crate) o_coords: OCoords,
    pub(crate) canvas: Option<CanvasId>,
    pub(crate) group: Option<GroupId>,
    pub(crate) original_state: StateSnapshot,
    /// `has_controls` saved while the shape is a group member.
    pub(crate) orig_has_controls: Option<bool>,
}

impl Shape {
    /// Create a shape from validated options.
    pub fn new(kind: ShapeKind, options: ShapeOptions) -> Result<Self, ShapeError> {
        options.validate()?;
        let mut transform = options.transform();
        if let ShapeKind::Image(image) = &kind {
            if transform.width == 0.0 {
                transform.width = image.source.natural_width;
            }
            if transform.height == 0.0 {
                transform.height = image.source.natural_height;
            }
            for (field, value) in [("width", transform.width), ("height", transform.height)] {
                if !value.is_finite() {
                    return Err(ShapeError::NonFinite { field });
                }
                if value < 0.0 {
                    return Err(ShapeError::Negative { field, value });
                }
            }
        }
        let mut shape = Self {
            id: Uuid::new_v4(),
            transform,
            style: options.style,
            controls: options.controls,
            kind,
            visible: options.visible,
            active: false,
            is_moving: false,
            o_coords: OCoords::default(),
            canvas: None,
            group: None,
            original_state: StateSnapshot::default(),
            orig_has_controls: None,
        };
        shape.set_coords();
        shape.setup_state();
        Ok(shape)
    }

    /// Plain rectangle centered on `(x, y)`.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        Self::new(ShapeKind::Rectangle(Rectangle::default()), ShapeOptions::centered(x, y, width, height))
    }

    pub fn id(&self) -> ShapeId {
        self.id
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

    /// Canvas this shape was added to.
    pub fn canvas(&self) -> Option<CanvasId> {
        self.canvas
    }

    /// Group this shape currently belongs to.
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(&self.transform, &self.controls, Some(&self.style), self.visible)
    }

    /// Reset the saved state to the current one.
    pub fn setup_state(&mut self) {
        self.save_state();
    }

    pub fn save_state(&mut self) {
        self.original_state = self.snapshot();
    }

    /// True if any tracked property differs from the saved state.
    pub fn has_state_changed(&self) -> bool {
        self.snapshot() != self.original_state
    }

    /// World-space bounds of the selection quad.
    pub fn bounding_rect(&self) -> Rect {
        bounds_from_points(&self.o_coords.quad())
    }

    /// True if an edge of the selection quad crosses the rectangle.
    pub fn intersects_with_rect(&self, rect: Rect) -> bool {
        polygon_intersects_rect(&self.o_coords.quad(), rect)
    }

    /// True if the selection quad lies strictly inside the rectangle.
    pub fn is_contained_within_rect(&self, rect: Rect) -> bool {
        let bounds = self.bounding_rect();
        bounds.x0 > rect.x0 && bounds.x1 < rect.x1 && bounds.y0 > rect.y0 && bounds.y1 < rect.y1
    }

    /// Whether control handles take part in hit testing and rendering.
    pub fn handles_enabled(&self) -> bool {
        self.active && self.controls.has_controls
    }

    fn is_renderable(&self) -> bool {
        self.visible && self.transform.width != 0.0 && self.transform.height != 0.0
    }

    /// Object-to-world matrix including mirroring.
    pub fn matrix(&self) -> Affine {
        let t = &self.transform;
        let sx = if t.flip_x { -t.scale_x } else { t.scale_x };
        let sy = if t.flip_y { -t.scale_y } else { t.scale_y };
        object_matrix(t.center_point(), t.angle_radians(), sx, sy)
    }
}

impl Transformable for Shape {
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
        self.style.stroke_width
    }

    fn o_coords(&self) -> &OCoords {
        &self.o_coords
    }

    fn set_coords(&mut self) {
        self.o_coords = compute_coords(&self.transform, &self.controls, self.style.stroke_width);
    }

    fn set_moving(&mut self, moving: bool) {
        self.is_moving = moving;
    }
}

impl Drawable for Shape {
    fn local_bounds(&self) -> Rect {
        let w = self.transform.width;
        let h = self.transform.height;
        Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
    }

    fn render(&self, painter: &mut dyn Painter, parent: Affine) {
        if !self.is_renderable() {
            return;
        }
        let matrix = parent * self.matrix();
        let local = self.local_bounds();
        match &self.kind {
            ShapeKind::Rectangle(rect) => painter.draw_path(&rect.to_path(local), matrix, &self.style),
            ShapeKind::Image(image) => painter.draw_image(&image.source, local, matrix, self.style.opacity),
        }
        if self.handles_enabled() {
            draw_controls(painter, &self.o_coords, &self.controls, self.transform.angle, self.is_moving, parent);
        }
    }
}
