//! Drawing interface. The host supplies a [`Painter`]; this crate decides what
//! to draw and in which order.

use crate::coords::{CornerId, OCoords};
use crate::shapes::{Controls, ImageSource, SerializableColor, ShapeStyle};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;

/// Drawing backend implemented by the host.
pub trait Painter {
    /// Fill and stroke a path given in object space.
    fn draw_path(&mut self, path: &BezPath, transform: Affine, style: &ShapeStyle);

    /// Draw an image into `dest`, given in object space.
    fn draw_image(&mut self, source: &ImageSource, dest: Rect, transform: Affine, opacity: f64);

    /// Stroke a closed polygon.
    fn stroke_polygon(&mut self, points: &[Point], transform: Affine, color: Color, width: f64);

    fn fill_polygon(&mut self, points: &[Point], transform: Affine, color: Color);

    fn stroke_line(&mut self, from: Point, to: Point, transform: Affine, color: Color, width: f64);

    /// Rubber-band selection rectangle in world space.
    fn draw_marquee(&mut self, rect: Rect, fill: Color, border: Color, line_width: f64);
}

/// Something that can draw itself.
pub trait Drawable {
    /// Bounds in object space, centered on the origin.
    fn local_bounds(&self) -> Rect;

    fn render(&self, painter: &mut dyn Painter, parent: Affine);
}

fn color(c: SerializableColor, alpha: f64) -> Color {
    c.with_alpha_factor(alpha).into()
}

/// Draw the selection border, rotation stem and handle squares.
///
/// `coords` are in world space; `parent` maps world space to the surface.
pub fn draw_controls(
    painter: &mut dyn Painter,
    coords: &OCoords,
    controls: &Controls,
    angle: f64,
    is_moving: bool,
    parent: Affine,
) {
    let alpha = if is_moving { controls.border_opacity_when_moving } else { 1.0 };
    let border = color(controls.border_color, alpha);
    painter.stroke_polygon(&coords.quad(), parent, border, controls.border_width);

    if controls.has_rotating_point {
        let theta = angle.to_radians();
        let up = Vec2::new(theta.sin(), -theta.cos());
        let from = coords.mt.point;
        let to = from + up * controls.rotating_point_offset;
        painter.stroke_line(from, to, parent, border, controls.border_width);
    }

    let corner = color(controls.corner_color, alpha);
    for (id, cp) in coords.iter() {
        if id == CornerId::Mtr && !controls.has_rotating_point {
            continue;
        }
        let square = cp.corner.quad();
        if controls.transparent_corners {
            painter.stroke_polygon(&square, parent, corner, 1.0);
        } else {
            painter.fill_polygon(&square, parent, corner);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::coords::compute_coords;
    use crate::transform::ObjectTransform;

    /// Painter that records calls for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingPainter {
        pub calls: Vec<String>,
        pub alphas: Vec<u8>,
    }

    impl Painter for RecordingPainter {
        fn draw_path(&mut self, _path: &BezPath, transform: Affine, _style: &ShapeStyle) {
            let t = transform.translation();
            self.calls.push(format!("path@{:.0},{:.0}", t.x, t.y));
        }

        fn draw_image(&mut self, source: &ImageSource, _dest: Rect, _transform: Affine, _opacity: f64) {
            self.calls.push(format!("image:{}", source.key));
        }

        fn stroke_polygon(&mut self, points: &[Point], _transform: Affine, color: Color, _width: f64) {
            self.calls.push(format!("stroke:{}", points.len()));
            self.alphas.push(color.to_rgba8().a);
        }

        fn fill_polygon(&mut self, points: &[Point], _transform: Affine, _color: Color) {
            self.calls.push(format!("fill:{}", points.len()));
        }

        fn stroke_line(&mut self, _from: Point, _to: Point, _transform: Affine, _color: Color, _width: f64) {
            self.calls.push("line".to_string());
        }

        fn draw_marquee(&mut self, rect: Rect, _fill: Color, _border: Color, _line_width: f64) {
            self.calls.push(format!("marquee:{:.0}x{:.0}", rect.width(), rect.height()));
        }
    }

    fn coords() -> OCoords {
        let t = ObjectTransform {
            width: 10.0,
            height: 10.0,
            ..Default::default()
        };
        compute_coords(&t, &Controls::default(), 0.0)
    }

    #[test]
    fn test_controls_draw_border_stem_and_handles() {
        let mut painter = RecordingPainter::default();
        draw_controls(&mut painter, &coords(), &Controls::default(), 0.0, false, Affine::IDENTITY);
        assert_eq!(painter.calls[0], "stroke:4");
        assert_eq!(painter.calls[1], "line");
        // border + 9 transparent handle outlines
        assert_eq!(painter.alphas.len(), 10);
        assert_eq!(painter.alphas[0], 191);
    }

    #[test]
    fn test_controls_without_rotating_point() {
        let controls = Controls {
            has_rotating_point: false,
            transparent_corners: false,
            ..Default::default()
        };
        let mut painter = RecordingPainter::default();
        draw_controls(&mut painter, &coords(), &controls, 0.0, false, Affine::IDENTITY);
        assert!(!painter.calls.iter().any(|c| c == "line"));
        assert_eq!(painter.calls.iter().filter(|c| *c == "fill:4").count(), 8);
    }

    #[test]
    fn test_controls_fade_while_moving() {
        let mut painter = RecordingPainter::default();
        draw_controls(&mut painter, &coords(), &Controls::default(), 0.0, true, Affine::IDENTITY);
        assert_eq!(painter.alphas[0], 76);
    }
}
