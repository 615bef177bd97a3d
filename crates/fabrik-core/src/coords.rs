//! Oriented bounding geometry and control handle placement.

use crate::input::CursorIcon;
use crate::shapes::Controls;
use crate::transform::ObjectTransform;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Named control points, listed clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerId {
    Tl,
    Tr,
    Br,
    Bl,
    Ml,
    Mt,
    Mr,
    Mb,
    /// Rotation handle, offset above the top edge.
    Mtr,
}

impl CornerId {
    /// All control points in hit-test order.
    pub const ALL: [CornerId; 9] = [
        CornerId::Tl,
        CornerId::Tr,
        CornerId::Br,
        CornerId::Bl,
        CornerId::Ml,
        CornerId::Mt,
        CornerId::Mr,
        CornerId::Mb,
        CornerId::Mtr,
    ];

    /// Cursor shown while hovering this control.
    pub fn cursor(self) -> CursorIcon {
        match self {
            CornerId::Tl => CursorIcon::NwResize,
            CornerId::Tr => CursorIcon::NeResize,
            CornerId::Br => CursorIcon::SeResize,
            CornerId::Bl => CursorIcon::SwResize,
            CornerId::Ml => CursorIcon::WResize,
            CornerId::Mt => CursorIcon::NResize,
            CornerId::Mr => CursorIcon::EResize,
            CornerId::Mb => CursorIcon::SResize,
            CornerId::Mtr => CursorIcon::Crosshair,
        }
    }
}

/// Four corners of a handle's hit square.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandleSquare {
    pub tl: Point,
    pub tr: Point,
    pub bl: Point,
    pub br: Point,
}

impl HandleSquare {
    /// Corners in clockwise order.
    pub fn quad(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// Midpoint of the square, a point that always hits the handle.
    pub fn center(&self) -> Point {
        self.tl.midpoint(self.br)
    }

    fn around(center: Point, cos_half: f64, sin_half: f64, shift: Vec2) -> Self {
        Self {
            tl: Point::new(center.x - sin_half, center.y - cos_half) + shift,
            tr: Point::new(center.x + cos_half, center.y - sin_half) + shift,
            bl: Point::new(center.x - cos_half, center.y + sin_half) + shift,
            br: Point::new(center.x + sin_half, center.y + cos_half) + shift,
        }
    }
}

/// A named control point and its hit square.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerPoint {
    pub point: Point,
    pub corner: HandleSquare,
}

impl CornerPoint {
    fn at(point: Point) -> Self {
        Self {
            point,
            corner: HandleSquare::default(),
        }
    }
}

/// World-space control points of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OCoords {
    pub tl: CornerPoint,
    pub tr: CornerPoint,
    pub br: CornerPoint,
    pub bl: CornerPoint,
    pub ml: CornerPoint,
    pub mt: CornerPoint,
    pub mr: CornerPoint,
    pub mb: CornerPoint,
    pub mtr: CornerPoint,
}

impl OCoords {
    pub fn get(&self, id: CornerId) -> &CornerPoint {
        match id {
            CornerId::Tl => &self.tl,
            CornerId::Tr => &self.tr,
            CornerId::Br => &self.br,
            CornerId::Bl => &self.bl,
            CornerId::Ml => &self.ml,
            CornerId::Mt => &self.mt,
            CornerId::Mr => &self.mr,
            CornerId::Mb => &self.mb,
            CornerId::Mtr => &self.mtr,
        }
    }

    fn get_mut(&mut self, id: CornerId) -> &mut CornerPoint {
        match id {
            CornerId::Tl => &mut self.tl,
            CornerId::Tr => &mut self.tr,
            CornerId::Br => &mut self.br,
            CornerId::Bl => &mut self.bl,
            CornerId::Ml => &mut self.ml,
            CornerId::Mt => &mut self.mt,
            CornerId::Mr => &mut self.mr,
            CornerId::Mb => &mut self.mb,
            CornerId::Mtr => &mut self.mtr,
        }
    }

    /// Control points in hit-test order.
    pub fn iter(&self) -> impl Iterator<Item = (CornerId, &CornerPoint)> {
        CornerId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }

    /// Outer corners of the bounding quad, clockwise from top-left.
    pub fn quad(&self) -> [Point; 4] {
        [self.tl.point, self.tr.point, self.br.point, self.bl.point]
    }
}

/// Compute the nine control points of an entity from its pose.
///
/// Stroke widths of 1 or less are ignored. Handle squares are filled in as
/// well; see [`set_corner_coords`].
pub fn compute_coords(transform: &ObjectTransform, controls: &Controls, stroke_width: f64) -> OCoords {
    let stroke = if stroke_width > 1.0 { stroke_width } else { 0.0 };
    let padding = controls.padding;
    let theta = transform.angle_radians();

    let current_width = (transform.width + stroke) * transform.scale_x + padding * 2.0;
    let current_height = (transform.height + stroke) * transform.scale_y + padding * 2.0;

    let hypotenuse = (current_width / 2.0).hypot(current_height / 2.0);
    let beta = current_height.atan2(current_width);

    let offset = Vec2::new((beta + theta).cos(), (beta + theta).sin()) * hypotenuse;
    let (sin_th, cos_th) = theta.sin_cos();
    let along_width = Vec2::new(cos_th, sin_th);
    let along_height = Vec2::new(-sin_th, cos_th);

    let tl = transform.center_point() - offset;
    let tr = tl + along_width * current_width;
    let br = tr + along_height * current_height;
    let bl = tl + along_height * current_height;
    let ml = tl + along_height * (current_height / 2.0);
    let mt = tl + along_width * (current_width / 2.0);
    let mr = tr + along_height * (current_height / 2.0);
    let mb = bl + along_width * (current_width / 2.0);

    let mut coords = OCoords {
        tl: CornerPoint::at(tl),
        tr: CornerPoint::at(tr),
        br: CornerPoint::at(br),
        bl: CornerPoint::at(bl),
        ml: CornerPoint::at(ml),
        mt: CornerPoint::at(mt),
        mr: CornerPoint::at(mr),
        mb: CornerPoint::at(mb),
        mtr: CornerPoint::at(mt),
    };
    set_corner_coords(&mut coords, transform.angle, controls.corner_size, controls.rotating_point_offset);
    coords
}

/// Place a `corner_size` hit square around every control point.
///
/// Squares follow the entity's rotation. The rotation handle's square is pushed
/// outward along the local up-vector by `rotating_point_offset`.
pub fn set_corner_coords(coords: &mut OCoords, angle: f64, corner_size: f64, rotating_point_offset: f64) {
    let theta = angle.to_radians();
    let new_theta = (45.0 - angle).to_radians();
    let corner_hypotenuse = (2.0 * corner_size * corner_size).sqrt() / 2.0;
    let cos_half = corner_hypotenuse * new_theta.cos();
    let sin_half = corner_hypotenuse * new_theta.sin();
    let (sin_th, cos_th) = theta.sin_cos();

    for id in CornerId::ALL {
        let shift = if id == CornerId::Mtr {
            Vec2::new(sin_th, -cos_th) * rotating_point_offset
        } else {
            Vec2::ZERO
        };
        let entry = coords.get_mut(id);
        entry.corner = HandleSquare::around(entry.point, cos_half, sin_half, shift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{OriginX, OriginY};

    const EPS: f64 = 1e-9;

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!((p.x - x).abs() < EPS, "x: {} != {}", p.x, x);
        assert!((p.y - y).abs() < EPS, "y: {} != {}", p.y, y);
    }

    fn transform_at_center(angle: f64) -> ObjectTransform {
        let mut t = ObjectTransform {
            left: 200.0,
            top: 200.0,
            width: 100.0,
            height: 50.0,
            origin_x: OriginX::Center,
            origin_y: OriginY::Center,
            ..Default::default()
        };
        t.set_angle(angle);
        t
    }

    #[test]
    fn test_unrotated_corners() {
        let coords = compute_coords(&transform_at_center(0.0), &Controls::default(), 1.0);
        assert_point(coords.tl.point, 150.0, 175.0);
        assert_point(coords.tr.point, 250.0, 175.0);
        assert_point(coords.br.point, 250.0, 225.0);
        assert_point(coords.bl.point, 150.0, 225.0);
        assert_point(coords.ml.point, 150.0, 200.0);
        assert_point(coords.mt.point, 200.0, 175.0);
        assert_point(coords.mr.point, 250.0, 200.0);
        assert_point(coords.mb.point, 200.0, 225.0);
        assert_point(coords.mtr.point, 200.0, 175.0);
    }

    #[test]
    fn test_thick_stroke_and_padding_inflate() {
        let controls = Controls {
            padding: 5.0,
            ..Default::default()
        };
        let coords = compute_coords(&transform_at_center(0.0), &controls, 10.0);
        // (100 + 10) + 2*5 = 120 wide, (50 + 10) + 2*5 = 70 tall
        assert_point(coords.tl.point, 140.0, 165.0);
        assert_point(coords.br.point, 260.0, 235.0);
    }

    #[test]
    fn test_rotated_quarter_turn() {
        let coords = compute_coords(&transform_at_center(90.0), &Controls::default(), 0.0);
        assert_point(coords.tl.point, 225.0, 150.0);
        assert_point(coords.tr.point, 225.0, 250.0);
        assert_point(coords.br.point, 175.0, 250.0);
        assert_point(coords.bl.point, 175.0, 150.0);
    }

    #[test]
    fn test_zero_size_is_finite() {
        let t = ObjectTransform {
            left: 10.0,
            top: 10.0,
            ..Default::default()
        };
        let coords = compute_coords(&t, &Controls::default(), 0.0);
        for (_, cp) in coords.iter() {
            assert!(cp.point.x.is_finite() && cp.point.y.is_finite());
        }
        assert_point(coords.tl.point, 10.0, 10.0);
    }

    #[test]
    fn test_handle_square_size() {
        let coords = compute_coords(&transform_at_center(0.0), &Controls::default(), 0.0);
        let sq = coords.tl.corner;
        assert_point(sq.tl, 144.0, 169.0);
        assert_point(sq.tr, 156.0, 169.0);
        assert_point(sq.br, 156.0, 181.0);
        assert_point(sq.bl, 144.0, 181.0);
    }

    #[test]
    fn test_rotation_handle_offset() {
        let controls = Controls::default();
        let coords = compute_coords(&transform_at_center(0.0), &controls, 0.0);
        let sq = coords.mtr.corner;
        let center_y = (sq.tl.y + sq.br.y) / 2.0;
        assert!((center_y - (175.0 - controls.rotating_point_offset)).abs() < EPS);
    }

    #[test]
    fn test_iter_order() {
        let coords = OCoords::default();
        let ids: Vec<CornerId> = coords.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, CornerId::ALL.to_vec());
    }
}
