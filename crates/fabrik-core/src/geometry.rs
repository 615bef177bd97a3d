//! Geometry kernel: rotation, angle conversion, polygon crossing tests.

use kurbo::{Affine, Point, Rect, Vec2};

/// Convert degrees to radians.
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Convert radians to degrees.
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Rotate `point` about `origin` by `radians`.
///
/// Screen coordinates are y-down, so a positive angle turns clockwise on screen.
pub fn rotate_point(point: Point, origin: Point, radians: f64) -> Point {
    let (sin, cos) = radians.sin_cos();
    let dx = point.x - origin.x;
    let dy = point.y - origin.y;
    Point::new(
        origin.x + dx * cos - dy * sin,
        origin.y + dx * sin + dy * cos,
    )
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Object-to-world matrix: translate to `center`, rotate, then scale.
pub fn object_matrix(center: Point, radians: f64, scale_x: f64, scale_y: f64) -> Affine {
    Affine::translate(center.to_vec2())
        * Affine::rotate(radians)
        * Affine::scale_non_uniform(scale_x, scale_y)
}

/// Axis-aligned bounds of a set of points. Empty input yields `Rect::ZERO`.
pub fn bounds_from_points(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Directed segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub o: Point,
    pub d: Point,
}

impl Segment {
    pub fn new(o: Point, d: Point) -> Self {
        Self { o, d }
    }

    pub fn direction(&self) -> Vec2 {
        self.d - self.o
    }
}

/// Count crossings of a horizontal ray cast from `point` towards +x.
///
/// A segment counts when `point.y` lies in the half-open span between its
/// endpoints' y values (lower bound exclusive on the lesser endpoint). Odd
/// counts mean the point is inside a closed polygon.
pub fn find_cross_points(point: Point, segments: &[Segment]) -> usize {
    let mut count = 0;
    for seg in segments {
        if seg.o.y < point.y && seg.d.y < point.y {
            continue;
        }
        if seg.o.y >= point.y && seg.d.y >= point.y {
            continue;
        }
        let xi = if seg.o.x == seg.d.x {
            seg.o.x
        } else {
            // Horizontal segments were excluded above, so dy is non-zero.
            let dir = seg.direction();
            seg.o.x + (point.y - seg.o.y) * dir.x / dir.y
        };
        if xi >= point.x {
            count += 1;
        }
    }
    count
}

/// Test if two line segments (a-b) and (c-d) intersect.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear: an endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Corners of a rectangle in clockwise order starting at the top-left.
pub fn rect_corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// True when any edge of the closed polygon crosses any edge of `rect`.
///
/// Containment without edge contact is not an intersection.
pub fn polygon_intersects_rect(polygon: &[Point], rect: Rect) -> bool {
    if polygon.len() < 2 {
        return false;
    }
    let corners = rect_corners(rect);
    let rect_edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    let n = polygon.len();
    (0..n).any(|i| {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        rect_edges
            .iter()
            .any(|&(c, d)| segments_intersect(a, b, c, d))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn square() -> Vec<Segment> {
        let tl = Point::new(0.0, 0.0);
        let tr = Point::new(10.0, 0.0);
        let br = Point::new(10.0, 10.0);
        let bl = Point::new(0.0, 10.0);
        vec![
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Point::new(10.0, 0.0), Point::ZERO, std::f64::consts::FRAC_PI_2);
        assert!(p.x.abs() < EPS);
        assert!((p.y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_point_about_origin() {
        let p = rotate_point(Point::new(2.0, 1.0), Point::new(1.0, 1.0), std::f64::consts::PI);
        assert!((p.x - 0.0).abs() < EPS);
        assert!((p.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-30.0) - 330.0).abs() < EPS);
        assert!((normalize_angle(360.0)).abs() < EPS);
        assert!((normalize_angle(725.0) - 5.0).abs() < EPS);
        assert!((normalize_angle(-1e-20)).abs() < EPS);
        assert!((normalize_angle(f64::NAN)).abs() < EPS);
    }

    #[test]
    fn test_degree_conversion() {
        assert!((degrees_to_radians(180.0) - std::f64::consts::PI).abs() < EPS);
        assert!((radians_to_degrees(std::f64::consts::FRAC_PI_2) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_object_matrix() {
        let m = object_matrix(Point::new(100.0, 50.0), 0.0, 2.0, 3.0);
        let p = m * Point::new(1.0, 1.0);
        assert!((p.x - 102.0).abs() < EPS);
        assert!((p.y - 53.0).abs() < EPS);
    }

    #[test]
    fn test_bounds_from_points() {
        let b = bounds_from_points(&[
            Point::new(5.0, 1.0),
            Point::new(-2.0, 4.0),
            Point::new(3.0, -6.0),
        ]);
        assert!((b.x0 + 2.0).abs() < EPS);
        assert!((b.y0 + 6.0).abs() < EPS);
        assert!((b.x1 - 5.0).abs() < EPS);
        assert!((b.y1 - 4.0).abs() < EPS);
        assert_eq!(bounds_from_points(&[]), Rect::ZERO);
    }

    #[test]
    fn test_cross_points_inside_and_outside() {
        let lines = square();
        assert_eq!(find_cross_points(Point::new(5.0, 5.0), &lines), 1);
        assert_eq!(find_cross_points(Point::new(-5.0, 5.0), &lines), 2);
        assert_eq!(find_cross_points(Point::new(15.0, 5.0), &lines), 0);
        assert_eq!(find_cross_points(Point::new(5.0, 15.0), &lines), 0);
    }

    #[test]
    fn test_cross_points_slanted_edge() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let c = Point::new(0.0, 10.0);
        let tri = vec![Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)];
        assert_eq!(find_cross_points(Point::new(2.0, 5.0), &tri) % 2, 1);
        assert_eq!(find_cross_points(Point::new(8.0, 5.0), &tri) % 2, 0);
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(5.0, 5.0),
            Point::new(6.0, 4.0),
        ));
    }

    #[test]
    fn test_polygon_intersects_rect() {
        let poly = [
            Point::new(5.0, 5.0),
            Point::new(15.0, 5.0),
            Point::new(15.0, 15.0),
            Point::new(5.0, 15.0),
        ];
        assert!(polygon_intersects_rect(&poly, Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!polygon_intersects_rect(&poly, Rect::new(20.0, 20.0, 30.0, 30.0)));
        // Fully enclosed polygon does not touch the rectangle's edges
        assert!(!polygon_intersects_rect(&poly, Rect::new(0.0, 0.0, 100.0, 100.0)));
    }
}
