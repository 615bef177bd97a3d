//! Point-in-shape and point-on-handle tests.

use crate::coords::{CornerId, OCoords};
use crate::geometry::{Segment, find_cross_points};
use kurbo::Point;

/// Outcome of hit-testing a point against one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitResult {
    /// The point is on the body or on one of the handles.
    pub inside: bool,
    /// Handle under the point, if handles were considered.
    pub handle: Option<CornerId>,
}

impl HitResult {
    pub const MISS: HitResult = HitResult {
        inside: false,
        handle: None,
    };
}

/// Edges of a quad given clockwise from its top-left corner.
pub fn image_lines(quad: [Point; 4]) -> [Segment; 4] {
    let [tl, tr, br, bl] = quad;
    [
        Segment::new(tl, tr),
        Segment::new(tr, br),
        Segment::new(br, bl),
        Segment::new(bl, tl),
    ]
}

/// Even-odd containment test against a clockwise quad.
pub fn quad_contains(point: Point, quad: [Point; 4]) -> bool {
    find_cross_points(point, &image_lines(quad)) % 2 == 1
}

/// First handle whose square contains `point`, checked in clockwise order
/// with the rotation handle last.
pub fn find_target_corner(point: Point, coords: &OCoords, has_rotating_point: bool) -> Option<CornerId> {
    coords
        .iter()
        .filter(|(id, _)| has_rotating_point || *id != CornerId::Mtr)
        .find(|(_, cp)| quad_contains(point, cp.corner.quad()))
        .map(|(id, _)| id)
}

/// Hit-test a point against an entity's control points.
///
/// Handles are tested before the body and only when `handles_enabled`. A hit
/// on a handle counts as inside even when the square sticks out of the body.
pub fn hit_test(point: Point, coords: &OCoords, handles_enabled: bool, has_rotating_point: bool) -> HitResult {
    if handles_enabled {
        if let Some(handle) = find_target_corner(point, coords, has_rotating_point) {
            return HitResult {
                inside: true,
                handle: Some(handle),
            };
        }
    }
    HitResult {
        inside: quad_contains(point, coords.quad()),
        handle: None,
    }
}
