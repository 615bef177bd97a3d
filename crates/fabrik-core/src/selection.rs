//! Marquee selection and render ordering.

use crate::shapes::{GroupId, Shape, ShapeId};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Rubber-band rectangle dragged out from an anchor point.
///
/// `width` and `height` are signed: dragging up or left makes them negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupSelector {
    pub ex: f64,
    pub ey: f64,
    pub width: f64,
    pub height: f64,
}

impl GroupSelector {
    /// Start a zero-size marquee at `anchor`.
    pub fn new(anchor: Point) -> Self {
        Self {
            ex: anchor.x,
            ey: anchor.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Stretch the marquee to `pointer`.
    pub fn update(&mut self, pointer: Point) {
        self.width = pointer.x - self.ex;
        self.height = pointer.y - self.ey;
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.ex, self.ey)
    }

    /// Normalized rectangle spanned by the anchor and the current corner.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.anchor(), Point::new(self.ex + self.width, self.ey + self.height))
    }
}

/// Current selection, borrowed from the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSelection<'a> {
    None,
    Shape(ShapeId),
    Group { id: GroupId, members: &'a [ShapeId] },
}

impl ActiveSelection<'_> {
    /// True if `id` is drawn as part of the selection.
    pub fn includes(&self, id: ShapeId) -> bool {
        match self {
            ActiveSelection::None => false,
            ActiveSelection::Shape(active) => *active == id,
            ActiveSelection::Group { members, .. } => members.contains(&id),
        }
    }
}

/// One entry of the paint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderItem {
    Shape(ShapeId),
    /// The active group: its members followed by its controls.
    Group(GroupId),
}

/// Paint order: unselected shapes back to front, then the selection on top.
pub fn render_order(z_order: &[ShapeId], active: ActiveSelection<'_>) -> Vec<RenderItem> {
    let mut items: Vec<RenderItem> = z_order
        .iter()
        .filter(|id| !active.includes(**id))
        .map(|id| RenderItem::Shape(*id))
        .collect();
    match active {
        ActiveSelection::None => {}
        ActiveSelection::Shape(id) => {
            if z_order.contains(&id) {
                items.push(RenderItem::Shape(id));
            }
        }
        ActiveSelection::Group { id, .. } => items.push(RenderItem::Group(id)),
    }
    items
}

/// Shapes caught by a marquee, in z-order. A shape is caught when an edge of
/// its selection quad crosses `rect` or when it lies fully inside.
pub fn objects_in_marquee(z_order: &[ShapeId], shapes: &HashMap<ShapeId, Shape>, rect: Rect) -> Vec<ShapeId> {
    z_order
        .iter()
        .filter(|id| {
            shapes
                .get(*id)
                .is_some_and(|s| s.intersects_with_rect(rect) || s.is_contained_within_rect(rect))
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_marquee_normalizes_backwards_drag() {
        let mut m = GroupSelector::new(Point::new(100.0, 100.0));
        m.update(Point::new(40.0, 160.0));
        assert!((m.width + 60.0).abs() < EPS);
        let r = m.rect();
        assert!((r.x0 - 40.0).abs() < EPS);
        assert!((r.x1 - 100.0).abs() < EPS);
        assert!((r.y0 - 100.0).abs() < EPS);
        assert!((r.y1 - 160.0).abs() < EPS);
    }

    #[test]
    fn test_render_order_puts_active_shape_last() {
        let ids: Vec<ShapeId> = (0..3).map(|_| Uuid::new_v4()).collect();
        let order = render_order(&ids, ActiveSelection::Shape(ids[0]));
        assert_eq!(
            order,
            vec![
                RenderItem::Shape(ids[1]),
                RenderItem::Shape(ids[2]),
                RenderItem::Shape(ids[0]),
            ]
        );
    }

    #[test]
    fn test_render_order_with_group() {
        let ids: Vec<ShapeId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let group = Uuid::new_v4();
        let members = [ids[0], ids[2]];
        let order = render_order(&ids, ActiveSelection::Group { id: group, members: &members });
        assert_eq!(
            order,
            vec![
                RenderItem::Shape(ids[1]),
                RenderItem::Shape(ids[3]),
                RenderItem::Group(group),
            ]
        );
    }

    #[test]
    fn test_render_order_without_selection() {
        let ids: Vec<ShapeId> = (0..2).map(|_| Uuid::new_v4()).collect();
        let order = render_order(&ids, ActiveSelection::None);
        assert_eq!(order, vec![RenderItem::Shape(ids[0]), RenderItem::Shape(ids[1])]);
        // Unknown active ids are not drawn
        assert_eq!(render_order(&ids, ActiveSelection::Shape(Uuid::new_v4())).len(), 2);
    }

    #[test]
    fn test_objects_in_marquee() {
        let shapes: Vec<Shape> = vec![
            Shape::rectangle(50.0, 50.0, 20.0, 20.0).unwrap(),
            Shape::rectangle(100.0, 100.0, 40.0, 40.0).unwrap(),
            Shape::rectangle(400.0, 400.0, 20.0, 20.0).unwrap(),
        ];
        let z_order: Vec<ShapeId> = shapes.iter().map(|s| s.id()).collect();
        let arena: HashMap<ShapeId, Shape> = shapes.into_iter().map(|s| (s.id(), s)).collect();

        // Contains the first, cuts through the second, misses the third
        let caught = objects_in_marquee(&z_order, &arena, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(caught, vec![z_order[0], z_order[1]]);
    }
}
