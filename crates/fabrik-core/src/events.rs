//! Typed canvas events and a single-threaded publish/subscribe bus.

use crate::input::PointerEvent;
use crate::shapes::{GroupId, ShapeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Something a gesture or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Shape(ShapeId),
    Group(GroupId),
}

/// Notifications published by a canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    ObjectAdded { target: ShapeId },
    ObjectRemoved { target: ShapeId },
    /// A gesture changed the target's tracked state.
    ObjectModified { target: Target },
    ObjectMoving { target: Target, event: PointerEvent },
    ObjectScaling { target: Target, event: PointerEvent },
    ObjectRotating { target: Target, event: PointerEvent },
    SelectionCreated { target: Target },
    SelectionUpdated { target: Target },
    SelectionCleared,
    MouseDown { target: Option<Target>, event: PointerEvent },
    MouseMove { target: Option<Target>, event: PointerEvent },
    MouseUp { target: Option<Target>, event: PointerEvent },
    BeforeRender,
    AfterRender,
}

/// Discriminant used to subscribe to one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Matches every event.
    Any,
    ObjectAdded,
    ObjectRemoved,
    ObjectModified,
    ObjectMoving,
    ObjectScaling,
    ObjectRotating,
    SelectionCreated,
    SelectionUpdated,
    SelectionCleared,
    MouseDown,
    MouseMove,
    MouseUp,
    BeforeRender,
    AfterRender,
}

impl CanvasEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CanvasEvent::ObjectAdded { .. } => EventKind::ObjectAdded,
            CanvasEvent::ObjectRemoved { .. } => EventKind::ObjectRemoved,
            CanvasEvent::ObjectModified { .. } => EventKind::ObjectModified,
            CanvasEvent::ObjectMoving { .. } => EventKind::ObjectMoving,
            CanvasEvent::ObjectScaling { .. } => EventKind::ObjectScaling,
            CanvasEvent::ObjectRotating { .. } => EventKind::ObjectRotating,
            CanvasEvent::SelectionCreated { .. } => EventKind::SelectionCreated,
            CanvasEvent::SelectionUpdated { .. } => EventKind::SelectionUpdated,
            CanvasEvent::SelectionCleared => EventKind::SelectionCleared,
            CanvasEvent::MouseDown { .. } => EventKind::MouseDown,
            CanvasEvent::MouseMove { .. } => EventKind::MouseMove,
            CanvasEvent::MouseUp { .. } => EventKind::MouseUp,
            CanvasEvent::BeforeRender => EventKind::BeforeRender,
            CanvasEvent::AfterRender => EventKind::AfterRender,
        }
    }

    /// Stable wire name, e.g. `object:modified`.
    pub fn name(&self) -> &'static str {
        match self.kind() {
            EventKind::Any => "*",
            EventKind::ObjectAdded => "object:added",
            EventKind::ObjectRemoved => "object:removed",
            EventKind::ObjectModified => "object:modified",
            EventKind::ObjectMoving => "object:moving",
            EventKind::ObjectScaling => "object:scaling",
            EventKind::ObjectRotating => "object:rotating",
            EventKind::SelectionCreated => "selection:created",
            EventKind::SelectionUpdated => "selection:updated",
            EventKind::SelectionCleared => "selection:cleared",
            EventKind::MouseDown => "mouse:down",
            EventKind::MouseMove => "mouse:move",
            EventKind::MouseUp => "mouse:up",
            EventKind::BeforeRender => "before:render",
            EventKind::AfterRender => "after:render",
        }
    }
}

type Handler = Rc<dyn Fn(&CanvasEvent)>;

struct Listener {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// Publish/subscribe hub owned by a canvas.
#[derive(Default, Clone)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`. The handler stays registered
    /// until the returned subscription is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, kind: EventKind, handler: impl Fn(&CanvasEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener {
            id,
            kind,
            handler: Rc::new(handler),
        });
        Subscription {
            id,
            registry: Rc::clone(&self.registry),
        }
    }

    /// Deliver `event` to every matching handler.
    ///
    /// Handlers are collected before any runs, so a handler may subscribe or
    /// unsubscribe without affecting the current delivery.
    pub fn emit(&self, event: &CanvasEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == EventKind::Any || l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        log::trace!("Emitting {} to {} listeners", event.name(), handlers.len());
        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Handle to a registered listener; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Rc<RefCell<Registry>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn dispose(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut registry = self.registry.borrow_mut();
        registry.listeners.retain(|l| l.id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use uuid::Uuid;

    #[test]
    fn test_emit_reaches_matching_kind_only() {
        let bus = EventBus::new();
        let added = Rc::new(Cell::new(0));
        let counter = Rc::clone(&added);
        let _sub = bus.subscribe(EventKind::ObjectAdded, move |_| counter.set(counter.get() + 1));

        bus.emit(&CanvasEvent::ObjectAdded { target: Uuid::new_v4() });
        bus.emit(&CanvasEvent::SelectionCleared);
        assert_eq!(added.get(), 1);
    }

    #[test]
    fn test_any_receives_everything() {
        let bus = EventBus::new();
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        let _sub = bus.subscribe(EventKind::Any, move |e| sink.borrow_mut().push(e.name()));

        bus.emit(&CanvasEvent::BeforeRender);
        bus.emit(&CanvasEvent::AfterRender);
        assert_eq!(*names.borrow(), vec!["before:render", "after:render"]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let sub = bus.subscribe(EventKind::SelectionCleared, move |_| counter.set(counter.get() + 1));
        assert_eq!(bus.listener_count(), 1);

        bus.emit(&CanvasEvent::SelectionCleared);
        sub.dispose();
        bus.emit(&CanvasEvent::SelectionCleared);
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_handler_may_subscribe_during_emit() {
        let bus = EventBus::new();
        let inner = bus.clone();
        let held = Rc::new(RefCell::new(Vec::new()));
        let store = Rc::clone(&held);
        let _sub = bus.subscribe(EventKind::BeforeRender, move |_| {
            store.borrow_mut().push(inner.subscribe(EventKind::AfterRender, |_| {}));
        });
        bus.emit(&CanvasEvent::BeforeRender);
        assert_eq!(bus.listener_count(), 2);
        held.borrow_mut().clear();
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_event_names() {
        let t = Target::Shape(Uuid::new_v4());
        assert_eq!(CanvasEvent::ObjectModified { target: t }.name(), "object:modified");
        assert_eq!(CanvasEvent::SelectionCleared.name(), "selection:cleared");
    }
}
