//! Pointer input and cursor types exchanged with the host surface.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }
}

/// Pointer event in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    /// Left-button press with the given modifiers.
    pub fn down(position: Point, modifiers: Modifiers) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
            modifiers,
        }
    }

    pub fn moved(position: Point, modifiers: Modifiers) -> Self {
        PointerEvent::Move { position, modifiers }
    }

    /// Left-button release with the given modifiers.
    pub fn up(position: Point, modifiers: Modifiers) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
            modifiers,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => *position,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            PointerEvent::Down { modifiers, .. }
            | PointerEvent::Move { modifiers, .. }
            | PointerEvent::Up { modifiers, .. } => *modifiers,
        }
    }

    /// Button for press/release events, `None` for moves.
    pub fn button(&self) -> Option<MouseButton> {
        match self {
            PointerEvent::Down { button, .. } | PointerEvent::Up { button, .. } => Some(*button),
            PointerEvent::Move { .. } => None,
        }
    }
}

/// Cursor the host should display over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorIcon {
    #[default]
    Default,
    Move,
    Crosshair,
    NwResize,
    NResize,
    NeResize,
    EResize,
    SeResize,
    SResize,
    SwResize,
    WResize,
}

impl CursorIcon {
    /// CSS cursor name.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorIcon::Default => "default",
            CursorIcon::Move => "move",
            CursorIcon::Crosshair => "crosshair",
            CursorIcon::NwResize => "nw-resize",
            CursorIcon::NResize => "n-resize",
            CursorIcon::NeResize => "ne-resize",
            CursorIcon::EResize => "e-resize",
            CursorIcon::SeResize => "se-resize",
            CursorIcon::SResize => "s-resize",
            CursorIcon::SwResize => "sw-resize",
            CursorIcon::WResize => "w-resize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_accessors() {
        let ev = PointerEvent::down(Point::new(3.0, 4.0), Modifiers::shift());
        assert_eq!(ev.position(), Point::new(3.0, 4.0));
        assert!(ev.modifiers().shift);
        assert_eq!(ev.button(), Some(MouseButton::Left));

        let mv = PointerEvent::moved(Point::new(1.0, 1.0), Modifiers::default());
        assert_eq!(mv.button(), None);
        assert!(!mv.modifiers().alt);
    }

    #[test]
    fn test_cursor_css_names() {
        assert_eq!(CursorIcon::default().css_name(), "default");
        assert_eq!(CursorIcon::SeResize.css_name(), "se-resize");
    }

    #[test]
    fn test_pointer_event_serde() {
        let ev = PointerEvent::up(Point::new(1.0, 2.0), Modifiers::alt());
        let json = serde_json::to_string(&ev).unwrap();
        let back: PointerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
