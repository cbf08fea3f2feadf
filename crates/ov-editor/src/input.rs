//! Input abstraction layer.
//!
//! Normalizes DOM pointer, keyboard, and text-input events into a unified
//! `InputEvent` enum consumed by the interaction controller. Pointer
//! coordinates are viewport (client) coordinates; the controller maps them
//! into image-local space.
//!
//! Presses may name the label element that received them. Hosts with a DOM
//! know this exactly; without it the controller hit-tests geometrically.

use kurbo::Point;
use ov_core::id::LabelId;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

    /// Platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The "Add Text" button was pressed.
    EnterPlacingText,

    PointerDown {
        x: f64,
        y: f64,
        /// Label element the press landed on, if the host knows it.
        target: Option<LabelId>,
    },

    PointerMove { x: f64, y: f64 },

    PointerUp { x: f64, y: f64 },

    DoubleClick {
        x: f64,
        y: f64,
        target: Option<LabelId>,
    },

    /// `KeyboardEvent.key` value, e.g. `"Enter"`, `"Escape"`, `"t"`.
    Key { key: String, modifiers: Modifiers },

    /// The inline input's full value after a keystroke.
    TextInput { value: String },

    /// The inline input lost focus.
    Blur,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y, target: None }
    }

    /// Press on a known label element.
    pub fn pointer_down_on(x: f64, y: f64, target: LabelId) -> Self {
        Self::PointerDown {
            x,
            y,
            target: Some(target),
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn double_click(x: f64, y: f64) -> Self {
        Self::DoubleClick { x, y, target: None }
    }

    pub fn double_click_on(x: f64, y: f64, target: LabelId) -> Self {
        Self::DoubleClick {
            x,
            y,
            target: Some(target),
        }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn text(value: &str) -> Self {
        Self::TextInput {
            value: value.to_string(),
        }
    }

    /// Viewport position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }

    /// Label element named by the host for a press or double-click.
    pub fn target(&self) -> Option<LabelId> {
        match self {
            Self::PointerDown { target, .. } | Self::DoubleClick { target, .. } => *target,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_only_for_pointer_events() {
        assert_eq!(
            InputEvent::pointer_down(3.0, 4.0).position(),
            Some(Point::new(3.0, 4.0))
        );
        assert_eq!(
            InputEvent::double_click(1.0, 2.0).position(),
            Some(Point::new(1.0, 2.0))
        );
        assert_eq!(InputEvent::Blur.position(), None);
        assert_eq!(InputEvent::key("Enter").position(), None);
    }

    #[test]
    fn target_only_for_presses() {
        let id = LabelId::intern("caption");
        assert_eq!(InputEvent::pointer_down_on(0.0, 0.0, id).target(), Some(id));
        assert_eq!(InputEvent::double_click_on(0.0, 0.0, id).target(), Some(id));
        assert_eq!(InputEvent::pointer_down(0.0, 0.0).target(), None);
        assert_eq!(InputEvent::pointer_up(0.0, 0.0).target(), None);
    }

    #[test]
    fn command_modifier() {
        assert!(!Modifiers::NONE.command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(Modifiers { ctrl: true, ..Modifiers::NONE }.command());
    }
}
