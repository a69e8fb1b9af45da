//! Input abstraction layer.
//!
//! Normalises mouse, touch and pen input into a single event stream.
//! Coordinates are client (page) coordinates; the canvas controller makes
//! them surface-relative.

use serde::{Deserialize, Serialize};

/// Browser `PointerEvent.pointerId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub i32);

impl std::fmt::Display for PointerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pointer {}", self.0)
    }
}

/// Which button went down. Touch and pen contacts report `Primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
    Other,
}

impl PointerButton {
    /// Map `MouseEvent.button` (0 = main, 1 = wheel, 2 = context).
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Raw input event from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown {
        pointer: PointerId,
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
    },
    PointerMove { pointer: PointerId, x: f64, y: f64 },
    PointerUp { pointer: PointerId, x: f64, y: f64 },
    /// The platform took the pointer away (touch cancelled, capture lost).
    PointerCancel { pointer: PointerId },
    /// Wheel or trackpad scroll; positive `delta_y` zooms out.
    Wheel {
        x: f64,
        y: f64,
        #[serde(rename = "deltaY")]
        delta_y: f64,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            Self::PointerDown { pointer, .. }
            | Self::PointerMove { pointer, .. }
            | Self::PointerUp { pointer, .. }
            | Self::PointerCancel { pointer } => Some(*pointer),
            Self::Wheel { .. } | Self::Key { .. } => None,
        }
    }
}

// ─── Pointer capture ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The pointer is no longer active (already released by the platform).
    #[error("{0} is not active")]
    InactivePointer(PointerId),
    #[error("pointer capture failed: {0}")]
    Platform(String),
}

/// Routes a pointer's subsequent events to the node that grabbed it, even
/// once the pointer leaves the node's box.
pub trait PointerCapture {
    fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError>;
    fn release(&mut self, pointer: PointerId) -> Result<(), CaptureError>;
}

/// Capture for headless hosts and tests: always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer: PointerId) -> Result<(), CaptureError> {
        Ok(())
    }

    fn release(&mut self, _pointer: PointerId) -> Result<(), CaptureError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn events_parse_from_host_json() {
        let down: InputEvent =
            serde_json::from_str(r#"{"type":"pointerDown","pointer":3,"x":10,"y":20}"#).unwrap();
        assert_eq!(
            down,
            InputEvent::PointerDown {
                pointer: PointerId(3),
                x: 10.0,
                y: 20.0,
                button: PointerButton::Primary,
            }
        );
        let wheel: InputEvent =
            serde_json::from_str(r#"{"type":"wheel","x":1,"y":2,"deltaY":-120}"#).unwrap();
        assert_eq!(wheel.pointer(), None);
    }

    #[test]
    fn dom_buttons() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other);
    }
}
