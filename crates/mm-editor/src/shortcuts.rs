//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

use crate::input::Modifiers;
use serde::Serialize;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutAction {
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    /// Back to the identity transform.
    ResetView,
    /// Escape: commit every active drag, drop pan/pinch pointers.
    CancelGestures,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"="`, `"Escape"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.cmd();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "0" | ")" => Some(ShortcutAction::ResetView),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomToFit),
                _ => None,
            };
        }

        if modifiers.shift {
            return match key {
                // Shift+1 reports "!" on US layouts.
                "1" | "!" => Some(ShortcutAction::ZoomToFit),
                "+" => Some(ShortcutAction::ZoomIn),
                "Escape" => Some(ShortcutAction::CancelGestures),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "Escape" => Some(ShortcutAction::CancelGestures),
            _ => None,
        }
    }
}
