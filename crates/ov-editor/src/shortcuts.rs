//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. While the
//! inline input is focused only `Commit` and `Cancel` are honored; every
//! other key belongs to the text being typed.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Enter placing-text mode.
    AddText,
    /// Enter: close the inline input.
    Commit,
    /// Escape: close the inline input, leave placing mode, or deselect.
    Cancel,
    /// Remove the selected label.
    Delete,
    /// Download the composed image.
    Export,
}

impl ShortcutAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddText => "addText",
            Self::Commit => "commit",
            Self::Cancel => "cancel",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"t"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        match key {
            "Enter" => return Some(ShortcutAction::Commit),
            "Escape" => return Some(ShortcutAction::Cancel),
            _ => {}
        }

        if modifiers.command() {
            return match key {
                "s" | "S" => Some(ShortcutAction::Export),
                _ => None,
            };
        }

        if modifiers.alt {
            return None;
        }

        match key {
            "t" | "T" => Some(ShortcutAction::AddText),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            _ => None,
        }
    }

    /// Resolve a key while the inline input has focus.
    pub fn resolve_editing(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        Self::resolve(key, modifiers)
            .filter(|a| matches!(a, ShortcutAction::Commit | ShortcutAction::Cancel))
    }
}
