//! Jump trigger filtering.
//!
//! Hosts forward raw key and pointer events here. Only events meant for the
//! game become jumps: typing into a text field elsewhere on the page must not
//! make the player hop.

use serde::{Deserialize, Serialize};

/// Keys the host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Space bar
    Space,
    /// Up arrow
    ArrowUp,
    /// W key
    W,
    /// Enter/return
    Enter,
    /// Escape
    Escape,
    /// Any key the game does not care about
    Other,
}

/// Element holding keyboard focus when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FocusTarget {
    /// Nothing in particular (page body)
    #[default]
    None,
    /// The game surface itself
    GameSurface,
    /// Single-line text input
    TextInput,
    /// Multi-line text area
    TextArea,
    /// Rich editable content
    ContentEditable,
    /// Any other widget (buttons, links)
    Widget,
}

impl FocusTarget {
    /// Check if the focused element accepts typed text.
    #[must_use]
    pub const fn accepts_text(&self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea | Self::ContentEditable)
    }
}

/// Raw input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Key pressed while `focus` held keyboard focus
    KeyDown {
        /// Key pressed
        key: KeyCode,
        /// Focused element
        focus: FocusTarget,
    },
    /// Mouse button pressed
    PointerDown {
        /// Whether the press landed on the game surface
        on_surface: bool,
    },
    /// Touch started
    TouchStart {
        /// Whether the touch landed on the game surface
        on_surface: bool,
    },
}

/// Decides which raw events are jump triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFilter {
    /// Keys that trigger a jump
    jump_keys: Vec<KeyCode>,
    /// Whether pointer and touch presses on the surface trigger a jump
    pointer_jumps: bool,
}

impl Default for InputFilter {
    fn default() -> Self {
        Self {
            jump_keys: vec![KeyCode::Space, KeyCode::ArrowUp],
            pointer_jumps: true,
        }
    }
}

impl InputFilter {
    /// Creates a filter with custom jump keys.
    #[must_use]
    pub fn with_keys(jump_keys: Vec<KeyCode>) -> Self {
        Self {
            jump_keys,
            ..Self::default()
        }
    }

    /// Enables or disables pointer/touch jumps.
    #[must_use]
    pub fn with_pointer_jumps(mut self, enabled: bool) -> Self {
        self.pointer_jumps = enabled;
        self
    }

    /// Returns the configured jump keys.
    #[must_use]
    pub fn jump_keys(&self) -> &[KeyCode] {
        &self.jump_keys
    }

    /// Check if `event` should become a `jump()` call.
    #[must_use]
    pub fn is_jump(&self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown { key, focus } => {
                !focus.accepts_text() && self.jump_keys.contains(&key)
            },
            InputEvent::PointerDown { on_surface } | InputEvent::TouchStart { on_surface } => {
                self.pointer_jumps && on_surface
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: KeyCode, focus: FocusTarget) -> InputEvent {
        InputEvent::KeyDown { key, focus }
    }

    #[test]
    fn test_default_jump_keys() {
        let filter = InputFilter::default();
        assert!(filter.is_jump(&key(KeyCode::Space, FocusTarget::None)));
        assert!(filter.is_jump(&key(KeyCode::ArrowUp, FocusTarget::GameSurface)));
        assert!(!filter.is_jump(&key(KeyCode::Enter, FocusTarget::None)));
    }

    #[test]
    fn test_typing_does_not_jump() {
        let filter = InputFilter::default();
        for focus in [
            FocusTarget::TextInput,
            FocusTarget::TextArea,
            FocusTarget::ContentEditable,
        ] {
            assert!(!filter.is_jump(&key(KeyCode::Space, focus)));
        }
        assert!(filter.is_jump(&key(KeyCode::Space, FocusTarget::Widget)));
    }

    #[test]
    fn test_pointer_only_on_surface() {
        let filter = InputFilter::default();
        assert!(filter.is_jump(&InputEvent::PointerDown { on_surface: true }));
        assert!(filter.is_jump(&InputEvent::TouchStart { on_surface: true }));
        assert!(!filter.is_jump(&InputEvent::PointerDown { on_surface: false }));

        let keyboard_only = InputFilter::default().with_pointer_jumps(false);
        assert!(!keyboard_only.is_jump(&InputEvent::TouchStart { on_surface: true }));
    }

    #[test]
    fn test_custom_keys() {
        let filter = InputFilter::with_keys(vec![KeyCode::W]);
        assert!(filter.is_jump(&key(KeyCode::W, FocusTarget::None)));
        assert!(!filter.is_jump(&key(KeyCode::Space, FocusTarget::None)));
        assert_eq!(filter.jump_keys(), &[KeyCode::W]);
    }
}
