//! Input model: mouse buttons, keys, and the gesture state machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. Each active variant keeps a copy of the element as it was
//! when the gesture began, so pointer-up can derive the commit and
//! pointer-cancel can put the element back.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{Element, ElementId, ElementPatch};
use crate::geometry::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Whether this key deletes the selection.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The selected element follows the pointer.
    Dragging {
        id: ElementId,
        /// Pointer position minus element position at pointer-down.
        offset: Point,
        /// Pointer position at pointer-down, in canvas space.
        start: Point,
        /// Whether the pointer has left `start` since pointer-down.
        moved: bool,
        /// The element before the gesture.
        before: Element,
    },
    /// The selected element is resized from its bottom-right handle.
    Resizing {
        id: ElementId,
        /// Top-left of the element's bounding box; stays fixed.
        origin: Point,
        /// Size fields produced by the latest pointer move.
        patch: ElementPatch,
        /// The element before the gesture.
        before: Element,
    },
}

impl InputState {
    /// The element a gesture is acting on, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
