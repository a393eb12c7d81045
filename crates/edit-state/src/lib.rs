//! Cursor, selection, undo, and marker state for the editor core.
//!
//! Core invariants (must hold after every public call on the owning editor):
//! * `selection_start <= selection_end`.
//! * Cursor and both selection ends are live (sanitized) coordinates.
//! * `UndoLog::index <= UndoLog::records.len()`.

use edit_text::Coordinate;

pub mod markers;
pub mod undo;

pub use markers::{Breakpoints, ErrorMarkers};
pub use undo::{StoredState, UndoLog, UndoRecord};

/// How a range selection is rounded: exact coordinates, word boundaries, or
/// whole lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Normal,
    Word,
    Line,
}

/// Cursor plus ordered selection. Columns are visual (tab-expanded);
/// byte-index columns exist only inside [`StoredState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorState {
    pub cursor: Coordinate,
    pub selection_start: Coordinate,
    pub selection_end: Coordinate,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            cursor: Coordinate::origin(),
            selection_start: Coordinate::origin(),
            selection_end: Coordinate::origin(),
        }
    }

    #[inline]
    pub fn has_selection(&self) -> bool {
        self.selection_end > self.selection_start
    }

    /// Swap the selection ends if they are out of order.
    #[inline]
    pub fn order_selection(&mut self) {
        if self.selection_start > self.selection_end {
            std::mem::swap(&mut self.selection_start, &mut self.selection_end);
        }
    }

    /// Collapse the selection onto a single coordinate.
    #[inline]
    pub fn collapse_selection_to(&mut self, at: Coordinate) {
        self.selection_start = at;
        self.selection_end = at;
    }
}
