//! The DLX editor core facade.
//!
//! [`CodeEditor`] owns the glyph buffer, cursor/selection state, undo log,
//! and markers, and exposes the full public operation set: text accessors,
//! structured selection, editing (typing, deletion, clipboard, indentation),
//! undo/redo, and the per-frame render pass that re-tokenizes on change and
//! assembles the draw list.
//!
//! All public operations are total: out-of-range coordinates are sanitized,
//! mutating calls no-op under read-only, and invalid code points are
//! dropped. Internal invariants (buffer non-empty, ordered selection) are
//! checked with debug assertions only.
//!
//! External collaborators stay behind traits: the DLX tokenizer implements
//! [`edit_syntax::Tokenize`], text measurement implements
//! [`edit_render::TextMetrics`], and the system clipboard implements
//! [`Clipboard`]. The core is single-threaded and run-to-completion; every
//! collaborator is invoked synchronously and borrows nothing past the call.

mod editor;
mod edits;
mod frame;
mod motion;

pub use editor::CodeEditor;
pub use frame::FrameInput;

pub use edit_input::{ClickKind, Command, Key, KeyInput, Modifiers, MouseInput};
pub use edit_render::{DrawCommand, MonospaceMetrics, RenderOutput, TextMetrics, Vec2};
pub use edit_state::SelectionMode;
pub use edit_syntax::{NullTokenizer, Tokenize};
pub use edit_text::{Coordinate, DEFAULT_TAB_SIZE, MAX_TAB_SIZE, MIN_TAB_SIZE};

/// Clipboard boundary. Reads and writes are synchronous and fire-and-forget.
pub trait Clipboard {
    fn get(&mut self) -> Option<String>;
    fn set(&mut self, text: String);
}

/// In-process clipboard for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct LocalClipboard {
    content: Option<String>,
}

impl LocalClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            content: Some(text.to_string()),
        }
    }
}

impl Clipboard for LocalClipboard {
    fn get(&mut self) -> Option<String> {
        self.content.clone()
    }

    fn set(&mut self, text: String) {
        self.content = Some(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_clipboard_round_trip() {
        let mut clipboard = LocalClipboard::new();
        assert!(clipboard.get().is_none());
        clipboard.set("hello".to_string());
        assert_eq!(clipboard.get().as_deref(), Some("hello"));
    }
}
