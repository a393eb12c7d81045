//! Keyboard and mouse event translation.
//!
//! The GUI layer reports raw key presses, a printable code-point stream, and
//! mouse state once per frame. This crate turns key presses into editor
//! [`Command`]s via the fixed binding table and promotes repeated clicks to
//! double and triple clicks. It never touches editor state.

use bitflags::bitflags;
use tracing::trace;

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
        const ALT   = 0b0000_0100;
    }
}

impl Modifiers {
    #[inline]
    pub fn shift(&self) -> bool {
        self.contains(Modifiers::SHIFT)
    }
    #[inline]
    pub fn ctrl(&self) -> bool {
        self.contains(Modifiers::CTRL)
    }
    #[inline]
    pub fn alt(&self) -> bool {
        self.contains(Modifiers::ALT)
    }
}

/// Non-printable keys plus the latin letters used by shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Insert,
    Enter,
    Tab,
    Char(char),
}

/// A single key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub mods: Modifiers,
}

impl KeyInput {
    pub const fn new(key: Key, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            mods: Modifiers::empty(),
        }
    }
}

/// Editor operations produced by input translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo(u32),
    Redo(u32),
    MoveUp { amount: u32, select: bool },
    MoveDown { amount: u32, select: bool },
    MoveLeft { amount: u32, select: bool, word_mode: bool },
    MoveRight { amount: u32, select: bool, word_mode: bool },
    MoveTop { select: bool },
    MoveBottom { select: bool },
    MoveHome { select: bool },
    MoveEnd { select: bool },
    Delete,
    Backspace,
    ToggleOverwrite,
    Copy,
    Cut,
    Paste,
    SelectAll,
    EnterCharacter { code_point: u32, shift: bool },
}

/// Translate one key press following the fixed binding table. `page_size`
/// is the current viewport height in lines; page motions move by four lines
/// less so context stays on screen. Read-only mode suppresses mutating
/// bindings entirely (paste, undo, character entry) while copy and motion
/// still work.
pub fn translate_key(input: KeyInput, read_only: bool, page_size: usize) -> Option<Command> {
    let shift = input.mods.shift();
    let ctrl = input.mods.ctrl();
    let alt = input.mods.alt();
    let page = page_size.saturating_sub(4).max(1) as u32;

    let command = match input.key {
        Key::Char('z') | Key::Char('Z') if !read_only && ctrl && !shift && !alt => {
            Some(Command::Undo(1))
        }
        Key::Backspace if !read_only && !ctrl && !shift && alt => Some(Command::Undo(1)),
        Key::Char('y') | Key::Char('Y') if !read_only && ctrl && !shift && !alt => {
            Some(Command::Redo(1))
        }
        Key::Up if !ctrl && !alt => Some(Command::MoveUp {
            amount: 1,
            select: shift,
        }),
        Key::Down if !ctrl && !alt => Some(Command::MoveDown {
            amount: 1,
            select: shift,
        }),
        Key::Left if !alt => Some(Command::MoveLeft {
            amount: 1,
            select: shift,
            word_mode: ctrl,
        }),
        Key::Right if !alt => Some(Command::MoveRight {
            amount: 1,
            select: shift,
            word_mode: ctrl,
        }),
        Key::PageUp if !alt => Some(Command::MoveUp {
            amount: page,
            select: shift,
        }),
        Key::PageDown if !alt => Some(Command::MoveDown {
            amount: page,
            select: shift,
        }),
        Key::Home if ctrl && !alt => Some(Command::MoveTop { select: shift }),
        Key::End if ctrl && !alt => Some(Command::MoveBottom { select: shift }),
        Key::Home if !ctrl && !alt => Some(Command::MoveHome { select: shift }),
        Key::End if !ctrl && !alt => Some(Command::MoveEnd { select: shift }),
        Key::Delete if !read_only && !ctrl && !shift && !alt => Some(Command::Delete),
        Key::Backspace if !read_only && !ctrl && !shift && !alt => Some(Command::Backspace),
        Key::Insert if !ctrl && !shift && !alt => Some(Command::ToggleOverwrite),
        Key::Insert if ctrl && !shift && !alt => Some(Command::Copy),
        Key::Char('c') | Key::Char('C') if ctrl && !shift && !alt => Some(Command::Copy),
        Key::Insert if !read_only && !ctrl && shift && !alt => Some(Command::Paste),
        Key::Char('v') | Key::Char('V') if !read_only && ctrl && !shift && !alt => {
            Some(Command::Paste)
        }
        Key::Char('x') | Key::Char('X') if ctrl && !shift && !alt => Some(Command::Cut),
        Key::Delete if !ctrl && shift && !alt => Some(Command::Cut),
        Key::Char('a') | Key::Char('A') if ctrl && !shift && !alt => Some(Command::SelectAll),
        Key::Enter if !read_only && !ctrl && !shift && !alt => Some(Command::EnterCharacter {
            code_point: '\n' as u32,
            shift: false,
        }),
        Key::Tab if !read_only && !ctrl && !alt => Some(Command::EnterCharacter {
            code_point: '\t' as u32,
            shift,
        }),
        _ => None,
    };

    if let Some(command) = command {
        trace!(target: "input.keys", ?command, "key_translated");
    }
    command
}

/// Printable-stream filter: control characters other than `\n` are dropped
/// before they reach character entry.
#[inline]
pub fn accepts_text_input(code_point: u32) -> bool {
    code_point != 0 && (code_point == '\n' as u32 || code_point >= 32)
}

/// Mouse state reported once per frame by the GUI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseInput {
    /// Document-space pointer position.
    pub position: (f32, f32),
    pub clicked: bool,
    pub double_clicked: bool,
    pub dragging: bool,
    pub down: bool,
    pub mods: Modifiers,
    /// GUI clock in seconds, used for triple-click promotion.
    pub time: f64,
}

/// Click classification after promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    None,
    Single,
    Double,
    Triple,
}

/// Promotes a plain click arriving shortly after a double click to a triple
/// click. The GUI detects double clicks itself; this tracker only needs the
/// click times.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickTracker {
    last_click: Option<f64>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify this frame's mouse state. `double_click_time` is the
    /// platform double-click window in seconds.
    pub fn classify(&mut self, mouse: &MouseInput, double_click_time: f64) -> ClickKind {
        let triple = mouse.clicked
            && !mouse.double_clicked
            && self
                .last_click
                .is_some_and(|last| mouse.time - last < double_click_time);

        if triple {
            self.last_click = None;
            return ClickKind::Triple;
        }
        if mouse.double_clicked {
            self.last_click = Some(mouse.time);
            return ClickKind::Double;
        }
        if mouse.clicked {
            self.last_click = Some(mouse.time);
            return ClickKind::Single;
        }
        ClickKind::None
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, mods: Modifiers) -> KeyInput {
        KeyInput::new(key, mods)
    }

    #[test]
    fn ctrl_z_undoes_and_is_suppressed_when_read_only() {
        let input = key(Key::Char('z'), Modifiers::CTRL);
        assert_eq!(translate_key(input, false, 30), Some(Command::Undo(1)));
        assert_eq!(translate_key(input, true, 30), None);
    }

    #[test]
    fn alt_backspace_is_undo_plain_backspace_deletes() {
        assert_eq!(
            translate_key(key(Key::Backspace, Modifiers::ALT), false, 30),
            Some(Command::Undo(1))
        );
        assert_eq!(
            translate_key(key(Key::Backspace, Modifiers::empty()), false, 30),
            Some(Command::Backspace)
        );
    }

    #[test]
    fn arrows_extend_selection_with_shift_and_jump_words_with_ctrl() {
        assert_eq!(
            translate_key(key(Key::Left, Modifiers::SHIFT | Modifiers::CTRL), false, 30),
            Some(Command::MoveLeft {
                amount: 1,
                select: true,
                word_mode: true
            })
        );
        assert_eq!(
            translate_key(key(Key::Up, Modifiers::empty()), false, 30),
            Some(Command::MoveUp {
                amount: 1,
                select: false
            })
        );
    }

    #[test]
    fn page_motions_leave_four_lines_of_context() {
        assert_eq!(
            translate_key(key(Key::PageDown, Modifiers::empty()), false, 30),
            Some(Command::MoveDown {
                amount: 26,
                select: false
            })
        );
    }

    #[test]
    fn home_end_with_and_without_ctrl() {
        assert_eq!(
            translate_key(key(Key::Home, Modifiers::CTRL), false, 30),
            Some(Command::MoveTop { select: false })
        );
        assert_eq!(
            translate_key(key(Key::End, Modifiers::empty()), false, 30),
            Some(Command::MoveEnd { select: false })
        );
    }

    #[test]
    fn clipboard_shortcuts() {
        assert_eq!(
            translate_key(key(Key::Char('c'), Modifiers::CTRL), false, 30),
            Some(Command::Copy)
        );
        assert_eq!(
            translate_key(key(Key::Insert, Modifiers::SHIFT), false, 30),
            Some(Command::Paste)
        );
        assert_eq!(
            translate_key(key(Key::Delete, Modifiers::SHIFT), false, 30),
            Some(Command::Cut)
        );
        // Cut still reachable when read-only; it degrades to copy downstream.
        assert_eq!(
            translate_key(key(Key::Char('x'), Modifiers::CTRL), true, 30),
            Some(Command::Cut)
        );
    }

    #[test]
    fn tab_passes_shift_through_for_dedent() {
        assert_eq!(
            translate_key(key(Key::Tab, Modifiers::SHIFT), false, 30),
            Some(Command::EnterCharacter {
                code_point: '\t' as u32,
                shift: true
            })
        );
    }

    #[test]
    fn text_input_filter_drops_control_chars() {
        assert!(accepts_text_input('a' as u32));
        assert!(accepts_text_input('\n' as u32));
        assert!(!accepts_text_input('\t' as u32 )); // tab arrives as a key, not text
        assert!(!accepts_text_input(0));
        assert!(!accepts_text_input(27));
    }

    #[test]
    fn rapid_third_click_promotes_to_triple() {
        let mut tracker = ClickTracker::new();
        let mut mouse = MouseInput {
            position: (0.0, 0.0),
            clicked: true,
            double_clicked: false,
            dragging: false,
            down: true,
            mods: Modifiers::empty(),
            time: 0.0,
        };
        assert_eq!(tracker.classify(&mouse, 0.35), ClickKind::Single);

        mouse.clicked = false;
        mouse.double_clicked = true;
        mouse.time = 0.2;
        assert_eq!(tracker.classify(&mouse, 0.35), ClickKind::Double);

        mouse.clicked = true;
        mouse.double_clicked = false;
        mouse.time = 0.4;
        assert_eq!(tracker.classify(&mouse, 0.35), ClickKind::Triple);

        // The window restarts after a triple click.
        mouse.time = 0.6;
        assert_eq!(tracker.classify(&mouse, 0.35), ClickKind::Single);
    }

    #[test]
    fn slow_clicks_stay_single() {
        let mut tracker = ClickTracker::new();
        let mut mouse = MouseInput {
            position: (0.0, 0.0),
            clicked: true,
            double_clicked: false,
            dragging: false,
            down: true,
            mods: Modifiers::empty(),
            time: 0.0,
        };
        assert_eq!(tracker.classify(&mouse, 0.35), ClickKind::Single);
        mouse.time = 5.0;
        assert_eq!(tracker.classify(&mouse, 0.35), ClickKind::Single);
    }
}
