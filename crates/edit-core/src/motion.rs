//! Cursor motions with interactive selection anchoring.
//!
//! Every motion reads the old cursor, computes the new one clamped to the
//! buffer, and then settles the interactive anchor pair: when the old cursor
//! sat on one end of the anchor, that end follows the cursor; otherwise the
//! motion starts a fresh span between the old and new positions. The ordered
//! (start, end) projection lands in the editor state via `set_selection`.
//!
//! Vertical motions keep the requested column even when crossing shorter
//! lines; clamping happens lazily in `cursor_position()` so the column
//! sticks while moving through them.

use crate::editor::CodeEditor;
use edit_state::SelectionMode;
use edit_text::{utf8, word, Coordinate};

/// Which anchor end a motion prefers when the old cursor matches both
/// (collapsed anchor): backward motions move the start, forward ones the end.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

impl CodeEditor {
    fn settle_anchor(&mut self, old: Coordinate, select: bool, direction: Direction) {
        let cursor = self.state.cursor;
        if select {
            match direction {
                Direction::Backward => {
                    if old == self.interactive_start {
                        self.interactive_start = cursor;
                    } else if old == self.interactive_end {
                        self.interactive_end = cursor;
                    } else {
                        self.interactive_start = cursor;
                        self.interactive_end = old;
                    }
                }
                Direction::Forward => {
                    if old == self.interactive_end {
                        self.interactive_end = cursor;
                    } else if old == self.interactive_start {
                        self.interactive_start = cursor;
                    } else {
                        self.interactive_start = old;
                        self.interactive_end = cursor;
                    }
                }
            }
        } else {
            self.interactive_start = cursor;
            self.interactive_end = cursor;
        }
    }

    pub fn move_up(&mut self, amount: u32, select: bool) {
        if amount == 0 {
            return;
        }
        let old = self.state.cursor;
        let last_line = self.buffer.line_count() - 1;
        self.state.cursor.line = old.line.saturating_sub(amount as usize).min(last_line);
        // Past the top the cursor falls to the start of the first line.
        if amount as usize > old.line {
            self.state.cursor.column = 0;
        }

        self.settle_anchor(old, select, Direction::Backward);
        self.set_selection(self.interactive_start, self.interactive_end, SelectionMode::Normal);
        self.scroll_to_cursor = true;
    }

    pub fn move_down(&mut self, amount: u32, select: bool) {
        if amount == 0 {
            return;
        }
        let old = self.state.cursor;
        let last_line = self.buffer.line_count() - 1;
        self.state.cursor.line = old.line.saturating_add(amount as usize).min(last_line);
        // Past the bottom the cursor falls to the end of the last line.
        if old.line == last_line {
            self.state.cursor.column = self.buffer.line_max_column(self.state.cursor.line);
        }

        self.settle_anchor(old, select, Direction::Forward);
        self.set_selection(self.interactive_start, self.interactive_end, SelectionMode::Normal);
        self.scroll_to_cursor = true;
    }

    pub fn move_left(&mut self, amount: u32, select: bool, word_mode: bool) {
        debug_assert!(self.buffer.line_count() >= 1);
        if amount == 0 {
            return;
        }

        let old = self.state.cursor;
        self.state.cursor = self.cursor_position();
        let mut line = self.state.cursor.line;
        let mut cindex = self.buffer.byte_index(self.state.cursor);

        for _ in 0..amount {
            if cindex == 0 {
                if line == 0 {
                    break;
                }
                line -= 1;
                cindex = self.buffer.line(line).map_or(0, |l| l.len());
            } else {
                cindex -= 1;
                if cindex > 0 {
                    if let Some(current) = self.buffer.line(line) {
                        while cindex > 0 && utf8::is_continuation(current[cindex].byte) {
                            cindex -= 1;
                        }
                    }
                }
            }

            self.state.cursor = Coordinate::new(line, self.buffer.column_of(line, cindex));
            if word_mode {
                self.state.cursor = word::find_word_start(&self.buffer, self.state.cursor);
                cindex = self.buffer.byte_index(self.state.cursor);
            }
        }

        self.state.cursor = Coordinate::new(line, self.buffer.column_of(line, cindex));
        self.settle_anchor(old, select, Direction::Backward);
        let mode = if select && word_mode {
            SelectionMode::Word
        } else {
            SelectionMode::Normal
        };
        self.set_selection(self.interactive_start, self.interactive_end, mode);
        self.scroll_to_cursor = true;
    }

    pub fn move_right(&mut self, amount: u32, select: bool, word_mode: bool) {
        let old = self.state.cursor;
        if old.line >= self.buffer.line_count() || amount == 0 {
            return;
        }

        let mut cindex = self.buffer.byte_index(self.state.cursor);
        for _ in 0..amount {
            let line_index = self.state.cursor.line;
            let line_len = self.buffer.line(line_index).map_or(0, |l| l.len());

            if cindex >= line_len {
                if line_index < self.buffer.line_count() - 1 {
                    self.state.cursor =
                        Coordinate::new((line_index + 1).min(self.buffer.line_count() - 1), 0);
                    cindex = 0;
                } else {
                    // Already at the end of the buffer; selection still
                    // settles below.
                    break;
                }
            } else {
                let step = self
                    .buffer
                    .line(line_index)
                    .map_or(1, |l| utf8::sequence_length(l[cindex].byte));
                cindex += step;
                self.state.cursor =
                    Coordinate::new(line_index, self.buffer.column_of(line_index, cindex));
                if word_mode {
                    self.state.cursor = word::find_next_word(&self.buffer, self.state.cursor);
                    cindex = self.buffer.byte_index(self.state.cursor);
                }
            }
        }

        self.settle_anchor(old, select, Direction::Forward);
        let mode = if select && word_mode {
            SelectionMode::Word
        } else {
            SelectionMode::Normal
        };
        self.set_selection(self.interactive_start, self.interactive_end, mode);
        self.scroll_to_cursor = true;
    }

    pub fn move_top(&mut self, select: bool) {
        let old = self.state.cursor;
        self.set_cursor_position(Coordinate::origin());

        if select {
            self.interactive_start = self.state.cursor;
            self.interactive_end = old;
        } else {
            self.interactive_start = self.state.cursor;
            self.interactive_end = self.state.cursor;
        }
        self.set_selection(self.interactive_start, self.interactive_end, SelectionMode::Normal);
        self.scroll_to_cursor = true;
    }

    pub fn move_bottom(&mut self, select: bool) {
        let old = self.cursor_position();
        let end_line = self.buffer.line_count() - 1;
        let new_pos = Coordinate::new(end_line, self.buffer.line_max_column(end_line));
        self.set_cursor_position(new_pos);

        if select {
            self.interactive_start = old;
            self.interactive_end = new_pos;
        } else {
            self.interactive_start = new_pos;
            self.interactive_end = new_pos;
        }
        self.set_selection(self.interactive_start, self.interactive_end, SelectionMode::Normal);
        self.scroll_to_cursor = true;
    }

    pub fn move_home(&mut self, select: bool) {
        let old = self.state.cursor;
        self.set_cursor_position(Coordinate::new(old.line.min(self.buffer.line_count() - 1), 0));

        self.settle_anchor(old, select, Direction::Backward);
        self.set_selection(self.interactive_start, self.interactive_end, SelectionMode::Normal);
        self.scroll_to_cursor = true;
    }

    pub fn move_end(&mut self, select: bool) {
        let old = self.state.cursor;
        let line = old.line.min(self.buffer.line_count() - 1);
        self.set_cursor_position(Coordinate::new(line, self.buffer.line_max_column(line)));

        self.settle_anchor(old, select, Direction::Forward);
        self.set_selection(self.interactive_start, self.interactive_end, SelectionMode::Normal);
        self.scroll_to_cursor = true;
    }
}
