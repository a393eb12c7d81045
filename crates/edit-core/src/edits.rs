//! Mutating operations: typing, deletion, clipboard, indentation, and
//! undo/redo replay.
//!
//! Every operation here follows the same shape: capture the before state,
//! mutate through the shared primitives, capture the after state, append one
//! undo record. A compound operation (paste over a selection) still yields a
//! single record carrying both the removed and added ranges.

use crate::editor::CodeEditor;
use crate::Clipboard;
use edit_state::{SelectionMode, StoredState, UndoRecord};
use edit_text::{utf8, word, ColorTag, Coordinate, Glyph};
use tracing::trace;

impl CodeEditor {
    // ---- state snapshots (byte-index columns) ---------------------------

    pub(crate) fn capture_state(&self) -> StoredState {
        StoredState {
            cursor: self.to_byte_coord(self.state.cursor),
            selection_start: self.to_byte_coord(self.state.selection_start),
            selection_end: self.to_byte_coord(self.state.selection_end),
        }
    }

    pub(crate) fn apply_stored_state(&mut self, stored: &StoredState) {
        self.state.cursor = self.from_byte_coord(stored.cursor);
        self.state.selection_start = self.from_byte_coord(stored.selection_start);
        self.state.selection_end = self.from_byte_coord(stored.selection_end);
        self.state.order_selection();
    }

    pub(crate) fn selected_bytes(&self) -> Vec<u8> {
        self.buffer
            .text_range_bytes(self.state.selection_start, self.state.selection_end)
    }

    /// Undo records address text by (line, byte offset) so they survive tab
    /// size changes between capture and replay.
    pub(crate) fn to_byte_coord(&self, c: Coordinate) -> Coordinate {
        let c = self.buffer.sanitize(c);
        Coordinate::new(c.line, self.buffer.byte_index(c))
    }

    pub(crate) fn from_byte_coord(&self, c: Coordinate) -> Coordinate {
        Coordinate::new(c.line, self.buffer.column_of(c.line, c.column))
    }

    // ---- selection deletion ---------------------------------------------

    /// Delete the selected range and collapse cursor and selection onto its
    /// start. No-op without a selection; records nothing itself.
    pub(crate) fn delete_selection(&mut self) {
        if self.state.selection_end == self.state.selection_start {
            return;
        }
        self.delete_range(self.state.selection_start, self.state.selection_end);
        let at = self.state.selection_start;
        self.set_selection(at, at, SelectionMode::Normal);
        self.set_cursor_position(at);
        self.text_changed = true;
    }

    // ---- whole-document operations --------------------------------------

    /// Clear the document down to one empty line. Undoable; no-op when the
    /// document is already empty or the editor is read-only.
    pub fn clear_text(&mut self) {
        debug_assert!(self.buffer.line_count() >= 1);
        if self.read_only {
            return;
        }
        if self.buffer.line_count() == 1 && self.buffer.line(0).is_some_and(|l| l.is_empty()) {
            return;
        }

        let mut record = UndoRecord::new();
        record.before = self.capture_state();
        record.removed = self.buffer.text_bytes();
        record.removed_start = Coordinate::origin();
        let last_line = self.buffer.line_count() - 1;
        record.removed_end =
            Coordinate::new(last_line, self.buffer.line(last_line).map_or(0, |l| l.len()));

        self.buffer.set_text("");
        self.reset_state();
        self.text_changed = true;

        record.after = self.capture_state();
        self.undo.push(record);
        self.verify_internal_state();
    }

    // ---- text insertion --------------------------------------------------

    /// Insert `text` at the cursor as one undoable operation, replacing the
    /// selection if one exists. The cursor lands after the insertion.
    pub fn insert_text(&mut self, text: &str) {
        if self.read_only || text.is_empty() {
            return;
        }
        self.insert_with_record(text);
    }

    fn insert_with_record(&mut self, text: &str) {
        let mut record = UndoRecord::new();
        record.before = self.capture_state();

        if self.state.has_selection() {
            record.removed = self.selected_bytes();
            record.removed_start = self.to_byte_coord(self.state.selection_start);
            record.removed_end = self.to_byte_coord(self.state.selection_end);
            self.delete_selection();
        }

        let mut pos = self.cursor_position();
        record.added_start = self.to_byte_coord(pos);
        record.added = text.as_bytes().to_vec();
        self.insert_text_at(&mut pos, text.as_bytes());
        self.set_selection(pos, pos, SelectionMode::Normal);
        self.set_cursor_position(pos);
        record.added_end = self.to_byte_coord(self.cursor_position());

        record.after = self.capture_state();
        trace!(target: "editor.ops", bytes = record.added.len(), "insert_text");
        self.undo.push(record);
        self.scroll_to_cursor = true;
        self.verify_internal_state();
    }

    // ---- character entry -------------------------------------------------

    /// Type one code point. `\n` splits the line and copies the leading
    /// blanks of the current line onto the new one; `\t` with a multi-line
    /// selection indents (or dedents under shift); otherwise the selection
    /// is replaced and the code point inserted, honoring overwrite mode.
    pub fn enter_character(&mut self, code_point: u32, shift: bool) {
        if self.read_only || code_point == 0 || !utf8::is_valid_scalar_input(code_point) {
            return;
        }
        self.enter_character_impl(code_point, shift);
    }

    fn enter_character_impl(&mut self, code_point: u32, shift: bool) {
        debug_assert!(!self.read_only);
        let mut record = UndoRecord::new();
        record.before = self.capture_state();

        if self.state.has_selection() {
            let tab = code_point == '\t' as u32;
            let multiline = self.state.selection_start.line != self.state.selection_end.line;
            if tab && (self.state.selection_start.column == 0 || multiline) {
                self.indent_selection(shift, record);
                return;
            }
            record.removed = self.selected_bytes();
            record.removed_start = self.to_byte_coord(self.state.selection_start);
            record.removed_end = self.to_byte_coord(self.state.selection_end);
            self.delete_selection();
        }

        let coord = self.cursor_position();
        record.added_start = self.to_byte_coord(coord);
        debug_assert!(self.buffer.line_count() >= 1);

        if code_point == '\n' as u32 {
            self.insert_line(coord.line + 1);
            let cindex = self.buffer.byte_index(coord);

            // Auto-indent: carry the leading blanks of the split line over.
            let (whitespace, tail) = {
                let Some(line) = self.buffer.line_mut(coord.line) else {
                    return;
                };
                let tail = line.split_off(cindex);
                let whitespace: Vec<Glyph> = line
                    .iter()
                    .copied()
                    .take_while(|g| word::is_blank_byte(g.byte))
                    .collect();
                (whitespace, tail)
            };

            record.added = vec![b'\n'];
            record
                .added
                .extend(whitespace.iter().map(|g| g.byte));

            let whitespace_len = whitespace.len();
            if let Some(new_line) = self.buffer.line_mut(coord.line + 1) {
                new_line.extend(whitespace);
                new_line.extend(tail);
            }
            self.set_cursor_position(Coordinate::new(
                coord.line + 1,
                self.buffer.column_of(coord.line + 1, whitespace_len),
            ));
            if !self.state.has_selection() {
                self.clear_selection();
            }
        } else {
            let encoded = utf8::encode(code_point);
            debug_assert!(!encoded.is_empty());
            if encoded.is_empty() {
                return;
            }

            let mut cindex = self.buffer.byte_index(coord);
            if self.overwrite {
                let line_len = self.buffer.line(coord.line).map_or(0, |l| l.len());
                if cindex < line_len {
                    let overwritten = self
                        .buffer
                        .line(coord.line)
                        .map_or(1, |l| utf8::sequence_length(l[cindex].byte));
                    record.removed_start = Coordinate::new(coord.line, cindex);
                    record.removed_end = Coordinate::new(coord.line, cindex + overwritten);
                    if let Some(line) = self.buffer.line_mut(coord.line) {
                        for _ in 0..overwritten.min(line.len() - cindex) {
                            record.removed.push(line.remove(cindex).byte);
                        }
                    }
                }
            }

            if let Some(line) = self.buffer.line_mut(coord.line) {
                let mut at = cindex.min(line.len());
                for byte in encoded.iter() {
                    line.insert(at, Glyph::new(*byte, ColorTag::Default));
                    at += 1;
                }
                cindex = at;
            }
            record.added = encoded.to_vec();
            self.set_cursor_position(Coordinate::new(
                coord.line,
                self.buffer.column_of(coord.line, cindex),
            ));
        }

        self.text_changed = true;
        record.added_end = self.to_byte_coord(self.cursor_position());
        record.after = self.capture_state();
        self.undo.push(record);
        self.scroll_to_cursor = true;
        self.verify_internal_state();
    }

    /// Indent (or dedent) every line touched by the selection. One record
    /// carries the text of the affected lines before and after.
    fn indent_selection(&mut self, dedent: bool, mut record: UndoRecord) {
        let mut start = self.state.selection_start;
        let mut end = self.state.selection_end;
        let original_end = end;

        debug_assert!(start < end);
        start.column = 0;
        if end.column == 0 && end.line > 0 {
            end.line -= 1;
        }
        if end.line >= self.buffer.line_count() {
            end.line = self.buffer.line_count() - 1;
        }
        end.column = self.buffer.line_max_column(end.line);

        record.removed_start = self.to_byte_coord(start);
        record.removed_end = self.to_byte_coord(end);
        record.removed = self.buffer.text_range_bytes(start, end);

        let tab_size = self.buffer.tab_size();
        let mut modified = false;
        for line_index in start.line..=end.line {
            let Some(line) = self.buffer.line_mut(line_index) else {
                continue;
            };
            if dedent {
                if line.is_empty() {
                    continue;
                }
                if line[0].byte == b'\t' {
                    line.remove(0);
                    modified = true;
                } else {
                    for _ in 0..tab_size {
                        if line.is_empty() || line[0].byte != b' ' {
                            break;
                        }
                        line.remove(0);
                        modified = true;
                    }
                }
            } else {
                line.insert(0, Glyph::new(b'\t', ColorTag::Background));
                modified = true;
            }
        }

        if !modified {
            return;
        }

        start = Coordinate::new(start.line, 0);
        let range_end;
        if original_end.column != 0 {
            end = Coordinate::new(end.line, self.buffer.line_max_column(end.line));
            range_end = end;
        } else {
            end = Coordinate::new(original_end.line, 0);
            range_end = Coordinate::new(
                end.line.saturating_sub(1),
                self.buffer.line_max_column(end.line.saturating_sub(1)),
            );
        }
        record.added = self.buffer.text_range_bytes(start, range_end);
        record.added_start = self.to_byte_coord(start);
        record.added_end = self.to_byte_coord(range_end);

        self.state.selection_start = start;
        self.state.selection_end = end;
        self.text_changed = true;
        self.scroll_to_cursor = true;

        record.after = self.capture_state();
        self.undo.push(record);
        self.verify_internal_state();
    }

    // ---- deletion --------------------------------------------------------

    /// Delete the selection, or the code point before the cursor (joining
    /// with the previous line at column 0).
    pub fn backspace(&mut self) {
        if self.read_only {
            return;
        }
        self.backspace_impl();
    }

    pub(crate) fn backspace_impl(&mut self) {
        debug_assert!(self.buffer.line_count() >= 1);
        let mut record = UndoRecord::new();
        record.before = self.capture_state();

        if self.state.has_selection() {
            record.removed = self.selected_bytes();
            record.removed_start = self.to_byte_coord(self.state.selection_start);
            record.removed_end = self.to_byte_coord(self.state.selection_end);
            self.delete_selection();
        } else {
            let pos = self.cursor_position();
            self.set_cursor_position(pos);

            if self.state.cursor.column == 0 {
                if self.state.cursor.line == 0 {
                    return;
                }
                let prev_line = pos.line - 1;
                let prev_max = self.buffer.line_max_column(prev_line);
                record.removed = vec![b'\n'];
                record.removed_start =
                    Coordinate::new(prev_line, self.buffer.line(prev_line).map_or(0, |l| l.len()));
                record.removed_end = Coordinate::new(pos.line, 0);

                // Join this line onto the previous one.
                let moved = {
                    let Some(line) = self.buffer.line_mut(pos.line) else {
                        return;
                    };
                    std::mem::take(line)
                };
                if let Some(prev) = self.buffer.line_mut(prev_line) {
                    prev.extend(moved);
                }
                self.remove_lines(pos.line, pos.line + 1);
                self.state.cursor.line = prev_line;
                self.state.cursor.column = prev_max;
            } else {
                let line_index = self.state.cursor.line;
                let index = self.buffer.byte_index(pos);
                debug_assert!(index > 0);
                let mut cindex = index - 1;

                let is_tab = self
                    .buffer
                    .line(line_index)
                    .is_some_and(|l| cindex < l.len() && l[cindex].byte == b'\t');
                if is_tab {
                    record.removed = vec![b'\t'];
                    record.removed_start = Coordinate::new(pos.line, cindex);
                    record.removed_end = Coordinate::new(pos.line, cindex + 1);
                    if let Some(line) = self.buffer.line_mut(line_index) {
                        line.remove(cindex);
                    }
                    self.state.cursor.column = self.buffer.column_of(line_index, cindex);
                } else {
                    // Walk back over continuation bytes to the code point start.
                    let mut cend = cindex + 1;
                    if let Some(line) = self.buffer.line(line_index) {
                        while cindex > 0 && utf8::is_continuation(line[cindex].byte) {
                            cindex -= 1;
                        }
                    }
                    record.removed_start = Coordinate::new(pos.line, cindex);
                    record.removed_end = Coordinate::new(pos.line, cend);
                    self.state.cursor.column -= 1;

                    if let Some(line) = self.buffer.line_mut(line_index) {
                        while cindex < line.len() && cend > cindex {
                            cend -= 1;
                            record.removed.push(line.remove(cindex).byte);
                        }
                    }
                }
            }

            self.text_changed = true;
            self.scroll_to_cursor = true;
        }

        self.state.selection_start = self.buffer.sanitize(self.state.selection_start);
        self.state.selection_end = self.buffer.sanitize(self.state.selection_end);
        self.state.order_selection();

        record.after = self.capture_state();
        self.undo.push(record);
        self.verify_internal_state();
    }

    /// Delete the selection, or the code point at the cursor (joining the
    /// next line when the cursor sits at line end).
    pub fn delete(&mut self) {
        debug_assert!(self.buffer.line_count() >= 1);
        if self.read_only {
            return;
        }

        let mut record = UndoRecord::new();
        record.before = self.capture_state();

        if self.state.has_selection() {
            record.removed = self.selected_bytes();
            record.removed_start = self.to_byte_coord(self.state.selection_start);
            record.removed_end = self.to_byte_coord(self.state.selection_end);
            self.delete_selection();
        } else {
            let pos = self.cursor_position();
            self.set_cursor_position(pos);

            if pos.column == self.buffer.line_max_column(pos.line) {
                if pos.line == self.buffer.line_count() - 1 {
                    return;
                }
                record.removed = vec![b'\n'];
                record.removed_start =
                    Coordinate::new(pos.line, self.buffer.line(pos.line).map_or(0, |l| l.len()));
                record.removed_end = Coordinate::new(pos.line + 1, 0);

                let moved = {
                    let Some(next) = self.buffer.line_mut(pos.line + 1) else {
                        return;
                    };
                    std::mem::take(next)
                };
                if let Some(line) = self.buffer.line_mut(pos.line) {
                    line.extend(moved);
                }
                self.remove_lines(pos.line + 1, pos.line + 2);
            } else {
                let line_len = self.buffer.line(pos.line).map_or(0, |l| l.len());
                if line_len == 0 {
                    return;
                }
                let cindex = self.buffer.byte_index(pos);
                debug_assert!(cindex < line_len);

                let span = self
                    .buffer
                    .line(pos.line)
                    .map_or(1, |l| utf8::sequence_length(l[cindex].byte));
                record.removed_start = Coordinate::new(pos.line, cindex);
                record.removed_end = Coordinate::new(pos.line, cindex + span);
                record.removed = self
                    .buffer
                    .text_range_bytes(pos, Coordinate::new(pos.line, pos.column + 1));
                if let Some(line) = self.buffer.line_mut(pos.line) {
                    for _ in 0..span.min(line.len() - cindex) {
                        line.remove(cindex);
                    }
                }

                self.state.selection_start = self.buffer.sanitize(self.state.selection_start);
                self.state.selection_end = self.buffer.sanitize(self.state.selection_end);
                self.state.order_selection();
            }

            self.text_changed = true;
        }

        record.after = self.capture_state();
        self.undo.push(record);
        self.verify_internal_state();
    }

    // ---- clipboard -------------------------------------------------------

    /// Copy the selection, or the whole current line when nothing is
    /// selected. Always allowed, even read-only.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) {
        if self.has_selection() {
            clipboard.set(self.selected_text());
        } else {
            debug_assert!(self.buffer.line_count() >= 1);
            clipboard.set(self.current_line_text());
        }
    }

    /// Cut the selection. Read-only degrades to copy; without a selection
    /// this is a no-op.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) {
        if self.read_only {
            self.copy(clipboard);
            return;
        }
        if !self.has_selection() {
            return;
        }

        let mut record = UndoRecord::new();
        record.before = self.capture_state();
        record.removed = self.selected_bytes();
        record.removed_start = self.to_byte_coord(self.state.selection_start);
        record.removed_end = self.to_byte_coord(self.state.selection_end);

        self.copy(clipboard);
        self.delete_selection();

        record.after = self.capture_state();
        self.undo.push(record);
        self.verify_internal_state();
    }

    /// Paste the clipboard, replacing the selection. One undo record covers
    /// both the removed selection and the inserted text.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        if self.read_only {
            return;
        }
        let Some(text) = clipboard.get() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        self.insert_with_record(&text);
    }

    // ---- undo / redo -----------------------------------------------------

    /// Walk back up to `steps` records.
    pub fn undo(&mut self, steps: u32) {
        let mut remaining = steps;
        while self.can_undo() && remaining > 0 {
            remaining -= 1;
            if let Some(record) = self.undo.take_undo() {
                self.apply_undo(&record);
            }
        }
        self.verify_internal_state();
    }

    /// Walk forward up to `steps` records.
    pub fn redo(&mut self, steps: u32) {
        let mut remaining = steps;
        while self.can_redo() && remaining > 0 {
            remaining -= 1;
            if let Some(record) = self.undo.take_redo() {
                self.apply_redo(&record);
            }
        }
        self.verify_internal_state();
    }

    fn apply_undo(&mut self, record: &UndoRecord) {
        if !record.added.is_empty() {
            let start = self.from_byte_coord(record.added_start);
            let end = self.from_byte_coord(record.added_end);
            self.delete_range(start, end);
        }
        if !record.removed.is_empty() {
            let mut start = self.from_byte_coord(record.removed_start);
            self.insert_text_at(&mut start, &record.removed);
        }
        self.apply_stored_state(&record.before);
        self.scroll_to_cursor = true;
        trace!(target: "editor.ops", index = self.undo.index(), "undo_applied");
    }

    fn apply_redo(&mut self, record: &UndoRecord) {
        if !record.removed.is_empty() {
            let start = self.from_byte_coord(record.removed_start);
            let end = self.from_byte_coord(record.removed_end);
            self.delete_range(start, end);
        }
        if !record.added.is_empty() {
            let mut start = self.from_byte_coord(record.added_start);
            self.insert_text_at(&mut start, &record.added);
        }
        self.apply_stored_state(&record.after);
        self.scroll_to_cursor = true;
        trace!(target: "editor.ops", index = self.undo.index(), "redo_applied");
    }
}
