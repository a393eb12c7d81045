//! Editor state container, text accessors, selection setters, and options.

use edit_input::ClickTracker;
use edit_render::palette::{Palette, PaletteKind};
use edit_state::{Breakpoints, EditorState, ErrorMarkers, SelectionMode, UndoLog};
use edit_text::{word, Buffer, Coordinate, DeletedRange};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Interactive multi-line code editor core. See the crate docs for the
/// operation contract.
pub struct CodeEditor {
    pub(crate) buffer: Buffer,
    pub(crate) state: EditorState,
    pub(crate) interactive_start: Coordinate,
    pub(crate) interactive_end: Coordinate,
    pub(crate) selection_mode: SelectionMode,
    pub(crate) undo: UndoLog,
    pub(crate) error_markers: ErrorMarkers,
    pub(crate) breakpoints: Breakpoints,

    pub(crate) palette_base: Palette,
    pub(crate) overwrite: bool,
    pub(crate) read_only: bool,
    pub(crate) colorizer_enabled: bool,
    pub(crate) show_whitespaces: bool,

    pub(crate) text_changed: bool,
    pub(crate) cursor_position_changed: bool,
    pub(crate) scroll_to_cursor: bool,
    pub(crate) scroll_to_top: bool,

    pub(crate) click_tracker: ClickTracker,
    pub(crate) double_click_seconds: f64,
    pub(crate) line_spacing: f32,
    pub(crate) left_margin: f32,
    pub(crate) blink_start_ms: u64,

    // Layout cache from the previous frame, consumed by mouse hit-testing
    // and page-size dependent key bindings.
    pub(crate) last_text_start: f32,
    pub(crate) last_char_advance_y: f32,
    pub(crate) last_page_size: usize,
}

impl Default for CodeEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeEditor {
    pub fn new() -> Self {
        Self {
            buffer: Buffer::new(),
            state: EditorState::new(),
            interactive_start: Coordinate::origin(),
            interactive_end: Coordinate::origin(),
            selection_mode: SelectionMode::Normal,
            undo: UndoLog::new(),
            error_markers: ErrorMarkers::new(),
            breakpoints: Breakpoints::new(),
            palette_base: Palette::dark(),
            overwrite: false,
            read_only: false,
            colorizer_enabled: true,
            show_whitespaces: false,
            text_changed: false,
            cursor_position_changed: false,
            scroll_to_cursor: false,
            scroll_to_top: false,
            click_tracker: ClickTracker::new(),
            double_click_seconds: 0.35,
            line_spacing: 1.0,
            left_margin: 10.0,
            blink_start_ms: 0,
            last_text_start: 20.0,
            last_char_advance_y: 18.0,
            last_page_size: 30,
        }
    }

    // ---- text ------------------------------------------------------------

    /// Replace the document. Resets cursor, selection, and the undo log.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.reset_state();
        self.undo.clear();
        self.text_changed = true;
        self.scroll_to_top = true;
        trace!(target: "editor.ops", bytes = text.len(), lines = self.buffer.line_count(), "set_text");
    }

    /// Replace the document from pre-split lines. Resets like `set_text`.
    pub fn set_text_lines(&mut self, lines: &[String]) {
        self.buffer.set_text_lines(lines);
        self.reset_state();
        self.undo.clear();
        self.text_changed = true;
        self.scroll_to_top = true;
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn text_lines(&self) -> Vec<String> {
        self.buffer.text_lines()
    }

    pub fn selected_text(&self) -> String {
        self.buffer
            .text_range(self.state.selection_start, self.state.selection_end)
    }

    pub fn current_line_text(&self) -> String {
        let line = self.cursor_position().line;
        self.buffer.line_text(line)
    }

    pub fn total_lines(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn word_under_cursor(&self) -> String {
        word::word_at(&self.buffer, self.cursor_position())
    }

    pub fn word_at(&self, at: Coordinate) -> String {
        word::word_at(&self.buffer, self.buffer.sanitize(at))
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    // ---- mode flags ------------------------------------------------------

    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }
    pub fn toggle_overwrite(&mut self) {
        self.overwrite = !self.overwrite;
    }
    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
    pub fn toggle_read_only(&mut self) {
        self.read_only = !self.read_only;
    }
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_colorizer_enabled(&mut self, enabled: bool) {
        self.colorizer_enabled = enabled;
    }
    pub fn toggle_colorizer_enabled(&mut self) {
        self.colorizer_enabled = !self.colorizer_enabled;
    }
    pub fn is_colorizer_enabled(&self) -> bool {
        self.colorizer_enabled
    }

    pub fn set_show_whitespaces(&mut self, show: bool) {
        self.show_whitespaces = show;
    }
    pub fn toggle_show_whitespaces(&mut self) {
        self.show_whitespaces = !self.show_whitespaces;
    }
    pub fn is_showing_whitespaces(&self) -> bool {
        self.show_whitespaces
    }

    pub fn is_text_changed(&self) -> bool {
        self.text_changed
    }

    pub fn is_cursor_position_changed(&self) -> bool {
        self.cursor_position_changed
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette_base = palette;
    }

    pub fn set_palette_kind(&mut self, kind: PaletteKind) {
        self.palette_base = Palette::of_kind(kind);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette_base
    }

    /// Apply loaded options onto the editor.
    pub fn apply_options(&mut self, options: &edit_config::EditorOptions) {
        self.set_tab_size(options.effective_tab_size);
        self.show_whitespaces = options.file.editor.show_whitespaces;
        self.colorizer_enabled = options.file.editor.colorizer;
        self.read_only = options.file.editor.read_only;
        self.double_click_seconds = options.effective_double_click_seconds;
        self.set_palette_kind(match options.file.display.palette {
            edit_config::PaletteName::Dark => PaletteKind::Dark,
            edit_config::PaletteName::Light => PaletteKind::Light,
            edit_config::PaletteName::RetroBlue => PaletteKind::RetroBlue,
        });
    }

    // ---- tab size --------------------------------------------------------

    pub fn tab_size(&self) -> usize {
        self.buffer.tab_size()
    }

    /// Change the tab size, keeping cursor and selection anchored to the
    /// same bytes rather than the same visual columns.
    pub fn set_tab_size(&mut self, tab_size: usize) {
        if tab_size.clamp(edit_text::MIN_TAB_SIZE, edit_text::MAX_TAB_SIZE) == self.buffer.tab_size()
        {
            return;
        }
        let cursor_index = self.buffer.byte_index(self.state.cursor);
        let start_index = self.buffer.byte_index(self.state.selection_start);
        let end_index = self.buffer.byte_index(self.state.selection_end);

        self.buffer.set_tab_size(tab_size);

        self.state.cursor.column = self.buffer.column_of(self.state.cursor.line, cursor_index);
        self.state.selection_start.column = self
            .buffer
            .column_of(self.state.selection_start.line, start_index);
        self.state.selection_end.column = self
            .buffer
            .column_of(self.state.selection_end.line, end_index);
    }

    // ---- cursor and selection -------------------------------------------

    /// The cursor clamped into the buffer.
    pub fn cursor_position(&self) -> Coordinate {
        self.buffer.sanitize(self.state.cursor)
    }

    pub fn set_cursor_position(&mut self, position: Coordinate) {
        let new_pos = self.buffer.sanitize(position);
        if self.state.cursor != new_pos {
            self.state.cursor = new_pos;
            self.cursor_position_changed = true;
            self.scroll_to_cursor = true;
        }
    }

    pub fn selection_start(&self) -> Coordinate {
        self.state.selection_start
    }

    pub fn selection_end(&self) -> Coordinate {
        self.state.selection_end
    }

    pub fn has_selection(&self) -> bool {
        self.state.has_selection()
    }

    pub fn set_selection_start(&mut self, position: Coordinate) {
        self.state.selection_start = self.buffer.sanitize(position);
        self.state.order_selection();
    }

    pub fn set_selection_end(&mut self, position: Coordinate) {
        self.state.selection_end = self.buffer.sanitize(position);
        self.state.order_selection();
    }

    /// Set the selection, rounding per `mode`: exact coordinates, word
    /// boundaries, or whole lines.
    pub fn set_selection(&mut self, start: Coordinate, end: Coordinate, mode: SelectionMode) {
        let old_start = self.state.selection_start;
        let old_end = self.state.selection_end;

        self.state.selection_start = self.buffer.sanitize(start);
        self.state.selection_end = self.buffer.sanitize(end);
        self.state.order_selection();

        match mode {
            SelectionMode::Normal => {}
            SelectionMode::Word => {
                self.state.selection_start =
                    word::find_word_start(&self.buffer, self.state.selection_start);
                if !word::is_on_word_boundary(
                    &self.buffer,
                    self.state.selection_end,
                    self.colorizer_enabled,
                ) {
                    let start_of_end =
                        word::find_word_start(&self.buffer, self.state.selection_end);
                    self.state.selection_end = word::find_word_end(&self.buffer, start_of_end);
                }
            }
            SelectionMode::Line => {
                let end_line = self.state.selection_end.line;
                self.state.selection_start = Coordinate::new(self.state.selection_start.line, 0);
                self.state.selection_end =
                    Coordinate::new(end_line, self.buffer.line_max_column(end_line));
            }
        }

        if self.state.selection_start != old_start || self.state.selection_end != old_end {
            self.cursor_position_changed = true;
        }
    }

    pub fn select_all(&mut self) {
        self.set_selection(
            Coordinate::origin(),
            Coordinate::new(self.buffer.line_count(), 0),
            SelectionMode::Normal,
        );
    }

    pub fn select_word_under_cursor(&mut self) {
        let cursor = self.cursor_position();
        self.set_selection(
            word::find_word_start(&self.buffer, cursor),
            word::find_word_end(&self.buffer, cursor),
            SelectionMode::Normal,
        );
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Coordinate::origin(), Coordinate::origin(), SelectionMode::Normal);
    }

    // ---- markers and breakpoints ----------------------------------------

    pub fn error_markers(&self) -> &ErrorMarkers {
        &self.error_markers
    }

    pub fn set_error_markers(&mut self, markers: BTreeMap<u32, String>) {
        self.error_markers.set(markers);
    }

    pub fn add_error_marker(&mut self, line_number: u32, message: &str) {
        self.error_markers.add(line_number, message);
    }

    pub fn clear_error_markers(&mut self) {
        self.error_markers.clear();
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn set_breakpoints(&mut self, lines: BTreeSet<u32>) {
        self.breakpoints.set(lines);
    }

    pub fn add_breakpoint(&mut self, line_number: u32) -> bool {
        self.breakpoints.add(line_number)
    }

    pub fn remove_breakpoint(&mut self, line_number: u32) -> bool {
        self.breakpoints.remove(line_number)
    }

    /// Flip the breakpoint on a line; returns the resulting state.
    pub fn toggle_breakpoint(&mut self, line_number: u32) -> bool {
        self.breakpoints.toggle(line_number)
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    // ---- undo accessors --------------------------------------------------

    pub fn can_undo(&self) -> bool {
        !self.read_only && self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.read_only && self.undo.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn undo_index(&self) -> usize {
        self.undo.index()
    }

    // ---- shared internals ------------------------------------------------

    pub(crate) fn reset_state(&mut self) {
        self.state = EditorState::new();
        self.interactive_start = Coordinate::origin();
        self.interactive_end = Coordinate::origin();
    }

    /// Insert an empty line and renumber line-keyed markers.
    pub(crate) fn insert_line(&mut self, index: usize) {
        self.buffer.insert_line(index);
        self.error_markers.on_line_inserted(index);
        self.breakpoints.on_line_inserted(index);
    }

    /// Remove the half-open line range and renumber everything keyed or
    /// anchored by line: markers, breakpoints, and the selection.
    pub(crate) fn remove_lines(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end);
        let count = end - start;
        self.error_markers.on_lines_removed(start, end);
        self.breakpoints.on_lines_removed(start, end);
        self.buffer.remove_lines(start, end);

        for selection in [&mut self.state.selection_start, &mut self.state.selection_end] {
            if selection.line >= start {
                selection.line = selection.line.saturating_sub(count);
            }
        }
        self.state.order_selection();
        self.text_changed = true;
    }

    /// Buffer-level range deletion plus the selection/marker fixups the raw
    /// primitive cannot do itself. Cursor and selection are re-sanitized
    /// afterwards so no stale coordinate survives.
    pub(crate) fn delete_range(&mut self, start: Coordinate, end: Coordinate) {
        let start = self.buffer.sanitize(start);
        let end = self.buffer.sanitize(end);
        let Some(report) = self.buffer.delete_range(start, end) else {
            return;
        };
        self.apply_deletion_fixups(&report);
        self.text_changed = true;
    }

    fn apply_deletion_fixups(&mut self, report: &DeletedRange) {
        if report.same_line() {
            let width = report.end_column - report.start_column;
            for selection in [&mut self.state.selection_start, &mut self.state.selection_end] {
                if selection.line == report.start.line && selection.column > report.start_column {
                    if selection.column <= report.end_column {
                        selection.column = report.start_column;
                    } else {
                        selection.column -= width;
                    }
                }
            }
        } else {
            let (removed_start, removed_end) = report.removed_lines;
            let count = removed_end - removed_start;
            self.error_markers.on_lines_removed(removed_start, removed_end);
            self.breakpoints.on_lines_removed(removed_start, removed_end);
            for selection in [&mut self.state.selection_start, &mut self.state.selection_end] {
                if selection.line >= removed_start {
                    selection.line = selection.line.saturating_sub(count);
                }
            }
        }

        self.state.selection_start = self.buffer.sanitize(self.state.selection_start);
        self.state.selection_end = self.buffer.sanitize(self.state.selection_end);
        self.state.order_selection();
        self.state.cursor = self.buffer.sanitize(self.state.cursor);
    }

    /// Insert raw bytes at `where_`, renumbering markers for any new lines.
    pub(crate) fn insert_text_at(&mut self, where_: &mut Coordinate, bytes: &[u8]) -> usize {
        let start_line = where_.line;
        let added = self.buffer.insert_text_at(where_, bytes);
        for _ in 0..added {
            self.error_markers.on_line_inserted(start_line + 1);
            self.breakpoints.on_line_inserted(start_line + 1);
        }
        if !bytes.is_empty() {
            self.text_changed = true;
        }
        added
    }

    pub(crate) fn verify_internal_state(&self) {
        debug_assert!(self.buffer.line_count() >= 1);
        debug_assert!(self.state.selection_start <= self.state.selection_end);
        debug_assert!(self.state.selection_start.line < self.buffer.line_count());
        debug_assert!(self.state.selection_end.line < self.buffer.line_count());
        debug_assert!(self.cursor_position().line < self.buffer.line_count());
        debug_assert!(self.undo.index() <= self.undo.len());
    }

    // ---- diagnostics -----------------------------------------------------

    /// Multi-line description of the editor state, for logs and tests.
    pub fn dump(&self) -> String {
        let cursor = self.cursor_position();
        let mut out = String::new();
        out.push_str("State:\n");
        out.push_str(&format!(
            "Cursor position: {}, {}\n",
            self.state.cursor.line, self.state.cursor.column
        ));
        out.push_str(&format!(
            "Actual cursor position: {}, {}\n",
            cursor.line, cursor.column
        ));
        out.push_str(&format!(
            "Selection: {}, {} -> {}, {}\n",
            self.state.selection_start.line,
            self.state.selection_start.column,
            self.state.selection_end.line,
            self.state.selection_end.column
        ));
        out.push_str(&format!("Has selection: {}\n", self.has_selection()));

        out.push_str("\nOptions:\n");
        out.push_str(&format!("Tab size: {}\n", self.tab_size()));
        out.push_str(&format!("Overwrite: {}\n", self.overwrite));
        out.push_str(&format!("Read only: {}\n", self.read_only));
        out.push_str(&format!("Show whitespaces: {}\n", self.show_whitespaces));

        out.push_str("\nText:\n");
        out.push_str(&format!("Total lines: {}\n", self.total_lines()));
        out.push_str(&format!("\"{}\"\n", self.text()));

        out.push_str("\nError markers:\n");
        if self.error_markers.is_empty() {
            out.push_str("None\n");
        }
        for (line, message) in self.error_markers.iter() {
            out.push_str(&format!("{line:02}: {message}\n"));
        }

        out.push_str("\nBreakpoints:\n");
        if self.breakpoints.is_empty() {
            out.push_str("None\n");
        }
        for line in self.breakpoints.iter() {
            out.push_str(&format!("{line:02}\n"));
        }

        out.push_str("\nUndo/Redo:\n");
        out.push_str(&format!("Can undo: {}\n", self.can_undo()));
        out.push_str(&format!("Can redo: {}\n", self.can_redo()));
        out.push_str(&format!("Undo index: {}\n", self.undo.index()));
        out.push_str(&format!("Undo records: {}\n", self.undo.len()));
        out
    }
}
