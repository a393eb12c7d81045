//! The per-frame pass: re-tokenize on change, build the draw list, route
//! commands and mouse input.
//!
//! The render pass must run after all pending text mutations in a frame
//! because it is the trigger that re-tokenizes: `text_changed` is consumed
//! here, the tokenizer runs over the full buffer text, parse errors replace
//! the error markers, and the glyphs are recolored before the draw list is
//! assembled.

use crate::editor::CodeEditor;
use crate::Clipboard;
use edit_input::{accepts_text_input, ClickKind, Command, MouseInput};
use edit_render::builder::{build_frame, EditorView, FrameContext, CURSOR_BLINK_PERIOD_MS};
use edit_render::layout::screen_pos_to_coordinates;
use edit_render::{RenderOutput, TextMetrics, Vec2};
use edit_state::SelectionMode;
use edit_syntax::Tokenize;
use tracing::trace;

/// Per-frame input handed to [`CodeEditor::render`].
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Visible area in pixels.
    pub viewport: Vec2,
    /// Current scroll offsets in pixels.
    pub scroll: Vec2,
    pub focused: bool,
    /// Document-space pointer position while it hovers the editor.
    pub mouse: Option<Vec2>,
    /// Monotonic wall clock in milliseconds, drives the cursor blink.
    pub now_ms: u64,
    /// Global style alpha the palette is modulated with.
    pub alpha: f32,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(800.0, 600.0),
            scroll: Vec2::default(),
            focused: true,
            mouse: None,
            now_ms: 0,
            alpha: 1.0,
        }
    }
}

impl CodeEditor {
    /// Run one frame: consume `text_changed` (tokenize, repopulate error
    /// markers, recolor), then assemble the draw list and scroll requests.
    pub fn render(
        &mut self,
        input: &FrameInput,
        tokenizer: &mut dyn Tokenize,
        metrics: &dyn TextMetrics,
    ) -> RenderOutput {
        self.cursor_position_changed = false;

        if self.text_changed {
            let text = self.buffer.text();
            let program = tokenizer.tokenize(&text);
            self.error_markers.clear();
            for error in &program.errors {
                self.error_markers.add(error.line, &error.message);
            }
            edit_syntax::colorize_program(&mut self.buffer, &program);
            self.text_changed = false;
            trace!(
                target: "editor.frame",
                tokens = program.tokens.len(),
                errors = program.errors.len(),
                "retokenized"
            );
        }

        let blink_elapsed = input.now_ms.saturating_sub(self.blink_start_ms);
        let view = EditorView {
            buffer: &self.buffer,
            state: &self.state,
            error_markers: &self.error_markers,
            breakpoints: &self.breakpoints,
            colorizer_enabled: self.colorizer_enabled,
            overwrite: self.overwrite,
            show_whitespaces: self.show_whitespaces,
        };
        let ctx = FrameContext {
            viewport: input.viewport,
            scroll: input.scroll,
            focused: input.focused,
            mouse: input.mouse,
            cursor_blink_elapsed_ms: blink_elapsed,
            line_spacing: self.line_spacing,
            left_margin: self.left_margin,
            scroll_to_cursor: self.scroll_to_cursor,
            scroll_to_top: self.scroll_to_top,
        };
        let palette = self.palette_base.with_alpha(input.alpha);
        let output = build_frame(&view, &ctx, metrics, &palette);

        self.last_text_start = output.text_start;
        self.last_char_advance_y = metrics.line_height() * self.line_spacing;
        self.last_page_size = (((input.viewport.y - 20.0) / self.last_char_advance_y)
            .floor()
            .max(1.0)) as usize;
        self.scroll_to_cursor = false;
        self.scroll_to_top = false;
        if blink_elapsed > CURSOR_BLINK_PERIOD_MS {
            self.blink_start_ms = input.now_ms;
        }

        output
    }

    /// Lines visible in the last rendered viewport; feeds page motions.
    pub fn page_size(&self) -> usize {
        self.last_page_size
    }

    /// Route mouse state through the click state machine. A plain click
    /// places the cursor (word mode under ctrl), a double click selects the
    /// word, a triple click the line, and dragging moves only the open end
    /// of the selection. Shift/alt-modified mouse input is left alone.
    pub fn handle_mouse(&mut self, mouse: &MouseInput, metrics: &dyn TextMetrics) {
        if mouse.mods.shift() || mouse.mods.alt() {
            return;
        }
        let ctrl = mouse.mods.ctrl();

        let kind = self.click_tracker.classify(mouse, self.double_click_seconds);
        match kind {
            ClickKind::Triple => {
                if !ctrl {
                    let hit = self.hit_test(mouse, metrics);
                    self.state.cursor = hit;
                    self.interactive_start = hit;
                    self.interactive_end = hit;
                    self.selection_mode = SelectionMode::Line;
                    self.set_selection(
                        self.interactive_start,
                        self.interactive_end,
                        self.selection_mode,
                    );
                }
            }
            ClickKind::Double => {
                if !ctrl {
                    let hit = self.hit_test(mouse, metrics);
                    self.state.cursor = hit;
                    self.interactive_start = hit;
                    self.interactive_end = hit;
                    // A double click right after a triple click steps back
                    // down to a plain selection.
                    self.selection_mode = if self.selection_mode == SelectionMode::Line {
                        SelectionMode::Normal
                    } else {
                        SelectionMode::Word
                    };
                    self.set_selection(
                        self.interactive_start,
                        self.interactive_end,
                        self.selection_mode,
                    );
                }
            }
            ClickKind::Single => {
                let hit = self.hit_test(mouse, metrics);
                self.state.cursor = hit;
                self.interactive_start = hit;
                self.interactive_end = hit;
                self.selection_mode = if ctrl {
                    SelectionMode::Word
                } else {
                    SelectionMode::Normal
                };
                self.set_selection(
                    self.interactive_start,
                    self.interactive_end,
                    self.selection_mode,
                );
            }
            ClickKind::None => {
                if mouse.dragging && mouse.down {
                    let hit = self.hit_test(mouse, metrics);
                    self.state.cursor = hit;
                    self.interactive_end = hit;
                    self.set_selection(
                        self.interactive_start,
                        self.interactive_end,
                        self.selection_mode,
                    );
                }
            }
        }
    }

    fn hit_test(&self, mouse: &MouseInput, metrics: &dyn TextMetrics) -> edit_text::Coordinate {
        screen_pos_to_coordinates(
            &self.buffer,
            metrics,
            self.last_text_start,
            self.last_char_advance_y,
            Vec2::new(mouse.position.0, mouse.position.1),
        )
    }

    /// Apply one translated command.
    pub fn apply_command(&mut self, command: Command, clipboard: &mut dyn Clipboard) {
        match command {
            Command::Undo(steps) => self.undo(steps),
            Command::Redo(steps) => self.redo(steps),
            Command::MoveUp { amount, select } => self.move_up(amount, select),
            Command::MoveDown { amount, select } => self.move_down(amount, select),
            Command::MoveLeft {
                amount,
                select,
                word_mode,
            } => self.move_left(amount, select, word_mode),
            Command::MoveRight {
                amount,
                select,
                word_mode,
            } => self.move_right(amount, select, word_mode),
            Command::MoveTop { select } => self.move_top(select),
            Command::MoveBottom { select } => self.move_bottom(select),
            Command::MoveHome { select } => self.move_home(select),
            Command::MoveEnd { select } => self.move_end(select),
            Command::Delete => self.delete(),
            Command::Backspace => self.backspace(),
            Command::ToggleOverwrite => self.toggle_overwrite(),
            Command::Copy => self.copy(clipboard),
            Command::Cut => self.cut(clipboard),
            Command::Paste => self.paste(clipboard),
            Command::SelectAll => self.select_all(),
            Command::EnterCharacter { code_point, shift } => {
                self.enter_character(code_point, shift)
            }
        }
    }

    /// Feed the frame's printable code-point stream, dropping control
    /// characters other than `\n`.
    pub fn handle_text_input(&mut self, code_points: &[u32], shift: bool) {
        if self.is_read_only() {
            return;
        }
        for &code_point in code_points {
            if accepts_text_input(code_point) {
                self.enter_character(code_point, shift);
            }
        }
    }
}
