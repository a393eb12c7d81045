//! Frame assembly: editor snapshot in, ordered draw list out.

use crate::layout::{next_tab_stop, text_distance_to_line_start};
use crate::palette::Palette;
use crate::{DrawCommand, ErrorTooltip, RenderOutput, ScrollRequest, TextMetrics, Vec2};
use edit_state::{Breakpoints, EditorState, ErrorMarkers};
use edit_text::{utf8, Buffer, ColorTag, Coordinate};
use tracing::trace;

const WHITESPACE_ARROW_COLOR: u32 = 0x9090_9090;
const WHITESPACE_DOT_COLOR: u32 = 0x8080_8080;
/// Cursor is drawn during the second half of each 800 ms blink cycle.
pub const CURSOR_BLINK_ON_MS: u64 = 400;
pub const CURSOR_BLINK_PERIOD_MS: u64 = 800;
/// Vertical scroll margin in lines, horizontal in pixels.
const SCROLL_MARGIN_LINES: usize = 4;
const SCROLL_MARGIN_PX: f32 = 4.0;

/// Borrowed snapshot of everything the builder reads.
pub struct EditorView<'a> {
    pub buffer: &'a Buffer,
    pub state: &'a EditorState,
    pub error_markers: &'a ErrorMarkers,
    pub breakpoints: &'a Breakpoints,
    pub colorizer_enabled: bool,
    pub overwrite: bool,
    pub show_whitespaces: bool,
}

/// Per-frame inputs from the GUI layer.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Visible area in pixels.
    pub viewport: Vec2,
    /// Current scroll offsets in pixels.
    pub scroll: Vec2,
    pub focused: bool,
    /// Document-space pointer position, when the pointer is over the editor.
    pub mouse: Option<Vec2>,
    /// Milliseconds since the blink cycle restarted.
    pub cursor_blink_elapsed_ms: u64,
    pub line_spacing: f32,
    pub left_margin: f32,
    /// The cursor moved since the last frame and must be scrolled into view.
    pub scroll_to_cursor: bool,
    /// The document was replaced; jump back to the top.
    pub scroll_to_top: bool,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(800.0, 600.0),
            scroll: Vec2::default(),
            focused: true,
            mouse: None,
            cursor_blink_elapsed_ms: CURSOR_BLINK_PERIOD_MS,
            line_spacing: 1.0,
            left_margin: 10.0,
            scroll_to_cursor: false,
            scroll_to_top: false,
        }
    }
}

fn glyph_color(view: &EditorView, palette: &Palette, tag: ColorTag) -> u32 {
    if view.colorizer_enabled {
        palette.color(tag)
    } else {
        palette.color(ColorTag::Default)
    }
}

/// Assemble the draw list for one frame.
pub fn build_frame(
    view: &EditorView,
    ctx: &FrameContext,
    metrics: &dyn TextMetrics,
    palette: &Palette,
) -> RenderOutput {
    let buffer = view.buffer;
    let state = view.state;
    let advance = Vec2::new(
        metrics.text_width("#"),
        metrics.line_height() * ctx.line_spacing,
    );
    let space_width = metrics.text_width(" ");
    let line_count = buffer.line_count();

    let text_start = metrics.text_width(&format!(" {line_count} ")) + ctx.left_margin;

    let mut out = RenderOutput {
        text_start,
        ..RenderOutput::default()
    };

    let first_line = (ctx.scroll.y / advance.y).floor().max(0.0) as usize;
    let last_line = (((ctx.scroll.y + ctx.viewport.y) / advance.y).floor() as usize)
        .min(line_count.saturating_sub(1));

    let mut longest = text_start;

    for line_index in first_line..=last_line {
        let line_y = line_index as f32 * advance.y;
        let text_pos = Vec2::new(text_start, line_y);
        let line = &buffer.lines()[line_index];
        let line_start_coord = Coordinate::new(line_index, 0);
        let line_end_coord = Coordinate::new(line_index, buffer.line_max_column(line_index));

        longest = longest
            .max(text_start + text_distance_to_line_start(buffer, metrics, line_end_coord));

        // Selection band.
        debug_assert!(state.selection_start <= state.selection_end);
        let sel_start_x = (state.selection_start <= line_end_coord).then(|| {
            if state.selection_start > line_start_coord {
                text_distance_to_line_start(buffer, metrics, state.selection_start)
            } else {
                0.0
            }
        });
        let sel_end_x = (state.selection_end > line_start_coord).then(|| {
            let clamped = state.selection_end.min(line_end_coord);
            let mut x = text_distance_to_line_start(buffer, metrics, clamped);
            if state.selection_end.line > line_index {
                x += advance.x;
            }
            x
        });
        if let (Some(sx), Some(ex)) = (sel_start_x, sel_end_x) {
            if sx < ex {
                out.commands.push(DrawCommand::RectFilled {
                    min: Vec2::new(text_start + sx, line_y),
                    max: Vec2::new(text_start + ex, line_y + advance.y),
                    color: palette.color(ColorTag::Selection),
                });
            }
        }

        // Full-width bands start at the visible left edge.
        let band_min = Vec2::new(ctx.scroll.x, line_y);
        let band_max = Vec2::new(ctx.scroll.x + ctx.viewport.x, line_y + advance.y);
        let line_number = line_index as u32 + 1;

        if view.breakpoints.contains(line_number) {
            out.commands.push(DrawCommand::RectFilled {
                min: band_min,
                max: band_max,
                color: palette.color(ColorTag::Breakpoint),
            });
        }

        if let Some(message) = view.error_markers.get(line_number) {
            out.commands.push(DrawCommand::RectFilled {
                min: band_min,
                max: band_max,
                color: palette.color(ColorTag::ErrorMarker),
            });
            if let Some(mouse) = ctx.mouse {
                let inside = mouse.x >= band_min.x
                    && mouse.x <= band_max.x
                    && mouse.y >= band_min.y
                    && mouse.y <= band_max.y;
                if inside {
                    out.tooltip = Some(ErrorTooltip {
                        line_number,
                        message: message.to_string(),
                    });
                }
            }
        }

        // Right-aligned gutter number.
        let number_text = format!("{line_number}  ");
        let number_width = metrics.text_width(&number_text);
        out.commands.push(DrawCommand::Text {
            pos: Vec2::new(text_start - number_width, line_y),
            color: palette.color(ColorTag::LineNumber),
            text: number_text,
        });

        if state.cursor.line == line_index {
            // Highlight the cursor's line while nothing is selected.
            if !state.has_selection() {
                let fill = if ctx.focused {
                    ColorTag::CurrentLineFill
                } else {
                    ColorTag::CurrentLineFillInactive
                };
                out.commands.push(DrawCommand::RectFilled {
                    min: band_min,
                    max: band_max,
                    color: palette.color(fill),
                });
                out.commands.push(DrawCommand::RectOutline {
                    min: band_min,
                    max: band_max,
                    color: palette.color(ColorTag::CurrentLineEdge),
                });
            }

            if ctx.focused && ctx.cursor_blink_elapsed_ms > CURSOR_BLINK_ON_MS {
                let cindex = buffer.byte_index(state.cursor);
                let cx = text_distance_to_line_start(buffer, metrics, state.cursor);
                let mut width = 1.0f32;
                if view.overwrite && cindex < line.len() {
                    if line[cindex].byte == b'\t' {
                        width = next_tab_stop(cx, buffer.tab_size(), space_width) - cx;
                    } else {
                        let len = utf8::sequence_length(line[cindex].byte).min(line.len() - cindex);
                        let bytes: Vec<u8> =
                            line[cindex..cindex + len].iter().map(|g| g.byte).collect();
                        width = metrics.text_width(&edit_text::bytes_to_string(bytes));
                    }
                }
                out.commands.push(DrawCommand::RectFilled {
                    min: Vec2::new(text_start + cx, line_y),
                    max: Vec2::new(text_start + cx + width, line_y + advance.y),
                    color: palette.color(ColorTag::Cursor),
                });
            }
        }

        // Colorized text runs, flushed on color change and around whitespace.
        let mut run = Vec::<u8>::new();
        let mut run_color = line
            .first()
            .map(|g| glyph_color(view, palette, g.color))
            .unwrap_or_else(|| palette.color(ColorTag::Default));
        let mut offset_x = 0.0f32;
        let mut index = 0usize;
        while index < line.len() {
            let glyph = line[index];
            let color = glyph_color(view, palette, glyph.color);

            if (color != run_color || glyph.byte == b'\t' || glyph.byte == b' ')
                && !run.is_empty()
            {
                let text = edit_text::bytes_to_string(std::mem::take(&mut run));
                let width = metrics.text_width(&text);
                out.commands.push(DrawCommand::Text {
                    pos: Vec2::new(text_pos.x + offset_x, text_pos.y),
                    color: run_color,
                    text,
                });
                offset_x += width;
            }
            run_color = color;

            if glyph.byte == b'\t' {
                let old_x = offset_x;
                offset_x = next_tab_stop(offset_x, buffer.tab_size(), space_width);
                index += 1;

                if view.show_whitespaces {
                    let s = metrics.font_size();
                    let x1 = text_pos.x + old_x + 1.0;
                    let x2 = text_pos.x + offset_x - 1.0;
                    let y = text_pos.y + s * 0.5;
                    let tip = Vec2::new(x2, y);
                    out.commands.push(DrawCommand::LineSegment {
                        from: Vec2::new(x1, y),
                        to: tip,
                        color: WHITESPACE_ARROW_COLOR,
                    });
                    out.commands.push(DrawCommand::LineSegment {
                        from: tip,
                        to: Vec2::new(x2 - s * 0.2, y - s * 0.2),
                        color: WHITESPACE_ARROW_COLOR,
                    });
                    out.commands.push(DrawCommand::LineSegment {
                        from: tip,
                        to: Vec2::new(x2 - s * 0.2, y + s * 0.2),
                        color: WHITESPACE_ARROW_COLOR,
                    });
                }
            } else if glyph.byte == b' ' {
                if view.show_whitespaces {
                    let s = metrics.font_size();
                    out.commands.push(DrawCommand::Dot {
                        center: Vec2::new(
                            text_pos.x + offset_x + space_width * 0.5,
                            text_pos.y + s * 0.5,
                        ),
                        radius: 1.5,
                        color: WHITESPACE_DOT_COLOR,
                    });
                }
                offset_x += space_width;
                index += 1;
            } else {
                let len = utf8::sequence_length(glyph.byte).min(line.len() - index);
                for g in &line[index..index + len] {
                    run.push(g.byte);
                }
                index += len;
            }
        }
        if !run.is_empty() {
            out.commands.push(DrawCommand::Text {
                pos: Vec2::new(text_pos.x + offset_x, text_pos.y),
                color: run_color,
                text: edit_text::bytes_to_string(run),
            });
        }
    }

    out.content_size = Vec2::new(longest + 2.0, line_count as f32 * advance.y);
    out.scroll = scroll_request(view, ctx, metrics, advance, text_start);

    trace!(
        target: "render.build",
        lines = last_line - first_line + 1,
        commands = out.commands.len(),
        "frame_built"
    );
    out
}

/// Scroll offsets needed to honor scroll-to-top / keep-cursor-visible.
fn scroll_request(
    view: &EditorView,
    ctx: &FrameContext,
    metrics: &dyn TextMetrics,
    advance: Vec2,
    text_start: f32,
) -> ScrollRequest {
    if ctx.scroll_to_top {
        return ScrollRequest {
            x: None,
            y: Some(0.0),
        };
    }
    if !ctx.scroll_to_cursor {
        return ScrollRequest::default();
    }

    let buffer = view.buffer;
    let cursor = buffer.sanitize(view.state.cursor);
    let distance = text_distance_to_line_start(buffer, metrics, cursor);

    let top = 1 + (ctx.scroll.y / advance.y).ceil() as usize;
    let bottom = ((ctx.scroll.y + ctx.viewport.y) / advance.y).ceil() as usize;

    let mut request = ScrollRequest::default();
    if cursor.line < top {
        request.y = Some(((cursor.line.saturating_sub(1)) as f32 * advance.y).max(0.0));
    } else if cursor.line + SCROLL_MARGIN_LINES > bottom {
        let y = (cursor.line + SCROLL_MARGIN_LINES) as f32 * advance.y - ctx.viewport.y;
        request.y = Some(y.max(0.0));
    }

    let cursor_x = distance + text_start;
    if cursor_x < ctx.scroll.x + SCROLL_MARGIN_PX {
        request.x = Some((cursor_x - SCROLL_MARGIN_PX).max(0.0));
    } else if cursor_x > ctx.scroll.x + ctx.viewport.x - SCROLL_MARGIN_PX {
        request.x = Some((cursor_x + SCROLL_MARGIN_PX - ctx.viewport.x).max(0.0));
    }
    request
}
