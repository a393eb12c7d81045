//! Pixel layout math shared by the builder and mouse hit-testing.
//!
//! Tab stops are pixel-aligned to multiples of `tab_size * space_width`, so
//! a proportional font still produces stable columns. All positions are in
//! document space.

use crate::{TextMetrics, Vec2};
use edit_text::{utf8, Buffer, Coordinate};

/// Pixel x of the next tab stop after `x`.
#[inline]
pub fn next_tab_stop(x: f32, tab_size: usize, space_width: f32) -> f32 {
    let tab_width = tab_size as f32 * space_width;
    (1.0 + ((1.0 + x) / tab_width).floor()) * tab_width
}

/// Horizontal pixel distance from the line start to `from` (exclusive).
pub fn text_distance_to_line_start(
    buffer: &Buffer,
    metrics: &dyn TextMetrics,
    from: Coordinate,
) -> f32 {
    let Some(line) = buffer.line(from.line) else {
        return 0.0;
    };
    let space_width = metrics.text_width(" ");
    let target = buffer.byte_index(from);

    let mut distance = 0.0f32;
    let mut index = 0usize;
    while index < line.len() && index < target {
        if line[index].byte == b'\t' {
            distance = next_tab_stop(distance, buffer.tab_size(), space_width);
            index += 1;
        } else {
            let len = utf8::sequence_length(line[index].byte).min(line.len() - index);
            let bytes: Vec<u8> = line[index..index + len].iter().map(|g| g.byte).collect();
            distance += metrics.text_width(&edit_text::bytes_to_string(bytes));
            index += len;
        }
    }
    distance
}

/// Map a document-space pixel position onto the nearest buffer coordinate.
/// The hit point lands on a glyph when the pixel x is past the glyph's
/// half-width, mirroring caret placement in the original editor.
pub fn screen_pos_to_coordinates(
    buffer: &Buffer,
    metrics: &dyn TextMetrics,
    text_start: f32,
    char_advance_y: f32,
    local: Vec2,
) -> Coordinate {
    let line_index = ((local.y / char_advance_y).floor()).max(0.0) as usize;
    let space_width = metrics.text_width(" ");

    let mut column = 0usize;
    if let Some(line) = buffer.line(line_index) {
        let mut index = 0usize;
        let mut x = 0.0f32;
        while index < line.len() {
            if line[index].byte == b'\t' {
                let next_x = next_tab_stop(x, buffer.tab_size(), space_width);
                let width = next_x - x;
                if text_start + x + width * 0.5 > local.x {
                    break;
                }
                x = next_x;
                column = (column / buffer.tab_size()) * buffer.tab_size() + buffer.tab_size();
                index += 1;
            } else {
                let len = utf8::sequence_length(line[index].byte).min(line.len() - index);
                let bytes: Vec<u8> = line[index..index + len].iter().map(|g| g.byte).collect();
                let width = metrics.text_width(&edit_text::bytes_to_string(bytes));
                if text_start + x + width * 0.5 > local.x {
                    break;
                }
                x += width;
                column += 1;
                index += len;
            }
        }
    }

    buffer.sanitize(Coordinate::new(line_index, column))
}
