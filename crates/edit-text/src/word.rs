//! Word boundary walks over a buffer line.
//!
//! These operate on a `Buffer` + `Coordinate` pair and are free of editor
//! state. "Word" here is color-aware: a run of glyphs sharing a color tag
//! bounded by whitespace, which makes double-click selection follow token
//! boundaries once the colorizer has run.

use crate::{Buffer, Coordinate, utf8};

/// ASCII whitespace as the original classifier sees it.
#[inline]
pub const fn is_space_byte(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Space or tab only.
#[inline]
pub const fn is_blank_byte(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t')
}

#[inline]
pub const fn is_alphanumeric_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Walk back from `from` to the start of the word under it: first skip
/// whitespace, then run left while the color tag stays stable.
pub fn find_word_start(buffer: &Buffer, from: Coordinate) -> Coordinate {
    let Some(line) = buffer.line(from.line) else {
        return from;
    };
    let mut cindex = buffer.byte_index(from);
    if cindex >= line.len() {
        return from;
    }

    while cindex > 0 && is_space_byte(line[cindex].byte) {
        cindex -= 1;
    }

    let color = line[cindex].color;
    while cindex > 0 {
        let glyph = line[cindex];
        if !utf8::is_continuation(glyph.byte) {
            if glyph.byte <= 32 && is_space_byte(glyph.byte) {
                cindex += 1;
                break;
            }
            if color != line[cindex - 1].color {
                break;
            }
        }
        cindex -= 1;
    }

    Coordinate::new(from.line, buffer.column_of(from.line, cindex))
}

/// Walk forward from `from` past the word under it. Runs of trailing
/// whitespace after the word are consumed so the result lands on the next
/// non-space glyph (or line end).
pub fn find_word_end(buffer: &Buffer, from: Coordinate) -> Coordinate {
    let Some(line) = buffer.line(from.line) else {
        return from;
    };
    let mut cindex = buffer.byte_index(from);
    if cindex >= line.len() {
        return from;
    }

    let started_on_space = is_space_byte(line[cindex].byte);
    let color = line[cindex].color;
    while cindex < line.len() {
        let glyph = line[cindex];
        if color != glyph.color {
            break;
        }
        if started_on_space != is_space_byte(glyph.byte) {
            if is_space_byte(glyph.byte) {
                while cindex < line.len() && is_space_byte(line[cindex].byte) {
                    cindex += 1;
                }
            }
            break;
        }
        cindex += utf8::sequence_length(glyph.byte);
    }

    Coordinate::new(from.line, buffer.column_of(from.line, cindex))
}

/// Advance to the first glyph of the next alphanumeric run, skipping the
/// run under `from` and any separators, crossing line boundaries.
pub fn find_next_word(buffer: &Buffer, from: Coordinate) -> Coordinate {
    let mut at = from;
    if at.line >= buffer.line_count() {
        return at;
    }

    let mut cindex = buffer.byte_index(from);
    let mut is_word = false;
    let mut skip = false;
    if let Some(line) = buffer.line(at.line) {
        if cindex < line.len() {
            is_word = is_alphanumeric_byte(line[cindex].byte);
            skip = is_word;
        }
    }

    while !is_word || skip {
        if at.line >= buffer.line_count() {
            let last = buffer.line_count() - 1;
            return Coordinate::new(last, buffer.line_max_column(last));
        }

        let line = &buffer.lines()[at.line];
        if cindex < line.len() {
            is_word = is_alphanumeric_byte(line[cindex].byte);
            if is_word && !skip {
                return Coordinate::new(at.line, buffer.column_of(at.line, cindex));
            }
            if !is_word {
                skip = false;
            }
            cindex += 1;
        } else {
            cindex = 0;
            at.line += 1;
            skip = false;
            is_word = false;
        }
    }

    at
}

/// True when `at` sits on a word boundary. With the colorizer active the
/// boundary is a color-tag change; otherwise a whitespace-class flip.
pub fn is_on_word_boundary(buffer: &Buffer, at: Coordinate, color_aware: bool) -> bool {
    if at.line >= buffer.line_count() || at.column == 0 {
        return true;
    }
    let line = &buffer.lines()[at.line];
    let cindex = buffer.byte_index(at);
    if cindex >= line.len() || cindex == 0 {
        return true;
    }

    if color_aware {
        line[cindex].color != line[cindex - 1].color
    } else {
        is_space_byte(line[cindex].byte) != is_space_byte(line[cindex - 1].byte)
    }
}

/// The word under `at` as text.
pub fn word_at(buffer: &Buffer, at: Coordinate) -> String {
    let start = find_word_start(buffer, at);
    let end = find_word_end(buffer, at);

    let istart = buffer.byte_index(start);
    let iend = buffer.byte_index(end);
    let Some(line) = buffer.line(at.line) else {
        return String::new();
    };
    let bytes: Vec<u8> = line[istart.min(line.len())..iend.min(line.len())]
        .iter()
        .map(|g| g.byte)
        .collect();
    crate::bytes_to_string(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_start_and_end_around_plain_word() {
        let b = Buffer::from_text("foo bar baz");
        let start = find_word_start(&b, Coordinate::new(0, 5));
        assert_eq!(start, Coordinate::new(0, 4));
        let end = find_word_end(&b, Coordinate::new(0, 4));
        // Trailing separator space is consumed by the end walk.
        assert_eq!(end, Coordinate::new(0, 8));
    }

    #[test]
    fn word_start_from_trailing_space_backs_into_word() {
        let b = Buffer::from_text("foo bar");
        let start = find_word_start(&b, Coordinate::new(0, 3));
        assert_eq!(start, Coordinate::new(0, 0));
    }

    #[test]
    fn next_word_skips_current_run_and_separators() {
        let b = Buffer::from_text("foo, bar\nqux");
        let next = find_next_word(&b, Coordinate::origin());
        assert_eq!(next, Coordinate::new(0, 5));
        let next = find_next_word(&b, next);
        assert_eq!(next, Coordinate::new(1, 0));
    }

    #[test]
    fn next_word_at_end_of_buffer_lands_on_last_column() {
        let b = Buffer::from_text("abc");
        let next = find_next_word(&b, Coordinate::new(0, 3));
        assert_eq!(next, Coordinate::new(0, 3));
    }

    #[test]
    fn boundary_without_colors_uses_whitespace_class() {
        let b = Buffer::from_text("ab cd");
        assert!(is_on_word_boundary(&b, Coordinate::new(0, 2), false));
        assert!(!is_on_word_boundary(&b, Coordinate::new(0, 4), false));
        assert!(is_on_word_boundary(&b, Coordinate::new(0, 0), false));
    }

    #[test]
    fn word_at_returns_surrounding_word() {
        let b = Buffer::from_text("ld r1 100");
        assert_eq!(word_at(&b, Coordinate::new(0, 4)), "r1 ");
        assert_eq!(word_at(&b, Coordinate::new(0, 1)), "ld ");
    }

    #[test]
    fn multibyte_words_walk_whole_code_points() {
        let b = Buffer::from_text("aé😀 x");
        let end = find_word_end(&b, Coordinate::origin());
        assert_eq!(end, Coordinate::new(0, 4));
    }
}
