//! Tokenizer boundary and glyph recoloring.
//!
//! The editor never parses DLX assembly itself; an external tokenizer hands
//! it a flat token stream plus parse errors, and the colorizer paints glyph
//! color tags from the token spans. Token coordinates are 1-based, matching
//! the assembler's diagnostics; glyph indices are 0-based byte offsets.

use edit_text::{Buffer, ColorTag};
use tracing::trace;

/// Token classification produced by the external DLX tokenizer. Only a
/// subset drives coloring; everything else renders with the default tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpCode,
    RegisterInt,
    RegisterFloat,
    RegisterStatus,
    IntegerLiteral,
    ImmediateInteger,
    LabelIdentifier,
    Comment,
    Colon,
    Comma,
    OpenBracket,
    CloseBracket,
    NewLine,
}

/// One token with a 1-based (line, column) origin and a byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl Token {
    pub const fn new(kind: TokenKind, line: u32, column: u32, length: u32) -> Self {
        Self {
            kind,
            line,
            column,
            length,
        }
    }
}

/// A parse diagnostic attached to a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

/// Result of tokenizing the full buffer text.
#[derive(Debug, Clone, Default)]
pub struct TokenizedProgram {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

/// Boundary to the external tokenizer. It receives a borrowed snapshot of
/// the buffer text and must not retain it past the call.
pub trait Tokenize {
    fn tokenize(&mut self, source: &str) -> TokenizedProgram;
}

/// Tokenizer that recognizes nothing; every glyph keeps its current tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTokenizer;

impl Tokenize for NullTokenizer {
    fn tokenize(&mut self, _source: &str) -> TokenizedProgram {
        TokenizedProgram::default()
    }
}

/// Color tag a token kind paints with. `None` means the token does not
/// touch glyph colors at all (line breaks own no glyphs).
pub fn color_for(kind: TokenKind) -> Option<ColorTag> {
    match kind {
        TokenKind::Comment => Some(ColorTag::Comment),
        TokenKind::ImmediateInteger | TokenKind::IntegerLiteral => Some(ColorTag::IntegerLiteral),
        TokenKind::OpCode => Some(ColorTag::OpCode),
        TokenKind::RegisterInt | TokenKind::RegisterFloat | TokenKind::RegisterStatus => {
            Some(ColorTag::Register)
        }
        TokenKind::NewLine => None,
        _ => Some(ColorTag::Default),
    }
}

/// Paint one token's span. Spans that fall outside the buffer (the token
/// stream may lag one edit behind) are clamped away rather than trusted.
pub fn colorize_token(buffer: &mut Buffer, token: &Token) {
    let Some(tag) = color_for(token.kind) else {
        return;
    };
    if token.line == 0 || token.column == 0 {
        return;
    }
    let line_index = token.line as usize - 1;
    let Some(line) = buffer.line_mut(line_index) else {
        return;
    };

    let start = token.column as usize - 1;
    let end = (start + token.length as usize).min(line.len());
    for glyph in line.iter_mut().take(end).skip(start) {
        glyph.color = tag;
    }
}

/// Repaint the whole buffer from a token stream.
pub fn colorize_program(buffer: &mut Buffer, program: &TokenizedProgram) {
    for token in &program.tokens {
        colorize_token(buffer, token);
    }
    trace!(
        target: "syntax.color",
        tokens = program.tokens.len(),
        errors = program.errors.len(),
        "recolorized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_colors(buffer: &Buffer, line: usize) -> Vec<ColorTag> {
        buffer.line(line).unwrap().iter().map(|g| g.color).collect()
    }

    #[test]
    fn kinds_map_to_expected_tags() {
        assert_eq!(color_for(TokenKind::Comment), Some(ColorTag::Comment));
        assert_eq!(color_for(TokenKind::OpCode), Some(ColorTag::OpCode));
        assert_eq!(
            color_for(TokenKind::ImmediateInteger),
            Some(ColorTag::IntegerLiteral)
        );
        assert_eq!(color_for(TokenKind::RegisterFloat), Some(ColorTag::Register));
        assert_eq!(color_for(TokenKind::Comma), Some(ColorTag::Default));
        assert_eq!(color_for(TokenKind::NewLine), None);
    }

    #[test]
    fn colorize_paints_token_spans() {
        let mut buffer = Buffer::from_text("ADD R1 R2\n; note");
        let program = TokenizedProgram {
            tokens: vec![
                Token::new(TokenKind::OpCode, 1, 1, 3),
                Token::new(TokenKind::RegisterInt, 1, 5, 2),
                Token::new(TokenKind::Comment, 2, 1, 6),
            ],
            errors: Vec::new(),
        };
        colorize_program(&mut buffer, &program);

        let first = line_colors(&buffer, 0);
        assert_eq!(&first[0..3], &[ColorTag::OpCode; 3]);
        assert_eq!(first[3], ColorTag::Default);
        assert_eq!(&first[4..6], &[ColorTag::Register; 2]);
        assert!(line_colors(&buffer, 1).iter().all(|c| *c == ColorTag::Comment));
    }

    #[test]
    fn out_of_range_spans_are_clamped() {
        let mut buffer = Buffer::from_text("ab");
        colorize_token(&mut buffer, &Token::new(TokenKind::OpCode, 1, 2, 99));
        colorize_token(&mut buffer, &Token::new(TokenKind::OpCode, 9, 1, 1));
        colorize_token(&mut buffer, &Token::new(TokenKind::OpCode, 0, 0, 1));
        let colors = line_colors(&buffer, 0);
        assert_eq!(colors, vec![ColorTag::Default, ColorTag::OpCode]);
    }

    #[test]
    fn multibyte_token_span_colors_continuation_bytes() {
        let mut buffer = Buffer::from_text("é1");
        // A 3-byte span covering the 2-byte code point plus the digit.
        colorize_token(
            &mut buffer,
            &Token::new(TokenKind::IntegerLiteral, 1, 1, 3),
        );
        let colors = line_colors(&buffer, 0);
        assert!(colors.iter().all(|c| *c == ColorTag::IntegerLiteral));
    }
}
