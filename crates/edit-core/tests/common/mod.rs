//! Shared fixtures for the editor integration tests.
#![allow(dead_code)] // each test binary uses a different subset

use edit_core::{CodeEditor, Tokenize};
use edit_syntax::{ParseError, Token, TokenKind, TokenizedProgram};

/// Tiny DLX-flavored tokenizer: the first word of a line is an opcode,
/// `rN`/`fN` words are registers, bare integers are literals, `;` starts a
/// comment, and a line beginning with `?` yields a parse error.
pub struct TestTokenizer;

impl Tokenize for TestTokenizer {
    fn tokenize(&mut self, source: &str) -> TokenizedProgram {
        let mut program = TokenizedProgram::default();
        for (index, line) in source.split('\n').enumerate() {
            let line_number = index as u32 + 1;
            if line.starts_with('?') {
                program.errors.push(ParseError {
                    line: line_number,
                    message: "unknown instruction".to_string(),
                });
                continue;
            }
            if let Some(comment) = line.find(';') {
                program.tokens.push(Token::new(
                    TokenKind::Comment,
                    line_number,
                    comment as u32 + 1,
                    (line.len() - comment) as u32,
                ));
            }
            let code = &line[..line.find(';').unwrap_or(line.len())];
            let mut column = 1u32;
            let mut first_word = true;
            for word in code.split(' ') {
                if !word.is_empty() {
                    let kind = if first_word {
                        first_word = false;
                        TokenKind::OpCode
                    } else if word.starts_with('r') {
                        TokenKind::RegisterInt
                    } else if word.starts_with('f') {
                        TokenKind::RegisterFloat
                    } else if word.chars().all(|c| c.is_ascii_digit()) {
                        TokenKind::IntegerLiteral
                    } else {
                        TokenKind::LabelIdentifier
                    };
                    program
                        .tokens
                        .push(Token::new(kind, line_number, column, word.len() as u32));
                }
                column += word.len() as u32 + 1;
            }
        }
        program
    }
}

/// Editor primed with `text`, cursor at the origin.
pub fn editor_with(text: &str) -> CodeEditor {
    let mut editor = CodeEditor::new();
    editor.set_text(text);
    editor
}
