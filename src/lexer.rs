//! Converts a [`SourceInput`] into a finite token sequence terminated by one
//! [`TokenKind::Eof`]. Single pass, not restartable, mirrors
//! `original_source/lexer/lexer.c`.

use std::collections::HashMap;
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::diagnostics::Diagnostics;
use crate::source::SourceInput;
use crate::token::{Span, Token, TokenKind};

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("and", TokenKind::And);
    m.insert("or", TokenKind::Or);
    m.insert("not", TokenKind::Not);
    m.insert("if", TokenKind::If);
    m.insert("else", TokenKind::Else);
    m.insert("const", TokenKind::Const);
    m.insert("let", TokenKind::Let);
    m.insert("func", TokenKind::Func);
    m.insert("return", TokenKind::Return);
    m.insert("void", TokenKind::Void);
    m.insert("real", TokenKind::Real);
    m.insert("bool", TokenKind::Bool);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("output", TokenKind::Output);
    m.insert("str", TokenKind::Str);
    m
});

pub struct Lexer<'a> {
    input: &'a SourceInput,
    diagnostics: &'a Diagnostics,
    file_name: Rc<str>,
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a SourceInput, diagnostics: &'a Diagnostics) -> Self {
        Self {
            input,
            diagnostics,
            file_name: Rc::from(input.name.as_str()),
            pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    /// Consumes the lexer, returning the full token sequence (always
    /// terminated by exactly one `T_EOF`).
    pub fn lex(mut self) -> Vec<Token> {
        log::debug!("----------------- LEXER -----------------");

        loop {
            self.skip_whitespace();

            let start_pos = self.pos;
            let start_line = self.line;
            let start_col = self.col;

            let Some(c) = self.bump() else {
                let span = self.make_span(start_pos, start_line, start_col);
                self.push(TokenKind::Eof, "", span);
                break;
            };

            if self.scan_comment(c) {
                continue;
            }

            self.scan_token(c, start_pos, start_line, start_col);
        }

        log::debug!("lexed {} tokens", self.tokens.len());
        self.tokens
    }

    fn peek(&self) -> Option<u8> {
        self.input.byte_at(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.byte_at(self.pos + offset)
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.input.byte_at(self.pos)?;
        self.pos += 1;

        if c == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }

        Some(c)
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x0B => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn make_span(&self, start_pos: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(
            self.file_name.clone(),
            start_line,
            start_col,
            start_pos,
            self.pos,
        )
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, span: Span) {
        self.tokens.push(Token::new(kind, lexeme, span));
    }

    fn lexeme(&self, start_pos: usize) -> String {
        String::from_utf8_lossy(&self.input.raw[start_pos..self.pos]).into_owned()
    }

    fn lexical_error(&self, span: &Span, message: impl AsRef<str>) {
        self.diagnostics
            .raise(self.input, span, "Lexical error", message.as_ref());
    }

    /// Returns true if `c` began a `--` line comment that has now been
    /// fully consumed (caller should resume scanning the next token).
    fn scan_comment(&mut self, c: u8) -> bool {
        if c == b'-' && self.peek() == Some(b'-') {
            self.bump();
            while let Some(next) = self.peek() {
                if next == b'\n' {
                    break;
                }
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn scan_token(&mut self, c: u8, start_pos: usize, start_line: usize, start_col: usize) {
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'-' => {
                if self.match_byte(b'>') {
                    TokenKind::ArrowRight
                } else {
                    TokenKind::Minus
                }
            }
            b'+' => TokenKind::Plus,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semicolon,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'=' => TokenKind::Equal,
            b'!' => {
                if self.match_byte(b'=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.match_byte(b'=') {
                    TokenKind::LessEqual
                } else if self.match_byte(b'-') {
                    TokenKind::ArrowLeft
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                if self.match_byte(b'=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            b'"' => {
                self.scan_string(start_pos, start_line, start_col);
                return;
            }
            c if c.is_ascii_digit() => {
                self.scan_number(start_pos, start_line, start_col);
                return;
            }
            c if c.is_ascii_alphabetic() => {
                self.scan_identifier(start_pos, start_line, start_col);
                return;
            }
            _ => {
                let span = self.make_span(start_pos, start_line, start_col);
                let lexeme = self.lexeme(start_pos);
                self.lexical_error(&span, format!("illegal token '{}'", lexeme));
                self.push(TokenKind::ErrorToken, lexeme, span);
                return;
            }
        };

        let span = self.make_span(start_pos, start_line, start_col);
        let lexeme = self.lexeme(start_pos);
        self.push(kind, lexeme, span);
    }

    fn scan_number(&mut self, start_pos: usize, start_line: usize, start_col: usize) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else if c == b'.' {
                if !self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
                    let span = self.make_span(start_pos, start_line, start_col);
                    self.lexical_error(&span, "expected digit after decimal point");
                    break;
                }
                self.bump();
            } else {
                break;
            }
        }

        let span = self.make_span(start_pos, start_line, start_col);
        let lexeme = self.lexeme(start_pos);
        self.push(TokenKind::Number, lexeme, span);
    }

    fn scan_string(&mut self, start_pos: usize, start_line: usize, start_col: usize) {
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(b'\n') => break,
                Some(_) => {
                    self.bump();
                }
                None => {
                    let span = self.make_span(start_pos, start_line, start_col);
                    self.lexical_error(&span, "unterminated string");
                    break;
                }
            }
        }

        let span = self.make_span(start_pos, start_line, start_col);
        let lexeme = self.lexeme(start_pos);
        self.push(TokenKind::String, lexeme, span);
    }

    fn scan_identifier(&mut self, start_pos: usize, start_line: usize, start_col: usize) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }

        let span = self.make_span(start_pos, start_line, start_col);
        let lexeme = self.lexeme(start_pos);
        let kind = KEYWORDS
            .get(lexeme.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.push(kind, lexeme, span);
    }
}

/// Strips the surrounding quotes from a `STRING` token's lexeme and decodes
/// any escape sequences it contains.
pub fn decode_string_literal(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);

    unescape::unescape(inner).unwrap_or_else(|| inner.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        let input = SourceInput::new("test.eps", src.as_bytes().to_vec());
        let diagnostics = Diagnostics::new();
        let tokens = {
            let lexer = Lexer::new(&input, &diagnostics);
            lexer.lex()
        };
        assert!(!diagnostics.was_error(), "unexpected lexer error for {src:?}");
        tokens
    }

    #[test]
    fn always_terminates_with_eof() {
        let tokens = lex("output 1;");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn empty_input_is_just_eof() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn numbers_and_operators() {
        let tokens = lex("1 + 2 * 3");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keywords_are_recognized() {
        let tokens = lex("let x: real <- 1;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Real,
                TokenKind::ArrowLeft,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn line_comment_is_discarded() {
        let tokens = lex("1 -- a comment\n+ 2;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tracks_line_and_col_across_newlines() {
        let tokens = lex("1;\n2;");
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.col, 1);
    }

    #[test]
    fn unterminated_string_raises_lexical_error() {
        let input = SourceInput::new("test.eps", b"\"abc".to_vec());
        let diagnostics = Diagnostics::new();
        let lexer = Lexer::new(&input, &diagnostics);
        lexer.lex();
        assert!(diagnostics.was_error());
    }

    #[test]
    fn decimal_point_without_digit_raises_lexical_error() {
        let input = SourceInput::new("test.eps", b"1.".to_vec());
        let diagnostics = Diagnostics::new();
        let lexer = Lexer::new(&input, &diagnostics);
        lexer.lex();
        assert!(diagnostics.was_error());
    }

    #[test]
    fn string_literal_decodes_quotes_stripped() {
        assert_eq!(decode_string_literal("\"hi\""), "hi");
    }

    #[test]
    fn arrow_and_comparison_operators() {
        let tokens = lex("a <- b -> c <= d >= e != f");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::ArrowLeft,
                TokenKind::Identifier,
                TokenKind::ArrowRight,
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::GreaterEqual,
                TokenKind::Identifier,
                TokenKind::BangEqual,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }
}
