//! Error reporting sink shared by the Lexer, Parser and Evaluator.
//!
//! Mirrors `original_source/core/errors.c`: non-fatal diagnostics print a
//! file:line:col header, the offending source line, and a caret-underline,
//! then set a sticky "had error" flag; `fatal` prints and exits the process
//! immediately.

use std::cell::Cell;

use colored::Colorize;

use crate::source::SourceInput;
use crate::token::Span;

const INDENT: &str = "    ";

pub struct Diagnostics {
    had_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            had_error: Cell::new(false),
        }
    }

    pub fn was_error(&self) -> bool {
        self.had_error.get()
    }

    /// Recoverable diagnostic. `kind` is one of "Lexical error",
    /// "Syntax Error", "Runtime Error".
    pub fn raise(&self, input: &SourceInput, span: &Span, kind: &str, message: &str) {
        eprintln!(
            "{} {{{}:{}}} {}",
            span.file_name,
            span.line,
            span.col,
            format!("{}:", kind).red()
        );
        eprintln!("{}{}", INDENT, message);
        print_context(input, span);

        self.had_error.set(true);
    }

    /// Unrecoverable condition (missing CLI argument, unreadable file).
    /// Prints and terminates the process with status 1.
    pub fn fatal(&self, message: &str) -> ! {
        eprintln!("{}", format!("Fatal: {}", message).red());
        std::process::exit(1);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

fn line_bounds(input: &SourceInput, target_line: usize) -> (usize, usize) {
    let mut line = 1usize;
    let mut start = 0usize;

    while line < target_line {
        match input.byte_at(start) {
            Some(b'\n') => {
                line += 1;
                start += 1;
            }
            Some(_) => start += 1,
            None => break,
        }
    }

    let mut end = start;
    while let Some(b) = input.byte_at(end) {
        if b == b'\n' {
            break;
        }
        end += 1;
    }

    (start, end)
}

fn print_context(input: &SourceInput, span: &Span) {
    let (start, end) = line_bounds(input, span.line);
    let line = String::from_utf8_lossy(&input.raw[start..end]);

    eprintln!("{}{}", INDENT, line);

    let mut underline = String::new();
    let mut col = start;

    while col < span.byte_start.min(end) {
        underline.push(' ');
        col += 1;
    }

    let tilde_end = span.byte_end.saturating_sub(1).min(end);
    let mut tildes = String::new();
    while col < tilde_end {
        tildes.push('~');
        col += 1;
    }

    eprintln!("{}{}{}{}", INDENT, underline, tildes.red(), "^".red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn span(line: usize, col: usize, start: usize, end: usize) -> Span {
        Span::new(Rc::from("test.eps"), line, col, start, end)
    }

    #[test]
    fn raise_sets_had_error() {
        let diagnostics = Diagnostics::new();
        let input = SourceInput::new("test.eps", b"let x: real <- 1;".to_vec());
        assert!(!diagnostics.was_error());

        diagnostics.raise(&input, &span(1, 1, 0, 3), "Lexical error", "illegal token");

        assert!(diagnostics.was_error());
    }
}
