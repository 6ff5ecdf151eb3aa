//! Composes Lexer → Parser → Evaluator against one [`SourceInput`] and lets
//! each stage run to completion regardless of earlier diagnostics (only the
//! evaluator's own top-level loop stops early, see [`crate::evaluator`]).
//! Mirrors `original_source/epsilon.c`'s `main`, minus the CLI argument
//! handling, which lives in `src/main.rs`.

use crate::diagnostics::Diagnostics;
use crate::evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::source::SourceInput;

/// Runs the full pipeline. Recoverable diagnostics never change the exit
/// code (spec §6); the caller always treats this as a normal completion.
pub fn run(input: &SourceInput) {
    let diagnostics = Diagnostics::new();

    let tokens = Lexer::new(input, &diagnostics).lex();
    let statements = Parser::new(tokens, input, &diagnostics).parse();

    log::debug!("----------------- EVALUATOR -----------------");
    evaluator::run(&statements, &diagnostics, input);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_full_program_without_panicking() {
        let input = SourceInput::new("test.eps", b"output 1 + 2 * 3;".to_vec());
        run(&input);
    }

    #[test]
    fn recoverable_errors_do_not_panic_the_pipeline() {
        let input = SourceInput::new("test.eps", b"let x: real <- \"oops\";".to_vec());
        run(&input);
    }
}
