//! `epsilon <input-file>`: reads a source file, runs it, and exits.
//!
//! This binary is the external collaborator spec.md §1 calls out of core
//! scope: it owns argument parsing and the raw file read; everything past
//! that (the `SourceInput` handoff) is [`epsilon::driver::run`]. Mirrors
//! `original_source/epsilon.c`'s `main`, minus the `#ifdef EPS_DBG` timing
//! block, which this crate's `debug-trace` feature covers via logging
//! instead of a wall-clock line (see SPEC_FULL.md §2).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use epsilon::diagnostics::Diagnostics;
use epsilon::driver;
use epsilon::source::SourceInput;

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Lexer, parser and tree-walking evaluator for Epsilon")]
struct Cli {
    /// Path to an `.eps` source file.
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    #[cfg(feature = "debug-trace")]
    simple_logger::init_with_level(log::Level::Debug).ok();

    let cli = Cli::parse();
    let diagnostics = Diagnostics::new();

    let Some(path) = cli.file else {
        diagnostics.fatal("no input file provided");
    };

    let raw = std::fs::read(&path).unwrap_or_else(|_| {
        diagnostics.fatal(&format!("cannot open file: {}", path.display()));
    });

    let input = SourceInput::new(path.to_string_lossy(), raw);
    driver::run(&input);

    // Recoverable diagnostics never change the exit code (spec.md §6).
    ExitCode::SUCCESS
}
