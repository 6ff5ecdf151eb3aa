use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const EPSILON_PATH: &str = "./target/debug/epsilon";

pub struct Expected<'a> {
    pub stdout: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        Ok(())
    }
}

fn run_epsilon(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(EPSILON_PATH).arg(src_path).output()
}

/// Runs `src_path` through the `epsilon` binary and checks its stdout.
/// The exit code is always `0` even when diagnostics were raised (spec.md
/// §6), so this never inspects `status`.
pub fn check_output(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_epsilon(src_path)?;
    expected.assert_matches(&output)
}

/// Runs `src_path` and asserts its stderr contains `needle` -- a substring
/// rather than an exact match, since the diagnostic's source-context lines
/// and ANSI styling are not the property under test.
pub fn check_diagnostic(src_path: &Path, needle: &str) -> Result<(), Box<dyn Error>> {
    let output = run_epsilon(src_path)?;
    let stderr = str::from_utf8(&output.stderr)?;

    assert!(
        stderr.contains(needle),
        "expected stderr to contain {needle:?}, got:\n{stderr}"
    );
    assert!(
        output.status.success(),
        "epsilon exited with status {:?} (recoverable diagnostics should not change it)",
        output.status.code()
    );

    Ok(())
}
