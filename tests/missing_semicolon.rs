use std::{error::Error, path::Path};

use test_utils::check_diagnostic;

const SRC_PATH: &str = "./demos/missing_semicolon.eps";

#[test]
fn missing_semicolon_is_a_syntax_diagnostic() -> Result<(), Box<dyn Error>> {
    check_diagnostic(Path::new(SRC_PATH), "Syntax Error")
}
