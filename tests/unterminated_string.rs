use std::{error::Error, path::Path};

use test_utils::check_diagnostic;

const SRC_PATH: &str = "./demos/unterminated_string.eps";

#[test]
fn unterminated_string_is_a_lexical_diagnostic() -> Result<(), Box<dyn Error>> {
    check_diagnostic(Path::new(SRC_PATH), "unterminated string")
}
