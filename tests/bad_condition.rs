use std::{error::Error, path::Path};

use test_utils::check_diagnostic;

const SRC_PATH: &str = "./demos/bad_condition.eps";

#[test]
fn if_with_non_bool_condition_is_a_runtime_diagnostic() -> Result<(), Box<dyn Error>> {
    check_diagnostic(Path::new(SRC_PATH), "invalid condition type 'real'")
}
