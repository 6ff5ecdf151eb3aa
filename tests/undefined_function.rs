use std::{error::Error, path::Path};

use test_utils::check_diagnostic;

const SRC_PATH: &str = "./demos/undefined_function.eps";

#[test]
fn calling_an_undefined_function_is_a_runtime_diagnostic() -> Result<(), Box<dyn Error>> {
    check_diagnostic(Path::new(SRC_PATH), "call undefined function 'missing'")
}
