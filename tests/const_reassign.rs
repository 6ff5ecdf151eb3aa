use std::{error::Error, path::Path};

use test_utils::check_diagnostic;

const SRC_PATH: &str = "./demos/const_reassign.eps";

#[test]
fn assigning_to_a_const_is_a_runtime_diagnostic() -> Result<(), Box<dyn Error>> {
    check_diagnostic(Path::new(SRC_PATH), "cannot assign value to const 'pi'")
}
