use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/mutable.eps";

#[test]
fn let_bound_variable_can_be_reassigned() -> Result<(), Box<dyn Error>> {
    check_output(
        Path::new(SRC_PATH),
        Expected {
            stdout: "6.000000\n",
        },
    )
}
