use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/arithmetic.eps";

#[test]
fn multiplication_binds_tighter_than_addition() -> Result<(), Box<dyn Error>> {
    check_output(
        Path::new(SRC_PATH),
        Expected {
            stdout: "7.000000\n",
        },
    )
}
