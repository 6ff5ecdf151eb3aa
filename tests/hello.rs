use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/hello.eps";

#[test]
fn outputs_a_string_literal() -> Result<(), Box<dyn Error>> {
    check_output(
        Path::new(SRC_PATH),
        Expected {
            stdout: "Hello, World!\n",
        },
    )
}
