use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/scope.eps";

#[test]
fn block_scoped_let_shadows_without_leaking() -> Result<(), Box<dyn Error>> {
    check_output(
        Path::new(SRC_PATH),
        Expected {
            stdout: "2.000000\n1.000000\n",
        },
    )
}
