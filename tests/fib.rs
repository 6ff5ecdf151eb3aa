use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/fib.eps";

#[test]
fn recursive_function_call_computes_fibonacci() -> Result<(), Box<dyn Error>> {
    check_output(
        Path::new(SRC_PATH),
        Expected {
            stdout: "55.000000\n",
        },
    )
}
