//! Binary entrypoint for the `testsmith` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match testsmith::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
