//! Entry point for the `quarry` binary.
//!
//! All work happens in [`quarry_cli::run`]; this file only wires up the
//! process arguments and the locked standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    quarry_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
