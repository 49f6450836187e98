//! CLI entrypoint for OpenRegex.
//!
//! The binary delegates to [`openregex::run`], which loads configuration,
//! parses the command line, and either coordinates a match call or, when
//! launched as a worker, serves one request from stdin.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    openregex::run(std::env::args_os(), &mut stdout, &mut stderr)
}
