//! tilecomp - Command-line tool for compiling a tileset directory into
//! packed tilesheets and a mod tileset config

use std::process::ExitCode;

use tilecomp::cli;

fn main() -> ExitCode {
    cli::run()
}
