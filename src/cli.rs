//! Command-line interface implementation

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::compose::compose_tileset;
use crate::report::Diagnostics;

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;

/// Merge all the individual tile entries and sprite PNGs in a tileset's
/// directory into a mod_tileset.json and one or more tilesheet PNGs
#[derive(Parser)]
#[command(name = "tilecomp")]
#[command(
    about = "Merge a tileset directory's sprite PNGs and tile descriptors into packed tilesheets and a mod_tileset.json"
)]
#[command(version)]
pub struct Cli {
    /// Local name of the tileset directory
    pub tileset_dir: PathBuf,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let mut diag = Diagnostics::new();

    if let Err(e) = compose_tileset(&cli.tileset_dir, &mut diag) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    if diag.failed() {
        return ExitCode::from(EXIT_ERROR);
    }
    ExitCode::from(EXIT_SUCCESS)
}
