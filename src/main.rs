//! Atlasbake - command-line tool for baking texture atlases

use std::process::ExitCode;

use atlasbake::cli;

fn main() -> ExitCode {
    cli::run()
}
