//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod inspect;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

pub use build::BuildArgs;
pub use inspect::describe_document;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Atlasbake - bake layered sprites, tilesets and fonts into texture atlases
#[derive(Parser)]
#[command(name = "atlasbake")]
#[command(about = "Atlasbake - bake layered sprites, tilesets and fonts into texture atlases")]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every atlas configured in bake.toml
    Build {
        /// Config file (default: bake.toml in the current or a parent directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Build only this atlas (repeatable)
        #[arg(long)]
        only: Vec<String>,

        /// Override the bin size of every atlas
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        bin_size: Option<u32>,

        /// Keep the full bin size instead of cropping to the used area
        #[arg(long)]
        no_crop: bool,

        /// Discover sources without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the structure of a layered document
    Inspect {
        /// Document to inspect (.ase or .aseprite)
        file: PathBuf,
    },
}

/// Log level selected by the number of `-v` flags.
pub fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Parse arguments, initialise logging and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, takes precedence over -v
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Build { config, out, only, bin_size, no_crop, dry_run } => build::run_build(BuildArgs {
            config: config.as_deref(),
            out: out.as_deref(),
            only,
            bin_size,
            no_crop,
            dry_run,
            verbose: cli.verbose > 0,
        }),
        Commands::Inspect { file } => inspect::run_inspect(&file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_arguments() {
        let cli = Cli::try_parse_from([
            "atlasbake", "-vv", "build", "--out", "dist", "--only", "ui", "--only", "tiles", "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build { out, only, dry_run, no_crop, bin_size, config } => {
                assert_eq!(out, Some(PathBuf::from("dist")));
                assert_eq!(only, vec!["ui".to_string(), "tiles".to_string()]);
                assert!(dry_run);
                assert!(!no_crop);
                assert_eq!(bin_size, None);
                assert_eq!(config, None);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_parse_rejects_zero_bin_size() {
        assert!(Cli::try_parse_from(["atlasbake", "build", "--bin-size", "0"]).is_err());
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::try_parse_from(["atlasbake", "inspect", "hero.ase"]).unwrap();
        assert!(matches!(cli.command, Commands::Inspect { file } if file == PathBuf::from("hero.ase")));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), log::LevelFilter::Warn);
        assert_eq!(log_level(1), log::LevelFilter::Info);
        assert_eq!(log_level(5), log::LevelFilter::Trace);
    }
}
