//! Build command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Options of the build command beyond config overrides
#[derive(Debug, Default)]
pub struct BuildArgs<'a> {
    pub config: Option<&'a Path>,
    pub out: Option<&'a Path>,
    pub only: Vec<String>,
    pub bin_size: Option<u32>,
    pub no_crop: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Run the build command
pub fn run_build(args: BuildArgs<'_>) -> ExitCode {
    use crate::build::{Build, BuildContext, BuildError};
    use crate::config::loader::{load_config, merge_cli_overrides, project_root, CliOverrides};

    let (config_path, mut config) = match load_config(args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    log::info!("Using config: {}", config_path.display());

    // Apply CLI overrides to config
    let overrides = CliOverrides {
        out: args.out.map(Path::to_path_buf),
        bin_size: args.bin_size,
        crop: args.no_crop.then_some(false),
    };
    merge_cli_overrides(&mut config, &overrides);
    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let root = project_root(&config_path)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let context = BuildContext::new(config, root);

    if args.dry_run {
        println!("Dry run - would build:");
    }

    let result = Build::new(context).filter(args.only).dry_run(args.dry_run).verbose(args.verbose).run();
    match result {
        Ok(summary) => {
            if args.dry_run {
                for target in &summary.targets {
                    println!("  - {} ({})", target.target_id, target.status);
                }
            }
            if summary.is_success() {
                println!("{}", summary.summary());
                ExitCode::from(EXIT_SUCCESS)
            } else {
                eprintln!("{}", summary.summary());
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e @ BuildError::UnknownAtlas(_)) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Build error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
