//! Configuration module for the atlas build
//!
//! Provides types, discovery and parsing for `bake.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{
    default_config, find_config, find_config_from, load_config, load_config_file, merge_cli_overrides, parse_config,
    project_root, resolve_path, CliOverrides, ConfigError, CONFIG_FILE,
};
pub use schema::*;
