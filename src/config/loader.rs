//! Configuration loading and discovery for `bake.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{BakeConfig, DefaultsConfig, ProjectConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up by [`find_config`].
pub const CONFIG_FILE: &str = "bake.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bake.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// No config file in the current directory or any parent
    #[error("No bake.toml found in {0} or any parent directory")]
    NotFound(PathBuf),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Override the default bin size
    pub bin_size: Option<u32>,
    /// Override cropping for every atlas
    pub crop: Option<bool>,
}

/// Find bake.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    find_config_from(cwd)
}

/// Find bake.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Move to parent directory
        if !current.pop() {
            // Reached root, no config found
            return None;
        }
    }
}

/// Load configuration from a bake.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate the config file.
///
/// # Returns
/// - `Ok((path, config))` on success
/// - `Err(ConfigError)` if the file cannot be found, read, parsed or validated
pub fn load_config(path: Option<&Path>) -> Result<(PathBuf, BakeConfig), ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => find_config().ok_or_else(|| {
            ConfigError::NotFound(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        })?,
    };

    let config = load_config_file(&config_path)?;
    Ok((config_path, config))
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<BakeConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<BakeConfig, ConfigError> {
    let config: BakeConfig = toml::from_str(contents)?;

    // Validate the config
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// A minimal valid configuration with no atlases.
///
/// The project name is set to the current directory name.
pub fn default_config() -> BakeConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unnamed".to_string());

    BakeConfig {
        project: ProjectConfig { name: project_name, out: PathBuf::from("build"), descriptor: None, json: None },
        defaults: DefaultsConfig::default(),
        atlases: Vec::new(),
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values, including
/// per-atlas overrides.
pub fn merge_cli_overrides(config: &mut BakeConfig, overrides: &CliOverrides) {
    // Override output directory
    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
    }

    if let Some(bin_size) = overrides.bin_size {
        config.defaults.bin_size = bin_size;
        for atlas in &mut config.atlases {
            atlas.bin_size = None;
        }
    }

    if let Some(crop) = overrides.crop {
        config.defaults.crop = crop;
        for atlas in &mut config.atlases {
            atlas.crop = None;
        }
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the bake.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("bake.toml");
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[project]\nname = \"test\"")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("bake.toml");
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[project]\nname = \"test\"")
            .expect("should write config content");

        // Create a subdirectory
        let subdir = temp.path().join("assets").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("bake.toml");
        File::create(&config_path)
            .expect("should create config file")
            .write_all(
                br#"
[project]
name = "test-project"

[defaults]
bin_size = 512

[[atlas]]
name = "main"
src = "sprites"
"#,
            )
            .expect("should write config content");

        let (path, config) = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(path, config_path);
        assert_eq!(config.project.name, "test-project");
        assert_eq!(config.defaults.bin_size, 512);
        assert!(config.atlas("main").is_some());
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("nonexistent.toml");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("bake.toml");
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"this is not valid toml {{{")
            .expect("should write invalid config");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let result = parse_config("[project]\nname = \"\"\n\n[defaults]\nbin_size = 0\n");
        match result {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides_out() {
        let mut config = default_config();
        let overrides = CliOverrides { out: Some(PathBuf::from("dist")), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert_eq!(config.effective_descriptor(), PathBuf::from("dist/atlas.rs"));
    }

    #[test]
    fn test_merge_cli_overrides_beat_atlas_settings() {
        let mut config = parse_config(
            "[project]\nname = \"p\"\n\n[[atlas]]\nname = \"a\"\nsrc = \"a\"\nbin_size = 64\ncrop = true\n",
        )
        .unwrap();
        let overrides = CliOverrides { bin_size: Some(128), crop: Some(false), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        let atlas = &config.atlases[0];
        assert_eq!(config.effective_bin_size(atlas), 128);
        assert!(!config.effective_crop(atlas));
    }

    #[test]
    fn test_resolve_path_absolute() {
        let root = Path::new("/project");
        let absolute = Path::new("/other/path");
        assert_eq!(resolve_path(root, absolute), PathBuf::from("/other/path"));
    }

    #[test]
    fn test_resolve_path_relative() {
        let root = Path::new("/project");
        let relative = Path::new("assets/sprites");
        assert_eq!(resolve_path(root, relative), PathBuf::from("/project/assets/sprites"));
    }

    #[test]
    fn test_project_root() {
        let config_path = Path::new("/project/bake.toml");
        assert_eq!(project_root(config_path), Some(Path::new("/project")));
    }

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert!(!config.project.name.is_empty());
        assert!(config.atlases.is_empty());
        assert!(config.is_valid());
    }
}
