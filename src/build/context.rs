//! Build context containing configuration and state for a build.

use crate::config::{AtlasConfig, BakeConfig};
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// The context provides access to all information needed to execute a build,
/// including the configuration, project root, and output paths.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: BakeConfig,
    /// Project root directory (where bake.toml is located)
    project_root: PathBuf,
    /// Whether to run in verbose mode
    verbose: bool,
    /// Optional filter to build specific atlases only
    atlas_filter: Option<Vec<String>>,
}

impl BuildContext {
    /// Create a new build context.
    ///
    /// # Arguments
    /// - `config` - The loaded configuration
    /// - `project_root` - The project root directory
    pub fn new(config: BakeConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, verbose: false, atlas_filter: None }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the output directory (resolved to absolute path).
    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.out)
    }

    /// Source directory of an atlas (resolved).
    pub fn src_dir(&self, atlas: &AtlasConfig) -> PathBuf {
        self.resolve_path(&atlas.src)
    }

    /// Where the atlas image is written (resolved).
    pub fn image_path(&self, atlas: &AtlasConfig) -> PathBuf {
        self.resolve_path(&self.config.effective_image(atlas))
    }

    /// Where the Rust descriptor is written (resolved).
    pub fn descriptor_path(&self) -> PathBuf {
        self.resolve_path(&self.config.effective_descriptor())
    }

    /// Where the JSON descriptor is written, if one was requested (resolved).
    pub fn json_path(&self) -> Option<PathBuf> {
        self.config.project.json.as_deref().map(|p| self.resolve_path(p))
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set a filter to build only the named atlases.
    pub fn with_filter(mut self, atlases: Vec<String>) -> Self {
        self.atlas_filter = Some(atlases);
        self
    }

    /// Get the atlas filter.
    pub fn atlas_filter(&self) -> Option<&[String]> {
        self.atlas_filter.as_deref()
    }

    /// Atlases selected by the filter, in configuration order.
    pub fn selected_atlases(&self) -> Vec<&AtlasConfig> {
        match self.atlas_filter() {
            Some(filter) => self.config.atlases.iter().filter(|a| filter.contains(&a.name)).collect(),
            None => self.config.atlases.iter().collect(),
        }
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::resolve_path(&self.project_root, path)
    }
}
