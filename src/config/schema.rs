//! Configuration schema types for `bake.toml`
//!
//! Defines the structure and validation rules for atlas build configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// What kind of assets an atlas is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Layered documents flattened per frame, plus static images
    #[default]
    Sprites,
    /// Every layer exported as its own texture, plus static images
    Interface,
    /// Documents and images sliced into fixed-size tiles
    Tilesets,
    /// Characters rasterized from font files
    Font,
}

impl AssetKind {
    /// File extensions discovered for this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Sprites | AssetKind::Interface | AssetKind::Tilesets => &["ase", "aseprite", "png"],
            AssetKind::Font => &["ttf", "otf"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Sprites => "sprites",
            AssetKind::Interface => "interface",
            AssetKind::Tilesets => "tilesets",
            AssetKind::Font => "font",
        }
    }
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required)
    pub name: String,
    /// Build output directory
    #[serde(default = "default_out")]
    pub out: PathBuf,
    /// Generated Rust descriptor (defaults to `<out>/atlas.rs`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<PathBuf>,
    /// Optional JSON descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<PathBuf>,
}

fn default_out() -> PathBuf {
    PathBuf::from("build")
}

/// Default settings applied to all atlases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Side length of the square packing bin
    #[serde(default = "default_bin_size")]
    pub bin_size: u32,
    /// Crop the atlas to its used extent
    #[serde(default = "default_true")]
    pub crop: bool,
    /// Tile size for tileset atlases
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Add a 1px bleed border around tiles
    #[serde(default = "default_true")]
    pub bleed: bool,
    /// Font pixel size
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Characters rasterized for font atlases
    #[serde(default = "default_charset")]
    pub charset: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            bin_size: default_bin_size(),
            crop: true,
            tile_size: default_tile_size(),
            bleed: true,
            font_size: default_font_size(),
            charset: default_charset(),
        }
    }
}

fn default_bin_size() -> u32 {
    2048
}

fn default_tile_size() -> u32 {
    16
}

fn default_font_size() -> u32 {
    16
}

/// Printable ASCII
fn default_charset() -> String {
    (' '..='~').collect()
}

fn default_true() -> bool {
    true
}

/// One atlas to build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Package label; names the generated module and the default image file
    pub name: String,
    #[serde(default)]
    pub kind: AssetKind,
    /// Source directory
    pub src: PathBuf,
    /// Only files whose name starts with this prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Descend into subdirectories
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Output image (defaults to `<out>/<name>.png`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

/// Complete bake.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BakeConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    /// Default settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Atlas definitions, built in this order
    #[serde(default, rename = "atlas")]
    pub atlases: Vec<AtlasConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "atlas.sprites.bin_size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bake.toml: '{}' {}", self.field, self.message)
    }
}

impl BakeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut positive = |field: String, value: u32| {
            if value == 0 {
                errors.push(ConfigValidationError { field, message: "must be a positive integer".to_string() });
            }
        };

        positive("defaults.bin_size".to_string(), self.defaults.bin_size);
        positive("defaults.tile_size".to_string(), self.defaults.tile_size);
        positive("defaults.font_size".to_string(), self.defaults.font_size);
        for atlas in &self.atlases {
            let label = if atlas.name.is_empty() { "<unnamed>" } else { atlas.name.as_str() };
            if let Some(v) = atlas.bin_size {
                positive(format!("atlas.{}.bin_size", label), v);
            }
            if let Some(v) = atlas.tile_size {
                positive(format!("atlas.{}.tile_size", label), v);
            }
            if let Some(v) = atlas.font_size {
                positive(format!("atlas.{}.font_size", label), v);
            }
        }

        // Validate project.name is non-empty
        if self.project.name.is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        let mut names = HashSet::new();
        for atlas in &self.atlases {
            if atlas.name.is_empty() {
                errors.push(ConfigValidationError {
                    field: "atlas.name".to_string(),
                    message: "must be a non-empty string".to_string(),
                });
            } else if !names.insert(atlas.name.as_str()) {
                errors.push(ConfigValidationError {
                    field: format!("atlas.{}", atlas.name),
                    message: "is defined more than once".to_string(),
                });
            }

            if atlas.kind == AssetKind::Font && self.effective_charset(atlas).is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("atlas.{}.charset", atlas.name),
                    message: "must contain at least one character".to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Find an atlas by name
    pub fn atlas(&self, name: &str) -> Option<&AtlasConfig> {
        self.atlases.iter().find(|a| a.name == name)
    }

    pub fn effective_bin_size(&self, atlas: &AtlasConfig) -> u32 {
        atlas.bin_size.unwrap_or(self.defaults.bin_size)
    }

    pub fn effective_crop(&self, atlas: &AtlasConfig) -> bool {
        atlas.crop.unwrap_or(self.defaults.crop)
    }

    pub fn effective_tile_size(&self, atlas: &AtlasConfig) -> u32 {
        atlas.tile_size.unwrap_or(self.defaults.tile_size)
    }

    pub fn effective_bleed(&self, atlas: &AtlasConfig) -> bool {
        atlas.bleed.unwrap_or(self.defaults.bleed)
    }

    pub fn effective_font_size(&self, atlas: &AtlasConfig) -> u32 {
        atlas.font_size.unwrap_or(self.defaults.font_size)
    }

    pub fn effective_charset<'a>(&'a self, atlas: &'a AtlasConfig) -> &'a str {
        atlas.charset.as_deref().unwrap_or(&self.defaults.charset)
    }

    /// Output image path (relative paths are relative to the project root)
    pub fn effective_image(&self, atlas: &AtlasConfig) -> PathBuf {
        atlas.image.clone().unwrap_or_else(|| self.project.out.join(format!("{}.png", atlas.name)))
    }

    /// Rust descriptor path
    pub fn effective_descriptor(&self) -> PathBuf {
        self.project.descriptor.clone().unwrap_or_else(|| self.project.out.join("atlas.rs"))
    }
}
