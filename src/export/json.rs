//! JSON descriptor.
//!
//! Serializes the merged [`Descriptor`] for consumers that are not written
//! in Rust.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "atlases": [
//!     { "label": "sprites", "module": "sprites", "image_path": "build/sprites.png",
//!       "size": { "w": 64, "h": 32 }, "swatch": { ... }, "font": null,
//!       "tilesets": [], "glyphs": [] }
//!   ],
//!   "textures": [
//!     { "name": "hero.0", "ident": "Hero0", "atlas": 0,
//!       "rect": { "x": 0, "y": 0, "w": 16, "h": 16 },
//!       "uv": { "u0": 0.0, "v0": 0.0, "u1": 0.25, "v1": 0.5 }, ... }
//!   ],
//!   "animations": [ ... ]
//! }
//! ```

use std::fs;
use std::path::Path;

use super::descriptor::Descriptor;
use super::{ExportOptions, Exporter, Result};

/// JSON format exporter.
#[derive(Debug, Default)]
pub struct JsonExporter;

impl JsonExporter {
    /// Create a new JSON exporter.
    pub fn new() -> Self {
        Self
    }

    /// Export the descriptor to a JSON string.
    pub fn export_to_string(&self, descriptor: &Descriptor, options: &ExportOptions) -> Result<String> {
        let json = if options.pretty {
            serde_json::to_string_pretty(descriptor)?
        } else {
            serde_json::to_string(descriptor)?
        };
        Ok(json)
    }
}

impl Exporter for JsonExporter {
    fn export(&self, descriptor: &Descriptor, output_path: &Path, options: &ExportOptions) -> Result<()> {
        let json = self.export_to_string(descriptor, options)?;

        // Ensure parent directory exists
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, json)?;

        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildResult, PlacedTexture, Rect, Size, Trim};
    use std::path::PathBuf;

    fn descriptor() -> Descriptor {
        Descriptor::merge(&[BuildResult {
            label: "sprites".to_string(),
            image_path: PathBuf::from("build/sprites.png"),
            atlas_size: Size::new(4, 2),
            textures: vec![PlacedTexture {
                name: "hero".to_string(),
                rect: Rect::new(0, 0, 2, 2),
                trim: Trim::default(),
                doc_size: Size::new(2, 2),
                duration_ms: None,
            }],
            animations: Vec::new(),
            tilesets: Vec::new(),
            glyphs: Vec::new(),
            swatch: None,
            font: None,
        }])
    }

    #[test]
    fn test_texture_fields() {
        let json = JsonExporter::new().export_to_string(&descriptor(), &ExportOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let texture = &value["textures"][0];
        assert_eq!(texture["name"], "hero");
        assert_eq!(texture["ident"], "Hero");
        assert_eq!(texture["rect"]["w"], 2);
        assert_eq!(texture["uv"]["u1"], 0.5);
        assert_eq!(value["atlases"][0]["image_path"], "build/sprites.png");
    }

    #[test]
    fn test_compact_output() {
        let options = ExportOptions { pretty: false };
        let json = JsonExporter::new().export_to_string(&descriptor(), &options).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_export_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/atlas.json");
        JsonExporter::new().export(&descriptor(), &path, &ExportOptions::default()).unwrap();
        assert!(path.exists());
    }
}
