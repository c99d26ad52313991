//! Rust source descriptor.
//!
//! The generated file is meant to be `include!`d (or added as a module) by
//! the game crate. It is fully deterministic: the same inputs always yield
//! byte-identical output.
//!
//! # Output Format
//!
//! ```text
//! pub enum TextureName { None, HeroIdle, HeroWalk0, ... }
//! pub enum AnimationName { None, HeroWalk, ... }
//! pub fn texture(name: TextureName) -> Option<TextureRecord> { match name { ... } }
//! pub fn animation(name: AnimationName) -> Option<AnimationRecord> { match name { ... } }
//! pub const ATLASES: [AtlasInfo; N] = [...];
//! pub mod sprites {
//!     pub const ATLAS_PATH: &str = "build/sprites.png";
//!     pub const TILES_GROUND: [[Option<TileRecord>; 4]; 2] = [...];
//!     pub const GLYPHS: [GlyphRecord; 0] = [];
//! }
//! ```

use std::fs;
use std::path::Path;

use crate::models::{Rect, Size, Trim, UvRect};

use super::descriptor::{AtlasEntry, Descriptor, RectEntry, TilesetEntry};
use super::{ExportOptions, Exporter, Result};

const HEADER: &str = "// @generated by atlasbake. Do not edit.\n";

const SHARED_TYPES: &str = r#"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trim {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRecord {
    pub atlas: usize,
    pub rect: Rect,
    pub uv: UvRect,
    pub trim: Trim,
    pub doc_size: (u32, u32),
    pub duration_ms: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopDirection {
    Forward,
    Reverse,
    PingPong,
    PingPongReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationRecord {
    pub first: TextureName,
    pub last: TextureName,
    pub direction: LoopDirection,
    pub repeat: u16,
    pub doc_size: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRecord {
    pub rect: Rect,
    pub uv: UvRect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRecord {
    pub ch: char,
    pub rect: Rect,
    pub uv: UvRect,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasInfo {
    pub label: &'static str,
    pub path: &'static str,
    pub size: (u32, u32),
}
"#;

/// Rust source exporter.
#[derive(Debug, Default)]
pub struct RustExporter;

impl RustExporter {
    pub fn new() -> Self {
        Self
    }

    /// Generate the descriptor source as a string.
    pub fn export_to_string(&self, descriptor: &Descriptor) -> String {
        let mut content = String::from(HEADER);
        content.push_str(SHARED_TYPES);
        content.push('\n');

        write_enum(&mut content, "TextureName", descriptor.textures.iter().map(|t| t.ident.as_str()));
        write_enum(&mut content, "AnimationName", descriptor.animations.iter().map(|a| a.ident.as_str()));

        content.push_str("pub fn texture(name: TextureName) -> Option<TextureRecord> {\n");
        content.push_str("    match name {\n");
        content.push_str("        TextureName::None => None,\n");
        for texture in &descriptor.textures {
            content.push_str(&format!(
                "        TextureName::{} => Some(TextureRecord {{ atlas: {}, rect: {}, uv: {}, trim: {}, doc_size: {}, duration_ms: {:?} }}),\n",
                texture.ident,
                texture.atlas,
                rect_literal(&texture.rect.rect),
                uv_literal(&texture.rect.uv),
                trim_literal(&texture.trim),
                size_literal(texture.doc_size),
                texture.duration_ms,
            ));
        }
        content.push_str("    }\n}\n\n");

        content.push_str("pub fn animation(name: AnimationName) -> Option<AnimationRecord> {\n");
        content.push_str("    match name {\n");
        content.push_str("        AnimationName::None => None,\n");
        for animation in &descriptor.animations {
            content.push_str(&format!(
                "        AnimationName::{} => Some(AnimationRecord {{ first: TextureName::{}, last: TextureName::{}, direction: LoopDirection::{}, repeat: {}, doc_size: {} }}),\n",
                animation.ident,
                animation.first_ident,
                animation.last_ident,
                animation.direction.as_str(),
                animation.repeat,
                size_literal(animation.doc_size),
            ));
        }
        content.push_str("    }\n}\n\n");

        content.push_str(&format!("pub const ATLASES: [AtlasInfo; {}] = [\n", descriptor.atlases.len()));
        for atlas in &descriptor.atlases {
            content.push_str(&format!(
                "    AtlasInfo {{ label: {:?}, path: {:?}, size: {} }},\n",
                atlas.label,
                atlas.image_path,
                size_literal(atlas.size),
            ));
        }
        content.push_str("];\n");

        for (index, atlas) in descriptor.atlases.iter().enumerate() {
            content.push('\n');
            write_atlas_module(&mut content, index, atlas);
        }

        content
    }
}

impl Exporter for RustExporter {
    fn export(&self, descriptor: &Descriptor, output_path: &Path, _options: &ExportOptions) -> Result<()> {
        let content = self.export_to_string(descriptor);

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, content)?;

        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "rust"
    }

    fn extension(&self) -> &'static str {
        "rs"
    }
}

fn write_enum<'a>(content: &mut String, name: &str, variants: impl Iterator<Item = &'a str>) {
    content.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]\n");
    content.push_str(&format!("pub enum {} {{\n", name));
    content.push_str("    None,\n");
    for variant in variants {
        content.push_str(&format!("    {},\n", variant));
    }
    content.push_str("}\n\n");
}

fn write_atlas_module(content: &mut String, index: usize, atlas: &AtlasEntry) {
    content.push_str(&format!("/// Atlas {:?}\n", atlas.label));
    content.push_str(&format!("pub mod {} {{\n", atlas.module));
    content.push_str("    #[allow(unused_imports)]\n");
    content.push_str("    use super::*;\n\n");
    content.push_str(&format!("    pub const ATLAS_INDEX: usize = {};\n", index));
    content.push_str(&format!("    pub const ATLAS_PATH: &str = {:?};\n", atlas.image_path));
    content.push_str(&format!("    pub const ATLAS_SIZE: (u32, u32) = {};\n", size_literal(atlas.size)));

    if let Some(RectEntry { rect, uv }) = &atlas.swatch {
        content.push_str(&format!("    pub const SWATCH_RECT: Rect = {};\n", rect_literal(rect)));
        content.push_str(&format!("    pub const SWATCH_UV: UvRect = {};\n", uv_literal(uv)));
    }

    if let Some(font) = &atlas.font {
        content.push_str(&format!("    pub const FONT_SIZE: u32 = {};\n", font.size));
        content.push_str(&format!("    pub const FONT_CHARSET: &str = {:?};\n", font.charset));
    }

    for tileset in &atlas.tilesets {
        content.push('\n');
        write_tileset(content, tileset);
    }

    content.push('\n');
    content.push_str(&format!("    pub const GLYPHS: [GlyphRecord; {}] = [\n", atlas.glyphs.len()));
    for glyph in &atlas.glyphs {
        content.push_str(&format!(
            "        GlyphRecord {{ ch: {:?}, rect: {}, uv: {}, offset_x: {}, offset_y: {}, advance: {:?} }},\n",
            glyph.ch,
            rect_literal(&glyph.rect.rect),
            uv_literal(&glyph.rect.uv),
            glyph.offset_x,
            glyph.offset_y,
            glyph.advance,
        ));
    }
    content.push_str("    ];\n");
    content.push_str("}\n");
}

fn write_tileset(content: &mut String, tileset: &TilesetEntry) {
    content.push_str(&format!(
        "    /// {:?}: {}x{} tiles of {}px\n",
        tileset.name, tileset.columns, tileset.rows, tileset.tile_size
    ));
    content.push_str(&format!(
        "    pub const {}: [[Option<TileRecord>; {}]; {}] = [\n",
        tileset.ident, tileset.columns, tileset.rows
    ));
    for row in tileset.grid() {
        content.push_str("        [\n");
        for cell in row {
            match cell {
                Some(tile) => content.push_str(&format!(
                    "            Some(TileRecord {{ rect: {}, uv: {} }}),\n",
                    rect_literal(&tile.rect.rect),
                    uv_literal(&tile.rect.uv),
                )),
                None => content.push_str("            None,\n"),
            }
        }
        content.push_str("        ],\n");
    }
    content.push_str("    ];\n");
}

fn rect_literal(rect: &Rect) -> String {
    format!("Rect {{ x: {}, y: {}, w: {}, h: {} }}", rect.x.max(0), rect.y.max(0), rect.w, rect.h)
}

/// Floats use `Debug` formatting: shortest round-trip and always a valid literal.
fn uv_literal(uv: &UvRect) -> String {
    format!("UvRect {{ u0: {:?}, v0: {:?}, u1: {:?}, v1: {:?} }}", uv.u0, uv.v0, uv.u1, uv.v1)
}

fn trim_literal(trim: &Trim) -> String {
    format!(
        "Trim {{ left: {}, top: {}, right: {}, bottom: {} }}",
        trim.left, trim.top, trim.right, trim.bottom
    )
}

fn size_literal(size: Size) -> String {
    format!("({}, {})", size.w, size.h)
}
