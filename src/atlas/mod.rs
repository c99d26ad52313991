//! Atlas assembly: packing every item of a configuration into one image
//!
//! [`plan_layout`] collects all items into a single request and calls the
//! bin packer once; [`render_atlas`] draws the placed items and produces
//! the final [`crate::models::BuildResult`].

mod layout;
mod policy;
mod render;

pub use layout::{plan_layout, Layout};
pub use policy::{ItemKind, ItemPolicy, RenderPolicy, SWATCH_SIZE};
pub use render::{crop_extent, render_atlas, RenderedAtlas};

use crate::models::{Animation, FontInfo, Glyph, TextureData, Tileset};

/// One rectangle handed to the packer, tagged with the record it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackItem {
    /// Index into [`AtlasContents::textures`]
    Texture { index: usize },
    /// Tileset index and tile index within that tileset
    Tile { tileset: usize, tile: usize },
    /// Index into [`AtlasContents::glyphs`]
    Glyph { index: usize },
    /// The reserved solid-fill swatch
    Swatch,
}

impl PackItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            PackItem::Texture { .. } => ItemKind::Texture,
            PackItem::Tile { .. } => ItemKind::Tile,
            PackItem::Glyph { .. } => ItemKind::Glyph,
            PackItem::Swatch => ItemKind::Swatch,
        }
    }
}

/// Everything one configuration derived from its sources, in discovery order.
#[derive(Debug, Default)]
pub struct AtlasContents {
    pub textures: Vec<TextureData>,
    pub animations: Vec<Animation>,
    pub tilesets: Vec<Tileset>,
    pub glyphs: Vec<Glyph>,
    pub font: Option<FontInfo>,
}

impl AtlasContents {
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.tilesets.iter().all(|t| t.tiles.is_empty()) && self.glyphs.is_empty()
    }
}
