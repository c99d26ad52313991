//! Padding and bleed rules per packed item kind

use crate::models::Rect;

/// Side length of the reserved solid-fill swatch.
pub const SWATCH_SIZE: u32 = 10;

/// Kind of a packed item, used to select its [`ItemPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Texture,
    Tile,
    Glyph,
    Swatch,
}

/// How much room an item reserves around its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPolicy {
    /// Offset of the content from the top-left of the packed rectangle
    pub inset: u32,
    /// Total extra width and height reserved around the content
    pub extra: u32,
    /// Replicate a 1px border from the content edges
    pub bleed: bool,
}

impl ItemPolicy {
    pub const fn new(inset: u32, extra: u32, bleed: bool) -> Self {
        Self { inset, extra, bleed }
    }

    /// Size to request from the packer for content of `w` x `h`.
    pub fn packed_size(&self, w: u32, h: u32) -> (u32, u32) {
        (w + self.extra, h + self.extra)
    }

    /// Content rectangle for an item packed at `(x, y)`.
    pub fn content_rect(&self, x: u32, y: u32, w: u32, h: u32) -> Rect {
        Rect::new((x + self.inset) as i32, (y + self.inset) as i32, w, h)
    }
}

/// The item policies of one atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPolicy {
    pub texture: ItemPolicy,
    pub tile: ItemPolicy,
    pub glyph: ItemPolicy,
    pub swatch: ItemPolicy,
}

impl RenderPolicy {
    /// Default policies; `tile_bleed` switches tiles to a bleed border.
    pub fn new(tile_bleed: bool) -> Self {
        Self {
            texture: ItemPolicy::new(0, 1, false),
            tile: if tile_bleed { ItemPolicy::new(1, 3, true) } else { ItemPolicy::new(0, 1, false) },
            glyph: ItemPolicy::new(1, 2, false),
            swatch: ItemPolicy::new(1, 2, false),
        }
    }

    pub fn for_kind(&self, kind: ItemKind) -> ItemPolicy {
        match kind {
            ItemKind::Texture => self.texture,
            ItemKind::Tile => self.tile,
            ItemKind::Glyph => self.glyph,
            ItemKind::Swatch => self.swatch,
        }
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}
