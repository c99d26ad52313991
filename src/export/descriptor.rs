//! Merged descriptor model
//!
//! All per-configuration build results are merged into one [`Descriptor`]
//! before any text is generated. Identifiers are allocated here so every
//! output format agrees on them.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{BuildResult, FontInfo, LoopDirection, Rect, Size, Trim, UvRect};

use super::ident::{camel_case, screaming_snake_case, snake_case, IdentAllocator};

/// Pixel rectangle plus its normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectEntry {
    pub rect: Rect,
    pub uv: UvRect,
}

impl RectEntry {
    fn new(rect: Rect, atlas: Size) -> Self {
        Self { rect, uv: UvRect::normalize(&rect, atlas) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureEntry {
    pub name: String,
    /// Enum variant in generated code
    pub ident: String,
    /// Index into [`Descriptor::atlases`]
    pub atlas: usize,
    #[serde(flatten)]
    pub rect: RectEntry,
    pub trim: Trim,
    pub doc_size: Size,
    pub duration_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationEntry {
    pub name: String,
    pub ident: String,
    pub atlas: usize,
    /// Texture names
    pub first: String,
    pub last: String,
    /// Texture identifiers of `first` and `last`
    #[serde(skip)]
    pub first_ident: String,
    #[serde(skip)]
    pub last_ident: String,
    pub direction: LoopDirection,
    pub repeat: u16,
    pub doc_size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileEntry {
    pub column: u32,
    pub row: u32,
    #[serde(flatten)]
    pub rect: RectEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilesetEntry {
    pub name: String,
    /// Constant name in generated code
    pub ident: String,
    pub tile_size: u32,
    pub columns: u32,
    pub rows: u32,
    /// Non-blank tiles, row by row
    pub tiles: Vec<TileEntry>,
}

impl TilesetEntry {
    /// Dense `rows x columns` grid with `None` for blank cells.
    pub fn grid(&self) -> Vec<Vec<Option<&TileEntry>>> {
        let mut grid = vec![vec![None; self.columns as usize]; self.rows as usize];
        for tile in &self.tiles {
            if let Some(cell) = grid.get_mut(tile.row as usize).and_then(|r| r.get_mut(tile.column as usize)) {
                *cell = Some(tile);
            }
        }
        grid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphEntry {
    pub ch: char,
    #[serde(flatten)]
    pub rect: RectEntry,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasEntry {
    pub label: String,
    /// Module name in generated code
    pub module: String,
    pub image_path: String,
    pub size: Size,
    pub swatch: Option<RectEntry>,
    pub font: Option<FontInfo>,
    pub tilesets: Vec<TilesetEntry>,
    pub glyphs: Vec<GlyphEntry>,
}

/// Everything the descriptor outputs contain, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Descriptor {
    pub atlases: Vec<AtlasEntry>,
    pub textures: Vec<TextureEntry>,
    pub animations: Vec<AnimationEntry>,
}

impl Descriptor {
    /// Merge build results in configuration order.
    ///
    /// Texture and animation identifiers are unique across all atlases; `None`
    /// is reserved for the empty variant. Animations resolve their texture
    /// names within their own atlas.
    pub fn merge(results: &[BuildResult]) -> Descriptor {
        let mut modules = IdentAllocator::new();
        let mut texture_idents = IdentAllocator::new().with_reserved(&["None"]);
        let mut animation_idents = IdentAllocator::new().with_reserved(&["None"]);
        let mut descriptor = Descriptor::default();

        for (atlas, result) in results.iter().enumerate() {
            let size = result.atlas_size;
            let mut by_name: HashMap<&str, String> = HashMap::new();

            for texture in &result.textures {
                let ident = texture_idents.allocate(camel_case(&texture.name));
                by_name.entry(texture.name.as_str()).or_insert_with(|| ident.clone());
                descriptor.textures.push(TextureEntry {
                    name: texture.name.clone(),
                    ident,
                    atlas,
                    rect: RectEntry::new(texture.rect, size),
                    trim: texture.trim,
                    doc_size: texture.doc_size,
                    duration_ms: texture.duration_ms,
                });
            }

            for animation in &result.animations {
                let (Some(first), Some(last)) =
                    (by_name.get(animation.first.as_str()), by_name.get(animation.last.as_str()))
                else {
                    continue;
                };
                descriptor.animations.push(AnimationEntry {
                    name: animation.name.clone(),
                    ident: animation_idents.allocate(camel_case(&animation.name)),
                    atlas,
                    first: animation.first.clone(),
                    last: animation.last.clone(),
                    first_ident: first.clone(),
                    last_ident: last.clone(),
                    direction: animation.direction,
                    repeat: animation.repeat,
                    doc_size: animation.doc_size,
                });
            }

            let mut tileset_idents = IdentAllocator::new();
            let tilesets = result
                .tilesets
                .iter()
                .map(|tileset| TilesetEntry {
                    name: tileset.name.clone(),
                    ident: tileset_idents.allocate(format!("TILES_{}", screaming_snake_case(&tileset.name))),
                    tile_size: tileset.tile_size,
                    columns: tileset.columns,
                    rows: tileset.rows,
                    tiles: tileset
                        .tiles
                        .iter()
                        .map(|tile| TileEntry { column: tile.column, row: tile.row, rect: RectEntry::new(tile.rect, size) })
                        .collect(),
                })
                .collect();

            let glyphs = result
                .glyphs
                .iter()
                .map(|glyph| GlyphEntry {
                    ch: glyph.ch,
                    rect: RectEntry::new(glyph.rect, size),
                    offset_x: glyph.offset_x,
                    offset_y: glyph.offset_y,
                    advance: glyph.advance,
                })
                .collect();

            descriptor.atlases.push(AtlasEntry {
                label: result.label.clone(),
                module: modules.allocate(snake_case(&result.label)),
                image_path: result.image_path.display().to_string(),
                size,
                swatch: result.swatch.map(|rect| RectEntry::new(rect, size)),
                font: result.font.clone(),
                tilesets,
                glyphs,
            });
        }

        descriptor
    }
}
