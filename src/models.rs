//! Derived asset models shared by the pipeline stages.
//!
//! The parser produces raw [`crate::aseprite::Document`]s; everything in this
//! module is what the compositor, slicer and glyph extractor derive from them
//! and what the packer and renderer place into an atlas.

use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use serde::Serialize;

pub use crate::aseprite::LoopDirection;

/// Integer rectangle. `x`/`y` may be negative while compositing cels that
/// hang over the document edge; atlas placements are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Smallest rectangle containing both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    /// Overlapping area, or `None` when the rectangles do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

/// Distance from a document's origin to the top-left of its trimmed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

/// Transparent pixels trimmed away on each edge of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Trim {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// A rectangle normalized to texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// Normalize a pixel rectangle against an atlas size.
    pub fn normalize(rect: &Rect, atlas: Size) -> UvRect {
        let w = atlas.w.max(1) as f32;
        let h = atlas.h.max(1) as f32;
        UvRect {
            u0: rect.x as f32 / w,
            v0: rect.y as f32 / h,
            u1: rect.right() as f32 / w,
            v1: rect.bottom() as f32 / h,
        }
    }
}

/// One exported frame (or layer) waiting to be packed.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Globally unique texture name (e.g. `hero/walk.3`)
    pub name: String,
    /// Composited pixels covering the union of the contributing cels
    pub pixels: RgbaImage,
    /// Document coordinate of `pixels(0, 0)`; negative when cels overhang
    pub origin: (i32, i32),
    /// Visible part of the content in document coordinates
    pub source: Rect,
    /// Full document canvas size
    pub doc_size: Size,
    /// Frame duration for multi-frame documents
    pub duration_ms: Option<u32>,
    /// Content rectangle in the atlas, filled in by the packing orchestrator
    pub placed: Option<Rect>,
}

impl TextureData {
    /// Trim offset: where the source rectangle starts inside the document.
    pub fn trim_offset(&self) -> Offset {
        Offset { x: self.source.x.max(0) as u32, y: self.source.y.max(0) as u32 }
    }

    /// Trim amounts on all four edges.
    pub fn trim(&self) -> Trim {
        let offset = self.trim_offset();
        Trim {
            left: offset.x,
            top: offset.y,
            right: self.doc_size.w.saturating_sub(offset.x + self.source.w),
            bottom: self.doc_size.h.saturating_sub(offset.y + self.source.h),
        }
    }

    /// Pixel at `(sx, sy)` relative to the source rectangle.
    pub fn source_pixel(&self, sx: u32, sy: u32) -> Rgba<u8> {
        let bx = self.source.x - self.origin.0 + sx as i32;
        let by = self.source.y - self.origin.1 + sy as i32;
        if bx < 0 || by < 0 || bx as u32 >= self.pixels.width() || by as u32 >= self.pixels.height() {
            return Rgba([0, 0, 0, 0]);
        }
        *self.pixels.get_pixel(bx as u32, by as u32)
    }
}

/// A named clip referencing its first and last texture by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Animation {
    pub name: String,
    pub first: String,
    pub last: String,
    pub direction: LoopDirection,
    /// Number of repetitions, 0 means forever
    pub repeat: u16,
    pub doc_size: Size,
    /// `false` for the whole-document clip synthesized when no tag covers it
    pub explicit: bool,
}

/// One non-blank grid cell of a tileset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub column: u32,
    pub row: u32,
    /// Content rectangle in the atlas, filled in by the packing orchestrator
    pub placed: Option<Rect>,
}

/// A flattened tileset image and the cells that survived slicing.
#[derive(Debug, Clone)]
pub struct Tileset {
    pub name: String,
    pub image: RgbaImage,
    pub tile_size: u32,
    pub columns: u32,
    pub rows: u32,
    pub tiles: Vec<Tile>,
}

impl Tileset {
    /// Source rectangle of a tile inside the tileset image.
    pub fn cell_rect(&self, tile: &Tile) -> Rect {
        Rect::new(
            (tile.column * self.tile_size) as i32,
            (tile.row * self.tile_size) as i32,
            self.tile_size,
            self.tile_size,
        )
    }
}

/// A rasterized character with its layout metrics.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub ch: char,
    pub bitmap: RgbaImage,
    /// Horizontal offset of the bitmap from the pen position
    pub offset_x: i32,
    /// Vertical offset of the bitmap from the top of the line
    pub offset_y: i32,
    pub advance: f32,
    /// Content rectangle in the atlas, filled in by the packing orchestrator
    pub placed: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTexture {
    pub name: String,
    pub rect: Rect,
    pub trim: Trim,
    pub doc_size: Size,
    pub duration_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTile {
    pub column: u32,
    pub row: u32,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTileset {
    pub name: String,
    pub tile_size: u32,
    pub columns: u32,
    pub rows: u32,
    pub tiles: Vec<PlacedTile>,
}

impl PlacedTileset {
    /// Tile at a grid coordinate; `None` for blank or unplaced cells.
    pub fn tile_at(&self, column: u32, row: u32) -> Option<&PlacedTile> {
        self.tiles.iter().find(|t| t.column == column && t.row == row)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedGlyph {
    pub ch: char,
    pub rect: Rect,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance: f32,
}

/// Font parameters echoed into the descriptor of a font atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontInfo {
    pub size: u32,
    pub charset: String,
}

/// Everything one configuration produced, in final atlas coordinates.
///
/// Every rectangle lies inside `[0, atlas_size.w) x [0, atlas_size.h)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildResult {
    /// Package label of the configuration
    pub label: String,
    pub image_path: PathBuf,
    /// Atlas size after cropping
    pub atlas_size: Size,
    pub textures: Vec<PlacedTexture>,
    pub animations: Vec<Animation>,
    pub tilesets: Vec<PlacedTileset>,
    pub glyphs: Vec<PlacedGlyph>,
    pub swatch: Option<Rect>,
    pub font: Option<FontInfo>,
}

impl BuildResult {
    /// All rectangles held by this result.
    pub fn rects(&self) -> Vec<Rect> {
        let mut rects: Vec<Rect> = self.textures.iter().map(|t| t.rect).collect();
        rects.extend(self.tilesets.iter().flat_map(|t| t.tiles.iter().map(|tile| tile.rect)));
        rects.extend(self.glyphs.iter().map(|g| g.rect));
        rects.extend(self.swatch);
        rects
    }

    pub fn uv(&self, rect: &Rect) -> UvRect {
        UvRect::normalize(rect, self.atlas_size)
    }
}
