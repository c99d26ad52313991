//! Atlas rendering and cropping

use std::collections::HashSet;
use std::path::PathBuf;

use image::{imageops, Rgba, RgbaImage};

use crate::composition::Warning;
use crate::models::{
    BuildResult, PlacedGlyph, PlacedTexture, PlacedTile, PlacedTileset, Rect, Size, Tileset,
};

use super::layout::Layout;
use super::policy::RenderPolicy;
use super::{AtlasContents, PackItem};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The final atlas image and the records describing it.
#[derive(Debug)]
pub struct RenderedAtlas {
    pub image: RgbaImage,
    pub result: BuildResult,
    pub warnings: Vec<Warning>,
}

/// Draw every placed item, crop the image if requested and convert the
/// placed records into a [`BuildResult`].
///
/// Animations whose first or last texture was not placed are dropped.
pub fn render_atlas(
    label: &str,
    image_path: PathBuf,
    contents: AtlasContents,
    layout: &Layout,
    policy: &RenderPolicy,
    crop: bool,
) -> RenderedAtlas {
    let mut image = RgbaImage::new(layout.bin_size.w, layout.bin_size.h);
    for (item, rect) in &layout.placed {
        match *item {
            PackItem::Texture { index } => {
                let texture = &contents.textures[index];
                for sy in 0..rect.h {
                    for sx in 0..rect.w {
                        put(&mut image, rect.x + sx as i32, rect.y + sy as i32, texture.source_pixel(sx, sy));
                    }
                }
            }
            PackItem::Tile { tileset, tile } => {
                let tileset = &contents.tilesets[tileset];
                let cell = tileset.cell_rect(&tileset.tiles[tile]);
                draw_tile(&mut image, tileset, cell, *rect, policy.tile.bleed);
            }
            PackItem::Glyph { index } => {
                let bitmap = &contents.glyphs[index].bitmap;
                imageops::replace(&mut image, bitmap, rect.x as i64, rect.y as i64);
            }
            PackItem::Swatch => fill(&mut image, *rect, WHITE),
        }
    }

    let placed_rects: Vec<Rect> = layout.placed.iter().map(|(_, rect)| *rect).collect();
    let atlas_size = if crop { crop_extent(&image, &placed_rects) } else { layout.bin_size };
    if atlas_size != layout.bin_size {
        image = imageops::crop_imm(&image, 0, 0, atlas_size.w, atlas_size.h).to_image();
    }
    log::debug!("{}: atlas {}x{}", label, atlas_size.w, atlas_size.h);

    let (result, warnings) = collect_result(label, image_path, contents, layout, atlas_size);
    RenderedAtlas { image, result, warnings }
}

/// Far edge of the used area: the smallest `[0, w) x [0, h)` containing every
/// pixel with non-zero alpha and every rectangle in `rects`.
///
/// Never smaller than 1x1.
pub fn crop_extent(image: &RgbaImage, rects: &[Rect]) -> Size {
    let mut w = 1u32;
    let mut h = 1u32;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            w = w.max(x + 1);
            h = h.max(y + 1);
        }
    }
    for rect in rects {
        w = w.max(rect.right().max(0) as u32);
        h = h.max(rect.bottom().max(0) as u32);
    }
    Size::new(w.min(image.width().max(1)), h.min(image.height().max(1)))
}

fn put(image: &mut RgbaImage, x: i32, y: i32, pixel: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, pixel);
    }
}

fn fill(image: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            put(image, x, y, color);
        }
    }
}

/// Copy a tile body, then replicate its edge pixels onto the surrounding
/// 1px border when `bleed` is set.
fn draw_tile(image: &mut RgbaImage, tileset: &Tileset, cell: Rect, dest: Rect, bleed: bool) {
    let size = tileset.tile_size as i32;
    let source = |sx: i32, sy: i32| {
        let sx = sx.clamp(0, size - 1);
        let sy = sy.clamp(0, size - 1);
        *tileset.image.get_pixel((cell.x + sx) as u32, (cell.y + sy) as u32)
    };

    let range = if bleed { -1..size + 1 } else { 0..size };
    for sy in range.clone() {
        for sx in range.clone() {
            put(image, dest.x + sx, dest.y + sy, source(sx, sy));
        }
    }
}

fn collect_result(
    label: &str,
    image_path: PathBuf,
    contents: AtlasContents,
    layout: &Layout,
    atlas_size: Size,
) -> (BuildResult, Vec<Warning>) {
    let mut warnings = Vec::new();

    let textures: Vec<PlacedTexture> = contents
        .textures
        .iter()
        .filter_map(|texture| {
            Some(PlacedTexture {
                name: texture.name.clone(),
                rect: texture.placed?,
                trim: texture.trim(),
                doc_size: texture.doc_size,
                duration_ms: texture.duration_ms,
            })
        })
        .collect();

    let placed_names: HashSet<&str> = textures.iter().map(|t| t.name.as_str()).collect();
    let animations = contents
        .animations
        .into_iter()
        .filter(|animation| {
            let complete =
                placed_names.contains(animation.first.as_str()) && placed_names.contains(animation.last.as_str());
            if !complete {
                warnings.push(Warning::new(format!(
                    "{}: animation '{}' dropped, its textures were not placed",
                    label, animation.name
                )));
            }
            complete
        })
        .collect();

    let tilesets = contents
        .tilesets
        .iter()
        .map(|tileset| PlacedTileset {
            name: tileset.name.clone(),
            tile_size: tileset.tile_size,
            columns: tileset.columns,
            rows: tileset.rows,
            tiles: tileset
                .tiles
                .iter()
                .filter_map(|tile| Some(PlacedTile { column: tile.column, row: tile.row, rect: tile.placed? }))
                .collect(),
        })
        .collect();

    let glyphs = contents
        .glyphs
        .iter()
        .filter_map(|glyph| {
            Some(PlacedGlyph {
                ch: glyph.ch,
                rect: glyph.placed?,
                offset_x: glyph.offset_x,
                offset_y: glyph.offset_y,
                advance: glyph.advance,
            })
        })
        .collect();

    let result = BuildResult {
        label: label.to_string(),
        image_path,
        atlas_size,
        textures,
        animations,
        tilesets,
        glyphs,
        swatch: layout.swatch,
        font: contents.font,
    };
    (result, warnings)
}
