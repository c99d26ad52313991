//! Packing orchestration

use std::collections::HashSet;

use crate::composition::Warning;
use crate::models::{Rect, Size};
use crate::packer::{BinPacker, PackRect};

use super::policy::{RenderPolicy, SWATCH_SIZE};
use super::{AtlasContents, PackItem};

/// Placement of every item that fit, in the order the packer returned them.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Packed items with their content rectangles
    pub placed: Vec<(PackItem, Rect)>,
    /// Content rectangle of the swatch, if it was placed
    pub swatch: Option<Rect>,
    pub bin_size: Size,
    pub overflow: bool,
    pub warnings: Vec<Warning>,
}

/// Pack every texture, tile and glyph plus the reserved swatch into one
/// square bin of side `bin_size`.
///
/// The content rectangle of each placed item is written back to its record
/// (`placed`). On overflow the items that were placed keep their
/// coordinates and the rest stay unplaced.
pub fn plan_layout(
    label: &str,
    contents: &mut AtlasContents,
    policy: &RenderPolicy,
    bin_size: u32,
    packer: &dyn BinPacker,
) -> Layout {
    let mut items = Vec::new();
    for (index, texture) in contents.textures.iter().enumerate() {
        items.push((PackItem::Texture { index }, texture.source.w, texture.source.h));
    }
    for (tileset_index, tileset) in contents.tilesets.iter().enumerate() {
        for tile in 0..tileset.tiles.len() {
            items.push((PackItem::Tile { tileset: tileset_index, tile }, tileset.tile_size, tileset.tile_size));
        }
    }
    for (index, glyph) in contents.glyphs.iter().enumerate() {
        items.push((PackItem::Glyph { index }, glyph.bitmap.width(), glyph.bitmap.height()));
    }
    items.push((PackItem::Swatch, SWATCH_SIZE, SWATCH_SIZE));

    let request: Vec<PackRect> = items
        .iter()
        .enumerate()
        .map(|(id, (item, w, h))| {
            let (w, h) = policy.for_kind(item.kind()).packed_size(*w, *h);
            PackRect { id, w, h }
        })
        .collect();

    log::debug!("{}: packing {} item(s) into {}x{}", label, request.len(), bin_size, bin_size);
    let outcome = packer.pack(bin_size, bin_size, &request);

    let mut layout = Layout { bin_size: Size::new(bin_size, bin_size), overflow: outcome.overflow, ..Layout::default() };
    let mut seen = HashSet::new();
    for placement in outcome.placements {
        let Some((item, w, h)) = items.get(placement.id).copied() else {
            layout.warnings.push(Warning::new(format!("{}: packer returned unknown item {}", label, placement.id)));
            continue;
        };
        let packed = request[placement.id];
        if placement.x + packed.w > bin_size || placement.y + packed.h > bin_size || !seen.insert(placement.id) {
            layout.warnings.push(Warning::new(format!(
                "{}: packer returned an invalid placement for item {}",
                label, placement.id
            )));
            continue;
        }

        let rect = policy.for_kind(item.kind()).content_rect(placement.x, placement.y, w, h);
        match item {
            PackItem::Texture { index } => contents.textures[index].placed = Some(rect),
            PackItem::Tile { tileset, tile } => contents.tilesets[tileset].tiles[tile].placed = Some(rect),
            PackItem::Glyph { index } => contents.glyphs[index].placed = Some(rect),
            PackItem::Swatch => layout.swatch = Some(rect),
        }
        layout.placed.push((item, rect));
    }

    if layout.overflow {
        layout.warnings.push(Warning::error(format!(
            "{}: {} of {} item(s) do not fit in a {}x{} bin, increase bin_size",
            label,
            request.len() - layout.placed.len(),
            request.len(),
            bin_size,
            bin_size
        )));
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Glyph, TextureData, Tile, Tileset};
    use crate::packer::{PackOutcome, Placement, ShelfPacker};
    use image::RgbaImage;

    fn texture(name: &str, w: u32, h: u32) -> TextureData {
        TextureData {
            name: name.to_string(),
            pixels: RgbaImage::new(w, h),
            origin: (0, 0),
            source: Rect::new(0, 0, w, h),
            doc_size: Size::new(w, h),
            duration_ms: None,
            placed: None,
        }
    }

    fn contents() -> AtlasContents {
        AtlasContents {
            textures: vec![texture("a", 4, 4), texture("b", 2, 6)],
            tilesets: vec![Tileset {
                name: "ground".to_string(),
                image: RgbaImage::new(8, 8),
                tile_size: 8,
                columns: 1,
                rows: 1,
                tiles: vec![Tile { column: 0, row: 0, placed: None }],
            }],
            glyphs: vec![Glyph {
                ch: 'x',
                bitmap: RgbaImage::new(3, 5),
                offset_x: 0,
                offset_y: 0,
                advance: 4.0,
                placed: None,
            }],
            ..AtlasContents::default()
        }
    }

    /// Places nothing.
    struct RejectAll;

    impl BinPacker for RejectAll {
        fn pack(&self, _: u32, _: u32, _: &[PackRect]) -> PackOutcome {
            PackOutcome { placements: Vec::new(), overflow: true }
        }
    }

    /// Places item 0 twice and one item outside the bin.
    struct Broken;

    impl BinPacker for Broken {
        fn pack(&self, _: u32, _: u32, _: &[PackRect]) -> PackOutcome {
            PackOutcome {
                placements: vec![
                    Placement { id: 0, x: 0, y: 0 },
                    Placement { id: 0, x: 10, y: 0 },
                    Placement { id: 1, x: 63, y: 63 },
                    Placement { id: 99, x: 0, y: 0 },
                ],
                overflow: false,
            }
        }
    }

    #[test]
    fn test_every_item_placed_with_padding() {
        let mut contents = contents();
        let layout = plan_layout("test", &mut contents, &RenderPolicy::new(true), 64, &ShelfPacker);

        assert!(!layout.overflow);
        assert!(layout.warnings.is_empty());
        assert_eq!(layout.placed.len(), 5);
        assert!(layout.swatch.is_some());

        let tile = contents.tilesets[0].tiles[0].placed.unwrap();
        assert_eq!((tile.w, tile.h), (8, 8));
        let glyph = contents.glyphs[0].placed.unwrap();
        assert_eq!((glyph.w, glyph.h), (3, 5));
        assert!(glyph.x >= 1 && glyph.y >= 1);

        for (i, (_, a)) in layout.placed.iter().enumerate() {
            for (_, b) in &layout.placed[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_overflow_leaves_items_unplaced() {
        let mut contents = contents();
        let layout = plan_layout("tiny", &mut contents, &RenderPolicy::default(), 8, &RejectAll);

        assert!(layout.overflow);
        assert!(layout.placed.is_empty());
        assert!(layout.swatch.is_none());
        assert!(contents.textures.iter().all(|t| t.placed.is_none()));
        assert!(layout.warnings[0].message.contains("8x8"));
    }

    #[test]
    fn test_invalid_placements_ignored() {
        let mut contents = contents();
        let layout = plan_layout("broken", &mut contents, &RenderPolicy::default(), 64, &Broken);

        assert_eq!(layout.placed.len(), 1);
        assert_eq!(contents.textures[0].placed, Some(Rect::new(0, 0, 4, 4)));
        assert!(contents.textures[1].placed.is_none());
        assert_eq!(layout.warnings.len(), 3);
    }
}
