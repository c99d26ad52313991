//! Per-document state shared by every frame composited from it

use crate::aseprite::{CelChunk, CelContent, Chunk, ColorDepth, Document, LayerChunk, LayerKind, Palette};
use crate::models::{Rect, Size};

use super::Warning;

/// Links deeper than this are treated as broken.
const MAX_LINK_DEPTH: usize = 16;

/// Layer visibility, palette and opacity rules resolved once per document.
#[derive(Debug)]
pub struct DocumentContext<'a> {
    document: &'a Document,
    layers: Vec<&'a LayerChunk>,
    /// `exported[i]` is true when layer `i` contributes pixels
    exported: Vec<bool>,
    palette: Option<&'a Palette>,
}

impl<'a> DocumentContext<'a> {
    /// Resolve layer visibility and pick the palette.
    ///
    /// A layer contributes only when it and every enclosing group are
    /// visible, it is not a reference layer, and it is a normal image layer.
    pub fn new(document: &'a Document) -> (Self, Vec<Warning>) {
        let mut warnings = Vec::new();
        let layers: Vec<&LayerChunk> = document.layers().collect();

        // Effective visibility of the enclosing group at each nesting depth.
        let mut parents: Vec<bool> = Vec::new();
        let mut exported = Vec::with_capacity(layers.len());
        for layer in &layers {
            let depth = layer.child_level as usize;
            parents.truncate(depth);
            let parent_visible = parents.iter().all(|v| *v) && parents.len() == depth;
            let effective = parent_visible && layer.visible && !layer.reference;
            exported.push(effective && layer.kind == LayerKind::Normal);
            if layer.kind == LayerKind::Group {
                parents.push(effective);
            }
        }

        if !exported.iter().any(|e| *e) {
            warnings.push(Warning::new("document has no visible layers"));
        }

        let palette = select_palette(document, &mut warnings);
        if document.header.color_depth == ColorDepth::Indexed && palette.is_none() {
            warnings.push(Warning::error(
                "indexed document has no palette, its pixels render transparent",
            ));
        }

        (Self { document, layers, exported, palette }, warnings)
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn doc_size(&self) -> Size {
        Size::new(self.document.header.width as u32, self.document.header.height as u32)
    }

    pub fn doc_rect(&self) -> Rect {
        let size = self.doc_size();
        Rect::new(0, 0, size.w, size.h)
    }

    pub fn frame_count(&self) -> usize {
        self.document.frames.len()
    }

    pub fn palette(&self) -> Option<&'a Palette> {
        self.palette
    }

    pub fn transparent_index(&self) -> u8 {
        self.document.header.transparent_index
    }

    pub fn is_exported(&self, layer_index: usize) -> bool {
        self.exported.get(layer_index).copied().unwrap_or(false)
    }

    /// Layers that contribute pixels, in declaration order.
    pub fn exported_layers(&self) -> impl Iterator<Item = &'a LayerChunk> + '_ {
        self.layers.iter().copied().filter(|layer| self.is_exported(layer.index))
    }

    /// Layer opacity, or fully opaque when the header says it is not valid.
    pub fn layer_opacity(&self, layer_index: usize) -> u8 {
        if !self.document.header.layer_opacity_valid {
            return 255;
        }
        self.layers.get(layer_index).map(|layer| layer.opacity).unwrap_or(255)
    }

    /// The cel of `layer_index` in `frame_index`, if any.
    pub fn cel(&self, frame_index: usize, layer_index: u16) -> Option<&'a CelChunk> {
        self.document
            .frames
            .get(frame_index)?
            .cels()
            .find(|cel| cel.layer_index == layer_index)
    }

    /// Follow linked cels to the cel that owns the pixels.
    ///
    /// Returns `None` for a link to a frame without a cel on the same layer.
    pub fn resolve_link(&self, cel: &'a CelChunk) -> Option<&'a CelChunk> {
        let mut current = cel;
        for _ in 0..MAX_LINK_DEPTH {
            match current.content {
                CelContent::Linked { frame } => {
                    current = self.cel(frame as usize, current.layer_index)?;
                }
                _ => return Some(current),
            }
        }
        None
    }
}

/// First non-empty new-style palette, else the first legacy one.
fn select_palette<'a>(document: &'a Document, warnings: &mut Vec<Warning>) -> Option<&'a Palette> {
    let palettes: Vec<&Palette> = document
        .chunks()
        .filter_map(|chunk| match chunk {
            Chunk::Palette(palette) if !palette.is_empty() => Some(palette),
            _ => None,
        })
        .collect();
    if palettes.len() > 1 {
        warnings.push(Warning::new(format!(
            "document has {} palette chunks, using the first",
            palettes.len()
        )));
    }
    if let Some(palette) = palettes.first() {
        return Some(*palette);
    }

    document.chunks().find_map(|chunk| match chunk {
        Chunk::LegacyPalette(palette) if !palette.is_empty() => Some(palette),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aseprite::{Frame, Header};

    fn layer(index: usize, kind: LayerKind, child_level: u16, visible: bool) -> Chunk {
        Chunk::Layer(LayerChunk {
            index,
            visible,
            reference: false,
            kind,
            child_level,
            opacity: 255,
            name: format!("layer{}", index),
        })
    }

    fn document(chunks: Vec<Chunk>) -> Document {
        Document {
            header: Header {
                width: 4,
                height: 4,
                color_depth: ColorDepth::Rgba,
                layer_opacity_valid: true,
                transparent_index: 0,
                num_colors: 0,
            },
            frames: vec![Frame { duration_ms: 100, chunks }],
        }
    }

    #[test]
    fn test_hidden_group_hides_children() {
        let doc = document(vec![
            layer(0, LayerKind::Group, 0, false),
            layer(1, LayerKind::Normal, 1, true),
            layer(2, LayerKind::Normal, 0, true),
        ]);
        let (ctx, _) = DocumentContext::new(&doc);
        assert!(!ctx.is_exported(0));
        assert!(!ctx.is_exported(1));
        assert!(ctx.is_exported(2));
    }

    #[test]
    fn test_nested_groups() {
        let doc = document(vec![
            layer(0, LayerKind::Group, 0, true),
            layer(1, LayerKind::Group, 1, false),
            layer(2, LayerKind::Normal, 2, true),
            layer(3, LayerKind::Normal, 1, true),
        ]);
        let (ctx, warnings) = DocumentContext::new(&doc);
        assert!(!ctx.is_exported(2));
        assert!(ctx.is_exported(3));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_reference_and_tilemap_layers_skipped() {
        let mut reference = layer(0, LayerKind::Normal, 0, true);
        if let Chunk::Layer(l) = &mut reference {
            l.reference = true;
        }
        let doc = document(vec![reference, layer(1, LayerKind::Tilemap, 0, true)]);
        let (ctx, warnings) = DocumentContext::new(&doc);
        assert_eq!(ctx.exported_layers().count(), 0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_layer_opacity_ignored_without_flag() {
        let mut half = layer(0, LayerKind::Normal, 0, true);
        if let Chunk::Layer(l) = &mut half {
            l.opacity = 128;
        }
        let mut doc = document(vec![half]);
        assert_eq!(DocumentContext::new(&doc).0.layer_opacity(0), 128);
        doc.header.layer_opacity_valid = false;
        assert_eq!(DocumentContext::new(&doc).0.layer_opacity(0), 255);
    }

    #[test]
    fn test_new_palette_preferred_over_legacy() {
        let legacy = Palette { colors: vec![image::Rgba([1, 1, 1, 255])] };
        let current = Palette { colors: vec![image::Rgba([2, 2, 2, 255])] };
        let mut doc = document(vec![
            layer(0, LayerKind::Normal, 0, true),
            Chunk::LegacyPalette(legacy),
            Chunk::Palette(current.clone()),
        ]);
        doc.header.color_depth = ColorDepth::Indexed;
        let (ctx, warnings) = DocumentContext::new(&doc);
        assert_eq!(ctx.palette(), Some(&current));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_palette_is_recoverable_error() {
        let mut doc = document(vec![layer(0, LayerKind::Normal, 0, true)]);
        doc.header.color_depth = ColorDepth::Indexed;
        let (ctx, warnings) = DocumentContext::new(&doc);
        assert!(ctx.palette().is_none());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, super::super::Severity::Error);
    }
}
