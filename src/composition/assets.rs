//! Textures and animations derived from a whole document

use std::collections::HashSet;

use image::RgbaImage;

use crate::aseprite::{Document, LoopDirection};
use crate::models::{Animation, Rect, Size, TextureData};

use super::context::DocumentContext;
use super::error::Warning;
use super::render::{composite_frame, composite_layer};

/// Everything a document contributes to an atlas.
#[derive(Debug, Default)]
pub struct DocumentAssets {
    pub textures: Vec<TextureData>,
    pub animations: Vec<Animation>,
    pub warnings: Vec<Warning>,
}

/// Texture name of a flattened frame.
pub fn frame_texture_name(doc_name: &str, frame_index: usize, multi_frame: bool) -> String {
    if multi_frame {
        format!("{}.{}", doc_name, frame_index)
    } else {
        doc_name.to_string()
    }
}

/// Texture name of one layer of a frame.
pub fn layer_texture_name(doc_name: &str, layer_name: &str, frame_index: usize, multi_frame: bool) -> String {
    if multi_frame {
        format!("{}.{}.{}", doc_name, layer_name, frame_index)
    } else {
        format!("{}.{}", doc_name, layer_name)
    }
}

/// Flatten every frame into one texture and derive the animations.
///
/// Frames without any cel on an exported layer produce no texture. Tags
/// become explicit animations; a multi-frame document that no tag covers
/// from its first to its last frame also gets an implicit animation named
/// after the document.
pub fn sprite_assets(doc_name: &str, document: &Document) -> DocumentAssets {
    let (ctx, mut warnings) = DocumentContext::new(document);
    let doc_size = ctx.doc_size();
    let multi_frame = ctx.frame_count() > 1;

    let mut textures = Vec::new();
    // Name of the texture each frame produced, if any
    let mut frame_textures: Vec<Option<String>> = Vec::with_capacity(ctx.frame_count());

    for (index, frame) in document.frames.iter().enumerate() {
        let (image, frame_warnings) = composite_frame(&ctx, index);
        warnings.extend(frame_warnings);

        let name = frame_texture_name(doc_name, index, multi_frame);
        let duration = multi_frame.then_some(frame.duration_ms as u32);
        match image.and_then(|image| image.into_texture(name.clone(), doc_size, duration)) {
            Some(texture) => {
                textures.push(texture);
                frame_textures.push(Some(name));
            }
            None => frame_textures.push(None),
        }
    }

    let animations = document_animations(doc_name, document, &frame_textures, &mut warnings);

    DocumentAssets {
        textures,
        animations,
        warnings: warnings.into_iter().map(|w| w.in_source(doc_name)).collect(),
    }
}

/// Export each exported layer of each frame as its own texture.
///
/// No blending happens between layers and no animations are derived.
pub fn layer_assets(doc_name: &str, document: &Document) -> DocumentAssets {
    let (ctx, mut warnings) = DocumentContext::new(document);
    let doc_size = ctx.doc_size();
    let multi_frame = ctx.frame_count() > 1;

    let mut textures = Vec::new();
    let mut seen = HashSet::new();
    for (index, frame) in document.frames.iter().enumerate() {
        let duration = multi_frame.then_some(frame.duration_ms as u32);
        for layer in ctx.exported_layers() {
            let (image, layer_warnings) = composite_layer(&ctx, index, layer.index as u16);
            warnings.extend(layer_warnings);

            let name = layer_texture_name(doc_name, &layer.name, index, multi_frame);
            let Some(texture) = image.and_then(|image| image.into_texture(name.clone(), doc_size, duration)) else {
                continue;
            };
            if !seen.insert(name.clone()) {
                warnings.push(Warning::new(format!("duplicate layer name '{}', later layer skipped", layer.name)));
                continue;
            }
            textures.push(texture);
        }
    }

    DocumentAssets {
        textures,
        animations: Vec::new(),
        warnings: warnings.into_iter().map(|w| w.in_source(doc_name)).collect(),
    }
}

/// Turn a static image into a single texture trimmed to its non-transparent
/// pixels. Returns `None` for a fully transparent image.
pub fn image_texture(name: &str, image: RgbaImage) -> Option<TextureData> {
    let mut bounds = Rect::default();
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            bounds = bounds.union(&Rect::new(x as i32, y as i32, 1, 1));
        }
    }
    if bounds.is_empty() {
        return None;
    }

    let doc_size = Size::new(image.width(), image.height());
    Some(TextureData {
        name: name.to_string(),
        pixels: image,
        origin: (0, 0),
        source: bounds,
        doc_size,
        duration_ms: None,
        placed: None,
    })
}

fn document_animations(
    doc_name: &str,
    document: &Document,
    frame_textures: &[Option<String>],
    warnings: &mut Vec<Warning>,
) -> Vec<Animation> {
    let frame_count = frame_textures.len();
    let doc_size = Size::new(document.header.width as u32, document.header.height as u32);
    let mut animations: Vec<Animation> = Vec::new();
    let mut covered = false;

    for tag in document.tags() {
        let from = tag.from as usize;
        if from >= frame_count {
            warnings.push(Warning::new(format!(
                "tag '{}' starts at frame {} but the document has {} frame(s)",
                tag.name, from, frame_count
            )));
            continue;
        }
        let to = (tag.to as usize).min(frame_count - 1);
        if from == 0 && to == frame_count - 1 {
            covered = true;
        }

        let name = format!("{}.{}", doc_name, tag.name);
        if animations.iter().any(|a| a.name == name) {
            warnings.push(Warning::new(format!("duplicate tag '{}' skipped", tag.name)));
            continue;
        }

        let in_range = &frame_textures[from..=to];
        let first = in_range.iter().flatten().next();
        let last = in_range.iter().rev().flatten().next();
        let (Some(first), Some(last)) = (first, last) else {
            warnings.push(Warning::new(format!("tag '{}' covers no textures, animation dropped", tag.name)));
            continue;
        };

        animations.push(Animation {
            name,
            first: first.clone(),
            last: last.clone(),
            direction: tag.direction,
            repeat: tag.repeat,
            doc_size,
            explicit: true,
        });
    }

    if frame_count > 1 && !covered {
        let first = frame_textures.iter().flatten().next();
        let last = frame_textures.iter().rev().flatten().next();
        if let (Some(first), Some(last)) = (first, last) {
            animations.push(Animation {
                name: doc_name.to_string(),
                first: first.clone(),
                last: last.clone(),
                direction: LoopDirection::Forward,
                repeat: 0,
                doc_size,
                explicit: false,
            });
        }
    }

    animations
}
