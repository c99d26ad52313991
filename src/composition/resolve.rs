//! Cel pixel resolution against the document palette

use image::{Rgba, RgbaImage};

use crate::aseprite::{CelImage, CelPixels};

use super::context::DocumentContext;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Resolved RGBA pixels of one cel.
#[derive(Debug)]
pub(crate) struct ResolvedPixels {
    pub image: RgbaImage,
    /// Indexed pixels whose index lies beyond the palette
    pub out_of_range: usize,
}

/// Convert a cel's stored pixels to RGBA.
///
/// Indexed pixels equal to the document's transparent index, and every
/// indexed pixel when the document has no palette, become transparent.
pub(crate) fn resolve_cel_pixels(ctx: &DocumentContext<'_>, cel: &CelImage) -> ResolvedPixels {
    let width = cel.width as u32;
    let height = cel.height as u32;

    match &cel.pixels {
        CelPixels::Rgba(data) => ResolvedPixels {
            image: RgbaImage::from_raw(width, height, data.clone())
                .unwrap_or_else(|| RgbaImage::new(width, height)),
            out_of_range: 0,
        },
        CelPixels::Indexed(indices) => {
            let transparent_index = ctx.transparent_index();
            let mut out_of_range = 0;
            let mut image = RgbaImage::new(width, height);
            for (pixel, index) in image.pixels_mut().zip(indices.iter()) {
                if *index == transparent_index {
                    continue;
                }
                let Some(palette) = ctx.palette() else {
                    continue;
                };
                *pixel = match palette.get(*index) {
                    Some(color) => color,
                    None => {
                        out_of_range += 1;
                        TRANSPARENT
                    }
                };
            }
            ResolvedPixels { image, out_of_range }
        }
    }
}
