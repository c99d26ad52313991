//! Glyph extraction for font atlases
//!
//! Rasterization is delegated to `ab_glyph`; this module only picks the
//! font that covers each character and records the layout metrics.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::composition::Warning;
use crate::models::Glyph;

/// Error produced when a font file cannot be loaded.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid font '{path}': {message}")]
    Invalid { path: PathBuf, message: String },
}

/// A loaded font and the file it came from.
pub struct LoadedFont {
    pub path: PathBuf,
    pub font: FontVec,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("path", &self.path).finish()
    }
}

/// Load a TrueType/OpenType font file.
pub fn load_font(path: &Path) -> Result<LoadedFont, FontError> {
    let bytes = fs::read(path).map_err(|source| FontError::Io { path: path.to_path_buf(), source })?;
    let font = FontVec::try_from_vec(bytes)
        .map_err(|e| FontError::Invalid { path: path.to_path_buf(), message: e.to_string() })?;
    Ok(LoadedFont { path: path.to_path_buf(), font })
}

/// Rasterize every distinct character of `charset` at `size` pixels.
///
/// Fonts are tried in order; a character no font contains is skipped with a
/// recoverable error. Whitespace and other characters without an outline get
/// a 1x1 transparent bitmap so they still carry their advance.
pub fn extract_glyphs(fonts: &[LoadedFont], size: u32, charset: &str) -> (Vec<Glyph>, Vec<Warning>) {
    let mut glyphs = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let scale = PxScale::from(size as f32);

    for ch in charset.chars() {
        if !seen.insert(ch) {
            continue;
        }
        let found = fonts.iter().find_map(|f| {
            let id = f.font.glyph_id(ch);
            (id != GlyphId(0)).then_some((f, id))
        });
        let Some((loaded, id)) = found else {
            warnings.push(Warning::error(format!("character {:?} is missing from every font", ch)));
            continue;
        };
        glyphs.push(rasterize(&loaded.font, id, ch, scale));
    }

    (glyphs, warnings)
}

fn rasterize(font: &FontVec, id: GlyphId, ch: char, scale: PxScale) -> Glyph {
    let scaled = font.as_scaled(scale);
    let advance = scaled.h_advance(id);
    let ascent = scaled.ascent();
    let glyph = id.with_scale_and_position(scale, point(0.0, ascent));

    let Some(outlined) = font.outline_glyph(glyph) else {
        return Glyph { ch, bitmap: RgbaImage::new(1, 1), offset_x: 0, offset_y: 0, advance, placed: None };
    };

    let bounds = outlined.px_bounds();
    let width = (bounds.width() as u32).max(1);
    let height = (bounds.height() as u32).max(1);
    let mut bitmap = RgbaImage::new(width, height);
    outlined.draw(|x, y, coverage| {
        if x < width && y < height {
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            bitmap.put_pixel(x, y, Rgba([255, 255, 255, alpha]));
        }
    });

    Glyph {
        ch,
        bitmap,
        offset_x: bounds.min.x as i32,
        offset_y: bounds.min.y as i32,
        advance,
        placed: None,
    }
}
