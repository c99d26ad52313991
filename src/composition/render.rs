//! Frame compositing

use image::RgbaImage;

use crate::aseprite::{CelChunk, CelContent, CelImage, Document};
use crate::models::{Rect, Size, TextureData};

use super::blend::{blit_blended, mul_opacity};
use super::context::DocumentContext;
use super::error::Warning;
use super::resolve::resolve_cel_pixels;

/// The composited content of one frame (or one layer of a frame).
#[derive(Debug, Clone)]
pub struct FrameImage {
    pub pixels: RgbaImage,
    /// Union of the contributing cel rectangles, in document coordinates
    pub bounds: Rect,
}

impl FrameImage {
    /// Turn the image into a texture record. Returns `None` when no part of
    /// the content lies inside the document canvas.
    pub fn into_texture(self, name: String, doc_size: Size, duration_ms: Option<u32>) -> Option<TextureData> {
        let doc = Rect::new(0, 0, doc_size.w, doc_size.h);
        let source = self.bounds.intersect(&doc)?;
        Some(TextureData {
            name,
            pixels: self.pixels,
            origin: (self.bounds.x, self.bounds.y),
            source,
            doc_size,
            duration_ms,
            placed: None,
        })
    }
}

/// A cel ready to draw: the layer it belongs to and the image that supplies
/// its pixels, after link resolution.
struct DrawableCel<'a> {
    layer_index: u16,
    /// Position and opacity come from the cel itself, pixels from the link target
    cel: &'a CelChunk,
    image: &'a CelImage,
}

impl DrawableCel<'_> {
    fn rect(&self) -> Rect {
        Rect::new(self.cel.x as i32, self.cel.y as i32, self.image.width as u32, self.image.height as u32)
    }
}

fn drawable<'a>(ctx: &DocumentContext<'a>, cel: &'a CelChunk, frame_index: usize, warnings: &mut Vec<Warning>) -> Option<DrawableCel<'a>> {
    let Some(target) = ctx.resolve_link(cel) else {
        warnings.push(Warning::new(format!(
            "frame {}: linked cel on layer {} has no target",
            frame_index, cel.layer_index
        )));
        return None;
    };
    match &target.content {
        CelContent::Image(image) => Some(DrawableCel { layer_index: cel.layer_index, cel, image }),
        _ => None,
    }
}

fn draw_cel(ctx: &DocumentContext<'_>, canvas: &mut RgbaImage, origin: (i32, i32), drawable: &DrawableCel<'_>, frame_index: usize, warnings: &mut Vec<Warning>) {
    let resolved = resolve_cel_pixels(ctx, drawable.image);
    if resolved.out_of_range > 0 {
        warnings.push(Warning::error(format!(
            "frame {}: {} pixel(s) on layer {} use palette indices beyond the palette",
            frame_index, resolved.out_of_range, drawable.layer_index
        )));
    }
    let opacity = mul_opacity(drawable.cel.opacity, ctx.layer_opacity(drawable.layer_index as usize));
    blit_blended(
        canvas,
        &resolved.image,
        drawable.cel.x as i32 - origin.0,
        drawable.cel.y as i32 - origin.1,
        opacity,
    );
}

/// Composite every exported layer of a frame, bottom layer first.
///
/// The result covers the union of the cel rectangles, which may extend
/// past the document edges. Returns `None` when no exported layer has a cel
/// in this frame.
pub fn composite_frame(ctx: &DocumentContext<'_>, frame_index: usize) -> (Option<FrameImage>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let Some(frame) = ctx.document().frames.get(frame_index) else {
        return (None, warnings);
    };

    let mut cels: Vec<DrawableCel<'_>> = frame
        .cels()
        .filter(|cel| ctx.is_exported(cel.layer_index as usize))
        .filter_map(|cel| drawable(ctx, cel, frame_index, &mut warnings))
        .collect();
    cels.sort_by_key(|c| c.layer_index);

    let bounds = cels.iter().fold(Rect::default(), |acc, c| acc.union(&c.rect()));
    if bounds.is_empty() {
        return (None, warnings);
    }

    let mut canvas = RgbaImage::new(bounds.w, bounds.h);
    for cel in &cels {
        draw_cel(ctx, &mut canvas, (bounds.x, bounds.y), cel, frame_index, &mut warnings);
    }

    (Some(FrameImage { pixels: canvas, bounds }), warnings)
}

/// Render one layer of a frame on its own, without blending against other
/// layers. Cel and layer opacity still apply.
pub fn composite_layer(ctx: &DocumentContext<'_>, frame_index: usize, layer_index: u16) -> (Option<FrameImage>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let cel = ctx
        .cel(frame_index, layer_index)
        .filter(|_| ctx.is_exported(layer_index as usize))
        .and_then(|cel| drawable(ctx, cel, frame_index, &mut warnings));
    let Some(cel) = cel else {
        return (None, warnings);
    };

    let bounds = cel.rect();
    if bounds.is_empty() {
        return (None, warnings);
    }
    let mut canvas = RgbaImage::new(bounds.w, bounds.h);
    draw_cel(ctx, &mut canvas, (bounds.x, bounds.y), &cel, frame_index, &mut warnings);
    (Some(FrameImage { pixels: canvas, bounds }), warnings)
}

/// Flatten the first frame onto a transparent canvas of the document size.
///
/// Content outside the canvas is clipped. Used for tilesets, whose grid is
/// laid out in document coordinates.
pub fn flatten_document(document: &Document) -> (RgbaImage, Vec<Warning>) {
    let (ctx, mut warnings) = DocumentContext::new(document);
    let size = ctx.doc_size();
    let mut canvas = RgbaImage::new(size.w, size.h);

    let (frame, frame_warnings) = composite_frame(&ctx, 0);
    warnings.extend(frame_warnings);
    if let Some(frame) = frame {
        blit_blended(&mut canvas, &frame.pixels, frame.bounds.x, frame.bounds.y, 255);
    }
    (canvas, warnings)
}
