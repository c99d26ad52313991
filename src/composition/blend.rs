//! Alpha blending for cel compositing

use image::{Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Combine two 0-255 opacities into one.
pub(crate) fn mul_opacity(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// Blit `sprite` onto `canvas` with its top-left at `(x, y)`, which may lie
/// partly outside the canvas. Pixels falling outside are clipped.
pub(crate) fn blit_blended(canvas: &mut RgbaImage, sprite: &RgbaImage, x: i32, y: i32, opacity: u8) {
    let canvas_width = canvas.width() as i32;
    let canvas_height = canvas.height() as i32;

    for (sy, row) in sprite.rows().enumerate() {
        let dest_y = y + sy as i32;
        if dest_y < 0 {
            continue;
        }
        if dest_y >= canvas_height {
            break;
        }

        for (sx, src) in row.enumerate() {
            let dest_x = x + sx as i32;
            if dest_x < 0 {
                continue;
            }
            if dest_x >= canvas_width {
                break;
            }

            let dst = canvas.get_pixel(dest_x as u32, dest_y as u32);
            let blended = blend_over(dst, src, opacity);
            canvas.put_pixel(dest_x as u32, dest_y as u32, blended);
        }
    }
}

/// Composite `src` over `dst` ("source over"), scaling the source alpha by
/// `opacity` first.
///
/// A fully transparent destination receives a plain copy of the source and an
/// opaque source replaces the destination, so neither case is attenuated by
/// rounding.
pub(crate) fn blend_over(dst: &Rgba<u8>, src: &Rgba<u8>, opacity: u8) -> Rgba<u8> {
    let src_a = mul_opacity(src[3], opacity);
    if src_a == 0 {
        return *dst;
    }
    if dst[3] == 0 || src_a == 255 {
        return Rgba([src[0], src[1], src[2], src_a]);
    }

    let src_alpha = src_a as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return TRANSPARENT;
    }

    // out_color = (src * src_alpha + dst * dst_alpha * (1 - src_alpha)) / out_alpha
    let composite = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        composite(src[0], dst[0]),
        composite(src[1], dst[1]),
        composite(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
