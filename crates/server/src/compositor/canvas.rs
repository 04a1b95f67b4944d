//! Pixel-level helpers on top of `image` and `imageproc`.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use retropost_core::HexColor;

/// Fixed surface size of both faces.
pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 400;

/// Opaque color from a hex color.
#[must_use]
pub const fn solid(color: HexColor) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// Fresh opaque surface filled with `color`.
#[must_use]
pub fn surface(color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(WIDTH, HEIGHT, color)
}

/// Alpha-blend `color` onto the pixel at `(x, y)`; out-of-bounds is ignored.
///
/// `coverage` scales the color's own alpha.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    let Some(pixel) = canvas.get_pixel_mut_checked(x, y) else {
        return;
    };
    let alpha = f32::from(color.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    for (dst, src) in pixel.0.iter_mut().zip(color.0).take(3) {
        *dst = mix(*dst, src, alpha);
    }
    pixel.0[3] = 255;
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mix(dst: u8, src: u8, alpha: f32) -> u8 {
    f32::from(src)
        .mul_add(alpha, f32::from(dst) * (1.0 - alpha))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Diagonal two-color gradient from the top-left to the bottom-right corner.
#[must_use]
pub fn diagonal_gradient(from: HexColor, to: HexColor) -> RgbaImage {
    #[allow(clippy::cast_precision_loss)]
    let span = (WIDTH + HEIGHT - 2) as f32;
    RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
        #[allow(clippy::cast_precision_loss)]
        let t = (x + y) as f32 / span;
        Rgba([
            mix(from.r, to.r, t),
            mix(from.g, to.g, t),
            mix(from.b, to.b, t),
            255,
        ])
    })
}

/// Cover the whole surface with `color` at its own alpha.
pub fn overlay(canvas: &mut RgbaImage, color: Rgba<u8>) {
    let alpha = f32::from(color.0[3]) / 255.0;
    for pixel in canvas.pixels_mut() {
        for (dst, src) in pixel.0.iter_mut().zip(color.0).take(3) {
            *dst = mix(*dst, src, alpha);
        }
    }
}

/// Rectangle outline `thickness` pixels wide, inset `inset` from the edges.
pub fn border(canvas: &mut RgbaImage, inset: u32, thickness: u32, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    for step in 0..thickness {
        let offset = inset + step;
        let (Some(width), Some(height)) = (
            w.checked_sub(offset * 2),
            h.checked_sub(offset * 2),
        ) else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let rect = Rect::at(offset as i32, offset as i32).of_size(width, height);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Horizontal rule from `x0` to `x1` at `y`.
#[allow(clippy::cast_precision_loss)]
pub fn hline(canvas: &mut RgbaImage, x0: u32, x1: u32, y: u32, color: Rgba<u8>) {
    draw_line_segment_mut(
        canvas,
        (x0 as f32, y as f32),
        (x1 as f32, y as f32),
        color,
    );
}
