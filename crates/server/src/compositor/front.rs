//! Front face: background, overlay text and branding mark.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use retropost_core::{Customization, FontFamily, HexColor};

use super::canvas::{self, HEIGHT, WIDTH};
use super::text::{TextMeasure, Typefaces, clip_lines, wrap_text};

/// Gradient used when the background cannot be loaded.
pub const GRADIENT_FROM: HexColor = HexColor::rgb(0x66, 0x7e, 0xea);
pub const GRADIENT_TO: HexColor = HexColor::rgb(0x76, 0x4b, 0xa2);

/// Black at 30% over photographic backgrounds.
const OVERLAY: Rgba<u8> = Rgba([0, 0, 0, 77]);
const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 128]);
const SHADOW_OFFSET: f32 = 2.0;

const MAX_TEXT_WIDTH: f32 = 500.0;
const MIN_TEXT_SIZE: u32 = 12;
const MAX_TEXT_SIZE: u32 = 72;
const LINE_SPACING: f32 = 1.2;
const VERTICAL_MARGIN: f32 = 20.0;

const MARK: &str = "RetroPost";
const MARK_SIZE: f32 = 12.0;
const MARK_COLOR: Rgba<u8> = Rgba([255, 255, 255, 180]);

/// Draw the front face. `background` is `None` when loading failed.
#[must_use]
pub fn draw(
    background: Option<&DynamicImage>,
    customization: &Customization,
    faces: &Typefaces,
) -> RgbaImage {
    let mut surface = match background {
        Some(image) => {
            let mut surface = image
                .resize_to_fill(WIDTH, HEIGHT, FilterType::Triangle)
                .into_rgba8();
            canvas::overlay(&mut surface, OVERLAY);
            surface
        }
        None => canvas::diagonal_gradient(GRADIENT_FROM, GRADIENT_TO),
    };

    draw_overlay_text(&mut surface, customization, faces);
    draw_mark(&mut surface, faces);
    surface
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn draw_overlay_text(surface: &mut RgbaImage, customization: &Customization, faces: &Typefaces) {
    let size = customization
        .front_text_size
        .clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE) as f32;
    let pen = faces.pen(customization.front_text_font, size);
    let line_height = (size * LINE_SPACING).max(pen.height());

    let max_lines = (((HEIGHT as f32) - 2.0 * VERTICAL_MARGIN) / line_height).floor() as usize;
    let lines = wrap_text(&customization.front_text, MAX_TEXT_WIDTH, &pen);
    let lines = clip_lines(lines, max_lines.max(1), MAX_TEXT_WIDTH, &pen);

    let block = line_height * lines.len() as f32;
    let top = ((HEIGHT as f32) - block) / 2.0;
    let color = canvas::solid(customization.front_text_color);

    for (index, line) in lines.iter().enumerate() {
        let y = (line_height - pen.height()).mul_add(0.5, line_height.mul_add(index as f32, top));
        let x = ((WIDTH as f32) - pen.text_width(line)) / 2.0;
        pen.draw(surface, x + SHADOW_OFFSET, y + SHADOW_OFFSET, SHADOW, line);
        pen.draw(surface, x, y, color, line);
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_mark(surface: &mut RgbaImage, faces: &Typefaces) {
    let pen = faces.pen(FontFamily::Sans, MARK_SIZE);
    let x = (WIDTH as f32) - pen.text_width(MARK) - 12.0;
    let y = (HEIGHT as f32) - pen.height() - 10.0;
    pen.draw(surface, x, y, MARK_COLOR, MARK);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_uses_gradient() {
        let customization = Customization {
            front_text: String::new(),
            ..Customization::default()
        };
        let surface = draw(None, &customization, &Typefaces::builtin());

        assert_eq!(surface.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(surface.get_pixel(0, 0).0, [0x66, 0x7e, 0xea, 255]);
    }

    #[test]
    fn test_background_is_darkened() {
        let white = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            300,
            200,
            Rgba([255, 255, 255, 255]),
        ));
        let customization = Customization {
            front_text: String::new(),
            ..Customization::default()
        };
        let surface = draw(Some(&white), &customization, &Typefaces::builtin());

        let corner = surface.get_pixel(0, 0).0;
        assert!(corner[0] < 200 && corner[0] > 150);
    }

    #[test]
    fn test_text_is_drawn_in_requested_color() {
        let customization = Customization {
            front_text: "Hello".to_string(),
            front_text_color: HexColor::rgb(0xff, 0, 0),
            front_text_size: 40,
            ..Customization::default()
        };
        let surface = draw(None, &customization, &Typefaces::builtin());
        assert!(surface.pixels().any(|p| p.0 == [0xff, 0, 0, 255]));
    }
}
