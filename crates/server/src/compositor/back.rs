//! Back face: message, signature and addressing.
//!
//! Layout is fixed and involves no I/O, so the same input always yields the
//! same pixels.

use image::{Rgba, RgbaImage};
use retropost_core::messages::Message;
use retropost_core::{Customization, FontFamily, Language};

use super::canvas::{self, WIDTH};
use super::text::{Pen, TextMeasure, Typefaces, clip_lines, wrap_text};

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const EDGE: Rgba<u8> = Rgba([0xd1, 0xd5, 0xdb, 255]);
const INK: Rgba<u8> = Rgba([0x1f, 0x29, 0x37, 255]);
const MUTED: Rgba<u8> = Rgba([0x6b, 0x72, 0x80, 255]);
const FAINT: Rgba<u8> = Rgba([0x9c, 0xa3, 0xaf, 255]);

const LEFT: f32 = 40.0;
const RIGHT: f32 = 560.0;
const COLUMN: f32 = 320.0;
const COLUMN_WIDTH: f32 = 240.0;

const TITLE_Y: f32 = 30.0;
const LABEL_Y: f32 = 70.0;
const BODY_TOP: f32 = 90.0;
const BODY_BOTTOM: f32 = 250.0;
const BODY_WIDTH: f32 = 520.0;
const BODY_LINE_HEIGHT: f32 = 22.0;
const SIGNATURE_Y: f32 = 260.0;
const DIVIDER_Y: u32 = 290;
const ADDRESS_LABEL_Y: f32 = 305.0;
const ADDRESS_NAME_Y: f32 = 325.0;
const ADDRESS_EMAIL_Y: f32 = 345.0;
const FOOTER_Y: f32 = 375.0;

/// Draw the back face with labels in `language`.
#[must_use]
pub fn draw(customization: &Customization, language: Language, faces: &Typefaces) -> RgbaImage {
    let mut surface = canvas::surface(PAPER);
    canvas::border(&mut surface, 10, 2, EDGE);

    let title = faces.pen(FontFamily::Serif, 20.0).bold();
    centered(&mut surface, title, TITLE_Y, INK, Message::CardTitle.text(language));

    let label = faces.pen(FontFamily::Sans, 12.0);
    label.draw(&mut surface, LEFT, LABEL_Y, MUTED, Message::MessageLabel.text(language));

    draw_body(&mut surface, &customization.message, faces);

    let signature = customization.signature.trim();
    if !signature.is_empty() {
        let pen = faces.pen(FontFamily::Cursive, 16.0);
        let line = single_line(signature, COLUMN_WIDTH, &pen);
        pen.draw(&mut surface, RIGHT - pen.text_width(&line), SIGNATURE_Y, INK, &line);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    canvas::hline(&mut surface, LEFT as u32, RIGHT as u32, DIVIDER_Y, EDGE);

    let recipient_name = match customization.recipient_name.trim() {
        "" => Message::DefaultRecipientName.text(language),
        name => name,
    };
    address_block(
        &mut surface,
        faces,
        LEFT,
        Message::ToLabel.text(language),
        recipient_name,
        Some(customization.recipient_email.trim()),
    );
    address_block(
        &mut surface,
        faces,
        COLUMN,
        Message::FromLabel.text(language),
        customization.sender_name.trim(),
        None,
    );

    let footer = faces.pen(FontFamily::Sans, 10.0);
    footer.draw(
        &mut surface,
        RIGHT - footer.text_width("RetroPost"),
        FOOTER_Y,
        FAINT,
        "RetroPost",
    );

    surface
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn draw_body(surface: &mut RgbaImage, message: &str, faces: &Typefaces) {
    let pen = faces.pen(FontFamily::Serif, 16.0);
    let max_lines = ((BODY_BOTTOM - BODY_TOP) / BODY_LINE_HEIGHT).floor() as usize;
    let lines = clip_lines(
        wrap_text(message, BODY_WIDTH, &pen),
        max_lines,
        BODY_WIDTH,
        &pen,
    );
    for (index, line) in lines.iter().enumerate() {
        let y = BODY_LINE_HEIGHT.mul_add(index as f32, BODY_TOP);
        pen.draw(surface, LEFT, y, INK, line);
    }
}

fn address_block(
    surface: &mut RgbaImage,
    faces: &Typefaces,
    x: f32,
    label: &str,
    name: &str,
    email: Option<&str>,
) {
    faces
        .pen(FontFamily::Sans, 12.0)
        .draw(surface, x, ADDRESS_LABEL_Y, MUTED, label);

    let name_pen = faces.pen(FontFamily::Sans, 16.0).bold();
    let name = single_line(name, COLUMN_WIDTH, &name_pen);
    name_pen.draw(surface, x, ADDRESS_NAME_Y, INK, &name);

    if let Some(email) = email.filter(|e| !e.is_empty()) {
        let pen = faces.pen(FontFamily::Mono, 12.0);
        let email = single_line(email, COLUMN_WIDTH, &pen);
        pen.draw(surface, x, ADDRESS_EMAIL_Y, MUTED, &email);
    }
}

#[allow(clippy::cast_precision_loss)]
fn centered(surface: &mut RgbaImage, pen: Pen<'_>, y: f32, color: Rgba<u8>, text: &str) {
    let x = ((WIDTH as f32) - pen.text_width(text)) / 2.0;
    pen.draw(surface, x, y, color, text);
}

/// `text` clipped to one line of `width`.
fn single_line(text: &str, width: f32, measure: &impl TextMeasure) -> String {
    clip_lines(wrap_text(text, width, measure), 1, width, measure)
        .into_iter()
        .next()
        .unwrap_or_default()
}
