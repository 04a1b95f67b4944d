//! Typefaces, measurement and line wrapping.
//!
//! Each [`FontFamily`] maps to an outline font loaded from the font directory
//! when one is configured. Without one, text is drawn with the built-in 8×8
//! bitmap face, scaled by an integer factor.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use font8x8::UnicodeFonts;
use image::{Rgba, RgbaImage};
use retropost_core::FontFamily;

use super::canvas::blend_pixel;

/// Width of a bitmap glyph cell before scaling.
const CELL: u32 = 8;

/// Anything that can report the rendered width of a string.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> f32,
{
    fn text_width(&self, text: &str) -> f32 {
        self(text)
    }
}

/// The set of typefaces available to the compositor.
#[derive(Clone, Default)]
pub struct Typefaces {
    serif: Option<FontArc>,
    sans: Option<FontArc>,
    mono: Option<FontArc>,
    cursive: Option<FontArc>,
}

impl std::fmt::Debug for Typefaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typefaces")
            .field("serif", &self.serif.is_some())
            .field("sans", &self.sans.is_some())
            .field("mono", &self.mono.is_some())
            .field("cursive", &self.cursive.is_some())
            .finish()
    }
}

impl Typefaces {
    /// Bitmap face only.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Load `<family>.ttf` for each family from `dir`.
    ///
    /// Missing or unreadable files fall back to the bitmap face for that
    /// family.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let read = |family: FontFamily| {
            let path = dir.join(format!("{}.ttf", family.as_str()));
            match std::fs::read(&path) {
                Ok(bytes) => match FontArc::try_from_vec(bytes) {
                    Ok(font) => {
                        tracing::debug!(path = %path.display(), "Loaded font");
                        Some(font)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Invalid font file");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Font not readable");
                    None
                }
            }
        };

        Self {
            serif: read(FontFamily::Serif),
            sans: read(FontFamily::Sans),
            mono: read(FontFamily::Mono),
            cursive: read(FontFamily::Cursive),
        }
    }

    fn outline(&self, family: FontFamily) -> Option<&FontArc> {
        match family {
            FontFamily::Serif => self.serif.as_ref(),
            FontFamily::Sans => self.sans.as_ref(),
            FontFamily::Mono => self.mono.as_ref(),
            FontFamily::Cursive => self.cursive.as_ref(),
        }
    }

    /// A pen for drawing `family` at `size` pixels.
    #[must_use]
    pub fn pen(&self, family: FontFamily, size: f32) -> Pen<'_> {
        let face = match self.outline(family) {
            Some(font) => Face::Outline(font),
            None => Face::Bitmap {
                scale: bitmap_scale(size),
                slanted: family == FontFamily::Cursive,
            },
        };
        Pen {
            face,
            size,
            bold: false,
        }
    }
}

/// Shared handle used by the render tasks.
pub type SharedTypefaces = Arc<Typefaces>;

#[derive(Clone, Copy)]
enum Face<'a> {
    Outline(&'a FontArc),
    Bitmap { scale: u32, slanted: bool },
}

/// A typeface at a fixed size, ready to measure and draw.
#[derive(Clone, Copy)]
pub struct Pen<'a> {
    face: Face<'a>,
    size: f32,
    bold: bool,
}

impl Pen<'_> {
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Vertical extent of one line of text.
    #[must_use]
    pub fn height(&self) -> f32 {
        match self.face {
            Face::Outline(_) => self.size,
            #[allow(clippy::cast_precision_loss)]
            Face::Bitmap { scale, .. } => (CELL * scale) as f32,
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>, text: &str) {
        self.draw_once(canvas, x, y, color, text);
        if self.bold {
            self.draw_once(canvas, x + 1.0, y, color, text);
        }
    }

    fn draw_once(&self, canvas: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>, text: &str) {
        match self.face {
            Face::Outline(font) => draw_outline(canvas, font, self.size, x, y, color, text),
            Face::Bitmap { scale, slanted } => {
                draw_bitmap(canvas, scale, slanted, x, y, color, text);
            }
        }
    }
}

impl TextMeasure for Pen<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str) -> f32 {
        let extra = if self.bold { 1.0 } else { 0.0 };
        let width = match self.face {
            Face::Outline(font) => outline_width(font, self.size, text),
            Face::Bitmap { scale, slanted } => {
                let glyphs = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                let slant = if slanted && glyphs > 0 {
                    slant_shift(0, scale)
                } else {
                    0
                };
                glyphs.saturating_mul(CELL * scale).saturating_add(slant) as f32
            }
        };
        if width > 0.0 { width + extra } else { 0.0 }
    }
}

/// Integer magnification of the 8×8 cell closest to `size`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bitmap_scale(size: f32) -> u32 {
    ((size / 8.0).round() as u32).max(1)
}

/// Horizontal shift applied to glyph row `row` for slanted text.
const fn slant_shift(row: u32, scale: u32) -> u32 {
    ((CELL - 1 - row) * scale) / 3
}

/// Map a character to one the bitmap face can draw.
#[must_use]
pub fn fold_char(c: char) -> char {
    let folded = match c {
        'č' | 'ć' => 'c',
        'Č' | 'Ć' => 'C',
        'š' => 's',
        'Š' => 'S',
        'ž' => 'z',
        'Ž' => 'Z',
        'đ' => 'd',
        'Đ' => 'D',
        '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201c}' | '\u{201d}' | '\u{201e}' => '"',
        '\u{2026}' => '.',
        other => other,
    };
    if bitmap_glyph(folded).is_some() {
        folded
    } else {
        '?'
    }
}

fn bitmap_glyph(c: char) -> Option<[u8; 8]> {
    font8x8::BASIC_FONTS
        .get(c)
        .or_else(|| font8x8::LATIN_FONTS.get(c))
}

fn draw_bitmap(
    canvas: &mut RgbaImage,
    scale: u32,
    slanted: bool,
    x: f32,
    y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    #[allow(clippy::cast_possible_truncation)]
    let (origin_x, origin_y) = (x.round() as i64, y.round() as i64);
    let advance = i64::from(CELL * scale);
    let step = i64::from(scale);

    for (index, c) in text.chars().enumerate() {
        let Some(rows) = bitmap_glyph(fold_char(c)) else {
            continue;
        };
        let cell_x = origin_x + i64::try_from(index).unwrap_or(i64::MAX / 2) * advance;
        for (row, bits) in (0_u32..).zip(rows) {
            let shift = if slanted {
                i64::from(slant_shift(row, scale))
            } else {
                0
            };
            for col in 0..CELL {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = cell_x + i64::from(col) * step + shift;
                let py = origin_y + i64::from(row) * step;
                for dy in 0..step {
                    for dx in 0..step {
                        blend_pixel(canvas, px + dx, py + dy, color, 1.0);
                    }
                }
            }
        }
    }
}

fn outline_width(font: &FontArc, size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut previous = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

fn draw_outline(
    canvas: &mut RgbaImage,
    font: &FontArc,
    size: f32,
    x: f32,
    y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let baseline = y + scaled.ascent();
    let mut caret = x;
    let mut previous = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            #[allow(clippy::cast_possible_truncation)]
            let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| {
                blend_pixel(
                    canvas,
                    left + i64::from(gx),
                    top + i64::from(gy),
                    color,
                    coverage,
                );
            });
        }
    }
}

/// Greedy word wrap.
///
/// Explicit newlines start new paragraphs. Words wider than `max_width` are
/// broken between characters. Every returned line measures at most
/// `max_width`, except a single character that is wider on its own.
pub fn wrap_text(text: &str, max_width: f32, measure: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure.text_width(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure.text_width(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, measure);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    // Leading and trailing blank paragraphs carry nothing to draw.
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let first_text = lines.iter().position(|l| !l.is_empty()).unwrap_or(0);
    lines.drain(..first_text);
    lines
}

fn break_word(word: &str, max_width: f32, measure: &impl TextMeasure) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if measure.text_width(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Keep at most `max_lines`; when lines are dropped the last kept line ends
/// with `...`, shortened until it fits `max_width`.
#[must_use]
pub fn clip_lines(
    mut lines: Vec<String>,
    max_lines: usize,
    max_width: f32,
    measure: &impl TextMeasure,
) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let mut body = last.trim_end().to_string();
        loop {
            let candidate = format!("{body}...");
            if body.is_empty() || measure.text_width(&candidate) <= max_width {
                *last = candidate;
                break;
            }
            body.pop();
            let trimmed = body.trim_end().len();
            body.truncate(trimmed);
        }
    }
    lines
}
