//! Raster encoding and `data:` URLs.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use super::ComposeError;

/// Quality used for every exported face.
pub const JPEG_QUALITY: u8 = 75;

/// 1×1 PNG returned when nothing else can be encoded.
pub const MINIMAL_PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Encode a surface as a JPEG `data:` URL.
///
/// # Errors
///
/// Returns [`ComposeError::Encode`] if the encoder rejects the image.
pub fn jpeg_data_url(surface: &RgbaImage) -> Result<String, ComposeError> {
    let rgb = DynamicImage::ImageRgba8(surface.clone()).into_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)))
}

/// Encode a surface as a PNG `data:` URL.
///
/// # Errors
///
/// Returns [`ComposeError::Encode`] if the encoder rejects the image.
pub fn png_data_url(surface: &RgbaImage) -> Result<String, ComposeError> {
    let mut bytes = Cursor::new(Vec::new());
    surface.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(bytes.into_inner())
    ))
}

/// A decoded base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse `data:<mime>;base64,<payload>`.
    ///
    /// Returns `None` for anything else, including non-base64 data URLs.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        let bytes = STANDARD.decode(payload.trim()).ok()?;
        Some(Self {
            mime: if mime.is_empty() {
                "application/octet-stream".to_string()
            } else {
                mime.to_string()
            },
            bytes,
        })
    }
}
