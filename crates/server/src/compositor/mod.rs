//! Postcard image compositor.
//!
//! Produces the front and back faces of a postcard as JPEG `data:` URLs,
//! drawn directly from the template and customization. The front face waits
//! on its background image; the back face is pure layout. Both faces are
//! rasterized on the blocking pool and rendered concurrently.
//!
//! Rendering never fails outright: a background that cannot be loaded is
//! replaced by a gradient, and a face that cannot be encoded is replaced by
//! a labeled placeholder.

mod back;
pub mod background;
mod canvas;
pub mod encode;
mod front;
pub mod text;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use retropost_core::messages::Message;
use retropost_core::{Customization, FontFamily, Language, Template};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::CompositorConfig;
pub use background::{BackgroundSource, HttpBackgrounds, LoadError};
pub use canvas::{HEIGHT, WIDTH};
pub use encode::{DataUrl, MINIMAL_PNG_DATA_URL};
pub use text::{SharedTypefaces, TextMeasure, Typefaces};

/// Errors from rendering a single face.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Front and back faces as `data:` URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPair {
    pub front: String,
    pub back: String,
}

impl RenderedPair {
    /// Download names for `template`'s faces, front first.
    #[must_use]
    pub fn file_names(template: &Template) -> (String, String) {
        let slug = template.slug();
        (
            format!("razglednica-prednja-{slug}.jpg"),
            format!("razglednica-straznja-{slug}.jpg"),
        )
    }

    /// Write both faces into `dir` and return their paths.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a face is not a base64 `data:` URL or a file
    /// cannot be written.
    pub fn write_to(&self, dir: &Path, template: &Template) -> std::io::Result<(PathBuf, PathBuf)> {
        let (front_name, back_name) = Self::file_names(template);
        let front = dir.join(front_name);
        let back = dir.join(back_name);
        std::fs::write(&front, decode_face(&self.front)?)?;
        std::fs::write(&back, decode_face(&self.back)?)?;
        Ok((front, back))
    }
}

fn decode_face(face: &str) -> std::io::Result<Vec<u8>> {
    DataUrl::parse(face).map(|d| d.bytes).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "face is not a data URL")
    })
}

/// Renders postcard faces.
#[derive(Clone)]
pub struct Compositor {
    typefaces: SharedTypefaces,
    backgrounds: Arc<dyn BackgroundSource>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("typefaces", &self.typefaces)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Create a compositor with HTTP backgrounds and the configured fonts.
    ///
    /// # Errors
    ///
    /// Returns an error if the background HTTP client cannot be built.
    pub fn new(config: &CompositorConfig) -> Result<Self, reqwest::Error> {
        let typefaces = config
            .font_dir
            .as_deref()
            .map_or_else(Typefaces::builtin, Typefaces::load);
        let backgrounds = HttpBackgrounds::new(config.background_timeout)?;
        Ok(Self::with_parts(typefaces, Arc::new(backgrounds)))
    }

    #[must_use]
    pub fn with_parts(typefaces: Typefaces, backgrounds: Arc<dyn BackgroundSource>) -> Self {
        Self {
            typefaces: Arc::new(typefaces),
            backgrounds,
        }
    }

    /// Render both faces. Always returns two non-empty `data:` URLs.
    #[instrument(skip_all, fields(template = %template.id))]
    pub async fn render(
        &self,
        template: &Template,
        customization: &Customization,
        language: Language,
    ) -> RenderedPair {
        let (front, back) = tokio::join!(
            self.render_front(&template.image, customization),
            self.render_back(customization, language),
        );

        let front = front.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Front face failed, using placeholder");
            self.placeholder(language)
        });
        let back = back.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Back face failed, using placeholder");
            self.placeholder(language)
        });

        RenderedPair { front, back }
    }

    /// Render the front face over the background at `background`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] if encoding fails or the render task panics.
    /// Background failures are not errors.
    pub async fn render_front(
        &self,
        background: &str,
        customization: &Customization,
    ) -> Result<String, ComposeError> {
        let image = match self.backgrounds.load(background).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "Background unavailable, using gradient");
                None
            }
        };

        let faces = Arc::clone(&self.typefaces);
        let customization = customization.clone();
        tokio::task::spawn_blocking(move || {
            let surface = front::draw(image.as_deref(), &customization, &faces);
            encode::jpeg_data_url(&surface)
        })
        .await?
    }

    /// Render the back face with labels in `language`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] if encoding fails or the render task panics.
    pub async fn render_back(
        &self,
        customization: &Customization,
        language: Language,
    ) -> Result<String, ComposeError> {
        let faces = Arc::clone(&self.typefaces);
        let customization = customization.clone();
        tokio::task::spawn_blocking(move || {
            let surface = back::draw(&customization, language, &faces);
            encode::jpeg_data_url(&surface)
        })
        .await?
    }

    fn placeholder(&self, language: Language) -> String {
        let surface = draw_placeholder(language, &self.typefaces);
        encode::jpeg_data_url(&surface).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Placeholder encoding failed");
            MINIMAL_PNG_DATA_URL.to_string()
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_placeholder(language: Language, faces: &Typefaces) -> RgbaImage {
    let mut surface = canvas::surface(Rgba([0xf3, 0xf4, 0xf6, 255]));
    canvas::border(&mut surface, 10, 2, Rgba([0x9c, 0xa3, 0xaf, 255]));

    let title = faces.pen(FontFamily::Sans, 32.0).bold();
    let label = faces.pen(FontFamily::Sans, 16.0);
    let notice = Message::PreviewUnavailable.text(language);
    let ink = Rgba([0x4b, 0x55, 0x63, 255]);

    let x = ((WIDTH as f32) - title.text_width("RetroPost")) / 2.0;
    title.draw(&mut surface, x, 160.0, ink, "RetroPost");
    let x = ((WIDTH as f32) - label.text_width(notice)) / 2.0;
    label.draw(&mut surface, x, 220.0, ink, notice);
    surface
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use image::DynamicImage;
    use retropost_core::TemplateId;

    use super::*;

    struct Unreachable;

    #[async_trait]
    impl BackgroundSource for Unreachable {
        async fn load(&self, _reference: &str) -> Result<Arc<DynamicImage>, LoadError> {
            Err(LoadError::Status(503))
        }
    }

    struct Solid(AtomicUsize);

    #[async_trait]
    impl BackgroundSource for Solid {
        async fn load(&self, _reference: &str) -> Result<Arc<DynamicImage>, LoadError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                800,
                600,
                Rgba([40, 120, 200, 255]),
            ))))
        }
    }

    fn template() -> Template {
        Template {
            id: TemplateId::new("1"),
            name: "Tropska Plaža".to_string(),
            image: "https://images.example/beach.jpg".to_string(),
            category: "priroda".to_string(),
            description: String::new(),
            price: None,
        }
    }

    fn customization() -> Customization {
        Customization {
            message: "Pozdrav!".to_string(),
            recipient_email: "a@b.com".to_string(),
            recipient_name: "Ana".to_string(),
            sender_name: "Ivo".to_string(),
            ..Customization::default()
        }
    }

    #[tokio::test]
    async fn test_render_with_failed_background_is_not_empty() {
        let compositor = Compositor::with_parts(Typefaces::builtin(), Arc::new(Unreachable));
        let pair = compositor
            .render(&template(), &customization(), Language::Hr)
            .await;

        assert!(pair.front.starts_with("data:image/jpeg;base64,"));
        assert!(pair.back.starts_with("data:image/jpeg;base64,"));
        assert!(pair.front.len() > "data:image/jpeg;base64,".len());
    }

    #[tokio::test]
    async fn test_render_with_background() {
        let source = Arc::new(Solid(AtomicUsize::new(0)));
        let compositor = Compositor::with_parts(Typefaces::builtin(), source.clone());
        let pair = compositor
            .render(&template(), &customization(), Language::En)
            .await;

        assert_eq!(source.0.load(Ordering::SeqCst), 1);
        let front = DataUrl::parse(&pair.front).unwrap();
        let image = image::load_from_memory(&front.bytes).unwrap();
        assert_eq!((image.width(), image.height()), (WIDTH, HEIGHT));
    }

    #[tokio::test]
    async fn test_back_face_is_deterministic() {
        let compositor = Compositor::with_parts(Typefaces::builtin(), Arc::new(Unreachable));
        let first = compositor
            .render_back(&customization(), Language::Hr)
            .await
            .unwrap();
        let second = compositor
            .render_back(&customization(), Language::Hr)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_placeholder_encodes() {
        let compositor = Compositor::with_parts(Typefaces::builtin(), Arc::new(Unreachable));
        assert!(compositor
            .placeholder(Language::En)
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_file_names() {
        let (front, back) = RenderedPair::file_names(&template());
        assert_eq!(front, "razglednica-prednja-tropska-plaža.jpg");
        assert_eq!(back, "razglednica-straznja-tropska-plaža.jpg");
    }

    #[tokio::test]
    async fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let compositor = Compositor::with_parts(Typefaces::builtin(), Arc::new(Unreachable));
        let pair = compositor
            .render(&template(), &customization(), Language::Hr)
            .await;

        let (front, back) = pair.write_to(dir.path(), &template()).unwrap();
        assert!(front.exists());
        assert!(image::open(&back).is_ok());
    }
}
