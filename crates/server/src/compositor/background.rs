//! Background image sources for the front face.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use moka::future::Cache;
use thiserror::Error;

use super::encode::DataUrl;

/// Errors loading a background. All of them trigger the gradient fallback.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("background returned status {0}")]
    Status(u16),

    #[error("malformed data URL")]
    DataUrl,

    #[error("undecodable image: {0}")]
    Decode(String),
}

/// Resolves a template's background reference into pixels.
#[async_trait]
pub trait BackgroundSource: Send + Sync {
    async fn load(&self, reference: &str) -> Result<Arc<DynamicImage>, LoadError>;
}

/// Fetches backgrounds over HTTP and decodes `data:` URLs in place.
///
/// Decoded remote images are cached by URL. Uploaded photos (`data:` URLs)
/// are never cached.
#[derive(Clone)]
pub struct HttpBackgrounds {
    client: reqwest::Client,
    cache: Cache<String, Arc<DynamicImage>>,
}

impl HttpBackgrounds {
    /// Maximum number of decoded backgrounds kept in memory.
    const CACHE_CAPACITY: u64 = 32;

    /// Create a source whose fetches give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            cache: Cache::builder()
                .max_capacity(Self::CACHE_CAPACITY)
                .time_to_live(Duration::from_secs(60 * 60))
                .build(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Arc<DynamicImage>, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        decode(bytes.to_vec()).await
    }
}

#[async_trait]
impl BackgroundSource for HttpBackgrounds {
    async fn load(&self, reference: &str) -> Result<Arc<DynamicImage>, LoadError> {
        if reference.starts_with("data:") {
            let data = DataUrl::parse(reference).ok_or(LoadError::DataUrl)?;
            return decode(data.bytes).await;
        }

        if let Some(image) = self.cache.get(reference).await {
            tracing::debug!(url = %reference, "Background cache hit");
            return Ok(image);
        }

        let image = self.fetch(reference).await?;
        self.cache
            .insert(reference.to_string(), Arc::clone(&image))
            .await;
        Ok(image)
    }
}

async fn decode(bytes: Vec<u8>) -> Result<Arc<DynamicImage>, LoadError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| LoadError::Decode(e.to_string()))?
        .map(Arc::new)
        .map_err(|e| LoadError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Rgba, RgbaImage};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::compositor::encode::png_data_url;

    fn png_bytes() -> Vec<u8> {
        let url = png_data_url(&RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]))).unwrap();
        DataUrl::parse(&url).unwrap().bytes
    }

    #[tokio::test]
    async fn test_loads_and_caches_remote_background() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bg.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpBackgrounds::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/bg.png", server.uri());
        let first = source.load(&url).await.unwrap();
        let second = source.load(&url).await.unwrap();

        assert_eq!((first.width(), first.height()), (4, 3));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpBackgrounds::new(Duration::from_secs(5)).unwrap();
        let err = source
            .load(&format!("{}/missing.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Status(404)));
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
            .mount(&server)
            .await;

        let source = HttpBackgrounds::new(Duration::from_secs(5)).unwrap();
        let err = source
            .load(&format!("{}/broken.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
    }

    #[tokio::test]
    async fn test_data_url_background() {
        let url = png_data_url(&RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]))).unwrap();
        let source = HttpBackgrounds::new(Duration::from_secs(5)).unwrap();
        let image = source.load(&url).await.unwrap();
        assert_eq!(image.width(), 2);

        assert!(matches!(
            source.load("data:image/png;base64,!!").await,
            Err(LoadError::DataUrl)
        ));
    }
}
