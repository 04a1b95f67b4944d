//! Rendering and sending postcards.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use retropost_core::messages::Message;
use retropost_core::{Customization, Language, Template};
use retropost_server::catalog::Catalog;
use retropost_server::compositor::{Compositor, RenderedPair};
use retropost_server::config::{CompositorConfig, RetroPostConfig};
use retropost_server::dispatch::{DispatchError, Dispatcher, PostcardRequest};
use thiserror::Error;

use super::CommandResult;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("give either --template or --photo")]
    NoSource,

    #[error("unsupported photo type: {0} (use .jpg, .jpeg or .png)")]
    UnsupportedPhoto(PathBuf),

    #[error("could not read photo {path}: {source}")]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Catalog template by id, or a custom template around a local photo.
///
/// # Errors
///
/// Returns [`SourceError`] for unknown ids and unreadable or unsupported photos.
pub fn resolve(template: Option<&str>, photo: Option<&Path>) -> Result<Template, SourceError> {
    if let Some(path) = photo {
        return Ok(Catalog::custom(photo_data_url(path)?));
    }
    let id = template.ok_or(SourceError::NoSource)?;
    Catalog::builtin()
        .get(id)
        .cloned()
        .ok_or_else(|| SourceError::UnknownTemplate(id.to_string()))
}

/// Read a photo into a `data:` URL.
fn photo_data_url(path: &Path) -> Result<String, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let mime = match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => return Err(SourceError::UnsupportedPhoto(path.to_path_buf())),
    };
    let bytes = std::fs::read(path).map_err(|source| SourceError::Photo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Render a postcard with only the compositor configured.
///
/// # Errors
///
/// Returns an error if configuration is invalid.
pub async fn render_pair(
    template: &Template,
    customization: &Customization,
    language: Language,
) -> Result<RenderedPair, Box<dyn std::error::Error>> {
    let compositor = Compositor::new(&CompositorConfig::load()?)?;
    Ok(compositor.render(template, customization, language).await)
}

/// Render both faces into `out`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the files cannot be written.
#[allow(clippy::print_stdout)]
pub async fn render(
    template: &Template,
    customization: &Customization,
    language: Language,
    out: &Path,
) -> CommandResult {
    let pair = render_pair(template, customization, language).await?;
    std::fs::create_dir_all(out)?;
    let (front, back) = pair.write_to(out, template)?;
    println!("{}", front.display());
    println!("{}", back.display());
    Ok(())
}

/// Check the addressing, render, then deliver through the transport chain.
///
/// # Errors
///
/// Returns an error if configuration is missing, validation fails, or every
/// transport fails.
#[allow(clippy::print_stdout)]
pub async fn send(template: &Template, customization: &Customization, language: Language) -> CommandResult {
    PostcardRequest::addressed(customization)
        .check_addressing()
        .map_err(|e| DispatchError::invalid(e, language))?;

    let config = RetroPostConfig::from_env()?;
    let compositor = Compositor::new(&config.compositor)?;
    let dispatcher = Dispatcher::new(&config.delivery)?;

    let images = compositor.render(template, customization, language).await;
    let request = PostcardRequest::for_rendered(customization, &images);
    let receipt = dispatcher.send_postcard(request, language).await?;

    println!(
        "{} ({}, {} attempt(s))",
        Message::PostcardSent.text(language),
        receipt.transport,
        receipt.attempts
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_catalog_template() {
        assert_eq!(resolve(Some("2"), None).unwrap().name, "Planinski Vrh");
        assert!(matches!(
            resolve(Some("42"), None),
            Err(SourceError::UnknownTemplate(_))
        ));
        assert!(matches!(resolve(None, None), Err(SourceError::NoSource)));
    }

    #[test]
    fn test_resolve_photo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("more.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let template = resolve(Some("2"), Some(&path)).unwrap();
        assert_eq!(template.id.as_str(), "custom");
        assert!(template.image.starts_with("data:image/png;base64,"));

        let gif = dir.path().join("anim.gif");
        std::fs::write(&gif, b"GIF89a").unwrap();
        assert!(matches!(
            resolve(None, Some(&gif)),
            Err(SourceError::UnsupportedPhoto(_))
        ));
    }

    #[tokio::test]
    async fn test_send_rejects_bad_address_before_rendering() {
        let template = resolve(Some("1"), None).unwrap();
        let customization = Customization {
            recipient_email: "not-an-email".to_string(),
            sender_name: "Ivo".to_string(),
            ..Customization::default()
        };

        let err = send(&template, &customization, Language::Hr).await.unwrap_err();
        assert_eq!(err.to_string(), "Molimo unesite valjanu email adresu");
    }
}
