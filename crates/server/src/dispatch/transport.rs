//! The transport seam of the delivery chain.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::envelope::Envelope;

/// Why a single delivery attempt failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("endpoint did not confirm delivery: {0}")]
    Rejected(String),

    #[error("could not build message: {0}")]
    Build(String),
}

impl From<askama::Error> for TransportError {
    fn from(err: askama::Error) -> Self {
        Self::Build(err.to_string())
    }
}

/// One way of getting a message to the operator inbox.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short identifier used in logs and receipts.
    fn name(&self) -> &'static str;

    /// Whether this transport should be attempted at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Make exactly one delivery attempt.
    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError>;
}

/// `base` with `path` appended as a final segment.
#[must_use]
pub fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(path);
    }
    url
}

/// Fail with [`TransportError::Status`] unless the response is 2xx.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let base = Url::parse("https://formsubmit.co").unwrap();
        assert_eq!(
            endpoint(&base, "ops@retropost.example").as_str(),
            "https://formsubmit.co/ops@retropost.example"
        );

        let nested = Url::parse("https://retropost.example/fn/").unwrap();
        assert_eq!(
            endpoint(&nested, "send-postcard").as_str(),
            "https://retropost.example/fn/send-postcard"
        );

        let no_slash = Url::parse("https://retropost.example/fn").unwrap();
        assert_eq!(
            endpoint(&no_slash, "send-contact").as_str(),
            "https://retropost.example/fn/send-contact"
        );
    }
}
