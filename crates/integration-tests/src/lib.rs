//! Integration tests for RetroPost.
//!
//! Every test runs against real components: the dispatcher with its real
//! transports, and the HTTP server bound to an ephemeral port. Outside
//! services (form relay, EmailJS) are `wiremock` servers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p retropost-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `dispatch_chain` - Transport fallthrough end to end
//! - `http_api` - API and hosted function over HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;

use retropost_server::config::{ConfigError, RetroPostConfig};
use retropost_server::state::AppState;
use wiremock::MockServer;

/// Operator inbox used by every test configuration.
pub const INBOX: &str = "ops@retropost.test";

/// Relay path for [`INBOX`].
pub const RELAY_PATH: &str = "/ops@retropost.test";

/// EmailJS path on the mock server.
pub const EMAILJS_PATH: &str = "/api/v1.0/email/send";

/// A 1x1 PNG as a `data:` URL.
pub use retropost_server::compositor::MINIMAL_PNG_DATA_URL as PIXEL;

/// Mock outside services.
pub struct Upstreams {
    pub relay: MockServer,
    pub emailjs: MockServer,
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            relay: MockServer::start().await,
            emailjs: MockServer::start().await,
        }
    }

    /// Configuration pointing at these mocks. The hosted transport is used
    /// only when `hosted_url` is given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the generated configuration is invalid.
    pub fn config(&self, hosted_url: Option<&str>) -> Result<RetroPostConfig, ConfigError> {
        let emailjs_url = format!("{}{EMAILJS_PATH}", self.emailjs.uri());
        let relay_url = self.relay.uri();
        let mut vars = HashMap::from([
            ("RETROPOST_OPERATOR_INBOX", INBOX.to_string()),
            ("RETROPOST_SUPPORT_CONTACT", "podrska@retropost.test".to_string()),
            ("RETROPOST_RELAY_URL", relay_url),
            ("RETROPOST_REQUEST_TIMEOUT_SECS", "5".to_string()),
            ("RETROPOST_BACKGROUND_TIMEOUT_SECS", "1".to_string()),
            ("EMAILJS_SERVICE_ID", "service_retropost".to_string()),
            ("EMAILJS_TEMPLATE_ID", "template_postcard".to_string()),
            ("EMAILJS_PUBLIC_KEY", "pk_live_8f2k".to_string()),
            ("EMAILJS_URL", emailjs_url),
        ]);
        if let Some(url) = hosted_url {
            vars.insert("RETROPOST_HOSTED_TRANSPORT", "true".to_string());
            vars.insert("RETROPOST_HOSTED_URL", url.to_string());
        }
        RetroPostConfig::from_lookup(|key| vars.get(key).cloned())
    }
}

/// Serve the RetroPost router on an ephemeral port and return its base URL.
///
/// # Errors
///
/// Returns an error if the state cannot be built or the port cannot be bound.
pub async fn spawn_server(
    config: RetroPostConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, retropost_server::app(state)).await;
    });

    Ok(format!("http://{addr}"))
}
