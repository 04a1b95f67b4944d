//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::compositor::Compositor;
use crate::config::RetroPostConfig;
use crate::dispatch::Dispatcher;
use crate::services::{Mailer, MailerError};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to set up mailer: {0}")]
    Mailer(#[from] MailerError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// compositor, the delivery chain and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RetroPostConfig,
    catalog: Catalog,
    compositor: Compositor,
    dispatcher: Dispatcher,
    mailer: Mailer,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client or the SMTP relay cannot be set up.
    pub fn new(config: RetroPostConfig) -> Result<Self, StateError> {
        let compositor = Compositor::new(&config.compositor)?;
        let dispatcher = Dispatcher::new(&config.delivery)?;
        let mailer = Mailer::from_config(&config)?;
        Ok(Self::from_parts(config, compositor, dispatcher, mailer))
    }

    /// Assemble state from prebuilt parts.
    #[must_use]
    pub fn from_parts(
        config: RetroPostConfig,
        compositor: Compositor,
        dispatcher: Dispatcher,
        mailer: Mailer,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Catalog::builtin(),
                compositor,
                dispatcher,
                mailer,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &RetroPostConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.inner.compositor
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Delivery used by the hosted endpoints.
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }
}
