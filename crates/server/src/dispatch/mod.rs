//! Delivery dispatcher.
//!
//! Delivers postcards and contact messages through an ordered chain of
//! transports: the hosted function, the form relay, then the text-only
//! emergency path. Input is validated before anything touches the network.
//! Each available transport gets exactly one attempt, in order, until one
//! succeeds. Only exhaustion of the whole chain is reported to the caller.

pub mod email;
pub mod emergency;
pub mod envelope;
pub mod hosted;
pub mod relay;
pub mod transport;

use std::sync::Arc;

use retropost_core::Language;
use retropost_core::messages::delivery_exhausted;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::DeliveryConfig;
pub use emergency::EmergencyTransport;
pub use envelope::{
    ContactMessage, ContactRequest, Envelope, Postcard, PostcardRequest, ValidationError,
};
pub use hosted::HostedTransport;
pub use relay::RelayTransport;
pub use transport::{Transport, TransportError};

/// Errors surfaced to callers of the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Input was rejected; nothing was sent.
    #[error("{message}")]
    Invalid {
        #[source]
        source: ValidationError,
        message: String,
    },

    /// Every available transport failed.
    #[error("{message}")]
    Exhausted {
        attempts: usize,
        message: String,
        #[source]
        last: Option<TransportError>,
    },
}

impl DispatchError {
    /// Rejection of `source` with its message in `language`.
    #[must_use]
    pub fn invalid(source: ValidationError, language: Language) -> Self {
        Self::Invalid {
            source,
            message: source.localized(language).to_string(),
        }
    }
}

/// Proof of delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Name of the transport that delivered.
    pub transport: &'static str,
    /// Transports attempted, including the successful one.
    pub attempts: usize,
}

/// Runs the transport chain.
#[derive(Clone)]
pub struct Dispatcher {
    transports: Vec<Arc<dyn Transport>>,
    support_contact: String,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "transports",
                &self.transports.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("support_contact", &self.support_contact)
            .finish()
    }
}

impl Dispatcher {
    /// Build the hosted → relay → emergency chain from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &DeliveryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("RetroPost/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let inbox = config.operator_inbox.as_str();
        let relay = RelayTransport::new(client.clone(), &config.relay_url, inbox);

        let transports: Vec<Arc<dyn Transport>> = vec![
            Arc::new(HostedTransport::new(
                client.clone(),
                config.hosted_url.clone(),
                config.hosted_enabled,
            )),
            Arc::new(relay.clone()),
            Arc::new(EmergencyTransport::new(
                client,
                config.emailjs.clone(),
                relay,
                inbox.to_string(),
            )),
        ];

        Ok(Self::with_transports(
            transports,
            config.support_contact.clone(),
        ))
    }

    /// Use an explicit chain, attempted in the given order.
    #[must_use]
    pub fn with_transports(
        transports: Vec<Arc<dyn Transport>>,
        support_contact: impl Into<String>,
    ) -> Self {
        Self {
            transports,
            support_contact: support_contact.into(),
        }
    }

    /// Validate and deliver a postcard.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Invalid`] for bad input and
    /// [`DispatchError::Exhausted`] when every transport fails.
    #[instrument(skip_all)]
    pub async fn send_postcard(
        &self,
        request: PostcardRequest,
        language: Language,
    ) -> Result<Receipt, DispatchError> {
        let postcard = request
            .validate(language)
            .map_err(|e| DispatchError::invalid(e, language))?;
        self.dispatch(&Envelope::Postcard(postcard), language).await
    }

    /// Validate and deliver a contact message.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Invalid`] for bad input and
    /// [`DispatchError::Exhausted`] when every transport fails.
    #[instrument(skip_all)]
    pub async fn send_contact(
        &self,
        request: ContactRequest,
        language: Language,
    ) -> Result<Receipt, DispatchError> {
        let contact = request
            .validate()
            .map_err(|e| DispatchError::invalid(e, language))?;
        self.dispatch(&Envelope::Contact(contact), language).await
    }

    /// Run the chain for an already validated envelope.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Exhausted`] when every transport fails.
    pub async fn dispatch(
        &self,
        envelope: &Envelope,
        language: Language,
    ) -> Result<Receipt, DispatchError> {
        let mut attempts = 0;
        let mut last = None;

        for transport in &self.transports {
            if !transport.is_available() {
                tracing::debug!(transport = transport.name(), "Transport unavailable, skipping");
                continue;
            }

            attempts += 1;
            match transport.deliver(envelope).await {
                Ok(()) => {
                    tracing::info!(
                        transport = transport.name(),
                        kind = envelope.kind(),
                        attempts,
                        "Delivered"
                    );
                    return Ok(Receipt {
                        transport: transport.name(),
                        attempts,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        transport = transport.name(),
                        kind = envelope.kind(),
                        error = %e,
                        "Delivery attempt failed"
                    );
                    last = Some(e);
                }
            }
        }

        tracing::error!(kind = envelope.kind(), attempts, "All transports failed");
        Err(DispatchError::Exhausted {
            attempts,
            message: delivery_exhausted(language, &self.support_contact),
            last,
        })
    }
}
