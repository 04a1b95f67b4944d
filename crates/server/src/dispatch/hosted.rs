//! Hosted function transport.
//!
//! Calls this server's own `/send-postcard` and `/send-contact` endpoints on
//! a deployment that runs them. Disabled unless configured.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::envelope::Envelope;
use super::relay::confirms_success;
use super::transport::{Transport, TransportError, check_status, endpoint};

#[derive(Debug, Clone)]
pub struct HostedTransport {
    client: Client,
    base_url: Url,
    enabled: bool,
}

impl HostedTransport {
    #[must_use]
    pub const fn new(client: Client, base_url: Url, enabled: bool) -> Self {
        Self {
            client,
            base_url,
            enabled,
        }
    }
}

#[async_trait]
impl Transport for HostedTransport {
    fn name(&self) -> &'static str {
        "hosted"
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let request = match envelope {
            Envelope::Postcard(postcard) => self
                .client
                .post(endpoint(&self.base_url, "send-postcard"))
                .json(&postcard.to_request()),
            Envelope::Contact(contact) => self
                .client
                .post(endpoint(&self.base_url, "send-contact"))
                .json(&contact.to_request()),
        };

        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        if confirms_success(&body) {
            Ok(())
        } else {
            Err(TransportError::Rejected(body))
        }
    }
}
