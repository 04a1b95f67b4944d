//! Delivery behind the hosted `/send-postcard` and `/send-contact` endpoints.
//!
//! Uses SMTP via lettre when it is configured: both faces are attached as
//! inline parts and referenced from the HTML body by content id. Without SMTP
//! the message is forwarded to the form relay, which copies the recipient.

use std::fmt;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::compositor::DataUrl;
use crate::config::{RetroPostConfig, SmtpConfig};
use crate::dispatch::email::{self, ImageRefs, RenderedEmail};
use crate::dispatch::relay::{self, RelayTransport};
use crate::dispatch::{ContactMessage, Postcard, TransportError};

const FRONT_CID: &str = "front";
const BACK_CID: &str = "back";

/// Errors that can occur when delivering from the hosted endpoints.
#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// A postcard face is not a usable `data:` URL.
    #[error("Invalid image attachment: {0}")]
    Attachment(&'static str),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The relay HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The form relay did not accept the message.
    #[error("Relay error: {0}")]
    Relay(#[from] TransportError),
}

#[derive(Clone)]
enum Backend {
    Smtp {
        mailer: AsyncSmtpTransport<Tokio1Executor>,
        from_address: String,
    },
    Relay(RelayTransport),
}

/// Sends postcards and contact messages for the hosted endpoints.
#[derive(Clone)]
pub struct Mailer {
    backend: Backend,
    inbox: String,
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("channel", &self.channel())
            .field("inbox", &self.inbox)
            .finish_non_exhaustive()
    }
}

impl Mailer {
    /// SMTP when configured, the form relay otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay or the relay HTTP client cannot be
    /// set up.
    pub fn from_config(config: &RetroPostConfig) -> Result<Self, MailerError> {
        let inbox = config.delivery.operator_inbox.as_str();
        if let Some(smtp) = &config.smtp {
            return Self::smtp(smtp, inbox);
        }

        let client = reqwest::Client::builder()
            .timeout(config.delivery.request_timeout)
            .build()?;
        Ok(Self::relay(
            RelayTransport::new(client, &config.delivery.relay_url, inbox),
            inbox,
        ))
    }

    /// Deliver over SMTP with STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns error if SMTP connection fails.
    pub fn smtp(config: &SmtpConfig, inbox: &str) -> Result<Self, MailerError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            backend: Backend::Smtp {
                mailer,
                from_address: config.from_address.clone(),
            },
            inbox: inbox.to_string(),
        })
    }

    /// Forward everything to the form relay.
    #[must_use]
    pub fn relay(relay: RelayTransport, inbox: &str) -> Self {
        Self {
            backend: Backend::Relay(relay),
            inbox: inbox.to_string(),
        }
    }

    /// Name of the active channel, for logs.
    #[must_use]
    pub const fn channel(&self) -> &'static str {
        match self.backend {
            Backend::Smtp { .. } => "smtp",
            Backend::Relay(_) => "relay",
        }
    }

    /// Send a postcard to its recipient.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_postcard(&self, postcard: &Postcard) -> Result<(), MailerError> {
        match &self.backend {
            Backend::Relay(relay) => relay.post(&relay::postcard_payload(postcard)?).await?,
            Backend::Smtp {
                mailer,
                from_address,
            } => {
                let RenderedEmail {
                    subject,
                    html,
                    text,
                } = email::postcard_email(
                    postcard,
                    ImageRefs::ContentIds {
                        front: FRONT_CID,
                        back: BACK_CID,
                    },
                )?;
                let body = MultiPart::alternative()
                    .singlepart(SinglePart::plain(text))
                    .multipart(
                        MultiPart::related()
                            .singlepart(SinglePart::html(html))
                            .singlepart(inline_image(FRONT_CID, &postcard.front_image)?)
                            .singlepart(inline_image(BACK_CID, &postcard.back_image)?),
                    );

                let message = Message::builder()
                    .from(parse_mailbox(from_address)?)
                    .to(parse_mailbox(postcard.recipient_email.as_str())?)
                    .bcc(parse_mailbox(&self.inbox)?)
                    .subject(subject)
                    .multipart(body)?;
                mailer.send(message).await?;
            }
        }

        tracing::info!(
            channel = self.channel(),
            recipient = %postcard.recipient_email,
            "Postcard sent"
        );
        Ok(())
    }

    /// Send a contact message to the operator inbox.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_contact(&self, contact: &ContactMessage) -> Result<(), MailerError> {
        match &self.backend {
            Backend::Relay(relay) => relay.post(&relay::contact_payload(contact)).await?,
            Backend::Smtp {
                mailer,
                from_address,
            } => {
                let RenderedEmail {
                    subject,
                    html,
                    text,
                } = email::contact_email(contact)?;
                let message = Message::builder()
                    .from(parse_mailbox(from_address)?)
                    .to(parse_mailbox(&self.inbox)?)
                    .reply_to(parse_mailbox(contact.email.as_str())?)
                    .subject(subject)
                    .multipart(MultiPart::alternative_plain_html(text, html))?;
                mailer.send(message).await?;
            }
        }

        tracing::info!(channel = self.channel(), from = %contact.email, "Contact message sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address
        .parse()
        .map_err(|_| MailerError::InvalidAddress(address.to_string()))
}

/// A face as an inline MIME part with content id `cid`.
fn inline_image(cid: &'static str, data_url: &str) -> Result<SinglePart, MailerError> {
    let image = DataUrl::parse(data_url).ok_or(MailerError::Attachment(cid))?;
    let content_type = ContentType::parse(&image.mime).map_err(|_| MailerError::Attachment(cid))?;
    Ok(Attachment::new_inline(cid.to_string()).body(image.bytes, content_type))
}
