//! Emergency text-only transport.
//!
//! Last link of the chain. Sends a plain-text summary without images, through
//! EmailJS when it is configured and through the form relay otherwise.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

use super::envelope::{ContactMessage, Envelope, Postcard};
use super::relay::RelayTransport;
use super::transport::{Transport, TransportError, check_status};
use crate::config::EmailJsConfig;

/// Body of an EmailJS `send` call.
#[derive(Debug, Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    from_name: &'a str,
    message: String,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct EmergencyTransport {
    client: Client,
    emailjs: Option<EmailJsConfig>,
    relay: RelayTransport,
    inbox: String,
}

impl EmergencyTransport {
    #[must_use]
    pub const fn new(
        client: Client,
        emailjs: Option<EmailJsConfig>,
        relay: RelayTransport,
        inbox: String,
    ) -> Self {
        Self {
            client,
            emailjs,
            relay,
            inbox,
        }
    }

    async fn send_emailjs(
        &self,
        config: &EmailJsConfig,
        params: TemplateParams<'_>,
    ) -> Result<(), TransportError> {
        let body = EmailJsRequest {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: config.public_key(),
            template_params: params,
        };
        let response = self
            .client
            .post(config.url.clone())
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn postcard_params(postcard: &Postcard) -> TemplateParams<'_> {
        TemplateParams {
            to_email: postcard.recipient_email.as_str(),
            to_name: &postcard.recipient_name,
            from_name: &postcard.sender_name,
            message: postcard_text(postcard),
            subject: format!("RetroPost razglednica od {}", postcard.sender_name),
            reply_to: None,
        }
    }

    fn contact_params<'a>(&'a self, contact: &'a ContactMessage) -> TemplateParams<'a> {
        TemplateParams {
            to_email: &self.inbox,
            to_name: "RetroPost",
            from_name: &contact.name,
            message: contact.message.clone(),
            subject: format!("RetroPost Contact: {}", contact.subject),
            reply_to: Some(contact.email.as_str()),
        }
    }
}

/// Plain-text summary of a postcard.
fn postcard_text(postcard: &Postcard) -> String {
    format!(
        "Razglednica od: {}\nZa: {} ({})\n\nPoruka:\n{}\n\nSlike nisu priložene.",
        postcard.sender_name,
        postcard.recipient_name,
        postcard.recipient_email,
        postcard.message_or_default(),
    )
}

#[async_trait]
impl Transport for EmergencyTransport {
    fn name(&self) -> &'static str {
        "emergency"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if let Some(config) = &self.emailjs {
            let params = match envelope {
                Envelope::Postcard(postcard) => Self::postcard_params(postcard),
                Envelope::Contact(contact) => self.contact_params(contact),
            };
            return self.send_emailjs(config, params).await;
        }

        let payload = match envelope {
            Envelope::Postcard(postcard) => json!({
                "_subject": format!("RetroPost (hitno): razglednica od {}", postcard.sender_name),
                "_template": "basic",
                "_captcha": "false",
                "_cc": postcard.recipient_email.as_str(),
                "sender_name": postcard.sender_name,
                "recipient_name": postcard.recipient_name,
                "recipient_email": postcard.recipient_email.as_str(),
                "message": postcard_text(postcard),
            }),
            Envelope::Contact(contact) => json!({
                "_subject": format!("RetroPost (hitno): {}", contact.subject),
                "_template": "basic",
                "_captcha": "false",
                "_replyto": contact.email.as_str(),
                "name": contact.name,
                "email": contact.email.as_str(),
                "message": contact.message,
            }),
        };
        self.relay.post(&payload).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retropost_core::Email;
    use secrecy::SecretString;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn postcard() -> Postcard {
        Postcard {
            recipient_email: Email::parse("a@b.com").unwrap(),
            recipient_name: "Ana".to_string(),
            sender_name: "Ivo".to_string(),
            message: "Pozdrav!".to_string(),
            front_image: "data:image/jpeg;base64,AAAA".to_string(),
            back_image: "data:image/jpeg;base64,BBBB".to_string(),
        }
    }

    fn relay(server: &MockServer) -> RelayTransport {
        RelayTransport::new(
            Client::new(),
            &Url::parse(&server.uri()).unwrap(),
            "ops@retropost.example",
        )
    }

    #[test]
    fn test_postcard_text_has_no_images() {
        let text = postcard_text(&postcard());
        assert!(text.contains("Ivo"));
        assert!(text.contains("Pozdrav!"));
        assert!(!text.contains("base64"));
    }

    #[tokio::test]
    async fn test_emailjs_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1.0/email/send"))
            .and(body_partial_json(json!({
                "service_id": "service_retropost",
                "user_id": "pk_live",
                "template_params": {"to_email": "a@b.com", "from_name": "Ivo"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let emailjs = EmailJsConfig {
            url: Url::parse(&format!("{}/api/v1.0/email/send", server.uri())).unwrap(),
            service_id: "service_retropost".to_string(),
            template_id: "template_contact".to_string(),
            public_key: SecretString::from("pk_live"),
        };
        let transport = EmergencyTransport::new(
            Client::new(),
            Some(emailjs),
            relay(&server),
            "ops@retropost.example".to_string(),
        );
        transport
            .deliver(&Envelope::Postcard(postcard()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_relay_without_emailjs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ops@retropost.example"))
            .and(body_partial_json(json!({"_template": "basic", "_cc": "a@b.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = EmergencyTransport::new(
            Client::new(),
            None,
            relay(&server),
            "ops@retropost.example".to_string(),
        );
        transport
            .deliver(&Envelope::Postcard(postcard()))
            .await
            .unwrap();
    }
}
