//! Form relay transport.
//!
//! Posts a flat JSON form to `{relay_url}/{operator_inbox}`. The relay turns
//! it into an email to the inbox and copies the recipient via `_cc`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use super::email::{self, ImageRefs};
use super::envelope::{ContactMessage, Envelope, Postcard};
use super::transport::{Transport, TransportError, check_status, endpoint};

/// Form relay client.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: Client,
    url: Url,
}

impl RelayTransport {
    #[must_use]
    pub fn new(client: Client, relay_url: &Url, inbox: &str) -> Self {
        Self {
            client,
            url: endpoint(relay_url, inbox),
        }
    }

    /// Post `payload` and require a confirmed success.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses, and bodies without a
    /// `success` flag of `true` or `"true"`.
    pub async fn post(&self, payload: &Value) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        if confirms_success(&body) {
            Ok(())
        } else {
            Err(TransportError::Rejected(body))
        }
    }
}

/// Whether a relay response body reports success.
#[must_use]
pub fn confirms_success(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    match value.get("success") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag == "true",
        _ => false,
    }
}

/// Relay form for a postcard, with both faces inlined in the HTML body.
///
/// # Errors
///
/// Returns [`TransportError::Build`] if the email body cannot be rendered.
pub fn postcard_payload(postcard: &Postcard) -> Result<Value, TransportError> {
    let rendered = email::postcard_email(postcard, ImageRefs::Inline)?;
    Ok(json!({
        "_subject": rendered.subject,
        "_template": "box",
        "_captcha": "false",
        "_cc": postcard.recipient_email.as_str(),
        "_format": "html",
        "_html": rendered.html,
        "sender_name": postcard.sender_name,
        "recipient_name": postcard.recipient_name,
        "recipient_email": postcard.recipient_email.as_str(),
        "message": postcard.message_or_default(),
        "full_message": rendered.text,
        "postcard_type": "digital",
        "sent_via": "RetroPost relay",
    }))
}

/// Relay form for a contact message.
#[must_use]
pub fn contact_payload(contact: &ContactMessage) -> Value {
    json!({
        "_subject": format!("RetroPost Contact: {}", contact.subject),
        "_template": "table",
        "_captcha": "false",
        "_replyto": contact.email.as_str(),
        "name": contact.name,
        "email": contact.email.as_str(),
        "subject": contact.subject,
        "message": contact.message,
    })
}

#[async_trait]
impl Transport for RelayTransport {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let payload = match envelope {
            Envelope::Postcard(postcard) => postcard_payload(postcard)?,
            Envelope::Contact(contact) => contact_payload(contact),
        };
        self.post(&payload).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retropost_core::Email;
    use wiremock::matchers::{body_partial_json, header, method, path};
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
    fn test_confirms_success() {
        assert!(confirms_success(r#"{"success":true}"#));
        assert!(confirms_success(r#"{"success":"true","message":"sent"}"#));
        assert!(!confirms_success(r#"{"success":false}"#));
        assert!(!confirms_success(r#"{"success":"false"}"#));
        assert!(!confirms_success(r#"{"message":"ok"}"#));
        assert!(!confirms_success("<html>ok</html>"));
    }

    #[test]
    fn test_postcard_payload_fields() {
        let payload = postcard_payload(&postcard()).unwrap();
        assert_eq!(payload["_cc"], "a@b.com");
        assert_eq!(payload["_format"], "html");
        assert_eq!(payload["sender_name"], "Ivo");
        assert_eq!(payload["message"], "Pozdrav!");
        assert!(payload["_html"].as_str().unwrap().contains("AAAA"));
        assert!(!payload["full_message"].as_str().unwrap().contains("AAAA"));
    }

    #[tokio::test]
    async fn test_deliver_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ops@retropost.example"))
            .and(header("accept", "application/json"))
            .and(body_partial_json(json!({"_cc": "a@b.com", "recipient_name": "Ana"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": "true"})))
            .expect(1)
            .mount(&server)
            .await;

        relay(&server)
            .deliver(&Envelope::Postcard(postcard()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unconfirmed_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let err = relay(&server)
            .deliver(&Envelope::Postcard(postcard()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = relay(&server)
            .deliver(&Envelope::Postcard(postcard()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 500, .. }));
    }
}
