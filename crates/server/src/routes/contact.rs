//! Contact form route handler.
//!
//! Delivers contact messages to the operator inbox through the same
//! transport chain as postcards.

use axum::{Json, extract::State};
use retropost_core::Language;
use retropost_core::messages::Message;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::dispatch::ContactRequest;
use crate::error::Result;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(flatten)]
    pub request: ContactRequest,
    #[serde(default)]
    pub language: Option<Language>,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub transport: &'static str,
}

/// Submit a contact message.
///
/// POST /api/contact
#[instrument(skip_all, fields(email = %form.request.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactResponse>> {
    let language = form.language.unwrap_or(state.config().language);
    let receipt = state
        .dispatcher()
        .send_contact(form.request, language)
        .await?;

    Ok(Json(ContactResponse {
        success: true,
        message: Some(Message::ContactSent.text(language).to_string()),
        transport: receipt.transport,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::dispatch::Transport;
    use crate::routes::testing::{Counting, app, json_body, json_request};

    #[tokio::test]
    async fn test_contact_delivered() {
        let transport = Counting::new(true);
        let response = app(
            vec![Arc::clone(&transport) as Arc<dyn Transport>],
            "http://127.0.0.1:9",
        )
        .oneshot(json_request(
            "POST",
            "/api/contact",
            &json!({
                "name": "Marko",
                "email": "marko@example.hr",
                "subject": "Upit",
                "message": "Zanima me cijena razglednica.",
            }),
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Poruka je uspješno poslana!");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_short_message_rejected_in_english() {
        let transport = Counting::new(true);
        let response = app(
            vec![Arc::clone(&transport) as Arc<dyn Transport>],
            "http://127.0.0.1:9",
        )
        .oneshot(json_request(
            "POST",
            "/api/contact",
            &json!({
                "name": "Marko",
                "email": "marko@example.hr",
                "subject": "Upit",
                "message": "Bok",
                "language": "en",
            }),
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Message must be at least 10 characters"
        );
        assert_eq!(transport.calls(), 0);
    }
}
