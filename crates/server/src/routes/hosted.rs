//! Hosted postcard function.
//!
//! `/send-postcard` and `/send-contact` are the primary transport's endpoint.
//! They are called cross-origin, so every response carries permissive CORS
//! headers and `OPTIONS` answers `ok`.

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderValue, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::dispatch::{ContactRequest, PostcardRequest, ValidationError};
use crate::services::MailerError;
use crate::state::AppState;

/// Success body of `/send-postcard`.
#[derive(Debug, Serialize)]
pub struct PostcardSent {
    pub success: bool,
    pub message: String,
    pub recipient: String,
    pub sender: String,
}

/// Add the CORS headers the browser client needs.
pub async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// CORS preflight.
pub async fn preflight() -> &'static str {
    "ok"
}

/// Deliver a postcard.
///
/// POST /send-postcard
#[instrument(skip_all)]
pub async fn send_postcard(
    State(state): State<AppState>,
    Json(request): Json<PostcardRequest>,
) -> Response {
    let postcard = match request.validate(state.config().language) {
        Ok(postcard) => postcard,
        Err(err) => return rejected(err),
    };

    match state.mailer().send_postcard(&postcard).await {
        Ok(()) => (
            StatusCode::OK,
            Json(PostcardSent {
                success: true,
                message: "Postcard sent successfully".to_string(),
                recipient: postcard.recipient_email.to_string(),
                sender: postcard.sender_name,
            }),
        )
            .into_response(),
        Err(e) => failed("Failed to send postcard", &e),
    }
}

/// Deliver a contact message.
///
/// POST /send-contact
#[instrument(skip_all)]
pub async fn send_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Response {
    let contact = match request.validate() {
        Ok(contact) => contact,
        Err(err) => return rejected(err),
    };

    match state.mailer().send_contact(&contact).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Message sent successfully" })),
        )
            .into_response(),
        Err(e) => failed("Failed to send message", &e),
    }
}

/// 400 with the wire-compatible error text.
fn rejected(err: ValidationError) -> Response {
    let error = match err {
        ValidationError::InvalidEmail => "Invalid email format".to_string(),
        ValidationError::MessageTooShort => err.to_string(),
        _ => "Missing required fields".to_string(),
    };
    tracing::debug!(reason = %err, "Hosted request rejected");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
}

/// 500 with details and a timestamp.
fn failed(error: &str, err: &MailerError) -> Response {
    let event_id = sentry::capture_error(err);
    tracing::error!(error = %err, sentry_event_id = %event_id, "Hosted delivery failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": error,
            "details": err.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}
