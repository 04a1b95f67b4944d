//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Health check
//!
//! # API (JSON)
//! GET  /api/templates            - Catalog listing (?category=&search=)
//! GET  /api/templates/{id}       - Single template
//! POST /api/postcards/render     - Render front and back faces
//! POST /api/postcards/send       - Render, then deliver through the chain
//! POST /api/contact              - Deliver a contact message
//!
//! # Hosted postcard function (CORS: *)
//! POST /send-postcard            - Deliver a postcard (SMTP or relay)
//! POST /send-contact             - Deliver a contact message
//! ```

pub mod contact;
pub mod hosted;
pub mod postcards;
pub mod templates;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/templates", get(templates::index))
        .route("/templates/{id}", get(templates::show))
        .route("/postcards/render", post(postcards::render))
        .route("/postcards/send", post(postcards::send))
        .route("/contact", post(contact::submit))
        .layer(cors)
}

/// Create the hosted function router.
pub fn hosted_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/send-postcard",
            post(hosted::send_postcard).options(hosted::preflight),
        )
        .route(
            "/send-contact",
            post(hosted::send_contact).options(hosted::preflight),
        )
        .layer(middleware::from_fn(hosted::cors_headers))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .merge(hosted_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
