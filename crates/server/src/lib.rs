//! RetroPost server library.
//!
//! Image compositor, delivery dispatcher and the HTTP API, exposed as a
//! library so the CLI and the integration tests can drive them directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod compositor;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
        .with_state(state)
}
