//! Template catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use retropost_core::Template;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Catalog listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// Category, or `sve` for all.
    pub category: Option<String>,
    /// Case-insensitive match on name and description.
    pub search: Option<String>,
}

/// List templates.
///
/// GET /api/templates?category=&search=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Json<Vec<Template>> {
    let templates = state
        .catalog()
        .filter(query.category.as_deref(), query.search.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Json(templates)
}

/// Show a single template.
///
/// GET /api/templates/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Template>> {
    state
        .catalog()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("template {id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::routes::testing::{app, json_body};

    async fn get(uri: &str) -> axum::http::Response<Body> {
        app(Vec::new(), "http://127.0.0.1:9")
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_all() {
        let response = get("/api/templates").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_list_filtered() {
        let body = json_body(get("/api/templates?category=grad").await).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let body = json_body(get("/api/templates?category=sve&search=jezero").await).await;
        assert_eq!(body[0]["id"], "6");
    }

    #[tokio::test]
    async fn test_show() {
        let response = get("/api/templates/4").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["category"], "romantika");

        assert_eq!(get("/api/templates/99").await.status(), StatusCode::NOT_FOUND);
    }
}
