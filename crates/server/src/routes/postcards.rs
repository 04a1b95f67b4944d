//! Postcard render and send route handlers.

use axum::{Json, extract::State};
use retropost_core::messages::Message;
use retropost_core::{Customization, Language, Template};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::Catalog;
use crate::compositor::RenderedPair;
use crate::dispatch::{DispatchError, PostcardRequest, Receipt};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Prefix an uploaded photo must carry.
const UPLOAD_PREFIX: &str = "data:image/";

/// A template (by id, or an uploaded photo) plus its personalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostcardBody {
    pub template_id: Option<String>,
    /// Uploaded photo as a `data:` URL, used instead of a catalog template.
    pub image: Option<String>,
    pub customization: Customization,
    pub language: Option<Language>,
}

impl PostcardBody {
    fn template(&self, catalog: &Catalog) -> Result<Template> {
        if let Some(image) = self.image.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
            if !image.starts_with(UPLOAD_PREFIX) {
                return Err(AppError::BadRequest(
                    "image must be an uploaded data:image/ URL".to_string(),
                ));
            }
            return Ok(Catalog::custom(image));
        }
        let id = self
            .template_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("templateId or image is required".to_string()))?;
        catalog
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("template {id}")))
    }
}

/// Response for a sent postcard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub receipt: Receipt,
    #[serde(flatten)]
    pub images: RenderedPair,
}

/// Render both faces.
///
/// POST /api/postcards/render
#[instrument(skip_all, fields(template_id = body.template_id.as_deref()))]
pub async fn render(
    State(state): State<AppState>,
    Json(body): Json<PostcardBody>,
) -> Result<Json<RenderedPair>> {
    let template = body.template(state.catalog())?;
    let language = body.language.unwrap_or(state.config().language);

    let pair = state
        .compositor()
        .render(&template, &body.customization, language)
        .await;

    add_breadcrumb(
        "postcard",
        "Rendered postcard",
        Some(&[("template_id", template.id.as_str())]),
    );
    Ok(Json(pair))
}

/// Check the addressing, render both faces, then deliver them through the
/// transport chain.
///
/// POST /api/postcards/send
#[instrument(skip_all, fields(template_id = body.template_id.as_deref()))]
pub async fn send(
    State(state): State<AppState>,
    Json(body): Json<PostcardBody>,
) -> Result<Json<SendResponse>> {
    let template = body.template(state.catalog())?;
    let language = body.language.unwrap_or(state.config().language);
    let customization = &body.customization;

    PostcardRequest::addressed(customization)
        .check_addressing()
        .map_err(|e| DispatchError::invalid(e, language))?;

    let images = state
        .compositor()
        .render(&template, customization, language)
        .await;

    let request = PostcardRequest::for_rendered(customization, &images);
    let receipt = state.dispatcher().send_postcard(request, language).await?;

    add_breadcrumb(
        "postcard",
        "Sent postcard",
        Some(&[("transport", receipt.transport)]),
    );
    Ok(Json(SendResponse {
        success: true,
        message: Message::PostcardSent.text(language).to_string(),
        receipt,
        images,
    }))
}
