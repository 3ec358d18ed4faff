//! Axum route handlers for the Render and Preview APIs.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::TemplateId;
use crate::render::{render_in_background, PreviewState};
use crate::routes::attachment_disposition;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default, alias = "asBlob")]
    pub as_blob: Option<bool>,
    #[serde(default, alias = "baseName")]
    pub base_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub text: String,
    #[serde(default)]
    pub template: Option<String>,
}

/// Missing or blank selects the default template; anything else must be known.
fn parse_template(raw: Option<&str>) -> Result<TemplateId, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(TemplateId::default()),
        Some(id) => Ok(id.parse()?),
    }
}

fn pdf_response(bytes: Vec<u8>, filename: Option<&str>) -> Response {
    match filename {
        Some(name) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, attachment_disposition(name)),
            ],
            bytes,
        )
            .into_response(),
        None => ([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/render
///
/// Renders text to PDF with the chosen template. `as_blob=false` adds a suggested
/// download filename.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let template = parse_template(request.template.as_deref())?;
    let output = render_in_background(
        request.text,
        template,
        request.as_blob.unwrap_or(true),
        request.base_name.unwrap_or_default(),
        state.config.preview_timeout,
    )
    .await?;

    let filename = output.filename().map(str::to_string);
    Ok(pdf_response(output.into_bytes(), filename.as_deref()))
}

/// POST /api/v1/preview/:session
///
/// Starts a new generation for the session, superseding any in-flight one, and waits
/// for it. The loser of a race gets 409.
pub async fn handle_preview_generate(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(request): Json<PreviewRequest>,
) -> Result<Response, AppError> {
    let template = parse_template(request.template.as_deref())?;
    let pipeline = state.previews.session(session).await;
    let pdf = pipeline.generate(request.text, template).await?;
    info!("Preview {session} ready ({} bytes)", pdf.len());
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response())
}

/// GET /api/v1/preview/:session
///
/// Returns the committed PDF, or the session state as JSON while there is none.
pub async fn handle_preview_get(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<Response, AppError> {
    let pipeline = state
        .previews
        .get(session)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Preview session {session} not found")))?;

    Ok(match pipeline.state().await {
        PreviewState::Ready { pdf, .. } => {
            ([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response()
        }
        other => Json(other.status()).into_response(),
    })
}

/// DELETE /api/v1/preview/:session
///
/// Aborts any in-flight generation and releases the held PDF.
pub async fn handle_preview_delete(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.previews.remove(session).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Preview session {session} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template_defaults_and_rejects() {
        assert_eq!(parse_template(None).unwrap(), TemplateId::Professional);
        assert_eq!(parse_template(Some(" ")).unwrap(), TemplateId::Professional);
        assert_eq!(parse_template(Some("classic")).unwrap(), TemplateId::Classic);
        assert!(matches!(
            parse_template(Some("fancy")),
            Err(AppError::Validation(msg)) if msg == "Template \"fancy\" not found"
        ));
    }
}
