//! Axum route handlers for the Tailoring API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::service::{tailor_resume, TailorRequest, TailorResponse};

/// POST /api/v1/tailor
///
/// Sends the job description and the stored `.txt` resumes (or the selected one) to
/// the model and returns the tailored resume plus a cover letter.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let response = tailor_resume(state.store.as_ref(), state.llm.as_ref(), request).await?;
    Ok(Json(response))
}
