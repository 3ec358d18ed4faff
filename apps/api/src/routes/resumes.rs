//! Handlers over the stored resume set: listing, raw download, and a bucket report.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::routes::attachment_disposition;
use crate::state::AppState;
use crate::storage::{ResumeKind, StoredObject};

#[derive(Debug, Serialize)]
pub struct ResumeEntry {
    pub filename: String,
    pub size: i64,
    pub uploaded: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: ResumeKind,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub success: bool,
    pub count: usize,
    pub resumes: Vec<ResumeEntry>,
}

#[derive(Debug, Serialize)]
pub struct DebugFile {
    pub key: String,
    pub size: i64,
    pub uploaded: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: ResumeKind,
}

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub bucket_binding_exists: bool,
    pub bucket: String,
    pub total_objects: usize,
    pub txt_files: usize,
    pub pdf_files: usize,
    pub files: Vec<DebugFile>,
    pub truncated: bool,
}

/// GET /resumes
///
/// Lists every `.txt` and `.pdf` object in the bucket.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let listing = state.store.list().await?;
    let resumes: Vec<ResumeEntry> = listing
        .objects
        .into_iter()
        .filter_map(|StoredObject { key, size, uploaded }| match ResumeKind::of(&key) {
            ResumeKind::Other => None,
            kind => Some(ResumeEntry {
                filename: key,
                size,
                uploaded,
                kind,
            }),
        })
        .collect();

    Ok(Json(ResumeListResponse {
        success: true,
        count: resumes.len(),
        resumes,
    }))
}

/// GET /download/:filename
///
/// Streams the original file back as an attachment.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.store.get(&filename).await?;
    let content_type = if filename.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/plain; charset=utf-8"
    };
    let disposition = attachment_disposition(&filename);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /debug
///
/// Reports what the bucket holds, for diagnosing empty listings.
pub async fn handle_debug(State(state): State<AppState>) -> Result<Json<DebugResponse>, AppError> {
    let listing = state.store.list().await?;
    let count = |kind: ResumeKind| {
        listing
            .objects
            .iter()
            .filter(|o| ResumeKind::of(&o.key) == kind)
            .count()
    };
    let txt_files = count(ResumeKind::Txt);
    let pdf_files = count(ResumeKind::Pdf);

    let files = listing
        .objects
        .iter()
        .map(|o| DebugFile {
            key: o.key.clone(),
            size: o.size,
            uploaded: o.uploaded,
            kind: ResumeKind::of(&o.key),
        })
        .collect();

    Ok(Json(DebugResponse {
        bucket_binding_exists: true,
        bucket: state.store.bucket().to_string(),
        total_objects: listing.objects.len(),
        txt_files,
        pdf_files,
        files,
        truncated: listing.truncated,
    }))
}
