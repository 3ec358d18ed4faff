pub mod health;
pub mod resumes;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers as render;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

/// `Content-Disposition` value for a download. Quotes and control characters are dropped
/// so a caller-supplied name cannot break the header.
pub fn attachment_disposition(filename: &str) -> String {
    let name: String = filename
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{name}\"")
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stored resumes
        .route("/resumes", get(resumes::handle_list_resumes))
        .route("/download/:filename", get(resumes::handle_download))
        .route("/debug", get(resumes::handle_debug))
        // Tailoring API
        .route("/api/v1/tailor", post(tailoring::handle_tailor))
        // Render API
        .route("/api/v1/render", post(render::handle_render))
        .route(
            "/api/v1/preview/:session",
            post(render::handle_preview_generate)
                .get(render::handle_preview_get)
                .delete(render::handle_preview_delete),
        )
        .with_state(state)
}
