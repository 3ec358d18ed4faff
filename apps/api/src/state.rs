use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::render::PreviewRegistry;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Bucket holding the fixed resume set (`.txt` for tailoring, `.pdf` for download).
    pub store: Arc<dyn ResumeStore>,
    pub llm: Arc<dyn CompletionClient>,
    pub config: Config,
    /// Preview sessions keyed by client-chosen UUID.
    pub previews: PreviewRegistry,
}
