// Rendering: layout + PDF serialisation, plus the cancellable preview pipeline.
// Everything CPU-bound runs inside tokio::task::spawn_blocking.

pub mod handlers;
pub mod pdf;
pub mod preview;

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::layout::{layout_document, CancelToken, LayoutError, TemplateId};

pub use preview::{PreviewError, PreviewPipeline, PreviewRegistry, PreviewState};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render cancelled")]
    Cancelled,

    #[error("render timed out after {0:?}")]
    TimedOut(Duration),

    #[error("PDF serialisation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("render task failed: {0}")]
    Task(String),
}

impl From<LayoutError> for RenderError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Cancelled => RenderError::Cancelled,
        }
    }
}

/// Finished artifact: raw bytes, or bytes plus a suggested download filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    Blob(Vec<u8>),
    Download { filename: String, bytes: Vec<u8> },
}

impl RenderOutput {
    pub fn bytes(&self) -> &[u8] {
        match self {
            RenderOutput::Blob(bytes) | RenderOutput::Download { bytes, .. } => bytes,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            RenderOutput::Blob(_) => None,
            RenderOutput::Download { filename, .. } => Some(filename),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RenderOutput::Blob(bytes) | RenderOutput::Download { bytes, .. } => bytes,
        }
    }
}

/// Lays out and serialises `text`. Pure apart from the cancellation check.
pub fn render_pdf(text: &str, template: TemplateId, cancel: &CancelToken) -> Result<Vec<u8>, RenderError> {
    let style = template.style();
    let layout = layout_document(text, &style, cancel)?;
    pdf::write_pdf(&layout)
}

/// `<Base>[_<Label>]_<YYYY-MM-DDTHH-MM-SS>.pdf`
pub fn suggested_filename(base_name: &str, template: TemplateId, at: DateTime<Utc>) -> String {
    let base = match base_name.trim() {
        "" => "Resume",
        trimmed => trimmed,
    };
    let stamp = at.format("%Y-%m-%dT%H-%M-%S");
    match template.filename_label() {
        Some(label) => format!("{base}_{label}_{stamp}.pdf"),
        None => format!("{base}_{stamp}.pdf"),
    }
}

pub fn render_document(
    text: &str,
    template: TemplateId,
    as_blob: bool,
    base_name: &str,
    cancel: &CancelToken,
) -> Result<RenderOutput, RenderError> {
    let bytes = render_pdf(text, template, cancel)?;
    if as_blob {
        Ok(RenderOutput::Blob(bytes))
    } else {
        Ok(RenderOutput::Download {
            filename: suggested_filename(base_name, template, Utc::now()),
            bytes,
        })
    }
}

/// Runs `render_document` on the blocking pool, cancelling it if `limit` elapses.
pub async fn render_in_background(
    text: String,
    template: TemplateId,
    as_blob: bool,
    base_name: String,
    limit: Duration,
) -> Result<RenderOutput, RenderError> {
    let cancel = CancelToken::new();
    let worker = cancel.clone();
    let handle = tokio::task::spawn_blocking(move || {
        render_document(&text, template, as_blob, &base_name, &worker)
    });

    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(result)) => {
            if let Ok(output) = &result {
                info!(template = %template, bytes = output.bytes().len(), "Rendered PDF");
            }
            result
        }
        Ok(Err(join_err)) => Err(RenderError::Task(join_err.to_string())),
        Err(_) => {
            cancel.cancel();
            warn!(template = %template, "Render exceeded {limit:?}; cancelled");
            Err(RenderError::TimedOut(limit))
        }
    }
}
