// Layout engine: line classification, greedy wrap, pagination and the two-column
// section router. Pure and CPU-bound; async callers run it inside spawn_blocking.

pub mod cancel;
pub mod classify;
pub mod document;
pub mod flow;
pub mod font_metrics;
pub mod sections;
pub mod template;
pub mod wrap;

// Re-export the public API consumed by the renderer and handlers.
pub use cancel::{CancelToken, LayoutError};
pub use document::{layout_document, Layout};
pub use flow::{Column, DrawOp, TextRun};
pub use template::{TemplateId, UnknownTemplate};
