//! Markdown export of the document model.

mod cleanup;
mod markdown;
mod options;
mod result;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::{PageSelection, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
