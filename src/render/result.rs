//! Rendering result with metadata and statistics.

use serde::{Deserialize, Serialize};

use crate::model::Metadata;

/// Rendered Markdown together with what went into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    pub content: String,

    /// Metadata of the source document
    pub metadata: Metadata,

    pub stats: ExtractionStats,
}

impl RenderResult {
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// True when nothing but whitespace was rendered.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Counts collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Rendered pages
    pub page_count: u32,
    pub heading_count: u32,
    pub paragraph_count: u32,
    pub list_item_count: u32,
    pub table_count: u32,
    /// Whitespace-separated tokens in the output
    pub word_count: u32,
    /// Non-whitespace characters in the output
    pub char_count: u32,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    pub fn add_list_item(&mut self) {
        self.list_item_count += 1;
    }

    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}
