//! Document-level types.

use super::{Block, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A converted PDF document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Information dictionary and header facts
    pub metadata: Metadata,

    /// Pages that were selected for conversion, in order
    pub pages: Vec<Page>,

    /// Bookmarks, when the PDF carries an outline
    pub outline: Option<Outline>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of converted pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a converted page by its PDF page number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == page_num)
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Page::is_empty)
    }

    /// Number of tables recognized across all pages.
    pub fn table_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.elements)
            .filter(|b| matches!(b, Block::Table(_)))
            .count()
    }

    /// Text of every page, pages separated by a blank line.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(Page::plain_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Name the document was submitted under (usually the file name)
    pub source: Option<String>,

    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,

    /// Application that authored the original content
    pub creator: Option<String>,

    /// Application that wrote the PDF
    pub producer: Option<String>,

    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages in the file, selected or not
    pub page_count: u32,

    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// Render as a YAML frontmatter block, terminated by a newline.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        let text_fields = [
            ("source", &self.source),
            ("title", &self.title),
            ("author", &self.author),
            ("subject", &self.subject),
            ("keywords", &self.keywords),
            ("creator", &self.creator),
            ("producer", &self.producer),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                lines.push(format!("{}: \"{}\"", key, escape_yaml(value)));
            }
        }
        if let Some(created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }

        lines.push(format!("pdf_version: \"{}\"", self.pdf_version));
        lines.push(format!("pages: {}", self.page_count));
        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Document outline (bookmarks).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    pub items: Vec<OutlineItem>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: OutlineItem) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count of items at every nesting level.
    pub fn total_items(&self) -> usize {
        fn count(items: &[OutlineItem]) -> usize {
            items.iter().map(|item| 1 + count(&item.children)).sum()
        }
        count(&self.items)
    }
}

/// A single bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineItem {
    pub title: String,

    /// Target page number (1-indexed), when it could be resolved
    pub page: Option<u32>,

    /// Nesting level (0 = top level)
    pub level: u8,

    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    pub fn new(title: impl Into<String>, page: Option<u32>, level: u8) -> Self {
        Self {
            title: title.into(),
            page,
            level,
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: OutlineItem) {
        self.children.push(child);
    }
}
