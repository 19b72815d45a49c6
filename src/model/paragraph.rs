//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// A block of flowing text: body paragraph, heading or list item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Styled text runs, concatenated in order
    pub content: Vec<TextRun>,

    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with one unstyled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(TextRun::new(text));
        p
    }

    /// Create a heading; the level is clamped to 1..=6.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut p = Self::with_text(text);
        p.style.heading_level = Some(level.clamp(1, 6));
        p
    }

    /// Create a list item.
    pub fn list_item(text: impl Into<String>, info: ListInfo) -> Self {
        let mut p = Self::with_text(text);
        p.style.list_info = Some(info);
        p
    }

    pub fn add_run(&mut self, run: TextRun) {
        if !run.is_empty() {
            self.content.push(run);
        }
    }

    pub fn plain_text(&self) -> String {
        self.content.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|run| run.text.trim().is_empty())
    }

    pub fn is_heading(&self) -> bool {
        self.style.heading_level.is_some()
    }

    pub fn heading_level(&self) -> Option<u8> {
        self.style.heading_level
    }

    pub fn is_list_item(&self) -> bool {
        self.style.list_info.is_some()
    }

    /// Word count over all runs.
    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }
}

/// Block-level styling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Heading level (1-6)
    pub heading_level: Option<u8>,

    /// Set for list items
    pub list_info: Option<ListInfo>,
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    pub style: ListStyle,

    /// Marker number for ordered items
    pub number: Option<u32>,
}

impl ListInfo {
    pub fn bullet() -> Self {
        Self {
            style: ListStyle::Bullet,
            number: None,
        }
    }

    pub fn numbered(number: u32) -> Self {
        Self {
            style: ListStyle::Numbered,
            number: Some(number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListStyle {
    Bullet,
    Numbered,
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                bold: true,
                ..Default::default()
            },
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                italic: true,
                ..Default::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Inline styling taken from the font of the source spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,

    /// Font size in points
    pub font_size: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(Paragraph::heading("Title", 0).heading_level(), Some(1));
        assert_eq!(Paragraph::heading("Deep", 9).heading_level(), Some(6));
    }

    #[test]
    fn test_runs_concatenate() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::bold("Total:"));
        p.add_run(TextRun::new(" 42 items"));
        p.add_run(TextRun::new(""));
        assert_eq!(p.content.len(), 2);
        assert_eq!(p.plain_text(), "Total: 42 items");
        assert_eq!(p.word_count(), 3);
    }

    #[test]
    fn test_list_item() {
        let p = Paragraph::list_item("Second", ListInfo::numbered(2));
        assert!(p.is_list_item());
        assert!(!p.is_heading());
        assert_eq!(p.style.list_info.and_then(|i| i.number), Some(2));
    }
}
