//! Page-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A single converted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number in the source PDF (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Content blocks in reading order, top to bottom
    pub elements: Vec<Block>,
}

impl Page {
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// US Letter (8.5 x 11 inches), the fallback when MediaBox is missing.
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    pub fn add_block(&mut self, block: Block) {
        self.elements.push(block);
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.elements.push(Block::Paragraph(paragraph));
    }

    pub fn add_table(&mut self, table: Table) {
        self.elements.push(Block::Table(table));
    }

    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => p.plain_text(),
                Block::Table(t) => t.plain_text(),
            })
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(Block::is_empty)
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// A content block on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Heading, body text or list item
    Paragraph(Paragraph),

    /// A recognized table
    Table(Table),
}

impl Block {
    pub fn is_empty(&self) -> bool {
        match self {
            Block::Paragraph(p) => p.is_empty(),
            Block::Table(t) => t.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_empty_blocks() {
        let mut page = Page::letter(1);
        assert!(page.is_empty());
        page.add_paragraph(Paragraph::with_text("   "));
        assert!(page.is_empty());
        page.add_paragraph(Paragraph::with_text("text"));
        assert!(!page.is_empty());
        assert!(!page.is_landscape());
    }

    #[test]
    fn test_block_serializes_with_tag() {
        let block = Block::Paragraph(Paragraph::with_text("hi"));
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"paragraph\""));
    }
}
