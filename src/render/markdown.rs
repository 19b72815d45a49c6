//! Markdown rendering.

use crate::error::Result;
use crate::model::{Block, Document, ListInfo, ListStyle, Page, Paragraph, Table, TextRun};

use super::{CleanupPipeline, ExtractionStats, RenderOptions, RenderResult};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    MarkdownRenderer::new(options.clone()).render_with_stats(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
    /// The last block written was a list item
    in_list: bool,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
            in_list: false,
        }
    }

    pub fn render(mut self, doc: &Document) -> Result<String> {
        Ok(self.render_internal(doc))
    }

    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(doc);
        self.stats.count_text(&content);
        Ok(RenderResult::new(content, doc.metadata.clone(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> String {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
            output.push('\n');
        }

        for page in &doc.pages {
            if self.options.page_selection.includes(page.number) {
                self.render_page(&mut output, page);
            }
        }

        if let Some(cleanup) = &self.options.cleanup {
            output = CleanupPipeline::new(cleanup.clone()).process(&output);
        }

        output.trim().to_string()
    }

    fn render_page(&mut self, output: &mut String, page: &Page) {
        if self.options.collect_stats {
            self.stats.add_page();
        }
        for block in &page.elements {
            if block.is_empty() {
                continue;
            }
            match block {
                Block::Paragraph(p) => self.render_paragraph(output, p),
                Block::Table(t) => {
                    self.end_list(output);
                    if self.options.collect_stats {
                        self.stats.add_table();
                    }
                    self.render_table(output, t);
                }
            }
        }
    }

    /// A list needs a blank line before whatever follows it.
    fn end_list(&mut self, output: &mut String) {
        if self.in_list {
            output.push('\n');
            self.in_list = false;
        }
    }

    fn render_paragraph(&mut self, output: &mut String, para: &Paragraph) {
        if let Some(info) = &para.style.list_info {
            if self.options.collect_stats {
                self.stats.add_list_item();
            }
            self.render_list_item(output, para, info);
            self.in_list = true;
            return;
        }
        self.end_list(output);

        if let Some(level) = para.heading_level() {
            if self.options.collect_stats {
                self.stats.add_heading();
            }
            let level = level.clamp(1, self.options.max_heading_level.max(1));
            output.push_str(&"#".repeat(level as usize));
            output.push(' ');
            output.push_str(&self.escape(para.plain_text().trim()));
            output.push_str("\n\n");
            return;
        }

        if self.options.collect_stats {
            self.stats.add_paragraph();
        }
        self.render_runs(output, &para.content);
        output.push_str("\n\n");
    }

    fn render_list_item(&self, output: &mut String, para: &Paragraph, info: &ListInfo) {
        match info.style {
            ListStyle::Bullet => output.push(self.options.list_marker),
            ListStyle::Numbered => {
                output.push_str(&info.number.unwrap_or(1).to_string());
                output.push('.');
            }
        }
        output.push(' ');
        self.render_runs(output, &para.content);
        output.push('\n');
    }

    fn render_runs(&self, output: &mut String, runs: &[TextRun]) {
        let start = output.len();
        for run in runs {
            self.render_text_run(output, run);
        }
        // Runs carry their own separating spaces; only the ends are trimmed.
        let rendered = output[start..].trim().to_string();
        output.truncate(start);
        output.push_str(&rendered);
    }

    /// Emphasis markers hug the text; surrounding spaces stay outside.
    fn render_text_run(&self, output: &mut String, run: &TextRun) {
        let core = run.text.trim();
        if core.is_empty() {
            output.push_str(&run.text);
            return;
        }
        let leading = &run.text[..run.text.len() - run.text.trim_start().len()];
        let trailing = &run.text[run.text.trim_end().len()..];

        let marker = match (run.style.bold, run.style.italic) {
            (true, true) => "***",
            (true, false) => "**",
            (false, true) => "*",
            (false, false) => "",
        };

        output.push_str(leading);
        output.push_str(marker);
        output.push_str(&self.escape(core));
        output.push_str(marker);
        output.push_str(trailing);
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        let cols = table.column_count();
        if cols == 0 {
            return;
        }

        let cell_text = |row: usize, col: usize| -> String {
            table.rows[row]
                .cells
                .get(col)
                .map(|c| self.escape_cell(&c.text))
                .unwrap_or_default()
        };

        // Markdown allows one header line; stacked header rows are joined
        // per column.
        let header_rows = (table.header_rows as usize).clamp(1, table.rows.len());
        let header: Vec<String> = (0..cols)
            .map(|col| {
                (0..header_rows)
                    .map(|row| cell_text(row, col))
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        push_table_row(output, &header);

        let separator: Vec<String> = (0..cols)
            .map(|col| table.column_alignment(col).separator().to_string())
            .collect();
        push_table_row(output, &separator);

        for row in header_rows..table.rows.len() {
            let cells: Vec<String> = (0..cols).map(|col| cell_text(row, col)).collect();
            push_table_row(output, &cells);
        }

        output.push('\n');
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }

    /// Cell text on one line; `|` is always escaped so the row survives.
    fn escape_cell(&self, text: &str) -> String {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.options.escape_special_chars {
            escape_markdown(&flat)
        } else {
            flat.replace('|', "\\|")
        }
    }
}

fn push_table_row(output: &mut String, cells: &[String]) {
    output.push('|');
    for cell in cells {
        output.push(' ');
        output.push_str(cell);
        output.push_str(" |");
    }
    output.push('\n');
}

/// Escape characters that could be read as Markdown syntax mid-line.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '|') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, TableCell, TableRow};
    use crate::render::{CleanupPreset, PageSelection};

    fn doc_with(blocks: Vec<Block>) -> Document {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        for block in blocks {
            page.add_block(block);
        }
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("a_b|c"), "a\\_b\\|c");
        assert_eq!(escape_markdown("1. #tag!"), "1. #tag!");
    }

    #[test]
    fn test_render_paragraphs_and_heading() {
        let doc = doc_with(vec![
            Block::Paragraph(Paragraph::heading("Chapter 1", 1)),
            Block::Paragraph(Paragraph::with_text("Hello, world!")),
            Block::Paragraph(Paragraph::with_text("Second.")),
        ]);
        let md = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(md, "# Chapter 1\n\nHello, world!\n\nSecond.");
    }

    #[test]
    fn test_heading_level_clamped() {
        let doc = doc_with(vec![Block::Paragraph(Paragraph::heading("Deep", 5))]);
        let md = to_markdown(&doc, &RenderOptions::new().with_max_heading(2)).unwrap();
        assert_eq!(md, "## Deep");
    }

    #[test]
    fn test_render_lists() {
        let doc = doc_with(vec![
            Block::Paragraph(Paragraph::list_item("apples", ListInfo::bullet())),
            Block::Paragraph(Paragraph::list_item("pears", ListInfo::bullet())),
            Block::Paragraph(Paragraph::with_text("Then:")),
            Block::Paragraph(Paragraph::list_item("wash", ListInfo::numbered(1))),
            Block::Paragraph(Paragraph::list_item("eat", ListInfo::numbered(2))),
        ]);
        let md = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(md, "- apples\n- pears\n\nThen:\n\n1. wash\n2. eat");

        let md = to_markdown(&doc, &RenderOptions::new().with_list_marker('*')).unwrap();
        assert!(md.starts_with("* apples\n* pears"));
    }

    #[test]
    fn test_styled_runs() {
        let mut para = Paragraph::new();
        para.add_run(TextRun::bold("Note:"));
        para.add_run(TextRun::new(" read "));
        para.add_run(TextRun::italic("carefully"));
        let doc = doc_with(vec![Block::Paragraph(para)]);
        let md = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(md, "**Note:** read *carefully*");
    }

    #[test]
    fn test_render_table() {
        let mut table = Table::with_header(1);
        table.add_row(TableRow::header(vec![
            TableCell::text("Item"),
            TableCell::text("Price"),
        ]));
        table.add_row(TableRow::new(vec![
            TableCell::text("Pen|cil"),
            TableCell::text("1.20").with_alignment(Alignment::Right),
        ]));
        table.add_row(TableRow::new(vec![TableCell::text("Eraser")]));

        let doc = doc_with(vec![Block::Table(table)]);
        let md = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(
            md,
            "| Item | Price |\n| --- | ---: |\n| Pen\\|cil | 1.20 |\n| Eraser |  |"
        );
    }

    #[test]
    fn test_stacked_header_rows() {
        let mut table = Table::with_header(2);
        table.add_row(TableRow::from_strings(["Region", "Sales"]));
        table.add_row(TableRow::from_strings(["", "2023"]));
        table.add_row(TableRow::from_strings(["North", "10"]));
        let doc = doc_with(vec![Block::Table(table)]);
        let md = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(md, "| Region | Sales 2023 |\n| --- | --- |\n| North | 10 |");
    }

    #[test]
    fn test_frontmatter_and_page_selection() {
        let mut doc = Document::new();
        doc.metadata.title = Some("Test Doc".to_string());
        for n in 1..=3 {
            let mut page = Page::letter(n);
            page.add_paragraph(Paragraph::with_text(format!("Page {n}")));
            doc.add_page(page);
        }

        let options = RenderOptions::new()
            .with_frontmatter(true)
            .with_pages(PageSelection::Pages(vec![2..=2]));
        let md = to_markdown(&doc, &options).unwrap();
        assert!(md.starts_with("---\ntitle: \"Test Doc\""));
        assert!(md.ends_with("---\n\nPage 2"));
        assert!(!md.contains("Page 1"));
    }

    #[test]
    fn test_stats() {
        let doc = doc_with(vec![
            Block::Paragraph(Paragraph::heading("Title", 1)),
            Block::Paragraph(Paragraph::with_text("Body text here.")),
            Block::Paragraph(Paragraph::list_item("one", ListInfo::bullet())),
            Block::Table(Table::with_header(0)),
        ]);
        let result = to_markdown_with_stats(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(result.stats.page_count, 1);
        assert_eq!(result.stats.heading_count, 1);
        assert_eq!(result.stats.paragraph_count, 1);
        assert_eq!(result.stats.list_item_count, 1);
        // Empty tables are skipped.
        assert_eq!(result.stats.table_count, 0);
        assert_eq!(result.stats.word_count, 7);
    }

    #[test]
    fn test_cleanup_applied() {
        let doc = doc_with(vec![Block::Paragraph(Paragraph::with_text("ﬁne   print"))]);
        let options = RenderOptions::new().with_cleanup_preset(CleanupPreset::Standard);
        assert_eq!(to_markdown(&doc, &options).unwrap(), "fine print");
    }
}
