//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{Document, ListInfo, Page, Paragraph, Table, TextRun};

use super::backend::{LopdfBackend, PdfBackend};
use super::extract::SpanExtractor;
use super::layout::{BlockType, FontStatistics, LayoutAnalyzer, TextBlock, TextSpan};
use super::markers::parse_list_marker;
use super::metadata::{extract_metadata, extract_outline};
use super::options::{ErrorMode, ParseOptions};
use super::table_detector::TableDetector;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// PDF document parser.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
}

/// Spans of one page, before layout analysis.
struct PageSpans {
    number: u32,
    width: f32,
    height: f32,
    spans: Vec<TextSpan>,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        Self::with_backend(LopdfBackend::load_file(path)?, options)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        Self::with_backend(LopdfBackend::load_bytes(data)?, options)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(
        mut reader: R,
        options: ParseOptions,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions) -> Result<Self> {
        if backend.is_encrypted() {
            log::warn!("Document is encrypted; text may be unreadable");
        }
        Ok(Self { backend, options })
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the document into the model.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = extract_metadata(self.backend.raw_doc());
        document.outline = extract_outline(self.backend.raw_doc());

        let all_pages = self.backend.pages();
        let total = all_pages.len() as u32;
        let selected: Vec<_> = all_pages
            .into_iter()
            .filter(|(num, _)| self.options.pages.includes(*num))
            .collect();

        if selected.is_empty() && total > 0 {
            if let Some(first) = self.options.pages.first_page() {
                return Err(Error::PageOutOfRange(first, total));
            }
        }

        let extractor = SpanExtractor::new(&self.backend);
        let mut extracted = Vec::with_capacity(selected.len());
        for (number, page_id) in selected {
            let (width, height) = self.backend.page_size(page_id).unwrap_or(DEFAULT_PAGE_SIZE);
            let spans = match extractor.extract_page(page_id) {
                Ok(spans) => spans,
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", number, e);
                    Vec::new()
                }
                Err(e) => return Err(Error::TextExtract(format!("Page {}: {}", number, e))),
            };
            log::debug!("Page {}: {} spans", number, spans.len());
            extracted.push(PageSpans {
                number,
                width,
                height,
                spans,
            });
        }

        // Heading sizes are ranked across the whole selection so that a page
        // of body text does not promote its own largest size.
        let stats = FontStatistics::from_spans(extracted.iter().flat_map(|p| p.spans.iter()));
        let detector = self
            .options
            .table_structure
            .then(|| TableDetector::for_mode(self.options.table_mode));
        let analyze = |page: PageSpans| analyze_page(page, &stats, detector.as_ref());

        document.pages = if self.options.parallel && extracted.len() > 1 {
            extracted.into_par_iter().map(analyze).collect()
        } else {
            extracted.into_iter().map(analyze).collect()
        };

        log::info!(
            "Parsed {} of {} pages, {} tables",
            document.pages.len(),
            total,
            document.table_count()
        );

        Ok(document)
    }

    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    pub fn version(&self) -> String {
        self.backend.version()
    }
}

/// Tables and text blocks of one page in reading order.
fn analyze_page(
    page: PageSpans,
    stats: &FontStatistics,
    detector: Option<&TableDetector>,
) -> Page {
    let PageSpans {
        number,
        width,
        height,
        spans,
    } = page;

    let (mut tables, rest): (Vec<(f32, Table)>, _) = match detector {
        Some(detector) => {
            let (found, rest) = detector.detect(spans);
            let tables = found
                .iter()
                .map(|t| (t.top_y, detector.to_table_model(t)))
                .collect();
            (tables, rest)
        }
        None => (Vec::new(), spans),
    };
    tables.sort_by(|a, b| b.0.total_cmp(&a.0));

    let blocks = LayoutAnalyzer::new(stats).analyze(rest);
    log::debug!(
        "Page {}: {} blocks, {} tables",
        number,
        blocks.len(),
        tables.len()
    );

    // Tables slot in before the first block that starts below them; the
    // block order itself already follows the columns.
    let mut page_out = Page::new(number, width, height);
    let mut pending = tables.into_iter().peekable();
    for block in blocks.into_iter().filter(|b| !b.is_empty()) {
        while let Some((_, table)) = pending.next_if(|(top, _)| *top > block.top_y()) {
            page_out.add_table(table);
        }
        page_out.add_paragraph(block_to_paragraph(&block));
    }
    for (_, table) in pending {
        page_out.add_table(table);
    }

    page_out
}

fn block_to_paragraph(block: &TextBlock) -> Paragraph {
    match block.block_type {
        BlockType::Heading => Paragraph::heading(block.text(), block.heading_level),
        BlockType::ListItem => {
            let text = block.text();
            match parse_list_marker(&text) {
                Some((info, rest)) => Paragraph::list_item(rest, info),
                None => Paragraph::list_item(text.clone(), ListInfo::bullet()),
            }
        }
        BlockType::Paragraph => styled_paragraph(block),
    }
}

/// One run per stretch of lines sharing bold/italic, separated by spaces.
fn styled_paragraph(block: &TextBlock) -> Paragraph {
    let mut runs: Vec<TextRun> = Vec::new();
    for line in &block.lines {
        let text = line.text();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let (bold, italic) = (line.is_bold(), line.is_italic());
        match runs.last_mut() {
            Some(run) if run.style.bold == bold && run.style.italic == italic => {
                run.text.push(' ');
                run.text.push_str(text);
            }
            Some(_) => {
                let mut run = TextRun::new(format!(" {}", text));
                run.style.bold = bold;
                run.style.italic = italic;
                runs.push(run);
            }
            None => {
                let mut run = TextRun::new(text);
                run.style.bold = bold;
                run.style.italic = italic;
                runs.push(run);
            }
        }
    }

    let mut paragraph = Paragraph::new();
    for run in runs {
        paragraph.add_run(run);
    }
    paragraph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;
    use crate::parser::layout::TextLine;

    fn span(text: &str, x: f32, y: f32, size: f32, font: &str) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size, font.to_string())
    }

    fn page_of(spans: Vec<TextSpan>) -> PageSpans {
        PageSpans {
            number: 1,
            width: 612.0,
            height: 792.0,
            spans,
        }
    }

    #[test]
    fn test_table_between_paragraphs() {
        let spans = vec![
            span("Results", 72.0, 720.0, 18.0, "Helvetica-Bold"),
            span("The figures are below.", 72.0, 690.0, 10.0, "Helvetica"),
            span("Name", 72.0, 650.0, 10.0, "Helvetica"),
            span("Score", 200.0, 650.0, 10.0, "Helvetica"),
            span("Ann", 72.0, 635.0, 10.0, "Helvetica"),
            span("91", 200.0, 635.0, 10.0, "Helvetica"),
            span("Ben", 72.0, 620.0, 10.0, "Helvetica"),
            span("78", 200.0, 620.0, 10.0, "Helvetica"),
            span("That is all.", 72.0, 500.0, 10.0, "Helvetica"),
        ];
        let stats = FontStatistics::from_spans(&spans);
        let detector = TableDetector::new();
        let page = analyze_page(page_of(spans), &stats, Some(&detector));

        let kinds: Vec<&str> = page
            .elements
            .iter()
            .map(|b| match b {
                Block::Paragraph(p) if p.is_heading() => "heading",
                Block::Paragraph(_) => "paragraph",
                Block::Table(_) => "table",
            })
            .collect();
        assert_eq!(kinds, vec!["heading", "paragraph", "table", "paragraph"]);
    }

    #[test]
    fn test_two_columns_keep_reading_order() {
        let mut spans = Vec::new();
        for i in 0..6 {
            let step = i as f32 * 14.0;
            spans.push(span("left column words here", 50.0, 650.0 - step, 10.0, "Helvetica"));
            spans.push(span("right column words here", 330.0, 700.0 - step, 10.0, "Helvetica"));
        }
        let stats = FontStatistics::from_spans(&spans);
        let page = analyze_page(page_of(spans), &stats, None);

        let texts: Vec<String> = page
            .elements
            .iter()
            .map(|b| match b {
                Block::Paragraph(p) => p.plain_text(),
                Block::Table(_) => String::from("<table>"),
            })
            .collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("left column"));
        assert!(texts[1].starts_with("right column"));
    }

    #[test]
    fn test_without_table_detection_text_flows() {
        let spans = vec![
            span("Name", 72.0, 650.0, 10.0, "Helvetica"),
            span("Score", 200.0, 650.0, 10.0, "Helvetica"),
            span("Ann", 72.0, 635.0, 10.0, "Helvetica"),
            span("91", 200.0, 635.0, 10.0, "Helvetica"),
        ];
        let stats = FontStatistics::from_spans(&spans);
        let page = analyze_page(page_of(spans), &stats, None);
        assert!(page
            .elements
            .iter()
            .all(|b| matches!(b, Block::Paragraph(_))));
        assert!(page.plain_text().contains("Ann"));
    }

    #[test]
    fn test_list_block_becomes_list_item() {
        let spans = vec![span("3. Third step", 72.0, 700.0, 10.0, "Helvetica")];
        let stats = FontStatistics::from_spans(&spans);
        let page = analyze_page(page_of(spans), &stats, None);
        let Block::Paragraph(p) = &page.elements[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.style.list_info.as_ref().and_then(|i| i.number), Some(3));
        assert_eq!(p.plain_text(), "Third step");
    }

    #[test]
    fn test_styled_runs() {
        let lines = vec![
            TextLine::from_spans(vec![span(
                "Bold lead",
                72.0,
                700.0,
                10.0,
                "Helvetica-Bold",
            )]),
            TextLine::from_spans(vec![span("plain one", 72.0, 688.0, 10.0, "Helvetica")]),
            TextLine::from_spans(vec![span("plain two", 72.0, 676.0, 10.0, "Helvetica")]),
        ];
        let block = TextBlock {
            lines,
            block_type: BlockType::Paragraph,
            heading_level: 0,
        };
        let paragraph = block_to_paragraph(&block);
        assert_eq!(paragraph.content.len(), 2);
        assert!(paragraph.content[0].style.bold);
        assert_eq!(paragraph.plain_text(), "Bold lead plain one plain two");
    }
}
