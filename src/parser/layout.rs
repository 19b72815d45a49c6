//! Layout analysis: spans to lines to blocks.
//!
//! Everything here works on already-extracted [`TextSpan`]s, so it has no
//! PDF access and runs happily on a rayon worker.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::markers::parse_list_marker;

/// A run of text drawn at one position with one font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

impl TextSpan {
    /// Build a span, inferring weight and slant from the font name and
    /// estimating its width.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = ["bold", "black", "heavy", "semibold"]
            .iter()
            .any(|w| lower.contains(w));
        let is_italic = lower.contains("italic") || lower.contains("oblique");
        let width = Self::estimate_width(&text, font_size);

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }

    /// Half an em per character. Glyph widths are not read from the font.
    pub fn estimate_width(text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Approximate top edge (ascender).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Sorted by x
    pub spans: Vec<TextSpan>,
    pub y: f32,
    /// Left edge
    pub x: f32,
    /// Character-weighted font size
    pub font_size: f32,
    pub heading_level: u8,
}

impl TextLine {
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let font_size = if total_chars > 0 {
            spans
                .iter()
                .map(|s| s.font_size * s.text.chars().count() as f32)
                .sum::<f32>()
                / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(0.0)
        };

        let (x, y) = spans.first().map(|s| (s.x, s.y)).unwrap_or((0.0, 0.0));

        Self {
            spans,
            y,
            x,
            font_size,
            heading_level: 0,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level > 0
    }

    /// Span texts joined, with a space wherever the horizontal gap between
    /// spans is wider than a fifth of a character. Spaceless scripts (CJK,
    /// kana) are joined without one.
    pub fn text(&self) -> String {
        let mut result = String::new();
        let mut prev: Option<&TextSpan> = None;

        for span in &self.spans {
            if let Some(prev) = prev {
                let gap = span.x - prev.right();
                let threshold = span.font_size * 0.5 * 0.2;
                let both_spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);
                let has_space = prev.text.ends_with(is_space) || span.text.starts_with(is_space);
                if gap > threshold && !both_spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
            prev = Some(span);
        }

        result
    }

    /// More than half of the characters are set in a bold face.
    pub fn is_bold(&self) -> bool {
        let bold: usize = self
            .spans
            .iter()
            .filter(|s| s.is_bold)
            .map(|s| s.text.chars().count())
            .sum();
        let total: usize = self.spans.iter().map(|s| s.text.chars().count()).sum();
        total > 0 && bold * 2 > total
    }

    pub fn is_italic(&self) -> bool {
        !self.spans.is_empty() && self.spans.iter().all(|s| s.is_italic)
    }

    pub fn starts_with_list_marker(&self) -> bool {
        parse_list_marker(&self.text()).is_some()
    }
}

/// Kind of text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Heading,
    Paragraph,
    ListItem,
}

/// A group of lines that renders as one Markdown block.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub block_type: BlockType,
    /// 1-6 for headings, 0 otherwise
    pub heading_level: u8,
}

impl TextBlock {
    fn from_lines(lines: Vec<TextLine>) -> Self {
        let heading_level = lines
            .iter()
            .filter(|l| l.is_heading())
            .map(|l| l.heading_level)
            .min()
            .unwrap_or(0);
        let block_type = if heading_level > 0 {
            BlockType::Heading
        } else if lines.first().is_some_and(TextLine::starts_with_list_marker) {
            BlockType::ListItem
        } else {
            BlockType::Paragraph
        };
        Self {
            lines,
            block_type,
            heading_level,
        }
    }

    /// Lines joined with single spaces.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Baseline of the first line, used to order blocks on the page.
    pub fn top_y(&self) -> f32 {
        self.lines.first().map(|l| l.y).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// A text column found by gutter search.
#[derive(Debug, Clone)]
pub struct Column {
    pub left: f32,
    pub right: f32,
    /// 0 = leftmost
    pub index: usize,
}

impl Column {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Left edge or centre inside the column.
    pub fn contains_span(&self, span: &TextSpan) -> bool {
        self.contains(span.x) || self.contains(span.x + span.width / 2.0)
    }
}

/// Font size distribution, used to tell headings from body text.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Most frequent size
    pub body_size: f32,
    /// Sizes above body, largest first
    pub heading_sizes: Vec<f32>,
    /// Size in tenths of a point → occurrences
    pub size_histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    pub fn from_spans<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Self {
        let mut stats = Self::default();
        for span in spans {
            stats.add_size(span.font_size);
        }
        stats.analyze();
        stats
    }

    pub fn add_size(&mut self, size: f32) {
        *self
            .size_histogram
            .entry((size * 10.0).round() as i32)
            .or_insert(0) += 1;
    }

    /// Derive body and heading sizes from the histogram. Ties for the most
    /// frequent size go to the larger size.
    pub fn analyze(&mut self) {
        let Some((&body_key, _)) = self.size_histogram.iter().max_by_key(|(_, count)| **count)
        else {
            self.body_size = 12.0;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = body_key as f32 / 10.0;

        self.heading_sizes = self
            .size_histogram
            .keys()
            .rev()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size > self.body_size + 0.5)
            .collect();
    }

    /// Heading level for a font size (1-6), or 0 for body text. Only sizes
    /// at least 1.5pt above body qualify.
    pub fn heading_level(&self, font_size: f32) -> u8 {
        if font_size < self.body_size + 1.5 {
            return 0;
        }
        self.heading_sizes
            .iter()
            .position(|&size| font_size >= size - 0.5)
            .map(|i| (i + 1).min(6) as u8)
            .unwrap_or(5)
    }
}

/// Widest horizontal extent searched for a gutter. Text placed far off the
/// page is read as a single column.
const MAX_COLUMN_EXTENT: f32 = 5000.0;

/// Groups spans into lines and lines into blocks.
pub struct LayoutAnalyzer<'a> {
    font_stats: &'a FontStatistics,
}

impl<'a> LayoutAnalyzer<'a> {
    pub fn new(font_stats: &'a FontStatistics) -> Self {
        Self { font_stats }
    }

    /// Full pipeline for one page: columns, lines, heading marks, blocks.
    pub fn analyze(&self, spans: Vec<TextSpan>) -> Vec<TextBlock> {
        let lines = self.group_spans_into_lines(spans);
        let lines = self.mark_headings(lines);
        self.group_lines_into_blocks(lines)
            .into_iter()
            .filter(|b| !b.is_empty())
            .collect()
    }

    /// Find a vertical gutter splitting the page into two columns.
    pub fn detect_columns(&self, spans: &[TextSpan]) -> Vec<Column> {
        let Some(min_x) = spans.iter().map(|s| s.x).min_by(cmp_f32) else {
            return vec![];
        };
        let max_x = spans.iter().map(TextSpan::right).max_by(cmp_f32).unwrap_or(min_x);
        let single = || {
            vec![Column {
                left: min_x - 10.0,
                right: max_x + 10.0,
                index: 0,
            }]
        };

        let extent = max_x - min_x;
        if !extent.is_finite() || extent < 250.0 {
            return single();
        }
        if extent > MAX_COLUMN_EXTENT {
            log::debug!("Text spans {:.0}pt wide, skipping column search", extent);
            return single();
        }

        const SLICE: f32 = 3.0;
        let slices = (extent / SLICE) as usize + 1;
        let mut occupancy = vec![0usize; slices];
        for span in spans {
            let start = ((span.x - min_x) / SLICE) as usize;
            let end = (((span.right() - min_x) / SLICE) as usize).min(slices - 1);
            for slot in occupancy.iter_mut().take(end + 1).skip(start) {
                *slot += 1;
            }
        }

        // Widest empty run in the middle 70%, ties broken toward the centre.
        let centre = slices / 2;
        let mut best: Option<(usize, usize)> = None;
        let mut run_start = None;
        for i in (slices * 15 / 100)..=(slices * 85 / 100).min(slices - 1) {
            let empty = occupancy[i] == 0;
            match (empty, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    best = pick_gap(best, (start, i - start), centre);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            let end = (slices * 85 / 100).min(slices - 1) + 1;
            best = pick_gap(best, (start, end - start), centre);
        }

        let Some((gap_start, gap_len)) = best else {
            return single();
        };
        let gap_width = gap_len as f32 * SLICE;
        if gap_width < 12.0 {
            log::debug!("Gutter {:.1}pt too narrow, single column", gap_width);
            return single();
        }

        let gutter = min_x + (gap_start as f32 + gap_len as f32 / 2.0) * SLICE;
        if gutter - min_x < 80.0 || max_x - gutter < 80.0 {
            return single();
        }

        let left = spans.iter().filter(|s| s.x + s.width / 2.0 < gutter).count();
        let right = spans.len() - left;
        let min_spans = (spans.len() / 10).max(2);
        if left < min_spans || right < min_spans {
            return single();
        }

        log::debug!("Two columns split at x={:.1}", gutter);
        vec![
            Column {
                left: min_x - 10.0,
                right: gutter,
                index: 0,
            },
            Column {
                left: gutter,
                right: max_x + 10.0,
                index: 1,
            },
        ]
    }

    /// Group spans into lines. With two columns, the left column is read
    /// to the end before the right one starts.
    pub fn group_spans_into_lines(&self, spans: Vec<TextSpan>) -> Vec<TextLine> {
        let columns = self.detect_columns(&spans);
        if columns.len() <= 1 {
            return group_single_column(spans);
        }

        let mut per_column: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len()];
        for span in spans {
            let idx = columns
                .iter()
                .position(|c| c.contains_span(&span))
                .unwrap_or(0);
            per_column[idx].push(span);
        }

        per_column.into_iter().flat_map(group_single_column).collect()
    }

    pub fn mark_headings(&self, mut lines: Vec<TextLine>) -> Vec<TextLine> {
        for line in &mut lines {
            line.heading_level = self.font_stats.heading_level(line.font_size);
        }
        lines
    }

    /// Split lines into blocks on headings, list markers, wide spacing,
    /// size changes and indentation changes.
    pub fn group_lines_into_blocks(&self, lines: Vec<TextLine>) -> Vec<TextBlock> {
        let avg_spacing = average_line_spacing(&lines);
        let mut blocks = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();

        for line in lines {
            if let Some(prev) = current.last() {
                if should_break_block(prev, &line, avg_spacing) {
                    blocks.push(TextBlock::from_lines(std::mem::take(&mut current)));
                }
            }
            current.push(line);
        }
        if !current.is_empty() {
            blocks.push(TextBlock::from_lines(current));
        }

        blocks
    }
}

fn pick_gap(
    best: Option<(usize, usize)>,
    gap: (usize, usize),
    centre: usize,
) -> Option<(usize, usize)> {
    let width = gap.1 as f32 * 3.0;
    if width < 10.0 {
        return best;
    }
    let dist = |(start, len): (usize, usize)| (start + len / 2).abs_diff(centre);
    match best {
        None => Some(gap),
        Some(b) => {
            let best_width = b.1 as f32 * 3.0;
            if width > best_width * 1.5 || (width >= best_width * 0.7 && dist(gap) < dist(b)) {
                Some(gap)
            } else {
                Some(b)
            }
        }
    }
}

/// Sort top to bottom then left to right, and cut a new line whenever the
/// baseline moves by more than 30% of the font size.
fn group_single_column(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        match current_y {
            Some(y) if (span.y - y).abs() <= span.font_size * 0.3 => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        12.0
    } else {
        spacings.iter().sum::<f32>() / spacings.len() as f32
    }
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    curr.is_heading()
        || prev.is_heading()
        || curr.starts_with_list_marker()
        || (prev.y - curr.y).abs() > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\u{00A0}'
}

fn cmp_f32(a: &f32, b: &f32) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Scripts written without spaces between words: CJK ideographs, kana and
/// CJK punctuation. Hangul uses spaces and is excluded.
pub fn is_spaceless_script_char(c: char) -> bool {
    matches!(
        c as u32,
        0x3000..=0x303F
            | 0x3040..=0x309F
            | 0x30A0..=0x30FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0x20000..=0x2EBEF
    )
}
