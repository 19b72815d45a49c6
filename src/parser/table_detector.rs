//! Table detection from text alignment (stream mode).
//!
//! Tables are found without ruling lines: rows are spans sharing a
//! baseline, columns are left edges that line up across rows. The fast and
//! accurate modes share the candidate search and differ in how much work
//! goes into each table afterwards.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{Alignment, Table, TableCell, TableRow};

use super::layout::TextSpan;
use super::markers::{is_bullet_marker, is_number_marker};
use super::options::TableMode;

/// A table region and the spans it claimed.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Baseline of the first row
    pub top_y: f32,
    /// Baseline of the last row
    pub bottom_y: f32,
    pub left_x: f32,
    pub right_x: f32,
    /// Column left edges, ascending
    pub columns: Vec<f32>,
    pub rows: Vec<TableRowData>,
}

/// Spans grouped on one baseline.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Mean baseline of the spans
    pub y: f32,
    /// Sorted by x
    pub spans: Vec<TextSpan>,
    /// Positions of `spans` in the detector input
    pub span_ids: Vec<usize>,
}

impl TableRowData {
    fn font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.font_size).fold(0.0, f32::max)
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    pub min_rows: usize,
    pub min_columns: usize,
    /// More columns than this usually means words were split apart
    pub max_columns: usize,
    /// Row grouping tolerance as a fraction of font size
    pub y_tolerance_factor: f32,
    /// Share of a row's spans that must sit on a column edge
    pub min_alignment_ratio: f32,
    /// Closer edges are merged (points)
    pub min_column_gap: f32,
    /// How far a span may sit from a column edge and still align (points)
    pub align_tolerance: f32,
    /// Re-detect column edges inside each table region
    pub refine_columns: bool,
    /// Fold wrapped cell lines into the row above
    pub merge_continuation_rows: bool,
    /// Widest baseline gap of a wrapped line, as a multiple of font size
    pub continuation_spacing: f32,
    /// Leading all-bold rows become header rows
    pub detect_bold_headers: bool,
    /// Right-align columns whose body cells are all numbers
    pub align_numeric_columns: bool,
}

impl TableDetectorConfig {
    pub fn fast() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
            align_tolerance: 5.0,
            refine_columns: false,
            merge_continuation_rows: false,
            continuation_spacing: 1.35,
            detect_bold_headers: false,
            align_numeric_columns: false,
        }
    }

    pub fn accurate() -> Self {
        Self {
            max_columns: 10,
            refine_columns: true,
            merge_continuation_rows: true,
            detect_bold_headers: true,
            align_numeric_columns: true,
            ..Self::fast()
        }
    }

    pub fn for_mode(mode: TableMode) -> Self {
        match mode {
            TableMode::Fast => Self::fast(),
            TableMode::Accurate => Self::accurate(),
        }
    }
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self::fast()
    }
}

/// Finds tables in a page's spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_mode(mode: TableMode) -> Self {
        Self::with_config(TableDetectorConfig::for_mode(mode))
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TableDetectorConfig {
        &self.config
    }

    /// Split `spans` into detected tables and the spans left for layout.
    pub fn detect(&self, spans: Vec<TextSpan>) -> (Vec<DetectedTable>, Vec<TextSpan>) {
        let cfg = &self.config;
        if spans.len() < cfg.min_rows * cfg.min_columns {
            return (vec![], spans);
        }

        let rows = self.group_into_rows(&spans);
        if rows.len() < cfg.min_rows {
            return (vec![], spans);
        }

        let columns = self.detect_columns(&rows);
        log::debug!("TableDetector: page column edges {:?}", columns);
        if columns.len() < cfg.min_columns {
            return (vec![], spans);
        }

        let mut tables = Vec::new();
        let mut used: HashSet<usize> = HashSet::new();

        for (start, end) in self.find_table_regions(&rows, &columns) {
            let table_rows = rows[start..=end].to_vec();

            let table_columns = if cfg.refine_columns {
                self.detect_columns(&table_rows)
            } else {
                self.columns_in_rows(&columns, &table_rows)
            };

            if table_columns.len() < cfg.min_columns {
                continue;
            }
            if table_columns.len() > cfg.max_columns {
                log::debug!(
                    "TableDetector: skipping region, {} columns > {}",
                    table_columns.len(),
                    cfg.max_columns
                );
                continue;
            }
            if self.is_list_pattern(&table_rows, &table_columns) {
                log::debug!("TableDetector: skipping region, looks like a list");
                continue;
            }

            used.extend(table_rows.iter().flat_map(|r| r.span_ids.iter().copied()));

            let all_spans = || table_rows.iter().flat_map(|r| r.spans.iter());
            let left_x = all_spans().map(|s| s.x).fold(f32::INFINITY, f32::min);
            let right_x = all_spans().map(TextSpan::right).fold(f32::NEG_INFINITY, f32::max);

            tables.push(DetectedTable {
                top_y: table_rows[0].y,
                bottom_y: table_rows[table_rows.len() - 1].y,
                left_x,
                right_x,
                columns: table_columns,
                rows: table_rows,
            });
        }

        let remaining = spans
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(_, span)| span)
            .collect();

        (tables, remaining)
    }

    /// Group spans into rows, top to bottom.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            spans[b]
                .y
                .total_cmp(&spans[a].y)
                .then(spans[a].x.total_cmp(&spans[b].x))
        });

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_y: Option<f32> = None;
        let tolerance = self.config.y_tolerance_factor;

        for id in order {
            let span = &spans[id];
            match current_y {
                Some(y) if (span.y - y).abs() <= span.font_size * tolerance => current.push(id),
                _ => {
                    if !current.is_empty() {
                        rows.push(make_row(spans, std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(id);
                }
            }
        }
        if !current.is_empty() {
            rows.push(make_row(spans, current));
        }

        rows
    }

    /// Left edges shared by enough rows, bucketed to 5pt and merged when
    /// closer than `min_column_gap`.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        const BUCKET: f32 = 5.0;

        let multi: Vec<&TableRowData> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let (sample, per_row_once): (Vec<&TableRowData>, bool) =
            if multi.len() >= self.config.min_rows {
                (multi, true)
            } else {
                (rows.iter().collect(), false)
            };
        if sample.is_empty() {
            return vec![];
        }

        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for row in &sample {
            let buckets = row.spans.iter().map(|s| (s.x / BUCKET).round() as i32);
            if per_row_once {
                for bucket in buckets.collect::<BTreeSet<_>>() {
                    *counts.entry(bucket).or_insert(0) += 1;
                }
            } else {
                for bucket in buckets {
                    *counts.entry(bucket).or_insert(0) += 1;
                }
            }
        }

        let min_occurrences =
            ((sample.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut merged: Vec<f32> = Vec::new();
        for (bucket, count) in counts {
            if count < min_occurrences {
                continue;
            }
            let edge = bucket as f32 * BUCKET;
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Page-level edges that some span in `rows` actually sits on.
    fn columns_in_rows(&self, columns: &[f32], rows: &[TableRowData]) -> Vec<f32> {
        columns
            .iter()
            .copied()
            .filter(|&col| {
                rows.iter()
                    .flat_map(|r| &r.spans)
                    .any(|s| (s.x - col).abs() <= self.config.align_tolerance)
            })
            .collect()
    }

    /// Contiguous runs of aligned rows. A row anchors a table when at least
    /// two of its spans sit on column edges; with continuation merging on,
    /// a single-span row indented to a later column may extend a run.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let cfg = &self.config;
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;
        let mut last_member = 0;
        let mut anchors = 0;

        let mut close = |start: &mut Option<usize>, anchors: &mut usize, end: usize| {
            if let Some(s) = start.take() {
                if *anchors >= cfg.min_rows {
                    regions.push((s, end));
                }
            }
            *anchors = 0;
        };

        for (i, row) in rows.iter().enumerate() {
            let aligned = self.aligned_span_count(row, columns);
            let ratio = aligned as f32 / row.spans.len().max(1) as f32;
            let is_anchor = aligned >= cfg.min_columns && ratio >= cfg.min_alignment_ratio;

            if is_anchor {
                start.get_or_insert(i);
                anchors += 1;
                last_member = i;
                continue;
            }

            if start.is_some()
                && cfg.merge_continuation_rows
                && self.is_continuation(rows, i, columns)
            {
                last_member = i;
                continue;
            }

            close(&mut start, &mut anchors, last_member);
        }
        close(&mut start, &mut anchors, last_member);

        regions
    }

    fn aligned_span_count(&self, row: &TableRowData, columns: &[f32]) -> usize {
        row.spans
            .iter()
            .filter(|s| {
                columns
                    .iter()
                    .any(|c| (s.x - c).abs() <= self.config.align_tolerance)
            })
            .count()
    }

    /// A wrapped cell line: every span on a column edge other than the
    /// first, set at single line spacing below the previous row.
    fn is_continuation(&self, rows: &[TableRowData], i: usize, columns: &[f32]) -> bool {
        let (Some(row), Some(prev)) = (rows.get(i), i.checked_sub(1).and_then(|p| rows.get(p)))
        else {
            return false;
        };
        let Some(&first_col) = columns.first() else {
            return false;
        };
        let tol = self.config.align_tolerance;

        let all_aligned = self.aligned_span_count(row, columns) == row.spans.len();
        let touches_first = row.spans.iter().any(|s| (s.x - first_col).abs() <= tol);
        let gap = prev.y - row.y;

        all_aligned
            && !touches_first
            && gap > 0.0
            && gap <= row.font_size() * self.config.continuation_spacing
    }

    /// Build the model table for a detected region.
    pub fn to_table_model(&self, detected: &DetectedTable) -> Table {
        let cfg = &self.config;
        let columns = &detected.columns;
        let ncols = columns.len();

        let mut rows: Vec<RowCells> = Vec::with_capacity(detected.rows.len());
        for row_data in &detected.rows {
            let mut cells: Vec<Vec<String>> = vec![Vec::new(); ncols];
            for span in &row_data.spans {
                let col = find_column_for_span(span.x, columns, detected.right_x);
                if let Some(cell) = cells.get_mut(col) {
                    cell.push(span.text.trim().to_string());
                }
            }
            let cells: Vec<String> = cells.into_iter().map(|parts| parts.join(" ")).collect();
            let row = RowCells {
                y: row_data.y,
                font_size: row_data.font_size(),
                bold: !row_data.spans.is_empty() && row_data.spans.iter().all(|s| s.is_bold),
                cells,
            };

            if cfg.merge_continuation_rows {
                if let Some(prev) = rows.last_mut() {
                    if row.continues(prev, cfg.continuation_spacing) {
                        prev.absorb(row);
                        continue;
                    }
                }
            }
            rows.push(row);
        }

        let header_rows = if rows.len() < 2 {
            0
        } else if cfg.detect_bold_headers {
            rows.iter()
                .take_while(|r| r.bold)
                .count()
                .clamp(1, rows.len() - 1)
        } else {
            1
        };

        let right_aligned: Vec<bool> = (0..ncols)
            .map(|col| {
                if !cfg.align_numeric_columns {
                    return false;
                }
                let mut body = rows[header_rows..]
                    .iter()
                    .map(|r| r.cells[col].as_str())
                    .filter(|t| !t.is_empty())
                    .peekable();
                body.peek().is_some() && body.all(is_numeric_cell)
            })
            .collect();

        let mut table = Table::with_header(header_rows.min(u8::MAX as usize) as u8);
        for (idx, row) in rows.into_iter().enumerate() {
            let cells: Vec<TableCell> = row
                .cells
                .into_iter()
                .zip(&right_aligned)
                .map(|(text, &right)| {
                    let cell = TableCell::text(text);
                    if right {
                        cell.with_alignment(Alignment::Right)
                    } else {
                        cell
                    }
                })
                .collect();
            table.add_row(if idx < header_rows {
                TableRow::header(cells)
            } else {
                TableRow::new(cells)
            });
        }

        let widths = columns
            .iter()
            .enumerate()
            .map(|(i, &start)| columns.get(i + 1).copied().unwrap_or(detected.right_x) - start)
            .collect();
        table.column_widths = Some(widths);

        table
    }

    /// Regions whose first column is bullets, or numbers in a two-column
    /// layout, are lists rather than tables.
    fn is_list_pattern(&self, rows: &[TableRowData], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0;
        let mut numbers = 0;
        for row in rows {
            let Some(first) = row.spans.first() else {
                continue;
            };
            if is_bullet_marker(&first.text) {
                bullets += 1;
            } else if is_number_marker(&first.text) {
                numbers += 1;
            }
        }

        let n = rows.len() as f32;
        bullets as f32 / n >= 0.5 || (columns.len() == 2 && (bullets + numbers) as f32 / n >= 0.5)
    }
}

struct RowCells {
    y: f32,
    font_size: f32,
    bold: bool,
    cells: Vec<String>,
}

impl RowCells {
    fn continues(&self, prev: &RowCells, spacing: f32) -> bool {
        let filled = self.cells.iter().filter(|c| !c.is_empty()).count();
        let gap = prev.y - self.y;
        self.cells.first().is_some_and(|c| c.is_empty())
            && filled > 0
            && filled < self.cells.len()
            && gap > 0.0
            && gap <= self.font_size * spacing
    }

    fn absorb(&mut self, next: RowCells) {
        for (cell, extra) in self.cells.iter_mut().zip(next.cells) {
            if extra.is_empty() {
                continue;
            }
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(&extra);
        }
        self.y = next.y;
    }
}

fn make_row(spans: &[TextSpan], ids: Vec<usize>) -> TableRowData {
    let y = ids.iter().map(|&i| spans[i].y).sum::<f32>() / ids.len() as f32;
    TableRowData {
        y,
        spans: ids.iter().map(|&i| spans[i].clone()).collect(),
        span_ids: ids,
    }
}

/// Column whose range `[edge - 10, next_edge - 10)` holds `x`, else the
/// nearest edge.
fn find_column_for_span(x: f32, columns: &[f32], right_x: f32) -> usize {
    for (i, &start) in columns.iter().enumerate() {
        let end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if x >= start - 10.0 && x < end - 10.0 {
            return i;
        }
    }
    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Figures such as `4.50`, `1,200`, `-3`, `$12`, `45%` or `(7)`.
fn is_numeric_cell(text: &str) -> bool {
    let core: String = text
        .trim()
        .trim_start_matches(|c: char| "$€£¥+-(".contains(c))
        .trim_end_matches(|c: char| "%)".contains(c))
        .chars()
        .filter(|c| *c != ',')
        .collect();
    core.starts_with(|c: char| c.is_ascii_digit() || c == '.') && core.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 10.0, "Helvetica".to_string())
    }

    fn bold_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 10.0, "Helvetica-Bold".to_string())
    }

    /// A priced item list with a wrapped description in the first body row.
    fn price_list() -> Vec<TextSpan> {
        vec![
            bold_span("Item", 72.0, 500.0),
            bold_span("Description", 150.0, 500.0),
            bold_span("Price", 350.0, 500.0),
            make_span("Widget", 72.0, 480.0),
            make_span("Small blue widget", 150.0, 480.0),
            make_span("4.50", 350.0, 480.0),
            make_span("for indoor use", 150.0, 468.0),
            make_span("Gadget", 72.0, 448.0),
            make_span("Large gadget", 150.0, 448.0),
            make_span("12.00", 350.0, 448.0),
            make_span("Gizmo", 72.0, 428.0),
            make_span("Spare part", 150.0, 428.0),
            make_span("1,200", 350.0, 428.0),
        ]
    }

    #[test]
    fn test_detect_simple_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("Name", 10.0, 100.0),
            make_span("Age", 60.0, 100.0),
            make_span("Alice", 10.0, 85.0),
            make_span("30", 60.0, 85.0),
            make_span("Bob", 10.0, 70.0),
            make_span("25", 60.0, 70.0),
        ];

        let (tables, remaining) = detector.detect(spans);
        assert_eq!(tables.len(), 1);
        assert!(remaining.is_empty());
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].columns.len(), 2);

        let table = detector.to_table_model(&tables[0]);
        assert_eq!(table.header_rows, 1);
        assert_eq!(table.rows[1].cells[0].text, "Alice");
        assert_eq!(table.rows[2].cells[1].text, "25");
    }

    #[test]
    fn test_single_column_text_is_not_a_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("Line 1", 10.0, 100.0),
            make_span("Line 2", 10.0, 85.0),
            make_span("Line 3", 10.0, 70.0),
            make_span("Line 4", 10.0, 55.0),
        ];
        let (tables, remaining) = detector.detect(spans);
        assert!(tables.is_empty());
        assert_eq!(remaining.len(), 4);
    }

    #[test]
    fn test_paragraph_next_to_table_stays_out() {
        let detector = TableDetector::new();
        let mut spans = vec![make_span("An introductory sentence.", 10.0, 130.0)];
        spans.extend([
            make_span("Name", 10.0, 100.0),
            make_span("Age", 60.0, 100.0),
            make_span("Alice", 10.0, 85.0),
            make_span("30", 60.0, 85.0),
        ]);
        let (tables, remaining) = detector.detect(spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "An introductory sentence.");
    }

    #[test]
    fn test_fast_mode_splits_on_wrapped_line() {
        let detector = TableDetector::for_mode(TableMode::Fast);
        let (tables, remaining) = detector.detect(price_list());

        assert_eq!(tables.len(), 2);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "for indoor use");

        let first = detector.to_table_model(&tables[0]);
        assert_eq!(first.header_rows, 1);
        assert_eq!(first.column_alignment(2), Alignment::Left);
    }

    #[test]
    fn test_accurate_mode_merges_wrapped_cell() {
        let detector = TableDetector::for_mode(TableMode::Accurate);
        let (tables, remaining) = detector.detect(price_list());

        assert_eq!(tables.len(), 1);
        assert!(remaining.is_empty());

        let table = detector.to_table_model(&tables[0]);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.header_rows, 1);
        assert_eq!(
            table.rows[1].cells[1].text,
            "Small blue widget for indoor use"
        );
        assert_eq!(table.column_alignment(2), Alignment::Right);
        assert_eq!(table.column_alignment(1), Alignment::Left);
    }

    #[test]
    fn test_accurate_bold_header_rows() {
        let detector = TableDetector::for_mode(TableMode::Accurate);
        let spans = vec![
            bold_span("Region", 72.0, 500.0),
            bold_span("2023", 200.0, 500.0),
            bold_span("North", 72.0, 485.0),
            bold_span("10", 200.0, 485.0),
            make_span("South", 72.0, 470.0),
            make_span("12", 200.0, 470.0),
            make_span("East", 72.0, 455.0),
            make_span("9", 200.0, 455.0),
        ];
        let (tables, _) = detector.detect(spans);
        let table = detector.to_table_model(&tables[0]);
        assert_eq!(table.header_rows, 2);
        assert!(table.rows[1].is_header);
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("1.", 50.0, 400.0),
            make_span("Equipment settings", 80.0, 400.0),
            make_span("2.", 50.0, 370.0),
            make_span("Object management", 80.0, 370.0),
            make_span("3.", 50.0, 340.0),
            make_span("Routing policy", 80.0, 340.0),
        ];
        let (tables, remaining) = detector.detect(spans);
        assert!(tables.is_empty());
        assert_eq!(remaining.len(), 6);
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let detector = TableDetector::for_mode(TableMode::Accurate);
        let spans = vec![
            make_span("-", 50.0, 400.0),
            make_span("Management", 80.0, 400.0),
            make_span("-", 50.0, 370.0),
            make_span("Interface options", 80.0, 370.0),
            make_span("-", 50.0, 340.0),
            make_span("Firmware", 80.0, 340.0),
        ];
        let (tables, remaining) = detector.detect(spans);
        assert!(tables.is_empty());
        assert_eq!(remaining.len(), 6);
    }

    #[test]
    fn test_column_widths_recorded() {
        let detector = TableDetector::new();
        let (tables, _) = detector.detect(price_list());
        let table = detector.to_table_model(&tables[0]);
        let widths = table.column_widths.unwrap();
        assert_eq!(widths.len(), 3);
        assert_eq!(widths[0], 80.0);
    }

    #[test]
    fn test_numeric_cells() {
        for text in ["4.50", "1,200", "-3", "$12", "45%", "(7)", ".5"] {
            assert!(is_numeric_cell(text), "{text}");
        }
        for text in ["inf", "N/A", "12 apples", "", "-"] {
            assert!(!is_numeric_cell(text), "{text}");
        }
    }
}
