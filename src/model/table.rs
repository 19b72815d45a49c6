//! Table types.

use serde::{Deserialize, Serialize};

/// A table recovered from aligned text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,

    /// Number of leading header rows (0 = no header)
    pub header_rows: u8,

    /// Column widths in points, measured from the detected column edges
    pub column_widths: Option<Vec<f32>>,

    pub caption: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header_rows: u8) -> Self {
        Self {
            header_rows,
            ..Self::new()
        }
    }

    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[TableRow] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[..n]
    }

    pub fn body(&self) -> &[TableRow] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[n..]
    }

    /// Alignment of a column, read from its first body cell.
    pub fn column_alignment(&self, col: usize) -> Alignment {
        self.body()
            .iter()
            .chain(self.header())
            .find_map(|r| r.cells.get(col))
            .map(|c| c.alignment)
            .unwrap_or_default()
    }

    /// Rows joined by newlines, cells by tabs.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(TableRow::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub is_header: bool,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    pub fn header(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: true,
        }
    }

    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell. Multi-line cells keep their lines joined by a space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    pub alignment: Alignment,
}

impl TableCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alignment: Alignment::Left,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Markdown separator cell for this alignment.
    pub fn separator(self) -> &'static str {
        match self {
            Alignment::Left => "---",
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::with_header(1);
        table.add_row(TableRow::header(vec![
            TableCell::text("Item"),
            TableCell::text("Qty"),
        ]));
        table.add_row(TableRow::new(vec![
            TableCell::text("Apples"),
            TableCell::text("3").with_alignment(Alignment::Right),
        ]));
        table.add_row(TableRow::from_strings(["Pears"]));
        table
    }

    #[test]
    fn test_header_and_body() {
        let table = sample();
        assert_eq!(table.header().len(), 1);
        assert_eq!(table.body().len(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_header_rows_past_end() {
        let mut table = Table::with_header(3);
        table.add_row(TableRow::from_strings(["only"]));
        assert_eq!(table.header().len(), 1);
        assert!(table.body().is_empty());
    }

    #[test]
    fn test_column_alignment_from_body() {
        let table = sample();
        assert_eq!(table.column_alignment(0), Alignment::Left);
        assert_eq!(table.column_alignment(1), Alignment::Right);
        assert_eq!(table.column_alignment(5), Alignment::Left);
    }

    #[test]
    fn test_alignment_separator() {
        assert_eq!(Alignment::Left.separator(), "---");
        assert_eq!(Alignment::Center.separator(), ":---:");
        assert_eq!(Alignment::Right.separator(), "---:");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().plain_text(), "Item\tQty\nApples\t3\nPears");
    }
}
