//! In-memory representation of one converted PDF.
//!
//! The parser fills these types; the renderer reads them. They live for a
//! single conversion call.

mod document;
mod page;
mod paragraph;
mod table;

pub use document::{Document, Metadata, Outline, OutlineItem};
pub use page::{Block, Page};
pub use paragraph::{ListInfo, ListStyle, Paragraph, ParagraphStyle, TextRun, TextStyle};
pub use table::{Alignment, Table, TableCell, TableRow};
