//! Small PDFs built in memory for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

struct TextItem {
    text: String,
    x: i64,
    y: i64,
    size: i64,
    bold: bool,
}

/// Builds letter-size pages of absolutely positioned Helvetica text.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<Vec<TextItem>>,
    /// Indexes of pages whose Contents is not a stream
    unreadable: Vec<usize>,
    title: Option<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new page; following text lands on it.
    pub fn page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// A page whose content cannot be read.
    pub fn unreadable_page(mut self) -> Self {
        self.unreadable.push(self.pages.len());
        self.pages.push(Vec::new());
        self
    }

    pub fn text(self, text: &str, x: i64, y: i64, size: i64) -> Self {
        self.push(text, x, y, size, false)
    }

    pub fn bold(self, text: &str, x: i64, y: i64, size: i64) -> Self {
        self.push(text, x, y, size, true)
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    fn push(mut self, text: &str, x: i64, y: i64, size: i64, bold: bool) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(TextItem {
                text: text.to_string(),
                x,
                y,
                size,
                bold,
            });
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for (index, items) in self.pages.iter().enumerate() {
            let mut operations = Vec::new();
            for item in items {
                let font = if item.bold { "F2" } else { "F1" };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![font.into(), item.size.into()]));
                operations.push(Operation::new("Td", vec![item.x.into(), item.y.into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(item.text.as_str())],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = if self.unreadable.contains(&index) {
                doc.add_object(dictionary! { "Length" => 0 })
            } else {
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()))
            };

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);

        if let Some(title) = &self.title {
            let info = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Producer" => Object::string_literal("fixture builder"),
            });
            doc.trailer.set("Info", info);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Heading, intro sentence, a two-column score table, closing sentence.
pub fn report() -> PdfBuilder {
    PdfBuilder::new()
        .page()
        .bold("Results", 72, 720, 18)
        .text("The figures are below.", 72, 690, 10)
        .text("Name", 72, 650, 10)
        .text("Score", 200, 650, 10)
        .text("Ann", 72, 635, 10)
        .text("91", 200, 635, 10)
        .text("Ben", 72, 620, 10)
        .text("78", 200, 620, 10)
        .text("That is all.", 72, 500, 10)
}

/// A bold-headed price list whose first description wraps onto a second
/// line.
pub fn price_list() -> PdfBuilder {
    PdfBuilder::new()
        .page()
        .bold("Item", 72, 500, 10)
        .bold("Description", 150, 500, 10)
        .bold("Price", 350, 500, 10)
        .text("Widget", 72, 480, 10)
        .text("Small blue widget", 150, 480, 10)
        .text("4.50", 350, 480, 10)
        .text("for indoor use", 150, 468, 10)
        .text("Gadget", 72, 448, 10)
        .text("Large gadget", 150, 448, 10)
        .text("12.00", 350, 448, 10)
        .text("Gizmo", 72, 428, 10)
        .text("Spare part", 150, 428, 10)
        .text("1,200", 350, 428, 10)
}

/// Two pages of plain text.
pub fn two_pages() -> PdfBuilder {
    PdfBuilder::new()
        .page()
        .text("First page text.", 72, 700, 10)
        .page()
        .text("Second page text.", 72, 700, 10)
}
