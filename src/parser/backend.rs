//! PDF backend abstraction layer.
//!
//! Span extraction talks to this trait instead of `lopdf` so that the
//! content-stream walker can be exercised with synthetic operations.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Document as LopdfDocument, Encoding, Object};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `idx`, if present.
    pub fn number(&self, idx: usize) -> Option<f32> {
        self.operands.get(idx).and_then(PdfValue::as_number)
    }
}

/// Turns a string operand into text, given the font resource name in
/// effect.
pub type TextDecoder<'a> = Box<dyn Fn(&[u8], &[u8]) -> String + 'a>;

/// Access to the parts of a PDF that conversion needs.
pub trait PdfBackend {
    /// All pages as (page number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// MediaBox width and height in points, when the page declares one.
    fn page_size(&self, page: PageId) -> Option<(f32, f32)>;

    /// Font resource name → BaseFont name for a page.
    fn page_fonts(&self, page: PageId) -> Result<HashMap<Vec<u8>, String>>;

    /// Decompressed content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse content stream bytes into operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decoder for the page's string operands. Font encodings are resolved
    /// once; unknown fonts fall back to [`decode_text_simple`].
    fn text_decoder(&self, page: PageId) -> TextDecoder<'_>;
}

/// Best-effort decoding without font information: UTF-16BE with BOM,
/// then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self {
            doc: LopdfDocument::load(path)?,
        })
    }

    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: LopdfDocument::load_mem(data)?,
        })
    }

    /// The underlying document, for metadata and outline lookups.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn stream_content(&self, obj: &Object) -> Result<Vec<u8>> {
        let obj = match obj {
            Object::Reference(r) => self.doc.get_object(*r)?,
            other => other,
        };
        match obj {
            Object::Stream(s) => Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone())),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> Option<(f32, f32)> {
        let dict = self.doc.get_dictionary(page).ok()?;
        let media_box = match dict.get(b"MediaBox").ok()? {
            Object::Reference(r) => self.doc.get_object(*r).ok()?,
            other => other,
        };
        let values: Vec<f32> = media_box
            .as_array()
            .ok()?
            .iter()
            .filter_map(|o| o.as_float().ok())
            .collect();
        match values.as_slice() {
            [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => None,
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<HashMap<Vec<u8>, String>> {
        let fonts = self.doc.get_page_fonts(page)?;
        Ok(fonts
            .into_iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .and_then(Object::as_name)
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&name).to_string());
                (name, base_font)
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        // A page without Contents is blank, not broken.
        let Ok(contents) = self.doc.get_dictionary(page)?.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let contents = match contents {
            Object::Reference(r) => self.doc.get_object(*r)?,
            other => other,
        };

        match contents {
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    content.extend_from_slice(&self.stream_content(part)?);
                    content.push(b'\n');
                }
                Ok(content)
            }
            stream => self.stream_content(stream),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;
        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn text_decoder(&self, page: PageId) -> TextDecoder<'_> {
        let encodings: HashMap<Vec<u8>, Encoding<'_>> = match self.doc.get_page_fonts(page) {
            Ok(fonts) => fonts
                .into_iter()
                .filter(|(_, dict)| dict.type_is(b"Font"))
                .filter_map(|(name, dict)| Some((name, dict.get_font_encoding(&self.doc).ok()?)))
                .collect(),
            Err(e) => {
                log::debug!("No font encodings for page {:?}: {}", page, e);
                HashMap::new()
            }
        };

        Box::new(move |font_name, bytes| {
            encodings
                .get(font_name)
                .and_then(|encoding| LopdfDocument::decode_text(encoding, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        })
    }
}

fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r as f32),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}
