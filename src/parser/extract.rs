//! Content-stream walking: PDF text operators to positioned [`TextSpan`]s.

use std::collections::HashMap;

use crate::error::Result;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};
use super::layout::{is_spaceless_script_char, TextSpan};

/// TJ adjustments beyond this many thousandths of an em read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Pulls text spans out of pages through a [`PdfBackend`].
pub struct SpanExtractor<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> SpanExtractor<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract every visible text span on a page, in content-stream order.
    pub fn extract_page(&self, page: PageId) -> Result<Vec<TextSpan>> {
        let fonts = self.backend.page_fonts(page).unwrap_or_else(|e| {
            log::debug!("No font resources for page {:?}: {}", page, e);
            HashMap::new()
        });
        let content = self.backend.page_content(page)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let ops = self.backend.decode_content(&content)?;
        let decode = self.backend.text_decoder(page);

        Ok(spans_from_ops(&ops, &fonts, |font, bytes| decode(font, bytes)))
    }
}

/// Walk decoded operations and collect spans.
///
/// `fonts` maps font resource names to base font names; `decode` turns a
/// string operand into text given the current font resource name.
pub fn spans_from_ops<F>(
    ops: &[ContentOp],
    fonts: &HashMap<Vec<u8>, String>,
    decode: F,
) -> Vec<TextSpan>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    let mut state = TextState::default();
    let mut spans = Vec::new();

    for op in ops {
        match op.operator.as_str() {
            "BT" => {
                state.in_text = true;
                state.line_matrix = TextMatrix::default();
                state.matrix = TextMatrix::default();
            }
            "ET" => state.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    state.font_base = fonts
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                    state.font_resource = name.clone();
                }
                if let Some(size) = op.number(1) {
                    state.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                let tx = op.number(0).unwrap_or(0.0);
                let ty = op.number(1).unwrap_or(0.0);
                if op.operator == "TD" {
                    state.leading = -ty;
                }
                state.move_line(tx, ty);
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let m: Vec<f32> = (0..6).map(|i| op.number(i).unwrap_or(0.0)).collect();
                    state.line_matrix = TextMatrix {
                        a: m[0],
                        b: m[1],
                        c: m[2],
                        d: m[3],
                        e: m[4],
                        f: m[5],
                    };
                    state.matrix = state.line_matrix;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = decode(&state.font_resource, bytes);
                    state.show(text, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let text = combine_tj(items, |bytes| decode(&state.font_resource, bytes));
                    state.show(text, &mut spans);
                }
            }
            "'" | "\"" => {
                state.next_line();
                let idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(PdfValue::Str(bytes)) = op.operands.get(idx) {
                    let text = decode(&state.font_resource, bytes);
                    state.show(text, &mut spans);
                }
            }
            _ => {}
        }
    }

    spans
}

/// Join the strings of a TJ array, turning wide negative kerning into spaces.
fn combine_tj<F>(items: &[PdfValue], decode: F) -> String
where
    F: Fn(&[u8]) -> String,
{
    let mut combined = String::new();
    for item in items {
        match item {
            PdfValue::Str(bytes) => combined.push_str(&decode(bytes)),
            other => {
                let Some(adjustment) = other.as_number() else {
                    continue;
                };
                if -adjustment <= TJ_SPACE_THRESHOLD {
                    continue;
                }
                match combined.chars().last() {
                    Some(c) if c == ' ' || c == '\u{00A0}' || is_spaceless_script_char(c) => {}
                    Some(_) => combined.push(' '),
                    None => {}
                }
            }
        }
    }
    combined
}

#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    /// Pre-multiply by a translation expressed in text space.
    fn translate(self, tx: f32, ty: f32) -> Self {
        Self {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..self
        }
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

#[derive(Debug)]
struct TextState {
    in_text: bool,
    matrix: TextMatrix,
    line_matrix: TextMatrix,
    font_resource: Vec<u8>,
    font_base: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            in_text: false,
            matrix: TextMatrix::default(),
            line_matrix: TextMatrix::default(),
            font_resource: Vec::new(),
            font_base: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.translate(tx, ty);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Producers that rely on T* without TL get single spacing.
        let leading = if self.leading > 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn show(&mut self, text: String, spans: &mut Vec<TextSpan>) {
        if !self.in_text {
            return;
        }
        let advance = TextSpan::estimate_width(&text, self.font_size);
        if !text.trim().is_empty() {
            let size = self.font_size * self.matrix.vertical_scale();
            spans.push(TextSpan::new(
                text,
                self.matrix.e,
                self.matrix.f,
                size,
                self.font_base.clone(),
            ));
        }
        self.matrix = self.matrix.translate(advance, 0.0);
    }
}
