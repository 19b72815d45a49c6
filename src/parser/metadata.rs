//! Document Info dictionary and outline (bookmarks).

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::model::{Metadata, Outline, OutlineItem};

use super::backend::decode_text_simple;

/// Outlines nested deeper than this are cut off.
const MAX_OUTLINE_DEPTH: u8 = 16;

/// Read the trailer's Info dictionary.
pub fn extract_metadata(doc: &LopdfDocument) -> Metadata {
    let mut metadata = Metadata::with_version(doc.version.to_string());
    metadata.encrypted = doc.is_encrypted();
    metadata.page_count = doc.get_pages().len() as u32;

    let Some(info) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        return metadata;
    };

    metadata.title = dict_string(info, b"Title");
    metadata.author = dict_string(info, b"Author");
    metadata.subject = dict_string(info, b"Subject");
    metadata.keywords = dict_string(info, b"Keywords");
    metadata.creator = dict_string(info, b"Creator");
    metadata.producer = dict_string(info, b"Producer");
    metadata.created = dict_string(info, b"CreationDate").and_then(|s| parse_pdf_date(&s));
    metadata.modified = dict_string(info, b"ModDate").and_then(|s| parse_pdf_date(&s));

    metadata
}

/// Walk the catalog's Outlines tree. `None` when the document has no
/// bookmarks.
pub fn extract_outline(doc: &LopdfDocument) -> Option<Outline> {
    let root = doc
        .catalog()
        .ok()?
        .get(b"Outlines")
        .ok()
        .and_then(|obj| resolve(doc, obj))?
        .as_dict()
        .ok()?;
    let first = root.get(b"First").ok()?.as_reference().ok()?;

    let page_numbers: BTreeMap<ObjectId, u32> =
        doc.get_pages().into_iter().map(|(num, id)| (id, num)).collect();

    let mut walker = OutlineWalker {
        doc,
        page_numbers,
        visited: HashSet::new(),
    };
    let mut outline = Outline::new();
    walker.walk(first, 0, &mut outline.items);

    (!outline.is_empty()).then_some(outline)
}

struct OutlineWalker<'a> {
    doc: &'a LopdfDocument,
    page_numbers: BTreeMap<ObjectId, u32>,
    visited: HashSet<ObjectId>,
}

impl OutlineWalker<'_> {
    /// Collect `first` and its Next siblings into `items`.
    fn walk(&mut self, first: ObjectId, level: u8, items: &mut Vec<OutlineItem>) {
        let mut next = Some(first);
        while let Some(id) = next.take() {
            // Malformed files link outline items in cycles.
            if !self.visited.insert(id) {
                log::debug!("Outline cycle at object {:?}", id);
                break;
            }
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };

            let title = dict_string(dict, b"Title").unwrap_or_default();
            let mut item = OutlineItem::new(title, self.destination_page(dict), level);

            if level < MAX_OUTLINE_DEPTH {
                if let Some(child) = dict.get(b"First").and_then(Object::as_reference).ok() {
                    self.walk(child, level + 1, &mut item.children);
                }
            }
            items.push(item);

            next = dict.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    /// Page number of an item's Dest, or of its GoTo action's D.
    fn destination_page(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve_destination(dest);
        }
        let action = resolve(self.doc, item.get(b"A").ok()?)?.as_dict().ok()?;
        self.resolve_destination(action.get(b"D").ok()?)
    }

    fn resolve_destination(&self, dest: &Object) -> Option<u32> {
        let dest = resolve(self.doc, dest)?;
        let page_ref = dest.as_array().ok()?.first()?.as_reference().ok()?;
        self.page_numbers.get(&page_ref).copied()
    }
}

fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Text string or name value of `key`, empty values dropped.
fn dict_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let text = match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_text_simple(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        _ => return None,
    };
    let text = text.trim_matches(char::from(0)).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`). Everything after the year
/// is optional; a missing offset means UTC.
pub fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (stamp, zone) = s.split_at(digits);
    if stamp.len() < 4 {
        return None;
    }

    let field = |range: std::ops::Range<usize>, default: u32| -> Option<u32> {
        match stamp.get(range) {
            Some(v) => v.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = stamp.get(0..4)?.parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, field(4..6, 1)?, field(6..8, 1)?)?.and_hms_opt(
        field(8..10, 0)?,
        field(10..12, 0)?,
        field(12..14, 0)?,
    )?;

    match parse_offset(zone) {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

/// `Z`, `+HH'mm'`, `-HH'mm`, `+HH`.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let mut chars = zone.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let rest: String = chars.filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = rest.get(0..2)?.parse().ok()?;
    let minutes: i32 = rest.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
