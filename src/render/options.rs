//! Rendering options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

use super::{CleanupOptions, CleanupPreset};

/// Options for rendering a document to Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Deepest heading level emitted (1-6)
    pub max_heading_level: u8,

    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// Marker for bullet list items
    pub list_marker: char,

    /// Escape Markdown special characters in extracted text
    pub escape_special_chars: bool,

    /// Text cleanup pass applied to the rendered output
    pub cleanup: Option<CleanupOptions>,

    /// Pages to render
    pub page_selection: PageSelection,

    /// Count blocks, words and characters while rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level (clamped to 1-6).
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            include_frontmatter: false,
            list_marker: '-',
            escape_special_chars: true,
            cleanup: None,
            page_selection: PageSelection::All,
            collect_stats: false,
        }
    }
}

/// Page selection, 1-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    /// Inclusive range
    Range(RangeInclusive<u32>),
    /// Sorted, non-overlapping inclusive ranges
    Pages(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Lowest selected page, `None` for [`PageSelection::All`].
    pub fn first_page(&self) -> Option<u32> {
        match self {
            PageSelection::All => None,
            PageSelection::Range(range) => Some(*range.start()),
            PageSelection::Pages(ranges) => ranges.first().map(|r| *r.start()),
        }
    }

    /// Parse `all`, `3`, `1-10` or `1,3,5-7`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());
        let page = |p: &str| -> Result<u32> {
            match p.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };
        let range = |part: &str| -> Result<RangeInclusive<u32>> {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (page(start)?, page(end)?);
                    if start > end {
                        return Err(invalid());
                    }
                    Ok(start..=end)
                }
                None => {
                    let p = page(part)?;
                    Ok(p..=p)
                }
            }
        };

        if !s.contains(',') && s.contains('-') {
            return Ok(PageSelection::Range(range(s)?));
        }

        let mut parts = s.split(',').map(range).collect::<Result<Vec<_>>>()?;
        parts.sort_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(parts.len());
        for part in parts {
            match merged.last_mut() {
                Some(last) if *part.start() <= last.end().saturating_add(1) => {
                    let end = (*last.end()).max(*part.end());
                    *last = *last.start()..=end;
                }
                _ => merged.push(part),
            }
        }
        Ok(PageSelection::Pages(merged))
    }
}

impl std::str::FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
