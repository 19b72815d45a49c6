//! Text cleanup pass over rendered Markdown.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PAGE_NUMBER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-–—][ \t]*)?\d{1,4}(?:[ \t]*[-–—])?[ \t]*$")
        .expect("valid page number regex")
});
static HYPHENATED_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{Ll})-(?:[ \t]*\n[ \t]*|[ \t]+)(\p{Ll})").expect("valid hyphenation regex")
});
static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid whitespace regex"));
static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid trailing space regex"));

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Cleanup strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// NFC normalization and whitespace only
    Minimal,
    /// Adds ligatures, replacement characters, hyphenation and page numbers
    #[default]
    Standard,
    /// Also drops private-use glyphs and caps blank lines harder
    Aggressive,
}

impl std::str::FromStr for CleanupPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(CleanupPreset::Minimal),
            "standard" => Ok(CleanupPreset::Standard),
            "aggressive" => Ok(CleanupPreset::Aggressive),
            other => Err(format!("unknown cleanup preset: {other}")),
        }
    }
}

/// Options for text cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC
    pub normalize_unicode: bool,
    /// Expand typographic ligatures (ﬁ, ﬂ, ...)
    pub fix_ligatures: bool,
    /// Drop U+FFFD left by undecodable glyphs
    pub remove_replacement_char: bool,
    /// Drop Private Use Area characters
    pub remove_pua: bool,
    /// Rejoin words hyphenated across lines
    pub fix_hyphenation: bool,
    /// Drop lines holding nothing but a page number
    pub remove_page_numbers: bool,
    /// Collapse runs of spaces and strip trailing whitespace
    pub normalize_whitespace: bool,
    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
    /// Leave YAML frontmatter untouched
    pub preserve_frontmatter: bool,
}

impl CleanupOptions {
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: false,
            remove_replacement_char: false,
            remove_pua: false,
            fix_hyphenation: false,
            remove_page_numbers: false,
            normalize_whitespace: true,
            max_consecutive_newlines: 0,
            preserve_frontmatter: true,
        }
    }

    pub fn standard() -> Self {
        Self {
            fix_ligatures: true,
            remove_replacement_char: true,
            fix_hyphenation: true,
            remove_page_numbers: true,
            max_consecutive_newlines: 3,
            ..Self::minimal()
        }
    }

    pub fn aggressive() -> Self {
        Self {
            remove_pua: true,
            max_consecutive_newlines: 2,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Applies [`CleanupOptions`] to a Markdown string.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    pub fn process(&self, text: &str) -> String {
        if self.options.preserve_frontmatter {
            if let Some((frontmatter, body)) = split_frontmatter(text) {
                return format!("{}\n{}", frontmatter, self.process_content(body));
            }
        }
        self.process_content(text)
    }

    fn process_content(&self, text: &str) -> String {
        let opts = &self.options;
        let mut result = if opts.normalize_unicode {
            text.nfc().collect::<String>()
        } else {
            text.to_string()
        };

        if opts.fix_ligatures {
            result = expand_ligatures(&result);
        }
        if opts.remove_replacement_char || opts.remove_pua {
            result = result
                .chars()
                .filter(|&c| !(opts.remove_replacement_char && c == '\u{FFFD}'))
                .filter(|&c| !(opts.remove_pua && is_private_use(c)))
                .collect();
        }
        if opts.remove_page_numbers {
            result = PAGE_NUMBER_LINE.replace_all(&result, "").into_owned();
        }
        if opts.fix_hyphenation {
            result = HYPHENATED_BREAK.replace_all(&result, "$1$2").into_owned();
        }
        if opts.normalize_whitespace {
            result = normalize_whitespace(&result);
        }
        if opts.max_consecutive_newlines > 0 {
            result = limit_newlines(&result, opts.max_consecutive_newlines as usize);
        }

        result.trim().to_string()
    }
}

/// `---\n...\n---\n` at the very start.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;
    let end = rest.find("\n---\n")?;
    let split = 4 + end + 5;
    Some((&text[..split], &text[split..]))
}

fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expansion)) => out.push_str(expansion),
            None => out.push(c),
        }
    }
    out
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

/// Collapse space runs outside table rows; pipe tables keep their padding.
fn normalize_whitespace(text: &str) -> String {
    let text = TRAILING_SPACE.replace_all(text, "");
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with('|') {
                line.to_string()
            } else {
                let indent = line.len() - line.trim_start().len();
                format!("{}{}", &line[..indent], SPACE_RUN.replace_all(&line[indent..], " "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn limit_newlines(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(c);
    }
    out
}
