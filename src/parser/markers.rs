//! List marker recognition shared by layout and table detection.

use crate::model::ListInfo;

const BULLETS: &[&str] = &[
    "-", "–", "—", "•", "·", "*", "○", "▪", "◦", "▸", "▹", "►", "■", "●", "※", "□", "◆", "◇",
    "▶", "▷", "➤", "➜",
];

/// Whether `text` is a bare bullet glyph.
pub fn is_bullet_marker(text: &str) -> bool {
    BULLETS.contains(&text.trim())
}

/// Whether `text` is a bare ordinal marker: `1.`, `12)`, `a.`, `B)` or a
/// lone number.
pub fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (digits, suffix) = cleaned.split_at(pos);
        if !digits.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}

/// Split a leading list marker off a line of text.
///
/// Recognizes a bullet glyph or a 1-3 digit ordinal followed by `.` or `)`,
/// in both cases followed by whitespace. Returns the list info and the
/// remaining text.
pub fn parse_list_marker(text: &str) -> Option<(ListInfo, &str)> {
    let text = text.trim_start();
    let (marker, rest) = text.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }

    if BULLETS.contains(&marker) {
        return Some((ListInfo::bullet(), rest));
    }

    let digits = marker.strip_suffix(|c: char| c == '.' || c == ')')?;
    if (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        let number = digits.parse().ok()?;
        return Some((ListInfo::numbered(number), rest));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListStyle;

    #[test]
    fn test_bare_markers() {
        assert!(is_number_marker("1."));
        assert!(is_number_marker("12."));
        assert!(is_number_marker("1)"));
        assert!(is_number_marker("1 ."));
        assert!(is_number_marker("3"));
        assert!(is_number_marker("a."));
        assert!(is_number_marker("B)"));
        assert!(is_bullet_marker("-"));
        assert!(is_bullet_marker(" • "));

        assert!(!is_number_marker("Name"));
        assert!(!is_number_marker(""));
        assert!(!is_bullet_marker("Alice"));
    }

    #[test]
    fn test_parse_bullet_line() {
        let (info, rest) = parse_list_marker("• Install the tool").unwrap();
        assert_eq!(info.style, ListStyle::Bullet);
        assert_eq!(rest, "Install the tool");
    }

    #[test]
    fn test_parse_numbered_line() {
        let (info, rest) = parse_list_marker("2) Run it").unwrap();
        assert_eq!(info.number, Some(2));
        assert_eq!(rest, "Run it");
    }

    #[test]
    fn test_plain_text_is_not_a_list() {
        assert!(parse_list_marker("The year 2024. was long").is_none());
        assert!(parse_list_marker("1999. A year").is_none());
        assert!(parse_list_marker("-").is_none());
        assert!(parse_list_marker("Plain sentence").is_none());
    }
}
