//! Text formatting helpers shared by the report renderers.

use regex::Regex;
use std::sync::OnceLock;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Render a byte count in the largest unit not exceeding it.
///
/// # Examples
///
/// ```
/// use borealis_mcp::utils::format_size;
///
/// assert_eq!(format_size(0), "0 bytes");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{} bytes", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

/// Author list: all names when three or fewer, otherwise the first plus "et al."
pub fn format_authors(authors: &[String]) -> String {
    match authors {
        [] => "No authors listed".to_string(),
        [first, _, _, _, ..] => format!("{} et al.", first),
        _ => authors.join(", "),
    }
}

/// Year portion of an ISO-ish date string
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return "No date available".to_string();
    }
    date.chars().take(4).collect()
}

/// Cut `text` to `max_chars` characters, appending `suffix` when cut
pub fn truncate_chars(text: &str, max_chars: usize, suffix: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &text[..idx], suffix),
        None => text.to_string(),
    }
}

/// Remove HTML tags, keeping the text between them
pub fn strip_html(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
    tag.replace_all(text, "").into_owned()
}

/// Integer with thousands separators (`12,345`)
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
