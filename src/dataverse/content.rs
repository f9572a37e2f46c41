//! File content policy: which files may be fetched and how they are decoded.

/// Largest file fetched for display (5 MiB); equal sizes are allowed
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Lines shown before the content is cut
pub const MAX_DISPLAY_LINES: usize = 100;

/// Characters shown per line before the line is cut
pub const MAX_LINE_CHARS: usize = 500;

/// Extensions rejected without touching the network
const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".xlsx", ".xls", ".sav", ".dta", ".rdata", ".rds", ".docx", ".doc", ".pptx",
    ".ppt", ".jpg", ".jpeg", ".png", ".gif", ".exe", ".dll", ".bin",
];

/// Why a file was not displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRejection {
    /// Known binary extension
    BinaryFormat,
    /// `content-length` above [`MAX_FILE_BYTES`]
    TooLarge { bytes: u64 },
    /// Access refused by an `ERROR` envelope with code 403
    Restricted,
    /// Any other `ERROR` envelope
    Api { message: String },
    /// Body could not be read as text
    Undecodable,
}

/// Decoded file body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub text: String,
    pub size_bytes: u64,
}

impl FileContent {
    /// Lines split on `\n`; a trailing newline yields a final empty line
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.text.split('\n')
    }

    pub fn total_lines(&self) -> usize {
        self.lines().count()
    }
}

/// Outcome of a file retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFetch {
    Content(FileContent),
    Rejected(FileRejection),
}

/// Whether the filename carries a known binary extension
pub fn is_binary_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Whether a reported size is over the display limit
pub fn exceeds_size_limit(bytes: u64) -> bool {
    bytes > MAX_FILE_BYTES
}

/// Decode as UTF-8, falling back to Latin-1.
///
/// Valid UTF-8 is always accepted. Non-UTF-8 bodies containing NUL bytes are
/// binary in practice and yield `None` instead of a Latin-1 reading.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(_) if bytes.contains(&0) => None,
        Err(_) => Some(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_extensions() {
        assert!(is_binary_filename("survey.sav"));
        assert!(is_binary_filename("REPORT.PDF"));
        assert!(is_binary_filename("model.RData"));
        assert!(!is_binary_filename("survey.csv"));
        assert!(!is_binary_filename("analysis.R"));
        assert!(!is_binary_filename("file"));
    }

    #[test]
    fn test_size_limit_boundary() {
        assert!(!exceeds_size_limit(MAX_FILE_BYTES));
        assert!(exceeds_size_limit(MAX_FILE_BYTES + 1));
        assert_eq!(MAX_FILE_BYTES, 5_242_880);
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("café".as_bytes()).as_deref(), Some("café"));
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "café" in Latin-1
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode_text(&bytes).as_deref(), Some("café"));
    }

    #[test]
    fn test_decode_rejects_binary_with_nul() {
        assert_eq!(decode_text(b"PK\x03\x04\x00\x00\xff\xfe"), None);
    }

    #[test]
    fn test_decode_keeps_utf8_with_nul() {
        assert_eq!(
            decode_text(b"id,name\n1,x\x00\n").as_deref(),
            Some("id,name\n1,x\u{0}\n")
        );
    }

    #[test]
    fn test_line_count_keeps_trailing_empty_line() {
        let content = FileContent {
            text: "a\nb\n".to_string(),
            size_bytes: 4,
        };
        assert_eq!(content.total_lines(), 3);
    }
}
