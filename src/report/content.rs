//! File content report.

use reqwest::StatusCode;

use crate::dataverse::content::{MAX_DISPLAY_LINES, MAX_LINE_CHARS};
use crate::dataverse::{DataverseError, FileContent, FileFetch, FileRejection};
use crate::utils::{format_thousands, truncate_chars};

/// Render the outcome of a file retrieval
pub fn render(file_id: &str, filename: &str, fetch: &FileFetch) -> String {
    match fetch {
        FileFetch::Content(content) => render_content(file_id, filename, content),
        FileFetch::Rejected(rejection) => render_rejection(filename, rejection),
    }
}

/// Header, truncation note and numbered lines
pub fn render_content(file_id: &str, filename: &str, content: &FileContent) -> String {
    let total = content.total_lines();
    let truncated = total > MAX_DISPLAY_LINES;

    let mut out = format!("# File: {}\n\n", filename);
    out.push_str(&format!("**File ID:** {}\n", file_id));
    out.push_str(&format!("**Total lines:** {}\n", format_thousands(total as u64)));
    out.push_str(&format!(
        "**File size:** {} bytes ({:.1} KB)\n\n",
        format_thousands(content.size_bytes),
        content.size_bytes as f64 / 1024.0
    ));

    if truncated {
        out.push_str(&format!(
            "⚠️ **Note:** File truncated to first {} lines for display (file has {} total lines)\n\n",
            MAX_DISPLAY_LINES,
            format_thousands(total as u64)
        ));
    }
    out.push_str("---\n\n");

    for (idx, line) in content.lines().take(MAX_DISPLAY_LINES).enumerate() {
        let line = truncate_chars(line, MAX_LINE_CHARS, "... (line truncated)");
        out.push_str(&format!("{:4} | {}\n", idx + 1, line));
    }

    if truncated {
        out.push_str(&format!(
            "\n... ({} more lines not shown)",
            format_thousands((total - MAX_DISPLAY_LINES) as u64)
        ));
    }

    out
}

/// Explain why a file was not displayed
pub fn render_rejection(filename: &str, rejection: &FileRejection) -> String {
    match rejection {
        FileRejection::BinaryFormat => format!(
            "⚠️ Cannot retrieve '{}' - Binary file format not supported.\n\n\
             This tool only supports text-based files (CSV, TXT, DAT, R, Python, etc.) \
             that can be displayed in chat. Binary files like PDF, Excel, ZIP, and SPSS \
             data files (.sav) must be downloaded separately through the Borealis website.",
            filename
        ),
        FileRejection::TooLarge { bytes } => format!(
            "⚠️ Cannot retrieve '{}' - File too large ({:.1} MB)\n\n\
             This tool has a 5MB maximum file size limit because large data files \
             are not suitable for display in chat. For large datasets, please download \
             the file directly from the Borealis website for analysis in statistical \
             software or data analysis tools.",
            filename,
            *bytes as f64 / (1024.0 * 1024.0)
        ),
        FileRejection::Restricted => format!(
            "🔒 Cannot access '{}' - File is restricted\n\n\
             This file requires specific access permissions that cannot be \
             granted through the API. To access restricted files, you may need to:\n\
             1. Request access from the dataset owner through the Borealis website\n\
             2. Verify you're affiliated with the authorized institution\n\
             3. Accept any terms of use or data use agreements",
            filename
        ),
        FileRejection::Api { message } => format!("Error accessing file: {}", message),
        FileRejection::Undecodable => format!(
            "⚠️ Cannot display '{}' - File appears to be binary or uses an unsupported encoding.\n\n\
             This file cannot be decoded as text. It may be a binary file or use a non-standard \
             text encoding. Please download it directly from Borealis to examine with appropriate software.",
            filename
        ),
    }
}

/// Render a failed retrieval
pub fn render_error(file_id: &str, filename: &str, err: &DataverseError) -> String {
    match err {
        DataverseError::Status { status, .. } if *status == StatusCode::NOT_FOUND => format!(
            "File not found (ID: {}). Please check the file ID from list_dataset_files.",
            file_id
        ),
        DataverseError::Status { status, .. } if *status == StatusCode::FORBIDDEN => format!(
            "🔒 Access denied to '{}'. This file is restricted and requires special permissions.",
            filename
        ),
        DataverseError::Status { status, .. } => {
            format!("HTTP error {} while accessing file.", status.as_u16())
        }
        DataverseError::Network(detail) => format!("Network error occurred: {}", detail),
        other => format!("Unexpected error retrieving file: {}", other),
    }
}
