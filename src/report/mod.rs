//! Text reports for each tool.
//!
//! Renderers turn typed responses (or errors) into the Markdown-flavoured
//! text that is returned to the MCP client. They never fail: every error has
//! a human-readable rendering.

pub mod content;
pub mod files;
pub mod metadata;
pub mod search;

use reqwest::StatusCode;
use serde_json::Value;

use crate::dataverse::DataverseError;

/// `HTTP error occurred` block with the upstream body
///
/// JSON bodies are echoed compactly after `API Response:`, anything else
/// verbatim after `Response:`.
pub(crate) fn http_error_text(status: StatusCode, body: &str) -> String {
    let mut text = format!("HTTP error occurred: {}\n", status.as_u16());
    match serde_json::from_str::<Value>(body) {
        Ok(json) => text.push_str(&format!("API Response: {}\n", json)),
        Err(_) => text.push_str(&format!("Response: {}\n", body)),
    }
    text
}

/// Rendering shared by the search, metadata and file-listing tools.
///
/// `unexpected` prefixes parse failures (`Unexpected error`,
/// `Unexpected error listing files`, ...).
pub(crate) fn common_error_text(err: &DataverseError, unexpected: &str) -> String {
    match err {
        DataverseError::Status { status, body } => http_error_text(*status, body),
        DataverseError::Envelope(status) => format!("Error: API returned status '{}'", status),
        DataverseError::Network(detail) => format!("Request error occurred: {}", detail),
        DataverseError::Parse(detail) | DataverseError::Client(detail) => {
            format!("{}: {}", unexpected, detail)
        }
    }
}
