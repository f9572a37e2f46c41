//! Dataset file listing report.


use super::common_error_text;
use crate::dataverse::DataverseError;
use crate::models::{DatasetIdentifier, FileEntry, FilePage};
use crate::utils::format_size;

/// Paging window the listing was requested with
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

/// Render one (possibly filtered) page of files
pub fn render(page: &FilePage, window: Window, filter: Option<&str>) -> String {
    if page.files.is_empty() {
        return match filter {
            Some(f) => format!("No files found matching '{}' in this dataset.", f),
            None => "No files found in this dataset.".to_string(),
        };
    }

    let shown = page.files.len() as u64;
    let total = page.total_count;
    let mut out = String::from("# Dataset Files\n\n");

    match filter {
        Some(f) => {
            out.push_str(&format!("**Showing:** Files matching '{}'\n", f));
            out.push_str(&format!("**Results:** {} file(s) found\n", shown));
        }
        None => {
            out.push_str(&format!("**Total files in dataset:** {}\n", total));
            if total > window.limit {
                out.push_str(&format!(
                    "**Showing:** {}-{} of {}\n",
                    window.offset + 1,
                    (window.offset + shown).min(total),
                    total
                ));
            }
        }
    }
    out.push('\n');

    for (idx, entry) in page.files.iter().enumerate() {
        render_entry(&mut out, window.offset + idx as u64 + 1, entry);
    }

    if filter.is_none() && total > window.offset + shown {
        let remaining = total - (window.offset + shown);
        out.push_str(&format!(
            "\n*There are {} more file(s) in this dataset. To see more, ask to show the next files or specify a larger limit.*\n",
            remaining
        ));
    }

    out
}

fn render_entry(out: &mut String, number: u64, entry: &FileEntry) {
    let data_file = &entry.data_file;

    out.push_str(&format!("## {}. {}\n", number, entry.filename()));
    if let Some(description) = entry.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("**Description:** {}\n", description));
    }
    out.push_str(&format!("**Type:** {}\n", entry.friendly_type()));
    out.push_str(&format!("**Size:** {}\n", format_size(data_file.filesize)));
    out.push_str(&format!(
        "**File ID:** {}\n",
        data_file.id.map(|id| id.to_string()).unwrap_or_default()
    ));
    if entry.restricted {
        out.push_str("**Access:** Restricted (authentication required)\n");
    } else {
        out.push_str("**Access:** Public\n");
    }
    if let Some(md5) = data_file.md5.as_deref().filter(|m| !m.is_empty()) {
        out.push_str(&format!("**MD5 Checksum:** {}\n", md5));
    }
    out.push('\n');
}

/// Render a failed listing
pub fn render_error(id: &DatasetIdentifier, err: &DataverseError) -> String {
    if err.status() == Some(reqwest::StatusCode::NOT_FOUND) {
        return format!(
            "Dataset not found: {}\nPlease check the DOI or dataset ID and try again.",
            id
        );
    }
    common_error_text(err, "Unexpected error listing files")
}
