//! Search result report.


use super::common_error_text;
use crate::dataverse::DataverseError;
use crate::models::{SearchItem, SearchPage};
use crate::utils::{format_authors, format_date, truncate_chars};

/// Item descriptions are cut to this many characters
const DESCRIPTION_CHARS: usize = 150;

/// Render a page of search results for `query`
pub fn render(query: &str, page: &SearchPage) -> String {
    if page.total_count == 0 {
        return format!("No results found for query: '{}'", query);
    }

    let shown = page.items.len();
    let mut out = format!("Found {} results for '{}'\n", page.total_count, query);
    out.push_str(&format!("Showing {} results:\n\n", shown));

    for (idx, item) in page.items.iter().enumerate() {
        render_item(&mut out, idx + 1, item);
    }

    if page.total_count > shown as u64 {
        out.push_str(&format!(
            "(Showing {} of {} total results. Adjust 'per_page' parameter to see more results.)\n",
            shown, page.total_count
        ));
    }

    out
}

fn render_item(out: &mut String, idx: usize, item: &SearchItem) {
    let name = item.name.as_deref().unwrap_or("Untitled");
    let kind = item.kind.as_deref().unwrap_or("unknown");
    let url = item.url.as_deref().unwrap_or_default();
    let description = truncate_chars(
        item.description
            .as_deref()
            .unwrap_or("No description available"),
        DESCRIPTION_CHARS,
        "...",
    );

    out.push_str(&format!("{}. **{}**\n", idx, name));
    out.push_str(&format!("   Type: {}\n", kind));

    if item.is_dataset() {
        let doi = match item.global_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => doi_url(id),
            None => url.to_string(),
        };
        out.push_str(&format!("   DOI: {}\n", doi));
        out.push_str(&format!("   Authors: {}\n", format_authors(&item.authors)));
        out.push_str(&format!(
            "   Date: {}\n",
            format_date(item.published_at.as_deref().unwrap_or_default())
        ));
        out.push_str(&format!("   Description: {}\n", description));
    } else {
        if !url.is_empty() {
            out.push_str(&format!("   URL: {}\n", url));
        }
        out.push_str(&format!("   Description: {}\n", description));
    }

    out.push('\n');
}

/// Resolver URL for a persistent identifier
fn doi_url(global_id: &str) -> String {
    if global_id.starts_with("http") {
        global_id.to_string()
    } else {
        format!("https://doi.org/{}", global_id.replace("doi:", ""))
    }
}

/// Render a failed search
pub fn render_error(err: &DataverseError) -> String {
    let mut text = common_error_text(err, "Unexpected error");
    if matches!(err, DataverseError::Status { .. }) {
        text.push_str("\nNote: Searches of published datasets don't require authentication.");
    }
    text
}
