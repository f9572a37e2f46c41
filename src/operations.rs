//! The four Dataverse operations, from parsed arguments to rendered text.
//!
//! Shared by the MCP tool handlers and the one-shot CLI commands. Every
//! outcome, including upstream failures, is turned into a text report.

use crate::dataverse::DataverseClient;
use crate::models::{DatasetIdentifier, SearchRequest};
use crate::report;

const MISSING_IDENTIFIER: &str = "Error: No dataset identifier provided.";
const MISSING_FILE_ID: &str = "Error: No file ID provided. Use list_dataset_files to get file IDs.";

/// Search datasets, dataverses and files
pub async fn search_datasets(client: &DataverseClient, request: &SearchRequest) -> String {
    tracing::info!(
        "search_datasets q={:?} per_page={} subtree={:?}",
        request.query,
        request.per_page,
        request.subtree
    );

    match client.search(request).await {
        Ok(page) => {
            tracing::debug!(
                "search returned {} of {} results",
                page.items.len(),
                page.total_count
            );
            report::search::render(&request.query, &page)
        }
        Err(e) => {
            tracing::warn!("search failed: {}", e);
            report::search::render_error(&e)
        }
    }
}

/// Detailed metadata for one dataset
pub async fn get_dataset_metadata(client: &DataverseClient, identifier: &str) -> String {
    let Some(id) = DatasetIdentifier::parse(identifier) else {
        return MISSING_IDENTIFIER.to_string();
    };
    tracing::info!("get_dataset_metadata id={}", id);

    match client.metadata(&id).await {
        Ok(metadata) => report::metadata::render(&metadata),
        Err(e) => {
            tracing::warn!("metadata lookup for {} failed: {}", id, e);
            report::metadata::render_error(&id, &e)
        }
    }
}

/// One page of a dataset's files, optionally filtered by name or type
pub async fn list_dataset_files(
    client: &DataverseClient,
    identifier: &str,
    limit: u64,
    offset: u64,
    file_type: Option<&str>,
) -> String {
    let Some(id) = DatasetIdentifier::parse(identifier) else {
        return MISSING_IDENTIFIER.to_string();
    };
    let filter = file_type.map(str::trim).filter(|f| !f.is_empty());
    tracing::info!(
        "list_dataset_files id={} limit={} offset={} filter={:?}",
        id,
        limit,
        offset,
        filter
    );

    match client.list_files(&id, limit, offset).await {
        Ok(page) => {
            let page = page.filtered(filter);
            report::files::render(&page, report::files::Window { limit, offset }, filter)
        }
        Err(e) => {
            tracing::warn!("file listing for {} failed: {}", id, e);
            report::files::render_error(&id, &e)
        }
    }
}

/// Text content of one data file
pub async fn get_dataset_file(client: &DataverseClient, file_id: &str, filename: &str) -> String {
    let file_id = file_id.trim();
    if file_id.is_empty() {
        return MISSING_FILE_ID.to_string();
    }
    tracing::info!("get_dataset_file id={} name={}", file_id, filename);

    match client.fetch_file(file_id, filename).await {
        Ok(fetch) => report::content::render(file_id, filename, &fetch),
        Err(e) => {
            tracing::warn!("file {} retrieval failed: {}", file_id, e);
            report::content::render_error(file_id, filename, &e)
        }
    }
}
