//! Tool handlers: argument parsing on top of [`crate::operations`].
//!
//! Clients are loose about argument types, so numbers are accepted either as
//! JSON numbers or as numeric strings, and file ids as either.

use std::sync::Arc;

use serde_json::Value;

use super::tools::ToolHandler;
use crate::dataverse::{institutions, DataverseClient};
use crate::models::{ItemType, SearchRequest, SortMode, DEFAULT_FILE_LIMIT, DEFAULT_PER_PAGE};
use crate::operations;

/// Non-blank string argument
fn arg_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Integer argument given as a number or a numeric string
fn arg_int(args: &Value, key: &str) -> Option<i64> {
    match args.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Identifier argument given as a string or a number
fn arg_id(args: &Value, key: &str) -> String {
    match args.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Build a search request from tool arguments
pub(crate) fn search_request(args: &Value) -> SearchRequest {
    let per_page = arg_int(args, "per_page").unwrap_or(DEFAULT_PER_PAGE as i64);
    let mut request = SearchRequest::new(arg_str(args, "query").unwrap_or_default())
        .per_page(per_page.max(0) as usize);

    if let Some(sort) = arg_str(args, "sort") {
        request = request.sort(SortMode::parse(sort));
    }

    if let Some(kind) = arg_str(args, "type") {
        match ItemType::parse(kind) {
            Some(item_type) => request = request.item_type(item_type),
            None => tracing::debug!("Ignoring unknown search type '{}'", kind),
        }
    }

    if let Some(dataverse) = arg_str(args, "dataverse") {
        request = request.subtree(institutions::resolve(dataverse));
    }

    if let Some(country) = arg_str(args, "country") {
        request = request.country(country);
    }
    if let Some(province) = arg_str(args, "province").or_else(|| arg_str(args, "state")) {
        request = request.province(province);
    }
    if let Some(city) = arg_str(args, "city") {
        request = request.city(city);
    }

    request
}

/// Handler for `search_datasets`
#[derive(Debug)]
pub struct SearchDatasetsHandler {
    pub client: Arc<DataverseClient>,
}

#[async_trait::async_trait]
impl ToolHandler for SearchDatasetsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request = search_request(&args);
        let text = operations::search_datasets(&self.client, &request).await;
        Ok(Value::String(text))
    }
}

/// Handler for `get_dataset_metadata`
#[derive(Debug)]
pub struct GetDatasetMetadataHandler {
    pub client: Arc<DataverseClient>,
}

#[async_trait::async_trait]
impl ToolHandler for GetDatasetMetadataHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let identifier = arg_id(&args, "identifier");
        let text = operations::get_dataset_metadata(&self.client, &identifier).await;
        Ok(Value::String(text))
    }
}

/// Handler for `list_dataset_files`
#[derive(Debug)]
pub struct ListDatasetFilesHandler {
    pub client: Arc<DataverseClient>,
}

#[async_trait::async_trait]
impl ToolHandler for ListDatasetFilesHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let identifier = arg_id(&args, "identifier");
        let limit = arg_int(&args, "limit")
            .unwrap_or(DEFAULT_FILE_LIMIT as i64)
            .max(1) as u64;
        let offset = arg_int(&args, "offset").unwrap_or(0).max(0) as u64;
        let file_type = arg_str(&args, "file_type");

        let text =
            operations::list_dataset_files(&self.client, &identifier, limit, offset, file_type)
                .await;
        Ok(Value::String(text))
    }
}

/// Handler for `get_dataset_file`
#[derive(Debug)]
pub struct GetDatasetFileHandler {
    pub client: Arc<DataverseClient>,
}

#[async_trait::async_trait]
impl ToolHandler for GetDatasetFileHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let file_id = arg_id(&args, "file_id");
        let filename = arg_str(&args, "filename").unwrap_or("file");
        let text = operations::get_dataset_file(&self.client, &file_id, filename).await;
        Ok(Value::String(text))
    }
}
