//! Borealis Dataverse API client.
//!
//! One method per upstream endpoint:
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`DataverseClient::search`] | `GET /search` |
//! | [`DataverseClient::metadata`] | `GET /datasets/:persistentId/metadata` |
//! | [`DataverseClient::list_files`] | `GET /datasets/:persistentId/versions/:latest/files` |
//! | [`DataverseClient::fetch_file`] | `HEAD` + `GET /access/datafile/{id}` |
//!
//! Every request carries `X-Dataverse-key` when a usable key is configured
//! and is repeated once without it after an authentication failure.

pub mod content;
pub mod institutions;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::DataverseConfig;
use crate::models::{DatasetIdentifier, Envelope, FileEntry, FilePage, SearchPage, SearchRequest};
use crate::utils::{AuthRetry, HttpClient};

pub use content::{FileContent, FileFetch, FileRejection};

/// Media type requested from the metadata endpoint
const JSON_LD: &str = "application/ld+json";

/// Errors that can occur when talking to Dataverse
#[derive(Debug, thiserror::Error)]
pub enum DataverseError {
    /// Non-success HTTP status after the optional unauthenticated retry
    #[error("HTTP error occurred: {}", .status.as_u16())]
    Status { status: StatusCode, body: String },

    /// Envelope `status` other than `OK`
    #[error("API returned status '{0}'")]
    Envelope(String),

    /// Connection, DNS or timeout failure
    #[error("Request error occurred: {0}")]
    Network(String),

    /// Body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl DataverseError {
    /// HTTP status, for status errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DataverseError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DataverseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataverseError::Parse(err.to_string())
        } else {
            DataverseError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataverseError {
    fn from(err: serde_json::Error) -> Self {
        DataverseError::Parse(format!("JSON: {}", err))
    }
}

/// Client for a single Dataverse installation
#[derive(Debug, Clone)]
pub struct DataverseClient {
    http: HttpClient,
    api_root: String,
}

impl DataverseClient {
    pub fn new(config: &DataverseConfig) -> Result<Self, DataverseError> {
        url::Url::parse(config.api_root()).map_err(|e| {
            DataverseError::Client(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        let http = HttpClient::new(config).map_err(|e| DataverseError::Client(e.to_string()))?;
        Ok(Self {
            http,
            api_root: config.api_root().to_string(),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Whether requests are sent with an API key
    pub fn is_authenticated(&self) -> bool {
        self.http.has_api_key()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    /// Search datasets, dataverses and files
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage, DataverseError> {
        let envelope = self
            .get_envelope(&self.url("/search"), &request.query_pairs(), None)
            .await?;
        decode_data(envelope.data)
    }

    /// Linked-data metadata document for a dataset
    pub async fn metadata(&self, id: &DatasetIdentifier) -> Result<Value, DataverseError> {
        let (url, query) = match id {
            DatasetIdentifier::Persistent(pid) => (
                self.url("/datasets/:persistentId/metadata"),
                vec![("persistentId".to_string(), pid.clone())],
            ),
            DatasetIdentifier::Numeric(db_id) => {
                (self.url(&format!("/datasets/{}/metadata", db_id)), Vec::new())
            }
        };

        let envelope = self.get_envelope(&url, &query, Some(JSON_LD)).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// One page of the latest version's file listing
    pub async fn list_files(
        &self,
        id: &DatasetIdentifier,
        limit: u64,
        offset: u64,
    ) -> Result<FilePage, DataverseError> {
        let mut query = Vec::new();
        let url = match id {
            DatasetIdentifier::Persistent(pid) => {
                query.push(("persistentId".to_string(), pid.clone()));
                self.url("/datasets/:persistentId/versions/:latest/files")
            }
            DatasetIdentifier::Numeric(db_id) => {
                self.url(&format!("/datasets/{}/versions/:latest/files", db_id))
            }
        };
        query.push(("limit".to_string(), limit.to_string()));
        query.push(("offset".to_string(), offset.to_string()));

        let envelope = self.get_envelope(&url, &query, None).await?;
        let total_count = envelope.total_count;
        let files: Vec<FileEntry> = decode_data(envelope.data)?;
        Ok(FilePage {
            total_count: total_count.unwrap_or(files.len() as u64),
            files,
        })
    }

    /// Fetch a data file for display, applying the extension and size policy
    pub async fn fetch_file(
        &self,
        file_id: &str,
        filename: &str,
    ) -> Result<FileFetch, DataverseError> {
        if content::is_binary_filename(filename) {
            tracing::debug!("Refusing binary file '{}' without a request", filename);
            return Ok(FileFetch::Rejected(FileRejection::BinaryFormat));
        }

        let url = self.url(&format!("/access/datafile/{}", file_id));

        let head = self.http.head(&url).await?;
        if let Some(bytes) = declared_length(&head) {
            if content::exceeds_size_limit(bytes) {
                tracing::debug!("File {} is {} bytes, over the display limit", file_id, bytes);
                return Ok(FileFetch::Rejected(FileRejection::TooLarge { bytes }));
            }
        }

        let response = self
            .http
            .get(&url, &[], None, AuthRetry::OnUnauthorizedOrForbidden)
            .await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let (body, overflowed) = read_capped(response, content::MAX_FILE_BYTES).await?;

        if is_json {
            if let Ok(envelope) = serde_json::from_slice::<Envelope<Value>>(&body) {
                if envelope.is_error() {
                    let code = envelope.code.unwrap_or(status.as_u16());
                    tracing::debug!("File {} returned error envelope with code {}", file_id, code);
                    let rejection = if code == 403 {
                        FileRejection::Restricted
                    } else {
                        FileRejection::Api {
                            message: envelope
                                .message
                                .unwrap_or_else(|| "Unknown error".to_string()),
                        }
                    };
                    return Ok(FileFetch::Rejected(rejection));
                }
            }
        }

        if !status.is_success() {
            return Err(DataverseError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        if overflowed {
            let bytes = body.len() as u64;
            tracing::debug!("File {} passed the display limit while downloading", file_id);
            return Ok(FileFetch::Rejected(FileRejection::TooLarge { bytes }));
        }

        Ok(match content::decode_text(&body) {
            Some(text) => FileFetch::Content(FileContent {
                text,
                size_bytes: body.len() as u64,
            }),
            None => FileFetch::Rejected(FileRejection::Undecodable),
        })
    }

    async fn get_envelope(
        &self,
        url: &str,
        query: &[(String, String)],
        accept: Option<&'static str>,
    ) -> Result<Envelope<Value>, DataverseError> {
        let response = self
            .http
            .get(url, query, accept, AuthRetry::OnUnauthorized)
            .await?;
        let response = error_for_status(response).await?;
        let body = response.bytes().await?;
        let envelope: Envelope<Value> = serde_json::from_slice(&body)?;

        if !envelope.is_ok() {
            let status = envelope.status.unwrap_or_else(|| "None".to_string());
            tracing::warn!("Dataverse returned status '{}' for {}", status, url);
            return Err(DataverseError::Envelope(status));
        }

        Ok(envelope)
    }
}

/// Read a body chunk by chunk, stopping as soon as it grows past `limit`
async fn read_capped(
    mut response: Response,
    limit: u64,
) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() as u64 > limit {
            return Ok((body, true));
        }
    }
    Ok((body, false))
}

/// Turn a non-success response into [`DataverseError::Status`]
async fn error_for_status(response: Response) -> Result<Response, DataverseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Dataverse returned {}: {}", status, body);
    Err(DataverseError::Status { status, body })
}

/// `content-length` as sent by the server (not the body size hint)
fn declared_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn decode_data<T: DeserializeOwned + Default>(data: Option<Value>) -> Result<T, DataverseError> {
    match data {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}
