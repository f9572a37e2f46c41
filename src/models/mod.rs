//! Core data models for Dataverse requests and responses.

mod dataset;
mod search;

pub use dataset::{
    DataFile, DatasetIdentifier, Envelope, FileEntry, FilePage, DEFAULT_FILE_LIMIT,
};
pub use search::{
    ItemType, SearchItem, SearchPage, SearchRequest, SortMode, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
