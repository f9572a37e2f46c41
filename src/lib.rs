//! # Borealis MCP
//!
//! A Model Context Protocol (MCP) server for the Borealis Dataverse, the
//! Canadian research data repository.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Request and response types (SearchRequest, DatasetIdentifier, etc.)
//! - [`dataverse`]: API client, institution names and the file content policy
//! - [`report`]: Text rendering of API responses and errors
//! - [`operations`]: The four tool operations, shared by MCP and the CLI
//! - [`mcp`]: MCP protocol implementation, server and HTTP gateway
//! - [`utils`]: HTTP client and formatting helpers
//! - [`config`]: Configuration management

pub mod config;
pub mod dataverse;
pub mod mcp;
pub mod models;
pub mod operations;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use dataverse::{DataverseClient, DataverseError};
pub use models::{DatasetIdentifier, SearchRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
