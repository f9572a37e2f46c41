//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::dataverse::DataverseClient;
use crate::models::{DEFAULT_FILE_LIMIT, DEFAULT_PER_PAGE, MAX_PER_PAGE};

use super::handlers::{
    GetDatasetFileHandler, GetDatasetMetadataHandler, ListDatasetFilesHandler,
    SearchDatasetsHandler,
};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "search_datasets")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry holding the four Dataverse tools
    pub fn from_client(client: Arc<DataverseClient>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        registry.register_dataverse_tools(&client);
        registry
    }

    fn register_dataverse_tools(&mut self, client: &Arc<DataverseClient>) {
        // 1. search_datasets - full-text search with filters
        self.register(Tool {
            name: "search_datasets".to_string(),
            description: "Search for datasets in the Borealis Dataverse repository. \
                Use this when the user asks to find research data by topic, keyword, \
                institution or location."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query (keywords, title words, author names). Use '*' to match everything."
                    },
                    "per_page": {
                        "type": "integer",
                        "description": format!("Number of results to return (max {})", MAX_PER_PAGE),
                        "default": DEFAULT_PER_PAGE
                    },
                    "sort": {
                        "type": "string",
                        "description": "Sort order: 'relevance', 'date' (newest first) or 'name' (A-Z)",
                        "enum": ["relevance", "date", "name"],
                        "default": "relevance"
                    },
                    "type": {
                        "type": "string",
                        "description": "Restrict results to one kind of item",
                        "enum": ["dataset", "dataverse", "file"]
                    },
                    "dataverse": {
                        "type": "string",
                        "description": "Institution or dataverse to search within (e.g., 'University of Toronto', 'UBC', 'toronto')"
                    },
                    "country": {
                        "type": "string",
                        "description": "Geographic coverage: country (e.g., 'Canada')"
                    },
                    "province": {
                        "type": "string",
                        "description": "Geographic coverage: province or state (e.g., 'Ontario')"
                    },
                    "city": {
                        "type": "string",
                        "description": "Geographic coverage: city (e.g., 'Toronto')"
                    }
                },
                "required": ["query"]
            }),
            handler: Arc::new(SearchDatasetsHandler {
                client: client.clone(),
            }),
        });

        // 2. get_dataset_metadata - JSON-LD metadata of a single dataset
        self.register(Tool {
            name: "get_dataset_metadata".to_string(),
            description: "Retrieve detailed metadata for a specific dataset: full description, \
                authors, keywords, subjects, license and contact."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "identifier": {
                        "type": "string",
                        "description": "Dataset DOI ('doi:10.5683/SP3/ABC123' or 'https://doi.org/10.5683/SP3/ABC123') or numeric database ID. DOIs are preferred."
                    }
                },
                "required": ["identifier"]
            }),
            handler: Arc::new(GetDatasetMetadataHandler {
                client: client.clone(),
            }),
        });

        // 3. list_dataset_files - paged file listing
        self.register(Tool {
            name: "list_dataset_files".to_string(),
            description: "List the files in a dataset with names, sizes, formats, descriptions \
                and access restrictions."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "identifier": {
                        "type": "string",
                        "description": "Dataset DOI or numeric database ID"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of files to return",
                        "default": DEFAULT_FILE_LIMIT
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Number of files to skip (for pagination)",
                        "default": 0
                    },
                    "file_type": {
                        "type": "string",
                        "description": "Filter by file type or filename substring (e.g., 'csv', 'readme', 'spss')"
                    }
                },
                "required": ["identifier"]
            }),
            handler: Arc::new(ListDatasetFilesHandler {
                client: client.clone(),
            }),
        });

        // 4. get_dataset_file - text content of one file
        self.register(Tool {
            name: "get_dataset_file".to_string(),
            description: "Retrieve the content of a text-based data file (CSV, TXT, R, Python, ...) \
                under 5MB. Content longer than 100 lines is truncated."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "file_id": {
                        "type": ["string", "integer"],
                        "description": "Numeric file ID from list_dataset_files (e.g., '276461')"
                    },
                    "filename": {
                        "type": "string",
                        "description": "Filename, used to reject binary formats and in messages",
                        "default": "file"
                    }
                },
                "required": ["file_id"]
            }),
            handler: Arc::new(GetDatasetFileHandler {
                client: client.clone(),
            }),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}
