//! MCP (Model Context Protocol) implementation.

pub mod gateway;
mod handlers;
pub mod server;
mod tools;

pub use server::McpServer;
pub use tools::{Tool, ToolHandler, ToolRegistry};
