//! Utility modules supporting Dataverse operations.
//!
//! - [`HttpClient`]: reqwest client that attaches `X-Dataverse-key` and retries
//!   once without it after an authentication failure
//! - [`AuthRetry`]: which statuses trigger that retry
//! - [`format_size`], [`format_authors`], [`format_date`] and friends: text
//!   helpers used by the report renderers
//!
//! # Unauthenticated fallback
//!
//! ```rust,no_run
//! use borealis_mcp::config::DataverseConfig;
//! use borealis_mcp::utils::{AuthRetry, HttpClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DataverseConfig::default().api_key("xxxxxxxx-xxxx-xxxx");
//! let client = HttpClient::new(&config)?;
//! let query = vec![("q".to_string(), "climate".to_string())];
//! let response = client
//!     .get("https://borealisdata.ca/api/search", &query, None, AuthRetry::OnUnauthorized)
//!     .await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

mod display;
mod http;
mod retry;

pub use display::{
    format_authors, format_date, format_size, format_thousands, strip_html, truncate_chars,
};
pub use http::{HttpClient, API_KEY_HEADER};
pub use retry::AuthRetry;
