//! Configuration management.
//!
//! Settings are layered: serde defaults, then an optional TOML file, then
//! `BOREALIS__<SECTION>__<KEY>` environment variables, then the short legacy variables
//! (`BOREALIS_API_KEY`, `AUTH_TOKENS`, `HOST`, `PORT`, `MCP_TRANSPORT`) that
//! deployments already set.
//!
//! # Configuration File Format
//!
//! ```toml
//! [dataverse]
//! base_url = "https://borealisdata.ca/api"
//! api_key = "your-api-key"
//! timeout_secs = 30
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! transport = "auto"
//!
//! [auth]
//! tokens = ["token1", "token2"]
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Borealis API root
pub const DEFAULT_BASE_URL: &str = "https://borealisdata.ca/api";

/// Keys this short are treated as placeholders and never sent upstream
const MIN_API_KEY_LEN: usize = 10;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream Dataverse settings
    #[serde(default)]
    pub dataverse: DataverseConfig,

    /// Transport settings for `serve`
    #[serde(default)]
    pub server: ServerConfig,

    /// Bearer tokens for the HTTP transport
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataverseConfig {
    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional `X-Dataverse-key` secret
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for DataverseConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl DataverseConfig {
    /// Configuration pointing at a custom API root (used by tests and mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// The API key, if one is configured and plausibly well-formed
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| key.len() > MIN_API_KEY_LEN)
    }

    /// Base URL without a trailing slash
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// stdio when stdin is piped, HTTP otherwise
    #[default]
    Auto,
    Stdio,
    Http,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Transport::Auto),
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(format!("unknown transport '{}'", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub transport: Transport,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            transport: Transport::Auto,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Bearer-token configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl AuthConfig {
    /// Non-empty, trimmed tokens
    pub fn token_set(&self) -> HashSet<String> {
        self.tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix("BOREALIS").separator("__"))
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    apply_legacy_env(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Find a config file in the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("borealis-mcp").join("config.toml");
    path.is_file().then_some(path)
}

/// Apply the flat environment variables used by existing deployments
fn apply_legacy_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(key) = var("BOREALIS_API_KEY").filter(|k| !k.is_empty()) {
        config.dataverse.api_key = Some(key);
    }

    if let Some(tokens) = var("AUTH_TOKENS").filter(|t| !t.is_empty()) {
        config.auth.tokens = tokens.split(',').map(|t| t.trim().to_string()).collect();
    }

    if let Some(host) = var("HOST").filter(|h| !h.is_empty()) {
        config.server.host = host;
    }

    if let Some(port) = var("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("Ignoring invalid PORT value '{}'", port),
        }
    }

    if let Some(transport) = var("MCP_TRANSPORT") {
        match transport.parse() {
            Ok(transport) => config.server.transport = transport,
            Err(e) => tracing::warn!("Ignoring MCP_TRANSPORT: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataverse.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.dataverse.timeout(), Duration::from_secs(30));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.transport, Transport::Auto);
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn test_usable_api_key_requires_minimum_length() {
        let short = DataverseConfig::default().api_key("abc");
        assert_eq!(short.usable_api_key(), None);

        let exact = DataverseConfig::default().api_key("0123456789");
        assert_eq!(exact.usable_api_key(), None);

        let good = DataverseConfig::default().api_key("0123456789a");
        assert_eq!(good.usable_api_key(), Some("0123456789a"));

        assert_eq!(DataverseConfig::default().usable_api_key(), None);
    }

    #[test]
    fn test_api_root_strips_trailing_slash() {
        let config = DataverseConfig::with_base_url("http://localhost:1234/api/");
        assert_eq!(config.api_root(), "http://localhost:1234/api");
    }

    #[test]
    fn test_legacy_env_overrides() {
        let mut config = Config::default();
        apply_legacy_env(
            &mut config,
            env(&[
                ("BOREALIS_API_KEY", "secret-key-12345"),
                ("AUTH_TOKENS", "one, two,,three"),
                ("HOST", "127.0.0.1"),
                ("PORT", "9000"),
                ("MCP_TRANSPORT", "stdio"),
            ]),
        );

        assert_eq!(
            config.dataverse.api_key.as_deref(),
            Some("secret-key-12345")
        );
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.transport, Transport::Stdio);

        let tokens = config.auth.token_set();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.contains("two"));
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        apply_legacy_env(&mut config, env(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_transport_parse() {
        assert_eq!("HTTP".parse::<Transport>(), Ok(Transport::Http));
        assert_eq!(" auto ".parse::<Transport>(), Ok(Transport::Auto));
        assert!("carrier-pigeon".parse::<Transport>().is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[dataverse]
base_url = "http://localhost:8080/api"
timeout_secs = 5

[server]
port = 3100
transport = "http"

[auth]
tokens = ["alpha", "beta"]
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.dataverse.base_url, "http://localhost:8080/api");
        assert_eq!(config.dataverse.timeout_secs, 5);
        assert_eq!(config.auth.tokens, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_load_config_nonexistent_file() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }
}
