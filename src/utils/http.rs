//! HTTP client utilities.

use reqwest::header::{HeaderValue, ACCEPT, ACCEPT_ENCODING};
use reqwest::{Client, Method, Response};
use std::sync::Arc;
use std::time::Duration;

use super::retry::AuthRetry;
use crate::config::DataverseConfig;

/// Header Dataverse reads the API token from
pub const API_KEY_HEADER: &str = "X-Dataverse-key";

/// Shared HTTP client that attaches the Dataverse API key when configured
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    /// No transparent decompression, so `content-length` survives on HEAD
    raw: Arc<Client>,
    api_key: Option<String>,
}

impl HttpClient {
    /// Create a client from the upstream configuration
    pub fn new(config: &DataverseConfig) -> Result<Self, reqwest::Error> {
        let builder = || {
            Client::builder()
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .timeout(config.timeout())
                .connect_timeout(Duration::from_secs(10))
                .pool_idle_timeout(Duration::from_secs(90))
        };

        let client = builder().build()?;
        let raw = builder().no_gzip().no_brotli().no_deflate().build()?;

        Ok(Self {
            client: Arc::new(client),
            raw: Arc::new(raw),
            api_key: config.usable_api_key().map(str::to_string),
        })
    }

    /// Whether requests go out with an API key
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// GET with the API key, retrying once without it when `retry` says so
    pub async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        accept: Option<&'static str>,
        retry: AuthRetry,
    ) -> Result<Response, reqwest::Error> {
        self.send(&self.client, Method::GET, url, query, accept, retry)
            .await
    }

    /// HEAD with the API key, never retried.
    ///
    /// Sent as `Accept-Encoding: identity` on the undecoded client, so the
    /// declared `content-length` is the size of the body a GET would load.
    pub async fn head(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.send(&self.raw, Method::HEAD, url, &[], None, AuthRetry::Never)
            .await
    }

    async fn send(
        &self,
        client: &Client,
        method: Method,
        url: &str,
        query: &[(String, String)],
        accept: Option<&'static str>,
        retry: AuthRetry,
    ) -> Result<Response, reqwest::Error> {
        let build = |with_key: bool| {
            let mut request = client.request(method.clone(), url);
            if method == Method::HEAD {
                request = request.header(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
            }
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(accept) = accept {
                request = request.header(ACCEPT, HeaderValue::from_static(accept));
            }
            if with_key {
                if let Some(ref key) = self.api_key {
                    request = request.header(API_KEY_HEADER, key);
                }
            }
            request
        };

        tracing::debug!("{} {}", method, url);
        let response = build(true).send().await?;

        if self.has_api_key() && retry.should_retry(response.status()) {
            tracing::debug!(
                "{} {} returned {} with API key, retrying without it",
                method,
                url,
                response.status()
            );
            return build(false).send().await;
        }

        Ok(response)
    }
}
