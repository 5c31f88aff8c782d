//! HTTP gateway transport
//!
//! Posts `{"RetrieveRequest": ...}` as JSON to a single endpoint and decodes
//! the `{OverallStatus, RequestID, Results}` answer. Handles:
//! - Rate limiting to prevent API throttling
//! - Error classification for retry decisions (every failure here is transient)
//!
//! Retries are not performed here; the engine wraps each call in its
//! retry policy.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::types::RetrieveResponse;
use super::Transport;
use crate::error::{Error, Result};
use crate::request::RetrievalRequest;
use crate::types::{AuthHeaders, StringMap};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Retrieve endpoint
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: Duration::from_secs(60),
            rate_limit: None,
            default_headers: StringMap::new(),
            user_agent: format!("pagewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new config builder
    pub fn builder(endpoint: impl Into<String>) -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder {
            config: Self {
                endpoint: endpoint.into(),
                ..Self::default()
            },
        }
    }
}

/// Builder for HTTP transport config
pub struct HttpTransportConfigBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportConfigBuilder {
    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpTransportConfig {
        self.config
    }
}

/// Body sent to the gateway
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RetrieveEnvelope<'a> {
    retrieve_request: &'a RetrievalRequest,
}

/// JSON-over-HTTP retrieve transport
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    config: HttpTransportConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Create a transport from its configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            endpoint,
            config,
            rate_limiter,
        })
    }

    /// Endpoint requests are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn retrieve(
        &self,
        request: &RetrievalRequest,
        headers: &AuthHeaders,
    ) -> Result<RetrieveResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .json(&RetrieveEnvelope {
                retrieve_request: request,
            });

        for (key, value) in self.config.default_headers.iter().chain(headers) {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(Error::from_reqwest)?;
        let status = response.status();

        // Retried by the engine; a 401 also drops cached credentials
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await.map_err(Error::from_reqwest)?;
        debug!(
            "Retrieve {} answered {} bytes",
            request.object_type,
            body.len()
        );

        serde_json::from_str(&body)
            .map_err(|e| Error::protocol(format!("undecodable response body: {e}")))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.config.timeout)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
