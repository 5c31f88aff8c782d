//! Authenticator implementation
//!
//! Produces per-request headers and manages token refresh.

use super::types::{AuthConfig, CachedToken};
use super::AuthProvider;
use crate::error::{Error, Result};
use crate::types::{AuthHeaders, JsonValue, StringMap};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Authenticator handles authentication of retrieve calls
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for OAuth2 auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Build the headers for the configured auth type
    async fn build_headers(&self) -> Result<AuthHeaders> {
        let mut headers = AuthHeaders::new();
        match &self.config {
            AuthConfig::None => {}
            AuthConfig::Bearer { token } => {
                headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            }
            AuthConfig::Headers { headers: fixed } => {
                headers.extend(fixed.clone());
            }
            AuthConfig::Oauth2ClientCredentials { .. } => {
                let token = self.get_or_refresh_token().await?;
                headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            }
        }
        Ok(headers)
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_new_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a new token based on auth type
    async fn fetch_new_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scopes,
                token_body,
            } => {
                self.fetch_oauth2_client_credentials(
                    token_url,
                    client_id,
                    client_secret,
                    scopes,
                    token_body,
                )
                .await
            }

            _ => Err(Error::auth(
                "Token refresh not supported for this auth type",
            )),
        }
    }

    /// Fetch OAuth2 token using client credentials flow
    async fn fetch_oauth2_client_credentials(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
        extra_body: &StringMap,
    ) -> Result<CachedToken> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
        ];

        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        for (key, value) in extra_body {
            form.push((key.as_str(), value.clone()));
        }

        debug!("Requesting access token from {token_url}");
        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // Throttling and server faults are retried, rejected credentials are not
            if status.is_server_error() || matches!(status.as_u16(), 408 | 429) {
                return Err(Error::http_status(status.as_u16(), body));
            }
            return Err(Error::OAuth2 {
                message: format!(
                    "Token request failed with status {}: {body}",
                    status.as_u16()
                ),
            });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(Error::from_reqwest)?;
        Ok(token_response.into_cached_token())
    }

    /// Currently cached token, if any
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cached_token.read().await.clone()
    }

    /// Clear the cached token (forces a fetch on the next call)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

#[async_trait]
impl AuthProvider for Authenticator {
    async fn headers(&self) -> Result<AuthHeaders> {
        self.build_headers().await
    }

    async fn invalidate(&self) {
        if self.config.uses_token_cache() {
            debug!("Dropping cached access token");
            self.clear_cache().await;
        }
    }

    async fn capture_pause_context(&self) -> Result<JsonValue> {
        if !self.config.uses_token_cache() {
            return Ok(JsonValue::Null);
        }
        match self.cached_token().await {
            Some(token) => Ok(serde_json::to_value(token)?),
            None => Ok(JsonValue::Null),
        }
    }

    async fn restore_pause_context(&self, context: JsonValue) -> Result<()> {
        if context.is_null() || !self.config.uses_token_cache() {
            return Ok(());
        }

        let token: CachedToken = serde_json::from_value(context)
            .map_err(|e| Error::auth(format!("Unreadable pause auth context: {e}")))?;

        if token.is_expired() {
            info!("Paused access token has expired, a new one will be requested");
            return Ok(());
        }

        let mut cached = self.cached_token.write().await;
        *cached = Some(token);
        Ok(())
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.config {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Headers { .. } => "headers",
            AuthConfig::Oauth2ClientCredentials { .. } => "oauth2_client_credentials",
        };
        f.debug_struct("Authenticator")
            .field("type", &kind)
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        }
    }
}
