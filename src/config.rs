//! Configuration for retrieval runs
//!
//! This module contains the structures loaded from the YAML config file:
//! gateway endpoint, retry and rate limit settings, auth, pause budget and
//! the object definitions that can be retrieved.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::pause::{DeadlineBudget, PauseController};
use crate::request::{RequestBuilder, DEFAULT_FILTER_FIELD};
use crate::retry::{RetryConfig, RetryPolicy};
use crate::template::expand_env;
use crate::transport::{HttpTransportConfig, RateLimiterConfig};
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete retrieval configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveConfig {
    /// Retrieve endpoint of the gateway
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Execution budget
    #[serde(default)]
    pub pause: PauseConfig,

    /// Retrievable object types by name
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectDefinition>,
}

fn default_timeout_secs() -> u64 {
    60
}

impl RetrieveConfig {
    /// Load a config file, expanding `${VAR}` references first
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a config from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let expanded = expand_env(yaml)?;
        let config: Self = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::missing_field("endpoint"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_value(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be at least 1"));
        }
        if self.objects.keys().any(|name| name.trim().is_empty()) {
            return Err(Error::invalid_value("objects", "object names cannot be empty"));
        }
        if let Some(budget) = self.pause.budget_secs {
            if budget <= self.pause.threshold_secs {
                return Err(Error::invalid_value(
                    "pause.budget_secs",
                    "must be larger than pause.threshold_secs",
                ));
            }
        }
        Ok(())
    }

    /// Look up an object definition
    pub fn object(&self, name: &str) -> Option<&ObjectDefinition> {
        self.objects.get(name)
    }

    /// HTTP transport settings
    pub fn transport_config(&self) -> HttpTransportConfig {
        let mut builder = HttpTransportConfig::builder(&self.endpoint)
            .timeout(Duration::from_secs(self.timeout_secs));

        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        builder.build()
    }

    /// Retry policy from the retry section
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.retry)
    }
}

// ============================================================================
// Pause Config
// ============================================================================

/// Execution budget of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseConfig {
    /// Wall-clock budget in seconds; no budget means never pause
    #[serde(default)]
    pub budget_secs: Option<u64>,

    /// Pause once less than this many seconds remain
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,
}

fn default_threshold_secs() -> u64 {
    60
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            budget_secs: None,
            threshold_secs: default_threshold_secs(),
        }
    }
}

impl PauseConfig {
    /// Pause controller whose budget starts now.
    ///
    /// `budget_override` replaces `budget_secs` when given.
    pub fn controller(&self, budget_override: Option<u64>) -> PauseController {
        match budget_override.or(self.budget_secs) {
            Some(budget) => PauseController::new(DeadlineBudget::starting_now(
                Duration::from_secs(budget),
                Duration::from_secs(self.threshold_secs),
            )),
            None => PauseController::never(),
        }
    }
}

// ============================================================================
// Object Definitions
// ============================================================================

/// A retrievable object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Properties requested by default
    #[serde(default)]
    pub properties: Vec<String>,

    /// Date property for range filters; empty disables filtering
    #[serde(default = "default_filter_field")]
    pub filter_field: String,
}

fn default_filter_field() -> String {
    DEFAULT_FILTER_FIELD.to_string()
}

impl Default for ObjectDefinition {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            filter_field: default_filter_field(),
        }
    }
}

impl ObjectDefinition {
    /// Request builder preloaded with this definition
    pub fn request_builder(&self, object_type: &str) -> RequestBuilder {
        RequestBuilder::new(object_type)
            .properties(self.properties.iter().cloned())
            .filter_field(self.filter_field.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL: &str = r#"
endpoint: "https://gateway.example.com/retrieve"
timeout_secs: 30
user_agent: "nightly-export/1.0"
headers:
  X-Tenant: "acme"
retry:
  max_attempts: 3
  multiplier_secs: 0.5
rate_limit:
  requests_per_second: 4
  burst_size: 2
auth:
  type: oauth2_client_credentials
  token_url: "https://auth.example.com/v2/token"
  client_id: "client"
  client_secret: "secret"
  token_body:
    account_id: "1234"
pause:
  budget_secs: 840
objects:
  Send:
    properties: [ID, SendDate, ModifiedDate]
  Subscriber:
    properties: [SubscriberKey, Status]
    filter_field: CreatedDate
  List:
    properties: [ID]
    filter_field: ""
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = RetrieveConfig::from_yaml("endpoint: https://gw.example.com/retrieve").unwrap();
        assert_eq!(config.endpoint, "https://gw.example.com/retrieve");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.auth, AuthConfig::None);
        assert_eq!(config.pause, PauseConfig::default());
        assert!(config.rate_limit.is_none());
        assert!(config.objects.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = RetrieveConfig::from_yaml(FULL).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.max_backoff_secs, 30.0);
        assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(4, 2)));
        assert_eq!(config.pause.budget_secs, Some(840));
        assert_eq!(config.pause.threshold_secs, 60);

        match &config.auth {
            AuthConfig::Oauth2ClientCredentials { token_body, .. } => {
                assert_eq!(token_body.get("account_id").map(String::as_str), Some("1234"));
            }
            other => panic!("Expected OAuth2 auth, got {other:?}"),
        }

        let send = config.object("Send").unwrap();
        assert_eq!(send.filter_field, "ModifiedDate");
        assert_eq!(config.object("Subscriber").unwrap().filter_field, "CreatedDate");
        assert!(config.object("Unknown").is_none());
    }

    #[test]
    fn test_object_request_builder() {
        let config = RetrieveConfig::from_yaml(FULL).unwrap();

        let request = config.object("Subscriber").unwrap().request_builder("Subscriber").build();
        assert_eq!(request.properties, vec!["SubscriberKey", "Status"]);
        assert_eq!(request.filter.unwrap().property, "CreatedDate");

        let request = config.object("List").unwrap().request_builder("List").build();
        assert!(request.filter.is_none());

        let fallback = ObjectDefinition::default();
        assert_eq!(fallback.filter_field, DEFAULT_FILTER_FIELD);
    }

    #[test]
    fn test_transport_config() {
        let config = RetrieveConfig::from_yaml(FULL).unwrap();
        let transport = config.transport_config();
        assert_eq!(transport.endpoint, "https://gateway.example.com/retrieve");
        assert_eq!(transport.timeout, Duration::from_secs(30));
        assert_eq!(transport.user_agent, "nightly-export/1.0");
        assert_eq!(transport.rate_limit, Some(RateLimiterConfig::new(4, 2)));
        assert_eq!(
            transport.default_headers.get("X-Tenant").map(String::as_str),
            Some("acme")
        );
        assert_eq!(config.retry_policy().max_attempts(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            RetrieveConfig::from_yaml("endpoint: ''").unwrap_err(),
            Error::MissingConfigField { .. }
        ));
        assert!(matches!(
            RetrieveConfig::from_yaml("endpoint: x\nretry: { max_attempts: 0 }").unwrap_err(),
            Error::InvalidConfigValue { .. }
        ));
        assert!(matches!(
            RetrieveConfig::from_yaml("endpoint: x\nobjects: { '': {} }").unwrap_err(),
            Error::InvalidConfigValue { .. }
        ));
        assert!(matches!(
            RetrieveConfig::from_yaml("endpoint: x\npause: { budget_secs: 30 }").unwrap_err(),
            Error::InvalidConfigValue { .. }
        ));
        assert!(RetrieveConfig::from_yaml("timeout_secs: 5").is_err());
    }

    #[test]
    fn test_env_expansion() {
        let yaml = "endpoint: ${PAGEWALK_TEST_UNSET_ENDPOINT:-https://fallback.example.com}\n";
        let config = RetrieveConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.endpoint, "https://fallback.example.com");

        let err = RetrieveConfig::from_yaml("endpoint: ${PAGEWALK_TEST_UNSET_ENDPOINT}").unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagewalk.yaml");
        std::fs::write(&path, FULL).unwrap();

        let config = RetrieveConfig::from_file(&path).unwrap();
        assert_eq!(config.objects.len(), 3);

        let missing = RetrieveConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_pause_controller() {
        let never = PauseConfig::default().controller(None);
        assert!(!never.should_pause());

        // Override shorter than the threshold is exhausted immediately
        let config = PauseConfig {
            budget_secs: Some(900),
            threshold_secs: 60,
        };
        assert!(!config.controller(None).should_pause());
        assert!(config.controller(Some(10)).should_pause());
    }
}
