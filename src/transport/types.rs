//! Response types and status classification

use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt, Record};
use serde::{Deserialize, Deserializer, Serialize};

/// Status value announcing another page
const MORE_DATA_AVAILABLE: &str = "MoreDataAvailable";

/// Prefix of every failing status
const ERROR_PREFIX: &str = "Error";

/// Retrieve response as delivered by the transport, before classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetrieveResponse {
    /// Overall status; absent means the response is malformed
    #[serde(default)]
    pub overall_status: Option<String>,

    /// Request id, which doubles as the continuation token
    #[serde(default, rename = "RequestID")]
    pub request_id: Option<String>,

    /// Result objects
    #[serde(default, deserialize_with = "normalize_results")]
    pub results: Vec<Record>,
}

impl RetrieveResponse {
    /// A final page
    pub fn ok(results: Vec<Record>) -> Self {
        Self {
            overall_status: Some("OK".to_string()),
            request_id: None,
            results,
        }
    }

    /// A page followed by more data under `request_id`
    pub fn more(request_id: impl Into<String>, results: Vec<Record>) -> Self {
        Self {
            overall_status: Some(MORE_DATA_AVAILABLE.to_string()),
            request_id: Some(request_id.into()),
            results,
        }
    }

    /// A response carrying an arbitrary status
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            overall_status: Some(status.into()),
            request_id: None,
            results: Vec::new(),
        }
    }
}

/// Accept an array, a single object, or null for `Results`
fn normalize_results<'de, D>(deserializer: D) -> std::result::Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Vec::new(),
        JsonValue::Array(items) => items,
        single => vec![single],
    })
}

/// Classified overall status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveStatus {
    /// Last page
    Success,
    /// Another page can be fetched with the continuation token
    MoreDataAvailable,
    /// The service rejected the request
    Error(String),
}

impl RetrieveStatus {
    /// Classify a raw status string
    pub fn parse(status: &str) -> Self {
        if status == MORE_DATA_AVAILABLE {
            Self::MoreDataAvailable
        } else if status.starts_with(ERROR_PREFIX) {
            Self::Error(status.to_string())
        } else {
            Self::Success
        }
    }

    /// Check if another page follows
    pub fn has_more(&self) -> bool {
        matches!(self, Self::MoreDataAvailable)
    }
}

/// A response that passed classification
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResponse {
    /// Status, never `Error`
    pub status: RetrieveStatus,
    /// Records of this page
    pub records: Vec<Record>,
    /// Continuation token, always present when more data is available
    pub continuation_token: Option<String>,
}

impl RetrievalResponse {
    /// Token for the next page, if there is one
    pub fn next_token(&self) -> Option<&str> {
        if self.status.has_more() {
            self.continuation_token.as_deref()
        } else {
            None
        }
    }
}

impl TryFrom<RetrieveResponse> for RetrievalResponse {
    type Error = Error;

    fn try_from(raw: RetrieveResponse) -> Result<Self> {
        let Some(status) = raw.overall_status else {
            return Err(Error::protocol(format!(
                "invalid response shape, OverallStatus missing (RequestID: {})",
                raw.request_id.as_deref().unwrap_or("none")
            )));
        };

        let status = match RetrieveStatus::parse(&status) {
            RetrieveStatus::Error(text) => return Err(Error::data(text)),
            other => other,
        };

        let continuation_token = raw.request_id.none_if_empty();
        if status.has_more() && continuation_token.is_none() {
            return Err(Error::protocol(
                "MoreDataAvailable without a RequestID to continue from",
            ));
        }

        Ok(Self {
            status,
            records: raw.results,
            continuation_token,
        })
    }
}
