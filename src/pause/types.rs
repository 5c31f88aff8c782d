//! Paused state
//!
//! Serialized to JSON and handed from one run to the next.

use crate::error::{Error, Result};
use crate::request::RetrievalRequest;
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything needed to continue a walk exactly where it stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PausedState {
    /// Opaque context from the auth provider (`null` when there is none)
    #[serde(default)]
    pub auth: JsonValue,

    /// Object type being retrieved
    pub object_type: String,

    /// Token of the next page
    pub continuation_token: String,

    /// When the walk was suspended
    pub paused_at: DateTime<Utc>,
}

impl PausedState {
    /// Create a paused state; the token and object type must not be empty
    pub fn new(
        auth: JsonValue,
        object_type: impl Into<String>,
        continuation_token: impl Into<String>,
    ) -> Result<Self> {
        let state = Self {
            auth,
            object_type: object_type.into(),
            continuation_token: continuation_token.into(),
            paused_at: Utc::now(),
        };
        state.validate()?;
        Ok(state)
    }

    /// Check the handle can actually be resumed
    pub fn validate(&self) -> Result<()> {
        if self.object_type.is_empty() {
            return Err(Error::state("paused state has no object type"));
        }
        if self.continuation_token.is_empty() {
            return Err(Error::state("paused state has no continuation token"));
        }
        Ok(())
    }

    /// Request that continues the walk
    pub fn to_request(&self) -> RetrievalRequest {
        RetrievalRequest::continuation(&self.object_type, &self.continuation_token)
    }
}
