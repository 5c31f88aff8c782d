//! Request types
//!
//! Serialized with the field names the retrieve service expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single retrieve query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetrievalRequest {
    /// Object type to query (e.g. "Send")
    pub object_type: String,

    /// Properties to return, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,

    /// Optional date range filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SimpleFilter>,

    /// Continuation token from the previous page
    #[serde(
        default,
        rename = "ContinueRequest",
        skip_serializing_if = "Option::is_none"
    )]
    pub continuation_token: Option<String>,
}

impl RetrievalRequest {
    /// Create an unfiltered request for an object type
    pub fn new(object_type: impl Into<String>, properties: Vec<String>) -> Self {
        Self {
            object_type: object_type.into(),
            properties,
            filter: None,
            continuation_token: None,
        }
    }

    /// Create a continuation request.
    ///
    /// Only the object type and the token are carried; the service remembers
    /// the properties and filter of the original query.
    pub fn continuation(object_type: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            properties: Vec::new(),
            filter: None,
            continuation_token: Some(token.into()),
        }
    }

    /// Check if this request continues a previous query
    pub fn is_continuation(&self) -> bool {
        self.continuation_token.is_some()
    }
}

/// Comparison operator of a simple filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimpleOperator {
    /// Inclusive range
    #[default]
    Between,
}

/// A single-property filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleFilter {
    /// Property the filter applies to
    pub property: String,
    /// Operator
    pub simple_operator: SimpleOperator,
    /// Lower and upper bound
    #[serde(rename = "DateValue")]
    pub date_value: [DateTime<Utc>; 2],
}

impl SimpleFilter {
    /// Create a `between` filter on a date property
    pub fn between(
        property: impl Into<String>,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Self {
        Self {
            property: property.into(),
            simple_operator: SimpleOperator::Between,
            date_value: [lower, upper],
        }
    }

    /// Lower bound of the range
    pub fn lower(&self) -> DateTime<Utc> {
        self.date_value[0]
    }

    /// Upper bound of the range
    pub fn upper(&self) -> DateTime<Utc> {
        self.date_value[1]
    }
}
