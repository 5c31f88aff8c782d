//! Request builder
//!
//! Missing or unparseable bounds fall back to the Unix epoch (start)
//! and the current time (end).

use super::types::{RetrievalRequest, SimpleFilter};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date property filtered on when the caller does not name one
pub const DEFAULT_FILTER_FIELD: &str = "ModifiedDate";

/// Naive formats accepted besides RFC 3339, interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Builder for filtered retrieve requests
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    object_type: String,
    properties: Vec<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    filter_field: String,
}

impl RequestBuilder {
    /// Start a request for the given object type
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            properties: Vec::new(),
            start: None,
            end: None,
            filter_field: DEFAULT_FILTER_FIELD.to_string(),
        }
    }

    /// Set the properties to retrieve
    #[must_use]
    pub fn properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Set the lower bound of the date range
    #[must_use]
    pub fn start(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self
    }

    /// Set the upper bound of the date range
    #[must_use]
    pub fn end(mut self, end: Option<DateTime<Utc>>) -> Self {
        self.end = end;
        self
    }

    /// Set the lower bound from a string; invalid input counts as absent
    #[must_use]
    pub fn start_str(self, start: Option<&str>) -> Self {
        self.start(start.and_then(parse_timestamp))
    }

    /// Set the upper bound from a string; invalid input counts as absent
    #[must_use]
    pub fn end_str(self, end: Option<&str>) -> Self {
        self.end(end.and_then(parse_timestamp))
    }

    /// Set the date property to filter on (empty disables filtering)
    #[must_use]
    pub fn filter_field(mut self, field: impl Into<String>) -> Self {
        self.filter_field = field.into();
        self
    }

    /// Retrieve everything, without a date filter
    #[must_use]
    pub fn no_filter(mut self) -> Self {
        self.filter_field.clear();
        self
    }

    /// Build the request
    pub fn build(self) -> RetrievalRequest {
        let filter = if self.filter_field.is_empty() {
            None
        } else {
            let lower = self.start.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            let upper = self.end.unwrap_or_else(Utc::now);
            Some(SimpleFilter::between(self.filter_field, lower, upper))
        };

        RetrievalRequest {
            object_type: self.object_type,
            properties: self.properties,
            filter,
            continuation_token: None,
        }
    }
}

/// Build a filtered request in one call.
///
/// `filter_field` of `None` means [`DEFAULT_FILTER_FIELD`]; `Some("")`
/// disables the filter.
pub fn build_request(
    object_type: &str,
    properties: &[&str],
    start: Option<&str>,
    end: Option<&str>,
    filter_field: Option<&str>,
) -> RetrievalRequest {
    RequestBuilder::new(object_type)
        .properties(properties.iter().copied())
        .start_str(start)
        .end_str(end)
        .filter_field(filter_field.unwrap_or(DEFAULT_FILTER_FIELD))
        .build()
}

/// Parse a timestamp leniently.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// `YYYY-MM-DD`. Values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
