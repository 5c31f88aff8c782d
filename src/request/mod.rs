//! Request module
//!
//! Builds the retrieve requests sent to the service.
//!
//! # Overview
//!
//! The request module provides:
//! - `RetrievalRequest` - One immutable query, either filtered or a continuation
//! - `RequestBuilder` - Fluent construction with epoch/now defaults for the date range
//! - `parse_timestamp` - Lenient timestamp parsing for CLI and config input

mod builder;
mod types;

pub use builder::{build_request, parse_timestamp, RequestBuilder, DEFAULT_FILTER_FIELD};
pub use types::{RetrievalRequest, SimpleFilter, SimpleOperator};
