//! Output module
//!
//! Record handlers that persist retrieved pages.
//!
//! # Overview
//!
//! This module provides:
//! - `JsonLinesWriter` - Writes each record as one JSON line to a file or stdout
//! - `JsonLinesConfig` - Truncate or append, flush per page

mod writer;

pub use writer::{JsonLinesConfig, JsonLinesWriter, WriteMode};

#[cfg(test)]
mod tests;
