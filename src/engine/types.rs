//! Engine types
//!
//! Result handler trait, page type, statistics and job outcome.

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// One page of records handed to the result handler
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    /// Object type being retrieved
    pub object_type: String,
    /// 1-indexed page number within the current run
    pub page: usize,
    /// Records of this page
    pub records: Vec<Record>,
}

impl RecordPage {
    /// Number of records on the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the page carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Caller-supplied consumer of retrieved pages
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Handle one page; an error aborts the retrieval
    async fn handle(&self, page: RecordPage) -> Result<()>;
}

#[async_trait]
impl<T: RecordHandler + ?Sized> RecordHandler for Arc<T> {
    async fn handle(&self, page: RecordPage) -> Result<()> {
        (**self).handle(page).await
    }
}

/// Adapts a closure returning a boxed future into a `RecordHandler`
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(RecordPage) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    /// Wrap the closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> RecordHandler for FnHandler<F>
where
    F: Fn(RecordPage) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn handle(&self, page: RecordPage) -> Result<()> {
        (self.f)(page).await
    }
}

/// Statistics from a retrieval run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveStats {
    /// Pages fetched and dispatched
    pub pages_fetched: usize,
    /// Records dispatched
    pub records_fetched: usize,
    /// Retries after transient failures
    pub retries: u32,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RetrieveStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with the given record count
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_fetched += records;
    }

    /// Add retries
    pub fn add_retries(&mut self, retries: u32) {
        self.retries += retries;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// How a retrieval run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveOutcome {
    /// Every page was fetched and handled
    Completed(RetrieveStats),
    /// The run stopped at a pagination boundary and handed off its state
    Paused(RetrieveStats),
}

impl RetrieveOutcome {
    /// Statistics of the run
    pub fn stats(&self) -> &RetrieveStats {
        match self {
            Self::Completed(stats) | Self::Paused(stats) => stats,
        }
    }

    /// Check if the run was paused
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }
}
