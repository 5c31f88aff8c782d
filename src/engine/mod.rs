//! Execution engine module
//!
//! Pagination walk, response classification and pause/resume.
//!
//! # Overview
//!
//! The engine module provides:
//! - `RetrievalEngine` - Submits a request and follows continuation tokens
//! - `RecordHandler` - Caller-supplied consumer of each page
//! - `RetrieveOutcome` / `RetrieveStats` - How a run ended
//!
//! At each pagination boundary the handler call for page N and the decision
//! about page N+1 (pause, or fetch it) run concurrently and are both awaited
//! before the loop moves on, so at most one page is fetched ahead of the
//! handler.

mod types;

pub use types::{FnHandler, RecordHandler, RecordPage, RetrieveOutcome, RetrieveStats};

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::pause::{PauseController, PauseNotifier, PausedState};
use crate::request::RetrievalRequest;
use crate::retry::RetryPolicy;
use crate::transport::{RetrievalResponse, RetrieveResponse, Transport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What happens after a page has been classified
enum Boundary {
    /// Terminal status, nothing left to fetch
    Done,
    /// State handed to the pause notifier
    Paused,
    /// Next page fetched, with the retries it took
    Next(RetrievalResponse, u32),
}

/// Drives cursor-paginated retrievals
pub struct RetrievalEngine {
    /// Transport collaborator
    transport: Arc<dyn Transport>,
    /// Auth collaborator
    auth: Arc<dyn AuthProvider>,
    /// Retry policy around each transport call
    retry: RetryPolicy,
    /// Pause decision at each boundary
    pause: PauseController,
}

impl RetrievalEngine {
    /// Create an engine with the default retry policy that never pauses
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            transport,
            auth,
            retry: RetryPolicy::default(),
            pause: PauseController::never(),
        }
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the pause controller
    #[must_use]
    pub fn with_pause(mut self, pause: PauseController) -> Self {
        self.pause = pause;
        self
    }

    /// Get the retry policy
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Retrieve `request` and every page that follows it.
    ///
    /// Returns `Completed` after the terminal page has been handled, or
    /// `Paused` once the paused state has been handed to `notifier`.
    pub async fn submit(
        &self,
        request: RetrievalRequest,
        handler: &dyn RecordHandler,
        notifier: &dyn PauseNotifier,
    ) -> Result<RetrieveOutcome> {
        let start = Instant::now();
        let object_type = request.object_type.clone();
        let mut stats = RetrieveStats::new();

        info!(
            "Starting {} retrieval{}",
            object_type,
            if request.is_continuation() {
                " from continuation"
            } else {
                ""
            }
        );

        let (mut response, retries) = self.fetch(&request).await?;
        stats.add_retries(retries);

        loop {
            let page_number = stats.pages_fetched + 1;
            stats.add_page(response.records.len());
            debug!(
                "Page {page_number}: {} {} records",
                response.records.len(),
                object_type
            );

            let next_token = response.next_token().map(ToString::to_string);
            let page = RecordPage {
                object_type: object_type.clone(),
                page: page_number,
                records: response.records,
            };

            let dispatch = async move { handler.handle(page).await.map_err(Error::handler) };
            let boundary = self.boundary(&object_type, next_token, notifier);
            let ((), step) = tokio::try_join!(dispatch, boundary)?;

            match step {
                Boundary::Next(next, retries) => {
                    stats.add_retries(retries);
                    response = next;
                }
                Boundary::Done => {
                    stats.set_duration(start.elapsed().as_millis() as u64);
                    info!(
                        "Completed {} retrieval: {} records in {} pages",
                        object_type, stats.records_fetched, stats.pages_fetched
                    );
                    return Ok(RetrieveOutcome::Completed(stats));
                }
                Boundary::Paused => {
                    stats.set_duration(start.elapsed().as_millis() as u64);
                    return Ok(RetrieveOutcome::Paused(stats));
                }
            }
        }
    }

    /// Continue a walk from a paused state.
    ///
    /// The auth context is restored first; the rebuilt request carries only
    /// the object type and the continuation token.
    pub async fn resume(
        &self,
        paused: PausedState,
        handler: &dyn RecordHandler,
        notifier: &dyn PauseNotifier,
    ) -> Result<RetrieveOutcome> {
        paused.validate()?;
        info!(
            "Resuming {} retrieval paused at {}",
            paused.object_type, paused.paused_at
        );

        let request = paused.to_request();
        if !paused.auth.is_null() {
            self.auth.restore_pause_context(paused.auth).await?;
        }

        self.submit(request, handler, notifier).await
    }

    /// Decide what follows the current page and act on it
    async fn boundary(
        &self,
        object_type: &str,
        next_token: Option<String>,
        notifier: &dyn PauseNotifier,
    ) -> Result<Boundary> {
        let Some(token) = next_token else {
            return Ok(Boundary::Done);
        };

        if self.pause.should_pause() {
            self.suspend(object_type, token, notifier).await?;
            return Ok(Boundary::Paused);
        }

        let request = RetrievalRequest::continuation(object_type, token);
        let (response, retries) = self.fetch(&request).await?;
        Ok(Boundary::Next(response, retries))
    }

    /// Hand the continuation over to the pause notifier
    async fn suspend(
        &self,
        object_type: &str,
        token: String,
        notifier: &dyn PauseNotifier,
    ) -> Result<()> {
        let auth = self.auth.capture_pause_context().await?;
        let state = PausedState::new(auth, object_type, token)?;
        info!("Pausing {} retrieval at a pagination boundary", object_type);
        notifier.on_pause(state).await
    }

    /// Fetch and classify one page, retrying transient failures.
    /// Returns the page and the number of retries it took.
    async fn fetch(&self, request: &RetrievalRequest) -> Result<(RetrievalResponse, u32)> {
        let mut last_attempt = 0;
        let attempt_counter = &mut last_attempt;
        let raw = self
            .retry
            .run(|attempt| {
                *attempt_counter = attempt;
                self.submit_once(request)
            })
            .await?;

        let response = RetrievalResponse::try_from(raw)?;
        Ok((response, last_attempt.saturating_sub(1)))
    }

    /// One transport call with fresh auth headers
    async fn submit_once(&self, request: &RetrievalRequest) -> Result<RetrieveResponse> {
        let headers = self.auth.headers().await?;
        let result = self.transport.retrieve(request, &headers).await;
        if let Err(ref e) = result {
            if e.is_unauthorized() {
                self.auth.invalidate().await;
            }
        }
        result
    }
}

impl std::fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("retry", &self.retry)
            .field("pause", &self.pause)
            .finish_non_exhaustive()
    }
}
