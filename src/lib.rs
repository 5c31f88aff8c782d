// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewalk
//!
//! Cursor-paginated retrieval against a request/continuation gateway.
//!
//! ## Features
//!
//! - **Date-range requests**: Epoch-to-now defaults on a configurable date property
//! - **Continuation walks**: Follows `MoreDataAvailable` until a terminal status
//! - **Overlapped dispatch**: The handler for page N runs while page N+1 is fetched
//! - **Pause/resume**: Suspends at a page boundary when the execution budget runs out
//! - **Retry**: Randomized exponential backoff for transient failures only
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::auth::{AuthConfig, Authenticator};
//! use pagewalk::engine::RetrievalEngine;
//! use pagewalk::output::{JsonLinesConfig, JsonLinesWriter};
//! use pagewalk::pause::PauseStore;
//! use pagewalk::request::build_request;
//! use pagewalk::transport::{HttpTransport, HttpTransportConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pagewalk::Result<()> {
//!     let transport = HttpTransport::with_config(
//!         HttpTransportConfig::builder("https://gateway.example.com/retrieve").build(),
//!     )?;
//!     let auth = Authenticator::new(AuthConfig::Bearer { token: "...".into() });
//!     let engine = RetrievalEngine::new(Arc::new(transport), Arc::new(auth));
//!
//!     let request = build_request("Account", &["ID", "Name"], None, None, None);
//!     let writer = JsonLinesWriter::open("account.jsonl", &JsonLinesConfig::new()).await?;
//!     let outcome = engine.submit(request, &writer, &PauseStore::new("paused.json")).await?;
//!     writer.flush().await?;
//!
//!     println!("{} records", outcome.stats().records_fetched);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       RetrievalEngine                           │
//! │  submit(request) → Completed | Paused    resume(PausedState)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Request  │ Transport │    Retry      │   Pause   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Builder  │ HTTP POST │ Backoff       │ Budget    │ JSON lines  │
//! │ Filter   │ Rate Limit│ Full jitter   │ Store     │             │
//! │          │ Classify  │ Transient only│ Resume    │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Request construction
pub mod request;

/// Authentication implementations
pub mod auth;

/// Retrieve transport with rate limiting
pub mod transport;

/// Retry with randomized exponential backoff
pub mod retry;

/// Pause/resume of pagination walks
pub mod pause;

/// Main execution engine
pub mod engine;

/// Record output
pub mod output;

/// Configuration file
pub mod config;

/// Environment interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::RetrieveConfig;
pub use engine::{RecordHandler, RecordPage, RetrievalEngine, RetrieveOutcome, RetrieveStats};
pub use pause::{PauseController, PausedState};
pub use request::{build_request, RequestBuilder, RetrievalRequest};
pub use retry::RetryPolicy;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
