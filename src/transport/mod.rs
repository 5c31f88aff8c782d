//! Transport module
//!
//! The retrieve call itself: one request in, one status/records/cursor
//! response out.
//!
//! # Overview
//!
//! The transport module provides:
//! - `Transport` - The collaborator trait the engine submits through
//! - `RetrieveResponse` - The response as it arrives on the wire
//! - `RetrievalResponse` - The response after status classification
//! - `HttpTransport` - JSON-over-HTTP gateway transport with rate limiting
//!
//! Transports report connectivity problems (connect errors, timeouts) as
//! `Error::Transient` and non-success answers as `Error::HttpStatus`, both of
//! which the retry policy picks up. An undecodable body is a protocol error.

mod client;
mod rate_limit;
mod types;

pub use client::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use types::{RetrievalResponse, RetrieveResponse, RetrieveStatus};

use crate::error::Result;
use crate::request::RetrievalRequest;
use crate::types::AuthHeaders;
use async_trait::async_trait;
use std::sync::Arc;

/// Submits retrieve requests to the remote service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit one request with the given per-request headers
    async fn retrieve(
        &self,
        request: &RetrievalRequest,
        headers: &AuthHeaders,
    ) -> Result<RetrieveResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn retrieve(
        &self,
        request: &RetrievalRequest,
        headers: &AuthHeaders,
    ) -> Result<RetrieveResponse> {
        (**self).retrieve(request, headers).await
    }
}
