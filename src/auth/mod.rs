//! Authentication module
//!
//! Supports: static headers, Bearer, OAuth2 client credentials
//!
//! The engine only sees the `AuthProvider` trait. `Authenticator` is the
//! bundled implementation; it caches OAuth2 tokens and carries the cached
//! token across a pause so a resumed run does not log in again.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken};

use crate::error::Result;
use crate::types::{AuthHeaders, JsonValue};
use async_trait::async_trait;
use std::sync::Arc;

/// Auth collaborator of the retrieval engine
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Headers for the next retrieve call
    async fn headers(&self) -> Result<AuthHeaders>;

    /// Forget cached credentials after the service rejected them
    async fn invalidate(&self) {}

    /// Opaque context to store with a paused retrieval (`Null` if none)
    async fn capture_pause_context(&self) -> Result<JsonValue>;

    /// Restore the context captured by `capture_pause_context`
    async fn restore_pause_context(&self, context: JsonValue) -> Result<()>;
}

#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for Arc<T> {
    async fn headers(&self) -> Result<AuthHeaders> {
        (**self).headers().await
    }

    async fn invalidate(&self) {
        (**self).invalidate().await;
    }

    async fn capture_pause_context(&self) -> Result<JsonValue> {
        (**self).capture_pause_context().await
    }

    async fn restore_pause_context(&self, context: JsonValue) -> Result<()> {
        (**self).restore_pause_context(context).await
    }
}
