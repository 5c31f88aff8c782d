//! Retry module
//!
//! Exponential backoff with full jitter around a single fallible call.
//! Only transient failures (`Error::Transient`) are retried; every other
//! error is returned on first occurrence.

mod policy;

pub use policy::{RetryConfig, RetryPolicy};

#[cfg(test)]
mod tests;
