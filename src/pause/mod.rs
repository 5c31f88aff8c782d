//! Pause/resume module
//!
//! Checkpoints a pagination walk so it can continue in a later process.
//!
//! # Overview
//!
//! The pause module provides:
//! - `PausedState` - The serializable continuation handle
//! - `PauseController` - The per-boundary "should we stop now?" decision
//! - `BudgetSignal` - Injected budget check (`DeadlineBudget`, `NeverPause`, closures)
//! - `PauseNotifier` - Receives the handle when a walk is suspended
//! - `PauseSlot` / `PauseStore` - In-memory and JSON-file notifiers

mod controller;
mod store;
mod types;

pub use controller::{BudgetSignal, DeadlineBudget, NeverPause, PauseController};
pub use store::{PauseSlot, PauseStore};
pub use types::PausedState;

use crate::error::Result;
use async_trait::async_trait;

/// Receives the continuation handle of a suspended walk
#[async_trait]
pub trait PauseNotifier: Send + Sync {
    /// Take ownership of the paused state
    async fn on_pause(&self, state: PausedState) -> Result<()>;
}
