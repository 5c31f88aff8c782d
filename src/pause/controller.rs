//! Pause decision

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Tells the engine whether the current run is out of budget
pub trait BudgetSignal: Send + Sync {
    /// True once the run should stop at the next pagination boundary
    fn is_budget_exhausted(&self) -> bool;
}

impl<F> BudgetSignal for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_budget_exhausted(&self) -> bool {
        self()
    }
}

/// Budget that never runs out
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverPause;

impl BudgetSignal for NeverPause {
    fn is_budget_exhausted(&self) -> bool {
        false
    }
}

/// Wall-clock budget measured from a start instant.
///
/// Exhausted once the remaining time drops below `threshold`, which leaves
/// the run enough time to persist its paused state.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineBudget {
    started: Instant,
    budget: Duration,
    threshold: Duration,
}

impl DeadlineBudget {
    /// Budget starting at `started`
    pub fn new(started: Instant, budget: Duration, threshold: Duration) -> Self {
        Self {
            started,
            budget,
            threshold,
        }
    }

    /// Budget starting now
    pub fn starting_now(budget: Duration, threshold: Duration) -> Self {
        Self::new(Instant::now(), budget, threshold)
    }

    /// Time left before the budget is spent
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}

impl BudgetSignal for DeadlineBudget {
    fn is_budget_exhausted(&self) -> bool {
        self.remaining() < self.threshold
    }
}

/// Decides at each pagination boundary whether to suspend
#[derive(Clone)]
pub struct PauseController {
    signal: Arc<dyn BudgetSignal>,
}

impl PauseController {
    /// Controller backed by the given budget signal
    pub fn new(signal: impl BudgetSignal + 'static) -> Self {
        Self {
            signal: Arc::new(signal),
        }
    }

    /// Controller that never pauses
    pub fn never() -> Self {
        Self::new(NeverPause)
    }

    /// Query the budget once
    pub fn should_pause(&self) -> bool {
        let exhausted = self.signal.is_budget_exhausted();
        if exhausted {
            debug!("Execution budget exhausted, pausing at this boundary");
        }
        exhausted
    }
}

impl Default for PauseController {
    fn default() -> Self {
        Self::never()
    }
}

impl std::fmt::Debug for PauseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PauseController").finish_non_exhaustive()
    }
}
