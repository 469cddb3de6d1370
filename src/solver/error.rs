use std::time::Duration;

use thiserror::Error;

/// Failure of a backend to reach a SAT/UNSAT decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("solver backend '{backend}' is not available: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("solver timed out after {0:?}")]
    Timeout(Duration),

    #[error("solver gave up after {0} decisions")]
    BudgetExhausted(u64),

    #[error("solver returned unknown: {0}")]
    Unknown(String),

    #[error("solver backend error: {0}")]
    Backend(String),
}
