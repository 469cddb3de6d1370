use thiserror::Error;

use crate::parse::ParseError;
use crate::solver::SolverError;
use crate::DomainError;

/// Unified error type covering parsing, variable domains, solving, and I/O.
///
/// The analysis operations never return it: they fold it into the
/// `error` field of their verdict. It surfaces from configuration loading
/// and from the `try_*` variants of the analysis operations.
#[derive(Debug, Error)]
pub enum GuardcheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
