//! Satisfiability backends.
//!
//! A backend receives the assertions of one query together with the symbol
//! table they were compiled against and answers SAT (with a witnessing
//! [`Model`]) or UNSAT. Backends hold no state between queries.

mod builtin;
mod error;
#[cfg(feature = "z3")]
mod z3_backend;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Formula, Model, SymbolTable};

pub use builtin::BuiltinSolver;
pub use error::SolverError;
#[cfg(feature = "z3")]
pub use z3_backend::Z3Solver;

/// Decision for a satisfiable or unsatisfiable query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatOutcome {
    Sat(Model),
    Unsat,
}

/// Resource bounds for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveLimits {
    pub timeout: Option<Duration>,
    /// Upper bound on search decisions. Only the built-in backend counts them.
    pub max_decisions: Option<u64>,
}

/// A decision procedure for conjunctions of [`Formula`]s.
pub trait SatBackend: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide the conjunction of `assertions`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] when no decision could be reached.
    fn check(
        &self,
        symbols: &SymbolTable,
        assertions: &[Formula],
        limits: &SolveLimits,
    ) -> Result<SatOutcome, SolverError>;
}

/// Which backend an analyzer dispatches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Builtin,
    Z3,
}

impl BackendKind {
    /// Instantiate the backend. Selecting Z3 in a build without the `z3`
    /// feature yields a backend that fails every query with
    /// [`SolverError::Unavailable`].
    #[must_use]
    pub fn instantiate(self) -> Box<dyn SatBackend> {
        match self {
            BackendKind::Builtin => Box::new(BuiltinSolver),
            #[cfg(feature = "z3")]
            BackendKind::Z3 => Box::new(Z3Solver),
            #[cfg(not(feature = "z3"))]
            BackendKind::Z3 => Box::new(Unavailable {
                backend: "z3",
                reason: "built without the `z3` feature",
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Builtin => write!(f, "builtin"),
            BackendKind::Z3 => write!(f, "z3"),
        }
    }
}

/// Stand-in for a backend that is not compiled in.
#[cfg_attr(feature = "z3", allow(dead_code))]
#[derive(Debug)]
struct Unavailable {
    backend: &'static str,
    reason: &'static str,
}

impl SatBackend for Unavailable {
    fn name(&self) -> &'static str {
        self.backend
    }

    fn check(
        &self,
        _symbols: &SymbolTable,
        _assertions: &[Formula],
        _limits: &SolveLimits,
    ) -> Result<SatOutcome, SolverError> {
        Err(SolverError::Unavailable {
            backend: self.backend,
            reason: self.reason.to_owned(),
        })
    }
}
