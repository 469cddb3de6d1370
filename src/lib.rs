//! Static analysis of FSM transition guards.
//!
//! Guards are compiled into integer constraint [`Formula`]s and handed to a
//! [`SatBackend`]. Two questions are answered: can two guards hold at the
//! same time, and does a set of guards cover every input in a declared
//! variable domain.

mod analyze;
pub mod compile;
mod config;
mod error;
pub mod fsm;
pub mod parse;
pub mod solver;
mod types;

pub use analyze::{check_guards_complete, check_guards_satisfiable, Analyzer};
pub use config::{AnalyzerConfig, DEFAULT_MAX_DECISIONS};
pub use error::GuardcheckError;
pub use parse::{ParseError, Precedence};
pub use solver::{BackendKind, SatBackend, SatOutcome, SolveLimits, SolverError};
pub use types::{
    Atom, CheckCompletenessRequest, CheckGuardsRequest, CompareOp, CompletenessVerdict,
    ConditionValue, DomainError, EfsmVariable, FieldCondition, Formula, Guard, Model,
    SatisfiabilityVerdict, SymbolTable, VarId, VariableType,
};
