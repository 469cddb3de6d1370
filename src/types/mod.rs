mod error;
mod formula;
mod guard;
mod request;
mod symbols;
mod variable;
mod verdict;

pub use error::DomainError;
pub use formula::{Atom, CompareOp, Formula};
pub use guard::{ConditionValue, FieldCondition, Guard};
pub use request::{CheckCompletenessRequest, CheckGuardsRequest};
pub use symbols::{SymbolTable, VarId};
pub use variable::{EfsmVariable, VariableType};
pub use verdict::{CompletenessVerdict, Model, SatisfiabilityVerdict};
