use serde::{Deserialize, Serialize};

use super::guard::Guard;
use super::variable::EfsmVariable;

/// Body of a pairwise satisfiability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckGuardsRequest {
    pub guard1: Guard,
    pub guard2: Guard,
}

/// Body of a completeness check for one (state, event) pair.
///
/// `state` and `event` are caller labels. They are attached to log events
/// and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckCompletenessRequest {
    pub guards: Vec<Guard>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub variables: Option<Vec<EfsmVariable>>,
}
