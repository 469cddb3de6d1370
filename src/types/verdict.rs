use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete integer assignment witnessing a satisfiable query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    assignments: Vec<(String, i64)>,
}

impl Model {
    /// Build a model; entries are kept sorted by variable name.
    pub fn new(assignments: impl IntoIterator<Item = (String, i64)>) -> Self {
        let mut assignments: Vec<(String, i64)> = assignments.into_iter().collect();
        assignments.sort_by(|a, b| a.0.cmp(&b.0));
        Self { assignments }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<i64> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.assignments.iter().map(|(n, v)| (n.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (name, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        write!(f, "]")
    }
}

/// Answer to "can these two guards hold at the same time?".
///
/// When `error` is set the analysis did not run and `satisfiable` is the
/// fallback `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct SatisfiabilityVerdict {
    pub satisfiable: bool,
    pub model: Option<String>,
    pub error: Option<String>,
}

impl SatisfiabilityVerdict {
    pub fn satisfiable(model: &Model) -> Self {
        Self {
            satisfiable: true,
            model: Some(model.to_string()),
            error: None,
        }
    }

    pub fn unsatisfiable() -> Self {
        Self {
            satisfiable: false,
            model: None,
            error: None,
        }
    }

    /// Verdict reported when the analysis failed: assume the guards are disjoint.
    pub fn fallback(error: impl fmt::Display) -> Self {
        Self {
            satisfiable: false,
            model: None,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Answer to "does at least one guard fire for every input?".
///
/// When `error` is set the analysis did not run and `complete` is the
/// fallback `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct CompletenessVerdict {
    pub complete: bool,
    pub gap_model: Option<String>,
    pub error: Option<String>,
}

impl CompletenessVerdict {
    pub fn complete() -> Self {
        Self {
            complete: true,
            gap_model: None,
            error: None,
        }
    }

    pub fn gap(model: &Model) -> Self {
        Self {
            complete: false,
            gap_model: Some(model.to_string()),
            error: None,
        }
    }

    /// Verdict reported when the analysis failed: assume no gap.
    pub fn fallback(error: impl fmt::Display) -> Self {
        Self {
            complete: true,
            gap_model: None,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}
