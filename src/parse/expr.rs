use std::fmt;

use crate::CompareOp;

/// `name OP value` as written in a manual guard, before the name is bound
/// to a solver variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub name: String,
    pub op: CompareOp,
    pub value: i64,
}

/// Parsed manual guard expression.
///
/// Parsing never fails outright: text that does not match the grammar is
/// kept as an [`GuardExpr::Unparsed`] leaf and the compiler decides whether
/// that means `true` or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardExpr {
    /// Blank expression. Carries no constraint.
    Empty,
    Compare(Comparison),
    And(Vec<GuardExpr>),
    Or(Vec<GuardExpr>),
    Unparsed { text: String, reason: String },
}

impl GuardExpr {
    pub(crate) fn unparsed(text: &str, reason: impl Into<String>) -> Self {
        GuardExpr::Unparsed {
            text: text.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn and(mut parts: Vec<GuardExpr>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            GuardExpr::And(parts)
        }
    }

    pub(crate) fn or(mut parts: Vec<GuardExpr>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            GuardExpr::Or(parts)
        }
    }

    /// Whether any leaf failed to parse.
    #[must_use]
    pub fn has_unparsed(&self) -> bool {
        match self {
            GuardExpr::Unparsed { .. } => true,
            GuardExpr::And(parts) | GuardExpr::Or(parts) => parts.iter().any(Self::has_unparsed),
            GuardExpr::Empty | GuardExpr::Compare(_) => false,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.op, self.value)
    }
}

impl fmt::Display for GuardExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardExpr::Empty => write!(f, "true"),
            GuardExpr::Compare(cmp) => write!(f, "({cmp})"),
            GuardExpr::And(parts) => write_joined(f, parts, " && "),
            GuardExpr::Or(parts) => write_joined(f, parts, " || "),
            GuardExpr::Unparsed { text, .. } => write!(f, "<unparsed '{text}'>"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[GuardExpr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{part}")?;
    }
    write!(f, ")")
}
