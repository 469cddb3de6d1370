use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Serialize};

use super::symbols::VarId;

/// Comparison operators supported in guard atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "equals", alias = "eq")]
    Eq,
    #[serde(rename = "not_equals", alias = "ne")]
    Neq,
    #[serde(rename = "greater_than", alias = "gt")]
    Gt,
    #[serde(rename = "greater_or_equal", alias = "ge")]
    Gte,
    #[serde(rename = "less_than", alias = "lt")]
    Lt,
    #[serde(rename = "less_or_equal", alias = "le")]
    Lte,
}

impl CompareOp {
    /// Decide `lhs OP rhs`.
    #[must_use]
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Neq => lhs != rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Gte => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Lte => lhs <= rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// A single comparison `var OP value` against an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom {
    pub var: VarId,
    pub op: CompareOp,
    pub value: i64,
}

impl Atom {
    #[must_use]
    pub fn new(var: VarId, op: CompareOp, value: i64) -> Self {
        Self { var, op, value }
    }
}

/// Solver-independent boolean constraint tree over integer variables.
///
/// Built through [`Formula::and`], [`Formula::or`] and `!`, which flatten
/// nested connectives and fold constants. A guard that places no constraint
/// therefore compiles to exactly `Formula::Const(true)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    Const(bool),
    Atom(Atom),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub const TRUE: Formula = Formula::Const(true);
    pub const FALSE: Formula = Formula::Const(false);

    #[must_use]
    pub fn atom(var: VarId, op: CompareOp, value: i64) -> Formula {
        Formula::Atom(Atom::new(var, op, value))
    }

    /// Conjunction. Empty input is `true`.
    #[must_use]
    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Formula {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Formula::Const(true) => {}
                Formula::Const(false) => return Formula::FALSE,
                Formula::And(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Formula::TRUE,
            1 => out.pop().unwrap_or(Formula::TRUE),
            _ => Formula::And(out),
        }
    }

    /// Disjunction. Empty input is `false`.
    #[must_use]
    pub fn or(parts: impl IntoIterator<Item = Formula>) -> Formula {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Formula::Const(false) => {}
                Formula::Const(true) => return Formula::TRUE,
                Formula::Or(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Formula::FALSE,
            1 => out.pop().unwrap_or(Formula::FALSE),
            _ => Formula::Or(out),
        }
    }

    /// Whether this formula is literally the constant `true`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Formula::Const(true))
    }

    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(self, Formula::Const(false))
    }

    /// Substitute `value` for `var` and fold the result.
    #[must_use]
    pub fn assign(&self, var: VarId, value: i64) -> Formula {
        match self {
            Formula::Const(_) => self.clone(),
            Formula::Atom(atom) if atom.var == var => {
                Formula::Const(atom.op.holds(value, atom.value))
            }
            Formula::Atom(_) => self.clone(),
            Formula::Not(inner) => !inner.assign(var, value),
            Formula::And(parts) => Formula::and(parts.iter().map(|p| p.assign(var, value))),
            Formula::Or(parts) => Formula::or(parts.iter().map(|p| p.assign(var, value))),
        }
    }

    /// Evaluate under a total assignment. Unassigned variables make the
    /// atom `None`, which propagates.
    #[must_use]
    pub fn eval(&self, lookup: &impl Fn(VarId) -> Option<i64>) -> Option<bool> {
        match self {
            Formula::Const(b) => Some(*b),
            Formula::Atom(atom) => lookup(atom.var).map(|v| atom.op.holds(v, atom.value)),
            Formula::Not(inner) => inner.eval(lookup).map(|b| !b),
            Formula::And(parts) => {
                let mut all = true;
                for part in parts {
                    all &= part.eval(lookup)?;
                }
                Some(all)
            }
            Formula::Or(parts) => {
                let mut any = false;
                for part in parts {
                    any |= part.eval(lookup)?;
                }
                Some(any)
            }
        }
    }

    /// Visit every atom in the tree.
    pub fn for_each_atom(&self, f: &mut impl FnMut(&Atom)) {
        match self {
            Formula::Const(_) => {}
            Formula::Atom(atom) => f(atom),
            Formula::Not(inner) => inner.for_each_atom(f),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    part.for_each_atom(f);
                }
            }
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        match self {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Const(b) => write!(f, "{b}"),
            Formula::Atom(atom) => write!(f, "(v{} {} {})", atom.var.index(), atom.op, atom.value),
            Formula::Not(inner) => write!(f, "(NOT {inner})"),
            Formula::And(parts) => write_joined(f, parts, " AND "),
            Formula::Or(parts) => write_joined(f, parts, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Formula], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{part}")?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> VarId {
        VarId::new(0)
    }

    fn y() -> VarId {
        VarId::new(1)
    }

    #[test]
    fn and_folds_constants() {
        assert_eq!(Formula::and([]), Formula::TRUE);
        assert_eq!(Formula::and([Formula::TRUE, Formula::TRUE]), Formula::TRUE);
        assert_eq!(
            Formula::and([Formula::atom(x(), CompareOp::Gt, 1), Formula::FALSE]),
            Formula::FALSE
        );
        assert_eq!(
            Formula::and([Formula::TRUE, Formula::atom(x(), CompareOp::Gt, 1)]),
            Formula::atom(x(), CompareOp::Gt, 1)
        );
    }

    #[test]
    fn or_folds_constants() {
        assert_eq!(Formula::or([]), Formula::FALSE);
        assert_eq!(
            Formula::or([Formula::atom(x(), CompareOp::Gt, 1), Formula::TRUE]),
            Formula::TRUE
        );
    }

    #[test]
    fn nested_connectives_flatten() {
        let inner = Formula::and([
            Formula::atom(x(), CompareOp::Gt, 1),
            Formula::atom(y(), CompareOp::Lt, 2),
        ]);
        let outer = Formula::and([inner, Formula::atom(x(), CompareOp::Neq, 5)]);
        match outer {
            Formula::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn double_negation_cancels() {
        let a = Formula::atom(x(), CompareOp::Eq, 3);
        assert_eq!(!!a.clone(), a);
        assert_eq!(!Formula::TRUE, Formula::FALSE);
    }

    #[test]
    fn assign_resolves_atoms() {
        let f = Formula::and([
            Formula::atom(x(), CompareOp::Gt, 10),
            Formula::atom(y(), CompareOp::Eq, 1),
        ]);
        assert_eq!(f.assign(x(), 5), Formula::FALSE);
        assert_eq!(f.assign(x(), 11), Formula::atom(y(), CompareOp::Eq, 1));
        assert_eq!(f.assign(x(), 11).assign(y(), 1), Formula::TRUE);
    }

    #[test]
    fn eval_with_lookup() {
        let f = Formula::or([
            Formula::atom(x(), CompareOp::Lte, 0),
            Formula::atom(x(), CompareOp::Gt, 100),
        ]);
        assert_eq!(f.eval(&|_| Some(0)), Some(true));
        assert_eq!(f.eval(&|_| Some(50)), Some(false));
        assert_eq!(f.eval(&|_| None), None);
    }

    #[test]
    fn all_compare_ops_hold() {
        let cases = [
            (CompareOp::Eq, 3, 3, true),
            (CompareOp::Neq, 3, 3, false),
            (CompareOp::Gt, 4, 3, true),
            (CompareOp::Gte, 3, 3, true),
            (CompareOp::Lt, 3, 3, false),
            (CompareOp::Lte, 2, 3, true),
        ];
        for (op, lhs, rhs, expected) in cases {
            assert_eq!(op.holds(lhs, rhs), expected, "failed for {op}");
        }
    }

    #[test]
    fn operator_wire_names() {
        let op: CompareOp = serde_json::from_str("\"greater_or_equal\"").unwrap();
        assert_eq!(op, CompareOp::Gte);
        let op: CompareOp = serde_json::from_str("\"ne\"").unwrap();
        assert_eq!(op, CompareOp::Neq);
        assert_eq!(serde_json::to_string(&CompareOp::Eq).unwrap(), "\"equals\"");
    }
}
