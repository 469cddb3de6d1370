use z3::ast::{Bool, Int};
use z3::{Params, SatResult, Solver};

use crate::{Formula, Model, SymbolTable};

use super::{SatBackend, SatOutcome, SolveLimits, SolverError};

/// Backend that hands the query to Z3 over integer arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Z3Solver;

impl Z3Solver {
    fn translate(formula: &Formula, vars: &[Int]) -> Bool {
        match formula {
            Formula::Const(b) => Bool::from_bool(*b),
            Formula::Atom(atom) => {
                let var = &vars[atom.var.index()];
                let value = Int::from_i64(atom.value);
                match atom.op {
                    crate::CompareOp::Eq => Int::eq(var, &value),
                    crate::CompareOp::Neq => Int::eq(var, &value).not(),
                    crate::CompareOp::Gt => var.gt(&value),
                    crate::CompareOp::Gte => var.ge(&value),
                    crate::CompareOp::Lt => var.lt(&value),
                    crate::CompareOp::Lte => var.le(&value),
                }
            }
            Formula::Not(inner) => Self::translate(inner, vars).not(),
            Formula::And(parts) => {
                let parts: Vec<Bool> = parts.iter().map(|p| Self::translate(p, vars)).collect();
                let refs: Vec<&Bool> = parts.iter().collect();
                Bool::and(&refs)
            }
            Formula::Or(parts) => {
                let parts: Vec<Bool> = parts.iter().map(|p| Self::translate(p, vars)).collect();
                let refs: Vec<&Bool> = parts.iter().collect();
                Bool::or(&refs)
            }
        }
    }
}

impl SatBackend for Z3Solver {
    fn name(&self) -> &'static str {
        "z3"
    }

    fn check(
        &self,
        symbols: &SymbolTable,
        assertions: &[Formula],
        limits: &SolveLimits,
    ) -> Result<SatOutcome, SolverError> {
        let solver = Solver::new();
        if let Some(timeout) = limits.timeout {
            let mut params = Params::new();
            let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            params.set_u32("timeout", millis);
            solver.set_params(&params);
        }

        let vars: Vec<Int> = symbols.iter().map(|(_, name)| Int::new_const(name)).collect();
        let mut used = vec![false; vars.len()];
        for formula in assertions {
            formula.for_each_atom(&mut |atom| used[atom.var.index()] = true);
            solver.assert(&Self::translate(formula, &vars));
        }

        match solver.check() {
            SatResult::Unsat => Ok(SatOutcome::Unsat),
            SatResult::Unknown => {
                let reason = solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "no reason given".to_owned());
                if reason.contains("timeout") || reason.contains("canceled") {
                    if let Some(timeout) = limits.timeout {
                        return Err(SolverError::Timeout(timeout));
                    }
                }
                Err(SolverError::Unknown(reason))
            }
            SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| SolverError::Backend("sat result without a model".into()))?;
                let mut assignments = Vec::new();
                for (id, name) in symbols.iter() {
                    if !used[id.index()] {
                        continue;
                    }
                    let value = model
                        .eval(&vars[id.index()], true)
                        .and_then(|v| v.as_i64())
                        .ok_or_else(|| {
                            SolverError::Backend(format!("no 64-bit value for '{name}'"))
                        })?;
                    assignments.push((name.to_owned(), value));
                }
                Ok(SatOutcome::Sat(Model::new(assignments)))
            }
        }
    }
}
