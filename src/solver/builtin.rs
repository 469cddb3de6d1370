use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::{Formula, Model, SymbolTable, VarId};

use super::{SatBackend, SatOutcome, SolveLimits, SolverError};

/// Decisions between two deadline checks.
const CLOCK_INTERVAL: u64 = 256;

/// Exact decision procedure for guard formulas.
///
/// Every atom compares a single variable with a constant, so the integers
/// split into finitely many regions per variable on which every atom keeps
/// its truth value. Picking `c - 1`, `c` and `c + 1` for each constant `c`
/// hits every region; a depth-first search over those candidates, folding
/// the formula after each assignment, is therefore complete.
///
/// Candidates are tried smallest magnitude first, so witnesses stay close to
/// zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSolver;

impl SatBackend for BuiltinSolver {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn check(
        &self,
        symbols: &SymbolTable,
        assertions: &[Formula],
        limits: &SolveLimits,
    ) -> Result<SatOutcome, SolverError> {
        let formula = Formula::and(assertions.iter().cloned());
        let candidates = candidate_values(&formula);

        let mut order: Vec<VarId> = candidates.keys().copied().collect();
        order.sort_by_key(|var| (candidates[var].len(), *var));

        let mut search = Search {
            candidates: &candidates,
            limits,
            started: Instant::now(),
            decisions: 0,
            assignment: BTreeMap::new(),
        };
        if !search.solve(&formula, &order)? {
            return Ok(SatOutcome::Unsat);
        }

        let model = Model::new(candidates.iter().map(|(var, values)| {
            let value = search
                .assignment
                .get(var)
                .copied()
                .or_else(|| values.first().copied())
                .unwrap_or(0);
            (symbols.name(*var).to_owned(), value)
        }));
        Ok(SatOutcome::Sat(model))
    }
}

struct Search<'a> {
    candidates: &'a BTreeMap<VarId, Vec<i64>>,
    limits: &'a SolveLimits,
    started: Instant,
    decisions: u64,
    assignment: BTreeMap<VarId, i64>,
}

impl Search<'_> {
    fn solve(&mut self, formula: &Formula, order: &[VarId]) -> Result<bool, SolverError> {
        if let Formula::Const(b) = formula {
            return Ok(*b);
        }
        let Some((&var, rest)) = order.split_first() else {
            return Ok(false);
        };
        if !mentions(formula, var) {
            return self.solve(formula, rest);
        }

        let candidates = self.candidates;
        for &value in &candidates[&var] {
            self.tick()?;
            let reduced = formula.assign(var, value);
            if reduced.is_false() {
                continue;
            }
            self.assignment.insert(var, value);
            if self.solve(&reduced, rest)? {
                return Ok(true);
            }
            self.assignment.remove(&var);
        }
        Ok(false)
    }

    fn tick(&mut self) -> Result<(), SolverError> {
        self.decisions += 1;
        if let Some(max) = self.limits.max_decisions {
            if self.decisions > max {
                return Err(SolverError::BudgetExhausted(max));
            }
        }
        if let Some(timeout) = self.limits.timeout {
            if self.decisions % CLOCK_INTERVAL == 0 && self.started.elapsed() > timeout {
                return Err(SolverError::Timeout(timeout));
            }
        }
        Ok(())
    }
}

fn mentions(formula: &Formula, var: VarId) -> bool {
    let mut found = false;
    formula.for_each_atom(&mut |atom| found |= atom.var == var);
    found
}

/// Representative values per variable, smallest magnitude first.
fn candidate_values(formula: &Formula) -> BTreeMap<VarId, Vec<i64>> {
    let mut sets: BTreeMap<VarId, BTreeSet<i64>> = BTreeMap::new();
    formula.for_each_atom(&mut |atom| {
        let set = sets.entry(atom.var).or_insert_with(|| BTreeSet::from([0]));
        set.insert(atom.value);
        if let Some(below) = atom.value.checked_sub(1) {
            set.insert(below);
        }
        if let Some(above) = atom.value.checked_add(1) {
            set.insert(above);
        }
    });
    sets.into_iter()
        .map(|(var, set)| {
            let mut values: Vec<i64> = set.into_iter().collect();
            values.sort_by_key(|v| (v.unsigned_abs(), *v < 0));
            (var, values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompareOp;

    fn solve(symbols: &SymbolTable, assertions: &[Formula]) -> SatOutcome {
        BuiltinSolver
            .check(symbols, assertions, &SolveLimits::default())
            .unwrap()
    }

    #[test]
    fn empty_query_is_sat_with_empty_model() {
        let outcome = solve(&SymbolTable::new(), &[]);
        assert_eq!(outcome, SatOutcome::Sat(Model::default()));
    }

    #[test]
    fn disjoint_ranges_unsat() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let outcome = solve(
            &symbols,
            &[
                Formula::atom(x, CompareOp::Gt, 10),
                Formula::atom(x, CompareOp::Lt, 5),
            ],
        );
        assert_eq!(outcome, SatOutcome::Unsat);
    }

    #[test]
    fn overlapping_ranges_sat_with_witness() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let outcome = solve(
            &symbols,
            &[
                Formula::atom(x, CompareOp::Gt, 10),
                Formula::atom(x, CompareOp::Gt, 20),
            ],
        );
        match outcome {
            SatOutcome::Sat(model) => assert_eq!(model.get("x"), Some(21)),
            SatOutcome::Unsat => panic!("expected sat"),
        }
    }

    #[test]
    fn prefers_small_witnesses() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let outcome = solve(
            &symbols,
            &[
                Formula::atom(x, CompareOp::Gte, -10),
                Formula::atom(x, CompareOp::Lte, 10),
                !Formula::atom(x, CompareOp::Gt, 0),
            ],
        );
        assert_eq!(
            outcome,
            SatOutcome::Sat(Model::new([("x".to_owned(), 0)]))
        );
    }

    #[test]
    fn single_gap_between_constants() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        // x != 1 && x != 2 && x >= 1 && x <= 3 -> only x = 3
        let outcome = solve(
            &symbols,
            &[
                Formula::atom(x, CompareOp::Neq, 1),
                Formula::atom(x, CompareOp::Neq, 2),
                Formula::atom(x, CompareOp::Gte, 1),
                Formula::atom(x, CompareOp::Lte, 3),
            ],
        );
        match outcome {
            SatOutcome::Sat(model) => assert_eq!(model.get("x"), Some(3)),
            SatOutcome::Unsat => panic!("expected sat"),
        }
    }

    #[test]
    fn multiple_variables() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let y = symbols.intern("y");
        let outcome = solve(
            &symbols,
            &[
                Formula::or([
                    Formula::atom(x, CompareOp::Eq, 5),
                    Formula::atom(y, CompareOp::Eq, 7),
                ]),
                Formula::atom(x, CompareOp::Neq, 5),
            ],
        );
        match outcome {
            SatOutcome::Sat(model) => {
                assert_eq!(model.get("y"), Some(7));
                assert_ne!(model.get("x"), Some(5));
            }
            SatOutcome::Unsat => panic!("expected sat"),
        }
    }

    #[test]
    fn extreme_constants_do_not_overflow() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let outcome = solve(&symbols, &[Formula::atom(x, CompareOp::Gt, i64::MAX)]);
        assert_eq!(outcome, SatOutcome::Unsat);
        let outcome = solve(&symbols, &[Formula::atom(x, CompareOp::Lte, i64::MIN)]);
        assert_eq!(
            outcome,
            SatOutcome::Sat(Model::new([("x".to_owned(), i64::MIN)]))
        );
    }

    #[test]
    fn decision_budget_is_enforced() {
        let mut symbols = SymbolTable::new();
        let vars: Vec<VarId> = (0..8).map(|i| symbols.intern(&format!("v{i}"))).collect();
        // unsat only after exploring every combination
        let nonzero = Formula::and(vars.iter().map(|&v| Formula::atom(v, CompareOp::Neq, 0)));
        let blocker = Formula::or(vars.iter().map(|&v| Formula::atom(v, CompareOp::Eq, 0)));
        let limits = SolveLimits {
            timeout: None,
            max_decisions: Some(5),
        };
        let result = BuiltinSolver.check(&symbols, &[nonzero, blocker], &limits);
        assert_eq!(result, Err(SolverError::BudgetExhausted(5)));
    }
}
