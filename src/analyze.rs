use tracing::{debug, warn};

use crate::compile::GuardCompiler;
use crate::solver::{SatBackend, SatOutcome};
use crate::{
    AnalyzerConfig, CheckCompletenessRequest, CheckGuardsRequest, CompletenessVerdict,
    EfsmVariable, Formula, Guard, GuardcheckError, SatisfiabilityVerdict, SymbolTable,
};

/// Runs satisfiability and completeness queries over guards.
///
/// Immutable after construction and safe to share across threads. Every
/// query builds its own symbol table and solver state, so concurrent calls
/// never observe each other's variables.
///
/// # Example
///
/// ```
/// use guardcheck::{Analyzer, Guard};
///
/// let analyzer = Analyzer::default();
/// let verdict = analyzer.check_guards_satisfiable(&Guard::manual("x > 10"), &Guard::manual("x < 5"));
/// assert!(!verdict.satisfiable);
/// assert!(verdict.error.is_none());
/// ```
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    backend: Box<dyn SatBackend>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        let backend = config.backend.instantiate();
        Self { config, backend }
    }

    /// Use a caller-provided backend instead of the one named in `config`.
    #[must_use]
    pub fn with_backend(config: AnalyzerConfig, backend: Box<dyn SatBackend>) -> Self {
        Self { config, backend }
    }

    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn compiler<'a>(&self, symbols: &'a mut SymbolTable) -> GuardCompiler<'a> {
        GuardCompiler::new(symbols)
            .precedence(self.config.precedence)
            .strict(self.config.strict)
    }

    /// Can `guard1` and `guard2` hold at the same time?
    ///
    /// Failures are reported in `error` with `satisfiable = false`.
    pub fn check_guards_satisfiable(&self, guard1: &Guard, guard2: &Guard) -> SatisfiabilityVerdict {
        match self.try_check_guards_satisfiable(guard1, guard2) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "satisfiability check failed; assuming guards are disjoint");
                SatisfiabilityVerdict::fallback(e)
            }
        }
    }

    /// [`check_guards_satisfiable`](Self::check_guards_satisfiable) without
    /// the fallback.
    ///
    /// # Errors
    ///
    /// Returns [`GuardcheckError`] on strict-mode parse errors or solver
    /// failure.
    pub fn try_check_guards_satisfiable(
        &self,
        guard1: &Guard,
        guard2: &Guard,
    ) -> Result<SatisfiabilityVerdict, GuardcheckError> {
        let mut symbols = SymbolTable::new();
        let mut compiler = self.compiler(&mut symbols);
        let first = compiler.compile(guard1)?;
        let second = compiler.compile(guard2)?;

        let outcome = self
            .backend
            .check(&symbols, &[first, second], &self.config.limits())?;
        let verdict = match outcome {
            SatOutcome::Sat(model) => SatisfiabilityVerdict::satisfiable(&model),
            SatOutcome::Unsat => SatisfiabilityVerdict::unsatisfiable(),
        };
        debug!(
            backend = self.backend.name(),
            satisfiable = verdict.satisfiable,
            model = verdict.model.as_deref().unwrap_or(""),
            "guard pair checked"
        );
        Ok(verdict)
    }

    /// Does at least one of `guards` hold for every input in the declared
    /// domain of `variables`?
    ///
    /// Failures are reported in `error` with `complete = true`.
    pub fn check_guards_complete(
        &self,
        guards: &[Guard],
        variables: &[EfsmVariable],
    ) -> CompletenessVerdict {
        match self.try_check_guards_complete(guards, variables) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "completeness check failed; assuming guards are complete");
                CompletenessVerdict::fallback(e)
            }
        }
    }

    /// [`check_guards_complete`](Self::check_guards_complete) without the
    /// fallback.
    ///
    /// # Errors
    ///
    /// Returns [`GuardcheckError`] on strict-mode parse errors, malformed
    /// variable domains, or solver failure.
    pub fn try_check_guards_complete(
        &self,
        guards: &[Guard],
        variables: &[EfsmVariable],
    ) -> Result<CompletenessVerdict, GuardcheckError> {
        let mut symbols = SymbolTable::new();
        let mut compiler = self.compiler(&mut symbols);
        let compiled = guards
            .iter()
            .map(|g| compiler.compile(g))
            .collect::<Result<Vec<_>, _>>()?;

        if compiled.iter().all(Formula::is_true) {
            debug!(guards = guards.len(), "guards trivially complete");
            return Ok(CompletenessVerdict::complete());
        }

        let mut assertions = Vec::with_capacity(variables.len() + 1);
        for variable in variables {
            let var = symbols.intern(&variable.name);
            assertions.push(variable.domain_constraint(var)?);
        }
        assertions.push(!Formula::or(compiled));

        let outcome = self
            .backend
            .check(&symbols, &assertions, &self.config.limits())?;
        let verdict = match outcome {
            SatOutcome::Sat(model) => CompletenessVerdict::gap(&model),
            SatOutcome::Unsat => CompletenessVerdict::complete(),
        };
        debug!(
            backend = self.backend.name(),
            complete = verdict.complete,
            gap = verdict.gap_model.as_deref().unwrap_or(""),
            "guard set checked"
        );
        Ok(verdict)
    }

    /// Wire-level entry point for a pairwise check.
    pub fn check_guards_request(&self, request: &CheckGuardsRequest) -> SatisfiabilityVerdict {
        self.check_guards_satisfiable(&request.guard1, &request.guard2)
    }

    /// Wire-level entry point for a completeness check. `state` and `event`
    /// only label the log span.
    #[tracing::instrument(skip_all, fields(state = %request.state, event = %request.event))]
    pub fn check_completeness_request(
        &self,
        request: &CheckCompletenessRequest,
    ) -> CompletenessVerdict {
        self.check_guards_complete(
            &request.guards,
            request.variables.as_deref().unwrap_or_default(),
        )
    }
}

/// Pairwise satisfiability with the default configuration.
pub fn check_guards_satisfiable(guard1: &Guard, guard2: &Guard) -> SatisfiabilityVerdict {
    Analyzer::default().check_guards_satisfiable(guard1, guard2)
}

/// Completeness with the default configuration.
pub fn check_guards_complete(guards: &[Guard], variables: &[EfsmVariable]) -> CompletenessVerdict {
    Analyzer::default().check_guards_complete(guards, variables)
}
