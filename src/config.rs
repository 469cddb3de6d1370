use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::parse::Precedence;
use crate::solver::{BackendKind, SolveLimits};
use crate::GuardcheckError;

/// Default cap on built-in solver decisions per query.
pub const DEFAULT_MAX_DECISIONS: u64 = 1_000_000;

/// Settings of an [`Analyzer`](crate::Analyzer).
///
/// Every field has a default, so a JSON file only needs the keys it
/// changes:
///
/// ```
/// use guardcheck::{AnalyzerConfig, BackendKind, Precedence};
///
/// let config = AnalyzerConfig::from_json(r#"{"precedence": "standard", "timeout_ms": 500}"#).unwrap();
/// assert_eq!(config.precedence, Precedence::Standard);
/// assert_eq!(config.backend, BackendKind::Builtin);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub backend: BackendKind,
    pub precedence: Precedence,
    /// Report unparsable guard text as an error instead of `true`.
    pub strict: bool,
    pub timeout_ms: Option<u64>,
    pub max_decisions: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            precedence: Precedence::default(),
            strict: false,
            timeout_ms: None,
            max_decisions: Some(DEFAULT_MAX_DECISIONS),
        }
    }
}

impl AnalyzerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`GuardcheckError::Json`] on malformed input or unknown keys.
    pub fn from_json(input: &str) -> Result<Self, GuardcheckError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`GuardcheckError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GuardcheckError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    #[must_use]
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn max_decisions(mut self, max: Option<u64>) -> Self {
        self.max_decisions = max;
        self
    }

    /// Per-query solver limits derived from this config.
    #[must_use]
    pub fn limits(&self) -> SolveLimits {
        SolveLimits {
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_decisions: self.max_decisions,
        }
    }
}
