use std::fmt;

/// A guard expression that does not match the supported grammar.
///
/// Only surfaced in strict mode; by default such expressions compile to
/// `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    expression: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// The offending (sub)expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error in guard '{}': {}",
            self.expression, self.message
        )
    }
}

impl std::error::Error for ParseError {}
