mod error;
mod expr;
mod grammar;

use serde::{Deserialize, Serialize};
use winnow::Parser;

pub use error::ParseError;
pub use expr::{Comparison, GuardExpr};

/// How `&&` and `||` group in manual guard expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// Split the whole text on every `&&` first, then each part on `||`. No
    /// parentheses. `a || b && c` reads as `(a || b) && c`. Unparsable
    /// segments are isolated to their own leaf.
    #[default]
    Legacy,
    /// `&&` binds tighter than `||`, parentheses group. Any syntax error
    /// makes the whole expression unparsed.
    Standard,
}

/// Parse a single `name OP literal` comparison.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not exactly one comparison.
pub fn parse_comparison(input: &str) -> Result<Comparison, ParseError> {
    grammar::comparison
        .parse(input)
        .map_err(|e| ParseError::new(input.trim(), e.to_string()))
}

/// Parse a manual guard expression. Never fails; see [`GuardExpr::Unparsed`].
#[must_use]
pub fn parse_expression(input: &str, precedence: Precedence) -> GuardExpr {
    if input.trim().is_empty() {
        return GuardExpr::Empty;
    }
    match precedence {
        Precedence::Legacy => parse_legacy(input),
        Precedence::Standard => match grammar::expression.parse(input) {
            Ok(expr) => expr,
            Err(e) => GuardExpr::unparsed(input.trim(), e.to_string()),
        },
    }
}

fn parse_legacy(input: &str) -> GuardExpr {
    let text = input.trim();
    if text.contains("&&") {
        return GuardExpr::and(text.split("&&").map(legacy_segment).collect());
    }
    if text.contains("||") {
        return GuardExpr::or(text.split("||").map(legacy_segment).collect());
    }
    match parse_comparison(text) {
        Ok(cmp) => GuardExpr::Compare(cmp),
        Err(e) => GuardExpr::unparsed(text, e.to_string()),
    }
}

fn legacy_segment(segment: &str) -> GuardExpr {
    if segment.trim().is_empty() {
        GuardExpr::unparsed("", "empty operand")
    } else {
        parse_legacy(segment)
    }
}
