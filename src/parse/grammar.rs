use winnow::ascii::{digit1, Caseless};
use winnow::combinator::{alt, delimited, opt, preceded, separated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{literal, take_while};

use crate::CompareOp;

use super::expr::{Comparison, GuardExpr};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .context(StrContext::Expected(StrContextValue::Description(
            "variable name",
        )))
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn int_literal(input: &mut &str) -> ModalResult<i64> {
    (opt('-'), digit1)
        .take()
        .try_map(str::parse::<i64>)
        .context(StrContext::Expected(StrContextValue::Description(
            "integer literal",
        )))
        .parse_next(input)
}

fn bool_literal(input: &mut &str) -> ModalResult<i64> {
    alt((
        literal(Caseless("true")).value(1),
        literal(Caseless("false")).value(0),
    ))
    .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    alt((
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
        ">=".value(CompareOp::Gte),
        "<=".value(CompareOp::Lte),
        ">".value(CompareOp::Gt),
        "<".value(CompareOp::Lt),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "comparison operator",
    )))
    .parse_next(input)
}

/// `name OP literal`. Boolean literals only pair with `==` and `!=`.
pub(super) fn comparison(input: &mut &str) -> ModalResult<Comparison> {
    let name = preceded(ws, ident).parse_next(input)?;
    let op = preceded(ws, compare_op).parse_next(input)?;
    ws.parse_next(input)?;
    let value = match op {
        CompareOp::Eq | CompareOp::Neq => alt((int_literal, bool_literal)).parse_next(input)?,
        _ => int_literal.parse_next(input)?,
    };
    ws.parse_next(input)?;
    Ok(Comparison {
        name: name.to_owned(),
        op,
        value,
    })
}

// -- Standard precedence (OR < AND < parentheses) ---------------------------

fn primary(input: &mut &str) -> ModalResult<GuardExpr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', or_expr, (ws, ')')),
        comparison.map(GuardExpr::Compare),
    ))
    .parse_next(input)
}

fn and_expr(input: &mut &str) -> ModalResult<GuardExpr> {
    separated(1.., primary, (ws, "&&"))
        .map(GuardExpr::and)
        .parse_next(input)
}

fn or_expr(input: &mut &str) -> ModalResult<GuardExpr> {
    separated(1.., and_expr, (ws, "||"))
        .map(GuardExpr::or)
        .parse_next(input)
}

/// Whole-input expression with standard precedence.
pub(super) fn expression(input: &mut &str) -> ModalResult<GuardExpr> {
    let expr = or_expr.parse_next(input)?;
    ws.parse_next(input)?;
    Ok(expr)
}
