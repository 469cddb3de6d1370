use crate::parse::{parse_expression, GuardExpr, ParseError, Precedence};
use crate::{ConditionValue, FieldCondition, Formula, Guard, SymbolTable};

/// Modulus applied to hashed string codes.
pub const STRING_CODE_MODULUS: u64 = 10_000;

/// Translates [`Guard`]s into [`Formula`]s over the variables of one
/// [`SymbolTable`].
///
/// The compiler borrows the table mutably, so every guard compiled through
/// the same compiler shares variables by name.
#[derive(Debug)]
pub struct GuardCompiler<'a> {
    symbols: &'a mut SymbolTable,
    precedence: Precedence,
    strict: bool,
}

impl<'a> GuardCompiler<'a> {
    pub fn new(symbols: &'a mut SymbolTable) -> Self {
        Self {
            symbols,
            precedence: Precedence::default(),
            strict: false,
        }
    }

    #[must_use]
    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Report unparsable manual text as [`ParseError`] instead of `true`.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Compile one guard.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] only in strict mode, for manual text that does
    /// not match the grammar.
    pub fn compile(&mut self, guard: &Guard) -> Result<Formula, ParseError> {
        match guard {
            _ if guard.is_vacuous() => Ok(Formula::TRUE),
            Guard::AlwaysTrue => Ok(Formula::TRUE),
            Guard::Protocol(conditions) => Ok(Formula::and(
                conditions.iter().map(|c| self.compile_condition(c)),
            )),
            Guard::Manual(text) => {
                let expr = parse_expression(text, self.precedence);
                self.compile_expr(&expr)
            }
        }
    }

    fn compile_condition(&mut self, condition: &FieldCondition) -> Formula {
        let var = self.symbols.intern(&condition.variable_name());
        let value = condition.value.as_ref().map_or(0, coerce_value);
        Formula::atom(var, condition.operator, value)
    }

    fn compile_expr(&mut self, expr: &GuardExpr) -> Result<Formula, ParseError> {
        match expr {
            GuardExpr::Empty => Ok(Formula::TRUE),
            GuardExpr::Compare(cmp) => {
                let var = self.symbols.intern(&cmp.name);
                Ok(Formula::atom(var, cmp.op, cmp.value))
            }
            GuardExpr::And(parts) => {
                let compiled = parts
                    .iter()
                    .map(|p| self.compile_expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Formula::and(compiled))
            }
            GuardExpr::Or(parts) => {
                let compiled = parts
                    .iter()
                    .map(|p| self.compile_expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Formula::or(compiled))
            }
            GuardExpr::Unparsed { text, reason } => {
                if self.strict {
                    Err(ParseError::new(text.as_str(), reason.as_str()))
                } else {
                    tracing::debug!(expression = %text, "unparsed guard text treated as true");
                    Ok(Formula::TRUE)
                }
            }
        }
    }
}

/// Compile a single guard with a fresh symbol table and default settings.
#[must_use]
pub fn compile_guard(guard: &Guard) -> (Formula, SymbolTable) {
    let mut symbols = SymbolTable::new();
    let formula = GuardCompiler::new(&mut symbols)
        .compile(guard)
        .unwrap_or(Formula::TRUE);
    (formula, symbols)
}

/// Integer a protocol condition value compares against.
///
/// Floats truncate toward zero and saturate at the `i64` bounds, so values
/// beyond ±2^63 (including JSON integers too large for `i64`) all compare as
/// `i64::MIN` / `i64::MAX`. Booleans map to 1/0, strings holding an integer
/// (surrounding whitespace allowed) parse, other strings become
/// [`string_code`], anything else is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_value(value: &ConditionValue) -> i64 {
    match value {
        ConditionValue::Int(v) => *v,
        ConditionValue::Float(v) => v.trunc() as i64,
        ConditionValue::Bool(b) => i64::from(*b),
        ConditionValue::Text(s) => s.trim().parse::<i64>().unwrap_or_else(|_| string_code(s)),
        ConditionValue::Other(_) => 0,
    }
}

/// Stable pseudo-numeric code for a non-numeric string, in
/// `0..STRING_CODE_MODULUS`.
///
/// Equal strings always map to equal codes, in every process. Distinct
/// strings may collide.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn string_code(value: &str) -> i64 {
    let digest = blake3::hash(value.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    (u64::from_le_bytes(prefix) % STRING_CODE_MODULUS) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompareOp;

    #[test]
    fn always_true_compiles_to_true() {
        let (formula, symbols) = compile_guard(&Guard::AlwaysTrue);
        assert!(formula.is_true());
        assert!(symbols.is_empty());
    }

    #[test]
    fn vacuous_guards_compile_to_true() {
        assert!(compile_guard(&Guard::Protocol(vec![])).0.is_true());
        assert!(compile_guard(&Guard::manual("  ")).0.is_true());
    }

    #[test]
    fn protocol_conditions_conjoin_over_prefixed_names() {
        let guard = Guard::protocol(vec![
            FieldCondition::new("len", CompareOp::Gt, 4_i64),
            FieldCondition::new("len", CompareOp::Lt, 10_i64),
        ]);
        let (formula, symbols) = compile_guard(&guard);
        let len = symbols.get("field_len").unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(
            formula,
            Formula::and([
                Formula::atom(len, CompareOp::Gt, 4),
                Formula::atom(len, CompareOp::Lt, 10),
            ])
        );
    }

    #[test]
    fn string_value_uses_stable_code() {
        let guard = Guard::protocol(vec![FieldCondition::new("status", CompareOp::Eq, "OK")]);
        let (first, symbols) = compile_guard(&guard);
        let (second, _) = compile_guard(&guard);
        assert_eq!(first, second);
        let status = symbols.get("field_status").unwrap();
        assert_eq!(first, Formula::atom(status, CompareOp::Eq, string_code("OK")));
    }

    #[test]
    fn coerce_value_shapes() {
        assert_eq!(coerce_value(&ConditionValue::Int(7)), 7);
        assert_eq!(coerce_value(&ConditionValue::Float(3.9)), 3);
        assert_eq!(coerce_value(&ConditionValue::Float(-3.9)), -3);
        assert_eq!(coerce_value(&ConditionValue::Bool(true)), 1);
        assert_eq!(coerce_value(&ConditionValue::Text("42".into())), 42);
        assert_eq!(coerce_value(&ConditionValue::Text("-8".into())), -8);
        assert_eq!(
            coerce_value(&ConditionValue::Other(serde_json::json!([1, 2]))),
            0
        );
    }

    #[test]
    fn numeric_text_ignores_surrounding_whitespace() {
        assert_eq!(coerce_value(&ConditionValue::Text(" 42".into())), 42);
        assert_eq!(coerce_value(&ConditionValue::Text("42 \n".into())), 42);
        assert_eq!(
            coerce_value(&ConditionValue::Text(" OK ".into())),
            string_code(" OK ")
        );
    }

    #[test]
    fn out_of_range_floats_saturate() {
        assert_eq!(coerce_value(&ConditionValue::Float(1e19)), i64::MAX);
        assert_eq!(coerce_value(&ConditionValue::Float(9.3e18)), i64::MAX);
        assert_eq!(coerce_value(&ConditionValue::Float(-1e19)), i64::MIN);
        let huge: ConditionValue = serde_json::from_str("18446744073709551616").unwrap();
        assert_eq!(coerce_value(&huge), i64::MAX);
    }

    #[test]
    fn missing_value_is_zero() {
        let mut cond = FieldCondition::new("flag", CompareOp::Eq, 1_i64);
        cond.value = None;
        let (formula, symbols) = compile_guard(&Guard::protocol(vec![cond]));
        let flag = symbols.get("field_flag").unwrap();
        assert_eq!(formula, Formula::atom(flag, CompareOp::Eq, 0));
    }

    #[test]
    fn string_code_in_range() {
        for s in ["OK", "ERROR", "", "a much longer value with spaces"] {
            let code = string_code(s);
            assert!((0..10_000).contains(&code), "{s:?} -> {code}");
        }
    }

    #[test]
    fn manual_guard_shares_variables_through_table() {
        let mut symbols = SymbolTable::new();
        let mut compiler = GuardCompiler::new(&mut symbols);
        let a = compiler.compile(&Guard::manual("x > 10")).unwrap();
        let b = compiler.compile(&Guard::manual("x < 5")).unwrap();
        let mut vars = Vec::new();
        a.for_each_atom(&mut |atom| vars.push(atom.var));
        b.for_each_atom(&mut |atom| vars.push(atom.var));
        assert_eq!(vars[0], vars[1]);
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn manual_bool_literal() {
        let (formula, symbols) = compile_guard(&Guard::manual("connack_rc == true"));
        let var = symbols.get("connack_rc").unwrap();
        assert_eq!(formula, Formula::atom(var, CompareOp::Eq, 1));
    }

    #[test]
    fn malformed_manual_is_true_by_default() {
        assert!(compile_guard(&Guard::manual("x >>> 10")).0.is_true());
    }

    #[test]
    fn malformed_manual_errors_in_strict_mode() {
        let mut symbols = SymbolTable::new();
        let result = GuardCompiler::new(&mut symbols)
            .strict(true)
            .compile(&Guard::manual("x >>> 10"));
        assert!(result.is_err());
    }

    #[test]
    fn legacy_partial_parse_keeps_good_segment() {
        let (formula, symbols) = compile_guard(&Guard::manual("x > 1 && y >>> 2"));
        let x = symbols.get("x").unwrap();
        assert_eq!(formula, Formula::atom(x, CompareOp::Gt, 1));
    }
}
