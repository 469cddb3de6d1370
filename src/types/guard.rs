use serde::{Deserialize, Serialize};

use super::formula::CompareOp;

/// Right-hand side of a protocol field condition, as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Any other JSON shape. Coerces to `0`.
    Other(serde_json::Value),
}

impl From<i64> for ConditionValue {
    fn from(v: i64) -> Self {
        ConditionValue::Int(v)
    }
}

impl From<f64> for ConditionValue {
    fn from(v: f64) -> Self {
        ConditionValue::Float(v)
    }
}

impl From<bool> for ConditionValue {
    fn from(v: bool) -> Self {
        ConditionValue::Bool(v)
    }
}

impl From<&str> for ConditionValue {
    fn from(v: &str) -> Self {
        ConditionValue::Text(v.to_owned())
    }
}

impl From<String> for ConditionValue {
    fn from(v: String) -> Self {
        ConditionValue::Text(v)
    }
}

/// "Field `field_id` compared to `value`", one entry of a protocol guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub field_id: String,
    pub operator: CompareOp,
    #[serde(default)]
    pub value: Option<ConditionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_option_name: Option<String>,
}

impl FieldCondition {
    #[must_use]
    pub fn new(field_id: &str, operator: CompareOp, value: impl Into<ConditionValue>) -> Self {
        Self {
            field_id: field_id.to_owned(),
            operator,
            value: Some(value.into()),
            field_option_name: None,
        }
    }

    /// Name of the solver variable this condition constrains.
    #[must_use]
    pub fn variable_name(&self) -> String {
        format!("field_{}", self.field_id)
    }
}

/// Boolean condition gating an FSM transition.
///
/// On the wire a guard is `{type, protocolConditions?, manualExpression?}`;
/// fields that do not belong to the tag are ignored when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGuard", into = "RawGuard")]
pub enum Guard {
    /// Field conditions, implicitly conjoined.
    Protocol(Vec<FieldCondition>),
    /// Free-text expression such as `x > 10 && y == 1`.
    Manual(String),
    AlwaysTrue,
}

impl Guard {
    #[must_use]
    pub fn manual(expression: &str) -> Self {
        Guard::Manual(expression.to_owned())
    }

    #[must_use]
    pub fn protocol(conditions: Vec<FieldCondition>) -> Self {
        Guard::Protocol(conditions)
    }

    /// Whether the guard carries no constraint at all, before compilation.
    #[must_use]
    pub fn is_vacuous(&self) -> bool {
        match self {
            Guard::AlwaysTrue => true,
            Guard::Protocol(conditions) => conditions.is_empty(),
            Guard::Manual(text) => text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum GuardKind {
    Protocol,
    Manual,
    AlwaysTrue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGuard {
    #[serde(rename = "type")]
    kind: GuardKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protocol_conditions: Option<Vec<FieldCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manual_expression: Option<String>,
}

impl From<RawGuard> for Guard {
    fn from(raw: RawGuard) -> Self {
        match raw.kind {
            GuardKind::Protocol => Guard::Protocol(raw.protocol_conditions.unwrap_or_default()),
            GuardKind::Manual => Guard::Manual(raw.manual_expression.unwrap_or_default()),
            GuardKind::AlwaysTrue => Guard::AlwaysTrue,
        }
    }
}

impl From<Guard> for RawGuard {
    fn from(guard: Guard) -> Self {
        match guard {
            Guard::Protocol(conditions) => RawGuard {
                kind: GuardKind::Protocol,
                protocol_conditions: Some(conditions),
                manual_expression: None,
            },
            Guard::Manual(text) => RawGuard {
                kind: GuardKind::Manual,
                protocol_conditions: None,
                manual_expression: Some(text),
            },
            Guard::AlwaysTrue => RawGuard {
                kind: GuardKind::AlwaysTrue,
                protocol_conditions: None,
                manual_expression: None,
            },
        }
    }
}
