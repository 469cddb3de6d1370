use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::formula::{CompareOp, Formula};
use super::symbols::VarId;

/// Declared type of an EFSM variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Int,
    Bool,
    Enum,
}

/// Typed variable of an extended FSM. Only used to bound the search space of
/// the completeness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfsmVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<serde_json::Value>,
}

impl EfsmVariable {
    /// An integer variable, optionally bounded on either side.
    #[must_use]
    pub fn int(name: &str, min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            name: name.to_owned(),
            kind: VariableType::Int,
            min_value: min,
            max_value: max,
            enum_values: None,
            initial_value: None,
        }
    }

    #[must_use]
    pub fn boolean(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: VariableType::Bool,
            min_value: None,
            max_value: None,
            enum_values: None,
            initial_value: None,
        }
    }

    #[must_use]
    pub fn enumeration(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            kind: VariableType::Enum,
            min_value: None,
            max_value: None,
            enum_values: Some(values.iter().map(|v| (*v).to_owned()).collect()),
            initial_value: None,
        }
    }

    /// Inclusive integer bounds of this variable's domain.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] when the declared domain is empty.
    pub fn bounds(&self) -> Result<(Option<i64>, Option<i64>), DomainError> {
        match self.kind {
            VariableType::Int => {
                if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
                    if min > max {
                        return Err(DomainError::InvertedBounds {
                            name: self.name.clone(),
                            min,
                            max,
                        });
                    }
                }
                Ok((self.min_value, self.max_value))
            }
            VariableType::Bool => Ok((Some(0), Some(1))),
            VariableType::Enum => {
                let count = self.enum_values.as_ref().map_or(0, Vec::len);
                if count == 0 {
                    return Err(DomainError::EmptyEnum {
                        name: self.name.clone(),
                    });
                }
                let last = i64::try_from(count - 1).map_err(|_| DomainError::EnumTooLarge {
                    name: self.name.clone(),
                })?;
                Ok((Some(0), Some(last)))
            }
        }
    }

    /// Domain constraint over `var`, `true` when unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] when the declared domain is empty.
    pub fn domain_constraint(&self, var: VarId) -> Result<Formula, DomainError> {
        let (min, max) = self.bounds()?;
        Ok(Formula::and(
            min.map(|m| Formula::atom(var, CompareOp::Gte, m))
                .into_iter()
                .chain(max.map(|m| Formula::atom(var, CompareOp::Lte, m))),
        ))
    }
}
