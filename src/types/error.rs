use thiserror::Error;

/// A declared variable domain that contains no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("variable '{name}' has invalid bounds: min {min} > max {max}")]
    InvertedBounds { name: String, min: i64, max: i64 },

    #[error("enum variable '{name}' declares no values")]
    EmptyEnum { name: String },

    #[error("enum variable '{name}' declares more values than fit in an integer domain")]
    EnumTooLarge { name: String },
}
