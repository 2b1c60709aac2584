//! # Coercion Errors

use thiserror::Error;

use crate::schema::ErrorSentinel;

/// Result type for coercion functions
pub type CoercionResult = Result<crate::schema::Datum, CoercionError>;

/// Errors raised by coercion functions
#[derive(Debug, Clone, Error)]
pub enum CoercionError {
    #[error("cannot coerce {actual} to {target}")]
    Unsupported {
        target: &'static str,
        actual: &'static str,
    },

    #[error("invalid {target} literal {input:?}: {reason}")]
    Parse {
        target: &'static str,
        input: String,
        reason: String,
    },

    #[error("{0} cannot be cast to an integer without loss")]
    NotLossless(String),

    #[error("coercion panicked: {0}")]
    Panicked(String),

    /// A walk failure produced inside the coercion, passed through unchanged
    #[error("{0}")]
    Nested(ErrorSentinel),
}

impl CoercionError {
    /// Create an unsupported input error
    pub fn unsupported(target: &'static str, actual: &crate::schema::Datum) -> Self {
        CoercionError::Unsupported {
            target,
            actual: actual.type_name(),
        }
    }

    /// Create a parse error
    pub fn parse(target: &'static str, input: &str, reason: impl ToString) -> Self {
        CoercionError::Parse {
            target,
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while reading coercion configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid coercion config: {0}")]
    Invalid(String),
}
