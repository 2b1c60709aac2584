//! Walk error types
//!
//! Error codes:
//! - SCHEMA_VALIDATION_FAILED: a walker rejected a value
//! - SCHEMA_COERCION_FAILED: a coercion failed before the walker ran
//!
//! An `ErrorSentinel` is a plain value. Walkers return it as `Err`, parents
//! nest it, and nothing past the point of creation unwinds the stack.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use super::datum::Datum;
use super::types::Schema;

/// Error codes for walk failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Value does not satisfy the schema node
    SchemaValidationFailed,
    /// Coercion raised an error before walking
    SchemaCoercionFailed,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::SchemaValidationFailed => "SCHEMA_VALIDATION_FAILED",
            ErrorCode::SchemaCoercionFailed => "SCHEMA_COERCION_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Location of a child failure inside a composite value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Record or map key
    Key(String),
    /// Sequence index
    Index(usize),
    /// Set member
    Member(Datum),
    /// Either branch index
    Branch(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Member(m) => write!(f, "#{{{}}}", m),
            PathSegment::Branch(b) => write!(f, "<{}>", b),
        }
    }
}

/// Why a node rejected a value
#[derive(Debug, Clone)]
pub enum ErrorCause {
    /// Value has the wrong type
    Mismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Value has the right shape but is not an allowed value
    NotAllowed,
    /// Required record key is absent
    MissingKey(String),
    /// Record key is not declared
    DisallowedKey(String),
    /// Coercion error, kept as the underlying cause
    Failed(Arc<dyn Error + Send + Sync>),
    /// Failures of child nodes
    Nested(Vec<(PathSegment, ErrorSentinel)>),
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCause::Mismatch { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
            ErrorCause::NotAllowed => write!(f, "value not allowed"),
            ErrorCause::MissingKey(k) => write!(f, "missing required key '{}'", k),
            ErrorCause::DisallowedKey(k) => write!(f, "undeclared key '{}'", k),
            ErrorCause::Failed(e) => write!(f, "coercion failed: {}", e),
            ErrorCause::Nested(children) => {
                write!(f, "{} nested error(s)", children.len())?;
                for (path, child) in children {
                    write!(f, "; {}: {}", path, child.cause)?;
                }
                Ok(())
            }
        }
    }
}

/// Terminal failure value produced while walking a datum.
///
/// Tags the schema node that failed, the value it was given, and the cause.
#[derive(Debug, Clone)]
pub struct ErrorSentinel {
    code: ErrorCode,
    schema: Arc<Schema>,
    value: Datum,
    cause: ErrorCause,
}

impl ErrorSentinel {
    /// Create a validation failure
    pub fn validation(schema: Arc<Schema>, value: Datum, cause: ErrorCause) -> Self {
        Self {
            code: ErrorCode::SchemaValidationFailed,
            schema,
            value,
            cause,
        }
    }

    /// Create a type mismatch failure
    pub fn mismatch(schema: Arc<Schema>, value: &Datum) -> Self {
        let cause = ErrorCause::Mismatch {
            expected: schema.type_name(),
            actual: value.type_name(),
        };
        Self::validation(schema, value.clone(), cause)
    }

    /// Create a coercion failure wrapping the underlying error
    pub fn coercion_failed<E>(schema: Arc<Schema>, value: Datum, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            code: ErrorCode::SchemaCoercionFailed,
            schema,
            value,
            cause: ErrorCause::Failed(Arc::new(cause)),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the schema node that failed
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the offending value
    pub fn value(&self) -> &Datum {
        &self.value
    }

    pub fn cause(&self) -> &ErrorCause {
        &self.cause
    }

    /// Returns the human-readable message
    pub fn message(&self) -> String {
        format!("{} at {}: {}", self.value, self.schema.type_name(), self.cause)
    }

    /// Flattens nested failures into (path, sentinel) pairs.
    ///
    /// Paths are rendered from the root, e.g. `.address.zip` or `.tags[1]`.
    /// A sentinel without nested failures yields itself with an empty path.
    pub fn leaf_errors(&self) -> Vec<(String, &ErrorSentinel)> {
        let mut leaves = Vec::new();
        self.collect_leaves(String::new(), &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, prefix: String, out: &mut Vec<(String, &'a ErrorSentinel)>) {
        match &self.cause {
            ErrorCause::Nested(children) => {
                for (segment, child) in children {
                    child.collect_leaves(format!("{}{}", prefix, segment), out);
                }
            }
            _ => out.push((prefix, self)),
        }
    }
}

impl fmt::Display for ErrorSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message())
    }
}

impl Error for ErrorSentinel {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            ErrorCause::Failed(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Result of applying a walker to a datum
pub type WalkResult = Result<Datum, ErrorSentinel>;

/// Returns whether a walk result is an error sentinel
pub fn is_error(result: &WalkResult) -> bool {
    result.is_err()
}

/// Errors raised while loading or registering schema definitions
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Failed to read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("Schema '{schema_id}' version '{schema_version}' is immutable")]
    Immutable {
        schema_id: String,
        schema_version: String,
    },

    #[error("Schema '{0}' not found")]
    UnknownSchema(String),

    #[error("Schema '{schema_id}' version '{schema_version}' not found")]
    UnknownVersion {
        schema_id: String,
        schema_version: String,
    },
}

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
