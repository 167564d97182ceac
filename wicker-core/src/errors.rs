use crate::filter::{ConstructorDesc, MethodDesc};
use thiserror::Error;

/// Result alias for evaluator operations.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Error type raised by a registered constructor/method body.
///
/// Bodies report failure with any error type; the evaluator propagates the
/// original value unwrapped so callers observe the invoked code's own error,
/// not an evaluator wrapper.
pub type RaisedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a registered constructor/method/field body.
pub type InvokeResult = std::result::Result<crate::value::Value, RaisedError>;

/// A resolution rejected by the [`crate::filter::ClassFilter`].
///
/// Always fatal to the operation that triggered it; callers can tell which
/// kind of member was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("class not permitted: {0}")]
    ClassNotPermitted(String),
    #[error("constructor not permitted: {0}")]
    ConstructorNotPermitted(ConstructorDesc),
    #[error("method not permitted: {0}")]
    MethodNotPermitted(MethodDesc),
}

/// Evaluation failures.
///
/// [`EvalError::Policy`] is the security-classified case; everything else is
/// either malformed input to the evaluator or a benign resolution failure.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error("class not registered: {0}")]
    ClassNotFound(String),
    #[error("invalid type name: {0}")]
    InvalidTypeName(String),
    #[error("no constructor of {class} matches the {arity} supplied argument(s)")]
    NoSuchConstructor { class: String, arity: usize },
    #[error("cannot decide which constructor to call: {first} vs {second}")]
    AmbiguousConstructor { first: String, second: String },
    #[error("no method {name} on {class} matches the {arity} supplied argument(s)")]
    NoSuchMethod {
        class: String,
        name: String,
        arity: usize,
    },
    #[error("cannot decide which method to call: {first} vs {second}")]
    AmbiguousMethod { first: String, second: String },
    #[error("no field {name} on {class}")]
    NoSuchField { class: String, name: String },
    #[error("field {name} on {class} is not writable")]
    FieldNotWritable { class: String, name: String },
    #[error("argument type mismatch: {0}")]
    TypeMismatch(String),
    #[error("array index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i32, len: usize },
    /// The resolved constructor/method itself failed; the original error is
    /// carried through without an evaluator wrapper.
    #[error("{0}")]
    Raised(RaisedError),
}

impl EvalError {
    /// True when the failure was a filter rejection rather than a benign
    /// resolution problem.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, EvalError::Policy(_))
    }

    pub(crate) fn raised(err: RaisedError) -> Self {
        EvalError::Raised(err)
    }
}
