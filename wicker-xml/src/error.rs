use thiserror::Error;
use wicker_core::EvalError;

/// Result alias for decode operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Failures observed while decoding a document.
///
/// Structural failures ([`DecodeError::is_fatal`]) abort the decode; benign
/// evaluation failures are routed to the configured listener and null out the
/// offending frame instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("xml parse error: {0}")]
    Parse(String),
    #[error("DOCTYPE declarations are not allowed")]
    DoctypeForbidden,
    #[error("entity references are not allowed: {0}")]
    EntityForbidden(String),
    #[error("unknown element <{0}>")]
    UnknownTag(String),
    #[error("element <{element}>: {detail}")]
    BadAttributes { element: String, detail: String },
    #[error("unexpected element <{child}> inside <{parent}>")]
    UnexpectedElement { parent: String, child: String },
    #[error("nesting depth {depth} exceeds the configured maximum {max}")]
    DepthExceeded { depth: usize, max: usize },
    #[error("argument count exceeds the configured maximum {max}")]
    TooManyArguments { max: usize },
    #[error("unresolved idref {0:?}")]
    UnresolvedIdRef(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// The stream holds no further top-level values (or a prior structural
    /// error discarded them).
    #[error("no more objects in the stream")]
    NoMoreObjects,
}

impl DecodeError {
    /// Whether this failure aborts the whole decode.
    pub fn is_fatal(&self) -> bool {
        match self {
            DecodeError::Eval(err) => err.is_policy_violation(),
            DecodeError::UnresolvedIdRef(_) | DecodeError::NoMoreObjects => false,
            _ => true,
        }
    }

    /// Whether this failure was a class-filter rejection.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, DecodeError::Eval(err) if err.is_policy_violation())
    }
}
