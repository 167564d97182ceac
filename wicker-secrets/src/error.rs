use thiserror::Error;

/// Result alias for encryption/configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for decryption operations.
pub type DecryptResult<T> = std::result::Result<T, DecryptError>;

/// Errors raised while encrypting or configuring the manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("key material unavailable: {0}")]
    KeyUnavailable(String),
    #[error("key material too weak for derivation bypass: {len} bytes (minimum {min})")]
    WeakKeyMaterial { len: usize, min: usize },
    #[error("no encryption schemes registered")]
    NoSchemes,
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),
    #[error("crypto error: {0}")]
    Crypto(String),
}

/// Errors raised while decrypting a stored value.
///
/// Distinct from [`Error`] so callers can tell "this value could not be
/// decrypted" apart from "this value is not encrypted at all" — the latter is
/// [`DecryptError::UnknownScheme`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptError {
    #[error("no registered scheme recognizes the value")]
    UnknownScheme,
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("message authentication failed")]
    MacMismatch,
    #[error("key material unavailable: {0}")]
    KeyUnavailable(String),
    #[error("crypto error: {0}")]
    Crypto(String),
}
