//! Versioned authenticated secret encryption.
//!
//! Stored values are self-describing printable tokens of the form
//! `$<tag>$<params>$<ciphertext>`; the prefix names the scheme that produced
//! the value and is the only dispatch discriminant. Key material comes from a
//! pluggable [`KeyFinder`] and is fetched fresh on every operation.

pub mod error;
pub mod key_finder;
pub mod manager;
pub mod scheme;
pub mod token;
pub mod v1;
pub mod v2;

pub use error::{DecryptError, DecryptResult, Error, Result};
pub use key_finder::{FileKeyFinder, KeyFinder, StaticKeyFinder};
pub use manager::MasterPasswordManager;
pub use scheme::SecretScheme;
pub use token::{parse_token, Token};
pub use v1::SchemeV1;
pub use v2::{KdfParams, SchemeV2, MIN_DIRECT_KEY_LEN};
