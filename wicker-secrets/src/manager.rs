//! Orchestration across scheme versions: encrypt with the newest scheme,
//! decrypt whatever a stored value's prefix says produced it.

use crate::error::{DecryptError, DecryptResult, Error, Result};
use crate::key_finder::KeyFinder;
use crate::scheme::SecretScheme;
use crate::v1::SchemeV1;
use crate::v2::{SchemeV2, MIN_DIRECT_KEY_LEN};
use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Stable encrypt/decrypt API over an ordered list of [`SecretScheme`]s.
///
/// The first scheme produces all new ciphertext; decryption dispatches to the
/// first scheme whose prefix matches the stored value. The manager holds no
/// key material and no mutable state: every operation fetches material fresh
/// from the finder, so concurrent use and out-of-band key rotation are both
/// safe.
pub struct MasterPasswordManager<F: KeyFinder> {
    finder: F,
    schemes: Vec<Arc<dyn SecretScheme>>,
}

impl<F: KeyFinder> MasterPasswordManager<F> {
    /// The default scheme list: V2 (Argon2id) for new values, V1 kept for
    /// decryption of existing ones.
    pub fn new(finder: F) -> Self {
        Self {
            finder,
            schemes: vec![Arc::new(SchemeV2::new()), Arc::new(SchemeV1::new())],
        }
    }

    /// Like [`MasterPasswordManager::new`] but with key derivation bypassed.
    ///
    /// Valid only for high-entropy material of at least
    /// [`MIN_DIRECT_KEY_LEN`] bytes; probed here and enforced again on every
    /// encrypt, since material is re-fetched per operation.
    pub fn bypassing_kdf(finder: F) -> Result<Self> {
        let material = finder.find_key()?;
        if material.len() < MIN_DIRECT_KEY_LEN {
            return Err(Error::WeakKeyMaterial {
                len: material.len(),
                min: MIN_DIRECT_KEY_LEN,
            });
        }
        Ok(Self {
            finder,
            schemes: vec![Arc::new(SchemeV2::bypassing_kdf()), Arc::new(SchemeV1::new())],
        })
    }

    /// A manager over an explicit, non-empty scheme list.
    pub fn with_schemes(finder: F, schemes: Vec<Arc<dyn SecretScheme>>) -> Result<Self> {
        if schemes.is_empty() {
            return Err(Error::NoSchemes);
        }
        Ok(Self { finder, schemes })
    }

    /// Encrypt with the currently preferred scheme.
    pub fn encrypt_password(&self, plaintext: &[u8]) -> Result<String> {
        let scheme = self.schemes.first().ok_or(Error::NoSchemes)?;
        let material = self.finder.find_key()?;
        let token = scheme.encrypt(&material, plaintext)?;
        debug!(scheme = scheme.tag(), "encrypted secret");
        Ok(token)
    }

    /// Decrypt a stored value with whichever scheme its prefix names.
    pub fn decrypt_password(&self, value: &str) -> DecryptResult<Zeroizing<Vec<u8>>> {
        let scheme = self
            .schemes
            .iter()
            .find(|scheme| scheme.recognizes(value))
            .ok_or(DecryptError::UnknownScheme)?;
        let material = self
            .finder
            .find_key()
            .map_err(|err| DecryptError::KeyUnavailable(err.to_string()))?;
        scheme.decrypt(&material, value)
    }

    /// Whether a stored value carries any registered scheme's prefix.
    pub fn looks_like_encrypted_password(&self, value: &str) -> bool {
        self.schemes.iter().any(|scheme| scheme.recognizes(value))
    }

    /// Best-effort decryption: values that do not look encrypted, or fail to
    /// decrypt, are returned as their own plaintext bytes.
    pub fn decrypt_password_if_encrypted(&self, value: &str) -> Zeroizing<Vec<u8>> {
        if self.looks_like_encrypted_password(value) {
            match self.decrypt_password(value) {
                Ok(plaintext) => return plaintext,
                Err(err) => {
                    warn!(error = %err, "treating undecryptable value as plaintext");
                }
            }
        }
        Zeroizing::new(value.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_finder::StaticKeyFinder;

    fn manager() -> MasterPasswordManager<StaticKeyFinder> {
        MasterPasswordManager::new(StaticKeyFinder::new(*b"a rather long master passphrase!"))
    }

    #[test]
    fn new_tokens_use_the_preferred_scheme() {
        let token = manager().encrypt_password(b"s3cret").unwrap();
        assert!(token.starts_with("$v2$"));
    }

    #[test]
    fn empty_scheme_list_is_rejected() {
        let err =
            MasterPasswordManager::with_schemes(StaticKeyFinder::new(*b"k"), Vec::new())
                .err()
                .unwrap();
        assert_eq!(err, Error::NoSchemes);
    }

    #[test]
    fn bypass_probes_material_length() {
        let err = MasterPasswordManager::bypassing_kdf(StaticKeyFinder::new(*b"short"))
            .err()
            .unwrap();
        assert_eq!(err, Error::WeakKeyMaterial { len: 5, min: 32 });
    }
}
