//! The pluggable scheme contract plus the AEAD/KDF plumbing the concrete
//! schemes share.

use crate::error::{DecryptError, DecryptResult, Error, Result};
use crate::token::prefix_for;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

pub(crate) const KEY_LEN: usize = 32;
pub(crate) const SALT_LEN: usize = 16;
pub(crate) const NONCE_LEN: usize = 12;

/// One versioned secret-encryption scheme.
///
/// A scheme turns plaintext into a printable `$<tag>$...` token and back.
/// Its `$<tag>$` prefix is the only discriminant stored with the value.
pub trait SecretScheme: Send + Sync {
    /// Short version tag, unique within a manager (`v1`, `v2`, ...).
    fn tag(&self) -> &'static str;

    /// The literal prefix every token of this scheme carries.
    fn prefix(&self) -> String {
        prefix_for(self.tag())
    }

    /// Whether a stored value was produced by this scheme.
    fn recognizes(&self, value: &str) -> bool {
        value.starts_with(&self.prefix())
    }

    /// Encrypt plaintext under the given key material.
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<String>;

    /// Decrypt a token produced by this scheme.
    fn decrypt(&self, key: &[u8], token: &str) -> DecryptResult<Zeroizing<Vec<u8>>>;
}

pub(crate) fn random_bytes(len: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; len];
    OsRng.fill_bytes(&mut buffer);
    buffer
}

/// HKDF-SHA256 expansion of key material into an AEAD key.
pub(crate) fn hkdf_key(salt: &[u8], material: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), material);
    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hkdf.expand(info, &mut *okm)
        .map_err(|_| Error::Crypto("failed to derive key material".to_string()))?;
    Ok(okm)
}

/// Seal with AES-256-GCM; returns `nonce ‖ ciphertext`.
pub(crate) fn seal_aead(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| Error::Crypto("invalid AEAD key".to_string()))?;
    let nonce_bytes = random_bytes(NONCE_LEN);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| Error::Crypto("failed to encrypt payload".to_string()))?;
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a `nonce ‖ ciphertext` payload. Authentication failure is reported as
/// [`DecryptError::MacMismatch`].
pub(crate) fn open_aead(
    key: &[u8; KEY_LEN],
    data: &[u8],
) -> DecryptResult<Zeroizing<Vec<u8>>> {
    if data.len() < NONCE_LEN {
        return Err(DecryptError::MalformedToken(
            "ciphertext shorter than a nonce".to_string(),
        ));
    }
    let (nonce, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| DecryptError::Crypto("invalid AEAD key".to_string()))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| DecryptError::MacMismatch)
}

pub(crate) fn b64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub(crate) fn b64_decode(segment: &str, what: &str) -> DecryptResult<Vec<u8>> {
    STANDARD
        .decode(segment)
        .map_err(|_| DecryptError::MalformedToken(format!("{what} is not valid base64")))
}
