//! Legacy scheme: HKDF-SHA256 key derivation plus AES-256-GCM.
//!
//! Token layout: `$v1$<b64 salt>$<b64 nonce‖ciphertext>`. Kept so values
//! written by earlier deployments stay decryptable; new values are always
//! produced by the current scheme.

use crate::error::{DecryptError, DecryptResult, Result};
use crate::scheme::{
    b64_decode, b64_encode, hkdf_key, open_aead, random_bytes, seal_aead, SecretScheme, SALT_LEN,
};
use crate::token::{format_token, parse_token};
use zeroize::Zeroizing;

const TAG: &str = "v1";
const INFO: &[u8] = b"wicker-secrets-v1";

#[derive(Debug, Default, Clone, Copy)]
pub struct SchemeV1;

impl SchemeV1 {
    pub fn new() -> Self {
        Self
    }
}

impl SecretScheme for SchemeV1 {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<String> {
        let salt = random_bytes(SALT_LEN);
        let derived = hkdf_key(&salt, key, INFO)?;
        let sealed = seal_aead(&derived, plaintext)?;
        Ok(format_token(TAG, &b64_encode(&salt), &b64_encode(&sealed)))
    }

    fn decrypt(&self, key: &[u8], token: &str) -> DecryptResult<Zeroizing<Vec<u8>>> {
        let token = parse_token(token)?;
        if token.tag != TAG {
            return Err(DecryptError::UnknownScheme);
        }
        let salt = b64_decode(token.params, "salt")?;
        let sealed = b64_decode(token.payload, "ciphertext")?;
        let derived =
            hkdf_key(&salt, key, INFO).map_err(|err| DecryptError::Crypto(err.to_string()))?;
        open_aead(&derived, &sealed)
    }
}
