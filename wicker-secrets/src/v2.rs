//! Current scheme: Argon2id key derivation plus AES-256-GCM.
//!
//! Token layout: `$v2$<m>,<t>,<p>,<b64 salt>$<b64 nonce‖ciphertext>`. The
//! derivation parameters travel in the token so older values remain
//! decryptable after the defaults change. `t = 0` records a bypassed
//! derivation (HKDF-SHA256 only) — valid only for high-entropy key material
//! of at least 32 bytes, enforced on every encrypt because material is
//! fetched fresh per operation.

use crate::error::{DecryptError, DecryptResult, Error, Result};
use crate::scheme::{
    b64_decode, b64_encode, hkdf_key, open_aead, random_bytes, seal_aead, SecretScheme, KEY_LEN,
    SALT_LEN,
};
use crate::token::{format_token, parse_token};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

const TAG: &str = "v2";
const INFO: &[u8] = b"wicker-secrets-v2";

/// Minimum key length for the derivation bypass.
pub const MIN_DIRECT_KEY_LEN: usize = 32;

// Ceilings applied when decrypting: the parameters in a stored token are
// attacker-influencable, so they must not be able to demand unbounded work.
const MAX_M_COST: u32 = 262_144; // 256 MiB
const MAX_T_COST: u32 = 16;
const MAX_P_COST: u32 = 8;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Iterations.
    pub t_cost: u32,
    /// Parallelism lanes.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19_456,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    fn validate(self) -> Result<Self> {
        if self.t_cost == 0 || self.m_cost == 0 || self.p_cost == 0 {
            return Err(Error::InvalidKdfParams(
                "costs must be non-zero".to_string(),
            ));
        }
        if self.m_cost > MAX_M_COST || self.t_cost > MAX_T_COST || self.p_cost > MAX_P_COST {
            return Err(Error::InvalidKdfParams(format!(
                "costs exceed the supported ceiling ({MAX_M_COST},{MAX_T_COST},{MAX_P_COST})"
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SchemeV2 {
    params: KdfParams,
    bypass_kdf: bool,
}

impl Default for SchemeV2 {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeV2 {
    pub fn new() -> Self {
        Self {
            params: KdfParams::default(),
            bypass_kdf: false,
        }
    }

    pub fn with_params(params: KdfParams) -> Result<Self> {
        Ok(Self {
            params: params.validate()?,
            bypass_kdf: false,
        })
    }

    /// Skip the memory-hard derivation and stretch with HKDF only.
    ///
    /// Only sound when the key material is already high-entropy; encrypt
    /// rejects material shorter than [`MIN_DIRECT_KEY_LEN`].
    pub fn bypassing_kdf() -> Self {
        Self {
            params: KdfParams::default(),
            bypass_kdf: true,
        }
    }

    fn derive(
        &self,
        key: &[u8],
        salt: &[u8],
        params: Option<KdfParams>,
    ) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        match params {
            None => hkdf_key(salt, key, INFO),
            Some(params) => {
                let argon_params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))
                    .map_err(|err| Error::InvalidKdfParams(err.to_string()))?;
                let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
                let mut okm = Zeroizing::new([0u8; KEY_LEN]);
                argon
                    .hash_password_into(key, salt, &mut *okm)
                    .map_err(|err| Error::Crypto(format!("argon2 derivation failed: {err}")))?;
                Ok(okm)
            }
        }
    }
}

fn render_params(params: Option<KdfParams>, salt: &[u8]) -> String {
    let (m, t, p) = match params {
        Some(params) => (params.m_cost, params.t_cost, params.p_cost),
        None => (0, 0, 0),
    };
    format!("{m},{t},{p},{}", b64_encode(salt))
}

fn parse_params(segment: &str) -> DecryptResult<(Option<KdfParams>, Vec<u8>)> {
    let mut parts = segment.splitn(4, ',');
    let mut next_u32 = |what: &str| -> DecryptResult<u32> {
        parts
            .next()
            .and_then(|raw| raw.parse::<u32>().ok())
            .ok_or_else(|| DecryptError::MalformedToken(format!("invalid {what} cost")))
    };
    let m = next_u32("memory")?;
    let t = next_u32("time")?;
    let p = next_u32("parallelism")?;
    let salt = parts
        .next()
        .ok_or_else(|| DecryptError::MalformedToken("missing salt".to_string()))
        .and_then(|raw| b64_decode(raw, "salt"))?;

    if t == 0 {
        return Ok((None, salt));
    }
    let params = KdfParams {
        m_cost: m,
        t_cost: t,
        p_cost: p,
    }
    .validate()
    .map_err(|err| DecryptError::MalformedToken(err.to_string()))?;
    Ok((Some(params), salt))
}

impl SecretScheme for SchemeV2 {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<String> {
        let params = if self.bypass_kdf {
            if key.len() < MIN_DIRECT_KEY_LEN {
                return Err(Error::WeakKeyMaterial {
                    len: key.len(),
                    min: MIN_DIRECT_KEY_LEN,
                });
            }
            None
        } else {
            Some(self.params)
        };
        let salt = random_bytes(SALT_LEN);
        let derived = self.derive(key, &salt, params)?;
        let sealed = seal_aead(&derived, plaintext)?;
        Ok(format_token(
            TAG,
            &render_params(params, &salt),
            &b64_encode(&sealed),
        ))
    }

    fn decrypt(&self, key: &[u8], token: &str) -> DecryptResult<Zeroizing<Vec<u8>>> {
        let token = parse_token(token)?;
        if token.tag != TAG {
            return Err(DecryptError::UnknownScheme);
        }
        let (params, salt) = parse_params(token.params)?;
        let sealed = b64_decode(token.payload, "ciphertext")?;
        let derived = self
            .derive(key, &salt, params)
            .map_err(|err| DecryptError::Crypto(err.to_string()))?;
        open_aead(&derived, &sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> SchemeV2 {
        SchemeV2::with_params(KdfParams {
            m_cost: 32,
            t_cost: 1,
            p_cost: 1,
        })
        .unwrap()
    }

    #[test]
    fn round_trip_with_derivation() {
        let scheme = fast();
        let token = scheme.encrypt(b"passphrase", b"secret").unwrap();
        assert!(token.starts_with("$v2$32,1,1,"));
        let recovered = scheme.decrypt(b"passphrase", &token).unwrap();
        assert_eq!(recovered.as_slice(), b"secret");
    }

    #[test]
    fn bypass_requires_strong_material() {
        let scheme = SchemeV2::bypassing_kdf();
        assert_eq!(
            scheme.encrypt(b"short", b"secret").unwrap_err(),
            Error::WeakKeyMaterial { len: 5, min: 32 }
        );

        let strong = [0x4Au8; 48];
        let token = scheme.encrypt(&strong, b"secret").unwrap();
        assert!(token.starts_with("$v2$0,0,0,"));
        let recovered = scheme.decrypt(&strong, &token).unwrap();
        assert_eq!(recovered.as_slice(), b"secret");
    }

    #[test]
    fn derived_and_bypassed_tokens_interoperate() {
        // Which path decrypt takes is recorded in the token, not configured.
        let strong = [0x5Bu8; 32];
        let bypassed = SchemeV2::bypassing_kdf().encrypt(&strong, b"x").unwrap();
        let recovered = fast().decrypt(&strong, &bypassed).unwrap();
        assert_eq!(recovered.as_slice(), b"x");
    }

    #[test]
    fn hostile_cost_parameters_are_rejected() {
        let scheme = fast();
        let token = scheme.encrypt(b"key", b"x").unwrap();
        // Rewrite the memory cost far beyond the ceiling.
        let hostile = token.replacen("$32,1,1,", "$1073741824,1,1,", 1);
        assert!(matches!(
            scheme.decrypt(b"key", &hostile).unwrap_err(),
            DecryptError::MalformedToken(_)
        ));
    }

    #[test]
    fn zero_costs_cannot_be_configured() {
        assert!(SchemeV2::with_params(KdfParams {
            m_cost: 0,
            t_cost: 0,
            p_cost: 0,
        })
        .is_err());
    }
}
