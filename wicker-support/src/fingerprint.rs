//! Loggable fingerprints for key material.

use crate::hex::hex_dump;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// Short SHA-256 fingerprint of key material, safe to log. Never reversible
/// into the material itself.
pub fn key_fingerprint(material: &[u8]) -> String {
    let digest = Sha256::digest(material);
    hex_dump(&digest[..FINGERPRINT_BYTES])
}
