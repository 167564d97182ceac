//! Manager-level behavior: round trips, prefix dispatch across scheme
//! versions, and the best-effort plaintext fallback.

use proptest::prelude::*;
use std::sync::Arc;
use wicker_secrets::{
    DecryptError, KdfParams, MasterPasswordManager, SchemeV1, SchemeV2, SecretScheme,
    StaticKeyFinder,
};

const MASTER: &[u8; 32] = b"a rather long master passphrase!";

/// Fast Argon2 parameters so the suite stays quick.
fn fast_manager() -> MasterPasswordManager<StaticKeyFinder> {
    let v2 = SchemeV2::with_params(KdfParams {
        m_cost: 32,
        t_cost: 1,
        p_cost: 1,
    })
    .unwrap();
    MasterPasswordManager::with_schemes(
        StaticKeyFinder::new(*MASTER),
        vec![Arc::new(v2), Arc::new(SchemeV1::new())],
    )
    .unwrap()
}

#[test]
fn round_trip_including_empty_plaintext() {
    let manager = fast_manager();
    for plaintext in [&b""[..], b"x", b"some longer secret value \xF0\x9F\x90\x9A"] {
        let token = manager.encrypt_password(plaintext).unwrap();
        let recovered = manager.decrypt_password(&token).unwrap();
        assert_eq!(recovered.as_slice(), plaintext);
    }
}

#[test]
fn produced_tokens_look_encrypted_and_plaintext_does_not() {
    let manager = fast_manager();
    let token = manager.encrypt_password(b"secret").unwrap();
    assert!(manager.looks_like_encrypted_password(&token));
    assert!(!manager.looks_like_encrypted_password("hunter2"));
    assert!(!manager.looks_like_encrypted_password("$v9$unknown$scheme"));
}

#[test]
fn legacy_v1_tokens_decrypt_through_the_manager() {
    let manager = fast_manager();
    let legacy = SchemeV1::new().encrypt(MASTER, b"old secret").unwrap();
    let recovered = manager.decrypt_password(&legacy).unwrap();
    assert_eq!(recovered.as_slice(), b"old secret");

    // New ciphertext never uses the legacy tag.
    let fresh = manager.encrypt_password(b"new secret").unwrap();
    assert!(fresh.starts_with("$v2$"));
}

#[test]
fn unrecognized_prefixes_are_a_distinct_failure() {
    let manager = fast_manager();
    assert_eq!(
        manager.decrypt_password("not-encrypted").unwrap_err(),
        DecryptError::UnknownScheme
    );
    assert_eq!(
        manager.decrypt_password("$v9$x$y").unwrap_err(),
        DecryptError::UnknownScheme
    );
}

#[test]
fn tampered_tokens_fail_authentication() {
    let manager = fast_manager();
    let token = manager.encrypt_password(b"secret").unwrap();
    // Flip a character inside the base64 payload.
    let mut chars: Vec<char> = token.chars().collect();
    let last = chars.len() - 2;
    chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();
    let err = manager.decrypt_password(&tampered).unwrap_err();
    assert!(
        matches!(
            err,
            DecryptError::MacMismatch | DecryptError::MalformedToken(_)
        ),
        "got {err:?}"
    );
}

#[test]
fn wrong_key_fails_authentication() {
    let token = fast_manager().encrypt_password(b"secret").unwrap();
    let other = MasterPasswordManager::with_schemes(
        StaticKeyFinder::new(*b"an entirely different passphrase"),
        vec![Arc::new(
            SchemeV2::with_params(KdfParams {
                m_cost: 32,
                t_cost: 1,
                p_cost: 1,
            })
            .unwrap(),
        )],
    )
    .unwrap();
    assert_eq!(
        other.decrypt_password(&token).unwrap_err(),
        DecryptError::MacMismatch
    );
}

#[test]
fn if_encrypted_falls_back_to_plaintext() {
    let manager = fast_manager();

    // Not encrypted at all: returned verbatim.
    let plain = manager.decrypt_password_if_encrypted("just a password");
    assert_eq!(plain.as_slice(), b"just a password");

    // Encrypted: decrypted.
    let token = manager.encrypt_password(b"real secret").unwrap();
    let recovered = manager.decrypt_password_if_encrypted(&token);
    assert_eq!(recovered.as_slice(), b"real secret");

    // Recognized prefix but corrupt body: best-effort treats the stored
    // string itself as the value rather than failing.
    let corrupt = "$v2$32,1,1,!!!$also-not-base64";
    let fallback = manager.decrypt_password_if_encrypted(corrupt);
    assert_eq!(fallback.as_slice(), corrupt.as_bytes());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_round_trip_arbitrary_bytes(plaintext in proptest::collection::vec(any::<u8>(), 0..512)) {
        let manager = fast_manager();
        let token = manager.encrypt_password(&plaintext).unwrap();
        prop_assert!(token.starts_with("$v2$"));
        let recovered = manager.decrypt_password(&token).unwrap();
        prop_assert_eq!(recovered.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn prop_distinct_encryptions_differ(plaintext in proptest::collection::vec(any::<u8>(), 1..64)) {
        let manager = fast_manager();
        let a = manager.encrypt_password(&plaintext).unwrap();
        let b = manager.encrypt_password(&plaintext).unwrap();
        prop_assert_ne!(a, b);
    }
}
