//! Key derivation and integrity hashing through the public API
//!
//! PBKDF2 runs 100,000 rounds per call, so derivation tests are examples
//! rather than properties.

use proptest::prelude::*;
use soulsafe_core::crypto::{build_entity_salt, derive_key, hash, verify, verify_encoded};
use soulsafe_core::{CapsuleCrypto, CryptoConfig, Error};

const SECRET: &str = "integration-master-secret-7f3a9c21b8e44d05";

#[test]
fn test_derivation_is_deterministic() {
    let salt = build_entity_salt("user-1", "capsule-9");
    assert_eq!(salt.as_bytes(), b"user-1-capsule-9");

    let first = derive_key(b"M", salt.as_bytes()).unwrap();
    let second = derive_key(b"M", salt.as_bytes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_derivation_is_salt_and_order_sensitive() {
    let crypto = CapsuleCrypto::new(CryptoConfig::new(SECRET).unwrap());

    let forward = crypto.derive_capsule_key("user-1", "capsule-9").unwrap();
    let reversed = crypto.derive_capsule_key("capsule-9", "user-1").unwrap();
    let other = crypto.derive_capsule_key("user-1", "capsule-10").unwrap();

    assert_ne!(forward, reversed);
    assert_ne!(forward, other);
}

#[test]
fn test_derivation_depends_on_master_secret() {
    let salt = build_entity_salt("user-1", "capsule-9");
    let a = derive_key(SECRET.as_bytes(), salt.as_bytes()).unwrap();
    let b = derive_key(b"another-master-secret-0123456789abcdef", salt.as_bytes()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_derived_key_seals_and_opens_capsule() {
    let crypto = CapsuleCrypto::new(CryptoConfig::new(SECRET).unwrap());

    let key = crypto.derive_capsule_key("user-42", "capsule-7").unwrap();
    let envelope = crypto.seal_text("see you in ten years", &key).unwrap();

    // A fresh service instance with the same secret re-derives the same key
    let restarted = CapsuleCrypto::new(CryptoConfig::new(SECRET).unwrap());
    let again = restarted.derive_capsule_key("user-42", "capsule-7").unwrap();
    assert_eq!(restarted.open_text(&envelope, &again).unwrap(), "see you in ten years");
}

#[test]
fn test_placeholder_secret_cannot_build_service() {
    for secret in ["fallback-master-key", "SoulSafeMasterKey2023!", ""] {
        assert!(matches!(CryptoConfig::new(secret), Err(Error::Configuration(_))));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_hash_is_deterministic_and_verifies(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        let digest = hash(&data);
        prop_assert_eq!(digest, hash(&data));
        prop_assert!(verify(&data, &digest));
        prop_assert!(verify_encoded(&data, &digest.to_hex()));
        prop_assert!(verify_encoded(&data, &digest.to_base64()));
    }

    #[test]
    fn prop_changed_data_fails_verify(
        data in prop::collection::vec(any::<u8>(), 1..512),
        index in any::<usize>(),
        mask in 1u8..=255,
    ) {
        let digest = hash(&data);
        let mut changed = data.clone();
        let i = index % changed.len();
        changed[i] ^= mask;

        prop_assert_ne!(hash(&changed), digest);
        prop_assert!(!verify(&changed, &digest));
    }

    #[test]
    fn prop_malformed_digest_text_is_false(text in "[^A-Za-z0-9+/=]{1,80}") {
        prop_assert!(!verify_encoded(b"anything", &text));
    }
}
