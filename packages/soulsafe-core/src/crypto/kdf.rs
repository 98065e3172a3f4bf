//! # Key Derivation Functions
//!
//! Deterministic per-capsule keys derived from the process master secret.
//!
//! ## Key Derivation Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CAPSULE KEY DERIVATION                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────────────────────┐   ┌───────────────────────────┐        │
//! │  │  MASTER SECRET            │   │  ENTITY SALT              │        │
//! │  │                           │   │                           │        │
//! │  │  • process configuration  │   │  user_id + "-" +          │        │
//! │  │  • never a cipher key     │   │  capsule_id               │        │
//! │  │  • ≥ 32 bytes             │   │  • not secret             │        │
//! │  └─────────────┬─────────────┘   └─────────────┬─────────────┘        │
//! │                └───────────────┬───────────────┘                       │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PBKDF2-HMAC-SHA256(                                            │   │
//! │  │    password   = master_secret,                                  │   │
//! │  │    salt       = entity_salt,                                    │   │
//! │  │    iterations = 100_000,                                        │   │
//! │  │    length     = 32 bytes                                        │   │
//! │  │  )                                                              │   │
//! │  │                                                                 │   │
//! │  │  → 32-byte AES-256-GCM key                                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice | Rationale |
//! |--------|---------------|-----------|
//! | KDF Algorithm | PBKDF2-HMAC-SHA256 | Compatible with keys already issued by the REST API |
//! | Iterations | 100,000 | Slows offline guessing if the master secret is weak |
//! | Salt | `id_a-id_b` | Distinct capsules get unrelated keys |
//!
//! The iteration count does not make a weak master secret safe. It only
//! raises the cost per guess.

use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{SymmetricKey, KEY_SIZE};
use crate::error::{Error, Result};

/// PBKDF2 iteration count. Changing it changes every derived key.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Separator placed between the two identifiers of an entity salt
pub const SALT_SEPARATOR: char = '-';

/// Non-secret salt binding a derived key to one entity pair
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DerivationSalt(Vec<u8>);

impl DerivationSalt {
    /// Use raw bytes as a salt
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the salt bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for DerivationSalt {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Build the salt for an entity pair, e.g. (user, capsule)
///
/// Order-sensitive: `("a", "b")` and `("b", "a")` give different salts.
///
/// ```
/// use soulsafe_core::crypto::build_entity_salt;
///
/// let salt = build_entity_salt("user-1", "capsule-9");
/// assert_eq!(salt.as_bytes(), b"user-1-capsule-9");
/// ```
pub fn build_entity_salt(id_a: &str, id_b: &str) -> DerivationSalt {
    let mut salt = String::with_capacity(id_a.len() + 1 + id_b.len());
    salt.push_str(id_a);
    salt.push(SALT_SEPARATOR);
    salt.push_str(id_b);
    DerivationSalt(salt.into_bytes())
}

/// Derive a 256-bit key from the master secret and a salt
///
/// Deterministic: the same inputs always give the same key, so a capsule's
/// key never has to be stored.
///
/// ## Errors
///
/// - `InvalidArgument` if the master secret or the salt is empty
/// - `KeyDerivationFailed` if PBKDF2 rejects its parameters
pub fn derive_key(master_secret: &[u8], salt: &[u8]) -> Result<SymmetricKey> {
    if master_secret.is_empty() {
        return Err(Error::InvalidArgument("Master secret must not be empty".into()));
    }
    if salt.is_empty() {
        return Err(Error::InvalidArgument("Derivation salt must not be empty".into()));
    }

    let mut key = [0u8; KEY_SIZE];
    let derived = pbkdf2::pbkdf2::<Hmac<Sha256>>(master_secret, salt, PBKDF2_ITERATIONS, &mut key)
        .map(|()| SymmetricKey::from_bytes(key));
    key.zeroize();

    let derived =
        derived.map_err(|e| Error::KeyDerivationFailed(format!("PBKDF2 failed: {}", e)))?;
    tracing::debug!(salt_len = salt.len(), "Derived capsule key");
    Ok(derived)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &[u8] = b"test-master-secret-with-plenty-of-entropy-0001";

    #[test]
    fn test_build_entity_salt() {
        let salt = build_entity_salt("user-1", "capsule-9");
        assert_eq!(salt.as_bytes(), b"user-1-capsule-9");
    }

    #[test]
    fn test_entity_salt_is_order_sensitive() {
        assert_ne!(build_entity_salt("a", "b"), build_entity_salt("b", "a"));
    }

    #[test]
    fn test_derive_key_deterministic() {
        let salt = build_entity_salt("user-1", "capsule-9");

        let key1 = derive_key(MASTER, salt.as_bytes()).unwrap();
        let key2 = derive_key(MASTER, salt.as_bytes()).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_salts_different_keys() {
        let key1 = derive_key(MASTER, build_entity_salt("user-1", "capsule-1").as_bytes()).unwrap();
        let key2 = derive_key(MASTER, build_entity_salt("user-1", "capsule-2").as_bytes()).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_different_secrets_different_keys() {
        let salt = build_entity_salt("user-1", "capsule-1");
        let key1 = derive_key(MASTER, salt.as_bytes()).unwrap();
        let key2 = derive_key(b"another-master-secret-of-sufficient-size", salt.as_bytes()).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_known_answer() {
        // PBKDF2-HMAC-SHA256("password", "salt", 100_000, 32)
        let key = derive_key(b"password", b"salt").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "0394a2ede332c9a13eb82e9b24631604c31df978b4e2f0fbd2c549944f9d79a5"
        );
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(matches!(derive_key(b"", b"salt"), Err(Error::InvalidArgument(_))));
        assert!(matches!(derive_key(MASTER, b""), Err(Error::InvalidArgument(_))));
    }
}
