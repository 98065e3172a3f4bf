//! # Capsule Crypto Service
//!
//! The object callers hold. It owns the validated [`CryptoConfig`] and is
//! the only code that reads the master secret.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           CapsuleCrypto                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   CryptoConfig ──► Arc<CryptoConfig> (read-only, shared by clones)      │
//! │                                                                         │
//! │   derive_capsule_key(user, capsule)                                     │
//! │        │                                                                │
//! │        ├──► build_entity_salt(user, capsule)  = "user-capsule"          │
//! │        └──► derive_key(master_secret, salt)   = PBKDF2 100k rounds      │
//! │                                                                         │
//! │   generate_key / encrypt / decrypt / hash / verify / seal_* / open_*    │
//! │        └──► stateless calls into crate::crypto and crate::content       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cloning is cheap and clones share nothing mutable, so one instance can be
//! handed to every request handler.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::CryptoConfig;
use crate::content;
use crate::crypto::{self, DerivationSalt, Digest, EncryptedEnvelope, SymmetricKey};
use crate::error::{Error, Result};

/// Encryption and key management for capsule content
#[derive(Clone, Debug)]
pub struct CapsuleCrypto {
    config: Arc<CryptoConfig>,
}

impl CapsuleCrypto {
    /// Create the service from a validated configuration
    pub fn new(config: CryptoConfig) -> Self {
        tracing::debug!(
            secret_len = config.master_secret.len(),
            "Capsule crypto service configured"
        );
        Self {
            config: Arc::new(config),
        }
    }

    /// Load configuration from the environment and create the service
    pub fn from_env() -> Result<Self> {
        CryptoConfig::from_env().map(Self::new)
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    /// Generate a fresh random 256-bit key
    pub fn generate_key(&self) -> Result<SymmetricKey> {
        crypto::generate_key()
    }

    /// Generate `length_bytes` of secure random data
    pub fn generate_secure_token(&self, length_bytes: usize) -> Result<Vec<u8>> {
        crypto::generate_secure_token(length_bytes)
    }

    /// Derive the key for one user's capsule.
    ///
    /// Deterministic for a given master secret. The identifier order
    /// matters: `(a, b)` and `(b, a)` give different keys.
    ///
    /// This runs 100,000 PBKDF2 rounds; async callers should move it off
    /// the executor.
    pub fn derive_capsule_key(&self, user_id: &str, capsule_id: &str) -> Result<SymmetricKey> {
        if user_id.is_empty() {
            return Err(Error::InvalidArgument("user id must not be empty".into()));
        }
        if capsule_id.is_empty() {
            return Err(Error::InvalidArgument("capsule id must not be empty".into()));
        }
        let salt = crypto::build_entity_salt(user_id, capsule_id);
        self.derive_key_for_salt(&salt)
    }

    /// Derive a key from the master secret and an arbitrary salt
    pub fn derive_key_for_salt(&self, salt: &DerivationSalt) -> Result<SymmetricKey> {
        crypto::derive_key(self.config.master_secret.expose(), salt.as_bytes())
    }

    // ========================================================================
    // CIPHER
    // ========================================================================

    /// Encrypt raw bytes
    pub fn encrypt(&self, plaintext: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
        crypto::encrypt(plaintext, key)
    }

    /// Decrypt raw bytes
    pub fn decrypt(&self, envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Vec<u8>> {
        crypto::decrypt(envelope, key)
    }

    // ========================================================================
    // INTEGRITY
    // ========================================================================

    /// SHA-256 digest of `data`
    pub fn hash(&self, data: &[u8]) -> Digest {
        crypto::hash(data)
    }

    /// Check `data` against an expected digest
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        crypto::verify(data, expected)
    }

    /// Check `data` against hex or base64 digest text
    pub fn verify_encoded(&self, data: &[u8], expected: &str) -> bool {
        crypto::verify_encoded(data, expected)
    }

    // ========================================================================
    // CONTENT
    // ========================================================================

    /// Seal capsule text
    pub fn seal_text(&self, text: &str, key: &SymmetricKey) -> Result<EncryptedEnvelope> {
        content::seal_text(text, key)
    }

    /// Open capsule text
    pub fn open_text(&self, envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<String> {
        content::open_text(envelope, key)
    }

    /// Seal file contents
    pub fn seal_bytes(&self, data: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
        content::seal_bytes(data, key)
    }

    /// Open file contents
    pub fn open_bytes(&self, envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Vec<u8>> {
        content::open_bytes(envelope, key)
    }

    /// Seal JSON metadata
    pub fn seal_metadata<T: Serialize>(
        &self,
        metadata: &T,
        key: &SymmetricKey,
    ) -> Result<EncryptedEnvelope> {
        content::seal_metadata(metadata, key)
    }

    /// Open JSON metadata
    pub fn open_metadata<T: DeserializeOwned>(
        &self,
        envelope: &EncryptedEnvelope,
        key: &SymmetricKey,
    ) -> Result<T> {
        content::open_metadata(envelope, key)
    }

    /// Read and seal a file from disk
    pub fn seal_file(&self, path: impl AsRef<Path>, key: &SymmetricKey) -> Result<EncryptedEnvelope> {
        content::seal_file(path, key)
    }

    /// Open a sealed file and write it to `output`
    pub fn open_file_to(
        &self,
        envelope: &EncryptedEnvelope,
        key: &SymmetricKey,
        output: impl AsRef<Path>,
    ) -> Result<()> {
        content::open_file_to(envelope, key, output)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-master-secret-with-plenty-of-entropy-0001";

    fn service() -> CapsuleCrypto {
        CapsuleCrypto::new(CryptoConfig::new(SECRET).unwrap())
    }

    fn assert_send_sync<T: Send + Sync + Clone>() {}

    #[test]
    fn test_service_is_shareable() {
        assert_send_sync::<CapsuleCrypto>();
    }

    #[test]
    fn test_derive_capsule_key_matches_free_function() {
        let crypto = service();
        let via_service = crypto.derive_capsule_key("user-1", "capsule-9").unwrap();
        let salt = crypto::build_entity_salt("user-1", "capsule-9");
        let direct = crypto::derive_key(SECRET.as_bytes(), salt.as_bytes()).unwrap();
        assert_eq!(via_service, direct);

        // Clones share the same configuration
        let again = crypto.clone().derive_capsule_key("user-1", "capsule-9").unwrap();
        assert_eq!(via_service, again);
    }

    #[test]
    fn test_derive_capsule_key_rejects_empty_ids() {
        let crypto = service();
        assert!(matches!(
            crypto.derive_capsule_key("", "capsule-9"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            crypto.derive_capsule_key("user-1", ""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_encrypt_decrypt_through_service() {
        let crypto = service();
        let key = crypto.generate_key().unwrap();

        let envelope = crypto.encrypt(b"to be opened in 2040", &key).unwrap();
        assert_eq!(crypto.decrypt(&envelope, &key).unwrap(), b"to be opened in 2040");

        let other = crypto.generate_key().unwrap();
        assert!(matches!(
            crypto.decrypt(&envelope, &other),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_text_and_hash_through_service() {
        let crypto = service();
        let key = crypto.generate_key().unwrap();

        let envelope = crypto.seal_text("hello capsule", &key).unwrap();
        assert_eq!(crypto.open_text(&envelope, &key).unwrap(), "hello capsule");

        let digest = crypto.hash(b"hello capsule");
        assert!(crypto.verify(b"hello capsule", &digest));
        assert!(crypto.verify_encoded(b"hello capsule", &digest.to_hex()));
        assert!(!crypto.verify(b"hello capsulE", &digest));
    }

    #[test]
    fn test_secure_token_bounds() {
        let crypto = service();
        assert_eq!(crypto.generate_secure_token(16).unwrap().len(), 16);
        assert!(crypto.generate_secure_token(0).is_err());
    }
}
