//! # Encryption Module
//!
//! AES-256-GCM encryption for capsule confidentiality and integrity.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PAYLOAD ENCRYPTION FLOW                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Obtain a key                                                  │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  generate_key()            → random 32 bytes                │       │
//! │  │  derive_key(master, salt)  → PBKDF2 output (32 bytes)       │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 2: Generate Nonce (unique per call)                              │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Random 12 bytes from the OS CSPRNG                          │       │
//! │  │  (Never reuse a nonce with the same key!)                   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Encrypt                                                       │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  AES-256-GCM(                                                │       │
//! │  │    key       = symmetric_key,                               │       │
//! │  │    nonce     = random_nonce,                                │       │
//! │  │    plaintext = payload bytes,                               │       │
//! │  │    aad       = optional context label                       │       │
//! │  │  )                                                          │       │
//! │  │           ↓                                                  │       │
//! │  │  Ciphertext (same length as plaintext) + 16-byte Auth Tag   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Output: EncryptedEnvelope { ciphertext, nonce, tag }                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PAYLOAD DECRYPTION FLOW                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  AES-256-GCM-Decrypt(key, nonce, ciphertext, aad, tag)                 │
//! │           ↓                                                             │
//! │  1. Recompute the tag over (aad, ciphertext)                           │
//! │  2. Compare with the stored tag in constant time                       │
//! │  3. Only on match: apply the keystream and release plaintext           │
//! │           ↓                                                             │
//! │  Plaintext, or AuthenticationFailed (no partial output)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Only key holders can read the payload |
//! | Integrity | Any modification of ciphertext, nonce or tag is detected |
//! | Context binding | AAD ties an envelope to its content domain |
//! | Nonce bound | Random 96-bit nonces: rotate a key after 2^32 messages |

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce as AesNonce, Tag as AesTag,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::keys::{fill_random, SymmetricKey};
use crate::encoding::{self, base64_array, base64_bytes};
use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Messages one key may encrypt before it should be rotated.
///
/// Birthday bound for random 96-bit nonces at a 2^-32 collision chance.
pub const MAX_MESSAGES_PER_KEY: u64 = 1 << 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Nonce reuse completely breaks AES-GCM security:
/// - Allows recovering the authentication key
/// - Allows forging messages
/// - May allow recovering plaintext
///
/// We use random nonces, which are safe for up to 2^32 messages
/// per key (birthday bound for 96-bit nonces).
///
/// The bytes are read through [`Nonce::as_bytes`]; the field itself is
/// not public:
///
/// ```compile_fail
/// use soulsafe_core::crypto::Nonce;
///
/// let mut nonce = Nonce::from_bytes([0u8; 12]);
/// nonce.0[0] = 1;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(#[serde(with = "base64_array")] [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; NONCE_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 12 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        encoding::to_fixed::<NONCE_SIZE>(slice, "nonce").map(Self)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// A 128-bit GCM authentication tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTag(#[serde(with = "base64_array")] [u8; TAG_SIZE]);

impl AuthTag {
    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; TAG_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 16 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        encoding::to_fixed::<TAG_SIZE>(slice, "tag").map(Self)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }
}

/// Everything needed to decrypt a payload except the key
///
/// Serializes as `{ "encrypted": "<b64>", "iv": "<b64>", "tag": "<b64>" }`,
/// the shape clients of the REST API already store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Ciphertext, same length as the plaintext
    #[serde(rename = "encrypted", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    /// Nonce used for this encryption
    #[serde(rename = "iv")]
    pub nonce: Nonce,
    /// Authentication tag
    pub tag: AuthTag,
}

impl EncryptedEnvelope {
    /// Assemble an envelope from its parts
    pub fn new(ciphertext: Vec<u8>, nonce: Nonce, tag: AuthTag) -> Self {
        Self {
            ciphertext,
            nonce,
            tag,
        }
    }

    /// Rebuild an envelope from base64 fields, validating every length
    pub fn from_base64_parts(ciphertext: &str, nonce: &str, tag: &str) -> Result<Self> {
        let ciphertext = encoding::decode_base64(ciphertext)?;
        let nonce = Nonce(encoding::decode_base64_fixed::<NONCE_SIZE>(nonce, "nonce")?);
        let tag = AuthTag(encoding::decode_base64_fixed::<TAG_SIZE>(tag, "tag")?);
        Ok(Self::new(ciphertext, nonce, tag))
    }

    /// Rebuild an envelope from base64 ciphertext with the tag appended.
    ///
    /// This is the `ciphertext || tag` layout most AES-GCM libraries emit
    /// when the tag is not kept separately.
    pub fn from_base64_combined(ciphertext_and_tag: &str, nonce: &str) -> Result<Self> {
        let mut ciphertext = encoding::decode_base64(ciphertext_and_tag)?;
        if ciphertext.len() < TAG_SIZE {
            return Err(Error::InvalidArgument(format!(
                "ciphertext must end with the {}-byte tag, got {} bytes",
                TAG_SIZE,
                ciphertext.len()
            )));
        }
        let tag = AuthTag::from_slice(&ciphertext.split_off(ciphertext.len() - TAG_SIZE))?;
        let nonce = Nonce(encoding::decode_base64_fixed::<NONCE_SIZE>(nonce, "nonce")?);
        Ok(Self::new(ciphertext, nonce, tag))
    }

    /// Rebuild an envelope from hex fields (legacy stored capsules)
    pub fn from_hex_parts(ciphertext: &str, nonce: &str, tag: &str) -> Result<Self> {
        let ciphertext = encoding::decode_hex(ciphertext)?;
        let nonce = Nonce::from_slice(&encoding::decode_hex(nonce)?)?;
        let tag = AuthTag::from_slice(&encoding::decode_hex(tag)?)?;
        Ok(Self::new(ciphertext, nonce, tag))
    }

    /// Base64 of the ciphertext
    pub fn ciphertext_base64(&self) -> String {
        encoding::encode_base64(&self.ciphertext)
    }

    /// Base64 of the nonce
    pub fn nonce_base64(&self) -> String {
        encoding::encode_base64(&self.nonce.0)
    }

    /// Base64 of the tag
    pub fn tag_base64(&self) -> String {
        encoding::encode_base64(&self.tag.0)
    }

    /// Hex encoding of (ciphertext, nonce, tag)
    pub fn to_hex_parts(&self) -> (String, String, String) {
        (
            encoding::encode_hex(&self.ciphertext),
            encoding::encode_hex(&self.nonce.0),
            encoding::encode_hex(&self.tag.0),
        )
    }
}

/// Encrypt a payload with AES-256-GCM and no associated data
///
/// ## Example
///
/// ```
/// use soulsafe_core::crypto::{decrypt, encrypt, generate_key};
///
/// let key = generate_key()?;
/// let envelope = encrypt(b"hello world", &key)?;
/// assert_eq!(envelope.ciphertext.len(), 11);
/// assert_eq!(decrypt(&envelope, &key)?, b"hello world");
/// # Ok::<(), soulsafe_core::Error>(())
/// ```
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    encrypt_with_aad(plaintext, key, &[])
}

/// Decrypt an envelope produced by [`encrypt`]
pub fn decrypt(envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Vec<u8>> {
    decrypt_with_aad(envelope, key, &[])
}

/// Encrypt a payload with AES-256-GCM
///
/// ## Parameters
///
/// - `plaintext`: Bytes to encrypt (any length, including empty)
/// - `key`: 256-bit key
/// - `aad`: Additional authenticated data (not encrypted, but authenticated)
///
/// ## Returns
///
/// An envelope with a fresh random nonce and a detached 16-byte tag.
pub fn encrypt_with_aad(
    plaintext: &[u8],
    key: &SymmetricKey,
    aad: &[u8],
) -> Result<EncryptedEnvelope> {
    let nonce = Nonce::random()?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::InvalidArgument(format!("Invalid key: {}", e)))?;

    let mut buffer = plaintext.to_vec();
    let tag = match cipher.encrypt_in_place_detached(AesNonce::from_slice(&nonce.0), aad, &mut buffer) {
        Ok(tag) => tag,
        Err(e) => {
            buffer.zeroize();
            return Err(Error::EncryptionFailed(format!("AES-GCM seal failed: {}", e)));
        }
    };

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());

    tracing::debug!(len = buffer.len(), aad_len = aad.len(), "Encrypted payload");
    Ok(EncryptedEnvelope::new(buffer, nonce, AuthTag(tag_bytes)))
}

/// Decrypt an envelope with AES-256-GCM
///
/// ## Parameters
///
/// - `envelope`: Ciphertext, nonce and tag from encryption
/// - `key`: 256-bit key (must be the one used for encryption)
/// - `aad`: Additional authenticated data (must match encryption)
///
/// ## Errors
///
/// Returns `AuthenticationFailed` if:
/// - The ciphertext, nonce or tag was altered
/// - The AAD doesn't match
/// - The key is wrong
///
/// The tag is checked in constant time before any plaintext is produced.
pub fn decrypt_with_aad(
    envelope: &EncryptedEnvelope,
    key: &SymmetricKey,
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::InvalidArgument(format!("Invalid key: {}", e)))?;

    let mut buffer = envelope.ciphertext.clone();
    let result = cipher.decrypt_in_place_detached(
        AesNonce::from_slice(&envelope.nonce.0),
        aad,
        &mut buffer,
        AesTag::from_slice(&envelope.tag.0),
    );

    match result {
        Ok(()) => {
            tracing::debug!(len = buffer.len(), "Decrypted payload");
            Ok(buffer)
        }
        Err(_) => {
            buffer.zeroize();
            tracing::debug!("Envelope failed authentication");
            Err(Error::AuthenticationFailed)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key;

    #[test]
    fn test_encrypt_decrypt_basic() {
        let key = SymmetricKey::from_bytes([42u8; 32]);
        let plaintext = b"Hello, World!";

        let envelope = encrypt(plaintext, &key).unwrap();
        let decrypted = decrypt(&envelope, &key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_hello_world_sizes() {
        let key = generate_key().unwrap();
        let envelope = encrypt(b"hello world", &key).unwrap();

        assert_eq!(envelope.nonce.as_bytes().len(), NONCE_SIZE);
        assert_eq!(envelope.tag.as_bytes().len(), TAG_SIZE);
        assert_eq!(envelope.ciphertext.len(), b"hello world".len());
        assert_ne!(envelope.ciphertext, b"hello world");

        assert_eq!(decrypt(&envelope, &key).unwrap(), b"hello world");
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = SymmetricKey::from_bytes([42u8; 32]);

        let envelope = encrypt(b"", &key).unwrap();
        assert!(envelope.ciphertext.is_empty());

        let decrypted = decrypt(&envelope, &key).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_empty_plaintext_tag_still_checked() {
        let key = SymmetricKey::from_bytes([42u8; 32]);
        let mut envelope = encrypt(b"", &key).unwrap();
        envelope.tag.0[0] ^= 0x01;

        assert!(matches!(decrypt(&envelope, &key), Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_binary_payload() {
        let key = SymmetricKey::from_bytes([7u8; 32]);
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let envelope = encrypt(&payload, &key).unwrap();
        assert_eq!(decrypt(&envelope, &key).unwrap(), payload);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SymmetricKey::from_bytes([42u8; 32]);
        let mut envelope = encrypt(b"Hello, World!", &key).unwrap();

        envelope.ciphertext[0] ^= 0xFF;

        assert!(matches!(decrypt(&envelope, &key), Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_nonce_fails() {
        let key = SymmetricKey::from_bytes([42u8; 32]);
        let mut envelope = encrypt(b"Hello, World!", &key).unwrap();

        envelope.nonce.0[11] ^= 0x80;

        assert!(matches!(decrypt(&envelope, &key), Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_combined_tag_layout_decrypts() {
        let key = SymmetricKey::from_bytes([42u8; 32]);
        let envelope = encrypt(b"hello world", &key).unwrap();

        let mut combined = envelope.ciphertext.clone();
        combined.extend_from_slice(envelope.tag.as_bytes());
        let restored = EncryptedEnvelope::from_base64_combined(
            &encoding::encode_base64(&combined),
            &envelope.nonce_base64(),
        )
        .unwrap();

        assert_eq!(restored, envelope);
        assert_eq!(decrypt(&restored, &key).unwrap(), b"hello world");
    }

    #[test]
    fn test_combined_tag_layout_too_short() {
        let nonce = encoding::encode_base64(&[0u8; NONCE_SIZE]);
        let short = encoding::encode_base64(&[1u8; TAG_SIZE - 1]);

        let result = EncryptedEnvelope::from_base64_combined(&short, &nonce);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        // Exactly a tag is an empty ciphertext
        let tag_only = encoding::encode_base64(&[1u8; TAG_SIZE]);
        let envelope = EncryptedEnvelope::from_base64_combined(&tag_only, &nonce).unwrap();
        assert!(envelope.ciphertext.is_empty());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = SymmetricKey::from_bytes([42u8; 32]);
        let key2 = SymmetricKey::from_bytes([99u8; 32]);

        let envelope = encrypt(b"secret", &key1).unwrap();
        assert!(matches!(decrypt(&envelope, &key2), Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let key = SymmetricKey::from_bytes([42u8; 32]);

        let envelope = encrypt_with_aad(b"Hello, World!", &key, b"context").unwrap();
        let result = decrypt_with_aad(&envelope, &key, b"wrong context");

        assert!(matches!(result, Err(Error::AuthenticationFailed)));
        assert!(decrypt(&envelope, &key).is_err());
    }

    #[test]
    fn test_different_nonces_produce_different_ciphertext() {
        let key = SymmetricKey::from_bytes([42u8; 32]);

        let e1 = encrypt(b"Hello, World!", &key).unwrap();
        let e2 = encrypt(b"Hello, World!", &key).unwrap();

        assert_ne!(e1.nonce, e2.nonce);
        assert_ne!(e1.ciphertext, e2.ciphertext);
    }

    #[test]
    fn test_envelope_json_shape() {
        let key = SymmetricKey::from_bytes([1u8; 32]);
        let envelope = encrypt(b"payload", &key).unwrap();

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["encrypted"], envelope.ciphertext_base64());
        assert_eq!(json["iv"], envelope.nonce_base64());
        assert_eq!(json["tag"], envelope.tag_base64());

        let restored: EncryptedEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(restored, envelope);
    }

    #[test]
    fn test_envelope_json_rejects_short_nonce() {
        let json = serde_json::json!({
            "encrypted": "",
            "iv": encoding::encode_base64(&[0u8; 8]),
            "tag": encoding::encode_base64(&[0u8; TAG_SIZE]),
        });
        assert!(serde_json::from_value::<EncryptedEnvelope>(json).is_err());
    }

    #[test]
    fn test_from_base64_parts_validates_lengths() {
        let ct = encoding::encode_base64(b"abc");
        let nonce = encoding::encode_base64(&[0u8; NONCE_SIZE]);
        let tag = encoding::encode_base64(&[0u8; TAG_SIZE]);

        assert!(EncryptedEnvelope::from_base64_parts(&ct, &nonce, &tag).is_ok());
        assert!(matches!(
            EncryptedEnvelope::from_base64_parts(&ct, &tag, &tag),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            EncryptedEnvelope::from_base64_parts("%%%", &nonce, &tag),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_hex_parts() {
        let key = SymmetricKey::from_bytes([3u8; 32]);
        let envelope = encrypt(b"legacy", &key).unwrap();

        let (ct, iv, tag) = envelope.to_hex_parts();
        let restored = EncryptedEnvelope::from_hex_parts(&ct, &iv, &tag).unwrap();

        assert_eq!(decrypt(&restored, &key).unwrap(), b"legacy");
    }
}
