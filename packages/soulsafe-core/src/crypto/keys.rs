//! # Key Management
//!
//! Symmetric key material and secure random generation.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY SOURCES                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  generate_key()                                                 │   │
//! │  │  ───────────────                                                 │   │
//! │  │  32 bytes straight from the OS CSPRNG. Independent of any       │   │
//! │  │  entity; the caller must store it to decrypt later.             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  derive_key(master_secret, salt)          (see kdf module)      │   │
//! │  │  ─────────────────────────────────                               │   │
//! │  │  Reconstructible on demand from the master secret and the       │   │
//! │  │  capsule's identifiers. Nothing to store.                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Both produce a SymmetricKey: 256 bits, zeroized on drop,              │
//! │  redacted in Debug output, compared in constant time.                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding;
use crate::error::{Error, Result};

/// Size of a symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Default length of a secure token in bytes
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Largest token a single call may request
pub const MAX_TOKEN_LENGTH: usize = 1024;

/// A 256-bit AES-GCM key
///
/// Zeroized when dropped. There is no `Display` and no serde impl: the only
/// way to get the bytes out is an explicit [`SymmetricKey::as_bytes`] or
/// [`SymmetricKey::to_base64`] call.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        encoding::to_fixed::<KEY_SIZE>(slice, "key").map(Self)
    }

    /// Decode from base64 (the REST boundary encoding)
    pub fn from_base64(text: &str) -> Result<Self> {
        encoding::decode_base64_fixed::<KEY_SIZE>(text, "key").map(Self)
    }

    /// Decode from hex (the legacy storage encoding)
    pub fn from_hex(text: &str) -> Result<Self> {
        let mut bytes = encoding::decode_hex(text)?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Get the raw key bytes
    ///
    /// ## Security Warning
    ///
    /// Never log or persist these bytes unencrypted.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encode as base64 for handing back to the caller
    pub fn to_base64(&self) -> String {
        encoding::encode_base64(&self.0)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SymmetricKey {}

/// Fill `buf` from the operating system's CSPRNG.
///
/// There is no fallback generator: if the OS source fails the caller gets
/// `RandomnessUnavailable`.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed");
        Error::RandomnessUnavailable
    })
}

/// Generate a fresh random 256-bit key
pub fn generate_key() -> Result<SymmetricKey> {
    let mut bytes = [0u8; KEY_SIZE];
    fill_random(&mut bytes)?;
    let key = SymmetricKey(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Generate `length_bytes` of secure random data for one-off secrets
///
/// ## Errors
///
/// `InvalidArgument` if `length_bytes` is zero or above [`MAX_TOKEN_LENGTH`].
pub fn generate_secure_token(length_bytes: usize) -> Result<Vec<u8>> {
    if length_bytes == 0 {
        return Err(Error::InvalidArgument(
            "Token length must be greater than zero".into(),
        ));
    }
    if length_bytes > MAX_TOKEN_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "Token length must be at most {} bytes, got {}",
            MAX_TOKEN_LENGTH, length_bytes
        )));
    }

    let mut token = vec![0u8; length_bytes];
    fill_random(&mut token)?;
    Ok(token)
}

// ============================================================================
// TESTS
// ============================================================================
