//! # Integrity Hashing
//!
//! SHA-256 fingerprints for tamper detection of stored capsule content.
//!
//! Digests are stored by two generations of clients: lowercase hex (file
//! integrity records) and base64 (hashes issued by the REST API).
//! [`verify_encoded`] accepts either.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use subtle::ConstantTimeEq;

use crate::encoding;
use crate::error::Result;

/// Size of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// A 256-bit content digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(#[serde(with = "hex_digest")] [u8; DIGEST_SIZE]);

impl Digest {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Encode as lowercase hex
    pub fn to_hex(&self) -> String {
        encoding::encode_hex(&self.0)
    }

    /// Decode from hex
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = encoding::decode_hex(text)?;
        encoding::to_fixed::<DIGEST_SIZE>(&bytes, "digest").map(Self)
    }

    /// Encode as base64
    pub fn to_base64(&self) -> String {
        encoding::encode_base64(&self.0)
    }

    /// Decode from base64
    pub fn from_base64(text: &str) -> Result<Self> {
        encoding::decode_base64_fixed::<DIGEST_SIZE>(text, "digest").map(Self)
    }

    /// Parse hex or base64 digest text.
    ///
    /// 64 characters is read as hex; anything else as base64.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.len() == DIGEST_SIZE * 2 {
            Self::from_hex(text)
        } else {
            Self::from_base64(text)
        }
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the SHA-256 digest of `data`
pub fn hash(data: &[u8]) -> Digest {
    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&Sha256::digest(data));
    Digest(out)
}

/// Check `data` against an expected digest in constant time
pub fn verify(data: &[u8], expected: &Digest) -> bool {
    let actual = hash(data);
    actual.0.ct_eq(&expected.0).into()
}

/// Check `data` against digest text (hex or base64).
///
/// Malformed digest text is a mismatch, not an error.
pub fn verify_encoded(data: &[u8], expected: &str) -> bool {
    match Digest::parse(expected) {
        Ok(digest) => verify(data, &digest),
        Err(_) => {
            tracing::debug!("Digest text could not be parsed; treating as mismatch");
            false
        }
    }
}

/// Serde helper for digests as hex
mod hex_digest {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DIGEST_SIZE;

    pub fn serialize<S>(bytes: &[u8; DIGEST_SIZE], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<[u8; DIGEST_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid digest length"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
