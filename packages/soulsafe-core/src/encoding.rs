//! # Boundary Encoding
//!
//! Binary values never leave the core raw: keys, nonces, tags and
//! ciphertexts cross the REST boundary as standard (padded) base64, and
//! content digests are stored as lowercase hex.
//!
//! ```text
//! ┌──────────────┐   encode_base64 / encode_hex    ┌──────────────────┐
//! │  raw bytes   │ ──────────────────────────────► │  transport text  │
//! │  (core)      │ ◄────────────────────────────── │  (JSON fields)   │
//! └──────────────┘   decode_* + length checks      └──────────────────┘
//! ```
//!
//! Decoding failures are always `InvalidArgument`: the caller sent
//! something malformed and can fix it.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

/// Encode bytes as standard padded base64
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Encode bytes as lowercase hex
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex (either case)
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(text.trim())?)
}

/// Copy a slice into a fixed-size array, rejecting any other length.
///
/// `what` names the value in the error message ("key", "nonce", ...).
pub fn to_fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    if bytes.len() != N {
        return Err(Error::InvalidArgument(format!(
            "{} must be {} bytes, got {}",
            what,
            N,
            bytes.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Decode base64 text that must hold exactly `N` bytes
pub fn decode_base64_fixed<const N: usize>(text: &str, what: &str) -> Result<[u8; N]> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| Error::InvalidArgument(format!("{} is not valid base64: {}", what, e)))?;
    to_fixed(&bytes, what)
}

/// Serde helper for byte vectors as base64 strings
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as a base64 string
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserialize from a base64 string
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.trim()).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for fixed-size byte arrays as base64 strings
pub mod base64_array {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as a base64 string
    pub fn serialize<S, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserialize from a base64 string of exactly `N` bytes
    pub fn deserialize<'de, D, const N: usize>(
        deserializer: D,
    ) -> std::result::Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(s.trim()).map_err(serde::de::Error::custom)?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            serde::de::Error::custom(format!("expected {} bytes, got {}", N, len))
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
