//! # Error Handling
//!
//! Error types for SoulSafe Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Input Errors (100-199)                                            │
//! │  │   └── InvalidArgument       - Malformed/missing input               │
//! │  │                                                                      │
//! │  ├── Verification Errors (200-299)                                     │
//! │  │   └── AuthenticationFailed  - Tag mismatch on decryption            │
//! │  │                                                                      │
//! │  ├── Crypto Environment Errors (300-399)                               │
//! │  │   ├── RandomnessUnavailable - OS CSPRNG could not be read           │
//! │  │   ├── KeyDerivationFailed   - KDF rejected its parameters           │
//! │  │   └── EncryptionFailed      - AEAD refused to seal the payload      │
//! │  │                                                                      │
//! │  ├── Configuration Errors (400-499)                                    │
//! │  │   └── Configuration         - Missing or weak master secret         │
//! │  │                                                                      │
//! │  └── Boundary Errors (500-599)                                         │
//! │      ├── Io                    - Reading/writing capsule files         │
//! │      └── Serialization         - JSON metadata encode/decode           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Handling Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ERROR HANDLING FLOW                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Core (Rust)                  HTTP Boundary              Client         │
//! │  ──────────────────────────────────────────────────────────────────     │
//! │                                                                         │
//! │  Result<T, Error>  ──────►  status + { code, error }  ──────►  UI      │
//! │                                                                         │
//! │  Err(Error::AuthenticationFailed)  →  401 { code: 200, ... }           │
//! │  Err(Error::InvalidArgument(..))   →  400 { code: 100, ... }           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for SoulSafe Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SoulSafe Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Input Errors (100-199)
    // ========================================================================

    /// Malformed or missing input: wrong key length, bad base64, empty salt
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========================================================================
    // Verification Errors (200-299)
    // ========================================================================

    /// The authentication tag did not verify.
    ///
    /// Deliberately carries no detail: wrong key, wrong nonce, corrupted
    /// ciphertext and tampering are indistinguishable to the caller.
    #[error("Authentication failed: ciphertext could not be verified")]
    AuthenticationFailed,

    // ========================================================================
    // Crypto Environment Errors (300-399)
    // ========================================================================

    /// The operating system's secure random source could not be read
    #[error("Secure random source unavailable")]
    RandomnessUnavailable,

    /// Key derivation failed
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // ========================================================================
    // Configuration Errors (400-499)
    // ========================================================================

    /// Missing, empty or placeholder configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // ========================================================================
    // Boundary Errors (500-599)
    // ========================================================================

    /// File read/write failed
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Input
    /// - 200-299: Verification
    /// - 300-399: Crypto environment
    /// - 400-499: Configuration
    /// - 500-599: Boundary (I/O, serialization)
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 100,

            Error::AuthenticationFailed => 200,

            Error::RandomnessUnavailable => 300,
            Error::KeyDerivationFailed(_) => 301,
            Error::EncryptionFailed(_) => 302,

            Error::Configuration(_) => 400,

            Error::Io(_) => 500,
            Error::Serialization(_) => 501,
        }
    }

    /// Whether the caller can fix this by correcting its input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::AuthenticationFailed)
    }

    /// Whether this error signals a broken environment or configuration.
    ///
    /// Fatal errors are never retried by the core.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::RandomnessUnavailable
                | Error::KeyDerivationFailed(_)
                | Error::Configuration(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidArgument(format!("Invalid base64: {}", err))
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::InvalidArgument(format!("Invalid hex: {}", err))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidArgument("test".into()).code(), 100);
        assert_eq!(Error::AuthenticationFailed.code(), 200);
        assert_eq!(Error::RandomnessUnavailable.code(), 300);
        assert_eq!(Error::KeyDerivationFailed("test".into()).code(), 301);
        assert_eq!(Error::Configuration("test".into()).code(), 400);
        assert_eq!(Error::Io("test".into()).code(), 500);
    }

    #[test]
    fn test_classification() {
        assert!(Error::InvalidArgument("bad".into()).is_client_error());
        assert!(Error::AuthenticationFailed.is_client_error());
        assert!(!Error::AuthenticationFailed.is_fatal());
        assert!(Error::RandomnessUnavailable.is_fatal());
        assert!(Error::KeyDerivationFailed("x".into()).is_fatal());
        assert!(!Error::RandomnessUnavailable.is_client_error());
    }

    #[test]
    fn test_authentication_failed_has_no_detail() {
        let msg = Error::AuthenticationFailed.to_string();
        assert!(!msg.contains("tag"));
        assert!(!msg.contains("nonce"));
        assert!(!msg.contains("key"));
    }

    #[test]
    fn test_decode_errors_are_invalid_argument() {
        let err: Error = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
