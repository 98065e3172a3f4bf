//! Crypto configuration.
//!
//! The master secret is the only process-wide input of the core. It is
//! loaded once at startup, validated here, and handed to
//! [`CapsuleCrypto`](crate::CapsuleCrypto) explicitly. Nothing inside the
//! core reads the environment on its own.

use std::env;
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Environment variable holding the master secret
pub const MASTER_SECRET_ENV: &str = "ENCRYPTION_MASTER_KEY";

/// Shortest accepted master secret, in bytes
pub const MIN_MASTER_SECRET_LEN: usize = 32;

/// Values that have shipped as defaults or appear in sample configs.
/// Compared case-insensitively against the whole secret.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "fallback-master-key",
    "soulsafemasterkey2023!",
    "changeme",
    "change-me",
    "secret",
    "password",
    "master-key",
    "encryption_master_key",
];

/// Fragments that mark a secret as a template value wherever they appear
const PLACEHOLDER_MARKERS: &[&str] = &[
    "fallback-master-key",
    "soulsafemasterkey",
    "your-master-key-here",
    "changeme",
];

/// The process master secret, used only as key-derivation input
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret(Vec<u8>);

impl MasterSecret {
    /// Validate and wrap a master secret.
    ///
    /// ## Errors
    ///
    /// `Configuration` if the secret is empty, shorter than
    /// [`MIN_MASTER_SECRET_LEN`], one repeated byte, or contains a known
    /// placeholder value.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = Self(secret.into());
        secret.validate()?;
        Ok(secret)
    }

    fn validate(&self) -> Result<()> {
        let bytes = &self.0;
        if bytes.is_empty() {
            return Err(Error::Configuration("master secret is empty".into()));
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            let lowered = text.trim().to_ascii_lowercase();
            let is_placeholder = PLACEHOLDER_SECRETS.iter().any(|p| lowered == *p)
                || PLACEHOLDER_MARKERS.iter().any(|m| lowered.contains(m));
            if is_placeholder {
                return Err(Error::Configuration(
                    "master secret is a placeholder value; supply a high-entropy secret".into(),
                ));
            }
        }

        if bytes.len() < MIN_MASTER_SECRET_LEN {
            return Err(Error::Configuration(format!(
                "master secret must be at least {} bytes, got {}",
                MIN_MASTER_SECRET_LEN,
                bytes.len()
            )));
        }

        if bytes.iter().all(|b| *b == bytes[0]) {
            return Err(Error::Configuration(
                "master secret is a single repeated byte".into(),
            ));
        }

        Ok(())
    }

    /// Get the secret bytes (KDF input only)
    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated secret
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret([REDACTED; {} bytes])", self.0.len())
    }
}

/// Configuration for constructing [`CapsuleCrypto`](crate::CapsuleCrypto)
#[derive(Clone, Debug)]
pub struct CryptoConfig {
    /// Master secret for capsule key derivation
    pub master_secret: MasterSecret,
}

impl CryptoConfig {
    /// Build a configuration from an explicit master secret
    pub fn new(master_secret: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self {
            master_secret: MasterSecret::new(master_secret)?,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Reads [`MASTER_SECRET_ENV`]. A missing variable is an error; there is
    /// no built-in default.
    pub fn from_env() -> Result<Self> {
        let secret = env::var(MASTER_SECRET_ENV).map_err(|_| {
            Error::Configuration(format!("{} is not set", MASTER_SECRET_ENV))
        })?;
        Self::new(secret)
    }
}

// ============================================================================
// TESTS
// ============================================================================
