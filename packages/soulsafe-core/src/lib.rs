//! # SoulSafe Core
//!
//! Encryption and key management for time-capsule content: random keys,
//! per-capsule key derivation, authenticated encryption of text and file
//! payloads, and integrity digests.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SOULSAFE CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐   ┌──────────────────────────────────────────────┐    │
//! │  │   Config    │   │                CapsuleCrypto                 │    │
//! │  │             │──►│                  (service)                   │    │
//! │  │ - Master    │   │ derive_capsule_key · encrypt · seal_text ... │    │
//! │  │   secret    │   └──────────────┬────────────────┬──────────────┘    │
//! │  └─────────────┘                  │                │                   │
//! │                                   ▼                ▼                   │
//! │                    ┌─────────────────────┐  ┌─────────────────────┐    │
//! │                    │      Content        │  │       Crypto        │    │
//! │                    │                     │─►│                     │    │
//! │                    │ - Text / Metadata   │  │ - Keys (OsRng)      │    │
//! │                    │ - Files             │  │ - PBKDF2-SHA256     │    │
//! │                    │ - AAD labels        │  │ - AES-256-GCM       │    │
//! │                    └─────────────────────┘  │ - SHA-256           │    │
//! │                                             └─────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error type and numeric codes
//! - [`crypto`] - Primitives (keys, derivation, cipher, digests)
//! - [`content`] - Domain-labelled sealing of text, metadata and files
//! - [`config`] - Master secret and its validation
//! - [`encoding`] - Base64/hex codecs and serde adapters
//! - [`service`] - [`CapsuleCrypto`], the facade callers hold
//!
//! ## Example
//!
//! ```no_run
//! use soulsafe_core::{CapsuleCrypto, CryptoConfig};
//!
//! # fn main() -> soulsafe_core::Result<()> {
//! let crypto = CapsuleCrypto::new(CryptoConfig::from_env()?);
//!
//! let key = crypto.derive_capsule_key("user-1", "capsule-9")?;
//! let envelope = crypto.seal_text("Open me on your 30th birthday", &key)?;
//! let text = crypto.open_text(&envelope, &key)?;
//! # Ok(())
//! # }
//! ```
//!
//! The core does no I/O beyond the explicit file helpers, never logs key
//! material, and keeps no mutable state.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod content;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod service;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::{CryptoConfig, MasterSecret};
pub use content::ContentKind;
pub use crypto::{Digest, EncryptedEnvelope, SymmetricKey};
pub use error::{Error, Result};
pub use service::CapsuleCrypto;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of SoulSafe Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
