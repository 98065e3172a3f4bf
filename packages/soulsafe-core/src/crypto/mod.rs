//! # Cryptography Module
//!
//! All cryptographic primitives used by SoulSafe Core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐                           │
//! │  │  Key Generator   │   │   Key Deriver    │                           │
//! │  │  (keys)          │   │   (kdf)          │                           │
//! │  │                  │   │                  │                           │
//! │  │ • OS CSPRNG      │   │ • PBKDF2-HMAC-   │                           │
//! │  │ • 256-bit keys   │   │   SHA256, 100k   │                           │
//! │  │ • secure tokens  │   │ • user-capsule   │                           │
//! │  └────────┬─────────┘   └────────┬─────────┘                           │
//! │           └──────────┬───────────┘                                      │
//! │                      ▼                                                  │
//! │           ┌──────────────────────┐      ┌──────────────────┐           │
//! │           │ Authenticated Cipher │      │ Integrity Hasher │           │
//! │           │ (encryption)         │      │ (hashing)        │           │
//! │           │                      │      │                  │           │
//! │           │ • AES-256-GCM        │      │ • SHA-256        │           │
//! │           │ • 96-bit nonce       │      │ • constant-time  │           │
//! │           │ • 128-bit tag        │      │   verification   │           │
//! │           └──────────────────────┘      └──────────────────┘           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | AES-256-GCM | Encryption | Hardware acceleration, AEAD |
//! | PBKDF2-HMAC-SHA256 | Key Derivation | Matches keys already derived by deployed services |
//! | SHA-256 | Content digests | Matches stored integrity hashes |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Keys and the master secret are zeroized when dropped
//! 2. **Constant-Time Operations**: Tag checks (aes-gcm) and digest/key comparisons (subtle)
//! 3. **Secure Random**: `rand::rngs::OsRng`, with no fallback generator
//! 4. **No Nonce Reuse**: A fresh random nonce for every encryption

mod encryption;
mod hashing;
mod kdf;
mod keys;

pub use encryption::{
    decrypt, decrypt_with_aad, encrypt, encrypt_with_aad, AuthTag, EncryptedEnvelope, Nonce,
    MAX_MESSAGES_PER_KEY, NONCE_SIZE, TAG_SIZE,
};
pub use hashing::{hash, verify, verify_encoded, Digest, DIGEST_SIZE};
pub use kdf::{build_entity_salt, derive_key, DerivationSalt, PBKDF2_ITERATIONS, SALT_SEPARATOR};
pub use keys::{
    fill_random, generate_key, generate_secure_token, SymmetricKey, DEFAULT_TOKEN_LENGTH, KEY_SIZE,
    MAX_TOKEN_LENGTH,
};
