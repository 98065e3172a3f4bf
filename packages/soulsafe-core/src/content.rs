//! # Capsule Content Sealing
//!
//! Thin helpers over the cipher for the three kinds of capsule content.
//! Each kind is bound to its own associated-data label, so an envelope
//! sealed as a file cannot be opened as text and vice versa.
//!
//! ```text
//! ┌──────────────┬──────────────────────┬─────────────────────────────────┐
//! │ ContentKind  │ AAD label            │ Boundary conversion             │
//! ├──────────────┼──────────────────────┼─────────────────────────────────┤
//! │ Text         │ "soulsafe-capsule"   │ &str  ⇄ UTF-8 bytes             │
//! │ Metadata     │ "soulsafe-capsule"   │ T: Serialize ⇄ JSON bytes       │
//! │ File         │ "soulsafe-file"      │ raw bytes / file on disk        │
//! └──────────────┴──────────────────────┴─────────────────────────────────┘
//! ```
//!
//! The labels match envelopes already stored by the capsule service.
//! Metadata shares the text label because it is sealed as its JSON text.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroize;

use crate::crypto::{decrypt_with_aad, encrypt_with_aad, EncryptedEnvelope, SymmetricKey};
use crate::error::{Error, Result};

/// Kind of capsule content, selecting the associated-data label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    /// UTF-8 text written by the user
    Text,
    /// Uploaded file contents
    File,
    /// JSON metadata describing a capsule
    Metadata,
}

impl ContentKind {
    /// Associated data bound into every envelope of this kind
    pub fn aad(self) -> &'static [u8] {
        match self {
            ContentKind::Text | ContentKind::Metadata => b"soulsafe-capsule",
            ContentKind::File => b"soulsafe-file",
        }
    }
}

/// Encrypt bytes under the label for `kind`
pub fn seal(kind: ContentKind, plaintext: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    encrypt_with_aad(plaintext, key, kind.aad())
}

/// Decrypt an envelope sealed under the label for `kind`
pub fn open(kind: ContentKind, envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Vec<u8>> {
    decrypt_with_aad(envelope, key, kind.aad())
}

/// Seal capsule text
pub fn seal_text(text: &str, key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    seal(ContentKind::Text, text.as_bytes(), key)
}

/// Open capsule text.
///
/// A payload that authenticates but is not UTF-8 is `InvalidArgument`:
/// it was sealed as text by something that didn't write text.
pub fn open_text(envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<String> {
    let bytes = open(ContentKind::Text, envelope, key)?;
    String::from_utf8(bytes).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        Error::InvalidArgument("Decrypted text is not valid UTF-8".into())
    })
}

/// Seal file contents
pub fn seal_bytes(data: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    seal(ContentKind::File, data, key)
}

/// Open file contents
pub fn open_bytes(envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Vec<u8>> {
    open(ContentKind::File, envelope, key)
}

/// Serialize metadata to JSON and seal it
pub fn seal_metadata<T: Serialize>(metadata: &T, key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    let mut json = serde_json::to_vec(metadata)?;
    let envelope = seal(ContentKind::Metadata, &json, key);
    json.zeroize();
    envelope
}

/// Open sealed metadata and deserialize it from JSON
pub fn open_metadata<T: DeserializeOwned>(
    envelope: &EncryptedEnvelope,
    key: &SymmetricKey,
) -> Result<T> {
    let mut json = open(ContentKind::Metadata, envelope, key)?;
    let parsed = serde_json::from_slice(&json);
    json.zeroize();
    Ok(parsed?)
}

/// Read a file from disk and seal its contents
pub fn seal_file(path: impl AsRef<Path>, key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    let path = path.as_ref();
    let mut data = fs::read(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let envelope = seal_bytes(&data, key);
    data.zeroize();
    tracing::debug!(path = %path.display(), "Sealed file from disk");
    envelope
}

/// Open a sealed file and write the plaintext to `output`.
///
/// Nothing is written unless the envelope authenticates.
pub fn open_file_to(
    envelope: &EncryptedEnvelope,
    key: &SymmetricKey,
    output: impl AsRef<Path>,
) -> Result<()> {
    let output = output.as_ref();
    let mut data = open_bytes(envelope, key)?;
    let written = fs::write(output, &data)
        .map_err(|e| Error::Io(format!("Failed to write {}: {}", output.display(), e)));
    data.zeroize();
    written?;
    tracing::debug!(path = %output.display(), "Wrote opened file to disk");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{decrypt, encrypt};
    use serde::Deserialize;

    fn test_key() -> SymmetricKey {
        SymmetricKey::from_bytes([11u8; 32])
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CapsuleMeta {
        title: String,
        unlock_at: i64,
        tags: Vec<String>,
    }

    #[test]
    fn test_text_round_trip() {
        let key = test_key();
        let envelope = seal_text("Dear future me 🌱", &key).unwrap();
        assert_eq!(open_text(&envelope, &key).unwrap(), "Dear future me 🌱");
    }

    #[test]
    fn test_text_envelope_not_openable_as_file() {
        let key = test_key();
        let envelope = seal_text("note", &key).unwrap();
        assert!(matches!(open_bytes(&envelope, &key), Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_file_envelope_not_openable_as_text() {
        let key = test_key();
        let envelope = seal_bytes(b"\x89PNG\r\n", &key).unwrap();
        assert!(matches!(open_text(&envelope, &key), Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_labelled_envelope_not_openable_without_aad() {
        let key = test_key();
        let envelope = seal_text("note", &key).unwrap();
        assert!(decrypt(&envelope, &key).is_err());
    }

    #[test]
    fn test_open_text_rejects_non_utf8() {
        let key = test_key();
        let envelope = seal(ContentKind::Text, &[0xff, 0xfe, 0xfd], &key).unwrap();
        assert!(matches!(open_text(&envelope, &key), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_metadata_round_trip() {
        let key = test_key();
        let meta = CapsuleMeta {
            title: "Graduation".into(),
            unlock_at: 1_893_456_000,
            tags: vec!["family".into(), "milestone".into()],
        };

        let envelope = seal_metadata(&meta, &key).unwrap();
        let restored: CapsuleMeta = open_metadata(&envelope, &key).unwrap();
        assert_eq!(restored, meta);
    }

    #[test]
    fn test_metadata_wrong_shape_is_serialization_error() {
        let key = test_key();
        let envelope = seal_text("[1, 2, 3]", &key).unwrap();
        let result: Result<CapsuleMeta> = open_metadata(&envelope, &key);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_file_on_disk_round_trip() {
        let key = test_key();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("letter.bin");
        let output = dir.path().join("letter.out");
        let contents: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        fs::write(&input, &contents).unwrap();

        let envelope = seal_file(&input, &key).unwrap();
        assert_eq!(envelope.ciphertext.len(), contents.len());

        open_file_to(&envelope, &key, &output).unwrap();
        assert_eq!(fs::read(&output).unwrap(), contents);
    }

    #[test]
    fn test_open_file_writes_nothing_on_auth_failure() {
        let key = test_key();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("never.out");

        let mut envelope = seal_bytes(b"secret pages", &key).unwrap();
        envelope.ciphertext[0] ^= 0x01;

        let result = open_file_to(&envelope, &key, &output);
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
        assert!(!output.exists());
    }

    #[test]
    fn test_seal_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = seal_file(dir.path().join("missing"), &test_key());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_unlabelled_envelope_not_openable_as_content() {
        let key = test_key();
        let envelope = encrypt(b"plain", &key).unwrap();
        assert!(open_bytes(&envelope, &key).is_err());
        assert_eq!(decrypt(&envelope, &key).unwrap(), b"plain");
    }
}
