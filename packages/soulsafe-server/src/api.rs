//! Crypto API handlers.
//!
//! Thin wrappers: decode base64 and JSON, call the core, encode the result.
//! No cryptography happens here.
//!
//! - `GET  /health`                       : Liveness and version
//! - `POST /api/crypto/generate/key`      : Fresh random key
//! - `POST /api/crypto/generate/token`    : Random token (`length`, default 32)
//! - `POST /api/crypto/encrypt`           : Encrypt text or base64 bytes, no content label
//! - `POST /api/crypto/decrypt`           : Decrypt an unlabelled envelope
//! - `POST /api/crypto/encrypt/text`      : Seal text under a key
//! - `POST /api/crypto/decrypt/text`      : Open sealed text
//! - `POST /api/crypto/encrypt/file`      : Seal base64 file bytes
//! - `POST /api/crypto/decrypt/file`      : Open sealed file bytes
//! - `POST /api/crypto/derive/capsule-key`: Per-capsule key from the master secret
//! - `POST /api/crypto/hash`              : SHA-256 (hex) of base64 data
//! - `POST /api/crypto/verify`            : Check data against a digest
//!
//! The `/text` and `/file` routes bind envelopes to their content kind; the
//! bare `/encrypt` and `/decrypt` routes use no associated data, so their
//! envelopes interoperate with any plain AES-256-GCM peer.
//!
//! Every decrypt route takes the tag either as its own `tag` field or
//! appended to `encrypted` (`ciphertext || tag`) when `tag` is omitted.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use soulsafe_core::crypto::DEFAULT_TOKEN_LENGTH;
use soulsafe_core::{encoding, EncryptedEnvelope, Error, SymmetricKey};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// ── Request Types ────────────────────────────────────────────────────────────
//
// Every field is optional so that an absent field becomes a 400 with the
// field name rather than a generic deserialization rejection.

#[derive(Deserialize, Default)]
pub struct TokenRequest {
    pub length: Option<usize>,
}

#[derive(Deserialize)]
pub struct EncryptTextRequest {
    pub text: Option<String>,
    pub key: Option<String>,
}

#[derive(Deserialize)]
pub struct EncryptRequest {
    /// UTF-8 plaintext
    pub text: Option<String>,
    /// Base64 plaintext bytes, used when `text` is absent
    pub data: Option<String>,
    pub key: Option<String>,
}

#[derive(Deserialize)]
pub struct EncryptFileRequest {
    pub data: Option<String>,
    pub key: Option<String>,
}

#[derive(Deserialize)]
pub struct DecryptRequest {
    pub encrypted: Option<String>,
    pub iv: Option<String>,
    pub tag: Option<String>,
    pub key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveRequest {
    pub user_id: Option<String>,
    pub capsule_id: Option<String>,
}

#[derive(Deserialize)]
pub struct HashRequest {
    pub data: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub data: Option<String>,
    pub hash: Option<String>,
}

// ── Response Types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct KeyResponse {
    pub key: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct DecryptResponse {
    /// Base64 plaintext
    pub data: String,
    /// Plaintext as text, when it is valid UTF-8
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted: Option<String>,
}

#[derive(Serialize)]
pub struct DecryptTextResponse {
    pub decrypted: String,
}

#[derive(Serialize)]
pub struct DecryptFileResponse {
    pub data: String,
}

#[derive(Serialize)]
pub struct HashResponse {
    pub hash: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::missing_field(name))
}

fn parse_key(value: Option<String>) -> Result<SymmetricKey, ApiError> {
    let text = required(value, "key")?;
    Ok(SymmetricKey::from_base64(&text)?)
}

fn parse_envelope(req: DecryptRequest) -> Result<(EncryptedEnvelope, SymmetricKey), ApiError> {
    let encrypted = required(req.encrypted, "encrypted")?;
    let iv = required(req.iv, "iv")?;
    let key = parse_key(req.key)?;
    let envelope = match req.tag {
        Some(tag) => EncryptedEnvelope::from_base64_parts(&encrypted, &iv, &tag)?,
        None => EncryptedEnvelope::from_base64_combined(&encrypted, &iv)?,
    };
    Ok((envelope, key))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "soulsafe-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/crypto/generate/key
pub async fn generate_key(State(state): State<AppState>) -> ApiResult<KeyResponse> {
    let key = state.crypto.generate_key()?;
    Ok(Json(KeyResponse {
        key: key.to_base64(),
    }))
}

/// POST /api/crypto/generate/token
///
/// The body is optional; an empty body means the default length.
pub async fn generate_token(State(state): State<AppState>, body: Bytes) -> ApiResult<TokenResponse> {
    let req: TokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TokenRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?
    };

    let length = req.length.unwrap_or(DEFAULT_TOKEN_LENGTH);
    let token = state.crypto.generate_secure_token(length)?;
    Ok(Json(TokenResponse {
        token: encoding::encode_base64(&token),
    }))
}

/// POST /api/crypto/encrypt
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> ApiResult<EncryptedEnvelope> {
    let Json(req) = body?;
    let plaintext = match (req.text, req.data) {
        (Some(text), _) => text.into_bytes(),
        (None, Some(data)) => encoding::decode_base64(&data)?,
        (None, None) => return Err(ApiError::missing_field("text or data")),
    };
    let key = parse_key(req.key)?;

    let envelope = state.crypto.encrypt(&plaintext, &key)?;
    Ok(Json(envelope))
}

/// POST /api/crypto/decrypt
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> ApiResult<DecryptResponse> {
    let Json(req) = body?;
    let (envelope, key) = parse_envelope(req)?;

    let plaintext = state.crypto.decrypt(&envelope, &key)?;
    Ok(Json(DecryptResponse {
        data: encoding::encode_base64(&plaintext),
        decrypted: String::from_utf8(plaintext).ok(),
    }))
}

/// POST /api/crypto/encrypt/text
pub async fn encrypt_text(
    State(state): State<AppState>,
    body: Result<Json<EncryptTextRequest>, JsonRejection>,
) -> ApiResult<EncryptedEnvelope> {
    let Json(req) = body?;
    let text = required(req.text, "text")?;
    let key = parse_key(req.key)?;

    let envelope = state.crypto.seal_text(&text, &key)?;
    Ok(Json(envelope))
}

/// POST /api/crypto/decrypt/text
pub async fn decrypt_text(
    State(state): State<AppState>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> ApiResult<DecryptTextResponse> {
    let Json(req) = body?;
    let (envelope, key) = parse_envelope(req)?;

    let decrypted = state.crypto.open_text(&envelope, &key)?;
    Ok(Json(DecryptTextResponse { decrypted }))
}

/// POST /api/crypto/encrypt/file
pub async fn encrypt_file(
    State(state): State<AppState>,
    body: Result<Json<EncryptFileRequest>, JsonRejection>,
) -> ApiResult<EncryptedEnvelope> {
    let Json(req) = body?;
    let data = required(req.data, "data")?;
    let key = parse_key(req.key)?;
    let bytes = encoding::decode_base64(&data)?;

    let envelope = state.crypto.seal_bytes(&bytes, &key)?;
    tracing::debug!(len = bytes.len(), "Sealed file payload");
    Ok(Json(envelope))
}

/// POST /api/crypto/decrypt/file
pub async fn decrypt_file(
    State(state): State<AppState>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> ApiResult<DecryptFileResponse> {
    let Json(req) = body?;
    let (envelope, key) = parse_envelope(req)?;

    let data = state.crypto.open_bytes(&envelope, &key)?;
    Ok(Json(DecryptFileResponse {
        data: encoding::encode_base64(&data),
    }))
}

/// POST /api/crypto/derive/capsule-key
///
/// PBKDF2 runs on the blocking pool so it doesn't stall the executor.
pub async fn derive_capsule_key(
    State(state): State<AppState>,
    body: Result<Json<DeriveRequest>, JsonRejection>,
) -> ApiResult<KeyResponse> {
    let Json(req) = body?;
    let user_id = required(req.user_id, "userId")?;
    let capsule_id = required(req.capsule_id, "capsuleId")?;

    let crypto = state.crypto.clone();
    let key = tokio::task::spawn_blocking(move || crypto.derive_capsule_key(&user_id, &capsule_id))
        .await
        .map_err(|e| Error::KeyDerivationFailed(format!("derivation task failed: {}", e)))??;

    Ok(Json(KeyResponse {
        key: key.to_base64(),
    }))
}

/// POST /api/crypto/hash
pub async fn hash(
    State(state): State<AppState>,
    body: Result<Json<HashRequest>, JsonRejection>,
) -> ApiResult<HashResponse> {
    let Json(req) = body?;
    let data = encoding::decode_base64(&required(req.data, "data")?)?;

    Ok(Json(HashResponse {
        hash: state.crypto.hash(&data).to_hex(),
    }))
}

/// POST /api/crypto/verify
///
/// Only undecodable `data` is an error. A malformed `hash` is simply not
/// a match.
pub async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<VerifyResponse> {
    let Json(req) = body?;
    let data = encoding::decode_base64(&required(req.data, "data")?)?;
    let expected = required(req.hash, "hash")?;

    Ok(Json(VerifyResponse {
        valid: state.crypto.verify_encoded(&data, &expected),
    }))
}
