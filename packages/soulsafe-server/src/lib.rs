//! SoulSafe Crypto Server
//!
//! A thin JSON/HTTP surface over `soulsafe-core`:
//!
//! 1. **Keys**: random keys and tokens, and per-capsule keys derived from
//!    the server's master secret.
//!
//! 2. **Sealing**: encrypt and decrypt capsule text and file bytes. All
//!    binary values travel as standard padded base64.
//!
//! 3. **Integrity**: SHA-256 digests and verification.
//!
//! The master secret only ever comes from configuration. Requests never
//! carry it and responses never echo it.

pub mod api;
pub mod error;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, StartupError};
pub use state::{AppState, ServerConfig};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "soulsafe_server=info,soulsafe_core=info,tower_http=info";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(api::health))
        .route("/api/crypto/generate/key", post(api::generate_key))
        .route("/api/crypto/generate/token", post(api::generate_token))
        .route("/api/crypto/encrypt", post(api::encrypt))
        .route("/api/crypto/decrypt", post(api::decrypt))
        .route("/api/crypto/encrypt/text", post(api::encrypt_text))
        .route("/api/crypto/decrypt/text", post(api::decrypt_text))
        .route("/api/crypto/encrypt/file", post(api::encrypt_file))
        .route("/api/crypto/decrypt/file", post(api::decrypt_file))
        .route("/api/crypto/derive/capsule-key", post(api::derive_capsule_key))
        .route("/api/crypto/hash", post(api::hash))
        .route("/api/crypto/verify", post(api::verify))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
