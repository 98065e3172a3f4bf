//! Server state and configuration.
//!
//! The state is the crypto service plus read-only settings. Nothing in it
//! is mutable, so handlers share it through cheap clones.

use std::sync::Arc;

use soulsafe_core::CapsuleCrypto;

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
const DEFAULT_BIND: &str = "0.0.0.0";

/// Default request body limit (16 MiB). File payloads arrive base64-encoded,
/// so this admits files of roughly 12 MiB.
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: String,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub crypto: CapsuleCrypto,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(crypto: CapsuleCrypto, config: ServerConfig) -> Self {
        Self {
            crypto,
            config: Arc::new(config),
        }
    }
}
