//! SoulSafe Crypto Server
//!
//! Loads the master secret, builds the router and serves it until Ctrl-C.
//! Refuses to start without a usable master secret.

use std::process::ExitCode;

use clap::Parser;
use soulsafe_core::{CapsuleCrypto, CryptoConfig};
use soulsafe_server::{router, AppState, ServerConfig, StartupError, DEFAULT_LOG_FILTER};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "soulsafe-server", version, about = "SoulSafe capsule encryption server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "BIND_ADDRESS")]
    bind: String,

    /// Master secret for capsule key derivation (at least 32 bytes)
    #[arg(long, env = "ENCRYPTION_MASTER_KEY", hide_env_values = true)]
    master_key: Option<String>,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 16 * 1024 * 1024, env = "MAX_BODY_BYTES")]
    max_body_bytes: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.json_logs);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "SoulSafe server stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    let crypto_config = match args.master_key {
        Some(secret) => CryptoConfig::new(secret)?,
        None => CryptoConfig::from_env()?,
    };
    let crypto = CapsuleCrypto::new(crypto_config);

    let config = ServerConfig {
        port: args.port,
        bind: args.bind,
        max_body_bytes: args.max_body_bytes,
    };
    let addr = config.listen_addr();
    let app = router(AppState::new(crypto, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("SoulSafe server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("SoulSafe server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
