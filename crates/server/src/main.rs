//! `envelope-server` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP spans).
//! 3. Build the [`EnvelopeCodec`], derive the key and run the self-check.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use envelope_codec::EnvelopeCodec;
use tracing::{info, warn};

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "envelope-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Codec
    // -----------------------------------------------------------------------
    let codec = EnvelopeCodec::new(cfg.codec_settings()).context("invalid codec configuration")?;
    codec
        .self_check()
        .await
        .context("codec self-check failed")?;
    if codec.uses_fixed_iv() {
        warn!("serving with a fixed IV: identical plaintexts produce identical envelopes");
    }
    info!(algorithm = codec.algorithm().as_str(), "codec ready");

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(codec), cfg.max_body_bytes);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
