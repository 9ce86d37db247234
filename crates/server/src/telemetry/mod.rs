//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, envelope bodies, secrets or key material** may appear in
//!   any span attribute or log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   overrides it.

pub mod init;

pub use init::init_telemetry;
