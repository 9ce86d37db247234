//! Shared application state injected into every Axum handler.

use envelope_codec::EnvelopeCodec;

/// Application state shared across all request handlers.
///
/// [`EnvelopeCodec`] is `Arc`-backed, so Axum can clone the state for each
/// request without re-deriving or copying the key.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Encrypt/decrypt façade holding the process-wide derived key.
    pub codec: EnvelopeCodec,
}

impl AppState {
    /// Create a new [`AppState`] around a configured codec.
    pub fn new(codec: EnvelopeCodec) -> Self {
        Self { codec }
    }
}
