//! Request and response types exchanged with the browser runtime.
//!
//! Field names follow the browser client's camelCase JSON (`statusCode`,
//! `encryptedData`, `type`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/encryption/encrypt`.
///
/// `data` may be any JSON value. Strings that parse as JSON are encrypted as
/// objects; other strings are encrypted as raw text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptRequest {
    #[serde(default)]
    pub data: Option<Value>,
}

impl EncryptRequest {
    /// The input to encrypt, or `None` if it is missing, `null`, or an empty string.
    pub fn input(self) -> Option<Value> {
        self.data.filter(is_present)
    }
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/encryption/decrypt`.
///
/// Older clients send the envelope as `encryptedData`; both names are accepted
/// and `data` wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecryptRequest {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, rename = "encryptedData")]
    pub encrypted_data: Option<Value>,
}

impl DecryptRequest {
    pub fn input(self) -> Option<Value> {
        self.data
            .filter(is_present)
            .or_else(|| self.encrypted_data.filter(is_present))
    }
}

// ---------------------------------------------------------------------------
// Success response
// ---------------------------------------------------------------------------

/// Whether the payload was treated as structured JSON or raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Object,
    Text,
}

/// Successful response body for both encrypt and decrypt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    /// Envelope string (encrypt) or decrypted value (decrypt).
    pub data: Value,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl CodecResponse {
    pub fn ok(data: Value, data_type: DataType) -> Self {
        Self {
            status_code: 200,
            message: "OK".into(),
            data,
            data_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"format_error"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Whether the encryption key has been derived.
    pub key_ready: bool,
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` count as missing.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
