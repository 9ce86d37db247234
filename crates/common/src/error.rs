//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`], [`ServiceError::Format`],
///   [`ServiceError::Authentication`] → 400
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing `data` field or invalid JSON body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The input is not a well-formed envelope, or the plaintext has the wrong shape.
    #[error("{0}")]
    Format(String),

    /// Envelope authentication failed (tampered data, wrong key or IV).
    #[error("{0}")]
    Authentication(String),

    /// The codec is misconfigured or its key could not be derived.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Format(_) => 400,
            ServiceError::Authentication(_) => 400,
            ServiceError::Unavailable(_) => 503,
        }
    }

    /// Short machine-readable code placed in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Format(_) => "format_error",
            ServiceError::Authentication(_) => "authentication_error",
            ServiceError::Unavailable(_) => "service_unavailable",
        }
    }
}
