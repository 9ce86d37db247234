//! Error taxonomy for the envelope codec.

use thiserror::Error;

/// Stable, machine-readable tag for each [`CodecError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Format,
    Authentication,
}

impl ErrorKind {
    /// Tag string reported to callers (e.g. in HTTP error bodies).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Format => "format_error",
            ErrorKind::Authentication => "authentication_error",
        }
    }
}

/// Errors produced by the codec.
///
/// `Clone` because the result of key derivation (success or failure) is cached
/// for the lifetime of the codec and handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Secret or IV material is missing or malformed. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input is not a well-formed envelope, or decrypted text is not the
    /// requested shape (UTF-8 text, JSON value).
    #[error("format error: {0}")]
    Format(String),

    /// Tag verification failed: tampered ciphertext, wrong key, or wrong IV.
    #[error("authentication failed: envelope was tampered with or sealed under a different key/IV")]
    Authentication,
}

impl CodecError {
    /// Returns the stable kind tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Configuration(_) => ErrorKind::Configuration,
            CodecError::Format(_) => ErrorKind::Format,
            CodecError::Authentication => ErrorKind::Authentication,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        CodecError::Format(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        CodecError::Configuration(msg.into())
    }
}
