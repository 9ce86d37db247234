//! Textual envelope framing: `<ivHex>:<ciphertextHex><tagHex>`.
//!
//! # Wire format
//!
//! ```text
//! 000102030405060708090a0b:ce02f5f233dcd96571b09b7d865582be4ff5119579af74834122a7
//! |------ IV (12 B) -----| |---- ct (11 B) -----||--------- tag (16 B) ---------|
//! ```
//!
//! Hex is accepted in either case and always emitted lowercase. The tag is
//! always the trailing 16 bytes of the body.

use std::fmt;

use crate::cipher::{AuthTag, Iv, IV_LEN, TAG_LEN};
use crate::error::CodecError;
use crate::kdf::is_hex;

/// Separator between the IV and body fields.
pub const SEPARATOR: char = ':';

const MIN_IV_HEX: usize = IV_LEN * 2;
const TAG_HEX: usize = TAG_LEN * 2;

/// A parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: Iv,
    pub ciphertext: Vec<u8>,
    pub tag: AuthTag,
}

impl Envelope {
    pub fn frame(iv: Iv, ciphertext: Vec<u8>, tag: AuthTag) -> Self {
        Self { iv, ciphertext, tag }
    }

    /// Parse an envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`] on any structural violation, on a hex
    /// decode fault, or if the IV does not decode to exactly 12 bytes.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let (iv_hex, body_hex) = split_fields(s)?;

        if iv_hex.len() != MIN_IV_HEX {
            return Err(CodecError::format(format!(
                "IV must be {MIN_IV_HEX} hex characters, got {}",
                iv_hex.len()
            )));
        }
        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(iv_hex, &mut iv)
            .map_err(|e| CodecError::format(format!("invalid IV hex: {e}")))?;

        let (ct_hex, tag_hex) = body_hex.split_at(body_hex.len() - TAG_HEX);
        let ciphertext =
            hex::decode(ct_hex).map_err(|e| CodecError::format(format!("invalid ciphertext hex: {e}")))?;
        let mut tag = [0u8; TAG_LEN];
        hex::decode_to_slice(tag_hex, &mut tag)
            .map_err(|e| CodecError::format(format!("invalid tag hex: {e}")))?;

        Ok(Self { iv, ciphertext, tag })
    }

    /// Encode to the canonical lowercase wire string.
    pub fn to_string_repr(&self) -> String {
        let mut body = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        body.extend_from_slice(&self.ciphertext);
        body.extend_from_slice(&self.tag);
        format!("{}{SEPARATOR}{}", hex::encode(self.iv), hex::encode(body))
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_repr())
    }
}

impl std::str::FromStr for Envelope {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Cheap structural pre-check: does `candidate` have the shape of an envelope?
///
/// Applies the same field rules as [`Envelope::parse`] (one separator, two
/// non-empty hex fields, IV ≥ 24 and body ≥ 32 hex characters) without
/// decoding anything. Never fails.
///
/// This accepts a superset of what `parse` does: IVs longer than 24 hex
/// characters and odd-length hex pass here but are rejected by `parse`.
pub fn looks_like_envelope(candidate: &str) -> bool {
    split_fields(candidate).is_ok()
}

/// [`looks_like_envelope`] for arbitrary JSON input; non-strings are never envelopes.
pub fn value_looks_like_envelope(candidate: &serde_json::Value) -> bool {
    candidate.as_str().is_some_and(looks_like_envelope)
}

/// Trim, split on the first separator and validate both fields.
fn split_fields(s: &str) -> Result<(&str, &str), CodecError> {
    let (iv_hex, body_hex) = s
        .trim()
        .split_once(SEPARATOR)
        .ok_or_else(|| CodecError::format("missing ':' separator"))?;
    let (iv_hex, body_hex) = (iv_hex.trim(), body_hex.trim());

    if iv_hex.is_empty() || body_hex.is_empty() {
        return Err(CodecError::format("IV and body must both be present"));
    }
    if !is_hex(iv_hex) || !is_hex(body_hex) {
        return Err(CodecError::format("IV and body must be hexadecimal"));
    }
    if iv_hex.len() < MIN_IV_HEX {
        return Err(CodecError::format(format!(
            "IV too short: expected at least {MIN_IV_HEX} hex characters"
        )));
    }
    if body_hex.len() < TAG_HEX {
        return Err(CodecError::format(format!(
            "body too short: expected at least {TAG_HEX} hex characters"
        )));
    }
    Ok((iv_hex, body_hex))
}
