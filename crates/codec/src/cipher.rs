//! AES-256-GCM seal/open with a detached 128-bit tag and no associated data.
//!
//! **IV policy:** by default every call draws a fresh 96-bit IV from the OS
//! CSPRNG. A fixed, operator-supplied IV is supported only so that envelopes
//! stay byte-compatible with deployments that pin one. GCM is not
//! nonce-misuse-resistant: sealing two different plaintexts under the same key
//! and fixed IV leaks their XOR and allows tag forgery.

use aes_gcm::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce, Tag,
};
use tracing::warn;

use crate::error::CodecError;
use crate::kdf::{is_hex, DerivedKey};

/// Byte length of an AES-GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

pub type Iv = [u8; IV_LEN];
pub type AuthTag = [u8; TAG_LEN];

/// The AEAD mode in use. Only one is supported; the type exists so the
/// configured identifier can be normalised and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Aes256Gcm,
}

impl Algorithm {
    /// Normalise a configured algorithm identifier.
    ///
    /// `aes-256-gcm` and `aes-gcm` (any case) select AES-256-GCM. Any other
    /// value is reported as a configuration warning and the default is used.
    pub fn from_config(id: Option<&str>) -> Self {
        match id.map(|s| s.trim().to_ascii_lowercase()) {
            None => Algorithm::default(),
            Some(s) if s.is_empty() || s == "aes-256-gcm" || s == "aes-gcm" => Algorithm::Aes256Gcm,
            Some(other) => {
                warn!(
                    algorithm = %other,
                    using = Algorithm::default().as_str(),
                    "unsupported encryption algorithm configured; falling back to default"
                );
                Algorithm::default()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Aes256Gcm => "aes-256-gcm",
        }
    }
}

/// How the IV for each seal operation is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IvPolicy {
    /// Fresh CSPRNG IV per call.
    Random,
    /// Same IV for every call. Deterministic and unsafe under GCM for more
    /// than one distinct plaintext; kept for wire compatibility only.
    Fixed(Iv),
}

impl IvPolicy {
    /// Build the policy from an optional hex IV.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Configuration`] if the value is present but is not
    /// exactly 24 hex characters.
    pub fn from_hex(iv_hex: Option<&str>) -> Result<Self, CodecError> {
        let Some(raw) = iv_hex.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(IvPolicy::Random);
        };
        if raw.len() != IV_LEN * 2 || !is_hex(raw) {
            return Err(CodecError::configuration(format!(
                "fixed IV must be exactly {} hex characters, got {}",
                IV_LEN * 2,
                raw.len()
            )));
        }
        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(raw, &mut iv)
            .map_err(|e| CodecError::configuration(format!("fixed IV is not valid hex: {e}")))?;
        Ok(IvPolicy::Fixed(iv))
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, IvPolicy::Fixed(_))
    }

    /// Return the IV to use for the next seal operation.
    pub fn next_iv(&self) -> Iv {
        match self {
            IvPolicy::Fixed(iv) => *iv,
            IvPolicy::Random => {
                let mut iv = [0u8; IV_LEN];
                OsRng.fill_bytes(&mut iv);
                iv
            }
        }
    }
}

/// Encrypt `plaintext`, returning the ciphertext and its detached tag.
///
/// The ciphertext has the same length as the plaintext.
///
/// # Errors
///
/// Returns [`CodecError::Format`] if the AEAD backend refuses the input
/// (only possible for plaintexts beyond the GCM length limit).
pub fn seal(key: &DerivedKey, iv: &Iv, plaintext: &[u8]) -> Result<(Vec<u8>, AuthTag), CodecError> {
    let cipher = build_cipher(key);
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(iv), b"", &mut buffer)
        .map_err(|_| CodecError::format("plaintext too large for AES-GCM"))?;

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(tag.as_slice());
    Ok((buffer, out))
}

/// Verify `tag` and decrypt `ciphertext`.
///
/// # Errors
///
/// Returns [`CodecError::Authentication`] if tag verification fails.
pub fn open(
    key: &DerivedKey,
    iv: &Iv,
    ciphertext: &[u8],
    tag: &AuthTag,
) -> Result<Vec<u8>, CodecError> {
    let cipher = build_cipher(key);
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(Nonce::from_slice(iv), b"", &mut buffer, Tag::from_slice(tag))
        .map_err(|_| CodecError::Authentication)?;
    Ok(buffer)
}

fn build_cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}
