//! PBKDF2-HMAC-SHA256 key derivation.
//!
//! Both runtimes must derive the same 32 bytes from the same `(secret, salt)`
//! pair, so the salt normalisation rule below is part of the wire contract:
//! a salt made only of hex digits is hex-decoded and the bytes reinterpreted
//! as UTF-8 text; anything else is used as-is.

use hmac::Hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CodecError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count shared with the browser implementation.
pub const PBKDF2_ROUNDS: u32 = 1000;

/// Shared secret key material supplied once at startup.
///
/// Never logged: `Debug` is redacted and the bytes are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// A derived 256-bit AES key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Returns `true` if `s` is non-empty and every character is a hex digit.
pub(crate) fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Apply the cross-runtime salt normalisation rule.
///
/// `"61626364"` becomes `"abcd"`. Non-hex salts, odd-length hex, and hex that
/// does not decode to valid UTF-8 are all returned unchanged.
pub fn normalize_salt(salt: &str) -> String {
    if !is_hex(salt) {
        return salt.to_owned();
    }
    hex::decode(salt)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| salt.to_owned())
}

/// Derive the AES key from `secret` and `salt`.
///
/// # Errors
///
/// Returns [`CodecError::Configuration`] if `secret` is empty.
pub fn derive(secret: &Secret, salt: &str) -> Result<DerivedKey, CodecError> {
    if secret.is_empty() {
        return Err(CodecError::configuration(
            "encryption secret is empty; refusing to derive a key",
        ));
    }
    let effective_salt = normalize_salt(salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        secret.expose(),
        effective_salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut key,
    )
    .map_err(|_| CodecError::configuration("PBKDF2 rejected the requested key length"))?;

    Ok(DerivedKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_salt_is_decoded_to_text() {
        assert_eq!(normalize_salt("61626364"), "abcd");
        assert_eq!(normalize_salt("6A6B"), "jk");
    }

    #[test]
    fn non_hex_salt_is_unchanged() {
        assert_eq!(normalize_salt("default-salt"), "default-salt");
        assert_eq!(normalize_salt(""), "");
    }

    #[test]
    fn odd_length_hex_salt_is_unchanged() {
        assert_eq!(normalize_salt("abc"), "abc");
    }

    #[test]
    fn hex_salt_with_invalid_utf8_is_unchanged() {
        assert_eq!(normalize_salt("ff00"), "ff00");
    }

    #[test]
    fn matches_node_pbkdf2_vector() {
        // crypto.pbkdf2Sync("s1", "abcd", 1000, 32, "sha256")
        let key = derive(&Secret::from("s1"), "61626364").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "586f6ee5881d453be81960c619c566bbbdffbbb89feacd7a0df7dd3efe4b45c3"
        );
    }

    #[test]
    fn plain_salt_vector() {
        // crypto.pbkdf2Sync("s1", "default-salt", 1000, 32, "sha256")
        let key = derive(&Secret::from("s1"), "default-salt").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "fadaa8c6979321b4ebb52e88c4d8b39a1aed8364a37ce4e7ff6f643e40f3416a"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive(&Secret::from("pw"), "salt").unwrap();
        let b = derive(&Secret::from("pw"), "salt").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_secrets_give_different_keys() {
        let a = derive(&Secret::from("pw1"), "salt").unwrap();
        let b = derive(&Secret::from("pw2"), "salt").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let err = derive(&Secret::from(""), "salt").unwrap_err();
        assert!(matches!(err, CodecError::Configuration(_)));
    }

    #[test]
    fn key_material_redacted_in_debug() {
        let key = derive(&Secret::from("pw"), "salt").unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
        assert!(format!("{:?}", Secret::from("pw")).contains("REDACTED"));
    }
}
