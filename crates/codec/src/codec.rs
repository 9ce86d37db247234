//! [`EnvelopeCodec`]: the encrypt/decrypt façade used by the transport layer.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::cipher::{self, Algorithm, IvPolicy};
use crate::content::{Content, ContentKind};
use crate::envelope::{looks_like_envelope, Envelope};
use crate::error::CodecError;
use crate::kdf::{self, DerivedKey, Secret};

const SELF_CHECK_PROBE: &str = "envelope-codec self-check ✓";

/// Inputs needed to build an [`EnvelopeCodec`].
#[derive(Debug, Clone)]
pub struct CodecSettings {
    /// Shared secret fed to PBKDF2. Must not be empty.
    pub secret: Secret,
    /// KDF salt; hex salts are decoded to UTF-8 text first.
    pub salt: String,
    /// Optional fixed IV (24 hex chars). `None` means a random IV per call.
    pub fixed_iv: Option<String>,
    /// Configured algorithm identifier, normalised by [`Algorithm::from_config`].
    pub algorithm: Option<String>,
}

/// Result of encrypting caller input whose type was inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub envelope: String,
    pub kind: ContentKind,
}

/// Encrypt/decrypt façade with a lazily derived, process-wide key.
///
/// Cheap to clone; all clones share one key cell, so the key is derived at
/// most once no matter how many tasks race on first use.
#[derive(Clone)]
pub struct EnvelopeCodec {
    inner: Arc<Inner>,
}

struct Inner {
    secret: Secret,
    salt: String,
    iv_policy: IvPolicy,
    algorithm: Algorithm,
    key: OnceCell<Result<Arc<DerivedKey>, CodecError>>,
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("algorithm", &self.inner.algorithm)
            .field("fixed_iv", &self.inner.iv_policy.is_fixed())
            .field("key_ready", &self.is_key_ready())
            .finish_non_exhaustive()
    }
}

impl EnvelopeCodec {
    /// Validate `settings` and build a codec. The key is not derived yet.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Configuration`] if the secret is empty or the
    /// fixed IV is malformed.
    pub fn new(settings: CodecSettings) -> Result<Self, CodecError> {
        if settings.secret.is_empty() {
            return Err(CodecError::configuration("encryption secret must not be empty"));
        }
        let iv_policy = IvPolicy::from_hex(settings.fixed_iv.as_deref())?;
        if iv_policy.is_fixed() {
            warn!(
                "fixed IV configured: every envelope reuses one AES-GCM nonce under the same key; \
                 use only for legacy wire compatibility"
            );
        }
        let algorithm = Algorithm::from_config(settings.algorithm.as_deref());

        Ok(Self {
            inner: Arc::new(Inner {
                secret: settings.secret,
                salt: settings.salt,
                iv_policy,
                algorithm,
                key: OnceCell::new(),
            }),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.inner.algorithm
    }

    pub fn uses_fixed_iv(&self) -> bool {
        self.inner.iv_policy.is_fixed()
    }

    /// Returns `true` once the key has been derived successfully.
    pub fn is_key_ready(&self) -> bool {
        matches!(self.inner.key.get(), Some(Ok(_)))
    }

    /// Get the derived key, deriving it on first use.
    ///
    /// PBKDF2 runs on the blocking pool. Concurrent first callers await the
    /// same derivation; the outcome (key or error) is cached.
    pub async fn key(&self) -> Result<Arc<DerivedKey>, CodecError> {
        self.inner
            .key
            .get_or_init(|| async {
                let secret = self.inner.secret.clone();
                let salt = self.inner.salt.clone();
                debug!("deriving encryption key");
                let res = match tokio::task::spawn_blocking(move || kdf::derive(&secret, &salt)).await {
                    Ok(res) => res.map(Arc::new),
                    Err(e) => Err(CodecError::configuration(format!("key derivation task failed: {e}"))),
                };
                match &res {
                    Ok(_) => info!(algorithm = self.inner.algorithm.as_str(), "encryption key derived"),
                    Err(e) => warn!(error = %e, "encryption key derivation failed"),
                }
                res
            })
            .await
            .clone()
    }

    /// Encrypt UTF-8 text into an envelope string.
    pub async fn encrypt_text(&self, plain: &str) -> Result<String, CodecError> {
        let key = self.key().await?;
        let iv = self.inner.iv_policy.next_iv();
        let (ciphertext, tag) = cipher::seal(&key, &iv, plain.as_bytes())?;
        Ok(Envelope::frame(iv, ciphertext, tag).to_string_repr())
    }

    /// Decrypt an envelope string back to UTF-8 text.
    ///
    /// # Errors
    ///
    /// [`CodecError::Format`] if the input is not an envelope or the plaintext
    /// is not UTF-8; [`CodecError::Authentication`] if the tag does not verify.
    pub async fn decrypt_text(&self, envelope: &str) -> Result<String, CodecError> {
        if !looks_like_envelope(envelope) {
            return Err(CodecError::format("not an envelope"));
        }
        let env = Envelope::parse(envelope)?;
        let key = self.key().await?;
        let plain = cipher::open(&key, &env.iv, &env.ciphertext, &env.tag)?;
        String::from_utf8(plain).map_err(|_| CodecError::format("decrypted bytes are not valid UTF-8"))
    }

    /// Serialise `value` as JSON and encrypt it.
    pub async fn encrypt_object<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CodecError::format(format!("value cannot be serialised as JSON: {e}")))?;
        self.encrypt_text(&json).await
    }

    /// Decrypt an envelope and parse the plaintext as JSON.
    pub async fn decrypt_object<T: DeserializeOwned>(&self, envelope: &str) -> Result<T, CodecError> {
        let text = self.decrypt_text(envelope).await?;
        serde_json::from_str(&text)
            .map_err(|e| CodecError::format(format!("decrypted text is not valid JSON: {e}")))
    }

    pub async fn encrypt_content(&self, content: &Content) -> Result<String, CodecError> {
        self.encrypt_text(&content.to_plaintext()?).await
    }

    /// Decrypt and classify: JSON plaintext is structured, anything else is text.
    ///
    /// Authentication is checked before classification, so a tampered
    /// envelope always surfaces as [`CodecError::Authentication`].
    pub async fn decrypt_content(&self, envelope: &str) -> Result<Content, CodecError> {
        let text = self.decrypt_text(envelope).await?;
        Ok(Content::from_text(text))
    }

    /// Encrypt arbitrary caller input, inferring whether it is structured.
    pub async fn encrypt_data(&self, input: Value) -> Result<Sealed, CodecError> {
        let content = Content::classify(input);
        let envelope = self.encrypt_content(&content).await?;
        Ok(Sealed {
            envelope,
            kind: content.kind(),
        })
    }

    /// Derive the key and run one encrypt/decrypt round trip.
    ///
    /// Called at startup so a bad configuration fails before serving traffic.
    pub async fn self_check(&self) -> Result<(), CodecError> {
        let envelope = self.encrypt_text(SELF_CHECK_PROBE).await?;
        if !looks_like_envelope(&envelope) {
            return Err(CodecError::configuration("self-check produced a malformed envelope"));
        }
        if self.decrypt_text(&envelope).await? != SELF_CHECK_PROBE {
            return Err(CodecError::configuration("self-check round trip mismatch"));
        }
        debug!("codec self-check passed");
        Ok(())
    }
}
