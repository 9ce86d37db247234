//! Configuration loading and validation for the envelope server.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use envelope_codec::{CodecSettings, Secret};
use serde::Deserialize;
use tracing::warn;

/// Secret used only when `DEV_MODE=true` and `ENCRYPTION_KEY` is unset.
/// Matches the browser client's development default.
pub const DEV_SECRET: &str = "default-encryption-key-change-in-production";

/// Placeholder salt used when `ENCRYPTION_SALT` is unset.
pub const DEFAULT_SALT: &str = "default-salt";

/// Validated server configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Shared secret for key derivation. **Required** unless `dev_mode` is set.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// KDF salt. Hex salts are decoded to UTF-8 text before use.
    #[serde(default = "default_salt")]
    pub encryption_salt: String,

    /// Fixed 24-hex-character IV. Absent means a random IV per envelope.
    #[serde(default)]
    pub encryption_iv: Option<String>,

    /// Algorithm identifier; only AES-256-GCM is supported.
    #[serde(default = "default_algorithm")]
    pub encryption_algorithm: String,

    /// Allow the insecure development secret when `ENCRYPTION_KEY` is unset.
    #[serde(default)]
    pub dev_mode: bool,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional OTLP endpoint; spans are exported only when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_salt() -> String {
    DEFAULT_SALT.into()
}
fn default_algorithm() -> String {
    "aes-256-gcm".into()
}
fn default_port() -> u16 {
    5000
}
fn default_max_body_bytes() -> usize {
    500 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("encryption_salt", &self.encryption_salt)
            .field("encryption_iv", &self.encryption_iv.is_some())
            .field("encryption_algorithm", &self.encryption_algorithm)
            .field("dev_mode", &self.dev_mode)
            .field("port", &self.port)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_level", &self.log_level)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if !self.has_secret() && !self.dev_mode {
            anyhow::bail!(
                "ENCRYPTION_KEY is required and must not be empty (set DEV_MODE=true to use an insecure development key)"
            );
        }
        if self.port == 0 {
            anyhow::bail!("PORT must be > 0");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        Ok(())
    }

    fn has_secret(&self) -> bool {
        self.encryption_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Build codec settings, warning about every insecure default in effect.
    pub fn codec_settings(&self) -> CodecSettings {
        let secret = match self.encryption_key.as_deref() {
            Some(k) if !k.trim().is_empty() => Secret::from(k),
            _ => {
                warn!("ENCRYPTION_KEY not set; DEV_MODE is using the built-in development key, which is NOT secure");
                Secret::from(DEV_SECRET)
            }
        };
        if self.encryption_salt == DEFAULT_SALT {
            warn!("ENCRYPTION_SALT not set; using the placeholder salt, which is NOT secure");
        }
        CodecSettings {
            secret,
            salt: self.encryption_salt.clone(),
            fixed_iv: self.encryption_iv.clone(),
            algorithm: Some(self.encryption_algorithm.clone()),
        }
    }
}
