//! AES-256-GCM envelope codec shared by the server and browser runtimes.
//!
//! This crate is intentionally free of HTTP dependencies. Both runtimes must
//! produce and accept byte-identical envelopes, so the three pieces below are
//! specified to the byte:
//!
//! - [`kdf`]: PBKDF2-HMAC-SHA256, 1000 rounds, 32-byte key; hex salts are
//!   decoded to UTF-8 text before use.
//! - [`cipher`]: AES-256-GCM, 12-byte IV, 16-byte tag, no AAD.
//! - [`envelope`]: `<ivHex>:<ciphertextHex><tagHex>`.
//!
//! [`EnvelopeCodec`] ties them together behind the `encrypt_*`/`decrypt_*`
//! façade and caches the derived key for the life of the process.

pub mod cipher;
pub mod codec;
pub mod content;
pub mod envelope;
pub mod error;
pub mod kdf;

pub use codec::{CodecSettings, EnvelopeCodec, Sealed};
pub use content::{Content, ContentKind};
pub use envelope::{looks_like_envelope, value_looks_like_envelope, Envelope};
pub use error::{CodecError, ErrorKind};
pub use kdf::Secret;
