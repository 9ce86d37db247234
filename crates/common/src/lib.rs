//! Common types, protocol definitions, and errors shared across envelope-codec crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
