//! Error types for wavelet-matrix structures.

use thiserror::Error;

/// Error variants for building and (de)serializing structures.
#[derive(Debug, Error)]
pub enum Error {
    /// A byte stream did not contain a well-formed structure.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// An I/O error occurred during serialization or deserialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
