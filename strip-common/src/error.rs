//! Common error types for the structure strip engine

use thiserror::Error;

/// Common result type for structure strip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for configuration, evaluation and loading
#[derive(Error, Debug)]
pub enum Error {
    /// Segment list or behaviour settings rejected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// Weight gcd collapsed to zero during evaluation
    ///
    /// Construction validation rules this out; kept as an assertion.
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    /// Requested segment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
