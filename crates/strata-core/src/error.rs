//! Core error types.

use thiserror::Error;

/// Core catalog errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A schema version failed structural validation.
    #[error("invalid schema version {version}: {message}")]
    InvalidSchema {
        /// The offending schema version.
        version: u32,
        /// Description of the problem.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}
