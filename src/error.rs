//! Error taxonomy for the store.
//!
//! "Absent" outcomes (`get`/`delete` of a missing id) are not errors; they
//! surface as `None`/`false` from the storage API.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorError {
    /// Invalid construction parameters. Detected before any I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A supplied vector's length does not match the configured dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector blob that cannot be decoded back into f32 components.
    #[error("Invalid vector data: {0}")]
    InvalidVector(String),

    /// Underlying storage-engine failure, with the cause attached.
    /// Never retried internally; retry policy belongs to the caller.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_names_both_sides() {
        let err = VectorError::DimensionMismatch {
            expected: 384,
            actual: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("384"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn sqlite_errors_convert() {
        let inner = rusqlite::Error::InvalidQuery;
        let err: VectorError = inner.into();
        assert!(matches!(err, VectorError::Sqlite(_)));
    }
}
