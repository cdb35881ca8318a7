//! Error types for group-element and scalar handling.

use thiserror::Error;

/// Errors that can occur while decoding or validating group elements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The bytes do not encode a point on the curve.
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// The bytes are not a canonical scalar encoding.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// The input has the wrong length.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The hex string could not be decoded.
    #[error("Hex decoding failed: {0}")]
    HexError(String),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        CryptoError::HexError(err.to_string())
    }
}
