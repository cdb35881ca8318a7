//! Error types for key and address operations.

use thiserror::Error;
use umbra_crypto::CryptoError;

/// Errors that can occur during key and address operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// A point or scalar failed to decode.
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] CryptoError),

    /// The address string is not valid Base58.
    #[error("Invalid Base58 encoding: {0}")]
    InvalidBase58(String),

    /// The address checksum is invalid.
    #[error("Invalid checksum")]
    InvalidChecksum,

    /// The address has an invalid length.
    #[error("Invalid address length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The address version byte is unknown.
    #[error("Invalid version byte: {0}")]
    InvalidVersion(u8),

    /// The network does not match the expected one.
    #[error("Network mismatch: expected {expected:?}, got {actual:?}")]
    NetworkMismatch {
        expected: crate::Network,
        actual: crate::Network,
    },
}
