//! Error types for ring construction, signing and verification.

use thiserror::Error;

/// Errors that can occur while building rings or producing and checking
/// MLSAG signatures.
///
/// A signature that is well formed but does not verify is reported as
/// `Ok(false)` by the verifiers, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MlsagError {
    /// Ring rows, key images or response rows have inconsistent dimensions.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A key image is the identity or lies outside the prime-order subgroup.
    #[error("Invalid key image at column {0}")]
    InvalidKeyImage(usize),

    /// Byte or hex decoding failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The signer supplied inconsistent secret inputs.
    #[error("Signer misuse: {0}")]
    SignerMisuse(String),

    /// Two ring rows carry identical keys.
    #[error("Duplicate ring rows {first} and {second}")]
    DuplicateRow { first: usize, second: usize },

    /// A confidential-asset virtual key does not open its virtual point.
    #[error("Virtual key mismatch for {0} column")]
    VirtualKeyMismatch(&'static str),

    /// The decoy source failed or could not supply usable decoys.
    #[error("Chain store error: {0}")]
    ChainStore(String),
}
