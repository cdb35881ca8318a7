//! Error types for the demo.

use thiserror::Error;
use umbra_keys::KeyError;
use umbra_mlsag::MlsagError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Address error: {0}")]
    Address(#[from] KeyError),

    #[error("Signature error: {0}")]
    Signature(#[from] MlsagError),

    #[error("Recipient found {found} of {expected} outputs")]
    MissingOutputs { expected: usize, found: usize },

    #[error("Verification rejected: {0}")]
    Rejected(String),

    #[error("Key image {0} already spent")]
    DoubleSpend(String),

    #[error("Verification task failed: {0}")]
    Task(String),
}
