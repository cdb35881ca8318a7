//! MLSAG Linkable Ring Signatures for umbra
//!
//! This crate implements Multilayer Linkable Spontaneous Anonymous Group
//! signatures: the signer proves knowledge of all `m` private keys of one row
//! of an `n × m` ring without revealing which row, and publishes one key image
//! per key so that a second spend of the same key is detectable.
//!
//! # Overview
//!
//! - [`Ring`]: validated `n × m` matrix of public keys
//! - [`RingBuilder`]: places the real row among decoys fetched from a [`ChainStore`]
//! - [`sign()`] / [`verify()`]: the plain MLSAG
//! - [`confidential`]: the same chain over `m + 2` columns, adding asset-type
//!   and value conservation
//! - [`MlsagSig`]: the signature with its byte, hex and serde encodings
//!
//! # Example
//!
//! ```rust
//! use umbra_crypto::{hash_message, PrivateKey};
//! use umbra_keys::derive_key_image;
//! use umbra_mlsag::{sign, verify, Ring};
//!
//! let key = PrivateKey::generate();
//! let ring = Ring::new(vec![
//!     vec![PrivateKey::generate().public_key()],
//!     vec![key.public_key()],
//!     vec![PrivateKey::generate().public_key()],
//! ])
//! .unwrap();
//!
//! let message = hash_message(b"transfer 10");
//! let key_image = derive_key_image(&key);
//!
//! let sig = sign(&message, &ring, 1, &[key], &[key_image]).unwrap();
//! assert!(verify(&sig, &ring, &message).unwrap());
//! ```

pub mod builder;
pub mod confidential;

mod chain;
mod error;
mod ring;
mod sign;
mod signature;
mod verify;

pub use builder::{ChainStore, InMemoryChainStore, RingBuilder, RingBuilderConfig, DEFAULT_MAX_REDRAWS};
pub use chain::ColumnLayout;
pub use confidential::{
    asset_tag_base, asset_virtual_key, commitment_virtual_key, sign_confidential_asset,
    sign_confidential_asset_with_rng, verify_confidential_asset, Coin, CoinOpening,
    ConfidentialRing, OutputCommitment,
};
pub use error::MlsagError;
pub use ring::{Ring, MAX_RING_WIDTH};
pub use sign::{sign, sign_with_rng};
pub use signature::{serde_confidential, MlsagSig};
pub use verify::verify;
