//! Group Arithmetic and Hashing for umbra
//!
//! This crate is the single place the rest of the workspace touches curve
//! arithmetic. It wraps `curve25519-dalek` Edwards points and scalars behind
//! the small set of operations the protocol needs.
//!
//! # Overview
//!
//! - [`group`]: random scalars/points, base and variable-base multiplication,
//!   prime-order-subgroup checks and Pedersen generators
//! - [`hash`]: domain-separated hash-to-scalar, hash-to-point and message digests
//! - [`types`]: the zeroizing [`PrivateKey`] and byte/hex codecs for points and scalars
//!
//! # Example
//!
//! ```rust
//! use umbra_crypto::{hash_point_to_point, PrivateKey};
//!
//! let key = PrivateKey::generate();
//! let public_key = key.public_key();
//!
//! // Key image I = x * Hp(P)
//! let key_image = hash_point_to_point(&public_key) * key.as_scalar();
//! assert!(umbra_crypto::is_in_prime_subgroup(&key_image));
//! ```

pub mod group;
pub mod hash;
pub mod types;

mod error;

pub use curve25519_dalek::scalar::Scalar;
pub use error::CryptoError;
pub use group::{
    add, identity, is_identity, is_in_prime_subgroup, random_point, random_scalar, scalar_mult,
    scalar_mult_base, sub, sum_points, PedersenGens, Point,
};
pub use hash::{
    hash_message, hash_point_to_point, hash_to_point, hash_to_scalar, ScalarHasher, DOMAIN_TAG,
};
pub use types::{
    decode_point, decode_scalar, encode_point, encode_scalar, point_from_hex, point_to_hex,
    scalar_from_hex, scalar_to_hex, serde_point, PrivateKey, ELEMENT_LENGTH,
};
