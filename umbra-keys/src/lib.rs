//! Stealth One-Time Addresses for umbra
//!
//! This crate implements the dual-key stealth address scheme: a sender can
//! pay a published address without the payment being linkable to it, and
//! only the recipient can recognize and spend the output.
//!
//! # Overview
//!
//! Every user holds two key pairs:
//! - **View Key** `(a, A)`: Used to scan transactions for incoming outputs
//! - **Spend Key** `(b, B)`: Used to authorize spending of funds
//!
//! For each transaction output, a unique one-time address is derived:
//! ```text
//! K° = Hs(r*A ‖ index)*G + B
//! ```
//! Where:
//! - `r` = random transaction private key, published as `R = r*G`
//! - `index` = position of the output inside its transaction
//! - `Hs` = hash-to-scalar function
//!
//! The recipient's spending key for that output is `b + Hs(a*R ‖ index)`,
//! and its key image `I = x*Hp(K°)` marks the output as spent.
//!
//! # Example
//!
//! ```rust
//! use umbra_keys::{
//!     derive_private_key_of_output, find_output_index, generate_output_address, PrivateAddress,
//! };
//!
//! let wallet = PrivateAddress::generate();
//!
//! // Sender pays the public address
//! let (output, _shared_hash) = generate_output_address(&wallet.public_address(), 0);
//!
//! // Recipient recognizes and spends it
//! let index = find_output_index(&wallet, &output.ephemeral_pub_key, &output.addressee, 16);
//! assert_eq!(index, Some(0));
//!
//! let spend_key = derive_private_key_of_output(&wallet, &output.ephemeral_pub_key, 0);
//! assert_eq!(spend_key.public_key(), output.addressee);
//! ```

pub mod address;

mod derivation;
mod error;
mod ownership;
mod shared_secret;
mod types;

pub use address::{
    decode_address, decode_address_for_network, encode_address, Network, MAINNET_VERSION,
    TESTNET_VERSION,
};
pub use derivation::{
    derive_addressee, derive_key_image, derive_private_key_of_output, generate_output_address,
    generate_output_address_with_key, generate_output_address_with_rng,
};
pub use error::KeyError;
pub use ownership::{find_output_index, matches_address, scan_outputs, OwnedOutput};
pub use shared_secret::{compute_shared_secret, hash_shared_secret, shared_point};
pub use types::{PrivateAddress, PublicAddress, StealthOutput, TxKey};

#[cfg(test)]
mod tests;
