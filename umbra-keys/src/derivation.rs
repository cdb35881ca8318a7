//! One-time key derivation and key images.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use umbra_crypto::{hash_point_to_point, scalar_mult_base, Point, PrivateKey, Scalar};

use crate::shared_secret::{compute_shared_secret, hash_shared_secret, shared_point};
use crate::{PrivateAddress, PublicAddress, StealthOutput, TxKey};

/// Generate a stealth output for `recipient` under a fresh ephemeral key.
///
/// ```text
/// R  = r*G
/// s  = Hs(r*A ‖ index)
/// K° = s*G + B
/// ```
///
/// Returns the output together with `s`, the seed used to blind the output's
/// amount and mask commitments.
pub fn generate_output_address(recipient: &PublicAddress, output_index: u8) -> (StealthOutput, Scalar) {
    generate_output_address_with_rng(recipient, output_index, &mut OsRng)
}

/// [`generate_output_address`] drawing the ephemeral key from `rng`.
pub fn generate_output_address_with_rng<R: RngCore + CryptoRng + ?Sized>(
    recipient: &PublicAddress,
    output_index: u8,
    rng: &mut R,
) -> (StealthOutput, Scalar) {
    let tx_key = TxKey::generate_with_rng(rng);
    generate_output_address_with_key(recipient, &tx_key, output_index)
}

/// Generate a stealth output under an existing transaction key.
///
/// Used when several outputs of one transaction share `R`; the output index
/// keeps their one-time keys distinct.
pub fn generate_output_address_with_key(
    recipient: &PublicAddress,
    tx_key: &TxKey,
    output_index: u8,
) -> (StealthOutput, Scalar) {
    let shared_hash = compute_shared_secret(&recipient.public_view, &tx_key.private_key, output_index);
    let addressee = scalar_mult_base(&shared_hash) + recipient.public_spend;

    let output = StealthOutput {
        ephemeral_pub_key: tx_key.public_key,
        addressee,
        output_index,
    };

    (output, shared_hash)
}

/// Derive the one-time private key for spending an output.
///
/// ```text
/// x = b + Hs(a*R ‖ index)
/// ```
///
/// `x*G` equals the output's addressee whenever the output was built for this
/// address at this index.
pub fn derive_private_key_of_output(
    address: &PrivateAddress,
    ephemeral_pub_key: &Point,
    output_index: u8,
) -> PrivateKey {
    let shared_hash = compute_shared_secret(ephemeral_pub_key, &address.private_view, output_index);
    PrivateKey::new(address.private_spend.as_scalar() + shared_hash)
}

/// Recompute the addressee a given output index would have for this address.
///
/// Needs only the private view key and the public spend key, so a view-only
/// scanner can run it.
pub fn derive_addressee(address: &PrivateAddress, ephemeral_pub_key: &Point, output_index: u8) -> Point {
    let shared = shared_point(ephemeral_pub_key, &address.private_view);
    addressee_from_shared(&shared, &address.private_spend.public_key(), output_index)
}

pub(crate) fn addressee_from_shared(shared: &Point, public_spend: &Point, output_index: u8) -> Point {
    scalar_mult_base(&hash_shared_secret(shared, output_index)) + public_spend
}

/// Derive the key image of a private key.
///
/// ```text
/// I = x * Hp(x*G)
/// ```
///
/// The same key always yields the same image, whatever ring it is later
/// signed in, which is what lets the network spot a double spend.
pub fn derive_key_image(private_key: &PrivateKey) -> Point {
    let public_key = private_key.public_key();
    hash_point_to_point(&public_key) * private_key.as_scalar()
}
