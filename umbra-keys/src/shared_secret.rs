//! Shared secret computation for key derivation.

use umbra_crypto::{scalar_mult, Point, PrivateKey, Scalar, ScalarHasher};

/// Diffie-Hellman point `x*P`.
///
/// `r*A` computed by the sender equals `a*R` computed by the recipient.
pub fn shared_point(public_key: &Point, private_key: &PrivateKey) -> Point {
    scalar_mult(public_key, private_key.as_scalar())
}

/// Hash a shared point and output index to a scalar: `Hs(S ‖ index)`.
pub fn hash_shared_secret(shared: &Point, output_index: u8) -> Scalar {
    let mut hasher = ScalarHasher::new();
    hasher.update_point(shared).update(&[output_index]);
    hasher.finalize()
}

/// Compute the shared secret for key derivation.
///
/// ```text
/// s = Hs(r*A ‖ index) = Hs(a*R ‖ index)
/// ```
///
/// # Arguments
/// * `public_key` - The other party's public key (A or R)
/// * `private_key` - Our private key (r or a)
/// * `output_index` - The output index for domain separation
pub fn compute_shared_secret(
    public_key: &Point,
    private_key: &PrivateKey,
    output_index: u8,
) -> Scalar {
    hash_shared_secret(&shared_point(public_key, private_key), output_index)
}
