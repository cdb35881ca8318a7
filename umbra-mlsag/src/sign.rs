//! MLSAG signing over a plain ring.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use umbra_crypto::{Point, PrivateKey, Scalar};
use umbra_keys::derive_key_image;
use zeroize::Zeroizing;

use crate::chain::Chain;
use crate::{MlsagError, MlsagSig, Ring};

/// Sign `message` as the owner of ring row `pi`.
///
/// # Arguments
/// * `message` - 32-byte message digest
/// * `ring` - The validated ring
/// * `pi` - Index of the real row
/// * `private_keys` - One private key per ring column, opening row `pi`
/// * `key_images` - The key images of `private_keys`, in the same order
///
/// All inputs are checked before any randomness is drawn.
pub fn sign(
    message: &[u8; 32],
    ring: &Ring,
    pi: usize,
    private_keys: &[PrivateKey],
    key_images: &[Point],
) -> Result<MlsagSig, MlsagError> {
    sign_with_rng(message, ring, pi, private_keys, key_images, &mut OsRng)
}

/// [`sign`] drawing nonces and decoy responses from `rng`.
///
/// `rng` must be a CSPRNG that is never replayed: two signatures sharing a
/// nonce reveal the private keys.
pub fn sign_with_rng<R: RngCore + CryptoRng + ?Sized>(
    message: &[u8; 32],
    ring: &Ring,
    pi: usize,
    private_keys: &[PrivateKey],
    key_images: &[Point],
    rng: &mut R,
) -> Result<MlsagSig, MlsagError> {
    check_signer(ring, pi, private_keys, key_images)?;

    let secrets: Zeroizing<Vec<Scalar>> =
        Zeroizing::new(private_keys.iter().map(|key| *key.as_scalar()).collect());

    let chain = Chain::new(message, ring.rows(), key_images);
    let (c, r) = chain.sign(pi, &secrets, rng);

    Ok(MlsagSig {
        c,
        key_images: key_images.to_vec(),
        r,
    })
}

/// Check that `private_keys` and `key_images` open row `pi` of `ring`.
pub(crate) fn check_signer(
    ring: &Ring,
    pi: usize,
    private_keys: &[PrivateKey],
    key_images: &[Point],
) -> Result<(), MlsagError> {
    let real_row = ring.row(pi).ok_or_else(|| {
        MlsagError::SignerMisuse(format!("pi {} out of range for ring of {}", pi, ring.size()))
    })?;

    if private_keys.len() != ring.width() {
        return Err(MlsagError::SignerMisuse(format!(
            "{} private keys for a ring of width {}",
            private_keys.len(),
            ring.width()
        )));
    }

    if key_images.len() != ring.width() {
        return Err(MlsagError::ShapeMismatch(format!(
            "{} key images for a ring of width {}",
            key_images.len(),
            ring.width()
        )));
    }

    for (j, ((key, public_key), key_image)) in
        private_keys.iter().zip(real_row).zip(key_images).enumerate()
    {
        if key.public_key() != *public_key {
            return Err(MlsagError::SignerMisuse(format!(
                "private key {} does not open ring row {}",
                j, pi
            )));
        }
        if derive_key_image(key) != *key_image {
            return Err(MlsagError::SignerMisuse(format!(
                "key image {} does not belong to private key {}",
                j, j
            )));
        }
    }

    Ok(())
}
