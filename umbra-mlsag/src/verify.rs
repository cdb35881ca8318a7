//! MLSAG verification over a plain ring.

use umbra_crypto::{is_identity, is_in_prime_subgroup};

use crate::chain::Chain;
use crate::{ColumnLayout, MlsagError, MlsagSig, Ring};

/// Verify `sig` over `ring` and `message`.
///
/// # Returns
/// * `Ok(true)` - The ring walk closes
/// * `Ok(false)` - Well-formed signature that does not verify
/// * `Err(ShapeMismatch)` - Signature dimensions do not fit the ring
/// * `Err(InvalidKeyImage)` - A key image is the identity or has a
///   small-order component
pub fn verify(sig: &MlsagSig, ring: &Ring, message: &[u8; 32]) -> Result<bool, MlsagError> {
    check_shape(sig, ring.size(), ring.width(), ColumnLayout::Plain)?;
    check_key_images(sig)?;

    let chain = Chain::new(message, ring.rows(), &sig.key_images);
    Ok(chain.verify(&sig.c, &sig.r))
}

/// Check the signature's key images and response matrix against an
/// `n × m` ring under `layout`.
pub(crate) fn check_shape(
    sig: &MlsagSig,
    n: usize,
    m: usize,
    layout: ColumnLayout,
) -> Result<(), MlsagError> {
    if sig.key_images.len() != m {
        return Err(MlsagError::ShapeMismatch(format!(
            "{} key images for a ring of width {}",
            sig.key_images.len(),
            m
        )));
    }

    if sig.r.len() != n {
        return Err(MlsagError::ShapeMismatch(format!(
            "{} response rows for a ring of {} rows",
            sig.r.len(),
            n
        )));
    }

    let width = layout.width(m);
    if let Some((i, row)) = sig.r.iter().enumerate().find(|(_, row)| row.len() != width) {
        return Err(MlsagError::ShapeMismatch(format!(
            "response row {} has {} entries, expected {}",
            i,
            row.len(),
            width
        )));
    }

    Ok(())
}

/// Reject key images that are the identity or lie outside the prime-order
/// subgroup.
pub(crate) fn check_key_images(sig: &MlsagSig) -> Result<(), MlsagError> {
    match sig
        .key_images
        .iter()
        .position(|image| is_identity(image) || !is_in_prime_subgroup(image))
    {
        Some(index) => Err(MlsagError::InvalidKeyImage(index)),
        None => Ok(()),
    }
}
