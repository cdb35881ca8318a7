//! Domain-separated hashing into the scalar field and the prime-order group.
//!
//! Every hash in the protocol is prefixed with [`DOMAIN_TAG`]. The tag is
//! versioned: changing it invalidates every signature issued under the old tag.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use sha2::Sha256;
use sha3::{Digest, Sha3_256, Sha3_512};

/// Versioned domain tag shared by all protocol hashes.
pub const DOMAIN_TAG: &[u8] = b"umbra/v1";

const SCALAR_LABEL: &[u8] = b"/scalar";
const POINT_LABEL: &[u8] = b"/point";

/// Incremental hash-to-scalar.
///
/// Feeding `a` then `b` produces the same scalar as [`hash_to_scalar`] over
/// `a ‖ b`, which lets the ring walk hash long challenge inputs without
/// building a buffer first.
#[derive(Clone)]
pub struct ScalarHasher {
    inner: Sha3_512,
}

impl ScalarHasher {
    /// Start a new hash already bound to the domain tag.
    pub fn new() -> Self {
        let mut inner = Sha3_512::new();
        inner.update(DOMAIN_TAG);
        inner.update(SCALAR_LABEL);
        Self { inner }
    }

    /// Absorb raw bytes.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Absorb the compressed encoding of a point.
    pub fn update_point(&mut self, point: &EdwardsPoint) -> &mut Self {
        self.inner.update(point.compress().as_bytes());
        self
    }

    /// Finish and reduce the 64-byte digest modulo the group order.
    pub fn finalize(self) -> Scalar {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&hash);
        Scalar::from_bytes_mod_order_wide(&bytes)
    }
}

impl Default for ScalarHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash arbitrary bytes to a scalar.
pub fn hash_to_scalar(data: &[u8]) -> Scalar {
    let mut hasher = ScalarHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Hash arbitrary bytes to a point of the prime-order subgroup.
///
/// Try-and-increment: each candidate digest is read as a compressed Edwards
/// y-coordinate; the first one that decompresses is multiplied by the
/// cofactor. The discrete log of the result relative to the base point is
/// unknown, which is what key images rely on.
pub fn hash_to_point(data: &[u8]) -> EdwardsPoint {
    let mut counter: u32 = 0;
    loop {
        let mut hasher = Sha3_256::new();
        hasher.update(DOMAIN_TAG);
        hasher.update(POINT_LABEL);
        hasher.update(data);
        hasher.update(counter.to_le_bytes());
        let hash = hasher.finalize();

        let mut candidate = [0u8; 32];
        candidate.copy_from_slice(&hash);

        if let Some(point) = CompressedEdwardsY(candidate).decompress() {
            let point = point.mul_by_cofactor();
            if !point.is_identity() {
                return point;
            }
        }
        counter = counter.wrapping_add(1);
    }
}

/// Hash a point to a point, keyed on its compressed encoding.
pub fn hash_point_to_point(point: &EdwardsPoint) -> EdwardsPoint {
    hash_to_point(point.compress().as_bytes())
}

/// Produce the fixed-length message digest that ring signatures sign.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(message);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
