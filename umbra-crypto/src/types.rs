//! Secret key type and byte/hex codecs for points and scalars.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::group::{random_scalar, scalar_mult_base};

/// Length of every encoded point and scalar.
pub const ELEMENT_LENGTH: usize = 32;

/// A private scalar.
///
/// # Security
/// - Zeroized on drop
/// - Debug output is redacted to prevent key leakage in logs
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    /// Create from a scalar.
    pub fn new(scalar: Scalar) -> Self {
        Self(scalar)
    }

    /// Generate a random private key from the operating system RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a random private key from the supplied CSPRNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self(random_scalar(rng))
    }

    /// Create from bytes, reducing mod the group order.
    pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Self {
        Self(Scalar::from_bytes_mod_order(bytes))
    }

    /// Create from a canonical scalar encoding.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        decode_scalar(bytes).map(Self)
    }

    /// Get the scalar.
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    /// Convert to bytes.
    ///
    /// # Security Warning
    /// The returned bytes contain the private key. Ensure they are
    /// zeroized after use.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Compute the corresponding public key `x*G`.
    pub fn public_key(&self) -> EdwardsPoint {
        scalar_mult_base(&self.0)
    }
}

impl From<Scalar> for PrivateKey {
    fn from(scalar: Scalar) -> Self {
        Self(scalar)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// Compressed 32-byte encoding of a point.
pub fn encode_point(point: &EdwardsPoint) -> [u8; 32] {
    point.compress().to_bytes()
}

/// Decode a compressed point, rejecting bytes that are not on the curve.
///
/// Points outside the prime-order subgroup are accepted here; callers that
/// need the subgroup check perform it explicitly.
pub fn decode_point(bytes: &[u8]) -> Result<EdwardsPoint, CryptoError> {
    let compressed = CompressedEdwardsY::from_slice(bytes).map_err(|_| CryptoError::InvalidLength {
        expected: ELEMENT_LENGTH,
        actual: bytes.len(),
    })?;

    compressed
        .decompress()
        .ok_or_else(|| CryptoError::InvalidPoint(hex::encode(bytes)))
}

/// Canonical 32-byte encoding of a scalar.
pub fn encode_scalar(scalar: &Scalar) -> [u8; 32] {
    scalar.to_bytes()
}

/// Decode a scalar, rejecting non-canonical encodings.
pub fn decode_scalar(bytes: &[u8]) -> Result<Scalar, CryptoError> {
    if bytes.len() != ELEMENT_LENGTH {
        return Err(CryptoError::InvalidLength {
            expected: ELEMENT_LENGTH,
            actual: bytes.len(),
        });
    }

    let mut arr = [0u8; 32];
    arr.copy_from_slice(bytes);
    Option::from(Scalar::from_canonical_bytes(arr))
        .ok_or_else(|| CryptoError::InvalidScalar("non-canonical encoding".to_string()))
}

/// Convert a point to a lowercase hex string.
pub fn point_to_hex(point: &EdwardsPoint) -> String {
    hex::encode(encode_point(point))
}

/// Parse a point from a hex string.
pub fn point_from_hex(hex_str: &str) -> Result<EdwardsPoint, CryptoError> {
    let bytes = hex::decode(hex_str)?;
    decode_point(&bytes)
}

/// Convert a scalar to a lowercase hex string.
pub fn scalar_to_hex(scalar: &Scalar) -> String {
    hex::encode(encode_scalar(scalar))
}

/// Parse a canonical scalar from a hex string.
pub fn scalar_from_hex(hex_str: &str) -> Result<Scalar, CryptoError> {
    let bytes = hex::decode(hex_str)?;
    decode_scalar(&bytes)
}

/// Serde module for points as hex strings.
pub mod serde_point {
    use curve25519_dalek::edwards::EdwardsPoint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(point: &EdwardsPoint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::point_to_hex(point))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<EdwardsPoint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::point_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::traits::Identity;

    #[test]
    fn test_private_key_generation() {
        let key1 = PrivateKey::generate();
        let key2 = PrivateKey::generate();

        // Should generate different keys
        assert_ne!(key1.to_bytes(), key2.to_bytes());
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let key = PrivateKey::generate();
        let debug = format!("{:?}", key);

        assert_eq!(debug, "PrivateKey([REDACTED])");
    }

    #[test]
    fn test_point_hex_roundtrip() {
        let point = PrivateKey::generate().public_key();
        let recovered = point_from_hex(&point_to_hex(&point)).unwrap();

        assert_eq!(point, recovered);
    }

    #[test]
    fn test_decode_point_wrong_length() {
        let result = decode_point(&[1u8; 31]);
        assert_eq!(
            result,
            Err(CryptoError::InvalidLength {
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn test_decode_identity_point() {
        let identity = EdwardsPoint::identity();
        assert_eq!(decode_point(&encode_point(&identity)).unwrap(), identity);
    }

    #[test]
    fn test_non_canonical_scalar_rejected() {
        // 2^256 - 1 is far above the group order.
        let result = decode_scalar(&[0xff; 32]);
        assert!(matches!(result, Err(CryptoError::InvalidScalar(_))));
    }

    #[test]
    fn test_scalar_hex_roundtrip() {
        let scalar = Scalar::from(1234567u64);
        assert_eq!(scalar_from_hex(&scalar_to_hex(&scalar)).unwrap(), scalar);
    }
}
