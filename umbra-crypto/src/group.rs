//! Thin facade over the prime-order group used by the protocol.
//!
//! Points are Edwards25519 points. Unlike Ristretto encodings, an Edwards
//! encoding can carry a small-order component, so anything received from the
//! outside that must live in the prime-order subgroup is checked with
//! [`is_in_prime_subgroup`].

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, IsIdentity};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::hash::hash_to_point;

/// Group element.
pub type Point = EdwardsPoint;

const VALUE_BASE_LABEL: &[u8] = b"pedersen/value";
const BLINDING_BASE_LABEL: &[u8] = b"pedersen/blinding";

/// Draw a uniform scalar from the supplied CSPRNG.
pub fn random_scalar<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    let scalar = Scalar::from_bytes_mod_order_wide(&bytes);
    bytes.zeroize();
    scalar
}

/// Draw a uniform point as `s*G` for a fresh random `s`.
pub fn random_point<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Point {
    scalar_mult_base(&random_scalar(rng))
}

/// The neutral element.
pub fn identity() -> Point {
    EdwardsPoint::identity()
}

/// `s*G`.
pub fn scalar_mult_base(scalar: &Scalar) -> Point {
    EdwardsPoint::mul_base(scalar)
}

/// `s*P`.
pub fn scalar_mult(point: &Point, scalar: &Scalar) -> Point {
    point * scalar
}

/// `P + Q`.
pub fn add(p: &Point, q: &Point) -> Point {
    p + q
}

/// `P - Q`.
pub fn sub(p: &Point, q: &Point) -> Point {
    p - q
}

/// Sum of a sequence of points.
pub fn sum_points<'a, I>(points: I) -> Point
where
    I: IntoIterator<Item = &'a Point>,
{
    points.into_iter().fold(identity(), |acc, p| acc + p)
}

/// True iff `L*P` is the identity, i.e. `P` has no small-order component.
pub fn is_in_prime_subgroup(point: &Point) -> bool {
    point.is_torsion_free()
}

/// True iff `P` is the neutral element.
pub fn is_identity(point: &Point) -> bool {
    point.is_identity()
}

/// Independent generators for Pedersen commitments `v*V + b*B`.
///
/// Both bases come out of [`hash_to_point`], so no discrete-log relation to
/// `G` or to each other is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedersenGens {
    /// Base multiplied by the committed value.
    pub value_base: Point,
    /// Base multiplied by the blinding factor.
    pub blinding_base: Point,
}

impl PedersenGens {
    /// Commit to `value` with blinding `blinding`.
    pub fn commit(&self, value: &Scalar, blinding: &Scalar) -> Point {
        self.value_base * value + self.blinding_base * blinding
    }
}

impl Default for PedersenGens {
    fn default() -> Self {
        Self {
            value_base: hash_to_point(VALUE_BASE_LABEL),
            blinding_base: hash_to_point(BLINDING_BASE_LABEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::edwards::CompressedEdwardsY;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Encoding of (0, -1), the point of order two.
    fn order_two_point() -> Point {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0xec;
        bytes[31] = 0x7f;
        CompressedEdwardsY(bytes).decompress().unwrap()
    }

    #[test]
    fn test_random_scalars_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_ne!(random_scalar(&mut rng), random_scalar(&mut rng));
    }

    #[test]
    fn test_point_arithmetic() {
        let two = Scalar::from(2u64);
        let three = Scalar::from(3u64);
        let five = Scalar::from(5u64);

        let sum = add(&scalar_mult_base(&two), &scalar_mult_base(&three));
        assert_eq!(sum, scalar_mult_base(&five));
        assert_eq!(sub(&sum, &scalar_mult_base(&three)), scalar_mult_base(&two));
        assert_eq!(scalar_mult(&scalar_mult_base(&two), &three), scalar_mult_base(&Scalar::from(6u64)));
    }

    #[test]
    fn test_sum_points() {
        let points: Vec<Point> = (1u64..=4).map(|i| scalar_mult_base(&Scalar::from(i))).collect();
        assert_eq!(sum_points(&points), scalar_mult_base(&Scalar::from(10u64)));
        assert!(is_identity(&sum_points(&[])));
    }

    #[test]
    fn test_prime_subgroup_check() {
        let mut rng = StdRng::seed_from_u64(11);
        let honest = random_point(&mut rng);
        let torsion = order_two_point();

        assert!(is_in_prime_subgroup(&honest));
        assert!(!is_in_prime_subgroup(&torsion));
        assert!(!is_in_prime_subgroup(&(honest + torsion)));
    }

    #[test]
    fn test_pedersen_bases_independent() {
        let gens = PedersenGens::default();

        assert_ne!(gens.value_base, gens.blinding_base);
        assert_ne!(gens.value_base, scalar_mult_base(&Scalar::ONE));
        assert!(is_in_prime_subgroup(&gens.value_base));
        assert!(is_in_prime_subgroup(&gens.blinding_base));
    }

    #[test]
    fn test_pedersen_commit_homomorphic() {
        let gens = PedersenGens::default();
        let c1 = gens.commit(&Scalar::from(10u64), &Scalar::from(3u64));
        let c2 = gens.commit(&Scalar::from(5u64), &Scalar::from(4u64));

        assert_eq!(c1 + c2, gens.commit(&Scalar::from(15u64), &Scalar::from(7u64)));
    }
}
