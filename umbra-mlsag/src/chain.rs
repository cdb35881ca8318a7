//! The MLSAG hash chain, shared by the plain and confidential-asset variants.
//!
//! A chain runs over an `n × w` matrix of points. The first `m` columns are
//! keyed: each has a key image and hashes two points per row,
//!
//! ```text
//! L = r*G + c*P
//! R = r*Hp(P) + c*I
//! ```
//!
//! The remaining `w - m` columns are virtual: they have no key image and hash
//! a single point `r*H_b + c*V` over the Pedersen blinding base.

use curve25519_dalek::edwards::EdwardsPoint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use umbra_crypto::{
    hash_point_to_point, random_scalar, scalar_mult_base, PedersenGens, Point, Scalar, ScalarHasher,
};
use zeroize::Zeroizing;

const ROUND_LABEL: &[u8] = b"mlsag/round";

/// How the columns of a signature's response matrix are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnLayout {
    /// Every column is a key column with its own key image.
    Plain,
    /// Key columns followed by the asset and commitment virtual columns.
    ConfidentialAsset,
}

impl ColumnLayout {
    /// Number of columns that carry no key image.
    pub fn virtual_columns(&self) -> usize {
        match self {
            ColumnLayout::Plain => 0,
            ColumnLayout::ConfidentialAsset => 2,
        }
    }

    /// Response row width for `key_columns` keyed columns.
    pub fn width(&self, key_columns: usize) -> usize {
        key_columns + self.virtual_columns()
    }
}

/// Everything the chain hashes apart from the responses.
pub(crate) struct Chain<'a> {
    message: &'a [u8; 32],
    columns: &'a [Vec<Point>],
    key_images: &'a [Point],
    blinding_base: Point,
}

impl<'a> Chain<'a> {
    /// `columns` must be rectangular with width `key_images.len()` plus the
    /// virtual columns; callers validate shapes before building a chain.
    pub(crate) fn new(message: &'a [u8; 32], columns: &'a [Vec<Point>], key_images: &'a [Point]) -> Self {
        Self {
            message,
            columns,
            key_images,
            blinding_base: PedersenGens::default().blinding_base,
        }
    }

    fn size(&self) -> usize {
        self.columns.len()
    }

    fn hasher(&self) -> ScalarHasher {
        let mut hasher = ScalarHasher::new();
        hasher.update(ROUND_LABEL).update(self.message);
        hasher
    }

    /// `c[(pi+1) % n]` from the real row's nonces.
    fn opening_challenge(&self, pi: usize, alphas: &[Scalar]) -> Scalar {
        let mut hasher = self.hasher();
        let row = &self.columns[pi];

        for (j, alpha) in alphas.iter().enumerate() {
            if j < self.key_images.len() {
                hasher
                    .update_point(&scalar_mult_base(alpha))
                    .update_point(&(hash_point_to_point(&row[j]) * alpha));
            } else {
                hasher.update_point(&(self.blinding_base * alpha));
            }
        }

        hasher.finalize()
    }

    /// `c[i+1]` from `c[i]` and row `i`'s responses.
    pub(crate) fn next_challenge(&self, row_index: usize, challenge: &Scalar, responses: &[Scalar]) -> Scalar {
        let mut hasher = self.hasher();
        let row = &self.columns[row_index];

        for (j, (point, response)) in row.iter().zip(responses).enumerate() {
            match self.key_images.get(j) {
                Some(key_image) => {
                    let l = EdwardsPoint::vartime_double_scalar_mul_basepoint(challenge, point, response);
                    let r = hash_point_to_point(point) * response + key_image * challenge;
                    hasher.update_point(&l).update_point(&r);
                }
                None => {
                    let v = self.blinding_base * response + point * challenge;
                    hasher.update_point(&v);
                }
            }
        }

        hasher.finalize()
    }

    /// Run the signing walk for real row `pi` with one secret per column.
    ///
    /// Returns `c[0]` and the full response matrix.
    pub(crate) fn sign<R: RngCore + CryptoRng + ?Sized>(
        &self,
        pi: usize,
        secrets: &[Scalar],
        rng: &mut R,
    ) -> (Scalar, Vec<Vec<Scalar>>) {
        let n = self.size();
        let width = secrets.len();

        let alphas: Zeroizing<Vec<Scalar>> =
            Zeroizing::new((0..width).map(|_| random_scalar(&mut *rng)).collect());

        let mut responses: Vec<Vec<Scalar>> = (0..n)
            .map(|i| {
                if i == pi {
                    vec![Scalar::ZERO; width]
                } else {
                    (0..width).map(|_| random_scalar(&mut *rng)).collect()
                }
            })
            .collect();

        let mut index = (pi + 1) % n;
        let mut challenge = self.opening_challenge(pi, &alphas);
        let mut c_zero = challenge;

        while index != pi {
            challenge = self.next_challenge(index, &challenge, &responses[index]);
            index = (index + 1) % n;
            if index == 0 {
                c_zero = challenge;
            }
        }

        // challenge is now c[pi]
        for (j, response) in responses[pi].iter_mut().enumerate() {
            *response = alphas[j] - challenge * secrets[j];
        }

        (c_zero, responses)
    }

    /// Walk rows `0..n` from `c_zero` and check the chain closes.
    pub(crate) fn verify(&self, c_zero: &Scalar, responses: &[Vec<Scalar>]) -> bool {
        let challenge = responses
            .iter()
            .enumerate()
            .fold(*c_zero, |challenge, (i, row)| self.next_challenge(i, &challenge, row));

        challenge == *c_zero
    }
}
