//! Confidential-asset extension.
//!
//! Each coin carries a blinded asset tag and a value commitment over it:
//!
//! ```text
//! A = T + a*H_b        (T = asset_tag_base(asset_id))
//! C = v*A + b*H_b
//! ```
//!
//! For ring row `k` with `m` input coins and a transaction with `q` outputs,
//! two virtual points are appended to the row:
//!
//! ```text
//! VA_k = q*ΣA_in - m*ΣA_out
//! VC_k = ΣC_in - ΣC_out
//! ```
//!
//! On the real row both are multiples of `H_b` with known discrete logs
//! exactly when asset types and values balance, so one MLSAG over `m + 2`
//! columns proves ownership and conservation together.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use umbra_crypto::{
    hash_to_point, serde_point, sum_points, PedersenGens, Point, PrivateKey, Scalar,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::chain::Chain;
use crate::sign::check_signer;
use crate::verify::{check_key_images, check_shape};
use crate::{ColumnLayout, MlsagError, MlsagSig, Ring};

const ASSET_LABEL: &[u8] = b"asset";

/// Unblinded tag `T` for an asset identifier.
pub fn asset_tag_base(asset_id: &[u8]) -> Point {
    let mut data = Vec::with_capacity(ASSET_LABEL.len() + asset_id.len());
    data.extend_from_slice(ASSET_LABEL);
    data.extend_from_slice(asset_id);
    hash_to_point(&data)
}

/// The secret side of a coin or output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CoinOpening {
    /// Amount.
    pub value: u64,
    /// Blinding factor `a` of the asset tag.
    pub asset_blinder: Scalar,
    /// Blinding factor `b` of the value commitment.
    pub commitment_blinder: Scalar,
}

impl CoinOpening {
    /// Create an opening from its parts.
    pub fn new(value: u64, asset_blinder: Scalar, commitment_blinder: Scalar) -> Self {
        Self {
            value,
            asset_blinder,
            commitment_blinder,
        }
    }

    /// `v*a + b`, this coin's share of the commitment virtual key.
    fn commitment_share(&self) -> Scalar {
        Scalar::from(self.value) * self.asset_blinder + self.commitment_blinder
    }

    fn blinded_tag(&self, asset_tag_base: &Point) -> (Point, Point) {
        let blinding_base = PedersenGens::default().blinding_base;
        let asset_tag = asset_tag_base + blinding_base * self.asset_blinder;
        let commitment = asset_tag * Scalar::from(self.value) + blinding_base * self.commitment_blinder;
        (asset_tag, commitment)
    }
}

impl std::fmt::Debug for CoinOpening {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CoinOpening([REDACTED])")
    }
}

/// A spendable coin as it appears in a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// One-time public key of the output.
    #[serde(with = "serde_point")]
    pub public_key: Point,
    /// Blinded asset tag `A`.
    #[serde(with = "serde_point")]
    pub asset_tag: Point,
    /// Value commitment `C`.
    #[serde(with = "serde_point")]
    pub commitment: Point,
}

impl Coin {
    /// Build a coin owned by `public_key` from its opening.
    pub fn commit(asset_tag_base: &Point, opening: &CoinOpening, public_key: Point) -> Self {
        let (asset_tag, commitment) = opening.blinded_tag(asset_tag_base);
        Self {
            public_key,
            asset_tag,
            commitment,
        }
    }
}

/// Asset tag and value commitment of a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCommitment {
    /// Blinded asset tag `A`.
    #[serde(with = "serde_point")]
    pub asset_tag: Point,
    /// Value commitment `C`.
    #[serde(with = "serde_point")]
    pub commitment: Point,
}

impl OutputCommitment {
    /// Commit to an output from its opening.
    pub fn commit(asset_tag_base: &Point, opening: &CoinOpening) -> Self {
        let (asset_tag, commitment) = opening.blinded_tag(asset_tag_base);
        Self {
            asset_tag,
            commitment,
        }
    }
}

/// Discrete log of the real row's asset virtual point: `q*Σa_in - m*Σa_out`.
pub fn asset_virtual_key(inputs: &[CoinOpening], outputs: &[CoinOpening]) -> Scalar {
    let m = Scalar::from(inputs.len() as u64);
    let q = Scalar::from(outputs.len() as u64);
    let sum_in: Scalar = inputs.iter().map(|o| o.asset_blinder).sum();
    let sum_out: Scalar = outputs.iter().map(|o| o.asset_blinder).sum();
    q * sum_in - m * sum_out
}

/// Discrete log of the real row's commitment virtual point:
/// `Σ(v*a + b)_in - Σ(v*a + b)_out`.
pub fn commitment_virtual_key(inputs: &[CoinOpening], outputs: &[CoinOpening]) -> Scalar {
    let sum_in: Scalar = inputs.iter().map(CoinOpening::commitment_share).sum();
    let sum_out: Scalar = outputs.iter().map(CoinOpening::commitment_share).sum();
    sum_in - sum_out
}

/// A ring of coins together with the outputs they pay, expanded to
/// `m + 2` columns per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidentialRing {
    coins: Vec<Vec<Coin>>,
    outputs: Vec<OutputCommitment>,
    keys: Ring,
    pub(crate) columns: Vec<Vec<Point>>,
}

impl ConfidentialRing {
    /// Validate the coin matrix and compute every row's virtual points.
    pub fn new(rows: Vec<Vec<Coin>>, outputs: Vec<OutputCommitment>) -> Result<Self, MlsagError> {
        if outputs.is_empty() {
            return Err(MlsagError::ShapeMismatch("confidential ring needs at least one output".into()));
        }

        let keys = Ring::new(
            rows.iter()
                .map(|row| row.iter().map(|coin| coin.public_key).collect())
                .collect(),
        )?;

        let m = Scalar::from(keys.width() as u64);
        let q = Scalar::from(outputs.len() as u64);
        let out_tags = sum_points(outputs.iter().map(|o| &o.asset_tag));
        let out_commitments = sum_points(outputs.iter().map(|o| &o.commitment));

        let columns = rows
            .iter()
            .zip(keys.rows())
            .map(|(coins, public_keys)| {
                let in_tags = sum_points(coins.iter().map(|c| &c.asset_tag));
                let in_commitments = sum_points(coins.iter().map(|c| &c.commitment));

                let mut column = public_keys.clone();
                column.push(in_tags * q - out_tags * m);
                column.push(in_commitments - out_commitments);
                column
            })
            .collect();

        Ok(Self {
            coins: rows,
            outputs,
            keys,
            columns,
        })
    }

    /// Number of rows `n`.
    pub fn size(&self) -> usize {
        self.keys.size()
    }

    /// Number of coins per row `m`.
    pub fn width(&self) -> usize {
        self.keys.width()
    }

    /// The public-key part of the ring.
    pub fn key_ring(&self) -> &Ring {
        &self.keys
    }

    /// Coins, row by row.
    pub fn coins(&self) -> &[Vec<Coin>] {
        &self.coins
    }

    /// The outputs the ring pays.
    pub fn outputs(&self) -> &[OutputCommitment] {
        &self.outputs
    }

    /// `(VA_k, VC_k)` for row `k`.
    pub fn virtual_points(&self, row: usize) -> Option<(Point, Point)> {
        self.columns.get(row).map(|column| {
            let m = self.width();
            (column[m], column[m + 1])
        })
    }
}

/// Sign as the owner of row `pi`, proving asset and value conservation.
///
/// `asset_key` and `commitment_key` are checked against the real row's
/// virtual points before any randomness is drawn; a mismatch is returned as
/// [`MlsagError::VirtualKeyMismatch`].
pub fn sign_confidential_asset(
    message: &[u8; 32],
    ring: &ConfidentialRing,
    pi: usize,
    spend_keys: &[PrivateKey],
    asset_key: &Scalar,
    commitment_key: &Scalar,
    key_images: &[Point],
) -> Result<MlsagSig, MlsagError> {
    sign_confidential_asset_with_rng(
        message,
        ring,
        pi,
        spend_keys,
        asset_key,
        commitment_key,
        key_images,
        &mut OsRng,
    )
}

/// [`sign_confidential_asset`] drawing nonces and decoy responses from `rng`.
#[allow(clippy::too_many_arguments)]
pub fn sign_confidential_asset_with_rng<R: RngCore + CryptoRng + ?Sized>(
    message: &[u8; 32],
    ring: &ConfidentialRing,
    pi: usize,
    spend_keys: &[PrivateKey],
    asset_key: &Scalar,
    commitment_key: &Scalar,
    key_images: &[Point],
    rng: &mut R,
) -> Result<MlsagSig, MlsagError> {
    check_signer(&ring.keys, pi, spend_keys, key_images)?;

    let (asset_point, commitment_point) = ring.virtual_points(pi).ok_or_else(|| {
        MlsagError::SignerMisuse(format!("pi {} out of range for ring of {}", pi, ring.size()))
    })?;

    let blinding_base = PedersenGens::default().blinding_base;
    if blinding_base * asset_key != asset_point {
        return Err(MlsagError::VirtualKeyMismatch("asset"));
    }
    if blinding_base * commitment_key != commitment_point {
        return Err(MlsagError::VirtualKeyMismatch("commitment"));
    }

    let mut secrets: Zeroizing<Vec<Scalar>> =
        Zeroizing::new(spend_keys.iter().map(|key| *key.as_scalar()).collect());
    secrets.push(*asset_key);
    secrets.push(*commitment_key);

    let chain = Chain::new(message, &ring.columns, key_images);
    let (c, r) = chain.sign(pi, &secrets, rng);

    Ok(MlsagSig {
        c,
        key_images: key_images.to_vec(),
        r,
    })
}

/// Verify a confidential-asset signature.
///
/// Same contract as [`crate::verify()`], with response rows of width `m + 2`.
pub fn verify_confidential_asset(
    sig: &MlsagSig,
    ring: &ConfidentialRing,
    message: &[u8; 32],
) -> Result<bool, MlsagError> {
    check_shape(sig, ring.size(), ring.width(), ColumnLayout::ConfidentialAsset)?;
    check_key_images(sig)?;

    let chain = Chain::new(message, &ring.columns, &sig.key_images);
    Ok(chain.verify(&sig.c, &sig.r))
}
