//! The MLSAG signature value and its byte, hex and serde encodings.
//!
//! # Format
//! ```text
//! [m:1][c:32][key_images: m×32][r: n×w×32, row-major]
//! ```
//!
//! `w` is `m` for plain signatures and `m + 2` for confidential-asset ones.
//! The encoding does not record which, so decoders take a [`ColumnLayout`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use umbra_crypto::{decode_point, decode_scalar, encode_point, encode_scalar, Point, Scalar, ELEMENT_LENGTH};

use crate::{ColumnLayout, MlsagError};

/// A multi-layer linkable ring signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlsagSig {
    /// Challenge entering row 0.
    pub c: Scalar,
    /// One key image per keyed column.
    pub key_images: Vec<Point>,
    /// Responses, one row per ring row.
    pub r: Vec<Vec<Scalar>>,
}

impl MlsagSig {
    /// Number of ring rows `n`.
    pub fn ring_size(&self) -> usize {
        self.r.len()
    }

    /// Number of keyed columns `m`.
    pub fn key_columns(&self) -> usize {
        self.key_images.len()
    }

    /// Serialize to bytes.
    ///
    /// Fails if the signature carries no key images or more than 255, or if
    /// `r` is not a non-empty rectangle of width `m` or `m + 2`. Anything
    /// else would not decode back to the same signature.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MlsagError> {
        let m = u8::try_from(self.key_images.len())
            .ok()
            .filter(|&m| m > 0)
            .ok_or_else(|| {
                MlsagError::SerializationError(format!(
                    "cannot encode {} key images",
                    self.key_images.len()
                ))
            })?;

        let width = self
            .r
            .first()
            .map(Vec::len)
            .ok_or_else(|| MlsagError::SerializationError("no response rows".into()))?;
        let plain = ColumnLayout::Plain.width(m as usize);
        let confidential = ColumnLayout::ConfidentialAsset.width(m as usize);
        if width != plain && width != confidential {
            return Err(MlsagError::SerializationError(format!(
                "response width {} fits neither {} nor {}",
                width, plain, confidential
            )));
        }
        if let Some(row) = self.r.iter().position(|row| row.len() != width) {
            return Err(MlsagError::SerializationError(format!(
                "response row {} has width {}, expected {}",
                row,
                self.r[row].len(),
                width
            )));
        }

        let responses: usize = self.r.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(1 + ELEMENT_LENGTH * (1 + self.key_images.len() + responses));

        bytes.push(m);
        bytes.extend_from_slice(&encode_scalar(&self.c));
        for key_image in &self.key_images {
            bytes.extend_from_slice(&encode_point(key_image));
        }
        for response in self.r.iter().flatten() {
            bytes.extend_from_slice(&encode_scalar(response));
        }

        Ok(bytes)
    }

    /// Deserialize a plain signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MlsagError> {
        Self::from_bytes_with_layout(bytes, ColumnLayout::Plain)
    }

    /// Deserialize a signature whose response rows follow `layout`.
    ///
    /// Requires `m ≥ 1`, a length of exactly `1 + 32·(1 + m + n·w)` for some
    /// `n ≥ 1`, canonical scalars and decodable key images. Key images are not
    /// subgroup-checked here; verification does that.
    pub fn from_bytes_with_layout(bytes: &[u8], layout: ColumnLayout) -> Result<Self, MlsagError> {
        let (&m, rest) = bytes
            .split_first()
            .ok_or_else(|| MlsagError::SerializationError("empty input".into()))?;
        let m = m as usize;

        if m == 0 {
            return Err(MlsagError::SerializationError("zero key images".into()));
        }

        let width = layout.width(m);
        let header = ELEMENT_LENGTH * (1 + m);
        let row_bytes = ELEMENT_LENGTH * width;

        if rest.len() <= header || (rest.len() - header) % row_bytes != 0 {
            return Err(MlsagError::SerializationError(format!(
                "length {} is not 1 + 32·(1 + {} + n·{}) for any n ≥ 1",
                bytes.len(),
                m,
                width
            )));
        }

        let (c_bytes, rest) = rest.split_at(ELEMENT_LENGTH);
        let (image_bytes, response_bytes) = rest.split_at(ELEMENT_LENGTH * m);

        let c = decode_scalar(c_bytes).map_err(|e| MlsagError::SerializationError(e.to_string()))?;

        let key_images = image_bytes
            .chunks_exact(ELEMENT_LENGTH)
            .map(|chunk| decode_point(chunk).map_err(|e| MlsagError::SerializationError(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        let r = response_bytes
            .chunks_exact(row_bytes)
            .map(|row| {
                row.chunks_exact(ELEMENT_LENGTH)
                    .map(|chunk| {
                        decode_scalar(chunk).map_err(|e| MlsagError::SerializationError(e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { c, key_images, r })
    }

    /// Lowercase hex of [`MlsagSig::to_bytes`].
    pub fn to_hex(&self) -> Result<String, MlsagError> {
        self.to_bytes().map(hex::encode)
    }

    /// Parse a plain signature from hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, MlsagError> {
        Self::from_hex_with_layout(hex_str, ColumnLayout::Plain)
    }

    /// Parse a signature from hex with an explicit layout.
    pub fn from_hex_with_layout(hex_str: &str, layout: ColumnLayout) -> Result<Self, MlsagError> {
        let bytes = hex::decode(hex_str).map_err(|e| MlsagError::SerializationError(e.to_string()))?;
        Self::from_bytes_with_layout(&bytes, layout)
    }
}

impl Serialize for MlsagSig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = self.to_hex().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

/// Deserializes the plain layout; use [`serde_confidential`] for
/// confidential-asset signatures.
impl<'de> Deserialize<'de> for MlsagSig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MlsagSig::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde module for confidential-asset signatures as hex strings.
pub mod serde_confidential {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::MlsagSig;
    use crate::ColumnLayout;

    pub fn serialize<S>(sig: &MlsagSig, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        sig.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<MlsagSig, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MlsagSig::from_hex_with_layout(&s, ColumnLayout::ConfidentialAsset)
            .map_err(serde::de::Error::custom)
    }
}
