//! The validated ring of candidate public keys.

use std::collections::HashMap;

use umbra_crypto::{encode_point, Point};

use crate::MlsagError;

/// Largest number of keys per row; the width is encoded in a single byte.
pub const MAX_RING_WIDTH: usize = u8::MAX as usize;

/// An `n × m` matrix of public keys: one row is the real signer's keys, the
/// others are decoys.
///
/// A `Ring` can only be obtained through [`Ring::new`], so every instance is
/// non-empty, rectangular, at most [`MAX_RING_WIDTH`] columns wide and free of
/// duplicate rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    rows: Vec<Vec<Point>>,
}

impl Ring {
    /// Validate and wrap a matrix of public keys.
    pub fn new(rows: Vec<Vec<Point>>) -> Result<Self, MlsagError> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| MlsagError::ShapeMismatch("ring has no rows".into()))?;

        if width == 0 || width > MAX_RING_WIDTH {
            return Err(MlsagError::ShapeMismatch(format!(
                "ring width {} outside 1..={}",
                width, MAX_RING_WIDTH
            )));
        }

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(MlsagError::ShapeMismatch(format!(
                "row {} has {} keys, expected {}",
                index,
                row.len(),
                width
            )));
        }

        let mut seen: HashMap<Vec<[u8; 32]>, usize> = HashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let encoded: Vec<[u8; 32]> = row.iter().map(encode_point).collect();
            if let Some(&first) = seen.get(&encoded) {
                return Err(MlsagError::DuplicateRow { first, second: index });
            }
            seen.insert(encoded, index);
        }

        Ok(Self { rows })
    }

    /// Number of rows `n`.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Number of keys per row `m`.
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<Point>] {
        &self.rows
    }

    /// One row, if `index < n`.
    pub fn row(&self, index: usize) -> Option<&[Point]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Consume the ring, returning the raw matrix.
    pub fn into_rows(self) -> Vec<Vec<Point>> {
        self.rows
    }
}
