// src/mapspace/id.rs

use serde::{Deserialize, Serialize};

use crate::error::MapforgeError;

/// The four independent axes of the mapping space, listed in enumeration
/// nesting order: IndexFactorization varies slowest, DatatypeBypass fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    IndexFactorization,
    LoopPermutation,
    Spatial,
    DatatypeBypass,
}

impl Dimension {
    pub const COUNT: usize = 4;

    pub const ALL: [Dimension; Dimension::COUNT] = [
        Dimension::IndexFactorization,
        Dimension::LoopPermutation,
        Dimension::Spatial,
        Dimension::DatatypeBypass,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Per-dimension cardinalities of the mapping space, fixed for a run.
///
/// `u128` is the configuration-time bound on each dimension size and on the
/// product of all four; spaces that overflow it are rejected up front.
pub type DimensionSizes = [u128; Dimension::COUNT];

/// A coordinate in the mapping space: exactly one value per dimension.
/// Rebuilt on every search iteration and never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingId {
    sizes: DimensionSizes,
    values: [u128; Dimension::COUNT],
}

impl MappingId {
    pub fn new(sizes: DimensionSizes) -> Self {
        Self {
            sizes,
            values: [0; Dimension::COUNT],
        }
    }

    /// Records `value` for `dim`. Fails when the value lies outside the
    /// dimension's declared size; a failed set has no other observable
    /// effect.
    pub fn set(&mut self, dim: Dimension, value: u128) -> Result<(), MapforgeError> {
        let size = self.sizes[dim.index()];
        if value >= size {
            return Err(MapforgeError::InvalidCoordinate {
                dimension: dim,
                value,
                size,
            });
        }
        self.values[dim.index()] = value;
        Ok(())
    }

    pub fn get(&self, dim: Dimension) -> u128 {
        self.values[dim.index()]
    }

    pub fn values(&self) -> [u128; Dimension::COUNT] {
        self.values
    }

    pub fn sizes(&self) -> DimensionSizes {
        self.sizes
    }
}
