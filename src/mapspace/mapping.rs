// src/mapspace/mapping.rs

use serde::Serialize;

use crate::core::workload::DataSpace;

/// One loop of a per-level nest. `dim` indexes the workload's dimension
/// list; spatial loops distribute across the level's fanout instead of
/// iterating in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLoop {
    pub dim: usize,
    pub bound: u64,
    pub spatial: bool,
}

/// The slice of the nest owned by one storage level, plus its bypass mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelNest {
    pub storage: String,
    /// Outermost-first within the level.
    pub loops: Vec<TileLoop>,
    /// Keep flag per data space; bypassed data streams through the level.
    pub keep: [bool; DataSpace::COUNT],
}

/// A concrete candidate mapping: one nest slice per storage level,
/// innermost level first. Produced only by a map space; a pure function of
/// (coordinate, space configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub levels: Vec<LevelNest>,
}

impl Mapping {
    /// Tile factor of workload dimension `dim` at storage level `level`.
    pub fn factor(&self, level: usize, dim: usize) -> u64 {
        self.levels[level]
            .loops
            .iter()
            .filter(|l| l.dim == dim)
            .map(|l| l.bound)
            .product()
    }

    /// Cumulative tile bound of `dim` across levels `0..=level`.
    pub fn tile_bound(&self, level: usize, dim: usize) -> u128 {
        (0..=level).fold(1u128, |acc, l| {
            acc.saturating_mul(self.factor(l, dim) as u128)
        })
    }

    /// Product of every spatial loop bound across all levels.
    pub fn spatial_product(&self) -> u128 {
        self.levels
            .iter()
            .flat_map(|nest| &nest.loops)
            .filter(|l| l.spatial)
            .fold(1u128, |acc, l| acc.saturating_mul(l.bound as u128))
    }

    /// Product of the temporal loop bounds of every level strictly above
    /// `level`: how many times the level's tile is refilled.
    pub fn temporal_trips_above(&self, level: usize) -> u128 {
        self.levels[level + 1..]
            .iter()
            .flat_map(|nest| &nest.loops)
            .filter(|l| !l.spatial)
            .fold(1u128, |acc, l| acc.saturating_mul(l.bound as u128))
    }
}
