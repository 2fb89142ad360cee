// src/model/topology.rs

use serde::Serialize;

use crate::core::workload::DataSpace;

/// Statistics for one storage level of an evaluated mapping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelStats {
    pub name: String,
    /// Words occupied per data space (zero when bypassed).
    pub tile_entries: [u128; DataSpace::COUNT],
    pub accesses: [u128; DataSpace::COUNT],
    /// Access energy at this level, pJ.
    pub energy: f64,
}

impl LevelStats {
    pub fn total_accesses(&self) -> u128 {
        self.accesses
            .iter()
            .fold(0u128, |acc, &a| acc.saturating_add(a))
    }
}

/// Full statistics snapshot for one evaluated mapping, innermost level
/// first. Retained by the best tracker for reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Topology {
    pub levels: Vec<LevelStats>,
    /// Total operation count of the workload.
    pub maccs: u128,
    /// Arithmetic energy, pJ.
    pub compute_energy: f64,
}

impl Topology {
    pub fn total_energy(&self) -> f64 {
        self.levels.iter().map(|l| l.energy).sum::<f64>() + self.compute_energy
    }
}
