// src/core/arch.rs

use serde::{Deserialize, Serialize};

/// The innermost compute level of the topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArithmeticSpecs {
    pub name: String,
    /// Energy per operation, pJ.
    pub energy_per_op: f64,
}

/// One storage level. Levels are listed innermost-first in
/// [`ArchSpecs::storage`]; the last entry is the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLevel {
    pub name: String,
    /// Capacity in words of any data space; 0 means unbounded.
    pub entries: u64,
    /// Energy per access, pJ.
    pub energy_per_access: f64,
    /// Instances of the next-inner level fed by one instance of this level.
    /// Spatial loops at this level distribute across that fanout.
    pub fanout: u64,
}

/// The architecture specification the cost model scores mappings against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchSpecs {
    pub name: String,
    pub arithmetic: ArithmeticSpecs,
    pub storage: Vec<StorageLevel>,
}

impl ArchSpecs {
    pub fn num_levels(&self) -> usize {
        self.storage.len()
    }

    pub fn level_names(&self) -> Vec<String> {
        self.storage.iter().map(|s| s.name.clone()).collect()
    }

    /// Product of every storage level's fanout: the total number of
    /// arithmetic instances the mapping can occupy.
    pub fn total_fanout(&self) -> u128 {
        self.storage
            .iter()
            .fold(1u128, |acc, s| acc.saturating_mul(s.fanout.max(1) as u128))
    }

    /// 16-PE scratchpad array with a shared buffer and DRAM backing store.
    pub fn pe_array_16() -> Self {
        Self {
            name: "pe_array_16".to_string(),
            arithmetic: ArithmeticSpecs {
                name: "MACC".to_string(),
                energy_per_op: 0.56,
            },
            storage: vec![
                StorageLevel {
                    name: "RegisterFile".to_string(),
                    entries: 64,
                    energy_per_access: 0.15,
                    fanout: 1,
                },
                StorageLevel {
                    name: "GlobalBuffer".to_string(),
                    entries: 65536,
                    energy_per_access: 2.4,
                    fanout: 16,
                },
                StorageLevel {
                    name: "DRAM".to_string(),
                    entries: 0,
                    energy_per_access: 120.0,
                    fanout: 1,
                },
            ],
        }
    }

    /// Minimal two-level rig: one bounded buffer over an unbounded backing
    /// store. Used by tests and smoke configs.
    pub fn buffer_pair(buffer_entries: u64, fanout: u64) -> Self {
        Self {
            name: "buffer_pair".to_string(),
            arithmetic: ArithmeticSpecs {
                name: "MACC".to_string(),
                energy_per_op: 0.5,
            },
            storage: vec![
                StorageLevel {
                    name: "Buffer".to_string(),
                    entries: buffer_entries,
                    energy_per_access: 1.0,
                    fanout,
                },
                StorageLevel {
                    name: "DRAM".to_string(),
                    entries: 0,
                    energy_per_access: 10.0,
                    fanout: 1,
                },
            ],
        }
    }
}
