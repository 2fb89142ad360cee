// src/model/engine.rs

use crate::core::arch::ArchSpecs;
use crate::core::workload::{DataSpace, Workload};
use crate::mapspace::Mapping;

use super::topology::{LevelStats, Topology};
use super::{CostModelEngine, EvalStatus};

/// Analytic cost model.
///
/// Scores a mapping from closed-form access counts: each level's tile
/// footprint per data space comes from the cumulative tile factors under
/// the data space's projection, and the level is refilled once per
/// temporal iteration of the levels above it. The innermost level keeping
/// a data space additionally serves one access per operation, so bypassing
/// cheap inner storage pushes operand traffic out to expensive levels.
/// One engine value is reused across search iterations; every evaluation
/// attempt overwrites the previous state.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    specs: Option<ArchSpecs>,
    evaluated: bool,
    energy: f64,
    utilization: f64,
    topology: Topology,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_specs(specs: ArchSpecs) -> Self {
        Self {
            specs: Some(specs),
            ..Self::default()
        }
    }
}

impl CostModelEngine for Engine {
    fn evaluate(&mut self, mapping: &Mapping, workload: &Workload) -> Vec<EvalStatus> {
        self.evaluated = false;
        self.energy = 0.0;
        self.utilization = 0.0;
        self.topology = Topology::default();

        let specs = match &self.specs {
            Some(s) => s.clone(),
            None => {
                return vec![EvalStatus::fail(
                    "<engine>",
                    "no architecture specification bound",
                )]
            }
        };

        let levels = specs.num_levels();
        if mapping.levels.len() != levels {
            return vec![EvalStatus::fail(
                "<engine>",
                format!(
                    "mapping has {} levels, architecture has {}",
                    mapping.levels.len(),
                    levels
                ),
            )];
        }
        let mut statuses = Vec::with_capacity(levels);
        let mut stats = Vec::with_capacity(levels);
        let mut all_ok = true;

        let maccs = workload.maccs();
        // Innermost level keeping each data space: it serves the arithmetic.
        let innermost_kept: [Option<usize>; DataSpace::COUNT] = {
            let mut innermost = [None; DataSpace::COUNT];
            for ds in DataSpace::ALL {
                innermost[ds.index()] =
                    (0..levels).find(|&l| mapping.levels[l].keep[ds.index()]);
            }
            innermost
        };

        for l in 0..levels {
            let level = &specs.storage[l];
            let nest = &mapping.levels[l];

            let mut tile = [0u128; DataSpace::COUNT];
            for ds in DataSpace::ALL {
                tile[ds.index()] = workload.projections[ds.index()]
                    .iter()
                    .fold(1u128, |acc, &d| acc.saturating_mul(mapping.tile_bound(l, d)));
            }

            let kept_words: u128 = DataSpace::ALL
                .iter()
                .filter(|ds| nest.keep[ds.index()])
                .fold(0u128, |acc, ds| acc.saturating_add(tile[ds.index()]));

            if level.entries != 0 && kept_words > level.entries as u128 {
                statuses.push(EvalStatus::fail(
                    level.name.clone(),
                    format!(
                        "tile footprint {} words exceeds capacity {}",
                        kept_words, level.entries
                    ),
                ));
                all_ok = false;
            } else {
                statuses.push(EvalStatus::pass(level.name.clone()));
            }

            let trips = mapping.temporal_trips_above(l);
            let mut accesses = [0u128; DataSpace::COUNT];
            for ds in DataSpace::ALL {
                if nest.keep[ds.index()] {
                    let mut count = tile[ds.index()].saturating_mul(trips);
                    if innermost_kept[ds.index()] == Some(l) {
                        count = count.saturating_add(maccs);
                    }
                    accesses[ds.index()] = count;
                }
            }
            let total: u128 = accesses
                .iter()
                .fold(0u128, |acc, &a| acc.saturating_add(a));
            stats.push(LevelStats {
                name: level.name.clone(),
                tile_entries: {
                    let mut kept_tiles = [0u128; DataSpace::COUNT];
                    for ds in DataSpace::ALL {
                        if nest.keep[ds.index()] {
                            kept_tiles[ds.index()] = tile[ds.index()];
                        }
                    }
                    kept_tiles
                },
                accesses,
                energy: total as f64 * level.energy_per_access,
            });
        }

        if !all_ok {
            return statuses;
        }

        let compute_energy = maccs as f64 * specs.arithmetic.energy_per_op;
        let access_energy: f64 = stats.iter().map(|s: &LevelStats| s.energy).sum();

        self.topology = Topology {
            levels: stats,
            maccs,
            compute_energy,
        };
        self.energy = access_energy + compute_energy;
        self.utilization = mapping.spatial_product() as f64 / specs.total_fanout() as f64;
        self.evaluated = true;
        statuses
    }

    fn is_specced(&self) -> bool {
        self.specs.is_some()
    }

    fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    fn energy(&self) -> f64 {
        self.energy
    }

    fn utilization(&self) -> f64 {
        self.utilization
    }

    fn topology(&self) -> &Topology {
        &self.topology
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arch::ArchSpecs;
    use crate::core::workload::{DataSpace, Workload};
    use crate::mapspace::{LevelNest, Mapping, TileLoop};
    use crate::model::CostModelEngine;

    /// All tile factors at the buffer level, unit loops at DRAM, everything
    /// kept everywhere.
    fn flat_mapping(bounds: &[u64]) -> Mapping {
        let inner = LevelNest {
            storage: "Buffer".to_string(),
            loops: bounds
                .iter()
                .enumerate()
                .map(|(dim, &bound)| TileLoop {
                    dim,
                    bound,
                    spatial: false,
                })
                .collect(),
            keep: [true; DataSpace::COUNT],
        };
        let outer = LevelNest {
            storage: "DRAM".to_string(),
            loops: bounds
                .iter()
                .enumerate()
                .map(|(dim, _)| TileLoop {
                    dim,
                    bound: 1,
                    spatial: false,
                })
                .collect(),
            keep: [true; DataSpace::COUNT],
        };
        Mapping {
            levels: vec![inner, outer],
        }
    }

    #[test]
    fn test_analytic_energy() {
        let workload = Workload::gemm(2, 2, 2);
        let mut engine = Engine::with_specs(ArchSpecs::buffer_pair(16, 1));
        let mapping = flat_mapping(&[2, 2, 2]);

        let statuses = engine.evaluate(&mapping, &workload);
        assert!(statuses.iter().all(|s| s.success));
        assert!(engine.is_evaluated());
        // Footprints: 4 words per data space at each level. Buffer fills:
        // 12 accesses, plus 8 operand accesses per data space (24) since it
        // is the innermost keeper of all three; DRAM fills: 12 accesses at
        // 10.0 pJ; compute: 8 MACCs at 0.5 pJ.
        assert_eq!(engine.energy(), 36.0 + 120.0 + 4.0);
        assert_eq!(engine.utilization(), 1.0);
        assert_eq!(engine.topology().maccs, 8);
    }

    #[test]
    fn test_capacity_failure() {
        let workload = Workload::gemm(2, 2, 2);
        let mut engine = Engine::with_specs(ArchSpecs::buffer_pair(8, 1));
        let mapping = flat_mapping(&[2, 2, 2]);

        let statuses = engine.evaluate(&mapping, &workload);
        assert!(!statuses[0].success);
        assert!(statuses[0].detail.contains("exceeds capacity"));
        assert!(statuses[1].success);
        assert!(!engine.is_evaluated());
    }

    #[test]
    fn test_unspecced_engine_fails_evaluation() {
        let workload = Workload::gemm(2, 2, 2);
        let mut engine = Engine::new();
        assert!(!engine.is_specced());
        let statuses = engine.evaluate(&flat_mapping(&[2, 2, 2]), &workload);
        assert_eq!(statuses.len(), 1);
        assert!(!statuses[0].success);
    }
}
