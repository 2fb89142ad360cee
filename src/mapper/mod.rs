// src/mapper/mod.rs — the exhaustive search loop and best tracking

use tracing::info;

use crate::core::workload::Workload;
use crate::error::MapforgeError;
use crate::mapspace::{Dimension, MapSpace, Mapping, MappingId};
use crate::model::{CostModelEngine, Topology};

/// The best legal, successfully evaluated candidate seen so far: the
/// mapping plus a snapshot of the engine's statistics for it.
#[derive(Debug, Clone)]
pub struct BestMapping {
    pub coordinate: [u128; Dimension::COUNT],
    pub mapping: Mapping,
    pub energy: f64,
    pub utilization: f64,
    pub topology: Topology,
}

/// Online record of the best candidate. An explicit value owned by the
/// search loop, never process-wide state. Replaced only on strict energy
/// improvement, so ties keep the earlier-enumerated candidate; once set,
/// the recorded energy never increases for the remainder of the run.
#[derive(Debug, Clone, Default)]
pub struct BestTracker {
    best: Option<BestMapping>,
}

impl BestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a successfully evaluated candidate; returns whether it
    /// replaced the incumbent.
    pub fn observe<E: CostModelEngine>(
        &mut self,
        coordinate: [u128; Dimension::COUNT],
        mapping: &Mapping,
        engine: &E,
    ) -> bool {
        let improved = match &self.best {
            None => true,
            Some(incumbent) => engine.energy() < incumbent.energy,
        };
        if improved {
            self.best = Some(BestMapping {
                coordinate,
                mapping: mapping.clone(),
                energy: engine.energy(),
                utilization: engine.utilization(),
                topology: engine.topology().clone(),
            });
        }
        improved
    }

    pub fn best(&self) -> Option<&BestMapping> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<BestMapping> {
        self.best
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    /// Coordinates visited: always the full product of dimension sizes.
    pub candidates_visited: u128,
    /// Coordinates that denoted a legal mapping.
    pub mappings_constructed: u128,
    /// Legal mappings whose evaluation succeeded at every level.
    pub evaluations_succeeded: u128,
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub best: Option<BestMapping>,
    pub stats: SearchStats,
}

/// Exhaustive mapper: visits every coordinate of the product space in the
/// fixed nesting order IndexFactorization → LoopPermutation → Spatial →
/// DatatypeBypass (outermost to innermost). No pruning, no early exit, no
/// parallelism; a fresh engine value is reused and overwritten on every
/// evaluation attempt.
pub struct ExhaustiveMapper<M: MapSpace, E: CostModelEngine> {
    mapspace: M,
    engine: E,
    workload: Workload,
}

impl<M: MapSpace, E: CostModelEngine> ExhaustiveMapper<M, E> {
    pub fn new(mapspace: M, engine: E, workload: Workload) -> Self {
        Self {
            mapspace,
            engine,
            workload,
        }
    }

    pub fn run(&mut self) -> Result<SearchOutcome, MapforgeError> {
        let sizes = self.mapspace.all_sizes();
        info!(
            index_factorization = %sizes[Dimension::IndexFactorization.index()],
            loop_permutation = %sizes[Dimension::LoopPermutation.index()],
            spatial = %sizes[Dimension::Spatial.index()],
            datatype_bypass = %sizes[Dimension::DatatypeBypass.index()],
            "mapspace dimension sizes"
        );

        let mut best = BestTracker::new();
        let mut stats = SearchStats::default();

        for i in 0..sizes[Dimension::IndexFactorization.index()] {
            for j in 0..sizes[Dimension::LoopPermutation.index()] {
                for k in 0..sizes[Dimension::Spatial.index()] {
                    for l in 0..sizes[Dimension::DatatypeBypass.index()] {
                        let mut id = MappingId::new(sizes);
                        id.set(Dimension::IndexFactorization, i)?;
                        id.set(Dimension::LoopPermutation, j)?;
                        id.set(Dimension::Spatial, k)?;
                        id.set(Dimension::DatatypeBypass, l)?;
                        stats.candidates_visited += 1;

                        // The legal subset is sparse: a failed construction
                        // is a skip, not an error, and is not logged.
                        let Some(mapping) = self.mapspace.construct_mapping(&id) else {
                            continue;
                        };
                        stats.mappings_constructed += 1;

                        let status = self.engine.evaluate(&mapping, &self.workload);
                        if !status.iter().all(|s| s.success) {
                            continue;
                        }
                        stats.evaluations_succeeded += 1;

                        best.observe(id.values(), &mapping, &self.engine);
                    }
                }
            }
        }

        info!(
            visited = %stats.candidates_visited,
            constructed = %stats.mappings_constructed,
            evaluated = %stats.evaluations_succeeded,
            "search complete"
        );
        Ok(SearchOutcome {
            best: best.into_best(),
            stats,
        })
    }
}
