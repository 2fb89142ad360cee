// src/mapspace/mod.rs

pub mod id;
pub mod mapping;

pub use id::{Dimension, DimensionSizes, MappingId};
pub use mapping::{LevelNest, Mapping, TileLoop};

use crate::core::arch::ArchSpecs;
use crate::core::config::{ConstraintConfig, ConstraintKind};
use crate::core::workload::{DataSpace, Workload};
use crate::error::MapforgeError;

/// The search loop's view of a mapping space. `size` and `all_sizes` are
/// deterministic and fixed for the run; `construct_mapping` is a pure
/// function of the coordinate and the space's configuration.
pub trait MapSpace {
    fn size(&self, dim: Dimension) -> u128;
    fn all_sizes(&self) -> DimensionSizes;
    /// `None` marks an illegal coordinate: a skip signal, not an error.
    /// The legal subset of the product space is sparse.
    fn construct_mapping(&self, id: &MappingId) -> Option<Mapping>;
}

pub(crate) fn factorial(n: usize) -> u128 {
    (1..=n as u128).product()
}

/// All ordered ways of writing `n` as a product of `levels` factors.
fn ordered_factorizations(n: u64, levels: usize) -> Vec<Vec<u64>> {
    if levels == 1 {
        return vec![vec![n]];
    }
    let mut out = Vec::new();
    for d in 1..=n {
        if n % d != 0 {
            continue;
        }
        for rest in ordered_factorizations(n / d, levels - 1) {
            let mut f = Vec::with_capacity(levels);
            f.push(d);
            f.extend(rest);
            out.push(f);
        }
    }
    out
}

/// Decodes `index` into the index-th permutation of `0..items`
/// (factorial number system; index must be < items!).
fn nth_permutation(mut index: u128, items: usize) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..items).collect();
    let mut result = Vec::with_capacity(items);
    for i in (0..items).rev() {
        let f = factorial(i);
        let pos = (index / f) as usize;
        index %= f;
        result.push(pool.remove(pos));
    }
    result
}

fn checked_product(values: impl Iterator<Item = u128>) -> Result<u128, MapforgeError> {
    let mut acc: u128 = 1;
    for v in values {
        acc = acc.checked_mul(v).ok_or_else(|| {
            MapforgeError::Config("mapping space size exceeds the u128 bound".to_string())
        })?;
    }
    Ok(acc)
}

/// Per-level constraint set, compiled from the config section.
#[derive(Debug, Clone)]
struct LevelConstraint {
    perm_prefix: Option<Vec<usize>>,
    pinned_factors: Vec<(usize, u64)>,
    forced_keep: [Option<bool>; DataSpace::COUNT],
}

impl Default for LevelConstraint {
    fn default() -> Self {
        Self {
            perm_prefix: None,
            pinned_factors: Vec::new(),
            forced_keep: [None; DataSpace::COUNT],
        }
    }
}

/// The concrete tiled mapping space: per-dimension ordered factorizations
/// across storage levels, per-level loop permutations, spatial split
/// positions, and per-(level, data space) bypass bits.
pub struct TiledMapSpace {
    workload: Workload,
    arch: ArchSpecs,
    /// `factor_choices[dim][choice][level]`: every ordered factorization
    /// of each workload dimension's bound.
    factor_choices: Vec<Vec<Vec<u64>>>,
    /// Storage levels with fanout > 1, ascending.
    spatial_levels: Vec<usize>,
    constraints: Vec<LevelConstraint>,
    sizes: DimensionSizes,
}

// Workload dimensionality cap: (D!)^levels must stay well inside u128.
const MAX_DIMS: usize = 16;

impl TiledMapSpace {
    pub fn new(
        workload: Workload,
        arch: ArchSpecs,
        constraints: &[ConstraintConfig],
    ) -> Result<Self, MapforgeError> {
        let dims = workload.num_dims();
        let levels = arch.num_levels();
        if dims == 0 || levels == 0 {
            return Err(MapforgeError::Config(
                "mapping space needs at least one dimension and one storage level".to_string(),
            ));
        }
        if dims > MAX_DIMS {
            return Err(MapforgeError::Config(format!(
                "workload has {dims} dimensions; at most {MAX_DIMS} are supported"
            )));
        }

        let factor_choices: Vec<Vec<Vec<u64>>> = workload
            .dims
            .iter()
            .map(|d| ordered_factorizations(d.size, levels))
            .collect();

        let spatial_levels: Vec<usize> = arch
            .storage
            .iter()
            .enumerate()
            .filter(|(_, s)| s.fanout > 1)
            .map(|(l, _)| l)
            .collect();

        let compiled = Self::compile_constraints(&workload, &arch, constraints)?;

        let if_size = checked_product(factor_choices.iter().map(|c| c.len() as u128))?;
        let perm_size = checked_product((0..levels).map(|_| factorial(dims)))?;
        let spatial_size =
            checked_product(spatial_levels.iter().map(|_| (dims + 1) as u128))?;
        let bypass_bits = levels * DataSpace::COUNT;
        if bypass_bits >= 128 {
            return Err(MapforgeError::Config(
                "mapping space size exceeds the u128 bound".to_string(),
            ));
        }
        let bypass_size = 1u128 << bypass_bits;

        Ok(Self {
            workload,
            arch,
            factor_choices,
            spatial_levels,
            constraints: compiled,
            sizes: [if_size, perm_size, spatial_size, bypass_size],
        })
    }

    fn compile_constraints(
        workload: &Workload,
        arch: &ArchSpecs,
        constraints: &[ConstraintConfig],
    ) -> Result<Vec<LevelConstraint>, MapforgeError> {
        let mut compiled = vec![LevelConstraint::default(); arch.num_levels()];
        for c in constraints {
            let level = arch
                .storage
                .iter()
                .position(|s| s.name == c.target)
                .ok_or_else(|| {
                    MapforgeError::Config(format!(
                        "constraint targets unknown storage level {}",
                        c.target
                    ))
                })?;
            let slot = &mut compiled[level];
            match &c.kind {
                ConstraintKind::Permutation { order } => {
                    if order.len() > workload.num_dims() {
                        return Err(MapforgeError::Config(format!(
                            "permutation constraint on {} names more loops than the workload has",
                            c.target
                        )));
                    }
                    let mut prefix = Vec::with_capacity(order.len());
                    for name in order {
                        let idx = workload.dim_index(name).ok_or_else(|| {
                            MapforgeError::Config(format!(
                                "permutation constraint names unknown dimension {name}"
                            ))
                        })?;
                        prefix.push(idx);
                    }
                    slot.perm_prefix = Some(prefix);
                }
                ConstraintKind::Factors { factors } => {
                    for (name, factor) in factors {
                        let idx = workload.dim_index(name).ok_or_else(|| {
                            MapforgeError::Config(format!(
                                "factor constraint names unknown dimension {name}"
                            ))
                        })?;
                        slot.pinned_factors.push((idx, *factor));
                    }
                }
                ConstraintKind::DatatypeBypass { keep, bypass } => {
                    for name in keep {
                        let ds = DataSpace::from_name(name).ok_or_else(|| {
                            MapforgeError::Config(format!("unknown data space {name}"))
                        })?;
                        slot.forced_keep[ds.index()] = Some(true);
                    }
                    for name in bypass {
                        let ds = DataSpace::from_name(name).ok_or_else(|| {
                            MapforgeError::Config(format!("unknown data space {name}"))
                        })?;
                        slot.forced_keep[ds.index()] = Some(false);
                    }
                }
            }
        }
        Ok(compiled)
    }

    pub fn workload(&self) -> &Workload {
        &self.workload
    }

    pub fn arch(&self) -> &ArchSpecs {
        &self.arch
    }
}

impl MapSpace for TiledMapSpace {
    fn size(&self, dim: Dimension) -> u128 {
        self.sizes[dim.index()]
    }

    fn all_sizes(&self) -> DimensionSizes {
        self.sizes
    }

    fn construct_mapping(&self, id: &MappingId) -> Option<Mapping> {
        let dims = self.workload.num_dims();
        let levels = self.arch.num_levels();

        // IndexFactorization: mixed-radix decode, first workload dim slowest.
        let mut rem = id.get(Dimension::IndexFactorization);
        let mut choice = vec![0usize; dims];
        for d in (0..dims).rev() {
            let cnt = self.factor_choices[d].len() as u128;
            choice[d] = (rem % cnt) as usize;
            rem /= cnt;
        }
        let factors: Vec<&Vec<u64>> = (0..dims)
            .map(|d| &self.factor_choices[d][choice[d]])
            .collect();

        // LoopPermutation: one Lehmer digit per level, innermost fastest.
        let fact = factorial(dims);
        let mut rem = id.get(Dimension::LoopPermutation);
        let mut perms = Vec::with_capacity(levels);
        for _ in 0..levels {
            perms.push(nth_permutation(rem % fact, dims));
            rem /= fact;
        }

        // Spatial: split position per fanout-bearing level, innermost fastest.
        let mut splits = vec![0usize; levels];
        let mut rem = id.get(Dimension::Spatial);
        let radix = (dims + 1) as u128;
        for &l in &self.spatial_levels {
            splits[l] = (rem % radix) as usize;
            rem /= radix;
        }

        // DatatypeBypass: one keep bit per (level, data space).
        let mask = id.get(Dimension::DatatypeBypass);
        let mut keep = vec![[false; DataSpace::COUNT]; levels];
        for (l, level_keep) in keep.iter_mut().enumerate() {
            for ds in 0..DataSpace::COUNT {
                level_keep[ds] = (mask >> (l * DataSpace::COUNT + ds)) & 1 == 1;
            }
        }

        // The backing store must keep every data space.
        if keep[levels - 1].iter().any(|k| !k) {
            return None;
        }

        // Spatial loops must fit the level's fanout.
        for l in 0..levels {
            if splits[l] == 0 {
                continue;
            }
            let spatial_prod = perms[l][..splits[l]]
                .iter()
                .fold(1u128, |acc, &d| acc.saturating_mul(factors[d][l] as u128));
            if spatial_prod > self.arch.storage[l].fanout as u128 {
                return None;
            }
        }

        // Constraint filters.
        for (l, c) in self.constraints.iter().enumerate() {
            if let Some(prefix) = &c.perm_prefix {
                if perms[l][..prefix.len()] != prefix[..] {
                    return None;
                }
            }
            for &(d, f) in &c.pinned_factors {
                if factors[d][l] != f {
                    return None;
                }
            }
            for ds in 0..DataSpace::COUNT {
                if let Some(required) = c.forced_keep[ds] {
                    if keep[l][ds] != required {
                        return None;
                    }
                }
            }
        }

        let mut level_nests = Vec::with_capacity(levels);
        for l in 0..levels {
            let loops = perms[l]
                .iter()
                .enumerate()
                .map(|(pos, &d)| TileLoop {
                    dim: d,
                    bound: factors[d][l],
                    spatial: pos < splits[l],
                })
                .collect();
            level_nests.push(LevelNest {
                storage: self.arch.storage[l].name.clone(),
                loops,
                keep: keep[l],
            });
        }
        Some(Mapping {
            levels: level_nests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_factorizations() {
        assert_eq!(ordered_factorizations(1, 2), vec![vec![1, 1]]);
        // 4 = 1*4 = 2*2 = 4*1
        assert_eq!(ordered_factorizations(4, 2).len(), 3);
        // 12 into 2 factors: one per divisor of 12.
        assert_eq!(ordered_factorizations(12, 2).len(), 6);
        for f in ordered_factorizations(12, 3) {
            assert_eq!(f.iter().product::<u64>(), 12);
            assert_eq!(f.len(), 3);
        }
    }

    #[test]
    fn test_nth_permutation_covers_all() {
        assert_eq!(nth_permutation(0, 3), vec![0, 1, 2]);
        let mut seen: Vec<Vec<usize>> = (0..factorial(3)).map(|i| nth_permutation(i, 3)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(5), 120);
    }
}
