//! # Mapforge: Exhaustive Mapping Search for Tensor Accelerators
//!
//! Mapforge explores the discrete space of ways to schedule a tensor
//! workload onto a storage hierarchy: it enumerates every candidate
//! mapping, filters out illegal combinations, scores legal ones with an
//! analytic cost model, and keeps the single best mapping found.
//!
//! ## Core Modules
//!
//! - **[`mapspace`]**: The four-dimensional mapping space (factorization,
//!   permutation, spatial distribution, datatype bypass) and its coordinate
//!   encoding.
//! - **[`model`]**: The analytic cost model producing per-level evaluation
//!   statuses and energy/utilization metrics.
//! - **[`mapper`]**: The exhaustive search loop and best-mapping tracker.
//! - **[`report`]**: Best-mapping artifacts and the console summary.

pub mod core;
pub mod error;
pub mod ert;
pub mod mapper;
pub mod mapspace;
pub mod model;
pub mod report;

pub use crate::core::arch::ArchSpecs;
pub use crate::core::config::RootConfig;
pub use crate::core::workload::{DataSpace, Workload};
pub use crate::error::MapforgeError;
pub use crate::mapper::{BestMapping, BestTracker, ExhaustiveMapper, SearchOutcome};
pub use crate::mapspace::{
    Dimension, DimensionSizes, MapSpace, Mapping, MappingId, TiledMapSpace,
};
pub use crate::model::{CostModelEngine, Engine, EvalStatus};
