//! # Core Specifications
//!
//! The run inputs the mapper consumes, independent of any search strategy.
//!
//! - **[`workload`]:** The loop-nest shape being mapped and its data spaces.
//! - **[`arch`]:** The storage hierarchy and arithmetic specification.
//! - **[`config`]:** The fully-resolved run configuration and its loading.

pub mod arch;
pub mod config;
pub mod workload;
