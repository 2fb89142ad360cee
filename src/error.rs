// src/error.rs — Error types for mapforge

use thiserror::Error;

use crate::mapspace::Dimension;

#[derive(Error, Debug)]
pub enum MapforgeError {
    // Coordinate construction
    #[error("invalid coordinate: value {value} out of range for dimension {dimension:?} (size {size})")]
    InvalidCoordinate {
        dimension: Dimension,
        value: u128,
        size: u128,
    },

    // Startup / configuration (fatal tier)
    #[error("found neither \"mapspace\" nor \"mapspace_constraints\" directive; to run the mapper without any constraints, set mapspace_constraints to an empty list []")]
    MissingMapSpace,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("energy table error: {0}")]
    EnergyTable(String),

    #[error("failed to write report {path}: {source}")]
    Report {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}
