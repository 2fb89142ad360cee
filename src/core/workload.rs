// src/core/workload.rs

use serde::{Deserialize, Serialize};

/// One of the three operand/result tensors of the workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSpace {
    Weights,
    Inputs,
    Outputs,
}

impl DataSpace {
    pub const COUNT: usize = 3;

    pub const ALL: [DataSpace; DataSpace::COUNT] =
        [DataSpace::Weights, DataSpace::Inputs, DataSpace::Outputs];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DataSpace::Weights => "Weights",
            DataSpace::Inputs => "Inputs",
            DataSpace::Outputs => "Outputs",
        }
    }

    pub fn from_name(name: &str) -> Option<DataSpace> {
        match name {
            "Weights" => Some(DataSpace::Weights),
            "Inputs" => Some(DataSpace::Inputs),
            "Outputs" => Some(DataSpace::Outputs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadDim {
    pub name: String,
    pub size: u64,
}

/// The loop-nest shape being mapped: ordered dimensions with bounds, plus
/// the projection of each data space onto those dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    pub dims: Vec<WorkloadDim>,
    /// Per data space, indices into `dims` that determine its footprint.
    pub projections: [Vec<usize>; DataSpace::COUNT],
}

impl Workload {
    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// Total operation count: the product of every dimension bound.
    pub fn maccs(&self) -> u128 {
        self.dims
            .iter()
            .fold(1u128, |acc, d| acc.saturating_mul(d.size as u128))
    }

    pub fn dim_index(&self, name: &str) -> Option<usize> {
        self.dims.iter().position(|d| d.name == name)
    }

    /// Dense matrix multiply C[M,N] = A[M,K] x B[K,N].
    pub fn gemm(m: u64, n: u64, k: u64) -> Self {
        Self {
            name: format!("GEMM_M{}_N{}_K{}", m, n, k),
            dims: vec![
                WorkloadDim { name: "M".to_string(), size: m },
                WorkloadDim { name: "N".to_string(), size: n },
                WorkloadDim { name: "K".to_string(), size: k },
            ],
            projections: [
                vec![2, 1], // Weights: B[K,N]
                vec![0, 2], // Inputs:  A[M,K]
                vec![0, 1], // Outputs: C[M,N]
            ],
        }
    }

    /// 2D convolution in the seven-dimensional nest form
    /// (N batch, K output channels, C input channels, P/Q output rows/cols,
    /// R/S filter rows/cols).
    pub fn conv2d(n: u64, k: u64, c: u64, p: u64, q: u64, r: u64, s: u64) -> Self {
        Self {
            name: format!("Conv2d_N{}_K{}_C{}_P{}x{}_R{}x{}", n, k, c, p, q, r, s),
            dims: vec![
                WorkloadDim { name: "N".to_string(), size: n },
                WorkloadDim { name: "K".to_string(), size: k },
                WorkloadDim { name: "C".to_string(), size: c },
                WorkloadDim { name: "P".to_string(), size: p },
                WorkloadDim { name: "Q".to_string(), size: q },
                WorkloadDim { name: "R".to_string(), size: r },
                WorkloadDim { name: "S".to_string(), size: s },
            ],
            projections: [
                vec![5, 6, 2, 1], // Weights: [R,S,C,K]
                vec![0, 2, 3, 4], // Inputs:  [N,C,P,Q]
                vec![0, 1, 3, 4], // Outputs: [N,K,P,Q]
            ],
        }
    }
}
