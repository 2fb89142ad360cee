// src/core/config.rs — run configuration: parsing, validation, conversion

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::arch::{ArchSpecs, ArithmeticSpecs, StorageLevel};
use crate::core::workload::{DataSpace, Workload, WorkloadDim};
use crate::error::MapforgeError;

/// The fully-resolved configuration for one mapper run.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    pub problem: ProblemConfig,
    pub architecture: ArchConfig,
    #[serde(default)]
    pub mapspace: Option<MapSpaceSection>,
    #[serde(default)]
    pub mapspace_constraints: Option<Vec<ConstraintConfig>>,
    #[serde(default)]
    pub mapper: MapperConfig,
}

impl RootConfig {
    /// Loads a configuration file; the format is chosen by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapforgeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(MapforgeError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }

    /// One of `mapspace` / `mapspace_constraints` must be present
    /// (`mapspace` wins when both are). Absence of both is a fatal startup
    /// condition, detected before any enumeration.
    pub fn effective_constraints(&self) -> Result<Vec<ConstraintConfig>, MapforgeError> {
        if let Some(section) = &self.mapspace {
            return Ok(section.constraints.clone());
        }
        if let Some(list) = &self.mapspace_constraints {
            return Ok(list.clone());
        }
        Err(MapforgeError::MissingMapSpace)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProblemConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub dimensions: Vec<DimensionEntry>,
    pub data_spaces: Vec<DataSpaceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionEntry {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSpaceEntry {
    pub name: String,
    pub projection: Vec<String>,
}

impl ProblemConfig {
    pub fn to_workload(&self) -> Result<Workload, MapforgeError> {
        if self.dimensions.is_empty() {
            return Err(MapforgeError::Config(
                "problem has no dimensions".to_string(),
            ));
        }
        let mut dims = Vec::with_capacity(self.dimensions.len());
        for entry in &self.dimensions {
            if entry.size == 0 {
                return Err(MapforgeError::Config(format!(
                    "problem dimension {} must have size >= 1",
                    entry.name
                )));
            }
            if dims.iter().any(|d: &WorkloadDim| d.name == entry.name) {
                return Err(MapforgeError::Config(format!(
                    "duplicate problem dimension {}",
                    entry.name
                )));
            }
            dims.push(WorkloadDim {
                name: entry.name.clone(),
                size: entry.size,
            });
        }

        let mut projections: [Option<Vec<usize>>; DataSpace::COUNT] = [None, None, None];
        for entry in &self.data_spaces {
            let ds = DataSpace::from_name(&entry.name).ok_or_else(|| {
                MapforgeError::Config(format!("unknown data space {}", entry.name))
            })?;
            let mut proj = Vec::with_capacity(entry.projection.len());
            for dim_name in &entry.projection {
                let idx = dims
                    .iter()
                    .position(|d| &d.name == dim_name)
                    .ok_or_else(|| {
                        MapforgeError::Config(format!(
                            "data space {} projects onto unknown dimension {}",
                            entry.name, dim_name
                        ))
                    })?;
                proj.push(idx);
            }
            if projections[ds.index()].replace(proj).is_some() {
                return Err(MapforgeError::Config(format!(
                    "data space {} listed twice",
                    entry.name
                )));
            }
        }
        let [weights, inputs, outputs] = projections;
        let projections = [
            weights.ok_or_else(|| MapforgeError::Config("missing data space Weights".into()))?,
            inputs.ok_or_else(|| MapforgeError::Config("missing data space Inputs".into()))?,
            outputs.ok_or_else(|| MapforgeError::Config("missing data space Outputs".into()))?,
        ];

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| "workload".to_string());
        Ok(Workload {
            name,
            dims,
            projections,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub arithmetic: ArithmeticConfig,
    pub storage: Vec<StorageLevelConfig>,
    /// Pre-characterized energy reference table to merge before the search.
    #[serde(default)]
    pub ert_file: Option<PathBuf>,
    /// Accelergy-style component trees. Their presence triggers the
    /// external characterization pre-step.
    #[serde(default)]
    pub subtree: Option<serde_yml::Value>,
    #[serde(default)]
    pub local: Option<serde_yml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArithmeticConfig {
    pub name: String,
    pub energy_per_op: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageLevelConfig {
    pub name: String,
    /// Words of capacity; 0 (the default) means unbounded.
    #[serde(default)]
    pub entries: u64,
    pub energy_per_access: f64,
    #[serde(default = "default_fanout")]
    pub fanout: u64,
}

fn default_fanout() -> u64 {
    1
}

impl ArchConfig {
    pub fn to_specs(&self) -> Result<ArchSpecs, MapforgeError> {
        if self.storage.is_empty() {
            return Err(MapforgeError::Config(
                "architecture has no storage levels".to_string(),
            ));
        }
        let mut storage = Vec::with_capacity(self.storage.len());
        for level in &self.storage {
            if level.fanout == 0 {
                return Err(MapforgeError::Config(format!(
                    "storage level {} must have fanout >= 1",
                    level.name
                )));
            }
            if !level.energy_per_access.is_finite() || level.energy_per_access < 0.0 {
                return Err(MapforgeError::Config(format!(
                    "storage level {} has invalid energy_per_access",
                    level.name
                )));
            }
            if storage.iter().any(|s: &StorageLevel| s.name == level.name) {
                return Err(MapforgeError::Config(format!(
                    "duplicate storage level {}",
                    level.name
                )));
            }
            storage.push(StorageLevel {
                name: level.name.clone(),
                entries: level.entries,
                energy_per_access: level.energy_per_access,
                fanout: level.fanout,
            });
        }
        Ok(ArchSpecs {
            name: self.name.clone().unwrap_or_else(|| "arch".to_string()),
            arithmetic: ArithmeticSpecs {
                name: self.arithmetic.name.clone(),
                energy_per_op: self.arithmetic.energy_per_op,
            },
            storage,
        })
    }

    pub fn needs_characterization(&self) -> bool {
        self.subtree.is_some() || self.local.is_some()
    }
}

/// The `mapspace` section: the full space, optionally narrowed by
/// constraints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapSpaceSection {
    #[serde(default)]
    pub constraints: Vec<ConstraintConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintConfig {
    /// Storage level the constraint applies to, by name.
    pub target: String,
    #[serde(flatten)]
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Pins the outermost loops of the level's nest, outermost first.
    Permutation { order: Vec<String> },
    /// Pins tile factors of the named dimensions at the level.
    Factors { factors: BTreeMap<String, u64> },
    /// Forces data spaces to be kept at / bypass the level.
    DatatypeBypass {
        #[serde(default)]
        keep: Vec<String>,
        #[serde(default)]
        bypass: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub out_prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workload::DataSpace;
    use crate::error::MapforgeError;

    const GEMM_YAML: &str = r#"
problem:
  name: gemm_tiny
  dimensions:
    - {name: M, size: 4}
    - {name: N, size: 2}
    - {name: K, size: 2}
  data_spaces:
    - {name: Weights, projection: [K, N]}
    - {name: Inputs,  projection: [M, K]}
    - {name: Outputs, projection: [M, N]}
architecture:
  arithmetic: {name: MACC, energy_per_op: 0.5}
  storage:
    - {name: Buffer, entries: 64, energy_per_access: 1.0, fanout: 4}
    - {name: DRAM, energy_per_access: 10.0}
mapspace_constraints:
  - target: Buffer
    type: permutation
    order: [K]
  - target: DRAM
    type: datatype_bypass
    keep: [Weights, Inputs, Outputs]
"#;

    #[test]
    fn test_parse_yaml_round() {
        let root: RootConfig = serde_yml::from_str(GEMM_YAML).unwrap();
        let workload = root.problem.to_workload().unwrap();
        assert_eq!(workload.num_dims(), 3);
        assert_eq!(workload.maccs(), 16);
        assert_eq!(workload.projections[DataSpace::Weights.index()], vec![2, 1]);

        let specs = root.architecture.to_specs().unwrap();
        assert_eq!(specs.num_levels(), 2);
        assert_eq!(specs.storage[0].fanout, 4);
        assert_eq!(specs.storage[1].entries, 0);
        assert!(!root.architecture.needs_characterization());

        let constraints = root.effective_constraints().unwrap();
        assert_eq!(constraints.len(), 2);
        match &constraints[0].kind {
            ConstraintKind::Permutation { order } => assert_eq!(order, &["K".to_string()]),
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn test_missing_mapspace_is_fatal() {
        let yaml = GEMM_YAML.replace("mapspace_constraints", "ignored_section");
        let root: RootConfig = serde_yml::from_str(&yaml).unwrap();
        assert!(matches!(
            root.effective_constraints(),
            Err(MapforgeError::MissingMapSpace)
        ));
    }

    #[test]
    fn test_mapspace_section_wins_over_constraints() {
        let yaml = format!("{GEMM_YAML}\nmapspace:\n  constraints: []\n");
        let root: RootConfig = serde_yml::from_str(&yaml).unwrap();
        assert!(root.effective_constraints().unwrap().is_empty());
    }

    #[test]
    fn test_workload_validation() {
        let mut root: RootConfig = serde_yml::from_str(GEMM_YAML).unwrap();
        root.problem.dimensions[0].size = 0;
        assert!(root.problem.to_workload().is_err());

        let mut root: RootConfig = serde_yml::from_str(GEMM_YAML).unwrap();
        root.problem.data_spaces.pop();
        assert!(root.problem.to_workload().is_err());
    }
}
