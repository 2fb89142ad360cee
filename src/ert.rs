// src/ert.rs — optional energy-characterization pre-step

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::arch::ArchSpecs;
use crate::error::MapforgeError;

#[derive(Debug, Deserialize)]
struct ErtFile {
    #[serde(rename = "ERT")]
    ert: ErtBody,
}

#[derive(Debug, Deserialize)]
struct ErtBody {
    tables: Vec<ErtEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErtEntry {
    pub name: String,
    pub energy_per_access: f64,
}

/// Runs the external characterizer over the input spec, producing
/// `<prefix>.ERT.yaml`. Opaque to the search core; assumed complete before
/// enumeration starts, so any failure here is fatal-startup.
pub fn invoke_characterizer(
    config_path: &Path,
    out_prefix: &str,
) -> Result<PathBuf, MapforgeError> {
    info!(config = %config_path.display(), "invoking accelergy");
    let status = Command::new("accelergy")
        .arg(config_path)
        .arg("-o")
        .arg(out_prefix)
        .status()
        .map_err(|e| {
            MapforgeError::EnergyTable(format!("failed to launch accelergy: {e}"))
        })?;
    if !status.success() {
        return Err(MapforgeError::EnergyTable(format!(
            "accelergy exited with {status}"
        )));
    }
    let path = PathBuf::from(format!("{out_prefix}.ERT.yaml"));
    if !path.exists() {
        return Err(MapforgeError::EnergyTable(format!(
            "characterizer produced no {}",
            path.display()
        )));
    }
    Ok(path)
}

/// Loads an energy reference table and overrides the access energies of
/// matching storage levels.
pub fn merge_table(specs: &mut ArchSpecs, path: &Path) -> Result<(), MapforgeError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: ErtFile = serde_yml::from_str(&content)?;
    for entry in parsed.ert.tables {
        match specs.storage.iter_mut().find(|s| s.name == entry.name) {
            Some(level) => level.energy_per_access = entry.energy_per_access,
            None => warn!(level = %entry.name, "ERT entry matches no storage level"),
        }
    }
    info!(table = %path.display(), "merged energy reference table");
    Ok(())
}
