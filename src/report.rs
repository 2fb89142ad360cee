// src/report.rs — best-mapping artifacts and the console summary

use std::fmt::Write as _;
use std::fs;

use chrono::Utc;

use crate::core::workload::{DataSpace, Workload};
use crate::error::MapforgeError;
use crate::mapper::BestMapping;

pub const NO_MAPPING_MESSAGE: &str =
    "MESSAGE: no valid mappings found within search criteria.";

/// Energy per operation for the best mapping, pJ/MACC.
pub fn pj_per_macc(best: &BestMapping) -> f64 {
    if best.topology.maccs == 0 {
        return 0.0;
    }
    best.energy / best.topology.maccs as f64
}

/// The one-line console summary, printed only when a best mapping exists.
pub fn summary_line(best: &BestMapping) -> String {
    format!(
        "  Utilization = {:4.2} | pJ/MACC = {:8.3}",
        best.utilization,
        pj_per_macc(best)
    )
}

/// Body of `<prefix>.map.txt`: the loop nest, outermost level first, with
/// per-level storage names, bypass masks, and derived tile sizes.
pub fn render_mapping(best: &BestMapping, workload: &Workload) -> String {
    let mut out = String::new();
    for (l, nest) in best.mapping.levels.iter().enumerate().rev() {
        let _ = writeln!(out, "{}", nest.storage);
        let _ = writeln!(out, "{}", "-".repeat(nest.storage.len().max(24)));

        let keeps: Vec<&str> = DataSpace::ALL
            .iter()
            .filter(|ds| nest.keep[ds.index()])
            .map(|ds| ds.name())
            .collect();
        let _ = writeln!(
            out,
            "  keeps: {}",
            if keeps.is_empty() {
                "<none>".to_string()
            } else {
                keeps.join(", ")
            }
        );

        if let Some(stats) = best.topology.levels.get(l) {
            let _ = writeln!(
                out,
                "  tile entries: Weights={} Inputs={} Outputs={}",
                stats.tile_entries[DataSpace::Weights.index()],
                stats.tile_entries[DataSpace::Inputs.index()],
                stats.tile_entries[DataSpace::Outputs.index()],
            );
        }

        for tile_loop in &nest.loops {
            let keyword = if tile_loop.spatial { "par-for" } else { "for" };
            let dim_name = workload
                .dims
                .get(tile_loop.dim)
                .map(|d| d.name.as_str())
                .unwrap_or("?");
            let _ = writeln!(
                out,
                "  {} {} in [0:{})",
                keyword, dim_name, tile_loop.bound
            );
        }
        let _ = writeln!(out);
    }
    out
}

/// Body of `<prefix>.stats.txt`: the full statistics dump for the best
/// mapping.
pub fn render_stats(best: &BestMapping, workload: &Workload) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== mapforge statistics ===");
    let _ = writeln!(out, "generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "workload: {}", workload.name);
    let _ = writeln!(out, "maccs: {}", best.topology.maccs);
    let _ = writeln!(out);

    for stats in best.topology.levels.iter().rev() {
        let _ = writeln!(out, "{}", stats.name);
        for ds in DataSpace::ALL {
            let _ = writeln!(
                out,
                "  {:<8} tile entries = {:<12} accesses = {}",
                ds.name(),
                stats.tile_entries[ds.index()],
                stats.accesses[ds.index()],
            );
        }
        let _ = writeln!(out, "  energy (pJ) = {:.3}", stats.energy);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "compute energy (pJ) = {:.3}", best.topology.compute_energy);
    let _ = writeln!(out, "total energy (pJ)   = {:.3}", best.energy);
    let _ = writeln!(out, "utilization         = {:.4}", best.utilization);
    let _ = writeln!(out, "pJ/MACC             = {:.3}", pj_per_macc(best));
    out
}

/// Writes both artifacts. Called only when a best mapping exists; the
/// empty-result case produces no files.
pub fn write_artifacts(
    prefix: &str,
    best: &BestMapping,
    workload: &Workload,
) -> Result<(), MapforgeError> {
    let map_path = format!("{prefix}.map.txt");
    fs::write(&map_path, render_mapping(best, workload)).map_err(|source| {
        MapforgeError::Report {
            path: map_path.clone(),
            source,
        }
    })?;

    let stats_path = format!("{prefix}.stats.txt");
    fs::write(&stats_path, render_stats(best, workload)).map_err(|source| {
        MapforgeError::Report {
            path: stats_path.clone(),
            source,
        }
    })?;
    Ok(())
}
