// End-to-end: config loading, ERT merging, search, artifacts.

use pretty_assertions::assert_eq;

use mapforge::core::config::RootConfig;
use mapforge::ert;
use mapforge::mapper::{BestMapping, ExhaustiveMapper};
use mapforge::mapspace::TiledMapSpace;
use mapforge::model::Engine;
use mapforge::report;

const CONFIG_YAML: &str = r#"
problem:
  name: gemm_2x2x2
  dimensions:
    - {name: M, size: 2}
    - {name: N, size: 2}
    - {name: K, size: 2}
  data_spaces:
    - {name: Weights, projection: [K, N]}
    - {name: Inputs,  projection: [M, K]}
    - {name: Outputs, projection: [M, N]}
architecture:
  name: smoke_rig
  arithmetic: {name: MACC, energy_per_op: 0.5}
  storage:
    - {name: Buffer, entries: 64, energy_per_access: 1.0, fanout: 4}
    - {name: DRAM, energy_per_access: 10.0}
mapspace_constraints: []
mapper:
  out_prefix: smoke
"#;

fn search_best(config: &RootConfig) -> BestMapping {
    let workload = config.problem.to_workload().unwrap();
    let arch = config.architecture.to_specs().unwrap();
    let constraints = config.effective_constraints().unwrap();
    let mapspace = TiledMapSpace::new(workload.clone(), arch.clone(), &constraints).unwrap();
    let engine = Engine::with_specs(arch);
    let mut mapper = ExhaustiveMapper::new(mapspace, engine, workload);
    mapper
        .run()
        .unwrap()
        .best
        .expect("the smoke config has legal mappings")
}

#[test]
fn test_end_to_end_search_and_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("run.yaml");
    std::fs::write(&config_path, CONFIG_YAML).unwrap();

    let root = RootConfig::load(&config_path).unwrap();
    assert_eq!(root.mapper.out_prefix.as_deref(), Some("smoke"));

    let workload = root.problem.to_workload().unwrap();
    let best = search_best(&root);

    assert!(best.energy > 0.0);
    assert!(best.utilization > 0.0 && best.utilization <= 1.0);
    assert_eq!(best.topology.maccs, 8);

    let prefix = dir.path().join("smoke");
    let prefix = prefix.to_str().unwrap();
    report::write_artifacts(prefix, &best, &workload).unwrap();

    let map_txt = std::fs::read_to_string(dir.path().join("smoke.map.txt")).unwrap();
    assert!(map_txt.contains("DRAM"));
    assert!(map_txt.contains("Buffer"));
    assert!(map_txt.contains("keeps:"));

    let stats_txt = std::fs::read_to_string(dir.path().join("smoke.stats.txt")).unwrap();
    assert!(stats_txt.contains("workload: gemm_2x2x2"));
    assert!(stats_txt.contains("maccs: 8"));
    assert!(stats_txt.contains("pJ/MACC"));
}

#[test]
fn test_search_is_idempotent_with_real_collaborators() {
    let root: RootConfig = serde_yml::from_str(CONFIG_YAML).unwrap();
    let a = search_best(&root);
    let b = search_best(&root);
    assert_eq!(a.coordinate, b.coordinate);
    assert_eq!(a.energy.to_bits(), b.energy.to_bits());
    assert_eq!(a.utilization.to_bits(), b.utilization.to_bits());
    assert_eq!(a.mapping, b.mapping);
}

#[test]
fn test_best_beats_every_other_legal_candidate() {
    use mapforge::mapspace::{Dimension, MapSpace, MappingId};
    use mapforge::model::CostModelEngine;

    let root: RootConfig = serde_yml::from_str(CONFIG_YAML).unwrap();
    let workload = root.problem.to_workload().unwrap();
    let arch = root.architecture.to_specs().unwrap();
    let mapspace = TiledMapSpace::new(workload.clone(), arch.clone(), &[]).unwrap();
    let best = search_best(&root);

    // Re-walk the space by hand; nothing legal may score strictly better.
    let sizes = mapspace.all_sizes();
    let mut engine = Engine::with_specs(arch);
    for i in 0..sizes[0] {
        for j in 0..sizes[1] {
            for k in 0..sizes[2] {
                for l in 0..sizes[3] {
                    let mut id = MappingId::new(sizes);
                    id.set(Dimension::IndexFactorization, i).unwrap();
                    id.set(Dimension::LoopPermutation, j).unwrap();
                    id.set(Dimension::Spatial, k).unwrap();
                    id.set(Dimension::DatatypeBypass, l).unwrap();
                    let Some(mapping) = mapspace.construct_mapping(&id) else {
                        continue;
                    };
                    let status = engine.evaluate(&mapping, &workload);
                    if !status.iter().all(|s| s.success) {
                        continue;
                    }
                    assert!(engine.energy() >= best.energy);
                }
            }
        }
    }
}

#[test]
fn test_ert_merge_overrides_access_energy() {
    let dir = tempfile::tempdir().unwrap();
    let ert_path = dir.path().join("run.ERT.yaml");
    std::fs::write(
        &ert_path,
        r#"
ERT:
  tables:
    - {name: Buffer, energy_per_access: 2.5}
    - {name: Unknown, energy_per_access: 99.0}
"#,
    )
    .unwrap();

    let root: RootConfig = serde_yml::from_str(CONFIG_YAML).unwrap();
    let mut arch = root.architecture.to_specs().unwrap();
    ert::merge_table(&mut arch, &ert_path).unwrap();
    assert_eq!(arch.storage[0].energy_per_access, 2.5);
    // Untouched levels keep their configured energy.
    assert_eq!(arch.storage[1].energy_per_access, 10.0);
}

#[test]
fn test_unsupported_config_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(&path, "problem = 1").unwrap();
    assert!(RootConfig::load(&path).is_err());
}
