// src/main.rs — mapforge entry point

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mapforge::core::config::RootConfig;
use mapforge::ert;
use mapforge::mapper::ExhaustiveMapper;
use mapforge::mapspace::TiledMapSpace;
use mapforge::model::Engine;
use mapforge::report;

const DEFAULT_OUT_PREFIX: &str = "mapforge-mapper";

#[derive(Parser, Debug)]
#[command(
    name = "mapforge",
    about = "Exhaustive mapping search for tensor accelerators",
    version
)]
struct Cli {
    /// Fully-resolved run configuration (.yaml, .yml or .json).
    config: std::path::PathBuf,

    /// Prefix for the .map.txt / .stats.txt artifacts.
    #[arg(short, long)]
    output_prefix: Option<String>,
}

fn main() {
    init_logging("warn");
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let root = RootConfig::load(&cli.config)?;

    // All startup validation happens before any enumeration.
    let constraints = root.effective_constraints()?;
    let workload = root.problem.to_workload()?;
    let mut arch = root.architecture.to_specs()?;

    let prefix = cli
        .output_prefix
        .or_else(|| root.mapper.out_prefix.clone())
        .unwrap_or_else(|| DEFAULT_OUT_PREFIX.to_string());

    if root.architecture.needs_characterization() {
        let table = ert::invoke_characterizer(&cli.config, &prefix)?;
        ert::merge_table(&mut arch, &table)?;
    } else if let Some(path) = &root.architecture.ert_file {
        ert::merge_table(&mut arch, path)?;
    }

    info!(workload = %workload.name, architecture = %arch.name, "starting exhaustive search");

    let mapspace = TiledMapSpace::new(workload.clone(), arch.clone(), &constraints)?;
    let engine = Engine::with_specs(arch);
    let mut mapper = ExhaustiveMapper::new(mapspace, engine, workload.clone());
    let outcome = mapper.run()?;

    match &outcome.best {
        Some(best) => {
            report::write_artifacts(&prefix, best, &workload)?;
            println!();
            println!("Summary stats for best mapping found by mapper:");
            println!("{}", report::summary_line(best));
        }
        None => println!("{}", report::NO_MAPPING_MESSAGE),
    }
    Ok(())
}
