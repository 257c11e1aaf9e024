use cosmosim::{bench_gravity, bench_world_tick, run_headless};
use cosmosim::{EngineConfig, Parameters, RunOptions, ScenarioConfig, SimulationWorld};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Run a scenario through the simulation core without a window")]
struct Args {
    /// Scenario JSON (or raw model reply); bare names resolve under scenarios/
    #[arg(short, long, default_value = "giant_impact.json")]
    file_name: String,

    /// Optional engine YAML overriding physics constants
    #[arg(short, long)]
    engine: Option<String>,

    #[arg(short, long, default_value_t = 900)]
    ticks: u64,

    /// Wall seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Advance a sequence every N frames
    #[arg(long)]
    advance_every: Option<u64>,

    /// Fire the scenario action key on this frame
    #[arg(long)]
    action_at: Option<u64>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

// existing paths win, bare names are looked up in the crate's scenarios/
fn resolve(name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name)
}

fn load_parameters(engine: Option<&str>) -> Result<Parameters> {
    let Some(name) = engine else {
        return Ok(Parameters::default());
    };
    let path = resolve(name);
    let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = EngineConfig::from_yaml(&text)?;
    Ok(cfg.build_parameters()?)
}

fn load_scenario(name: &str) -> Result<ScenarioConfig> {
    let path = resolve(name);
    let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(ScenarioConfig::from_ai_text(&text)?)
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_world_tick();
        return Ok(());
    }

    let params = load_parameters(args.engine.as_deref())?;
    let scenario_cfg = load_scenario(&args.file_name)?;

    let mut world = SimulationWorld::new(params);
    world.request_scenario_config(&scenario_cfg)?;

    let opts = RunOptions {
        ticks: args.ticks,
        dt: args.dt,
        advance_every: args.advance_every,
        action_at: args.action_at,
        ..RunOptions::default()
    };
    let summary = run_headless(&mut world, &opts);

    println!(
        "{} ticks, {} merges ({} special), {} bodies alive, scenario {}",
        summary.ticks,
        summary.merges,
        summary.special_merges,
        summary.final_frame.bodies.iter().filter(|b| b.alive).count(),
        summary.final_frame.kind
    );

    Ok(())
}
