use mssim::{bench_cloth_curve, bench_eval, bench_hair_group, bench_integrators};
use mssim::{BodyConfig, EngineConfig, IntegratorConfig, Scenario, ScenarioConfig, Scene};
use mssim::error::validate_step_size;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BodyKind {
    Cloth,
    Hair,
    Pendulum,
}

/// Mass-spring simulation of cloth, hair and pendulums.
///
/// Try `mssim t 0.001` for trapezoid with 1 ms steps
/// or `mssim r 0.01` for RK4 with 10 ms steps.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Integrator: e (forward Euler), t (trapezoidal), r (RK4)
    #[arg(value_parser = IntegratorConfig::from_mode)]
    mode: IntegratorConfig,

    /// Fixed time step in seconds
    #[arg(value_parser = parse_step)]
    step: f64,

    /// Body to simulate when no scenario file is given
    #[arg(long, value_enum, default_value = "hair")]
    body: BodyKind,

    /// Simulated seconds (ignored with --file, which sets `t_end`)
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,

    /// Frame rate of the headless driver clock (ignored with --file, which sets `fps`)
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Scenario YAML (looked up as given, then under `scenarios/`).
    /// MODE and STEP still override the file's integrator and step size;
    /// --seconds and --fps do not.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Run the timing benchmarks instead of a simulation
    #[arg(long)]
    bench: bool,
}

fn parse_step(s: &str) -> Result<f64, String> {
    let h: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    validate_step_size(h).map_err(|e| e.to_string())
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let engine = EngineConfig {
        integrator: args.mode,
        h: args.step,
        t_end: args.seconds,
        fps: args.fps,
    };

    let Some(file) = &args.file else {
        let body = match args.body {
            BodyKind::Cloth => BodyConfig::Cloth(Default::default()),
            BodyKind::Hair => BodyConfig::Hair(Default::default()),
            BodyKind::Pendulum => BodyConfig::Pendulum(Default::default()),
        };
        return Ok(ScenarioConfig { engine, body });
    };

    let path = if file.exists() {
        file.clone()
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let mut cfg = ScenarioConfig::from_yaml(&text)
        .with_context(|| format!("parsing scenario {}", path.display()))?;

    // the command line picks the integrator and step size; duration and fps come from the file
    cfg.engine.integrator = engine.integrator;
    cfg.engine.h = engine.h;
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("Using integrator {} with time step {:.4}", args.mode.name(), args.step);

    if args.bench {
        bench_eval();
        bench_integrators();
        bench_hair_group();
        bench_cloth_curve();
        return Ok(());
    }

    let cfg = load_scenario(&args)?;
    let mut scenario = Scenario::build_scenario(&cfg)?;

    let frames = scenario.run_with(|scene, steps| {
        if let Scene::Hair(group) = scene {
            // derived strands are read only after every real strand has stepped
            let derived = group.interpolated_points();
            debug!(steps, derived = derived.len(), "frame");
        } else {
            debug!(steps, "frame");
        }
    });

    info!(
        frames,
        steps = scenario.engine.steps(),
        simulated_s = scenario.engine.simulated_s(),
        "finished"
    );
    for (i, s) in scenario.scene.summaries().iter().enumerate() {
        info!(
            body = i,
            particles = s.particles,
            centroid = ?(s.centroid.x, s.centroid.y, s.centroid.z),
            lowest_y = s.lowest_y,
            max_speed = s.max_speed,
            "{}",
            scenario.scene.name()
        );
    }

    Ok(())
}
