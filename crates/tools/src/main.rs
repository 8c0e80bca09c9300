use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use foundation::time::ManualClock;
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use globe::{GlobeConfig, GlobeServices, GlobeView};
use tools::{Replayer, Scenario};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a flood globe scenario on a simulated clock")]
struct Args {
    /// Scenario JSON: timed prop updates and camera requests
    scenario: PathBuf,

    /// Optional GlobeConfig JSON; environment overrides apply on top
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation/terrain API base URL (overrides config)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Wall-clock pause between ticks, to let network fetches land
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,

    /// Print a summary every N ticks
    #[arg(long, default_value_t = 1)]
    every: usize,

    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,
}

/// Spawns detached tasks onto the current `LocalSet`.
struct TokioLocalSpawner;

impl LocalSpawn for TokioLocalSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::task::spawn_local(future);
        Ok(())
    }
}

fn load_config(args: &Args) -> Result<GlobeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            GlobeConfig::from_json_str(&raw).with_context(|| format!("parse {}", path.display()))?
        }
        None => GlobeConfig::default(),
    };
    config = config.with_overrides(|key| std::env::var(key).ok());
    if let Some(url) = &args.api_base_url {
        config.api_base_url = Some(url.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let raw = fs::read_to_string(&args.scenario)
        .with_context(|| format!("read {}", args.scenario.display()))?;
    let scenario = Scenario::from_json_str(&raw)?;
    let config = load_config(&args)?;

    let clock = Rc::new(ManualClock::new(scenario.start_ms));
    let services = GlobeServices::from_config(&config, clock.clone(), Rc::new(TokioLocalSpawner))?;
    let view = GlobeView::mount(config, services);
    let mut replay = Replayer::new(scenario, view, clock);
    info!(scenario = %args.scenario.display(), "replay started");

    let every = args.every.max(1);
    let mut ticks = 0usize;
    while let Some(report) = replay.advance() {
        for step in &report.applied {
            info!(time_ms = report.time_ms, %step, "step");
        }
        if ticks % every == 0 || replay.is_done() {
            if args.json {
                println!("{}", serde_json::to_string(&report)?);
            } else if let Some(s) = &report.summary {
                println!(
                    "t={:>8.0}ms cam=({:.3},{:.3}) h={:.0}m hdg={:.1} flying={} overlay={:?} markers={} ripples={} extent={} terrain={}",
                    s.time_ms,
                    s.camera_lat,
                    s.camera_lon,
                    s.camera_height_m,
                    s.heading_deg,
                    s.flying,
                    s.overlay_alphas,
                    s.markers,
                    s.ripples,
                    s.extent_polygons,
                    s.terrain,
                );
            } else {
                println!("t={:>8.0}ms unmounted", report.time_ms);
            }
            for event in &report.events {
                println!("    {event}");
            }
        }
        ticks += 1;
        if args.pace_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.pace_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
    info!(ticks, "replay finished");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let local = tokio::task::LocalSet::new();
    local.run_until(run(args)).await
}
