//! # CROSSROADS Intersection
//!
//! Demo harness: runs several lights, each with one lane of traffic that
//! waits for green and then releases a batch of vehicles.
//!
//! ```bash
//! # Production cadence, 4 lights, 20 seconds
//! ./intersection
//!
//! # Quick run with debug logs
//! CROSSROADS_LOG=debug ./intersection --fast --run-secs 2
//!
//! # From a config file
//! ./intersection --config intersection.toml
//! ```
//!
//! Each lane is the ONLY consumer of its light's mailbox.

use clap::Parser;
use crossbeam_channel::{select, tick, unbounded, Sender};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use crossroads::{
    CrossroadsError, CrossroadsResult, GreenWaiter, IntersectionConfig, LightConfig, TrafficLight,
};

/// Command line for the intersection harness.
#[derive(Parser, Debug)]
#[command(name = "intersection", about = "Run a CROSSROADS traffic light simulation")]
struct Args {
    /// TOML config file. Flags below override its values.
    #[arg(short, long, env = "CROSSROADS_CONFIG")]
    config: Option<PathBuf>,

    /// Number of lights.
    #[arg(long)]
    lights: Option<usize>,

    /// Vehicles released per green phase.
    #[arg(long)]
    vehicles: Option<usize>,

    /// Length of the run in seconds.
    #[arg(long)]
    run_secs: Option<u64>,

    /// Fixed seed for reproducible cadence.
    #[arg(long)]
    seed: Option<u64>,

    /// Use the 40-60ms test cadence instead of 4-6s.
    #[arg(long)]
    fast: bool,
}

/// A batch of vehicles that crossed on one green.
#[derive(Debug)]
struct Crossing {
    light: String,
    vehicles: usize,
    waited: Duration,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CROSSROADS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_config(args: &Args) -> CrossroadsResult<IntersectionConfig> {
    let mut config = match &args.config {
        Some(path) => IntersectionConfig::load(path)?,
        None => IntersectionConfig::default(),
    };

    if args.fast {
        let name = config.light.name.clone();
        config.light = LightConfig::fast().named(name);
    }
    if let Some(lights) = args.lights {
        config.lights = lights;
    }
    if let Some(vehicles) = args.vehicles {
        config.vehicles_per_green = vehicles;
    }
    if let Some(run_secs) = args.run_secs {
        config.run_secs = run_secs;
    }
    if let Some(seed) = args.seed {
        config.light.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}

/// One lane: wait for green, let a batch through, repeat until shutdown.
fn spawn_lane(
    light: Arc<TrafficLight>,
    vehicles: usize,
    crossings: Sender<Crossing>,
) -> CrossroadsResult<JoinHandle<()>> {
    let light_name = light.name().to_string();
    thread::Builder::new()
        .name(format!("lane-{light_name}"))
        .spawn(move || loop {
            let started = Instant::now();
            match light.wait_for_green() {
                Ok(()) => {
                    let crossing = Crossing {
                        light: light.name().to_string(),
                        vehicles,
                        waited: started.elapsed(),
                    };
                    if crossings.send(crossing).is_err() {
                        return;
                    }
                }
                Err(CrossroadsError::ShutDown(_)) => return,
                Err(e) => {
                    tracing::error!(light = %light.name(), "lane stopped: {e}");
                    return;
                }
            }
        })
        .map_err(|e| CrossroadsError::WorkerSpawn {
            name: light_name,
            reason: e.to_string(),
        })
}

/// Joins every lane, logging each one that panicked. Returns the panic count.
fn join_lanes(lanes: Vec<JoinHandle<()>>) -> usize {
    let mut panicked = 0;
    for lane in lanes {
        let name = lane.thread().name().unwrap_or("lane").to_string();
        if lane.join().is_err() {
            tracing::error!(lane = %name, "lane thread panicked");
            panicked += 1;
        }
    }
    panicked
}

fn run(config: &IntersectionConfig) -> CrossroadsResult<()> {
    tracing::info!(
        lights = config.lights,
        vehicles_per_green = config.vehicles_per_green,
        run_secs = config.run_secs,
        min_dwell_ms = config.light.min_dwell_ms,
        max_dwell_ms = config.light.max_dwell_ms,
        "starting intersection"
    );

    let lights = (0..config.lights)
        .map(|i| TrafficLight::with_config(config.light_config(i)).map(Arc::new))
        .collect::<CrossroadsResult<Vec<_>>>()?;

    let (crossing_tx, crossing_rx) = unbounded();
    let mut lanes = Vec::with_capacity(lights.len());
    for light in &lights {
        light.simulate()?;
        lanes.push(spawn_lane(
            Arc::clone(light),
            config.vehicles_per_green,
            crossing_tx.clone(),
        )?);
    }
    drop(crossing_tx);

    let deadline = Instant::now() + Duration::from_secs(config.run_secs);
    let status = tick(Duration::from_secs(1));
    let mut total_vehicles = 0usize;
    let mut total_greens = 0usize;

    let mut lanes_open = true;

    while lanes_open && Instant::now() < deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        select! {
            recv(crossing_rx) -> msg => match msg {
                Ok(crossing) => {
                    total_greens += 1;
                    total_vehicles += crossing.vehicles;
                    tracing::info!(
                        light = %crossing.light,
                        vehicles = crossing.vehicles,
                        waited_ms = crossing.waited.as_millis() as u64,
                        "vehicles crossed"
                    );
                }
                Err(_) => lanes_open = false,
            },
            recv(status) -> _ => {
                let phases: Vec<String> = lights
                    .iter()
                    .map(|l| format!("{}={}", l.name(), l.current_phase()))
                    .collect();
                tracing::debug!(phases = %phases.join(" "), "status");
            }
            default(remaining) => {}
        }
    }

    for light in &lights {
        light.shutdown();
    }
    let panicked = join_lanes(lanes);

    let toggles: u64 = lights.iter().map(|l| l.toggle_count()).sum();
    tracing::info!(
        greens = total_greens,
        vehicles = total_vehicles,
        toggles,
        panicked_lanes = panicked,
        "intersection stopped"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let result = build_config(&args).and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("intersection failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_lanes_counts_panics() {
        let lanes = vec![
            thread::spawn(|| {}),
            thread::spawn(|| panic!("lane failure")),
            thread::spawn(|| {}),
        ];
        assert_eq!(join_lanes(lanes), 1);
    }

    #[test]
    fn test_fast_flag_keeps_light_name() {
        let args = Args::parse_from(["intersection", "--fast", "--lights", "2", "--seed", "5"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.lights, 2);
        assert_eq!(config.light.max_dwell_ms, LightConfig::fast().max_dwell_ms);
        assert_eq!(config.light.name, "light");
        assert_eq!(config.light.seed, Some(5));
    }
}
