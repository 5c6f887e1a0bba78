//! Pilot Allocation Simulator CLI
//!
//! Runs one simulation and appends its per-class results to the result
//! tables.
//!
//! # Example
//!
//! ```bash
//! # Default configuration, 20 URLLC and 200 mMTC nodes
//! pilot-sim --scheduler RRN_FCFS --urllc-nodes 20 --mmtc-nodes 200 --seed 7
//!
//! # Custom configuration, print the summary instead of writing tables
//! pilot-sim --config sim.json --reliability high --deadline short --no-results --json
//! ```

mod results;

use clap::Parser;
use pilot_simulator_core_rs::models::TrafficClass;
use pilot_simulator_core_rs::orchestrator::{RunParams, Simulation, SimulationConfig};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pilot Allocation Simulator
///
/// Simulates pilot-sequence allocation between URLLC (class A) and mMTC
/// (class B) traffic. Reproducible for a given seed and configuration.
#[derive(Parser, Debug)]
#[command(name = "pilot-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file. Built-in defaults when omitted.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Allocation policy: FCFS_FCFS, RRQ_RRQ, RRQ_FCFS, RRN_FCFS or RRN_RRQ
    #[arg(long)]
    scheduler: Option<String>,

    /// URLLC reliability profile
    #[arg(long)]
    reliability: Option<String>,

    /// URLLC latency profile
    #[arg(long)]
    deadline: Option<String>,

    /// Number of URLLC nodes
    #[arg(long, default_value = "10")]
    urllc_nodes: usize,

    /// Number of mMTC nodes
    #[arg(long, default_value = "100")]
    mmtc_nodes: usize,

    /// Seed for the arrival generators
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Root directory of the result tables
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Do not append to the result tables
    #[arg(long)]
    no_results: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,pilot_simulator_core_rs=info,pilot_sim=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_json(&fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };
    let params = RunParams {
        class_a_nodes: args.urllc_nodes,
        class_b_nodes: args.mmtc_nodes,
        policy: args.scheduler.clone(),
        class_a_deadline: args.deadline.clone(),
        class_a_reliability: args.reliability.clone(),
        seed: args.seed,
    };

    let mut simulation = Simulation::new(&config, &params)?;
    let summary = simulation.run()?;

    for class in TrafficClass::ALL {
        let counters = summary.stats.class(class);
        let outcome = &summary.classes[class];
        info!(
            class = %class,
            arrivals = counters.arrivals,
            served = counters.served,
            missed = counters.missed,
            still_queued = summary.still_queued[class],
            mean_wait = outcome.wait.mean,
            loss_rate = outcome.loss_rate,
            "class summary"
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if !args.no_results {
        for path in results::write_results(&args.results_dir, &summary)? {
            info!(path = %path.display(), "results appended");
        }
    }

    Ok(())
}
