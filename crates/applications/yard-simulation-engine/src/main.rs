//! Yard Simulation Engine CLI
//!
//! Provides commands for:
//! - Running a stacking strategy over a container file
//! - Verifying an action log against a container file
//! - Generating synthetic container files
//!
//! Binary: yard-sim

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yard_simulation_engine::{
    config::SimulationConfig,
    generator::ContainerGenerator,
    loader::{write_containers, ContainerLoader},
    policies::CursorPolicyKind,
    render::TextRenderer,
    replay::{VerificationReport, Verifier},
    simulator::{SimulationResult, Strategy},
};
use yard_core::Container;

#[derive(Parser)]
#[command(name = "yard-sim")]
#[command(about = "Simulate and verify container yard stacking strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a strategy and write its action log
    Run {
        /// Container file
        #[arg(short, long, env = "YARD_CONTAINERS")]
        containers: PathBuf,

        /// Action log to write
        #[arg(short, long, env = "YARD_LOG")]
        log: PathBuf,

        /// Number of stacks in the yard
        #[arg(short, long, env = "YARD_WIDTH", default_value_t = 20)]
        width: usize,

        /// Scan cursor policy
        #[arg(short, long, value_enum, default_value_t = CursorPolicyKind::Resume)]
        policy: CursorPolicyKind,

        /// Name on the START line (defaults to the policy name)
        #[arg(long)]
        name: Option<String>,

        /// Refuse container files that are not sorted by arrival window
        #[arg(long)]
        strict: bool,

        /// Draw the yard after every action once the run is done
        #[arg(long)]
        show: bool,

        /// Pause between frames in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Output JSON file path (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay an action log and check every action
    Verify {
        /// Container file
        #[arg(short, long, env = "YARD_CONTAINERS")]
        containers: PathBuf,

        /// Action log to check
        #[arg(short, long, env = "YARD_LOG")]
        log: PathBuf,

        /// Draw the yard after every action
        #[arg(long)]
        show: bool,

        /// Pause between frames in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Output JSON file path (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a synthetic container file
    Generate {
        /// Number of containers
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// RNG seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Mean container value
        #[arg(long, default_value_t = 100.0)]
        mean_value: f64,

        /// Standard deviation of container values
        #[arg(long, default_value_t = 40.0)]
        value_std_dev: f64,

        /// Container file to write (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries frames and results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yard_simulation_engine=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            containers,
            log,
            width,
            policy,
            name,
            strict,
            show,
            delay_ms,
            output,
        } => {
            let containers = load(&containers, strict)?;
            let mut config = SimulationConfig::new(width, policy);
            if let Some(name) = name {
                config = config.with_name(name);
            }

            let mut strategy = Strategy::create(&config, &log)
                .with_context(|| format!("Failed to start strategy with log {}", log.display()))?;
            let result = strategy.run(&containers)?;
            drop(strategy);
            info!("Action log written to {}", log.display());

            if show {
                let mut renderer = renderer(delay_ms);
                Verifier::new(&containers)?
                    .with_renderer(&mut renderer)
                    .verify_path(&log)?;
            }

            print_result(&result);
            if let Some(path) = output {
                write_json(&path, &result)?;
            }
        }
        Commands::Verify {
            containers,
            log,
            show,
            delay_ms,
            output,
        } => {
            let containers = load(&containers, false)?;
            let mut renderer = renderer(delay_ms);
            let mut verifier = Verifier::new(&containers)?;
            if show {
                verifier = verifier.with_renderer(&mut renderer);
            }
            let report = verifier
                .verify_path(&log)
                .with_context(|| format!("Action log {} is not valid", log.display()))?;

            print_report(&report);
            if let Some(path) = output {
                write_json(&path, &report)?;
            }
        }
        Commands::Generate {
            count,
            seed,
            mean_value,
            value_std_dev,
            output,
        } => {
            let containers = ContainerGenerator::new(seed)
                .with_value(mean_value, value_std_dev)
                .generate(count)?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_containers(BufWriter::new(file), &containers)?;
                    info!("Wrote {} containers to {}", containers.len(), path.display());
                }
                None => write_containers(io::stdout().lock(), &containers)?,
            }
        }
    }

    Ok(())
}

fn load(path: &Path, strict: bool) -> anyhow::Result<Vec<Container>> {
    ContainerLoader::new()
        .require_sorted(strict)
        .from_path(path)
        .with_context(|| format!("Failed to load containers from {}", path.display()))
}

fn renderer(delay_ms: u64) -> TextRenderer<io::Stdout> {
    TextRenderer::stdout().with_delay(Duration::from_millis(delay_ms))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Results saved to {}", path.display());
    Ok(())
}

fn print_result(result: &SimulationResult) {
    println!(
        "{:<12} {:>8} {:>12} {:>10} {:>10} {:>12} {:>10}",
        "Strategy", "Width", "Delivered", "Expired", "Moves", "Cash", "Time"
    );
    println!("{}", "-".repeat(80));
    println!(
        "{:<12} {:>8} {:>8}/{:<3} {:>10} {:>10} {:>12} {:>10}",
        result.policy_name,
        result.width,
        result.delivered,
        result.total_containers,
        result.expired,
        result.relocations,
        result.final_cash,
        result.final_time,
    );
    if result.resumed_scans > 0 {
        println!("\n{} arrivals resumed the scan mid-sequence", result.resumed_scans);
    }
}

fn print_report(report: &VerificationReport) {
    println!("Log {} (width {}) is valid", report.name, report.width);
    println!("  Actions:   {}", report.actions);
    println!("  Delivered: {}", report.delivered);
    println!("  Expired:   {}", report.expired);
    println!("  Discarded: {}", report.discarded);
    println!("  Remaining: {}", report.remaining.len());
    println!("  Last time: {}", report.last_time);
    println!("  Cash:      {}", report.final_cash);
}
