//! `slots` CLI — compute a worker's bookable slots from a JSON dataset.
//!
//! ## Usage
//!
//! ```sh
//! # Hour-long slots for worker w1 on a Monday (dataset from file)
//! slots compute --data workers.json --worker w1 --date 2026-03-16
//!
//! # 90-minute slots, dataset from stdin, New York wall-clock
//! cat workers.json | slots compute --worker w1 --date 2026-03-16 --duration 90 \
//!     --timezone America/New_York
//!
//! # Engine settings from a TOML file, result written to a file
//! slots compute -d workers.json -w w1 --date 2026-03-16 --config engine.toml -o out.json
//!
//! # Which candidates were dropped, and what blocked each one
//! slots conflicts --data workers.json --worker w1 --date 2026-03-16
//!
//! # List a worker's recurring rules
//! slots rules --data workers.json --worker w1
//! ```
//!
//! Logs go to stderr. `-v` enables debug output for the engine; `RUST_LOG` overrides.

use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use slot_engine::{validate_duration, AvailabilityService, EngineConfig, InMemoryStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compute bookable time slots from recurring availability"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute available slots for a worker on a date
    Compute {
        #[command(flatten)]
        query: QueryArgs,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the candidate slots that were excluded and the intervals blocking them
    Conflicts {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// List a worker's recurring availability rules
    Rules {
        /// Dataset JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        data: Option<String>,
        /// Worker identifier
        #[arg(short, long)]
        worker: String,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Dataset JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    data: Option<String>,
    /// Worker identifier
    #[arg(short, long)]
    worker: String,
    /// Calendar date, YYYY-MM-DD
    #[arg(long)]
    date: String,
    /// Slot length in minutes (defaults to the configured default duration)
    #[arg(long, allow_negative_numbers = true)]
    duration: Option<i64>,
    /// Engine configuration TOML file
    #[arg(short, long)]
    config: Option<String>,
    /// IANA time zone, overrides the config file
    #[arg(long)]
    timezone: Option<String>,
}

/// A validated query, ready to run.
struct Query {
    service: AvailabilityService<Arc<InMemoryStore>, Arc<InMemoryStore>>,
    worker: String,
    date: NaiveDate,
    duration: i64,
}

impl QueryArgs {
    fn into_query(self) -> Result<Query> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", self.date))?;
        let config = load_config(self.config.as_deref(), self.timezone.as_deref())?;
        let duration = validate_duration(self.duration.unwrap_or(config.default_duration_minutes))?;

        Ok(Query {
            service: build_service(self.data.as_deref(), config)?,
            worker: self.worker,
            date,
            duration,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compute { query, output } => {
            let q = query.into_query()?;
            let slots = q
                .service
                .compute_available_slots(&q.worker, q.date, q.duration)
                .await
                .context("Failed to compute available slots")?;

            let json = serde_json::to_string_pretty(&slots)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Conflicts { query } => {
            let q = query.into_query()?;
            let excluded = q
                .service
                .explain_excluded(&q.worker, q.date, q.duration)
                .await
                .context("Failed to compute excluded slots")?;
            println!("{}", serde_json::to_string_pretty(&excluded)?);
        }
        Commands::Rules { data, worker } => {
            let service = build_service(data.as_deref(), EngineConfig::default())?;
            let rules = service
                .worker_rules(&worker)
                .await
                .context("Failed to fetch availability rules")?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "slot_engine=warn",
        1 => "slot_engine=debug",
        _ => "slot_engine=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Config from `--config` (or defaults), with `--timezone` applied on top.
fn load_config(path: Option<&str>, timezone: Option<&str>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };

    if let Some(name) = timezone {
        config.timezone = EngineConfig::with_timezone(name)?.timezone;
    }

    tracing::debug!(
        timezone = %config.timezone,
        step = config.slot_step_minutes,
        merge = config.merge_overlapping_rules,
        "engine config"
    );
    Ok(config)
}

fn build_service(
    data: Option<&str>,
    config: EngineConfig,
) -> Result<AvailabilityService<Arc<InMemoryStore>, Arc<InMemoryStore>>> {
    let json = read_input(data)?;
    let store = Arc::new(InMemoryStore::from_json_str(&json).context("Failed to load dataset")?);
    Ok(AvailabilityService::new(store.clone(), store, config))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
