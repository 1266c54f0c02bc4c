//! Tapo replay binary.
//!
//! # Usage
//!
//! ```bash
//! # Toggle a plug and read it back
//! tapo-replay --fixture p100.json requests.json
//!
//! # Hub with a paired TRV, printing the final state
//! tapo-replay --fixture h100.json --fixture hub_children/trv_ke100.json \
//!     --dump-state requests.json
//! ```

use std::{io::Write, path::PathBuf, process::ExitCode};

use clap::Parser;
use tapo_harness::FixtureConfig;
use tapo_proto::DEFAULT_RETRIES;
use tapo_replay::{ReplayConfig, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Replay Tapo requests against fixture-backed devices
#[derive(Parser, Debug)]
#[command(name = "tapo-replay")]
#[command(about = "Replay Tapo protocol requests against a simulated device")]
#[command(version)]
struct Args {
    /// Fixture to load; repeat to layer fixtures (later ones win)
    #[arg(short, long = "fixture", required = true)]
    fixtures: Vec<PathBuf>,

    /// Directory for relative fixture names
    /// (default: $TAPO_FIXTURES_DIR, then the bundled fixtures)
    #[arg(long)]
    fixtures_dir: Option<PathBuf>,

    /// Retry budget passed with every request
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    retry: u32,

    /// Write the final state mapping after the last response
    #[arg(long)]
    dump_state: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// JSON file holding an array of requests
    requests: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the replay output, logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = ReplayConfig::new(args.fixtures, args.requests);
    if let Some(dir) = args.fixtures_dir {
        config.fixtures = FixtureConfig::new(dir);
    }
    config.retry = args.retry;
    config.dump_state = args.dump_state;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run(&config, &mut out).await?;
    out.flush()?;

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("{} of {} requests failed", summary.failed, summary.sent);
        Ok(ExitCode::FAILURE)
    }
}
