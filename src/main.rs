//! CLI entry point for the fetcher tool.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use fetcher_core::{FetchOutcome, Fetcher, RetryPolicy};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{load_file_config, resolve_settings};
use cli::Args;

/// Process exit status derived from a [`FetchOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
    InvalidInput,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::InvalidInput => 2,
        }
    }
}

fn determine_exit(outcome: FetchOutcome) -> ProcessExit {
    if outcome.is_opened() {
        ProcessExit::Success
    } else if outcome == FetchOutcome::InvalidInput {
        ProcessExit::InvalidInput
    } else {
        ProcessExit::Failure
    }
}

fn init_tracing(args: &Args) {
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the outcome message only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);
    debug!(?args, "CLI arguments parsed");

    let file_config = load_file_config(args.config.as_deref())?;
    let settings = resolve_settings(&args, file_config.as_ref());
    let fetcher = Fetcher::system(settings.fetcher)?;
    debug!(
        download_dir = %fetcher.download_dir().display(),
        max_retries = settings.max_retries,
        "settings resolved"
    );
    let policy = RetryPolicy::with_max_attempts(u32::from(settings.max_retries) + 1);

    info!(url = %args.url, "Fetcher starting");
    let outcome = fetcher.fetch_with_retry(&args.url, &args.name, &policy).await;

    println!("{outcome}");
    if outcome.should_retry_in_browser() {
        println!("You can open it in a browser instead: {}", args.url.trim());
    }

    Ok(ExitCode::from(determine_exit(outcome).code()))
}
