//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Fetch a document and open it, falling back to the browser.
///
/// Downloads PDF, Word and plain-text documents into the download directory and
/// opens them with the registered viewer. Anything else (viewer pages, error
/// responses, unsupported types) is handed to an external application.
#[derive(Parser, Debug)]
#[command(name = "fetcher")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the document to fetch
    pub url: String,

    /// File name to save the document under (derived from the response when omitted)
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Directory that receives saved documents
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Extra attempts after a transient network failure (0-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: Option<u8>,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Config file path (defaults to $XDG_CONFIG_HOME/fetcher/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
