//! Fetch a document to disk and open it, with an external-open fallback.
//!
//! # Flow
//!
//! 1. Validate the URL (`http`/`https` with a host)
//! 2. Route browser-only hosts straight to the external-open chain
//! 3. GET with bounded connect/read timeouts
//! 4. Error status, transport failure or non-document payload: external open
//! 5. Save the body to the download directory and open it with a viewer
//!
//! Every path ends in a [`FetchOutcome`]; `fetch` never returns an error.
//!
//! # Example
//!
//! ```no_run
//! use fetcher_core::fetch::{Fetcher, FetcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::system(FetcherConfig::default())?;
//! let outcome = fetcher
//!     .fetch("https://example.com/resume.pdf", "resume.pdf")
//!     .await;
//! if outcome.should_retry_in_browser() {
//!     println!("{outcome}. Open it in a browser instead?");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod error;
mod fetcher;
mod filename;
mod outcome;
pub mod policy;
mod retry;
mod task;
mod transport;

pub use config::{FetcherConfig, default_download_dir};
pub use constants::{
    APP_DIR_NAME, CONNECT_TIMEOUT_SECS, DEFAULT_BROWSER_ONLY_HOSTS, DEFAULT_FILE_PREFIX,
    READ_TIMEOUT_SECS,
};
pub use error::{FetchError, TransportError};
pub use fetcher::{Fetcher, FetcherBuilder, validate_url};
pub use filename::{ChosenName, NameSource, choose_filename, generate_filename};
pub use outcome::FetchOutcome;
pub use policy::{DocumentKind, HostPolicy};
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_outcome};
pub use task::FetchTask;
pub use transport::{HttpTransport, Transport, TransportResponse};
