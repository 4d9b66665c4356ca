//! Fetcher Core Library
//!
//! Retrieves a document from a URL, saves it locally and opens it with a
//! registered viewer. When the download or the viewer is not possible, the URL
//! is handed to an external application through an ordered fallback chain.
//!
//! # Architecture
//!
//! - [`fetch`] - Fetch pipeline, outcomes, payload/host policies, retry
//! - [`open`] - File viewer and external-open strategies

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fetch;
pub mod open;
mod user_agent;

// Re-export commonly used types
pub use fetch::{
    FetchOutcome, FetchTask, Fetcher, FetcherConfig, HttpTransport, RetryPolicy, Transport,
    TransportResponse,
};
pub use open::{ExternalOpenChain, FileViewer, OpenError, OpenStrategy, Platform};
