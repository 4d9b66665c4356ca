//! Error types for the fetch module.
//!
//! These errors never leave [`Fetcher::fetch`](super::Fetcher::fetch); they carry
//! context for logging and are then classified into a
//! [`FetchOutcome`](super::FetchOutcome).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`Transport`](super::Transport) while performing a GET.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Creates a network error from any client error.
    pub fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a client construction error.
    pub fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }
}

/// Errors raised while persisting a fetched payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// File system error while creating the directory or writing the file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file was written but is missing or empty on disk.
    #[error("saved file {path} is missing or empty")]
    NotPersisted {
        /// The expected file path.
        path: PathBuf,
    },
}

impl FetchError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a not-persisted error.
    pub fn not_persisted(path: impl Into<PathBuf>) -> Self {
        Self::NotPersisted { path: path.into() }
    }
}
