//! Runtime settings for a [`Fetcher`](super::Fetcher).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::constants::{
    APP_DIR_NAME, CONNECT_TIMEOUT_SECS, DEFAULT_BROWSER_ONLY_HOSTS, DEFAULT_FILE_PREFIX,
    READ_TIMEOUT_SECS,
};

/// Settings consumed by the fetcher and its HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Directory that receives saved documents. Created on first save.
    pub download_dir: PathBuf,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Per-read timeout while receiving the body.
    pub read_timeout: Duration,
    /// Hosts routed straight to the external-open chain.
    pub browser_only_hosts: Vec<String>,
    /// Prefix for generated filenames (`<prefix>_<millis><ext>`).
    pub file_prefix: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            browser_only_hosts: DEFAULT_BROWSER_ONLY_HOSTS
                .iter()
                .map(|host| (*host).to_string())
                .collect(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Returns the default configuration with a custom download directory.
    #[must_use]
    pub fn with_download_dir(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            ..Self::default()
        }
    }
}

/// Resolves the default download directory.
///
/// Priority:
/// 1. `$XDG_DATA_HOME/fetcher/downloads`
/// 2. `$HOME/.local/share/fetcher/downloads`
/// 3. `./downloads`
#[must_use]
pub fn default_download_dir() -> PathBuf {
    if let Some(xdg_data_home) = env_var_non_empty_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home)
            .join(APP_DIR_NAME)
            .join("downloads");
    }

    match env_var_non_empty_os("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR_NAME)
            .join("downloads"),
        None => PathBuf::from("downloads"),
    }
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
