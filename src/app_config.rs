//! Application configuration loading and CLI merging.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use fetcher_core::fetch::{APP_DIR_NAME, FetcherConfig};
use serde::Deserialize;

use crate::cli::Args;

/// TOML-backed file configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Directory that receives saved documents.
    pub output_dir: Option<PathBuf>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Extra attempts after transient network failures.
    pub max_retries: Option<u8>,
    /// Hosts always opened externally; replaces the built-in list.
    pub browser_only_hosts: Option<Vec<String>>,
    /// Prefix for generated filenames.
    pub file_prefix: Option<String>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;

        if let Some(retries) = self.max_retries
            && retries > 10
        {
            bail!("Invalid config value for `max_retries`: {retries}. Expected range: 0..=10");
        }

        if let Some(prefix) = &self.file_prefix
            && prefix.trim().is_empty()
        {
            bail!("Invalid config value for `file_prefix`: must not be empty");
        }

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Settings after merging CLI flags over the file config over defaults.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub fetcher: FetcherConfig,
    pub max_retries: u8,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/fetcher/config.toml`
/// 2. `$HOME/.config/fetcher/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(APP_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return load_from_path(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => load_from_path(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_from_path(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

/// Merges CLI flags over the file config over built-in defaults.
#[must_use]
pub fn resolve_settings(args: &Args, file: Option<&FileConfig>) -> ResolvedSettings {
    let mut fetcher = FetcherConfig::default();
    let file = file.cloned().unwrap_or_default();

    if let Some(dir) = args.output_dir.clone().or(file.output_dir) {
        fetcher.download_dir = dir;
    }
    if let Some(secs) = args.connect_timeout.or(file.connect_timeout_secs) {
        fetcher.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.read_timeout.or(file.read_timeout_secs) {
        fetcher.read_timeout = Duration::from_secs(secs);
    }
    if let Some(hosts) = file.browser_only_hosts {
        fetcher.browser_only_hosts = hosts;
    }
    if let Some(prefix) = file.file_prefix {
        fetcher.file_prefix = prefix.trim().to_string();
    }

    ResolvedSettings {
        fetcher,
        max_retries: args.max_retries.or(file.max_retries).unwrap_or(0),
    }
}
