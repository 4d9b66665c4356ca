//! Constants for the fetch module (timeouts, host rules, filename fallbacks).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Hosts that serve viewer pages instead of direct downloads.
pub const DEFAULT_BROWSER_ONLY_HOSTS: [&str; 2] = ["drive.google.com", "docs.google.com"];

/// Prefix for generated filenames when no name is supplied.
pub const DEFAULT_FILE_PREFIX: &str = "resource";

/// Extension used when neither the content type nor the URL reveals one.
pub const FALLBACK_EXTENSION: &str = ".download";

/// Application directory name under the XDG data/config roots.
pub const APP_DIR_NAME: &str = "fetcher";
