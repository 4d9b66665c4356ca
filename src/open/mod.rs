//! Handing resources to applications outside the fetcher.
//!
//! # Architecture
//!
//! - [`FileViewer`] - Opens a saved local file with a registered viewer
//! - [`OpenStrategy`] - One way of handing a URL to an external application
//! - [`ExternalOpenChain`] - Ordered strategies, first success wins
//! - [`system`] - Desktop implementations built on the OS launchers

mod chain;
mod error;
pub mod system;

pub use chain::ExternalOpenChain;
pub use error::OpenError;
pub use system::{
    BrowserEnvStrategy, ChooserStrategy, Platform, SystemFileViewer, SystemOpenStrategy,
    TypedOpenStrategy,
};

use std::path::Path;

use async_trait::async_trait;

/// A single strategy for opening a URL in an external application.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn OpenStrategy>` inside [`ExternalOpenChain`].
#[async_trait]
pub trait OpenStrategy: Send + Sync {
    /// Returns the strategy's name (e.g., "browser-env", "system-open").
    fn name(&self) -> &str;

    /// Attempts to open `url`. `Ok(())` means an application accepted it.
    async fn open_url(&self, url: &str) -> Result<(), OpenError>;
}

/// Opens a saved file with whatever viewer is registered for its type.
#[async_trait]
pub trait FileViewer: Send + Sync {
    /// Attempts to open `path` as `mime` (`*/*` when unknown).
    async fn open_file(&self, path: &Path, mime: &str) -> Result<(), OpenError>;
}
