//! The fetch-and-open pipeline.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::config::FetcherConfig;
use super::error::{FetchError, TransportError};
use super::filename::{ChosenName, choose_filename, numbered_variant};
use super::outcome::FetchOutcome;
use super::policy::{HostPolicy, classify_payload, mime_for_file_name};
use super::retry::{RetryDecision, RetryPolicy};
use super::task::FetchTask;
use super::transport::{HttpTransport, Transport};
use crate::open::{ExternalOpenChain, FileViewer, Platform, SystemFileViewer};

/// Upper bound on numbered variants tried for a generated name.
const MAX_NAME_SUFFIX: usize = 1000;

/// Fetches documents to disk and opens them, falling back to external
/// applications when anything goes wrong.
///
/// Cloning is cheap; clones share the same transport, viewer and chain.
/// Calls hold no mutable state and may run concurrently.
#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Box<dyn Transport>,
    viewer: Box<dyn FileViewer>,
    chain: ExternalOpenChain,
    hosts: HostPolicy,
    download_dir: PathBuf,
    file_prefix: String,
}

/// Builder for [`Fetcher`]; unset collaborators default to the system ones.
pub struct FetcherBuilder {
    config: FetcherConfig,
    transport: Option<Box<dyn Transport>>,
    viewer: Option<Box<dyn FileViewer>>,
    chain: Option<ExternalOpenChain>,
}

impl FetcherBuilder {
    /// Uses a custom transport instead of [`HttpTransport`].
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Uses a custom file viewer instead of [`SystemFileViewer`].
    #[must_use]
    pub fn viewer(mut self, viewer: impl FileViewer + 'static) -> Self {
        self.viewer = Some(Box::new(viewer));
        self
    }

    /// Uses a custom external-open chain instead of [`ExternalOpenChain::system`].
    #[must_use]
    pub fn chain(mut self, chain: ExternalOpenChain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Builds the fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if no transport was supplied and the
    /// default HTTP client cannot be built.
    pub fn build(self) -> Result<Fetcher, TransportError> {
        let platform = Platform::current();
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(&self.config)?),
        };
        let viewer = self
            .viewer
            .unwrap_or_else(|| Box::new(SystemFileViewer::new(platform)));
        let chain = self
            .chain
            .unwrap_or_else(|| ExternalOpenChain::system(platform));
        debug!(
            download_dir = %self.config.download_dir.display(),
            strategies = ?chain.names(),
            "fetcher configured"
        );

        Ok(Fetcher {
            inner: Arc::new(Inner {
                transport,
                viewer,
                chain,
                hosts: HostPolicy::new(&self.config.browser_only_hosts),
                download_dir: self.config.download_dir,
                file_prefix: self.config.file_prefix,
            }),
        })
    }
}

impl Fetcher {
    /// Starts a builder from `config`.
    #[must_use]
    pub fn builder(config: FetcherConfig) -> FetcherBuilder {
        FetcherBuilder {
            config,
            transport: None,
            viewer: None,
            chain: None,
        }
    }

    /// Creates a fetcher wired to the HTTP client and the desktop launchers.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn system(config: FetcherConfig) -> Result<Self, TransportError> {
        Self::builder(config).build()
    }

    /// Directory receiving saved documents.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.inner.download_dir
    }

    /// Fetches `url`, saves it under `suggested_name` (or a derived name) and
    /// opens it. Never fails: every error is classified into a [`FetchOutcome`].
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str, suggested_name: &str) -> FetchOutcome {
        let outcome = self.fetch_inner(url, suggested_name).await;
        info!(
            outcome = outcome.label(),
            status = ?outcome.status_code(),
            "fetch finished"
        );
        outcome
    }

    /// Runs [`fetch`](Self::fetch) until the outcome is not retryable under
    /// `policy` or attempts are exhausted.
    #[instrument(skip(self, policy), fields(url = %url, max_attempts = policy.max_attempts()))]
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        suggested_name: &str,
        policy: &RetryPolicy,
    ) -> FetchOutcome {
        let mut attempt: u32 = 1;
        loop {
            let outcome = self.fetch(url, suggested_name).await;
            match policy.should_retry(outcome, attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    info!(
                        attempt = next,
                        delay_ms = delay.as_millis(),
                        outcome = outcome.label(),
                        "retrying fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(attempt, reason = %reason, "not retrying");
                    return outcome;
                }
            }
        }
    }

    /// Runs the fetch on the tokio runtime, off the caller's task.
    ///
    /// Dropping or cancelling the returned [`FetchTask`] aborts the in-flight
    /// fetch.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use = "dropping the task cancels the fetch"]
    pub fn spawn(&self, url: impl Into<String>, suggested_name: impl Into<String>) -> FetchTask {
        let fetcher = self.clone();
        let url = url.into();
        let suggested_name = suggested_name.into();
        FetchTask::new(tokio::spawn(async move {
            fetcher.fetch(&url, &suggested_name).await
        }))
    }

    async fn fetch_inner(&self, raw_url: &str, suggested_name: &str) -> FetchOutcome {
        let Some(url) = validate_url(raw_url) else {
            warn!("rejecting invalid URL");
            return FetchOutcome::InvalidInput;
        };

        if let Some(rule) = self.inner.hosts.browser_only_rule(&url) {
            debug!(rule, "browser-only host, skipping local save");
            return self
                .open_externally_or(&url, FetchOutcome::NoHandlerAvailable)
                .await;
        }

        let response = match self.inner.transport.get(url.as_str()).await {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "request failed, opening externally");
                return self
                    .open_externally_or(&url, FetchOutcome::NetworkFailure(None))
                    .await;
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "error status, opening externally");
            return self
                .open_externally_or(&url, FetchOutcome::NetworkFailure(Some(response.status)))
                .await;
        }

        let Some(kind) = classify_payload(response.content_type.as_deref(), &url) else {
            warn!(
                content_type = ?response.content_type,
                "unsupported payload type, opening externally"
            );
            return self
                .open_externally_or(&url, FetchOutcome::UnsupportedPayloadType)
                .await;
        };

        if response.body.is_empty() {
            warn!(?kind, "empty payload");
            return FetchOutcome::EmptyPayload;
        }

        let file_name = choose_filename(
            suggested_name,
            response.content_disposition.as_deref(),
            response.content_type.as_deref(),
            &url,
            &self.inner.file_prefix,
        );

        let path = match self.persist(&file_name, &response.body).await {
            Ok(path) => path,
            Err(error @ FetchError::NotPersisted { .. }) => {
                warn!(error = %error, "saved file is not usable");
                return FetchOutcome::WriteFailed;
            }
            Err(error) => {
                warn!(error = %error, "could not save payload, opening externally");
                return self
                    .open_externally_or(&url, FetchOutcome::WriteFailed)
                    .await;
            }
        };

        let mime = mime_for_file_name(&file_name.name);
        match self.inner.viewer.open_file(&path, mime).await {
            Ok(()) => {
                info!(path = %path.display(), mime, "opened saved file");
                FetchOutcome::Success
            }
            Err(error) => {
                warn!(error = %error, path = %path.display(), "no viewer for saved file, opening externally");
                self.open_externally_or(&url, FetchOutcome::NoHandlerAvailable)
                    .await
            }
        }
    }

    /// Runs the external-open chain, returning `exhausted` when every
    /// strategy failed.
    async fn open_externally_or(&self, url: &Url, exhausted: FetchOutcome) -> FetchOutcome {
        match self.inner.chain.open(url.as_str()).await {
            Some(_) => FetchOutcome::OpenedExternally,
            None => exhausted,
        }
    }

    /// Writes `body` into the download directory.
    ///
    /// Given names replace an existing file. Generated names claim a path no
    /// other call holds, adding a numeric suffix while the name is taken.
    async fn persist(&self, chosen: &ChosenName, body: &[u8]) -> Result<PathBuf, FetchError> {
        let dir = &self.inner.download_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| FetchError::io(dir.clone(), e))?;

        let (path, file) = if chosen.is_generated() {
            create_unique(dir, &chosen.name).await?
        } else {
            let path = dir.join(&chosen.name);
            let file = File::create(&path)
                .await
                .map_err(|e| FetchError::io(path.clone(), e))?;
            (path, file)
        };
        let mut writer = BufWriter::new(file);
        writer
            .write_all(body)
            .await
            .map_err(|e| FetchError::io(path.clone(), e))?;
        writer
            .flush()
            .await
            .map_err(|e| FetchError::io(path.clone(), e))?;

        let written = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(FetchError::not_persisted(path));
        }

        info!(path = %path.display(), bytes = written, "payload saved");
        Ok(path)
    }
}

/// Creates `name` in `dir` without replacing anything, falling back to
/// `stem_2.ext`, `stem_3.ext`, ... when it already exists.
async fn create_unique(dir: &Path, name: &str) -> Result<(PathBuf, File), FetchError> {
    let candidates =
        std::iter::once(name.to_string()).chain((2..MAX_NAME_SUFFIX).map(|n| numbered_variant(name, n)));
    for candidate in candidates {
        let path = dir.join(&candidate);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "generated name taken");
            }
            Err(e) => return Err(FetchError::io(path, e)),
        }
    }
    Err(FetchError::io(
        dir.join(name),
        std::io::Error::new(ErrorKind::AlreadyExists, "no free name for generated file"),
    ))
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("download_dir", &self.inner.download_dir)
            .field("hosts", &self.inner.hosts)
            .field("chain", &self.inner.chain)
            .finish_non_exhaustive()
    }
}

/// Parses `raw` as an absolute `http`/`https` URL with a host.
#[must_use]
pub fn validate_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}
