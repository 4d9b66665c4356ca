//! Shared test doubles for fetcher integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fetcher_core::{ExternalOpenChain, FileViewer, OpenError, OpenStrategy};

/// Viewer that records every opened path and succeeds or fails on demand.
#[derive(Clone, Default)]
pub struct RecordingViewer {
    pub fail: bool,
    pub opened: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl RecordingViewer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<(PathBuf, String)> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileViewer for RecordingViewer {
    async fn open_file(&self, path: &Path, mime: &str) -> Result<(), OpenError> {
        if self.fail {
            return Err(OpenError::no_handler("test viewer refuses"));
        }
        self.opened
            .lock()
            .unwrap()
            .push((path.to_path_buf(), mime.to_string()));
        Ok(())
    }
}

/// External-open strategy that counts calls.
#[derive(Clone)]
pub struct CountingStrategy {
    pub succeed: bool,
    pub calls: Arc<AtomicUsize>,
}

impl CountingStrategy {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OpenStrategy for CountingStrategy {
    fn name(&self) -> &str {
        "counting"
    }

    async fn open_url(&self, _url: &str) -> Result<(), OpenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(OpenError::no_handler("test strategy refuses"))
        }
    }
}

/// Builds a chain holding a single strategy.
pub fn chain_of(strategy: &CountingStrategy) -> ExternalOpenChain {
    let mut chain = ExternalOpenChain::new();
    chain.register(Box::new(strategy.clone()));
    chain
}
