//! Ordered external-open chain.

use tracing::{debug, info, warn};

use super::{OpenStrategy, Platform, system};

/// An ordered collection of [`OpenStrategy`] implementations.
///
/// Strategies are tried in registration order; the first one that succeeds
/// short-circuits the rest.
#[derive(Default)]
pub struct ExternalOpenChain {
    strategies: Vec<Box<dyn OpenStrategy>>,
}

impl ExternalOpenChain {
    /// Creates an empty chain. An empty chain never opens anything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Builds the default desktop chain for `platform`:
    /// browser variable, plain system open, typed open, chooser.
    #[must_use]
    pub fn system(platform: Platform) -> Self {
        let mut chain = Self::new();
        chain.register(Box::new(system::BrowserEnvStrategy::from_env()));
        chain.register(Box::new(system::SystemOpenStrategy::new(platform)));
        chain.register(Box::new(system::TypedOpenStrategy::new(platform)));
        chain.register(Box::new(system::ChooserStrategy::new(platform)));
        chain
    }

    /// Appends a strategy to the end of the chain.
    #[tracing::instrument(skip(self, strategy), fields(strategy_name))]
    pub fn register(&mut self, strategy: Box<dyn OpenStrategy>) {
        tracing::Span::current().record("strategy_name", strategy.name());
        debug!(name = strategy.name(), position = self.strategies.len(), "Registering open strategy");
        self.strategies.push(strategy);
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategy names in the order they will be tried.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Hands `url` to the strategies in order.
    ///
    /// Returns the name of the strategy that succeeded, or `None` once every
    /// strategy failed.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn open(&self, url: &str) -> Option<&str> {
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), "Trying open strategy");
            match strategy.open_url(url).await {
                Ok(()) => {
                    info!(strategy = strategy.name(), "Opened URL externally");
                    return Some(strategy.name());
                }
                Err(error) => {
                    debug!(strategy = strategy.name(), error = %error, "Open strategy failed");
                }
            }
        }
        warn!(tried = self.strategies.len(), "All open strategies failed");
        None
    }
}

impl std::fmt::Debug for ExternalOpenChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalOpenChain")
            .field("strategies", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::open::OpenError;

    struct CountingStrategy {
        name: &'static str,
        succeeds: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OpenStrategy for CountingStrategy {
        fn name(&self) -> &str {
            self.name
        }

        async fn open_url(&self, _url: &str) -> Result<(), OpenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeeds {
                Ok(())
            } else {
                Err(OpenError::no_handler("stub"))
            }
        }
    }

    fn strategy(name: &'static str, succeeds: bool) -> (Box<dyn OpenStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(CountingStrategy {
                name,
                succeeds,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut chain = ExternalOpenChain::new();
        let (a, a_calls) = strategy("a", false);
        let (b, b_calls) = strategy("b", true);
        let (c, c_calls) = strategy("c", true);
        chain.register(a);
        chain.register(b);
        chain.register(c);
        assert_eq!(chain.len(), 3);

        assert_eq!(chain.open("https://example.com").await, Some("b"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_returns_none_after_trying_all() {
        let mut chain = ExternalOpenChain::new();
        let (a, a_calls) = strategy("a", false);
        let (b, b_calls) = strategy("b", false);
        chain.register(a);
        chain.register(b);

        assert_eq!(chain.open("https://example.com").await, None);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_opens_nothing() {
        let chain = ExternalOpenChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.open("https://example.com").await, None);
    }

    #[test]
    fn test_system_chain_order() {
        let chain = ExternalOpenChain::system(Platform::Linux);
        assert_eq!(chain.len(), 4);
        assert_eq!(
            chain.names(),
            vec!["browser-env", "system-open", "typed-open", "chooser"]
        );
    }
}
