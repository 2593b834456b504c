//! Test context wiring a service over in-memory infrastructure.

use crate::fixtures::CatalogFixture;
use crate::helpers::start_test_server;
use crate::sources::{ManualClock, StaticSource};
use armory_cache::{CacheConfig, CatalogCache};
use armory_engine::CatalogService;
use std::net::SocketAddr;
use std::sync::Arc;

/// A catalog service over a [`StaticSource`] and a [`ManualClock`].
pub struct TestContext {
    pub source: Arc<StaticSource>,
    pub clock: Arc<ManualClock>,
    pub service: CatalogService,
}

impl TestContext {
    /// Create a context serving [`CatalogFixture`].
    pub fn new() -> Self {
        Self::with_source(CatalogFixture::source())
    }

    pub fn with_source(source: StaticSource) -> Self {
        crate::init_test_logging();

        let source = Arc::new(source);
        let clock = Arc::new(ManualClock::new());
        let cache = CatalogCache::with_clock(source.clone(), clock.clone(), CacheConfig::default());

        Self {
            source,
            clock,
            service: CatalogService::new(cache),
        }
    }

    /// Serve this context's service over HTTP.
    pub async fn start_server(&self) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
        start_test_server(self.service.clone()).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
