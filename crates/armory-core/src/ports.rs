//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the catalog domain and external
//! adapters. The cache depends on them so tests can swap in fakes.

use crate::catalog::{Endpoint, Language};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Remote source of raw catalog documents.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the raw document for an endpoint in a language.
    async fn fetch(&self, endpoint: Endpoint, language: Language) -> Result<Value>;
}

/// Wall clock used for cache timestamps and expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
