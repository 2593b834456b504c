//! In-memory stand-ins for the upstream catalog and the wall clock.

use armory_core::ports::{CatalogSource, Clock};
use armory_core::{Endpoint, Error, Language, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Serves fixed documents and counts every fetch.
///
/// Documents are the same in every language. An endpoint without a document
/// serves an empty list.
#[derive(Default)]
pub struct StaticSource {
    documents: HashMap<Endpoint, Value>,
    failing: Mutex<HashSet<Endpoint>>,
    calls: Mutex<HashMap<(Endpoint, Language), usize>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, endpoint: Endpoint, data: Value) -> Self {
        self.documents.insert(endpoint, data);
        self
    }

    /// Make every later fetch of `endpoint` fail.
    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
    }

    /// Fetches of one endpoint in one language.
    pub fn calls(&self, endpoint: Endpoint, language: Language) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(endpoint, language))
            .copied()
            .unwrap_or(0)
    }

    /// Fetches of anything.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn fetch(&self, endpoint: Endpoint, language: Language) -> Result<Value> {
        *self.calls.lock().unwrap().entry((endpoint, language)).or_insert(0) += 1;

        if self.failing.lock().unwrap().contains(&endpoint) {
            return Err(Error::UpstreamFetchFailed {
                url: format!("static://{}/{}", language.code(), endpoint.path()),
                reason: "HTTP 503".to_string(),
            });
        }
        Ok(self
            .documents
            .get(&endpoint)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }
}

/// A clock that only moves when told to.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Mutex::new(Utc::now()))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
