//! In-memory TTL cache of catalog documents.

use crate::config::CacheConfig;
use crate::keys::{cache_key, fingerprint, hash_preview};
use crate::types::{CacheEntry, CacheStats, EntryDetail, EntrySnapshot, IntegrityReport};
use armory_core::ports::{CatalogSource, Clock, SystemClock};
use armory_core::{Document, Endpoint, Error, Language, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Read-through cache keyed by `(endpoint, language)`.
///
/// Cheap to clone; clones share the same entries. Expiry is lazy: an expired
/// entry stays in place until the next fetch for its key replaces it.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// One lock per key so concurrent misses make a single upstream call.
    fetch_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CatalogCache {
    /// Create a cache over a source, using the system clock.
    pub fn new(source: Arc<dyn CatalogSource>, config: CacheConfig) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), config)
    }

    /// Create a cache with an explicit clock.
    pub fn with_clock(
        source: Arc<dyn CatalogSource>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                ttl: config.ttl,
                entries: RwLock::new(HashMap::new()),
                fetch_locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Return the document for an endpoint, fetching it if absent or expired.
    ///
    /// A failed fetch is returned as an error even when an expired entry
    /// exists for the key.
    pub async fn fetch(&self, endpoint: Endpoint, language: Language) -> Result<Arc<Document>> {
        let key = cache_key(endpoint, language);

        if let Some(document) = self.inner.live(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(document);
        }

        // The refresh runs detached so a caller that goes away mid-fetch
        // still leaves a complete entry behind.
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.refresh(endpoint, language, key).await })
            .await
            .map_err(|e| Error::Internal(format!("Cache refresh task failed: {}", e)))?
    }

    /// Drop every entry.
    pub async fn invalidate_all(&self) {
        let mut entries = self.inner.entries.write().await;
        let count = entries.len();
        entries.clear();
        info!(count, "Cache cleared");
    }

    /// Recompute every fingerprint and report the keys that no longer match.
    pub async fn integrity_check(&self) -> IntegrityReport {
        let entries = self.inner.entries.read().await;
        let mut invalid_entries: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| {
                fingerprint(&entry.document.data)
                    .map(|hash| hash != entry.hash)
                    .unwrap_or(true)
            })
            .map(|(key, _)| key.clone())
            .collect();
        invalid_entries.sort();

        for key in &invalid_entries {
            warn!(key = %key, "Cache integrity check failed");
        }

        IntegrityReport {
            valid: invalid_entries.is_empty(),
            invalid_entries,
        }
    }

    /// Entry count, keys and per-entry hash previews and ages. Keys are sorted.
    pub async fn stats(&self) -> CacheStats {
        let now = self.inner.clock.now();
        let entries = self.inner.entries.read().await;

        let mut details: Vec<EntryDetail> = entries
            .iter()
            .map(|(key, entry)| EntryDetail {
                key: key.clone(),
                hash: hash_preview(&entry.hash),
                age: entry.age_secs(now),
            })
            .collect();
        details.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: details.len(),
            keys: details.iter().map(|d| d.key.clone()).collect(),
            hashes: details.iter().map(|d| d.hash.clone()).collect(),
            details,
        }
    }

    /// Look up a single entry by its cache key, live or expired.
    pub async fn get_entry(&self, key: &str) -> Result<EntrySnapshot> {
        let now = self.inner.clock.now();
        let entries = self.inner.entries.read().await;
        let entry = entries
            .get(key)
            .ok_or_else(|| Error::CacheEntryNotFound(key.to_string()))?;

        Ok(EntrySnapshot {
            data: entry.document.clone(),
            hash: entry.hash.clone(),
            age: entry.age_secs(now),
        })
    }
}

impl Inner {
    fn is_live(&self, stored_at: DateTime<Utc>) -> bool {
        // A timestamp in the future (clock skew) counts as fresh.
        (self.clock.now() - stored_at)
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(true)
    }

    async fn live(&self, key: &str) -> Option<Arc<Document>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| self.is_live(entry.stored_at))
            .map(|entry| entry.document.clone())
    }

    async fn fetch_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.fetch_locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }

    async fn refresh(&self, endpoint: Endpoint, language: Language, key: String) -> Result<Arc<Document>> {
        let lock = self.fetch_lock(&key).await;
        let _guard = lock.lock().await;

        // Another task may have filled the entry while we waited.
        if let Some(document) = self.live(&key).await {
            debug!(key = %key, "Cache filled by concurrent fetch");
            return Ok(document);
        }

        info!(key = %key, endpoint = %endpoint, language = %language, "Fetching catalog document");

        let data = self
            .source
            .fetch(endpoint, language)
            .await
            .map_err(|e| match e {
                Error::UpstreamFetchFailed { .. } => e,
                other => Error::UpstreamFetchFailed {
                    url: key.clone(),
                    reason: other.to_string(),
                },
            })?;

        let hash = fingerprint(&data)?;
        let document = Arc::new(Document::ingest(endpoint, data)?);

        info!(
            key = %key,
            hash = %hash_preview(&hash),
            records = document.catalog.total_entries,
            "Cached catalog document"
        );

        let entry = CacheEntry {
            document: document.clone(),
            stored_at: self.clock.now(),
            hash,
        };
        self.entries.write().await.insert(key, entry);

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogSource for CountingSource {
        async fn fetch(&self, endpoint: Endpoint, language: Language) -> Result<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(Error::UpstreamFetchFailed {
                    url: format!("test/{}/{}", language, endpoint.path()),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(json!([{ "id": format!("sticker-{}", n), "name": "Sticker | Test" }]))
        }
    }

    struct ManualClock(std::sync::Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Self {
            Self(std::sync::Mutex::new(Utc::now()))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += chrono::Duration::from_std(by).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn cache_with(source: Arc<CountingSource>, clock: Arc<ManualClock>) -> CatalogCache {
        CatalogCache::with_clock(source, clock, CacheConfig::default())
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_upstream() {
        let source = Arc::new(CountingSource::new());
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(source.clone(), clock.clone());

        let first = cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();
        clock.advance(Duration::from_secs(299));
        let second = cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first.data, second.data);
    }

    #[tokio::test]
    async fn test_expiry_refetches_once_and_replaces() {
        let source = Arc::new(CountingSource::new());
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(source.clone(), clock.clone());

        let first = cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();
        let before = cache.get_entry("STICKERS_en").await.unwrap().hash;

        clock.advance(Duration::from_secs(300));
        let second = cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();
        let third = cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_ne!(first.data, second.data);
        assert_eq!(second.data, third.data);
        assert_ne!(cache.get_entry("STICKERS_en").await.unwrap().hash, before);
    }

    #[tokio::test]
    async fn test_languages_are_separate_keys() {
        let source = Arc::new(CountingSource::new());
        let cache = cache_with(source.clone(), Arc::new(ManualClock::new()));

        cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();
        cache.fetch(Endpoint::Stickers, Language::De).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(cache.stats().await.keys, vec!["STICKERS_de", "STICKERS_en"]);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_coalesced() {
        let source = Arc::new(CountingSource {
            delay: Duration::from_millis(50),
            ..CountingSource::new()
        });
        let cache = cache_with(source.clone(), Arc::new(ManualClock::new()));

        let (a, b, c) = tokio::join!(
            cache.fetch(Endpoint::Stickers, Language::En),
            cache.fetch(Endpoint::Stickers, Language::En),
            cache.fetch(Endpoint::Stickers, Language::En),
        );

        assert_eq!(source.calls(), 1);
        assert_eq!(a.unwrap().data, b.unwrap().data);
        assert!(c.is_ok());
    }

    #[tokio::test]
    async fn test_failure_has_no_stale_fallback() {
        let clock = Arc::new(ManualClock::new());
        let good = Arc::new(CountingSource::new());
        let cache = cache_with(good, clock.clone());
        cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();

        // Same entries, failing source.
        let failing = Arc::new(CountingSource {
            fail: true,
            ..CountingSource::new()
        });
        let broken = CatalogCache {
            inner: Arc::new(Inner {
                source: failing,
                clock: clock.clone(),
                ttl: cache.ttl(),
                entries: RwLock::new(cache.inner.entries.read().await.clone()),
                fetch_locks: Mutex::new(HashMap::new()),
            }),
        };

        assert!(broken.fetch(Endpoint::Stickers, Language::En).await.is_ok());
        clock.advance(Duration::from_secs(301));
        let err = broken.fetch(Endpoint::Stickers, Language::En).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_integrity_stats_and_invalidate() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(Arc::new(CountingSource::new()), clock.clone());

        cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();
        cache.fetch(Endpoint::Agents, Language::En).await.unwrap();
        clock.advance(Duration::from_secs(42));

        assert_eq!(
            cache.integrity_check().await,
            IntegrityReport {
                valid: true,
                invalid_entries: vec![]
            }
        );

        let stats = cache.stats().await;
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec!["AGENTS_en", "STICKERS_en"]);
        assert!(stats.hashes.iter().all(|h| h.len() == 11 && h.ends_with("...")));
        assert!(stats.details.iter().all(|d| d.age == 42));

        let entry = cache.get_entry("AGENTS_en").await.unwrap();
        assert_eq!(entry.hash, fingerprint(&entry.data.data).unwrap());

        cache.invalidate_all().await;
        assert_eq!(cache.stats().await.size, 0);
        assert!(matches!(
            cache.get_entry("AGENTS_en").await,
            Err(Error::CacheEntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_integrity_detects_tampering() {
        let cache = cache_with(Arc::new(CountingSource::new()), Arc::new(ManualClock::new()));
        cache.fetch(Endpoint::Stickers, Language::En).await.unwrap();

        {
            let mut entries = cache.inner.entries.write().await;
            if let Some(entry) = entries.get_mut("STICKERS_en") {
                entry.hash = "0".repeat(64);
            }
        }

        let report = cache.integrity_check().await;
        assert!(!report.valid);
        assert_eq!(report.invalid_entries, vec!["STICKERS_en"]);
    }

    #[tokio::test]
    async fn test_malformed_document_is_not_cached() {
        struct ScalarSource;

        #[async_trait]
        impl CatalogSource for ScalarSource {
            async fn fetch(&self, _: Endpoint, _: Language) -> Result<Value> {
                Ok(json!("not a collection"))
            }
        }

        let cache = CatalogCache::new(Arc::new(ScalarSource), CacheConfig::default());
        let err = cache.fetch(Endpoint::Skins, Language::En).await.unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
        assert_eq!(cache.stats().await.size, 0);
    }
}
