//! Cache entry and report types.

use armory_core::Document;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// A cached document. Never mutated after insertion, only replaced.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub document: Arc<Document>,
    pub stored_at: DateTime<Utc>,
    /// Fingerprint of `document.data` at insertion.
    pub hash: String,
}

impl CacheEntry {
    /// Whole seconds since the entry was stored.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.stored_at).num_seconds().max(0)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    /// Truncated hash previews, in `keys` order.
    pub hashes: Vec<String>,
    pub details: Vec<EntryDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryDetail {
    pub key: String,
    pub hash: String,
    /// Age in seconds.
    pub age: i64,
}

/// Full view of a single entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    pub data: Arc<Document>,
    pub hash: String,
    pub age: i64,
}

/// Result of recomputing every fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub valid: bool,
    pub invalid_entries: Vec<String>,
}
