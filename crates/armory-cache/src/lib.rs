//! Read-through cache for upstream catalog documents.
//!
//! Documents are memoized per `(endpoint, language)` with a TTL and a SHA-256
//! fingerprint of their content. The HTTP source lives here too, behind the
//! [`armory_core::ports::CatalogSource`] port.

pub mod config;
pub mod keys;
pub mod source;
pub mod store;
pub mod types;

pub use config::{CacheConfig, DEFAULT_BASE_URL, UpstreamConfig};
pub use keys::{cache_key, fingerprint, hash_preview};
pub use source::HttpCatalogSource;
pub use store::CatalogCache;
pub use types::{CacheStats, EntryDetail, EntrySnapshot, IntegrityReport};
