//! Configuration for the upstream source and the cache.

use std::time::Duration;

/// Default upstream document root.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/ByMykel/CSGO-API/main/public/api";

/// Configuration for the upstream HTTP source.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL; documents live at `{base_url}/{language}/{endpoint}.json`.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

impl UpstreamConfig {
    /// Create a new config for a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Configuration for the document cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry is served before it is refetched.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl CacheConfig {
    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
