//! Server configuration management.

use armory_cache::{CacheConfig, DEFAULT_BASE_URL, UpstreamConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_BIND: &str = "ARMORY_BIND";
pub const ENV_UPSTREAM_URL: &str = "ARMORY_UPSTREAM_URL";
pub const ENV_CACHE_TTL_SECS: &str = "ARMORY_CACHE_TTL_SECS";

/// Gateway configuration, stored as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upstream document root.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    /// Cache TTL in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upstream retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_bind() -> String {
    "0.0.0.0:3002".to_string()
}

fn default_upstream_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upstream_url: default_upstream_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ServerConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults. Environment overrides are applied
    /// on top.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        let mut config = Self::read(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a config file without applying environment overrides.
    pub fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("dev", "armory", "armory")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Apply `ARMORY_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.set("bind", &bind)?;
        }
        if let Some(url) = lookup(ENV_UPSTREAM_URL) {
            self.set("upstream_url", &url)?;
        }
        if let Some(ttl) = lookup(ENV_CACHE_TTL_SECS) {
            self.set("cache_ttl_secs", &ttl)?;
        }
        Ok(())
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let number = |v: &str| {
            v.parse::<u64>()
                .map_err(|_| format!("Invalid value for {}: {}", key, v))
        };
        match key {
            "bind" => self.bind = value.to_string(),
            "upstream_url" => self.upstream_url = value.to_string(),
            "cache_ttl_secs" => self.cache_ttl_secs = number(value)?,
            "timeout_secs" => self.timeout_secs = number(value)?,
            "max_retries" => {
                self.max_retries = value
                    .parse()
                    .map_err(|_| format!("Invalid value for {}: {}", key, value))?
            }
            "log_format" => {
                self.log_format = match value {
                    "text" => LogFormat::Text,
                    "json" => LogFormat::Json,
                    _ => return Err(format!("Invalid log format: {}", value)),
                };
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig::new(self.upstream_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
    }

    pub fn cache(&self) -> CacheConfig {
        CacheConfig::default().with_ttl(Duration::from_secs(self.cache_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0:3002");
        assert_eq!(config.cache().ttl, Duration::from_secs(300));
        assert_eq!(config.upstream().max_retries, 3);
        assert_eq!(config.upstream().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ServerConfig = serde_yaml::from_str("cache_ttl_secs: 60\nlog_format: json\n").unwrap();
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.bind, "0.0.0.0:3002");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BIND, "127.0.0.1:9000"),
            (ENV_CACHE_TTL_SECS, "10"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.cache_ttl_secs, 10);
        assert_eq!(config.upstream_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = ServerConfig::default();
        let result = config.apply_overrides(|name| (name == ENV_CACHE_TTL_SECS).then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_unknown_key() {
        let mut config = ServerConfig::default();
        assert!(config.set("token", "x").is_err());
        assert!(config.set("log_format", "xml").is_err());
        config.set("max_retries", "5").unwrap();
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = ServerConfig::default();
        config.set("upstream_url", "http://localhost:9999/api").unwrap();
        config.save(&path).unwrap();

        let loaded = ServerConfig::read(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
