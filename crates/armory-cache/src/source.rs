//! HTTP source for upstream catalog documents.

use crate::config::UpstreamConfig;
use armory_core::ports::CatalogSource;
use armory_core::{Endpoint, Error, Language, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

/// Fetches documents from `{base_url}/{language}/{endpoint}.json`.
pub struct HttpCatalogSource {
    config: UpstreamConfig,
    base_url: Url,
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        // A trailing slash keeps the last path segment when joining.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| Error::InvalidInput(format!("Invalid upstream URL {}: {}", config.base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Full URL of a document.
    pub fn document_url(&self, endpoint: Endpoint, language: Language) -> Result<Url> {
        self.base_url
            .join(&format!("{}/{}", language.code(), endpoint.path()))
            .map_err(|e| Error::Internal(format!("Failed to build document URL: {}", e)))
    }

    async fn attempt(&self, url: &Url) -> std::result::Result<Value, String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        response.json::<Value>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, endpoint: Endpoint, language: Language) -> Result<Value> {
        let url = self.document_url(endpoint, language)?;
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                info!(attempt, url = %url, "Retrying upstream fetch");
                tokio::time::sleep(self.config.retry_delay).await;
            }

            match self.attempt(&url).await {
                Ok(value) => {
                    debug!(url = %url, attempt, "Fetched upstream document");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(url = %url, attempt, error = %e, "Upstream fetch failed");
                    last_error = e;
                }
            }
        }

        error!(url = %url, error = %last_error, "Upstream fetch failed after all retries");
        Err(Error::UpstreamFetchFailed {
            url: url.to_string(),
            reason: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> UpstreamConfig {
        UpstreamConfig::new(format!("{}/api", server.uri())).with_retry_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_document_url() {
        let source = HttpCatalogSource::new(UpstreamConfig::default()).unwrap();
        let url = source.document_url(Endpoint::SkinsNotGrouped, Language::ZhCn).unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/ByMykel/CSGO-API/main/public/api/zh-CN/skins_not_grouped.json"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpCatalogSource::new(UpstreamConfig::new("not a url")).is_err());
    }

    #[tokio::test]
    async fn test_fetch_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/en/skins.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "skin-1" }])))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpCatalogSource::new(config_for(&server)).unwrap();
        let value = source.fetch(Endpoint::Skins, Language::En).await.unwrap();
        assert_eq!(value, json!([{ "id": "skin-1" }]));
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/de/crates.json"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/de/crates.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let source = HttpCatalogSource::new(config_for(&server)).unwrap();
        let value = source.fetch(Endpoint::Crates, Language::De).await.unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let source = HttpCatalogSource::new(config_for(&server)).unwrap();
        let err = source.fetch(Endpoint::Keys, Language::En).await.unwrap_err();
        match err {
            Error::UpstreamFetchFailed { url, reason } => {
                assert!(url.ends_with("/api/en/keys.json"));
                assert!(reason.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
