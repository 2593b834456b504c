//! HTTP helpers for driving a running gateway.

use armory_api::{AppState, create_router};
use armory_engine::CatalogService;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const API_PREFIX: &str = "/api/v1";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Serve `service` on an ephemeral local port.
pub async fn start_test_server(service: CatalogService) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let app = create_router(Arc::new(AppState::new(service)));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok((addr, handle))
}

/// Client bound to one test server.
pub struct ApiTestClient {
    client: Client,
    base_url: String,
}

impl ApiTestClient {
    pub fn new(addr: SocketAddr) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: format!("http://{}", addr),
        }
    }

    /// Absolute URL for a server path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.client.get(self.url(path)).send().await
    }

    pub async fn delete(&self, path: &str) -> reqwest::Result<Response> {
        self.client.delete(self.url(path)).send().await
    }

    /// GET an API route (relative to `/api/v1`) and decode the body.
    ///
    /// Error bodies are plain text and come back as a JSON string.
    pub async fn get_json(&self, route: &str) -> anyhow::Result<(StatusCode, Value)> {
        let resp = self.get(&format!("{}{}", API_PREFIX, route)).await?;
        let status = resp.status();
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, body))
    }

    /// Whether `/health` answers with a success status.
    pub async fn health(&self) -> anyhow::Result<bool> {
        Ok(self.get("/health").await?.status().is_success())
    }
}

/// Poll `check` until it holds or `deadline` passes.
pub async fn poll_until<F, Fut>(deadline: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    loop {
        if check().await {
            return true;
        }
        if started.elapsed() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
