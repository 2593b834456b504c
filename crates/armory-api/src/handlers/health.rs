//! Liveness and readiness probes.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    /// Documents currently held in the cache.
    pub cached_documents: usize,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        service: "armory",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Ready as soon as the router is up; the cache fills lazily.
pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        cached_documents: state.catalog.cache_stats().await.size,
    })
}
