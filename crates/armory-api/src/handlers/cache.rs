//! Cache inspection and maintenance handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use armory_cache::{CacheStats, EntrySnapshot, IntegrityReport};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.catalog.cache_stats().await)
}

pub async fn entry(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<EntrySnapshot>, ApiError> {
    let snapshot = state.catalog.cache_entry(&key).await.map_err(api_error)?;
    Ok(Json(snapshot))
}

pub async fn validate(State(state): State<Arc<AppState>>) -> Json<IntegrityReport> {
    Json(state.catalog.validate_cache().await)
}

pub async fn clear(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.catalog.clear_cache().await;
    Json(MessageResponse {
        message: "Cache cleared successfully".to_string(),
    })
}
