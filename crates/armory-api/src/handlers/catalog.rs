//! Catalog handlers: raw collections, paginated skins and detail views.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use armory_core::item::{Crate, Item};
use armory_core::{Document, Endpoint, Language};
use armory_engine::PageRequest;
use armory_engine::Paginated;
use armory_engine::details::{CollectionContents, CrateContents, DetailedSkin};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::language;
use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LangParams {
    pub lang: Option<String>,
}

#[derive(Deserialize)]
pub struct PageParams {
    pub lang: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
pub struct SkinDetailsResponse {
    pub skin_id: String,
    pub language: Language,
    pub details: DetailedSkin,
}

#[derive(Serialize)]
pub struct CrateResponse {
    pub crate_id: String,
    pub language: Language,
    #[serde(rename = "crate")]
    pub krate: Crate,
}

#[derive(Serialize)]
pub struct CrateContentsResponse {
    pub crate_id: String,
    pub language: Language,
    pub contents: CrateContents,
}

#[derive(Serialize)]
pub struct CollectionContentsResponse {
    pub collection_id: String,
    pub language: Language,
    pub contents: CollectionContents,
}

/// Pass an upstream collection through unchanged.
pub async fn list_collection(
    state: Arc<AppState>,
    endpoint: Endpoint,
    params: LangParams,
) -> Result<Json<Arc<Document>>, ApiError> {
    let language = language(params.lang.as_deref())?;
    info!(endpoint = %endpoint, language = %language, "Listing collection");
    let document = state.catalog.document(endpoint, language).await.map_err(api_error)?;
    Ok(Json(document))
}

pub async fn list_skins(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Item>>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        params.page.unwrap_or(defaults.page() as i64),
        params.page_size.unwrap_or(defaults.page_size() as i64),
    )
    .map_err(api_error)?;

    let skins = state
        .catalog
        .skins_paginated(language, page)
        .await
        .map_err(api_error)?;
    Ok(Json(skins))
}

pub async fn skin_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<Json<SkinDetailsResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let details = state
        .catalog
        .skin_details(&id, language)
        .await
        .map_err(api_error)?;

    Ok(Json(SkinDetailsResponse {
        skin_id: id.trim().to_string(),
        language,
        details,
    }))
}

pub async fn get_crate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<Json<CrateResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let krate = state
        .catalog
        .crate_by_id(&id, language)
        .await
        .map_err(api_error)?;

    Ok(Json(CrateResponse {
        crate_id: id.trim().to_string(),
        language,
        krate,
    }))
}

pub async fn crate_contents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<Json<CrateContentsResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let contents = state
        .catalog
        .crate_contents(&id, language)
        .await
        .map_err(api_error)?;

    Ok(Json(CrateContentsResponse {
        crate_id: id.trim().to_string(),
        language,
        contents,
    }))
}

pub async fn collection_contents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<Json<CollectionContentsResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let contents = state
        .catalog
        .collection_contents(&id, language)
        .await
        .map_err(api_error)?;

    Ok(Json(CollectionContentsResponse {
        collection_id: id.trim().to_string(),
        language,
        contents,
    }))
}

pub async fn languages(State(state): State<Arc<AppState>>) -> Json<&'static [Language]> {
    Json(state.catalog.supported_languages())
}
