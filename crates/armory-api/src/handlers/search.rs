//! Search handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use armory_core::Language;
use armory_core::item::{Item, ItemKind, Skin};
use armory_engine::ranking::{self, SearchStats};
use armory_engine::{
    AdvancedCriteria, DEFAULT_LIMIT, DEFAULT_SEARCH_LIMIT, GlobalResults, ItemFilter, ItemScope,
    SearchField, SkinField,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::language;
use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SkinSearchParams {
    pub q: Option<String>,
    pub weapon: Option<String>,
    pub rarity: Option<String>,
    pub collection: Option<String>,
    #[serde(rename = "crate")]
    pub krate: Option<String>,
    pub wear: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SkinSearchResponse {
    pub query: String,
    pub language: Language,
    pub limit: usize,
    pub total: usize,
    pub results: Vec<Skin>,
}

async fn skin_search(
    state: Arc<AppState>,
    field: SkinField,
    query: Option<String>,
    params: &SkinSearchParams,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let results = state
        .catalog
        .search_skins(field, query.as_deref(), language, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(SkinSearchResponse {
        query: query.unwrap_or_default().trim().to_string(),
        language,
        limit,
        total: results.len(),
        results,
    }))
}

pub async fn skins_by_name(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinSearchParams>,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    skin_search(state, SkinField::Name, params.q.clone(), &params).await
}

pub async fn skins_by_weapon(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinSearchParams>,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    skin_search(state, SkinField::Weapon, params.weapon.clone(), &params).await
}

pub async fn skins_by_rarity(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinSearchParams>,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    skin_search(state, SkinField::Rarity, params.rarity.clone(), &params).await
}

pub async fn skins_by_collection(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinSearchParams>,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    skin_search(state, SkinField::Collection, params.collection.clone(), &params).await
}

pub async fn skins_by_crate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinSearchParams>,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    skin_search(state, SkinField::Crate, params.krate.clone(), &params).await
}

pub async fn skins_by_wear(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinSearchParams>,
) -> Result<Json<SkinSearchResponse>, ApiError> {
    skin_search(state, SkinField::Wear, params.wear.clone(), &params).await
}

#[derive(Deserialize)]
pub struct AdvancedParams {
    pub name: Option<String>,
    pub weapon: Option<String>,
    pub rarity: Option<String>,
    pub category: Option<String>,
    pub pattern: Option<String>,
    pub stattrak: Option<String>,
    pub souvenir: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct AdvancedSearchResponse {
    pub criteria: AdvancedCriteria,
    pub language: Language,
    pub limit: usize,
    pub total: usize,
    pub results: Vec<Skin>,
}

/// Only the literal strings `true` and `false` set a flag; anything else is
/// ignored.
fn flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

pub async fn advanced(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdvancedParams>,
) -> Result<Json<AdvancedSearchResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let criteria = AdvancedCriteria {
        stattrak: flag(params.stattrak.as_deref()),
        souvenir: flag(params.souvenir.as_deref()),
        name: params.name,
        weapon: params.weapon,
        rarity: params.rarity,
        category: params.category,
        pattern: params.pattern,
    };

    let (criteria, results) = state
        .catalog
        .advanced_search(criteria, language, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(AdvancedSearchResponse {
        criteria,
        language,
        limit,
        total: results.len(),
        results,
    }))
}

#[derive(Deserialize)]
pub struct ItemSearchParams {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub team: Option<String>,
    pub tournament: Option<String>,
    pub year: Option<i32>,
    pub pattern: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// The filter value echoed back next to the results.
#[derive(Serialize)]
#[serde(untagged)]
pub enum FilterEcho {
    Price { price_range: PriceRange },
    Team { team: String },
    Tournament { tournament: String },
    Year { year: i32 },
    Pattern { pattern: String },
    Category { category: String },
}

impl From<&ItemFilter> for FilterEcho {
    fn from(filter: &ItemFilter) -> Self {
        match filter {
            ItemFilter::Price { min, max } => FilterEcho::Price {
                price_range: PriceRange { min: *min, max: *max },
            },
            ItemFilter::Team(team) => FilterEcho::Team { team: team.clone() },
            ItemFilter::Tournament(t) => FilterEcho::Tournament { tournament: t.clone() },
            ItemFilter::Year(year) => FilterEcho::Year { year: *year },
            ItemFilter::Pattern(p) => FilterEcho::Pattern { pattern: p.clone() },
            ItemFilter::Category(c) => FilterEcho::Category { category: c.clone() },
        }
    }
}

#[derive(Serialize)]
pub struct ItemSearchResponse {
    #[serde(flatten)]
    pub filter: FilterEcho,
    pub item_type: ItemScope,
    pub language: Language,
    pub limit: usize,
    pub total: usize,
    pub results: Vec<Item>,
}

async fn item_search(
    state: Arc<AppState>,
    filter: armory_core::Result<ItemFilter>,
    params: &ItemSearchParams,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    let filter = filter.map_err(api_error)?;
    let language = language(params.lang.as_deref())?;
    let scope: ItemScope = match params.item_type.as_deref() {
        Some(raw) => raw.parse().map_err(api_error)?,
        None => ItemScope::default(),
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let results = state
        .catalog
        .search_items(&filter, scope, language, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(ItemSearchResponse {
        filter: FilterEcho::from(&filter),
        item_type: scope,
        language,
        limit,
        total: results.len(),
        results,
    }))
}

pub async fn by_price(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    item_search(state, ItemFilter::price(params.min, params.max), &params).await
}

pub async fn by_team(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    item_search(state, ItemFilter::team(params.team.as_deref()), &params).await
}

pub async fn by_tournament(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    item_search(state, ItemFilter::tournament(params.tournament.as_deref()), &params).await
}

pub async fn by_year(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    item_search(state, ItemFilter::year(params.year), &params).await
}

pub async fn by_pattern(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    item_search(state, ItemFilter::pattern(params.pattern.as_deref()), &params).await
}

pub async fn by_category(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    item_search(state, ItemFilter::category(params.category.as_deref()), &params).await
}

#[derive(Deserialize)]
pub struct GlobalParams {
    pub q: Option<String>,
    pub types: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub bucket: &'static str,
    pub count: usize,
}

#[derive(Serialize)]
pub struct GlobalSearchResponse {
    pub query: String,
    pub item_types: Vec<&'static str>,
    pub language: Language,
    pub limit: usize,
    pub total_by_type: Vec<TypeCount>,
    pub total: usize,
    pub results: GlobalResults,
}

pub async fn global(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GlobalParams>,
) -> Result<Json<GlobalSearchResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let kinds = ranking::parse_global_kinds(params.types.as_deref());

    let results = state
        .catalog
        .global_search(params.q.as_deref(), &kinds, language, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(GlobalSearchResponse {
        query: params.q.unwrap_or_default().trim().to_string(),
        item_types: kinds.iter().map(ItemKind::bucket).collect(),
        language,
        limit,
        total_by_type: results
            .counts()
            .map(|(kind, count)| TypeCount {
                bucket: kind.bucket(),
                count,
            })
            .collect(),
        total: results.total(),
        results,
    }))
}

#[derive(Deserialize)]
pub struct ComprehensiveParams {
    pub q: Option<String>,
    pub fields: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ComprehensiveSearchResponse {
    pub query: String,
    pub language: Language,
    pub limit: usize,
    pub fields_searched: Vec<SearchField>,
    pub total: usize,
    pub search_stats: SearchStats,
    pub results_by_type: ranking::Buckets<ranking::ScoredItem>,
    pub results: Vec<ranking::RankedItem>,
}

pub async fn comprehensive(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ComprehensiveParams>,
) -> Result<Json<ComprehensiveSearchResponse>, ApiError> {
    let language = language(params.lang.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let fields = SearchField::parse_list(params.fields.as_deref());

    let results = state
        .catalog
        .comprehensive_search(params.q.as_deref(), &fields, language, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(ComprehensiveSearchResponse {
        query: results.query,
        language,
        limit,
        fields_searched: fields,
        total: results.total,
        search_stats: results.search_stats,
        results_by_type: results.results_by_type,
        results: results.results,
    }))
}
