//! API route definitions.

use axum::{
    Router,
    extract::{Query, State},
    middleware::from_fn,
    routing::{MethodRouter, delete, get},
};
use armory_core::Endpoint;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::handlers::catalog::{self, LangParams};
use crate::handlers::{cache, health, search};
use crate::middleware::{cors_layer, request_id};
use crate::state::AppState;

/// Create the main API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer())
                .layer(from_fn(request_id)),
        )
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(catalog_routes())
        .nest("/search", search_routes())
        .nest("/cache", cache_routes())
        .route("/languages", get(catalog::languages))
}

/// Pass-through route for a whole upstream collection.
fn collection(endpoint: Endpoint) -> MethodRouter<Arc<AppState>> {
    get(
        move |State(state): State<Arc<AppState>>, Query(params): Query<LangParams>| async move {
            catalog::list_collection(state, endpoint, params).await
        },
    )
}

fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all", collection(Endpoint::All))
        .route("/skins", get(catalog::list_skins))
        .route("/skins/{id}/details", get(catalog::skin_details))
        .route("/skins-not-grouped", collection(Endpoint::SkinsNotGrouped))
        .route("/stickers", collection(Endpoint::Stickers))
        .route("/keychains", collection(Endpoint::Keychains))
        .route("/collections", collection(Endpoint::Collections))
        .route("/collections/{id}/contents", get(catalog::collection_contents))
        .route("/crates", collection(Endpoint::Crates))
        .route("/crates/{id}", get(catalog::get_crate))
        .route("/crates/{id}/contents", get(catalog::crate_contents))
        .route("/keys", collection(Endpoint::Keys))
        .route("/collectibles", collection(Endpoint::Collectibles))
        .route("/agents", collection(Endpoint::Agents))
        .route("/patches", collection(Endpoint::Patches))
        .route("/graffiti", collection(Endpoint::Graffiti))
        .route("/music-kits", collection(Endpoint::MusicKits))
        .route("/base-weapons", collection(Endpoint::BaseWeapons))
        .route("/highlights", collection(Endpoint::Highlights))
}

fn search_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/skins/name", get(search::skins_by_name))
        .route("/skins/weapon", get(search::skins_by_weapon))
        .route("/skins/rarity", get(search::skins_by_rarity))
        .route("/skins/collection", get(search::skins_by_collection))
        .route("/skins/crate", get(search::skins_by_crate))
        .route("/skins/wear", get(search::skins_by_wear))
        .route("/skins/advanced", get(search::advanced))
        .route("/price", get(search::by_price))
        .route("/team", get(search::by_team))
        .route("/tournament", get(search::by_tournament))
        .route("/year", get(search::by_year))
        .route("/pattern", get(search::by_pattern))
        .route("/category", get(search::by_category))
        .route("/global", get(search::global))
        .route("/comprehensive", get(search::comprehensive))
}

fn cache_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", delete(cache::clear))
        .route("/stats", get(cache::stats))
        .route("/entry/{key}", get(cache::entry))
        .route("/validate", get(cache::validate))
}
