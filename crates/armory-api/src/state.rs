//! Application state shared across handlers.

use armory_engine::CatalogService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }
}
