//! HTTP API server for Armory.
//!
//! Thin axum adapter over [`armory_engine::CatalogService`]: query extraction,
//! response envelopes and error-to-status mapping.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
