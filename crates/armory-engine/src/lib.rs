//! Armory Engine
//!
//! Everything that reads a cached catalog and derives something from it:
//! skin detail views, related items, unscored filters, scored comprehensive
//! search and pagination. Inputs are validated here, before any document is
//! fetched.

pub mod details;
pub mod pagination;
pub mod ranking;
pub mod search;
pub mod service;

pub use pagination::{PageRequest, Paginated, Pagination};
pub use ranking::{ComprehensiveResults, GlobalResults, SearchField};
pub use search::{AdvancedCriteria, ItemFilter, ItemScope, SkinField};
pub use service::CatalogService;

/// Default result cap for unscored searches.
pub const DEFAULT_LIMIT: usize = 50;

/// Default result cap for global and comprehensive search.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;
