//! Request handlers organized by resource.

pub mod cache;
pub mod catalog;
pub mod health;
pub mod search;

use crate::error::{ApiError, api_error};
use armory_core::Language;

/// Parse the `lang` query parameter, defaulting to English.
pub(crate) fn language(raw: Option<&str>) -> Result<Language, ApiError> {
    match raw.map(str::trim).filter(|l| !l.is_empty()) {
        Some(code) => code.parse().map_err(api_error),
        None => Ok(Language::default()),
    }
}
