//! Armory Core
//!
//! Catalog domain types, structural classification, rarity rules and the
//! ports (upstream source, clock) that the cache and engine crates build on.
//! This crate does no I/O of its own.

pub mod catalog;
pub mod classify;
pub mod error;
pub mod item;
pub mod ports;
pub mod rarity;

pub use catalog::{Catalog, Document, Endpoint, Entry, Language};
pub use classify::classify;
pub use error::{Error, Result};
pub use item::{Item, ItemKind};
