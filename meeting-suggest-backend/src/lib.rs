//! Caches meeting suggestions in a store and computes them on demand.

pub mod cache;
pub mod error;
pub mod store;

pub use crate::cache::SuggestionCache;
pub use crate::error::AppError;
pub use crate::store::{InputSource, MemoryInputs, MemoryStore, PgSuggestions, SuggestionStore};
