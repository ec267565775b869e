//! Strata Core - Entity Types
//!
//! Pure data structures with no behavior. The cache layers in
//! `strata-context` depend on this crate.
//! This crate contains ONLY data types - no caching logic.

pub mod entity;
pub mod error;
pub mod identity;

pub use entity::{CacheSituation, Entity};
pub use error::{CacheError, CacheResult};
pub use identity::{EntityKey, Identifier, KeyId};
