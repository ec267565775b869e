//! Error types for Strata cache operations

use crate::EntityKey;
use thiserror::Error;

/// Cache layer errors.
///
/// Lookup misses are never errors - lookups return `Option` instead.
/// These variants cover precondition violations and invalid removals,
/// both of which fail before any state is mutated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache_entity requires at least one identifier")]
    EmptyIdentifiers,

    #[error("entity not cached: {key}")]
    NotCached { key: EntityKey },

    #[error("cannot pop the base context layer")]
    BaseLayerPop,
}

/// Result type alias for Strata cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

// ============================================================================
// TESTS
// ============================================================================
