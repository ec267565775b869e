//! Entity snapshot model and cache-policy metadata

use crate::EntityKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// ENTITY
// ============================================================================

/// An identity-bearing record with a loosely-typed property bag.
///
/// The cache never interprets the properties; it only needs the key and
/// the ability to clone the whole record. `Entity` owns all of its data,
/// so `Clone` is a deep copy - caching a clone isolates the cache from
/// later mutation of the caller's copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical identity
    key: EntityKey,
    /// Property name -> value
    properties: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an empty entity with the given key.
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Add a property (builder style).
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Set or overwrite a property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// The entity's canonical key.
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    /// All properties, in name order.
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }
}

// ============================================================================
// CACHE SITUATION
// ============================================================================

/// How an entity reached the cache.
///
/// Supplied by the caller on every insert so policy hooks deciding cache
/// behavior can distinguish writes from read-backs. The cache core itself
/// never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheSituation {
    /// Freshly written within the current scope
    Inserted,
    /// Read back from the datastore
    Existing,
}

// ============================================================================
// TESTS
// ============================================================================
