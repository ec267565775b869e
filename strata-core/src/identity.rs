//! Identity types for Strata entities

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// ============================================================================
// ENTITY KEYS
// ============================================================================

/// The id half of an entity key: either a numeric id (allocated by the
/// datastore) or a caller-assigned name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyId {
    /// Numeric id, auto-allocated on first put
    Id(i64),
    /// Caller-assigned key name
    Name(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Id(id) => write!(f, "{}", id),
            KeyId::Name(name) => write!(f, "{:?}", name),
        }
    }
}

/// Canonical identity of an entity: its kind plus a numeric or named id.
///
/// This is the value the reverse index is keyed by. It is distinct from
/// [`Identifier`], which is a lookup token an entity happens to be cached
/// under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    /// Entity kind (table/collection name)
    pub kind: String,
    /// Numeric or named id within the kind
    pub id: KeyId,
}

impl EntityKey {
    /// Create a key with a numeric id.
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Id(id),
        }
    }

    /// Create a key with a caller-assigned name.
    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Name(name.into()),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

// ============================================================================
// CACHE IDENTIFIERS
// ============================================================================

/// Opaque lookup token under which an entity snapshot is cached.
///
/// An identifier is not the entity's own key: it is an alternate index
/// entry, typically a query fingerprint or a unique-field value. One
/// entity may be cached under several identifiers at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an arbitrary string as an identifier.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Derive a deterministic identifier from a query shape.
    ///
    /// Hashes the parts with SHA-256 and prefixes the kind so fingerprints
    /// for different kinds can never collide on equal part lists.
    pub fn fingerprint<I, S>(kind: &str, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref().as_bytes());
            hasher.update([0u8]);
        }
        Self(format!("{}|{}", kind, hex::encode(hasher.finalize())))
    }

    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for Identifier {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_display_numeric() {
        let key = EntityKey::with_id("User", 42);
        assert_eq!(format!("{}", key), "User(42)");
    }

    #[test]
    fn test_entity_key_display_named() {
        let key = EntityKey::with_name("User", "alice");
        assert_eq!(format!("{}", key), "User(\"alice\")");
    }

    #[test]
    fn test_entity_key_equality() {
        assert_eq!(EntityKey::with_id("User", 1), EntityKey::with_id("User", 1));
        assert_ne!(EntityKey::with_id("User", 1), EntityKey::with_id("User", 2));
        assert_ne!(
            EntityKey::with_id("User", 1),
            EntityKey::with_name("User", "1")
        );
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = Identifier::fingerprint("User", ["email", "a@example.com"]);
        let b = Identifier::fingerprint("User", ["email", "a@example.com"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_kind_prefix() {
        let a = Identifier::fingerprint("User", ["x"]);
        let b = Identifier::fingerprint("Account", ["x"]);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("User|"));
    }

    #[test]
    fn test_fingerprint_part_boundaries() {
        // ["ab", "c"] and ["a", "bc"] must not produce the same digest
        let a = Identifier::fingerprint("User", ["ab", "c"]);
        let b = Identifier::fingerprint("User", ["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_identifier_from_str() {
        let id: Identifier = "some-token".into();
        assert_eq!(id.as_str(), "some-token");
        assert_eq!(format!("{}", id), "some-token");
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
