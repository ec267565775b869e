//! A single cache layer with forward and reverse indices.

use std::collections::HashMap;
use strata_core::{CacheError, CacheResult, CacheSituation, Entity, EntityKey, Identifier};

/// One level of the cache stack, corresponding to one transactional scope.
///
/// The forward index is the sole owner of cached entity data; the reverse
/// index is a plain lookup aid from entity identity back to the
/// identifiers it was cached under, never an ownership edge.
///
/// Invariant: after every operation the two indices are consistent views
/// of the same cached set - every forward identifier appears in exactly
/// one reverse entry, and every reverse entry's identifiers all resolve
/// in the forward index.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// identifier -> deep-copied entity snapshot
    forward: HashMap<Identifier, Entity>,
    /// entity key -> identifiers the entity is cached under, insertion order
    reverse: HashMap<EntityKey, Vec<Identifier>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache an entity under every identifier in `identifiers`.
    ///
    /// Stores a clone of the entity per identifier and records the full
    /// identifier list against the entity's key, overwriting any prior
    /// mapping for that key. Identifiers from an overwritten mapping that
    /// are not in the new list are pruned from the forward index, so the
    /// two indices stay consistent.
    ///
    /// Because every identifier in one call receives a clone of the same
    /// snapshot, and the reverse entry is always replaced whole, a key is
    /// never cached under identifiers with divergent snapshots - which is
    /// what makes [`Context::get_by_key`]'s pick-the-first-identifier
    /// resolution sound.
    ///
    /// `situation` is caller metadata for policy hooks; the cache itself
    /// does not branch on it. Fails with
    /// [`CacheError::EmptyIdentifiers`] - before mutating anything - if
    /// the identifier list is empty.
    ///
    /// An identifier previously claimed by a different key is reassigned:
    /// it is detached from the old key's reverse entry (dropping the entry
    /// entirely if nothing remains), so each forward identifier belongs to
    /// exactly one reverse entry at all times.
    pub fn cache_entity(
        &mut self,
        identifiers: &[Identifier],
        entity: &Entity,
        _situation: CacheSituation,
    ) -> CacheResult<()> {
        if identifiers.is_empty() {
            return Err(CacheError::EmptyIdentifiers);
        }

        // Detach any identifier currently owned by a different key, so an
        // identifier is only ever claimed by one reverse entry.
        for identifier in identifiers {
            let previous_owner = match self.forward.get(identifier) {
                Some(prev) if prev.key() != entity.key() => prev.key().clone(),
                _ => continue,
            };
            if let Some(list) = self.reverse.get_mut(&previous_owner) {
                list.retain(|i| i != identifier);
                if list.is_empty() {
                    self.reverse.remove(&previous_owner);
                }
            }
        }

        if let Some(stale) = self.reverse.insert(entity.key().clone(), identifiers.to_vec()) {
            for identifier in &stale {
                if !identifiers.contains(identifier) {
                    self.forward.remove(identifier);
                }
            }
        }

        for identifier in identifiers {
            self.forward.insert(identifier.clone(), entity.clone());
        }

        Ok(())
    }

    /// Remove a cached entity, by the entity itself.
    ///
    /// See [`Context::remove_key`].
    pub fn remove_entity(&mut self, entity: &Entity) -> CacheResult<()> {
        self.remove_key(entity.key())
    }

    /// Remove a cached entity by key: delete every forward entry the
    /// reverse index names for it, then the reverse entry itself.
    ///
    /// Removing a key that was never cached (or already removed) is a
    /// hard error, not a no-op: it distinguishes "remove what you just
    /// cached" from a programmer error.
    pub fn remove_key(&mut self, key: &EntityKey) -> CacheResult<()> {
        let identifiers = self
            .reverse
            .remove(key)
            .ok_or_else(|| CacheError::NotCached { key: key.clone() })?;

        for identifier in &identifiers {
            self.forward.remove(identifier);
        }

        Ok(())
    }

    /// Look up an entity by identifier in this layer only.
    ///
    /// A miss is a normal outcome, never an error.
    pub fn get(&self, identifier: &Identifier) -> Option<&Entity> {
        self.forward.get(identifier)
    }

    /// Look up an entity by its canonical key in this layer only.
    ///
    /// Resolves the key to the first identifier it was cached under and
    /// delegates to [`Context::get`].
    pub fn get_by_key(&self, key: &EntityKey) -> Option<&Entity> {
        let identifier = self.reverse.get(key)?.first()?;
        self.get(identifier)
    }

    /// The identifiers a key is cached under in this layer, if any.
    pub fn identifiers_for(&self, key: &EntityKey) -> Option<&[Identifier]> {
        self.reverse.get(key).map(Vec::as_slice)
    }

    /// Replace this context's contents with `other`'s.
    ///
    /// After the call, both indices equal `other`'s exactly: keys absent
    /// from `other` are pruned, keys present take `other`'s value. This is
    /// a full replace, not an additive merge - downstream invalidation
    /// relies on stale entries being purged here.
    pub fn apply(&mut self, other: Context) {
        self.forward = other.forward;
        self.reverse = other.reverse;
    }

    /// Number of forward entries cached in this layer.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether this layer caches nothing.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Whether an identifier is cached in this layer.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.forward.contains_key(identifier)
    }

    pub(crate) fn reverse_entry(&self, key: &EntityKey) -> Option<&Vec<Identifier>> {
        self.reverse.get(key)
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    /// A random cache/remove workload against one context.
    #[derive(Debug, Clone)]
    enum Op {
        Cache { key_id: i64, identifiers: Vec<String> },
        Remove { key_id: i64 },
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (
                0i64..8,
                prop::collection::vec("[a-d][0-9]", 1..4)
            )
                .prop_map(|(key_id, identifiers)| Op::Cache { key_id, identifiers }),
            (0i64..8).prop_map(|key_id| Op::Remove { key_id }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any workload, the forward and reverse indices stay
        /// consistent after every single operation: each reverse entry's
        /// identifiers all resolve in forward to an entity with that key,
        /// and each forward entry is claimed by its entity's reverse entry.
        #[test]
        fn prop_index_consistency(ops in prop::collection::vec(arb_op(), 0..40)) {
            let mut ctx = Context::new();

            for op in ops {
                match op {
                    Op::Cache { key_id, identifiers } => {
                        let identifiers: Vec<Identifier> =
                            identifiers.into_iter().map(Identifier::new).collect();
                        let entity = Entity::new(EntityKey::with_id("User", key_id))
                            .with_property("v", key_id);
                        ctx.cache_entity(&identifiers, &entity, CacheSituation::Existing)
                            .unwrap();
                    }
                    Op::Remove { key_id } => {
                        // Errors on unknown keys are expected; state must
                        // be untouched either way.
                        let _ = ctx.remove_key(&EntityKey::with_id("User", key_id));
                    }
                }

                // Reverse -> forward: every identifier a reverse entry
                // claims resolves to an entity carrying that key.
                for (key, identifiers) in &ctx.reverse {
                    for identifier in identifiers {
                        let entity = ctx.get(identifier);
                        prop_assert!(
                            matches!(entity, Some(e) if e.key() == key),
                            "identifier {} in reverse entry for {} does not resolve",
                            identifier,
                            key
                        );
                    }
                }

                // Forward -> reverse: every cached identifier is claimed by
                // exactly the reverse entry of the entity it stores.
                for (identifier, entity) in &ctx.forward {
                    let claimed = ctx
                        .identifiers_for(entity.key())
                        .is_some_and(|ids| ids.contains(identifier));
                    prop_assert!(
                        claimed,
                        "forward entry {} not claimed by reverse entry for {}",
                        identifier,
                        entity.key()
                    );
                }
            }
        }

        /// Looking up a key always returns the snapshot from the most
        /// recent cache_entity call for that key.
        #[test]
        fn prop_last_write_wins_per_key(
            versions in prop::collection::vec((1i64..100, "[a-c]"), 1..10)
        ) {
            let mut ctx = Context::new();
            let key = EntityKey::with_id("User", 1);
            let mut last = None;

            for (version, token) in versions {
                let entity = Entity::new(key.clone()).with_property("v", version);
                ctx.cache_entity(
                    &[Identifier::new(token)],
                    &entity,
                    CacheSituation::Existing,
                )
                .unwrap();
                last = Some(entity);
            }

            prop_assert_eq!(ctx.get_by_key(&key), last.as_ref());
        }
    }
}
