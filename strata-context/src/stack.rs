//! The layered context stack and its pop/staging protocol.

use crate::Context;
use bitflags::bitflags;
use std::collections::VecDeque;
use strata_core::{CacheError, CacheResult, Entity, EntityKey, Identifier};

bitflags! {
    /// Policy flags for [`ContextStack::pop`]. Independent and combinable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PopFlags: u8 {
        /// Drop the popped layer outright; its contents never reach the
        /// staged queue or any other layer.
        const DISCARD = 0b0000_0001;
        /// After popping, drain the staged queue oldest-first into the
        /// new top layer.
        const APPLY_STAGED = 0b0000_0010;
        /// After popping (and applying, if requested), forcibly empty the
        /// staged queue.
        const CLEAR_STAGED = 0b0000_0100;
    }
}

impl Default for PopFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A stack of cache contexts supporting nested transactions.
///
/// The bottom layer is the base scope, created at construction and never
/// removed. Each nested scope pushes a fresh layer; reads through the
/// stack see the innermost value for an identifier and fall back outward.
///
/// Popping a layer either discards it, stages it in a FIFO queue for a
/// later apply, or both pops and drains the queue into the new top. The
/// queue is drained oldest-popped-first, so repeated stage-then-apply
/// round trips replay layers in the order they were staged.
#[derive(Debug, Clone)]
pub struct ContextStack {
    /// Bottom = base scope, top = innermost scope. Never empty.
    layers: Vec<Context>,
    /// Popped-but-unapplied layers; pops push the front, the apply loop
    /// drains the back, so layers leave oldest-popped-first.
    staged: VecDeque<Context>,
}

impl ContextStack {
    /// Create a stack holding a single empty base layer.
    pub fn new() -> Self {
        Self {
            layers: vec![Context::new()],
            staged: VecDeque::new(),
        }
    }

    /// Push a fresh empty layer for a nested scope. Always succeeds.
    pub fn push(&mut self) {
        self.layers.push(Context::new());
    }

    /// Pop the top layer under the given policy flags.
    ///
    /// 1. With [`PopFlags::DISCARD`] the layer is dropped; otherwise it is
    ///    inserted at the front of the staged queue.
    /// 2. With [`PopFlags::APPLY_STAGED`] the staged queue is then drained
    ///    from the back (oldest staged first), each layer replacing the
    ///    new top's contents via [`Context::apply`].
    /// 3. With [`PopFlags::CLEAR_STAGED`], or whenever the pop leaves only
    ///    the base layer, the staged queue is emptied regardless - a
    ///    safety net so stale staged layers cannot leak into an unrelated
    ///    top-level scope.
    ///
    /// Popping the last remaining layer is rejected with
    /// [`CacheError::BaseLayerPop`] before any state changes.
    pub fn pop(&mut self, flags: PopFlags) -> CacheResult<()> {
        if self.layers.len() == 1 {
            return Err(CacheError::BaseLayerPop);
        }

        // Guard above keeps the base layer in place.
        let popped = self.layers.pop().expect("stack holds at least two layers");

        if flags.contains(PopFlags::DISCARD) {
            drop(popped);
        } else {
            self.staged.push_front(popped);
        }

        if flags.contains(PopFlags::APPLY_STAGED) {
            while let Some(staged) = self.staged.pop_back() {
                self.top_mut().apply(staged);
            }
        }

        if flags.contains(PopFlags::CLEAR_STAGED) || self.layers.len() == 1 {
            self.staged.clear();
        }

        Ok(())
    }

    /// The innermost layer. Always exists.
    pub fn top(&self) -> &Context {
        self.layers.last().expect("stack is never empty")
    }

    /// Mutable access to the innermost layer.
    pub fn top_mut(&mut self) -> &mut Context {
        self.layers.last_mut().expect("stack is never empty")
    }

    /// Number of layers, including the base.
    pub fn size(&self) -> usize {
        self.layers.len()
    }

    /// Number of popped layers awaiting an apply or clear.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Look up an entity by identifier across all layers, innermost wins.
    ///
    /// Equivalent to merging every layer's forward index from the base up
    /// (later layers overwriting earlier ones) and resolving against the
    /// merged view: the first hit scanning from the top is the answer.
    pub fn get_entity(&self, identifier: &Identifier) -> Option<&Entity> {
        self.layers.iter().rev().find_map(|layer| layer.get(identifier))
    }

    /// Look up an entity by its canonical key across all layers.
    ///
    /// The innermost reverse entry for the key supplies the identifier
    /// (its first one, deterministically), which is then resolved through
    /// the composed forward view - so a re-cache of that identifier in an
    /// even deeper layer still shadows correctly.
    pub fn get_entity_by_key(&self, key: &EntityKey) -> Option<&Entity> {
        let identifier = self
            .layers
            .iter()
            .rev()
            .find_map(|layer| layer.reverse_entry(key))
            .and_then(|identifiers| identifiers.first())?;
        self.get_entity(identifier)
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
