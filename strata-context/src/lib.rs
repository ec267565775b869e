//! Strata Context - Layered Transaction Cache
//!
//! A stack of cache contexts mirroring nested transaction scopes. Each
//! [`Context`] holds a forward index (identifier -> cached entity) and a
//! reverse index (entity key -> identifiers), so one cached entity can be
//! found under any of several equivalent lookup tokens and invalidated
//! from all of them at once.
//!
//! [`ContextStack`] layers contexts so reads see the innermost value and
//! fall back outward; popping a layer can discard its contents, merge them
//! into the new top immediately, or stage them for a later FIFO-ordered
//! apply. The transaction layer owning the stack calls push/pop at
//! transaction begin/commit/rollback boundaries.
//!
//! # Example
//!
//! ```
//! use strata_context::{ContextStack, PopFlags};
//! use strata_core::{CacheSituation, Entity, EntityKey, Identifier};
//!
//! let mut stack = ContextStack::new();
//! stack.push();
//!
//! let entity = Entity::new(EntityKey::with_id("User", 1)).with_property("age", 30);
//! stack
//!     .top_mut()
//!     .cache_entity(&[Identifier::new("user:1")], &entity, CacheSituation::Existing)?;
//!
//! assert!(stack.get_entity(&Identifier::new("user:1")).is_some());
//!
//! // Roll the nested scope back: its cache entries vanish.
//! stack.pop(PopFlags::DISCARD)?;
//! assert!(stack.get_entity(&Identifier::new("user:1")).is_none());
//! # Ok::<(), strata_core::CacheError>(())
//! ```

pub mod context;
pub mod stack;

pub use context::Context;
pub use stack::{ContextStack, PopFlags};
