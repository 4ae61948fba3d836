//! # Archon ECS
//!
//! Archetype-based Entity-Component-System runtime.
//!
//! Applications register component kinds, create entities, attach typed data
//! to them, and run *systems*: functions dispatched each tick phase over
//! every entity carrying a required set of component kinds.
//!
//! ## Design Goals
//! - Archetype storage: one column-oriented table per exact component set,
//!   giving contiguous, row-aligned iteration
//! - O(1) entity→row mapping under swap-remove deletion and structural
//!   migration
//! - Type-erased columns with typed re-entry, validated once at
//!   registration and trusted on the hot path
//! - Deterministic scheduling: phase order, then registration order
//! - Single-threaded, explicit-value core with no globals and no locks

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Handles and shared types

pub use engine::types::{
    describe,
    kind,
    make_component,
    make_entity,
    ArchetypeId,
    ComponentSet,
    Generation,
    HandleInfo,
    Id,
    IdKind,
    Phase,
    RawId,
    TypeToken,
    GENERATION_BITS,
    GENERATION_MASK,
    GENERATION_SHIFT,
    INDEX_BITS,
    INDEX_MASK,
    KIND_BITS,
    KIND_MASK,
    KIND_SHIFT,
};

// Core ECS types

pub use engine::world::{World, WorldOptions};

pub use engine::component::{ComponentDesc, ComponentRegistry, RegisterFlag};

pub use engine::entity::{Entities, EntityLocation};

pub use engine::archetype::Archetype;
pub use engine::store::ArchetypeStore;

pub use engine::query::ColumnView;

pub use engine::storage::{Column, TypeErasedColumn};

pub use engine::scheduler::Scheduler;
pub use engine::systems::SystemRecord;

pub use engine::error::{
    ArityMismatchError,
    CapacityError,
    ColumnError,
    EcsError,
    EcsResult,
    IdentityMismatchError,
    MigrateError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used ECS types.
///
/// Import with:
/// ```rust
/// use archon_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        describe,
        EcsError,
        EcsResult,
        Id,
        IdKind,
        Phase,
        RegisterFlag,
        World,
        WorldOptions,
    };
}
