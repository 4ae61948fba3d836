//! # Entity Management
//!
//! This module defines entity identity, lifecycle, and the directory that
//! maps live entities to their storage location.
//!
//! ## Entity Model
//! An entity handle packs an **index** and a **generation** (see
//! `types.rs`). The allocator hands out monotonically increasing indices,
//! recycling destroyed ones through a free list. Each recycle bumps the
//! slot's generation, so every handle ever issued for an index is
//! distinguishable from the current occupant.
//!
//! ## Directory
//! A live entity either carries components, in which case the directory
//! records its `(archetype, row)` location, or it carries none and is
//! *unlocated*. The canonical no-components archetype is elided; an
//! unlocated entity occupies no storage at all.
//!
//! ## Invariants
//! - `generations.len() == alive.len() == locations.len()`.
//! - An entity is alive iff its slot is marked alive **and** its handle
//!   generation equals the slot generation.
//! - If `alive[i]` is false, `locations[i]` is `None`.
//! - Directory locations always reflect the true archetype row; they are
//!   updated in the same operation as any row move.

use crate::engine::error::{CapacityError, EcsError, EcsResult};
use crate::engine::types::{
    make_entity, ArchetypeId, Generation, Id, IdKind, GENERATION_CAP, INDEX_MASK,
};

/// Physical storage location of a located entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityLocation {
    /// Archetype containing the entity's row.
    pub archetype: ArchetypeId,
    /// Row index within that archetype.
    pub row: usize,
}

/// Entity allocator and directory.
///
/// ## Design
/// - Slots are allocated from a free list of indices, growing when empty.
/// - Generations start at 1 and increment on every destroy, skipping 0 on
///   wrap so a live generation is never zero.
/// - Storage is dense and index-addressable; lookups are O(1).
#[derive(Default)]
pub struct Entities {
    generations: Vec<Generation>,
    alive: Vec<bool>,
    locations: Vec<Option<EntityLocation>>,
    free: Vec<u32>,
    live_count: usize,
}

impl Entities {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new live entity with no components.
    ///
    /// Reuses a free index if one exists, otherwise grows storage. Fresh
    /// slots start at generation 1; recycled slots carry the generation
    /// bumped by their last destroy.
    ///
    /// ## Errors
    /// Fails only on exhaustion of the 32-bit index space.
    pub fn create(&mut self) -> EcsResult<Id> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let next = self.generations.len() as u64;
                if next > INDEX_MASK {
                    return Err(CapacityError {
                        needed: next + 1,
                        capacity: INDEX_MASK + 1,
                    }
                    .into());
                }
                self.generations.push(1);
                self.alive.push(false);
                self.locations.push(None);
                next as u32
            }
        };

        self.alive[index as usize] = true;
        self.locations[index as usize] = None;
        self.live_count += 1;
        Ok(make_entity(index, self.generations[index as usize]))
    }

    /// Destroys an entity, invalidating its handle.
    ///
    /// Bumps the slot generation and returns the index to the free list.
    /// Returns the location the entity occupied, if any, so the caller can
    /// free the corresponding archetype row.
    ///
    /// ## Errors
    /// `UnknownEntity` if the handle is stale or was never allocated.
    pub fn destroy(&mut self, entity: Id) -> EcsResult<Option<EntityLocation>> {
        self.check_alive(entity)?;
        let index = entity.index() as usize;

        let next = self.generations[index].wrapping_add(1) & GENERATION_CAP;
        self.generations[index] = if next == 0 { 1 } else { next };
        self.alive[index] = false;
        let location = self.locations[index].take();
        self.free.push(entity.index());
        self.live_count -= 1;
        Ok(location)
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn is_alive(&self, entity: Id) -> bool {
        if entity.kind() != Some(IdKind::Entity) {
            return false;
        }
        let index = entity.index() as usize;
        index < self.generations.len()
            && self.alive[index]
            && self.generations[index] == entity.generation()
    }

    /// Returns the location of a live entity, or `None` if it carries no
    /// components.
    ///
    /// ## Errors
    /// `UnknownEntity` if the handle is stale or was never allocated.
    pub fn location(&self, entity: Id) -> EcsResult<Option<EntityLocation>> {
        self.check_alive(entity)?;
        Ok(self.locations[entity.index() as usize])
    }

    /// Updates the stored location for a live entity.
    ///
    /// Callers must keep this in lockstep with archetype row moves.
    pub fn set_location(&mut self, entity: Id, location: Option<EntityLocation>) {
        debug_assert!(self.is_alive(entity), "set_location on a dead or stale entity");
        let index = entity.index() as usize;
        if index < self.locations.len() {
            self.locations[index] = location;
        }
    }

    /// Rewrites only the row of an already-located entity.
    ///
    /// Used by swap-remove fix-up when another entity's row moves.
    pub fn set_row(&mut self, entity: Id, row: usize) {
        debug_assert!(self.is_alive(entity), "set_row on a dead or stale entity");
        let index = entity.index() as usize;
        match self.locations.get_mut(index) {
            Some(Some(location)) => location.row = row,
            _ => debug_assert!(false, "set_row on an unlocated entity"),
        }
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    fn check_alive(&self, entity: Id) -> EcsResult<()> {
        if entity.kind() != Some(IdKind::Entity) {
            return Err(EcsError::WrongHandleKind {
                id: entity,
                expected: IdKind::Entity,
            });
        }
        if !self.is_alive(entity) {
            return Err(EcsError::UnknownEntity { entity });
        }
        Ok(())
    }
}
