//! # Archetype Store and Structural Migration
//!
//! The store owns every archetype and orchestrates entity movement between
//! them when components are added or removed.
//!
//! ## Design
//! - Archetypes live in a `Vec` and are addressed by stable [`ArchetypeId`]
//!   indices; a sorted map from component set to index provides lookup and
//!   deterministic, lexicographic iteration order for queries.
//! - Archetypes are created on demand, seeded from the source archetype's
//!   column schemata during migration, and are never deleted. An archetype
//!   emptied by migration is retained; it may gain members again.
//! - A structural version counter increments on every archetype creation
//!   and row-level structural change. The scheduler snapshots it around
//!   each system's iterate pass to detect forbidden mid-iteration
//!   mutations in debug builds.
//!
//! ## Migration
//! Adding kind `K` to an entity in archetype `A` at row `r`:
//! 1. Resolve `B = A.set ∪ {K}`, creating it from `A`'s schemata plus an
//!    empty `K` column if absent.
//! 2. Move row `r` of every shared column into a fresh row of `B`; push the
//!    new `K` value, which must land in the same row.
//! 3. Update the directory for the moved entity. Because the vacated slot
//!    was filled by swap-remove, also rewrite the row of the entity that
//!    previously occupied `A`'s last row, found in O(1) through the
//!    archetype back-index.
//!
//! Removal is symmetric with `B = A.set \ {K}`; the dropped kind's column
//! compacts via swap-remove inside the same migration.

use std::any::Any;
use std::collections::BTreeMap;

use log::{debug, trace};

use crate::engine::archetype::Archetype;
use crate::engine::component::ComponentRegistry;
use crate::engine::entity::{Entities, EntityLocation};
use crate::engine::error::{EcsError, EcsResult};
use crate::engine::types::{ArchetypeId, ComponentSet, Id};

/// Owner of all archetypes, indexed by component set.
#[derive(Default)]
pub struct ArchetypeStore {
    archetypes: Vec<Archetype>,
    by_set: BTreeMap<ComponentSet, ArchetypeId>,
    structural_version: u64,
}

impl ArchetypeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of archetypes ever created (none are deleted).
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Returns `true` if no archetype exists yet.
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Shared access to an archetype by id.
    pub fn archetype(&self, id: ArchetypeId) -> &Archetype {
        &self.archetypes[id as usize]
    }

    /// Exclusive access to an archetype by id.
    pub fn archetype_mut(&mut self, id: ArchetypeId) -> &mut Archetype {
        &mut self.archetypes[id as usize]
    }

    /// Looks up the archetype for an exact component set.
    pub fn find(&self, set: &ComponentSet) -> Option<ArchetypeId> {
        self.by_set.get(set).copied()
    }

    /// Finds the archetype for `set`, creating it if absent.
    ///
    /// When created, column schemata are cloned from `seed` where kinds
    /// overlap; remaining columns come from registry factories.
    pub fn find_or_create(
        &mut self,
        set: &ComponentSet,
        seed: Option<ArchetypeId>,
        registry: &ComponentRegistry,
    ) -> EcsResult<ArchetypeId> {
        if let Some(id) = self.find(set) {
            return Ok(id);
        }

        let archetype = match seed {
            Some(seed) => self.archetypes[seed as usize].clone_empty_for(set, registry)?,
            None => Archetype::new(set, registry)?,
        };

        let id = self.archetypes.len() as ArchetypeId;
        self.archetypes.push(archetype);
        self.by_set.insert(set.clone(), id);
        self.structural_version += 1;
        debug!("created archetype {id} ({} kinds)", set.len());
        Ok(id)
    }

    /// Ids of every archetype whose set is a superset of `required`, in
    /// lexicographic set order.
    pub fn matching_archetypes(&self, required: &ComponentSet) -> Vec<ArchetypeId> {
        self.by_set
            .iter()
            .filter(|(set, _)| set.contains_all(required))
            .map(|(_, &id)| id)
            .collect()
    }

    /// Monotonic counter of structural changes, used to detect mutation
    /// during iteration.
    pub fn structural_version(&self) -> u64 {
        self.structural_version
    }

    /// Attaches `value` of kind `kind` to a located or unlocated entity,
    /// migrating its row as needed.
    ///
    /// The caller has already validated the kind against the value type and
    /// ruled out the overwrite case (entity already carries `kind`).
    pub fn add_component(
        &mut self,
        entities: &mut Entities,
        registry: &ComponentRegistry,
        entity: Id,
        kind: Id,
        value: Box<dyn Any>,
    ) -> EcsResult<()> {
        match entities.location(entity)? {
            None => {
                let target_set = ComponentSet::from_kinds(&[kind]);
                let target = self.find_or_create(&target_set, None, registry)?;
                let archetype = self.archetype_mut(target);
                let row = archetype.push_value(kind, value)?;
                archetype.push_entity(entity);
                archetype.debug_check_alignment();
                entities.set_location(entity, Some(EntityLocation { archetype: target, row }));
                trace!("entity {:#018x} entered archetype {target} at row {row}", entity.0);
            }
            Some(location) => {
                let source_set = self.archetype(location.archetype).set().clone();
                debug_assert!(!source_set.contains(kind), "overwrite handled by the caller");
                let target_set = source_set.with(kind);
                let target =
                    self.find_or_create(&target_set, Some(location.archetype), registry)?;

                let (source, destination) = self.pair_mut(location.archetype, target)?;
                let outcome = source.migrate_row_to(destination, location.row)?;
                let row = destination.push_value(kind, value)?;
                if row != outcome.new_row {
                    return Err(EcsError::Internal("appended value landed off-row"));
                }
                destination.debug_check_alignment();

                entities.set_location(entity, Some(EntityLocation { archetype: target, row }));
                if let Some(moved) = outcome.moved_entity {
                    entities.set_row(moved, location.row);
                }
                trace!(
                    "entity {:#018x} migrated {} -> {target} (row {row})",
                    entity.0,
                    location.archetype
                );
            }
        }
        self.structural_version += 1;
        Ok(())
    }

    /// Detaches `kind` from the entity, migrating its row to the reduced
    /// archetype. When `kind` was its last component the row is freed
    /// entirely and the entity becomes unlocated.
    pub fn remove_component(
        &mut self,
        entities: &mut Entities,
        registry: &ComponentRegistry,
        entity: Id,
        kind: Id,
    ) -> EcsResult<()> {
        let location = entities
            .location(entity)?
            .ok_or(EcsError::ComponentNotPresent { entity, kind })?;
        let source_set = self.archetype(location.archetype).set().clone();
        if !source_set.contains(kind) {
            return Err(EcsError::ComponentNotPresent { entity, kind });
        }

        let target_set = source_set.without(kind);
        if target_set.is_empty() {
            let moved = self
                .archetype_mut(location.archetype)
                .remove_row(location.row)?;
            entities.set_location(entity, None);
            if let Some(moved) = moved {
                entities.set_row(moved, location.row);
            }
            trace!("entity {:#018x} left archetype {}", entity.0, location.archetype);
        } else {
            let target = self.find_or_create(&target_set, Some(location.archetype), registry)?;
            let (source, destination) = self.pair_mut(location.archetype, target)?;
            let outcome = source.migrate_row_to(destination, location.row)?;
            destination.debug_check_alignment();

            entities.set_location(
                entity,
                Some(EntityLocation { archetype: target, row: outcome.new_row }),
            );
            if let Some(moved) = outcome.moved_entity {
                entities.set_row(moved, location.row);
            }
            trace!(
                "entity {:#018x} migrated {} -> {target} (row {})",
                entity.0,
                location.archetype,
                outcome.new_row
            );
        }
        self.structural_version += 1;
        Ok(())
    }

    /// Frees the archetype row behind a destroyed entity, fixing up the
    /// entity whose row was swapped into its place.
    pub fn free_row(&mut self, entities: &mut Entities, location: EntityLocation) -> EcsResult<()> {
        let moved = self
            .archetype_mut(location.archetype)
            .remove_row(location.row)?;
        if let Some(moved) = moved {
            entities.set_row(moved, location.row);
        }
        self.structural_version += 1;
        Ok(())
    }

    /// Exclusive access to two distinct archetypes at once.
    fn pair_mut(
        &mut self,
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> EcsResult<(&mut Archetype, &mut Archetype)> {
        if a == b {
            return Err(EcsError::Internal("migration source equals destination"));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.archetypes.split_at_mut(high as usize);
        let low_ref = &mut head[low as usize];
        let high_ref = &mut tail[0];
        Ok(if a < b { (low_ref, high_ref) } else { (high_ref, low_ref) })
    }
}
