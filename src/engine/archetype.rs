//! # Archetype Tables
//!
//! An archetype stores every entity that shares one exact component set,
//! column-major: one type-erased column per kind, all columns row-parallel.
//! Row `r` across all columns is "the entity at row r".
//!
//! ## Design
//! - Columns are dense; deletion uses swap-remove, so removing a row
//!   perturbs at most one other row's index.
//! - A row-parallel `entities` back-index records which entity owns each
//!   row, making swap-remove directory fix-up O(1) without directory scans.
//! - Migration moves rows by value between archetypes: kinds shared with
//!   the destination transfer, kinds absent from it are dropped. Every
//!   column must agree on the destination row and on the swap-remove
//!   metadata; disagreement is an invariant violation.
//!
//! ## Invariants
//! - Every column has the same length, equal to `entities.len()`.
//! - The signature set exactly matches the allocated columns.
//! - Typed access is only performed with kinds the registry has validated
//!   against the requested value type.

use std::collections::HashMap;

use crate::engine::component::ComponentRegistry;
use crate::engine::error::{EcsError, EcsResult, MigrateError};
use crate::engine::storage::{Column, TypeErasedColumn};
use crate::engine::types::{ComponentSet, Id};

/// Result of migrating one row to another archetype.
#[derive(Clone, Copy, Debug)]
pub struct MigrationOutcome {
    /// Row the entity landed in within the destination.
    pub new_row: usize,
    /// Entity whose row was swapped into the vacated source slot, if any.
    pub moved_entity: Option<Id>,
}

/// Column table for one exact component set.
pub struct Archetype {
    set: ComponentSet,
    columns: Vec<Box<dyn TypeErasedColumn>>,
    column_index: HashMap<Id, usize>,
    entities: Vec<Id>,
}

impl Archetype {
    /// Creates an empty archetype for `set`, allocating one column per kind
    /// from the registry's factories.
    pub fn new(set: &ComponentSet, registry: &ComponentRegistry) -> EcsResult<Self> {
        let mut archetype = Self {
            set: set.clone(),
            columns: Vec::with_capacity(set.len()),
            column_index: HashMap::with_capacity(set.len()),
            entities: Vec::new(),
        };
        for kind in set.iter() {
            let column = registry.new_column(kind)?;
            archetype.column_index.insert(kind, archetype.columns.len());
            archetype.columns.push(column);
        }
        Ok(archetype)
    }

    /// Creates an empty archetype for `set`, reusing this archetype's column
    /// schemata where kinds overlap and falling back to registry factories
    /// for kinds this archetype lacks.
    ///
    /// This is the clone step of structural migration: the new archetype
    /// shares element types with its seed without copying any rows.
    pub fn clone_empty_for(
        &self,
        set: &ComponentSet,
        registry: &ComponentRegistry,
    ) -> EcsResult<Archetype> {
        let mut archetype = Archetype {
            set: set.clone(),
            columns: Vec::with_capacity(set.len()),
            column_index: HashMap::with_capacity(set.len()),
            entities: Vec::new(),
        };
        for kind in set.iter() {
            let column = match self.column_index.get(&kind) {
                Some(&index) => self.columns[index].clone_empty(),
                None => registry.new_column(kind)?,
            };
            archetype.column_index.insert(kind, archetype.columns.len());
            archetype.columns.push(column);
        }
        Ok(archetype)
    }

    /// The component set identifying this archetype.
    #[inline]
    pub fn set(&self) -> &ComponentSet {
        &self.set
    }

    /// Number of occupied rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if this archetype stores the given kind.
    #[inline]
    pub fn has_kind(&self, kind: Id) -> bool {
        self.column_index.contains_key(&kind)
    }

    /// Entity occupying `row`, if in bounds.
    #[inline]
    pub fn entity_at(&self, row: usize) -> Option<Id> {
        self.entities.get(row).copied()
    }

    /// Appends `value` to the named column, returning the row it landed in.
    ///
    /// The caller completes the row by pushing to every other column (or by
    /// migrating them in) before the archetype is observed again; in debug
    /// builds [`Archetype::debug_check_alignment`] enforces parity.
    pub fn push_value(&mut self, kind: Id, value: Box<dyn std::any::Any>) -> EcsResult<usize> {
        let column = self.column_mut(kind)?;
        Ok(column.push_dyn(value)?)
    }

    /// Records `entity` as the owner of the most recently completed row.
    pub fn push_entity(&mut self, entity: Id) {
        self.entities.push(entity);
    }

    /// Typed mutable access to one value.
    ///
    /// `kind` must already be validated against `T` through the registry;
    /// a failed downcast here means that contract was broken.
    pub fn get_mut<T: 'static>(&mut self, kind: Id, row: usize) -> EcsResult<&mut T> {
        let index = *self
            .column_index
            .get(&kind)
            .ok_or(EcsError::Migrate(MigrateError::MissingColumn { kind }))?;
        let column = self.columns[index]
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or(EcsError::Internal("column downcast after registry validation"))?;
        column
            .get_mut(row)
            .ok_or(EcsError::Internal("row past end of column"))
    }

    /// Raw pointer and length of a column's storage, for view construction.
    ///
    /// The pointer is valid for `len` elements while the archetype is
    /// borrowed and no structural mutation occurs.
    pub(crate) fn column_ptr<T: 'static>(&mut self, kind: Id) -> EcsResult<(*mut T, usize)> {
        let index = *self
            .column_index
            .get(&kind)
            .ok_or(EcsError::Migrate(MigrateError::MissingColumn { kind }))?;
        let column = self.columns[index]
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or(EcsError::Internal("column downcast after registry validation"))?;
        let slice = column.as_mut_slice();
        Ok((slice.as_mut_ptr(), slice.len()))
    }

    /// Moves row `row` into `destination`.
    ///
    /// Kinds present in both archetypes transfer by value; kinds absent
    /// from the destination are dropped via swap-remove. All columns must
    /// agree on the destination row and on which row was swapped into the
    /// vacated slot.
    ///
    /// The entity back-indices of both archetypes are updated here. Kinds
    /// present only in the destination are *not* filled: the caller pushes
    /// those values immediately after, restoring column parity.
    pub fn migrate_row_to(
        &mut self,
        destination: &mut Archetype,
        row: usize,
    ) -> EcsResult<MigrationOutcome> {
        let entity = self
            .entities
            .get(row)
            .copied()
            .ok_or(EcsError::Internal("migration row past end of archetype"))?;

        let mut destination_row: Option<usize> = None;
        let mut swap_info: Option<Option<usize>> = None;

        let kinds: Vec<Id> = self.set.iter().collect();
        for kind in kinds {
            let source_index = *self
                .column_index
                .get(&kind)
                .ok_or(EcsError::Migrate(MigrateError::MissingColumn { kind }))?;

            let moved_from = if let Some(&destination_index) = destination.column_index.get(&kind) {
                let (new_row, moved_from) = self.columns[source_index]
                    .move_row_to(destination.columns[destination_index].as_mut(), row)?;
                match destination_row {
                    Some(expected) if expected != new_row => {
                        return Err(MigrateError::RowMisalignment {
                            expected,
                            got: new_row,
                            kind,
                        }
                        .into());
                    }
                    None => destination_row = Some(new_row),
                    _ => {}
                }
                moved_from
            } else {
                self.columns[source_index].swap_remove(row)?
            };

            match swap_info {
                Some(existing) if existing != moved_from => {
                    return Err(MigrateError::InconsistentSwapInfo.into());
                }
                None => swap_info = Some(moved_from),
                _ => {}
            }
        }

        let new_row = destination_row.ok_or(MigrateError::NoComponentsMoved)?;

        self.entities.swap_remove(row);
        let moved_entity = self.entities.get(row).copied();
        debug_assert_eq!(
            moved_entity.is_some(),
            swap_info.flatten().is_some(),
            "column swap metadata disagrees with entity back-index"
        );
        destination.push_entity(entity);
        debug_assert_eq!(new_row + 1, destination.entities.len());

        Ok(MigrationOutcome { new_row, moved_entity })
    }

    /// Drops row `row` from every column, compacting with swap-remove.
    ///
    /// Returns the entity whose row was swapped into the vacated slot, if
    /// any. Used when an entity is destroyed or loses its last component.
    pub fn remove_row(&mut self, row: usize) -> EcsResult<Option<Id>> {
        if row >= self.entities.len() {
            return Err(EcsError::Internal("removal row past end of archetype"));
        }

        let mut swap_info: Option<Option<usize>> = None;
        for column in &mut self.columns {
            let moved_from = column.swap_remove(row)?;
            match swap_info {
                Some(existing) if existing != moved_from => {
                    return Err(MigrateError::InconsistentSwapInfo.into());
                }
                None => swap_info = Some(moved_from),
                _ => {}
            }
        }

        self.entities.swap_remove(row);
        Ok(self.entities.get(row).copied())
    }

    /// Asserts that every column length matches the entity back-index.
    pub fn debug_check_alignment(&self) {
        debug_assert!(
            self.columns.iter().all(|column| column.len() == self.entities.len()),
            "column lengths diverged from row count"
        );
    }

    fn column_mut(&mut self, kind: Id) -> EcsResult<&mut Box<dyn TypeErasedColumn>> {
        let index = *self
            .column_index
            .get(&kind)
            .ok_or(EcsError::Migrate(MigrateError::MissingColumn { kind }))?;
        Ok(&mut self.columns[index])
    }
}
