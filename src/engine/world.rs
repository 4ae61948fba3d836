//! # The World
//!
//! `World` is the explicit core value owning every piece of ECS state: the
//! entity allocator and directory, the component kind registry, the
//! archetype store, and the system scheduler. There is no process-wide
//! world; everything flows through a `World` the host constructs and owns,
//! and only one mutable borrow of it is ever active.
//!
//! ## Typical usage
//! ```
//! use archon_ecs::prelude::*;
//!
//! #[derive(Clone, Copy)]
//! struct Position { x: f32, y: f32 }
//! #[derive(Clone, Copy)]
//! struct Velocity { x: f32, y: f32 }
//!
//! # fn main() -> EcsResult<()> {
//! let mut world = World::default();
//! let position = world.register_component::<Position>(RegisterFlag::TypeDefault)?;
//! let velocity = world.register_component::<Velocity>(RegisterFlag::TypeDefault)?;
//!
//! let entity = world.create_entity()?;
//! world.add(entity, velocity, Velocity { x: 0.0, y: 0.0 })?;
//! world.add(entity, position, Position { x: 0.0, y: 0.0 })?;
//!
//! world.register_system2(
//!     &[position, velocity],
//!     Phase::Update,
//!     || {},
//!     |position: &mut Position, velocity: &mut Velocity| {
//!         position.x += velocity.x;
//!         position.y += velocity.y;
//!     },
//! )?;
//!
//! world.update()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Tick entry points
//! `update`, `render`, and `ui` drive the phase groups described in
//! `types.rs`. The host may interleave arbitrary non-ECS work between these
//! calls; that is the only yield granularity the runtime offers.

use std::any::type_name;

use log::debug;

use crate::engine::archetype::Archetype;
use crate::engine::component::{ComponentRegistry, RegisterFlag};
use crate::engine::entity::{Entities, EntityLocation};
use crate::engine::error::{ArityMismatchError, EcsError, EcsResult};
use crate::engine::query;
use crate::engine::scheduler::Scheduler;
use crate::engine::store::ArchetypeStore;
use crate::engine::systems::{ArchetypeDriver, SystemRecord};
use crate::engine::types::{
    describe, ComponentSet, HandleInfo, Id, IdKind, Phase, TypeToken,
};

/// Construction options for a [`World`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldOptions {
    /// When `true`, `register_system*` calls may pass fewer component
    /// handles than the callback declares value types; the tail is filled
    /// from the registry's type defaults.
    pub auto_fill_unspecified_component_kinds: bool,
}

/// Owner of all ECS state and entry point of the public API.
pub struct World {
    options: WorldOptions,
    entities: Entities,
    registry: ComponentRegistry,
    store: ArchetypeStore,
    scheduler: Scheduler,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldOptions::default())
    }
}

impl World {
    /// Creates an empty world with the given options.
    pub fn new(options: WorldOptions) -> Self {
        Self {
            options,
            entities: Entities::new(),
            registry: ComponentRegistry::new(),
            store: ArchetypeStore::new(),
            scheduler: Scheduler::new(),
        }
    }

    // ── Entities ────────────────────────────────────────────────────────

    /// Creates a live entity with no components.
    ///
    /// ## Errors
    /// Fails only on exhaustion of the 32-bit entity index space.
    pub fn create_entity(&mut self) -> EcsResult<Id> {
        self.entities.create()
    }

    /// Destroys an entity, freeing its archetype row and invalidating the
    /// handle. The index becomes reusable under a larger generation.
    pub fn destroy(&mut self, entity: Id) -> EcsResult<()> {
        if let Some(location) = self.entities.destroy(entity)? {
            self.store.free_row(&mut self.entities, location)?;
        }
        Ok(())
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn is_alive(&self, entity: Id) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    pub fn live_entities(&self) -> usize {
        self.entities.live_count()
    }

    // ── Component kinds ─────────────────────────────────────────────────

    /// Registers value type `T` as a new component kind.
    ///
    /// With [`RegisterFlag::TypeDefault`] the kind becomes the default used
    /// whenever a caller names only the value type.
    pub fn register_component<T: 'static>(&mut self, flag: RegisterFlag) -> EcsResult<Id> {
        self.registry.register::<T>(flag)
    }

    /// Returns the default kind for `T`, if one was registered.
    pub fn default_kind_for<T: 'static>(&self) -> Option<Id> {
        self.registry.default_kind_for::<T>()
    }

    // ── Component values ────────────────────────────────────────────────

    /// Attaches `value` of the named kind to an entity.
    ///
    /// If the entity already carries the kind, the stored value is
    /// overwritten in place and archetype membership is unchanged.
    /// Otherwise the entity's row migrates to the archetype extending its
    /// current set with `kind`.
    pub fn add<T: 'static>(&mut self, entity: Id, kind: Id, value: T) -> EcsResult<()> {
        self.registry.expect_kind(kind, TypeToken::of::<T>())?;
        if let Some(location) = self.entities.location(entity)? {
            if self.store.archetype(location.archetype).has_kind(kind) {
                *self
                    .store
                    .archetype_mut(location.archetype)
                    .get_mut::<T>(kind, location.row)? = value;
                return Ok(());
            }
        }
        self.store
            .add_component(&mut self.entities, &self.registry, entity, kind, Box::new(value))
    }

    /// Attaches `value` using the default kind registered for `T`.
    pub fn add_default<T: 'static>(&mut self, entity: Id, value: T) -> EcsResult<()> {
        let kind = self.registry.require_default_kind::<T>()?;
        self.add(entity, kind, value)
    }

    /// Detaches the named kind from an entity.
    ///
    /// Removing the entity's last component leaves it alive but unlocated.
    ///
    /// ## Errors
    /// `ComponentNotPresent` if the entity does not carry `kind`.
    pub fn remove(&mut self, entity: Id, kind: Id) -> EcsResult<()> {
        if kind.kind() != Some(IdKind::Component) {
            return Err(EcsError::WrongHandleKind { id: kind, expected: IdKind::Component });
        }
        if self.registry.describe_kind(kind).is_none() {
            return Err(EcsError::UnregisteredType { token: None });
        }
        self.store
            .remove_component(&mut self.entities, &self.registry, entity, kind)
    }

    /// Returns `true` if the entity is live and carries the named kind.
    ///
    /// This is a lookup: stale handles and unregistered kinds yield `false`
    /// rather than an error.
    pub fn has(&self, entity: Id, kind: Id) -> bool {
        match self.entities.location(entity) {
            Ok(Some(location)) => self.store.archetype(location.archetype).has_kind(kind),
            _ => false,
        }
    }

    /// Exclusive access to the entity's value of the named kind.
    ///
    /// The reference is valid only until the next structural mutation; do
    /// not hold it across `add`/`remove`/`destroy` calls.
    pub fn get<T: 'static>(&mut self, entity: Id, kind: Id) -> EcsResult<&mut T> {
        self.registry.expect_kind(kind, TypeToken::of::<T>())?;
        let location = self
            .entities
            .location(entity)?
            .ok_or(EcsError::ComponentNotPresent { entity, kind })?;
        let archetype = self.store.archetype_mut(location.archetype);
        if !archetype.has_kind(kind) {
            return Err(EcsError::ComponentNotPresent { entity, kind });
        }
        archetype.get_mut::<T>(kind, location.row)
    }

    /// Exclusive access through the default kind registered for `T`.
    pub fn get_default<T: 'static>(&mut self, entity: Id) -> EcsResult<&mut T> {
        let kind = self.registry.require_default_kind::<T>()?;
        self.get(entity, kind)
    }

    // ── Ticking ─────────────────────────────────────────────────────────

    /// Runs the `PreUpdate` and `Update` phases.
    pub fn update(&mut self) -> EcsResult<()> {
        self.scheduler.update(&mut self.store)
    }

    /// Runs the `PreRender` and `Render` phases.
    pub fn render(&mut self) -> EcsResult<()> {
        self.scheduler.render(&mut self.store)
    }

    /// Runs the `Ui` phase.
    pub fn ui(&mut self) -> EcsResult<()> {
        self.scheduler.ui(&mut self.store)
    }

    // ── Introspection ───────────────────────────────────────────────────

    /// Decomposes a handle for diagnostics.
    pub fn describe(&self, id: Id) -> HandleInfo {
        describe(id)
    }

    /// Number of archetypes the store holds.
    pub fn archetype_count(&self) -> usize {
        self.store.len()
    }

    /// Row count of the archetype matching exactly the given kinds, if it
    /// exists.
    pub fn row_count(&self, kinds: &[Id]) -> Option<usize> {
        let set = ComponentSet::from_kinds(kinds);
        self.store
            .find(&set)
            .map(|id| self.store.archetype(id).row_count())
    }

    /// Storage location of a live, located entity.
    pub fn location_of(&self, entity: Id) -> Option<EntityLocation> {
        self.entities.location(entity).ok().flatten()
    }

    /// Component set of a live, located entity.
    pub fn set_of(&self, entity: Id) -> Option<&ComponentSet> {
        let location = self.location_of(entity)?;
        Some(self.store.archetype(location.archetype).set())
    }

    /// Number of registered systems across all phases.
    pub fn system_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Read access to the archetype store, for tooling and tests.
    pub fn store(&self) -> &ArchetypeStore {
        &self.store
    }

    /// Read access to the component registry, for tooling and tests.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    // ── System registration ─────────────────────────────────────────────

    /// Resolves and validates a system's required-kind list.
    ///
    /// `kinds` may be shorter than `tokens` when auto-fill is enabled; the
    /// missing tail comes from the registry's type defaults, paired
    /// positionally with the declared value types.
    fn resolve_required(&self, kinds: &[Id], tokens: &[TypeToken]) -> EcsResult<Vec<Id>> {
        if kinds.len() > tokens.len() {
            return Err(ArityMismatchError {
                declared: tokens.len(),
                provided: kinds.len(),
            }
            .into());
        }
        if kinds.len() < tokens.len() && !self.options.auto_fill_unspecified_component_kinds {
            return Err(EcsError::AutoFillDisabled);
        }

        let mut required = Vec::with_capacity(tokens.len());
        for (position, &token) in tokens.iter().enumerate() {
            let kind = match kinds.get(position) {
                Some(&kind) => kind,
                None => self
                    .registry
                    .default_kind_for_token(token)
                    .ok_or(EcsError::UnregisteredType { token: Some(token) })?,
            };
            self.registry.expect_kind(kind, token)?;
            if required.contains(&kind) {
                return Err(EcsError::DuplicateRequiredKind { kind });
            }
            required.push(kind);
        }
        Ok(required)
    }
}

macro_rules! register_system_impl {
    ($(#[$meta:meta])* $method:ident, $views:ident, $count:literal, $(($T:ident, $idx:tt)),+) => {
        impl World {
            $(#[$meta])*
            ///
            /// `kinds` pairs positionally with the callback's value types
            /// and is validated against the registry before the system is
            /// appended to its phase, in registration order. With auto-fill
            /// enabled, `kinds` may be a prefix (even empty); the rest come
            /// from type defaults. `prelude` runs once per dispatch before
            /// any row iteration.
            pub fn $method<$($T,)+ P, F>(
                &mut self,
                kinds: &[Id],
                phase: Phase,
                prelude: P,
                mut for_each: F,
            ) -> EcsResult<()>
            where
                $($T: 'static,)+
                P: FnMut() + 'static,
                F: FnMut($(&mut $T),+) + 'static,
            {
                let tokens = [$(TypeToken::of::<$T>(),)+];
                let required = self.resolve_required(kinds, &tokens)?;
                let mut resolved = [Id(0); $count];
                resolved.copy_from_slice(&required);
                let name = [$(type_name::<$T>(),)+].join(", ");

                let driver: ArchetypeDriver = Box::new(move |archetype: &mut Archetype| {
                    let mut views = query::$views::<$($T),+>(archetype, &resolved)?;
                    for row in 0..views.0.len() {
                        for_each($(views.$idx.get_mut(row)),+);
                    }
                    Ok(())
                });

                debug!("registered system over ({name}) in phase {phase:?}");
                self.scheduler
                    .add(phase, SystemRecord::new(name, required, Box::new(prelude), driver));
                Ok(())
            }
        }
    };
}

register_system_impl!(
    /// Registers a system over one component kind.
    register_system1, column_views1, 1, (T1, 0)
);
register_system_impl!(
    /// Registers a system over two component kinds.
    register_system2, column_views2, 2, (T1, 0), (T2, 1)
);
register_system_impl!(
    /// Registers a system over three component kinds.
    register_system3, column_views3, 3, (T1, 0), (T2, 1), (T3, 2)
);
register_system_impl!(
    /// Registers a system over four component kinds.
    register_system4, column_views4, 4, (T1, 0), (T2, 1), (T3, 2), (T4, 3)
);
register_system_impl!(
    /// Registers a system over five component kinds.
    register_system5, column_views5, 5, (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4)
);
register_system_impl!(
    /// Registers a system over six component kinds.
    register_system6, column_views6, 6, (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4), (T6, 5)
);
register_system_impl!(
    /// Registers a system over seven component kinds.
    register_system7, column_views7, 7,
    (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4), (T6, 5), (T7, 6)
);
register_system_impl!(
    /// Registers a system over eight component kinds.
    register_system8, column_views8, 8,
    (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4), (T6, 5), (T7, 6), (T8, 7)
);
