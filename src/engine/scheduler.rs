//! ECS system scheduling and execution.
//!
//! The scheduler buckets systems by [`Phase`] and drives them strictly in
//! order: phases in their declared order, and systems within a phase in
//! registration order. There is no reordering and no priority; determinism
//! by registration order is the contract.
//!
//! ## Execution model
//! For each system: run its prelude, ask the store for every archetype
//! whose set is a superset of the system's required set (in the store's
//! deterministic key order), and run the system's driver over each match.
//! Systems run to completion one after another; a system's writes are
//! visible to every later system in the same tick.
//!
//! ## Structural discipline
//! Structural mutation (component add/remove, entity create/destroy) is
//! forbidden while a system iterates. Drivers only receive column views, so
//! safe callers cannot violate this; the store's structural version is
//! still snapshotted around every pass and compared in debug builds.

use log::trace;

use crate::engine::error::{EcsError, EcsResult};
use crate::engine::store::ArchetypeStore;
use crate::engine::systems::SystemRecord;
use crate::engine::types::Phase;

/// Phase-bucketed system scheduler.
#[derive(Default)]
pub struct Scheduler {
    phases: [Vec<SystemRecord>; Phase::COUNT],
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a system to the end of its phase's list.
    pub fn add(&mut self, phase: Phase, record: SystemRecord) {
        self.phases[phase.index()].push(record);
    }

    /// Total number of registered systems across all phases.
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no system is registered.
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Vec::is_empty)
    }

    /// Runs every system of one phase, in registration order.
    pub fn run_phase(&mut self, phase: Phase, store: &mut ArchetypeStore) -> EcsResult<()> {
        let systems = &mut self.phases[phase.index()];
        if systems.is_empty() {
            return Ok(());
        }
        trace!("running phase {phase:?} ({} systems)", systems.len());

        for system in systems.iter_mut() {
            system.run_prelude();

            let version = store.structural_version();
            for id in store.matching_archetypes(system.required_set()) {
                system.run_archetype(store.archetype_mut(id))?;
            }
            if store.structural_version() != version {
                debug_assert!(
                    false,
                    "structural mutation while system '{}' iterated",
                    system.name()
                );
                return Err(EcsError::StructuralMutationDuringIteration);
            }
        }
        Ok(())
    }

    /// Drives the `PreUpdate` and `Update` phases.
    pub fn update(&mut self, store: &mut ArchetypeStore) -> EcsResult<()> {
        self.run_phase(Phase::PreUpdate, store)?;
        self.run_phase(Phase::Update, store)
    }

    /// Drives the `PreRender` and `Render` phases.
    pub fn render(&mut self, store: &mut ArchetypeStore) -> EcsResult<()> {
        self.run_phase(Phase::PreRender, store)?;
        self.run_phase(Phase::Render, store)
    }

    /// Drives the `Ui` phase.
    pub fn ui(&mut self, store: &mut ArchetypeStore) -> EcsResult<()> {
        self.run_phase(Phase::Ui, store)
    }
}
