//! ECS system records.
//!
//! A **system** is a unit of logic run once per tick phase over every entity
//! carrying its required component kinds. Systems are registered through the
//! world's typed `register_system*` methods, which validate the required
//! kinds against the callback's value types and then erase them into a
//! [`SystemRecord`]:
//!
//! - a **prelude** callback, run once per dispatch before any iteration
//!   (even when no archetype matches), and
//! - a **driver** callback, run once per matching archetype, which forms the
//!   typed column views and walks the rows.
//!
//! Type checking happens entirely at registration; the driver trusts the
//! validated kinds on the hot path and never re-checks per row.

use crate::engine::archetype::Archetype;
use crate::engine::error::EcsResult;
use crate::engine::types::{ComponentSet, Id};

/// Prelude callback, run once per system dispatch.
pub type Prelude = Box<dyn FnMut()>;

/// Per-archetype driver formed at registration.
pub type ArchetypeDriver = Box<dyn FnMut(&mut Archetype) -> EcsResult<()>>;

/// Type-erased registered system.
pub struct SystemRecord {
    name: String,
    required: Vec<Id>,
    required_set: ComponentSet,
    prelude: Prelude,
    driver: ArchetypeDriver,
}

impl SystemRecord {
    /// Builds a record from validated parts.
    ///
    /// `required` is the ordered kind list the driver was built over; the
    /// unordered set derived from it is what queries match against.
    pub fn new(name: String, required: Vec<Id>, prelude: Prelude, driver: ArchetypeDriver) -> Self {
        let required_set = ComponentSet::from_kinds(&required);
        Self { name, required, required_set, prelude, driver }
    }

    /// Human-readable name, derived from the callback's value types.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered component kinds the callback receives.
    pub fn required(&self) -> &[Id] {
        &self.required
    }

    /// Unordered required set used for archetype matching.
    pub fn required_set(&self) -> &ComponentSet {
        &self.required_set
    }

    /// Runs the prelude callback.
    pub fn run_prelude(&mut self) {
        (self.prelude)();
    }

    /// Runs the driver over one matching archetype.
    pub fn run_archetype(&mut self, archetype: &mut Archetype) -> EcsResult<()> {
        (self.driver)(archetype)
    }
}
