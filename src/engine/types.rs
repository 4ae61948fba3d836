//! Core ECS Types, Identifiers, and Bit-Level Layouts
//!
//! This module defines the **fundamental types, identifiers, and bit layouts**
//! shared across the ECS runtime: the packed 64-bit handle, the kind tags that
//! multiplex entities, components, and relations into one handle space, the
//! type-identity token used to pair component kinds with Rust value types, the
//! component-set key that identifies archetypes, and the scheduling phases.
//!
//! ## Handle Representation
//!
//! Every handle is a single 64-bit value partitioned as:
//!
//! ```text
//! | kind | generation | index |
//! ```
//!
//! - **Index** (bits 0–31) is a sequential slot number.
//! - **Generation** (bits 32–55) distinguishes the live occupant of an index
//!   from prior occupants, enabling stale-handle detection.
//! - **Kind** (bits 56–63) tags the handle as an entity, a component kind, or
//!   a relation.
//!
//! The shift and mask constants below are part of the public ABI: external
//! tooling may decompose handles with them, so their values are stable.
//!
//! ## Component Sets
//!
//! [`ComponentSet`] is the identity of an archetype: an ordered, deduplicated
//! set of component-kind handles. Sets compare and hash by contents, and their
//! lexicographic ordering gives the archetype store a deterministic iteration
//! order.
//!
//! ## Phases
//!
//! Systems are bucketed into five ordered [`Phase`]s. The phase groups map
//! onto the three tick entry points: `update` drives `PreUpdate` and `Update`,
//! `render` drives `PreRender` and `Render`, and `ui` drives `Ui`.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Raw 64-bit representation of a handle.
pub type RawId = u64;

/// Generation counter stored in a handle.
pub type Generation = u32;

/// Bit-width type used for layout constants.
pub type Bits = u32;

/// Number of bits reserved for the index portion of a handle.
pub const INDEX_BITS: Bits = 32;
/// Number of bits reserved for the generation portion of a handle.
pub const GENERATION_BITS: Bits = 24;
/// Number of bits reserved for the kind tag of a handle.
pub const KIND_BITS: Bits = 8;

/// Bit offset of the generation field.
pub const GENERATION_SHIFT: Bits = INDEX_BITS;
/// Bit offset of the kind tag.
pub const KIND_SHIFT: Bits = INDEX_BITS + GENERATION_BITS;

const _: [(); 1] = [(); (INDEX_BITS + GENERATION_BITS + KIND_BITS == 64) as usize];
const _: [(); 1] = [(); (KIND_SHIFT == 56) as usize];

const fn mask(bits: Bits) -> RawId {
    if bits == 0 { 0 } else { ((1 as RawId) << bits) - 1 }
}

/// Mask selecting the index portion of a handle.
pub const INDEX_MASK: RawId = mask(INDEX_BITS);
/// Mask selecting the generation portion of a handle.
pub const GENERATION_MASK: RawId = mask(GENERATION_BITS) << GENERATION_SHIFT;
/// Mask selecting the kind tag of a handle.
pub const KIND_MASK: RawId = mask(KIND_BITS) << KIND_SHIFT;

/// Largest generation value representable in a handle.
pub const GENERATION_CAP: Generation = mask(GENERATION_BITS) as Generation;

/// Classifies what a handle refers to.
///
/// The tag occupies the top byte of a handle and is immutable for the
/// handle's lifetime. `ParentOf` is reserved for relation support and is not
/// consumed by any algorithm in this revision.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// An entity identity.
    Entity = 1,
    /// A registered component kind.
    Component = 2,
    /// A parent-of relation (reserved).
    ParentOf = 3,
}

impl IdKind {
    /// Decodes a kind tag byte, returning `None` for unassigned values.
    #[inline]
    pub fn from_tag(tag: u8) -> Option<IdKind> {
        match tag {
            1 => Some(IdKind::Entity),
            2 => Some(IdKind::Component),
            3 => Some(IdKind::ParentOf),
            _ => None,
        }
    }

    /// Human-readable name of the kind, used by [`describe`].
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            IdKind::Entity => "entity",
            IdKind::Component => "component",
            IdKind::ParentOf => "parent-of",
        }
    }
}

/// Packed 64-bit handle multiplexing entities, component kinds, and
/// relations.
///
/// Handles are cheap to copy and compare. Use [`make_entity`] and
/// [`make_component`] to construct them and the accessor methods to
/// decompose them.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Id(pub RawId);

/// Builds an entity handle from an index and a generation.
#[inline]
pub fn make_entity(index: u32, generation: Generation) -> Id {
    debug_assert!(generation <= GENERATION_CAP);
    Id(((IdKind::Entity as RawId) << KIND_SHIFT)
        | ((generation as RawId) << GENERATION_SHIFT)
        | (index as RawId))
}

/// Builds a component-kind handle from an index.
///
/// Component kinds are never recycled, so they carry no generation.
#[inline]
pub fn make_component(index: u32) -> Id {
    Id(((IdKind::Component as RawId) << KIND_SHIFT) | (index as RawId))
}

/// Returns the kind tag of a handle, or `None` if the tag byte is
/// unassigned.
#[inline]
pub fn kind(id: Id) -> Option<IdKind> {
    IdKind::from_tag((id.0 >> KIND_SHIFT) as u8)
}

impl Id {
    /// Returns the index component of this handle.
    #[inline]
    pub fn index(self) -> u32 {
        (self.0 & INDEX_MASK) as u32
    }

    /// Returns the generation component of this handle.
    #[inline]
    pub fn generation(self) -> Generation {
        ((self.0 & GENERATION_MASK) >> GENERATION_SHIFT) as Generation
    }

    /// Returns the kind tag of this handle.
    #[inline]
    pub fn kind(self) -> Option<IdKind> {
        kind(self)
    }

    /// Returns `true` if the handle carries the entity tag.
    #[inline]
    pub fn is_entity(self) -> bool {
        self.kind() == Some(IdKind::Entity)
    }

    /// Returns `true` if the handle carries the component tag.
    #[inline]
    pub fn is_component(self) -> bool {
        self.kind() == Some(IdKind::Component)
    }
}

/// Stable 64-bit fingerprint identifying a Rust value type.
///
/// Tokens pair a registered component kind with the value type its columns
/// store. They gate registration and typed access; they are never consulted
/// per row on the hot path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeToken(u64);

impl TypeToken {
    /// Computes the token for type `T`.
    pub fn of<T: 'static>() -> Self {
        let mut hasher = DefaultHasher::new();
        std::any::TypeId::of::<T>().hash(&mut hasher);
        TypeToken(hasher.finish())
    }

    /// Returns the raw fingerprint value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Ordered, deduplicated set of component-kind handles.
///
/// A `ComponentSet` is the identity of an archetype. Equality and hashing
/// are by contents; the derived lexicographic ordering is what makes
/// archetype-store iteration deterministic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct ComponentSet {
    kinds: Vec<Id>,
}

impl ComponentSet {
    /// Creates an empty set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a list of kinds, sorting and deduplicating.
    pub fn from_kinds(kinds: &[Id]) -> Self {
        let mut kinds = kinds.to_vec();
        kinds.sort_unstable();
        kinds.dedup();
        Self { kinds }
    }

    /// Inserts a kind, returning `true` if it was not already present.
    pub fn insert(&mut self, kind: Id) -> bool {
        match self.kinds.binary_search(&kind) {
            Ok(_) => false,
            Err(position) => {
                self.kinds.insert(position, kind);
                true
            }
        }
    }

    /// Removes a kind, returning `true` if it was present.
    pub fn remove(&mut self, kind: Id) -> bool {
        match self.kinds.binary_search(&kind) {
            Ok(position) => {
                self.kinds.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns a copy of this set with `kind` added.
    pub fn with(&self, kind: Id) -> Self {
        let mut out = self.clone();
        out.insert(kind);
        out
    }

    /// Returns a copy of this set with `kind` removed.
    pub fn without(&self, kind: Id) -> Self {
        let mut out = self.clone();
        out.remove(kind);
        out
    }

    /// Returns `true` if `kind` is present.
    #[inline]
    pub fn contains(&self, kind: Id) -> bool {
        self.kinds.binary_search(&kind).is_ok()
    }

    /// Returns `true` if every kind in `other` is present in this set.
    pub fn contains_all(&self, other: &ComponentSet) -> bool {
        other.kinds.iter().all(|&kind| self.contains(kind))
    }

    /// Iterates over the kinds in ascending handle order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.kinds.iter().copied()
    }

    /// Number of kinds in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if the set holds no kinds.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Ordered scheduling slot for systems.
///
/// `update()` executes `PreUpdate` then `Update`; `render()` executes
/// `PreRender` then `Render`; `ui()` executes `Ui`. The split entry points
/// let a host interleave its own work between phase groups.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Phase {
    /// Runs first within `update()`.
    PreUpdate,
    /// Runs second within `update()`.
    Update,
    /// Runs first within `render()`.
    PreRender,
    /// Runs second within `render()`.
    Render,
    /// Runs within `ui()`.
    Ui,
}

impl Phase {
    /// Number of phases.
    pub const COUNT: usize = 5;

    /// All phases in scheduling order.
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::PreUpdate,
        Phase::Update,
        Phase::PreRender,
        Phase::Render,
        Phase::Ui,
    ];

    /// Position of this phase in scheduling order.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Identifier of an archetype within the store.
///
/// Stable for the lifetime of the store: archetypes are never deleted, only
/// emptied.
pub type ArchetypeId = u32;

/// Fixed-shape decomposition of a handle for diagnostics and tooling.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HandleInfo {
    /// Name of the handle's kind tag, or `"unknown"`.
    pub kind_name: &'static str,
    /// Decoded generation field.
    pub generation: Generation,
    /// Decoded index field.
    pub index: u32,
    /// Full handle value in hexadecimal.
    pub hex: String,
}

/// Decomposes a handle into a [`HandleInfo`] record.
pub fn describe(id: Id) -> HandleInfo {
    HandleInfo {
        kind_name: id.kind().map_or("unknown", IdKind::name),
        generation: id.generation(),
        index: id.index(),
        hex: format!("{:#018x}", id.0),
    }
}

impl fmt::Display for HandleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (index {}, generation {}, {})",
            self.kind_name, self.index, self.generation, self.hex
        )
    }
}
