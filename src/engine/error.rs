//! Error types for the ECS runtime.
//!
//! This module declares focused, composable error types used across the
//! storage, registry, migration, and scheduling layers. Each error carries
//! enough context to make failures actionable while remaining small and cheap
//! to pass around or convert into the aggregate [`EcsError`].
//!
//! ## Goals
//! * **Specificity:** Each type models a single failure mode (stale handles,
//!   identity-token mismatches, arity violations, column bounds).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into [`EcsError`]
//!   so call sites can use `?` throughout.
//! * **Fail-fast:** Every variant here is a programming error. None are
//!   recovered internally; they surface to the caller and terminate the
//!   operation that raised them. The only soft lookups in the crate
//!   (`has`, `default_kind_for`) return absence values instead.

use std::any::TypeId;
use std::fmt;

use crate::engine::types::{Id, IdKind, TypeToken};

/// Returned when the 32-bit index space of a handle class is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Number of slots the operation would have required.
    pub needed: u64,
    /// Upper bound that prevented the operation.
    pub capacity: u64,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index space exhausted ({} needed; capacity {})",
            self.needed, self.capacity
        )
    }
}

impl std::error::Error for CapacityError {}

/// Returned when a column operation pairs two element types that differ.
///
/// Cross-type column operations indicate corrupted registration metadata or
/// a caller bypassing the registry; they are additionally checked by debug
/// assertions at the column boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Element type the destination storage declares.
    pub expected: TypeId,
    /// Element type the caller provided.
    pub actual: TypeId,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column type mismatch: expected {:?}, actual {:?}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for TypeMismatchError {}

/// Returned when a row index addresses past the end of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOutOfBoundsError {
    /// Row index that was addressed.
    pub row: usize,
    /// Number of valid rows at the time of the operation.
    pub len: usize,
}

impl fmt::Display for RowOutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} out of bounds (length {})", self.row, self.len)
    }
}

impl std::error::Error for RowOutOfBoundsError {}

/// Aggregate error for type-erased column operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// A value or peer column had the wrong element type.
    TypeMismatch(TypeMismatchError),
    /// A row index was outside valid column bounds.
    RowOutOfBounds(RowOutOfBoundsError),
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::TypeMismatch(e) => write!(f, "{e}"),
            ColumnError::RowOutOfBounds(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ColumnError {}

impl From<TypeMismatchError> for ColumnError {
    fn from(e: TypeMismatchError) -> Self {
        ColumnError::TypeMismatch(e)
    }
}

impl From<RowOutOfBoundsError> for ColumnError {
    fn from(e: RowOutOfBoundsError) -> Self {
        ColumnError::RowOutOfBounds(e)
    }
}

/// Returned when a component kind is paired with a value type whose
/// identity token differs from the one recorded at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityMismatchError {
    /// The component kind that was presented.
    pub kind: Id,
    /// Token recorded when the kind was registered.
    pub registered: TypeToken,
    /// Token of the value type the caller presented.
    pub presented: TypeToken,
}

impl fmt::Display for IdentityMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type identity mismatch for kind {:#018x}: registered token {:#018x}, presented {:#018x}",
            self.kind.0,
            self.registered.raw(),
            self.presented.raw()
        )
    }
}

impl std::error::Error for IdentityMismatchError {}

/// Returned when a system declares N value types but was given M ≠ N
/// component handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityMismatchError {
    /// Number of value types the system callback declares.
    pub declared: usize,
    /// Number of component handles provided at registration.
    pub provided: usize,
}

impl fmt::Display for ArityMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "system arity mismatch: {} value types declared, {} component handles provided",
            self.declared, self.provided
        )
    }
}

impl std::error::Error for ArityMismatchError {}

/// Errors raised while migrating a row between archetypes.
///
/// These indicate violated internal invariants rather than recoverable
/// user-facing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateError {
    /// A kind present in the set had no backing column.
    MissingColumn {
        /// Kind whose column was absent.
        kind: Id,
    },
    /// Component columns disagreed on the destination row.
    RowMisalignment {
        /// Row reported by the first moved column.
        expected: usize,
        /// Row reported by a later column.
        got: usize,
        /// Kind whose column misreported.
        kind: Id,
    },
    /// Swap-remove operations yielded inconsistent moved-row metadata.
    InconsistentSwapInfo,
    /// No columns were transferred during the move.
    NoComponentsMoved,
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrateError::MissingColumn { kind } => {
                write!(f, "no column backs kind {:#018x}", kind.0)
            }
            MigrateError::RowMisalignment { expected, got, kind } => write!(
                f,
                "kind {:#018x} misaligned during migration: expected row {}, got {}",
                kind.0, expected, got
            ),
            MigrateError::InconsistentSwapInfo => {
                f.write_str("swap-remove produced inconsistent metadata across columns")
            }
            MigrateError::NoComponentsMoved => {
                f.write_str("no columns were moved during archetype migration")
            }
        }
    }
}

impl std::error::Error for MigrateError {}

/// Top-level error for all ECS operations.
///
/// Variants mirror the runtime's failure taxonomy. All are programming
/// errors; callers typically propagate them with `?` and let the tick fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// An operation referenced a value type with no registered component
    /// kind, or an unknown component handle.
    UnregisteredType {
        /// Identity token of the value type involved, if known.
        token: Option<TypeToken>,
    },
    /// A kind was paired with a value type whose identity token differs
    /// from the registered one.
    TypeIdentityMismatch(IdentityMismatchError),
    /// A system's component-handle list disagrees with its declared arity.
    SystemArityMismatch(ArityMismatchError),
    /// An entity handle whose generation does not match the live generation
    /// for its index, or whose index was never allocated.
    UnknownEntity {
        /// The stale or invalid handle.
        entity: Id,
    },
    /// A structural mutation was detected during a system's iterate pass.
    StructuralMutationDuringIteration,
    /// A handle of the wrong kind was passed (e.g. an entity where a
    /// component kind is required).
    WrongHandleKind {
        /// The offending handle.
        id: Id,
        /// Kind the operation required.
        expected: IdKind,
    },
    /// An operation required a component the entity does not carry.
    ComponentNotPresent {
        /// Entity that was addressed.
        entity: Id,
        /// Kind that was absent.
        kind: Id,
    },
    /// The same component kind appeared twice in a system's required list.
    DuplicateRequiredKind {
        /// The repeated kind.
        kind: Id,
    },
    /// A system registration omitted component handles while auto-fill is
    /// disabled on the world.
    AutoFillDisabled,
    /// A handle index space was exhausted.
    IndexSpaceExhausted(CapacityError),
    /// A type-erased column operation failed.
    Column(ColumnError),
    /// An archetype migration violated an internal invariant.
    Migrate(MigrateError),
    /// An internal invariant did not hold.
    Internal(&'static str),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::UnregisteredType { token: Some(token) } => {
                write!(f, "no component kind registered for type token {:#018x}", token.raw())
            }
            EcsError::UnregisteredType { token: None } => {
                f.write_str("component kind is not registered")
            }
            EcsError::TypeIdentityMismatch(e) => write!(f, "{e}"),
            EcsError::SystemArityMismatch(e) => write!(f, "{e}"),
            EcsError::UnknownEntity { entity } => {
                write!(f, "unknown or stale entity handle {:#018x}", entity.0)
            }
            EcsError::StructuralMutationDuringIteration => {
                f.write_str("structural mutation detected during system iteration")
            }
            EcsError::WrongHandleKind { id, expected } => write!(
                f,
                "handle {:#018x} has the wrong kind (expected {})",
                id.0,
                expected.name()
            ),
            EcsError::ComponentNotPresent { entity, kind } => write!(
                f,
                "entity {:#018x} does not carry component kind {:#018x}",
                entity.0, kind.0
            ),
            EcsError::DuplicateRequiredKind { kind } => write!(
                f,
                "component kind {:#018x} appears more than once in a required list",
                kind.0
            ),
            EcsError::AutoFillDisabled => {
                f.write_str("component handles omitted but auto-fill is disabled on this world")
            }
            EcsError::IndexSpaceExhausted(e) => write!(f, "{e}"),
            EcsError::Column(e) => write!(f, "{e}"),
            EcsError::Migrate(e) => write!(f, "{e}"),
            EcsError::Internal(message) => write!(f, "internal invariant violated: {message}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<CapacityError> for EcsError {
    fn from(e: CapacityError) -> Self {
        EcsError::IndexSpaceExhausted(e)
    }
}

impl From<IdentityMismatchError> for EcsError {
    fn from(e: IdentityMismatchError) -> Self {
        EcsError::TypeIdentityMismatch(e)
    }
}

impl From<ArityMismatchError> for EcsError {
    fn from(e: ArityMismatchError) -> Self {
        EcsError::SystemArityMismatch(e)
    }
}

impl From<ColumnError> for EcsError {
    fn from(e: ColumnError) -> Self {
        EcsError::Column(e)
    }
}

impl From<MigrateError> for EcsError {
    fn from(e: MigrateError) -> Self {
        EcsError::Migrate(e)
    }
}

/// Convenience alias for results across the runtime.
pub type EcsResult<T> = Result<T, EcsError>;
