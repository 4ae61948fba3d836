//! # Component Kind Registry
//!
//! This module maps user value types to component-kind handles and exposes
//! the type-erased storage factories used for archetype column allocation.
//!
//! ## Purpose
//! The registry decouples component type information (identity token, name,
//! column factory) from runtime storage, enabling archetypes to hold
//! heterogeneous columns behind `TypeErasedColumn` while the registry vouches
//! for the pairing of kinds and value types.
//!
//! ## Design
//! - Each registration allocates the next component index and returns a
//!   handle tagged [`IdKind::Component`]. Registering the same Rust type
//!   twice yields two distinct kinds; at most one of them is the *type
//!   default* used when a caller omits the kind.
//! - A per-kind factory function constructs empty column storage, so the
//!   store can clone archetype schemata without knowing element types.
//! - The registry is an explicit value owned by the world. There is no
//!   process-wide registry; two worlds never share kind handles.
//!
//! ## Invariants
//! - Kind handles are unique and stable for the lifetime of the registry.
//! - Every registered kind has a descriptor and a storage factory.
//! - `default_by_token` only references registered kinds.

use std::collections::HashMap;

use log::debug;

use crate::engine::error::{CapacityError, EcsError, EcsResult, IdentityMismatchError};
use crate::engine::storage::{Column, TypeErasedColumn};
use crate::engine::types::{make_component, Id, IdKind, TypeToken, INDEX_MASK};

/// Factory function constructing an empty type-erased column.
pub type ColumnFactory = fn() -> Box<dyn TypeErasedColumn>;

fn new_column_storage<T: 'static>() -> Box<dyn TypeErasedColumn> {
    Box::new(Column::<T>::new())
}

/// Controls how a component registration is interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RegisterFlag {
    /// Plain registration; the kind must always be named explicitly.
    #[default]
    None,
    /// Marks the registered kind as the default for its value type. A later
    /// registration carrying this flag re-points the default.
    TypeDefault,
}

/// Describes a registered component kind.
#[derive(Clone, Copy, Debug)]
pub struct ComponentDesc {
    /// Handle assigned to this kind.
    pub kind: Id,
    /// Identity token of the value type.
    pub token: TypeToken,
    /// Rust type name, for diagnostics.
    pub name: &'static str,
    new_column: ColumnFactory,
}

impl ComponentDesc {
    /// Constructs an empty column for this kind's value type.
    #[inline]
    pub fn new_column(&self) -> Box<dyn TypeErasedColumn> {
        (self.new_column)()
    }

    /// Returns `true` if this descriptor refers to type `T`.
    #[inline]
    pub fn matches<T: 'static>(&self) -> bool {
        self.token == TypeToken::of::<T>()
    }
}

/// Mapping between Rust value types and component-kind handles.
///
/// Owned by the world; see the module docs for design notes.
#[derive(Default)]
pub struct ComponentRegistry {
    next_index: u64,
    by_kind: HashMap<Id, ComponentDesc>,
    default_by_token: HashMap<TypeToken, Id>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers value type `T` as a new component kind.
    ///
    /// Allocates the next component index, records `T`'s identity token and
    /// storage factory, and returns the kind handle. With
    /// [`RegisterFlag::TypeDefault`] the kind also becomes the default for
    /// `T`, replacing any previous default.
    ///
    /// ## Errors
    /// Fails only when the 32-bit component index space is exhausted.
    pub fn register<T: 'static>(&mut self, flag: RegisterFlag) -> EcsResult<Id> {
        let index = self.next_index;
        if index > INDEX_MASK {
            return Err(CapacityError {
                needed: index + 1,
                capacity: INDEX_MASK + 1,
            }
            .into());
        }
        self.next_index = index + 1;

        let kind = make_component(index as u32);
        let token = TypeToken::of::<T>();
        let descriptor = ComponentDesc {
            kind,
            token,
            name: std::any::type_name::<T>(),
            new_column: new_column_storage::<T>,
        };
        self.by_kind.insert(kind, descriptor);

        if flag == RegisterFlag::TypeDefault {
            self.default_by_token.insert(token, kind);
        }

        debug!(
            "registered component kind {:#018x} for {} (default: {})",
            kind.0,
            descriptor.name,
            flag == RegisterFlag::TypeDefault
        );
        Ok(kind)
    }

    /// Returns the default kind for type `T`, if one was registered.
    pub fn default_kind_for<T: 'static>(&self) -> Option<Id> {
        self.default_kind_for_token(TypeToken::of::<T>())
    }

    /// Returns the default kind recorded for an identity token.
    pub fn default_kind_for_token(&self, token: TypeToken) -> Option<Id> {
        self.default_by_token.get(&token).copied()
    }

    /// Returns the default kind for `T`, failing if none is registered.
    pub fn require_default_kind<T: 'static>(&self) -> EcsResult<Id> {
        let token = TypeToken::of::<T>();
        self.default_kind_for_token(token)
            .ok_or(EcsError::UnregisteredType { token: Some(token) })
    }

    /// Returns the descriptor for a kind, if registered.
    pub fn describe_kind(&self, kind: Id) -> Option<&ComponentDesc> {
        self.by_kind.get(&kind)
    }

    /// Returns `true` iff `kind` is registered and its recorded identity
    /// token equals `token`.
    pub fn validate(&self, kind: Id, token: TypeToken) -> bool {
        self.by_kind
            .get(&kind)
            .is_some_and(|descriptor| descriptor.token == token)
    }

    /// Resolves a kind handle for use with a value type, enforcing the full
    /// failure taxonomy.
    ///
    /// ## Errors
    /// - `WrongHandleKind` if the handle is not tagged as a component.
    /// - `UnregisteredType` if no registration exists for the handle.
    /// - `TypeIdentityMismatch` if the recorded token differs from `token`.
    pub fn expect_kind(&self, kind: Id, token: TypeToken) -> EcsResult<&ComponentDesc> {
        if kind.kind() != Some(IdKind::Component) {
            return Err(EcsError::WrongHandleKind {
                id: kind,
                expected: IdKind::Component,
            });
        }
        let descriptor = self
            .by_kind
            .get(&kind)
            .ok_or(EcsError::UnregisteredType { token: Some(token) })?;
        if descriptor.token != token {
            return Err(IdentityMismatchError {
                kind,
                registered: descriptor.token,
                presented: token,
            }
            .into());
        }
        Ok(descriptor)
    }

    /// Constructs an empty column for a registered kind.
    pub fn new_column(&self, kind: Id) -> EcsResult<Box<dyn TypeErasedColumn>> {
        let descriptor = self
            .by_kind
            .get(&kind)
            .ok_or(EcsError::UnregisteredType { token: None })?;
        Ok(descriptor.new_column())
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}
