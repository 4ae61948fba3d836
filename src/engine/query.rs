//! Typed column views over archetype storage.
//!
//! A system's iterate pass needs one mutable, row-aligned view per required
//! component kind. Rust cannot hand out several `&mut` borrows of one
//! archetype through safe indexing, so views are built once per archetype
//! from raw column pointers and then used for plain indexed access.
//!
//! ## Safety model
//! * Every view construction checks that the required kinds are pairwise
//!   distinct, so the underlying columns never alias.
//! * A view borrows the archetype mutably for its whole lifetime; no
//!   structural mutation can occur while views are live.
//! * Views expose only `len` and indexed access, never push or remove:
//!   mid-iteration structural mutation would break row alignment across
//!   columns.
//!
//! View extraction resolves the required-kind list left to right by index,
//! pairing `kinds[i]` with the i-th value type of the tuple.

use std::marker::PhantomData;

use crate::engine::archetype::Archetype;
use crate::engine::error::{EcsError, EcsResult};
use crate::engine::types::Id;

/// Contiguous, row-aligned mutable view of one component column.
///
/// Indexed access only; the view cannot grow or shrink its column.
pub struct ColumnView<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> ColumnView<'a, T> {
    /// Number of rows in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the view covers no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shared access to the value at `row`.
    ///
    /// ## Panics
    /// Panics if `row` is out of bounds.
    #[inline]
    pub fn get(&self, row: usize) -> &T {
        assert!(row < self.len, "view row {row} out of bounds ({})", self.len);
        unsafe { &*self.ptr.add(row) }
    }

    /// Exclusive access to the value at `row`.
    ///
    /// ## Panics
    /// Panics if `row` is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, row: usize) -> &mut T {
        assert!(row < self.len, "view row {row} out of bounds ({})", self.len);
        unsafe { &mut *self.ptr.add(row) }
    }
}

fn check_distinct(kinds: &[Id]) -> EcsResult<()> {
    for (position, &kind) in kinds.iter().enumerate() {
        if kinds[..position].contains(&kind) {
            return Err(EcsError::DuplicateRequiredKind { kind });
        }
    }
    Ok(())
}

macro_rules! column_views_fn {
    ($(#[$meta:meta])* $name:ident, $count:literal, $(($T:ident, $idx:tt)),+) => {
        $(#[$meta])*
        pub fn $name<'a, $($T: 'static),+>(
            archetype: &'a mut Archetype,
            kinds: &[Id; $count],
        ) -> EcsResult<($(ColumnView<'a, $T>,)+)> {
            check_distinct(kinds)?;
            let raw = ($(archetype.column_ptr::<$T>(kinds[$idx])?,)+);
            let views = ($(ColumnView::<'a, $T> {
                ptr: raw.$idx.0,
                len: raw.$idx.1,
                _marker: PhantomData,
            },)+);
            debug_assert!(
                [$(views.$idx.len()),+].windows(2).all(|pair| pair[0] == pair[1]),
                "column views diverged in length"
            );
            Ok(views)
        }
    };
}

column_views_fn!(
    /// Row-aligned views for one required kind.
    column_views1, 1, (T1, 0)
);
column_views_fn!(
    /// Row-aligned views for two required kinds.
    column_views2, 2, (T1, 0), (T2, 1)
);
column_views_fn!(
    /// Row-aligned views for three required kinds.
    column_views3, 3, (T1, 0), (T2, 1), (T3, 2)
);
column_views_fn!(
    /// Row-aligned views for four required kinds.
    column_views4, 4, (T1, 0), (T2, 1), (T3, 2), (T4, 3)
);
column_views_fn!(
    /// Row-aligned views for five required kinds.
    column_views5, 5, (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4)
);
column_views_fn!(
    /// Row-aligned views for six required kinds.
    column_views6, 6, (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4), (T6, 5)
);
column_views_fn!(
    /// Row-aligned views for seven required kinds.
    column_views7, 7, (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4), (T6, 5), (T7, 6)
);
column_views_fn!(
    /// Row-aligned views for eight required kinds.
    column_views8, 8, (T1, 0), (T2, 1), (T3, 2), (T4, 3), (T5, 4), (T6, 5), (T7, 6), (T8, 7)
);
