use std::any::{type_name, Any, TypeId};

use crate::engine::error::{ColumnError, RowOutOfBoundsError, TypeMismatchError};

/// Type-erased view of a single component column.
///
/// Structural operations (push, swap-remove, row move, empty-peer cloning)
/// go through this v-table; typed access re-enters via `as_any_mut` and a
/// registry-validated downcast performed once per archetype visit, never per
/// row.
pub trait TypeErasedColumn: Any {
    /// Number of rows currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the column holds no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// `TypeId` of the element type.
    fn element_type_id(&self) -> TypeId;

    /// Name of the element type, for diagnostics.
    fn element_type_name(&self) -> &'static str;

    /// Creates an empty column of the same element type.
    fn clone_empty(&self) -> Box<dyn TypeErasedColumn>;

    /// Appends a boxed value, returning the row it landed in.
    fn push_dyn(&mut self, value: Box<dyn Any>) -> Result<usize, ColumnError>;

    /// Removes `row` by swapping the last row into its place.
    ///
    /// Returns the former index of the row that now occupies `row`, or
    /// `None` if the removed row was the last one.
    fn swap_remove(&mut self, row: usize) -> Result<Option<usize>, ColumnError>;

    /// Moves `row` by value into `destination`, compacting this column with
    /// the same swap-remove discipline.
    ///
    /// Returns `(destination row, moved-from)` where `moved-from` is the
    /// former index of the row swapped into the vacated slot, if any. Both
    /// columns must share one element type; a mismatch is an error and a
    /// debug-build panic.
    fn move_row_to(
        &mut self,
        destination: &mut dyn TypeErasedColumn,
        row: usize,
    ) -> Result<(usize, Option<usize>), ColumnError>;
}

/// Owned, contiguous storage for values of one component kind.
pub struct Column<T> {
    data: Vec<T>,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T: 'static> Column<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) -> usize {
        self.data.push(value);
        self.data.len() - 1
    }

    pub fn get(&self, row: usize) -> Option<&T> {
        self.data.get(row)
    }

    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.data.get_mut(row)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn check_row(&self, row: usize) -> Result<(), ColumnError> {
        if row >= self.data.len() {
            return Err(RowOutOfBoundsError { row, len: self.data.len() }.into());
        }
        Ok(())
    }
}

impl<T: 'static> TypeErasedColumn for Column<T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn clone_empty(&self) -> Box<dyn TypeErasedColumn> {
        Box::new(Column::<T>::new())
    }

    fn push_dyn(&mut self, value: Box<dyn Any>) -> Result<usize, ColumnError> {
        match value.downcast::<T>() {
            Ok(value) => Ok(self.push(*value)),
            Err(value) => {
                let mismatch = TypeMismatchError {
                    expected: TypeId::of::<T>(),
                    actual: value.as_ref().type_id(),
                };
                debug_assert!(false, "cross-type column push: {mismatch}");
                Err(mismatch.into())
            }
        }
    }

    fn swap_remove(&mut self, row: usize) -> Result<Option<usize>, ColumnError> {
        self.check_row(row)?;
        let last = self.data.len() - 1;
        self.data.swap_remove(row);
        Ok((row != last).then_some(last))
    }

    fn move_row_to(
        &mut self,
        destination: &mut dyn TypeErasedColumn,
        row: usize,
    ) -> Result<(usize, Option<usize>), ColumnError> {
        self.check_row(row)?;
        let destination_type = destination.element_type_id();
        let destination = match destination.as_any_mut().downcast_mut::<Column<T>>() {
            Some(destination) => destination,
            None => {
                let mismatch = TypeMismatchError {
                    expected: TypeId::of::<T>(),
                    actual: destination_type,
                };
                debug_assert!(false, "cross-type column move: {mismatch}");
                return Err(mismatch.into());
            }
        };

        let last = self.data.len() - 1;
        let value = self.data.swap_remove(row);
        let new_row = destination.push(value);
        Ok((new_row, (row != last).then_some(last)))
    }
}
