use crate::{Result, Value};
use std::sync::Arc;

/// Forward only reader over one or more tabular result sets.
///
/// Drivers implement it on top of their native statement handles. A new
/// cursor is positioned before the first row of the first result set.
pub trait Cursor {
    /// Number of columns of the current result set.
    fn field_count(&self) -> usize;
    /// Name of the column at `ordinal` (from 0).
    fn field_name(&self, ordinal: usize) -> Result<&str>;
    /// Move to the next row, returns false once the result set is exhausted.
    fn advance_row(&mut self) -> Result<bool>;
    /// Value of the current row at `ordinal`.
    fn value(&self, ordinal: usize) -> Result<Value>;
    /// Whether the current row holds NULL at `ordinal`.
    fn is_null(&self, ordinal: usize) -> Result<bool> {
        self.value(ordinal).map(|v| v.is_null())
    }
    /// Move to the next result set, returns false when there are no more.
    fn next_result_set(&mut self) -> Result<bool>;
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }
    fn field_name(&self, ordinal: usize) -> Result<&str> {
        (**self).field_name(ordinal)
    }
    fn advance_row(&mut self) -> Result<bool> {
        (**self).advance_row()
    }
    fn value(&self, ordinal: usize) -> Result<Value> {
        (**self).value(ordinal)
    }
    fn is_null(&self, ordinal: usize) -> Result<bool> {
        (**self).is_null(ordinal)
    }
    fn next_result_set(&mut self) -> Result<bool> {
        (**self).next_result_set()
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted / affected identifier when available.
    pub last_affected_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;
/// Materialized rows of one result set, shared between the caller and the result cache.
pub type Rows<T> = Arc<[T]>;
