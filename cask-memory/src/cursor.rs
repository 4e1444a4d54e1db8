use crate::ResultSet;
use cask_core::{Cursor, Error, Result, Value};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Forward only cursor over scripted result sets.
#[derive(Debug)]
pub struct MemoryCursor {
    sets: Vec<ResultSet>,
    set: usize,
    row: Option<usize>,
    field_reads: Arc<AtomicUsize>,
}

impl MemoryCursor {
    pub fn new(sets: Vec<ResultSet>) -> Self {
        Self::with_counter(sets, Default::default())
    }

    pub(crate) fn with_counter(sets: Vec<ResultSet>, field_reads: Arc<AtomicUsize>) -> Self {
        Self {
            sets,
            set: 0,
            row: None,
            field_reads,
        }
    }

    fn current(&self) -> Option<&ResultSet> {
        self.sets.get(self.set)
    }
}

impl Cursor for MemoryCursor {
    fn field_count(&self) -> usize {
        self.current().map_or(0, |s| s.columns.len())
    }

    fn field_name(&self, ordinal: usize) -> Result<&str> {
        self.field_reads.fetch_add(1, Ordering::Relaxed);
        self.current()
            .and_then(|s| s.columns.get(ordinal))
            .map(String::as_str)
            .ok_or_else(|| Error::msg(format!("Column ordinal {} is out of range", ordinal)))
    }

    fn advance_row(&mut self) -> Result<bool> {
        let Some(len) = self.current().map(|s| s.rows.len()) else {
            return Ok(false);
        };
        let next = self.row.map_or(0, |r| r + 1).min(len);
        self.row = Some(next);
        Ok(next < len)
    }

    fn value(&self, ordinal: usize) -> Result<Value> {
        let row = self
            .current()
            .zip(self.row)
            .and_then(|(s, r)| s.rows.get(r))
            .ok_or_else(|| Error::msg("The cursor is not positioned on a row"))?;
        row.get(ordinal)
            .cloned()
            .ok_or_else(|| Error::msg(format!("Column ordinal {} is out of range", ordinal)))
    }

    fn next_result_set(&mut self) -> Result<bool> {
        self.set = (self.set + 1).min(self.sets.len());
        self.row = None;
        Ok(self.set < self.sets.len())
    }
}
