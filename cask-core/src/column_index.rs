use crate::{Cursor, Result};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Bidirectional column name / ordinal map of one cursor shape.
///
/// Built lazily with a single scan of the cursor's fields the first time it
/// is needed. Later cursors are only checked to carry the same column names
/// in the same order, lookups are then hash map accesses. Any other shape
/// rebuilds the index.
///
/// Cloning produces an independent index seeded with the same mapping.
#[derive(Default)]
pub struct ColumnIndex {
    table: RwLock<Option<Arc<ColumnTable>>>,
}

#[derive(Debug, PartialEq, Eq)]
struct ColumnTable {
    names: Box<[Arc<str>]>,
    exact: HashMap<Arc<str>, usize>,
    folded: HashMap<String, usize>,
}

impl ColumnTable {
    fn scan(cursor: &dyn Cursor) -> Result<Self> {
        let count = cursor.field_count();
        let names = (0..count)
            .map(|i| cursor.field_name(i).map(Arc::<str>::from))
            .collect::<Result<Box<[_]>>>()?;
        log::trace!("Scanned {} columns: {:?}", count, names);
        Ok(Self::from_names(names))
    }

    fn from_names(names: Box<[Arc<str>]>) -> Self {
        let mut exact = HashMap::with_capacity(names.len());
        let mut folded = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            exact.entry(name.clone()).or_insert(i);
            folded.entry(name.to_ascii_lowercase()).or_insert(i);
        }
        Self {
            names,
            exact,
            folded,
        }
    }

    /// Whether `cursor` has exactly the columns this table was built from.
    fn matches(&self, cursor: &dyn Cursor) -> Result<bool> {
        if self.names.len() != cursor.field_count() {
            return Ok(false);
        }
        for (i, name) in self.names.iter().enumerate() {
            if **name != *cursor.field_name(i)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn ordinal(&self, name: &str) -> Option<usize> {
        self.exact
            .get(name)
            .or_else(|| self.folded.get(&name.to_ascii_lowercase()))
            .copied()
    }
}

impl ColumnIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index seeded from a snapshot previously returned by [`ColumnIndex::export`].
    pub fn from_export(export: &HashMap<String, usize>) -> Self {
        let len = export.values().max().map_or(0, |v| v + 1);
        let mut names: Box<[Arc<str>]> = (0..len).map(|_| Arc::<str>::from("")).collect();
        for (name, &ordinal) in export {
            names[ordinal] = name.as_str().into();
        }
        Self {
            table: RwLock::new(Some(Arc::new(ColumnTable::from_names(names)))),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.table.read().is_some()
    }

    /// Number of columns of the shape this index was built for.
    pub fn len(&self) -> usize {
        self.table.read().as_ref().map_or(0, |t| t.names.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordinal of the column `name`, `None` when the cursor has no such column.
    pub fn ordinal(&self, cursor: &dyn Cursor, name: &str) -> Result<Option<usize>> {
        Ok(self.resolve(cursor)?.ordinal(name))
    }

    /// Name of the column at `ordinal`, `None` when out of range.
    pub fn name(&self, cursor: &dyn Cursor, ordinal: usize) -> Result<Option<Arc<str>>> {
        Ok(self.resolve(cursor)?.names.get(ordinal).cloned())
    }

    /// Resolve many names at once, taking the lock a single time.
    pub fn ordinals<'n>(
        &self,
        cursor: &dyn Cursor,
        names: impl IntoIterator<Item = &'n str>,
    ) -> Result<Vec<Option<usize>>> {
        let table = self.resolve(cursor)?;
        Ok(names.into_iter().map(|n| table.ordinal(n)).collect())
    }

    /// Snapshot of the name to ordinal mapping (empty when not yet initialized).
    pub fn export(&self) -> HashMap<String, usize> {
        self.table
            .read()
            .as_ref()
            .map(|t| {
                t.exact
                    .iter()
                    .map(|(name, &i)| (name.to_string(), i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Replace the current state with the one of `other`.
    pub fn update(&self, other: &ColumnIndex) {
        let table = other.table.read().clone();
        *self.table.write() = table;
    }

    pub fn clear(&self) {
        *self.table.write() = None;
    }

    fn resolve(&self, cursor: &dyn Cursor) -> Result<Arc<ColumnTable>> {
        let retained = self.table.read().clone();
        if let Some(table) = retained {
            if table.matches(cursor)? {
                return Ok(table);
            }
            log::warn!(
                "Column index built for {:?} does not match the cursor columns, rebuilding it",
                table.names
            );
        }
        let scanned = Arc::new(ColumnTable::scan(cursor)?);
        let mut guard = self.table.write();
        match guard.as_ref() {
            // Another caller finished the same scan first
            Some(current) if **current == *scanned => Ok(current.clone()),
            _ => {
                *guard = Some(scanned.clone());
                Ok(scanned)
            }
        }
    }
}

impl Clone for ColumnIndex {
    fn clone(&self) -> Self {
        Self {
            table: RwLock::new(self.table.read().clone()),
        }
    }
}

impl std::fmt::Debug for ColumnIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.table.read().as_ref() {
            Some(table) => f.debug_tuple("ColumnIndex").field(&table.names).finish(),
            None => f.write_str("ColumnIndex(uninitialized)"),
        }
    }
}
