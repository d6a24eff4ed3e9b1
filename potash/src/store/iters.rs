use crate::common::{Key, Value};
use crate::store::Table;
use std::ops::Bound;

/// A lazy, restartable scan over one table.
///
/// The scan owns the table it was created from, so mutations committed
/// after it started are never observed. Each step re-seeks past the last
/// returned key.
#[derive(Clone)]
pub struct TableRange {
    table: Table,
    start: Bound<Key>,
    lower: Bound<Key>,
    upper: Bound<Key>,
}

impl TableRange {
    pub fn new(table: Table, lower: Bound<Key>, upper: Bound<Key>) -> Self {
        TableRange {
            table,
            start: lower.clone(),
            lower,
            upper,
        }
    }

    pub fn full(table: Table) -> Self {
        TableRange::new(table, Bound::Unbounded, Bound::Unbounded)
    }

    /// Restarts the scan from its original lower bound.
    pub fn reset(&mut self) {
        self.lower = self.start.clone();
    }

    fn is_empty_range(&self) -> bool {
        let (lo, lo_inclusive) = match &self.lower {
            Bound::Included(k) => (k, true),
            Bound::Excluded(k) => (k, false),
            Bound::Unbounded => return false,
        };
        let (hi, hi_inclusive) = match &self.upper {
            Bound::Included(k) => (k, true),
            Bound::Excluded(k) => (k, false),
            Bound::Unbounded => return false,
        };
        lo > hi || (lo == hi && !(lo_inclusive && hi_inclusive))
    }
}

impl Iterator for TableRange {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty_range() {
            return None;
        }

        let (key, value) = self
            .table
            .range((self.lower.clone(), self.upper.clone()))
            .next()
            .map(|(k, v)| (k.clone(), v.clone()))?;
        self.lower = Bound::Excluded(key.clone());
        Some((key, value))
    }
}
