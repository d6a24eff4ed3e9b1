use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::store::{StoreSnapshot, WriteBatch};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// The live tables of a store held in memory.
///
/// Readers clone the current snapshot under a short read lock; a commit
/// swaps in the updated tables under the write lock, so a batch is either
/// fully visible or not at all.
pub struct MemTable {
    current: RwLock<StoreSnapshot>,
    closed: AtomicBool,
}

impl MemTable {
    pub fn new() -> Self {
        MemTable {
            current: RwLock::new(StoreSnapshot::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        MemTable {
            current: RwLock::new(snapshot),
            closed: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> PotashResult<StoreSnapshot> {
        self.ensure_open()?;
        Ok(self.current.read().clone())
    }

    pub fn apply(&self, batch: &WriteBatch) -> PotashResult<()> {
        self.ensure_open()?;
        let mut current = self.current.write();
        let mut next = current.clone();
        next.apply(batch);
        *current = next;
        Ok(())
    }

    pub fn replace(&self, snapshot: StoreSnapshot) -> PotashResult<()> {
        self.ensure_open()?;
        *self.current.write() = snapshot;
        Ok(())
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn ensure_open(&self) -> PotashResult<()> {
        if self.is_closed() {
            log::error!("Store is closed");
            return Err(PotashError::new("Store is closed", ErrorKind::StoreClosed));
        }
        Ok(())
    }
}

impl Default for MemTable {
    fn default() -> Self {
        MemTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::val;

    #[test]
    fn test_apply_and_snapshot() {
        let table = MemTable::new();
        let before = table.snapshot().unwrap();

        let mut batch = WriteBatch::new();
        batch.put("m", val!(1), val!(1));
        table.apply(&batch).unwrap();

        assert!(!before.has_map("m"));
        assert!(table.snapshot().unwrap().has_map("m"));
    }

    #[test]
    fn test_closed_table_rejects_access() {
        let table = MemTable::new();
        table.close();
        assert!(table.is_closed());
        assert_eq!(table.snapshot().unwrap_err().kind(), &ErrorKind::StoreClosed);
        assert_eq!(
            table.apply(&WriteBatch::new()).unwrap_err().kind(),
            &ErrorKind::StoreClosed
        );
    }
}
