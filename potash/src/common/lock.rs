use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A shareable handle to one named reader-writer lock of a [LockRegistry].
#[derive(Clone)]
pub struct LockHandle {
    lock: Arc<RwLock<()>>,
}

impl LockHandle {
    pub fn new() -> Self {
        LockHandle {
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }
}

impl Default for LockHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-collection locks shared by every handle of one database.
///
/// Collection writers take the write lock of their collection name, and
/// transaction commits take the write locks of every collection they touch.
#[derive(Clone)]
pub struct LockRegistry {
    locks: Arc<RwLock<HashMap<String, LockHandle>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get_lock(&self, name: &str) -> LockHandle {
        if let Some(handle) = self.locks.read().get(name) {
            return handle.clone();
        }

        let mut locks = self.locks.write();
        locks
            .entry(name.to_string())
            .or_insert_with(LockHandle::new)
            .clone()
    }

    /// Returns handles for all `names` in ascending name order with duplicates
    /// removed. Acquiring them in this order cannot deadlock against another
    /// caller doing the same.
    pub fn get_ordered_locks<'a, I>(&self, names: I) -> Vec<LockHandle>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut names: Vec<&String> = names.into_iter().collect();
        names.sort();
        names.dedup();
        names.into_iter().map(|name| self.get_lock(name)).collect()
    }

    pub fn remove_lock(&self, name: &str) -> bool {
        self.locks.write().remove(name).is_some()
    }

    pub fn lock_count(&self) -> usize {
        self.locks.read().len()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
