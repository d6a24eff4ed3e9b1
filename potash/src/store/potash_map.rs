use crate::common::{Key, Value};
use crate::errors::PotashResult;
use crate::store::{PotashStore, Table, TableRange, WriteBatch};
use std::ops::{Bound, RangeBounds};

/// A handle on one named map of a [PotashStore].
///
/// Reads look at the latest committed state; each write commits a
/// single-operation batch. Writes that must land together go through a
/// [WriteBatch] on the store instead.
#[derive(Clone)]
pub struct PotashMap {
    name: String,
    store: PotashStore,
}

impl PotashMap {
    pub(crate) fn new(name: &str, store: PotashStore) -> Self {
        PotashMap {
            name: name.to_string(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> PotashStore {
        self.store.clone()
    }

    fn table(&self) -> PotashResult<Table> {
        Ok(self.store.snapshot()?.table_or_empty(&self.name))
    }

    pub fn get(&self, key: &Key) -> PotashResult<Option<Value>> {
        Ok(self.store.snapshot()?.get(&self.name, key).cloned())
    }

    pub fn contains_key(&self, key: &Key) -> PotashResult<bool> {
        Ok(self.store.snapshot()?.get(&self.name, key).is_some())
    }

    pub fn put(&self, key: Key, value: Value) -> PotashResult<()> {
        let mut batch = WriteBatch::new();
        batch.put(&self.name, key, value);
        self.store.commit(batch)
    }

    pub fn remove(&self, key: &Key) -> PotashResult<Option<Value>> {
        let existing = self.get(key)?;
        if existing.is_some() {
            let mut batch = WriteBatch::new();
            batch.remove(&self.name, key.clone());
            self.store.commit(batch)?;
        }
        Ok(existing)
    }

    pub fn size(&self) -> PotashResult<u64> {
        Ok(self.table()?.len() as u64)
    }

    pub fn is_empty(&self) -> PotashResult<bool> {
        Ok(self.table()?.is_empty())
    }

    /// Removes every record but keeps the map.
    pub fn clear(&self) -> PotashResult<()> {
        let mut batch = WriteBatch::new();
        batch.drop_map(&self.name);
        batch.create_map(&self.name);
        self.store.commit(batch)
    }

    pub fn first_key(&self) -> PotashResult<Option<Key>> {
        Ok(self.table()?.get_min().map(|(k, _)| k.clone()))
    }

    pub fn last_key(&self) -> PotashResult<Option<Key>> {
        Ok(self.table()?.get_max().map(|(k, _)| k.clone()))
    }

    /// Smallest key strictly greater than `key`.
    pub fn higher_key(&self, key: &Key) -> PotashResult<Option<Key>> {
        let table = self.table()?;
        let result = table
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| k.clone());
        Ok(result)
    }

    /// Smallest key greater than or equal to `key`.
    pub fn ceiling_key(&self, key: &Key) -> PotashResult<Option<Key>> {
        let table = self.table()?;
        let result = table
            .range((Bound::Included(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| k.clone());
        Ok(result)
    }

    /// Largest key strictly less than `key`.
    pub fn lower_key(&self, key: &Key) -> PotashResult<Option<Key>> {
        let table = self.table()?;
        let result = table
            .range((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
            .map(|(k, _)| k.clone());
        Ok(result)
    }

    /// Largest key less than or equal to `key`.
    pub fn floor_key(&self, key: &Key) -> PotashResult<Option<Key>> {
        let table = self.table()?;
        let result = table
            .range((Bound::Unbounded, Bound::Included(key)))
            .next_back()
            .map(|(k, _)| k.clone());
        Ok(result)
    }

    /// Lazily scans the records whose keys fall in `range`, in ascending
    /// key order, as of the moment the scan is created.
    pub fn scan<R: RangeBounds<Key>>(&self, range: R) -> PotashResult<TableRange> {
        Ok(TableRange::new(
            self.table()?,
            range.start_bound().cloned(),
            range.end_bound().cloned(),
        ))
    }

    pub fn entries(&self) -> PotashResult<TableRange> {
        Ok(TableRange::full(self.table()?))
    }

    pub fn keys(&self) -> PotashResult<impl Iterator<Item = Key>> {
        Ok(self.entries()?.map(|(k, _)| k))
    }

    pub fn values(&self) -> PotashResult<impl Iterator<Item = Value>> {
        Ok(self.entries()?.map(|(_, v)| v))
    }
}
