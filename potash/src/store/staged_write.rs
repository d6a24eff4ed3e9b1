use crate::common::{Key, Value};
use crate::store::{StoreSnapshot, Table, WriteBatch};

/// Writes collected for one atomic commit, readable before they land.
///
/// Every mutation is applied to a private copy of the snapshot it was
/// started from and recorded in a [WriteBatch], so checks made halfway
/// through a write (unique constraints, existing documents) see the
/// earlier steps of the same write.
pub struct StagedWrite {
    view: StoreSnapshot,
    batch: WriteBatch,
}

impl StagedWrite {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        StagedWrite {
            view: snapshot,
            batch: WriteBatch::new(),
        }
    }

    pub fn view(&self) -> &StoreSnapshot {
        &self.view
    }

    pub fn get(&self, map: &str, key: &Key) -> Option<&Value> {
        self.view.get(map, key)
    }

    pub fn table(&self, map: &str) -> Table {
        self.view.table_or_empty(map)
    }

    pub fn has_map(&self, map: &str) -> bool {
        self.view.has_map(map)
    }

    pub fn put(&mut self, map: &str, key: Key, value: Value) {
        self.batch.put(map, key, value);
        self.apply_last();
    }

    pub fn remove(&mut self, map: &str, key: Key) {
        self.batch.remove(map, key);
        self.apply_last();
    }

    pub fn create_map(&mut self, map: &str) {
        self.batch.create_map(map);
        self.apply_last();
    }

    pub fn drop_map(&mut self, map: &str) {
        self.batch.drop_map(map);
        self.apply_last();
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }

    fn apply_last(&mut self) {
        if let Some(op) = self.batch.ops().last() {
            self.view.apply_op(op);
        }
    }
}
