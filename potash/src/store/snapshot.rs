use crate::common::{Key, Value};
use crate::store::{BatchOp, WriteBatch};
use im::OrdMap;

/// Records of one named map, ordered by key.
pub type Table = OrdMap<Key, Value>;

/// An immutable view of every map of a store.
///
/// Built on persistent maps: cloning a snapshot is O(1) and applying a
/// batch to a clone never affects the original.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct StoreSnapshot {
    tables: OrdMap<String, Table>,
}

impl StoreSnapshot {
    pub fn new() -> Self {
        StoreSnapshot { tables: OrdMap::new() }
    }

    pub fn has_map(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// The table of `name`, or an empty one when the map does not exist.
    pub fn table_or_empty(&self, name: &str) -> Table {
        self.tables.get(name).cloned().unwrap_or_default()
    }

    pub fn get(&self, map: &str, key: &Key) -> Option<&Value> {
        self.tables.get(map).and_then(|table| table.get(key))
    }

    pub fn map_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn map_count(&self) -> usize {
        self.tables.len()
    }

    pub fn apply(&mut self, batch: &WriteBatch) {
        for op in batch.ops() {
            self.apply_op(op);
        }
    }

    pub fn apply_op(&mut self, op: &BatchOp) {
        match op {
            BatchOp::CreateMap { map } => {
                if !self.tables.contains_key(map.as_str()) {
                    self.tables.insert(map.clone(), Table::new());
                }
            }
            BatchOp::DropMap { map } => {
                self.tables.remove(map.as_str());
            }
            BatchOp::Put { map, key, value } => match self.tables.get_mut(map.as_str()) {
                Some(table) => {
                    table.insert(key.clone(), value.clone());
                }
                None => {
                    let mut table = Table::new();
                    table.insert(key.clone(), value.clone());
                    self.tables.insert(map.clone(), table);
                }
            },
            BatchOp::Remove { map, key } => {
                if let Some(table) = self.tables.get_mut(map.as_str()) {
                    table.remove(key);
                }
            }
        }
    }

    /// Re-encodes the whole snapshot as one batch that rebuilds it from an
    /// empty store.
    pub fn to_batch(&self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for (name, table) in self.tables.iter() {
            batch.create_map(name);
            for (key, value) in table.iter() {
                batch.put(name, key.clone(), value.clone());
            }
        }
        batch
    }
}
