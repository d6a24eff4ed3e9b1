use crate::collection::PotashId;
use crate::common::{FieldValues, Value};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::{Filter, IndexScan};
use crate::index::IndexDescriptor;
use crate::store::{StagedWrite, StoreSnapshot, TableRange};

/// Ordered value index stored in one store map.
///
/// Each key is an indexed value (or the array of values of a compound
/// index) and maps to an `Array` of the ids holding it. Ids are generated
/// in increasing order, so keeping the list sorted keeps it in insertion
/// order.
pub(crate) struct SimpleIndex {
    descriptor: IndexDescriptor,
    unique: bool,
}

impl SimpleIndex {
    pub(crate) fn new(descriptor: &IndexDescriptor, unique: bool) -> Self {
        SimpleIndex {
            descriptor: descriptor.clone(),
            unique,
        }
    }

    pub(crate) fn write(&self, staged: &mut StagedWrite, field_values: &FieldValues) -> PotashResult<()> {
        let map_name = self.descriptor.index_map_name();
        let key = field_values.index_key();
        let id = Value::PotashId(field_values.id());

        let mut ids = self.id_list(staged.get(&map_name, &key))?;
        let position = match ids.binary_search(&id) {
            Ok(_) => return Ok(()),
            Err(position) => position,
        };

        if self.unique && !ids.is_empty() && !field_values.all_null() {
            log::error!(
                "Unique constraint violated on {} for value {}",
                self.descriptor,
                key
            );
            return Err(PotashError::new(
                &format!(
                    "Unique constraint violated on {} for value {}",
                    self.descriptor.index_fields(),
                    key
                ),
                ErrorKind::UniqueConstraintViolation,
            ));
        }

        ids.insert(position, id);
        staged.put(&map_name, key, Value::Array(ids));
        Ok(())
    }

    pub(crate) fn remove(&self, staged: &mut StagedWrite, field_values: &FieldValues) -> PotashResult<()> {
        let map_name = self.descriptor.index_map_name();
        let key = field_values.index_key();
        let id = Value::PotashId(field_values.id());

        let mut ids = self.id_list(staged.get(&map_name, &key))?;
        if let Ok(position) = ids.binary_search(&id) {
            ids.remove(position);
            if ids.is_empty() {
                staged.remove(&map_name, key);
            } else {
                staged.put(&map_name, key, Value::Array(ids));
            }
        }
        Ok(())
    }

    pub(crate) fn drop_index(&self, staged: &mut StagedWrite) {
        staged.drop_map(&self.descriptor.index_map_name());
    }

    pub(crate) fn find(&self, snapshot: &StoreSnapshot, filter: &Filter) -> PotashResult<Option<Vec<PotashId>>> {
        let scan = match self.scan_for(filter) {
            Some(scan) => scan,
            None => return Ok(None),
        };

        let table = match snapshot.table(&self.descriptor.index_map_name()) {
            Some(table) => table.clone(),
            None => return Ok(Some(Vec::new())),
        };

        let mut result = Vec::new();
        match scan {
            IndexScan::Equals(value) => {
                self.collect_ids(table.get(&value), &mut result)?;
            }
            IndexScan::In(mut values) => {
                values.sort();
                values.dedup();
                for value in &values {
                    self.collect_ids(table.get(value), &mut result)?;
                }
            }
            IndexScan::Range { lower, upper } => {
                for (_, ids) in TableRange::new(table, lower, upper) {
                    self.collect_ids(Some(&ids), &mut result)?;
                }
            }
        }
        Ok(Some(result))
    }

    /// The scan `filter` allows on this index. A compound index needs an
    /// equality on each of its fields.
    fn scan_for(&self, filter: &Filter) -> Option<IndexScan> {
        let fields = self.descriptor.index_fields();
        if !fields.is_compound() {
            return match filter.field_name() {
                Some(name) if name == fields.first_field() => filter.index_scan(),
                _ => None,
            };
        }

        let conjuncts = filter.conjuncts()?;
        let mut values = Vec::with_capacity(fields.field_names().len());
        for field_name in fields.field_names() {
            let value = conjuncts.iter().find_map(|conjunct| {
                if conjunct.field_name() != Some(field_name.as_str()) {
                    return None;
                }
                match conjunct.index_scan() {
                    Some(IndexScan::Equals(value)) => Some(value),
                    _ => None,
                }
            })?;
            values.push(value);
        }
        Some(IndexScan::Equals(Value::Array(values)))
    }

    fn id_list(&self, entry: Option<&Value>) -> PotashResult<Vec<Value>> {
        match entry {
            None => Ok(Vec::new()),
            Some(Value::Array(ids)) => Ok(ids.clone()),
            Some(other) => {
                log::error!(
                    "Index entry of {} is a {}, expected an array",
                    self.descriptor,
                    other.type_name()
                );
                Err(PotashError::new(
                    "Index entry is not an array",
                    ErrorKind::Corruption,
                ))
            }
        }
    }

    fn collect_ids(&self, entry: Option<&Value>, result: &mut Vec<PotashId>) -> PotashResult<()> {
        for value in self.id_list(entry)? {
            match value {
                Value::PotashId(id) => result.push(id),
                other => {
                    log::error!("Index {} holds a non-id value {}", self.descriptor, other);
                    return Err(PotashError::new(
                        "Index entry holds a non-id value",
                        ErrorKind::Corruption,
                    ));
                }
            }
        }
        Ok(())
    }
}
