use crate::common::{
    Value, COLLECTION_CATALOG, KEY_OBJ_SEPARATOR, TAG_COLLECTION, TAG_KEYED_REPOSITORY, TAG_REPOSITORY,
};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::store::{PotashMap, StagedWrite};
use std::collections::{BTreeMap, BTreeSet};

/// Registry of the collections and repositories a store holds.
///
/// Entries are keyed by `[tag, name]` so each kind lists in name order.
#[derive(Clone)]
pub struct StoreCatalog {
    catalog_map: PotashMap,
}

pub(crate) fn catalog_key(tag: &str, name: &str) -> Value {
    Value::Array(vec![Value::from(tag), Value::from(name)])
}

impl StoreCatalog {
    pub(crate) fn new(catalog_map: PotashMap) -> Self {
        StoreCatalog { catalog_map }
    }

    /// Stages the catalog entry for `name` into `staged`.
    pub(crate) fn stage_entry(staged: &mut StagedWrite, tag: &str, name: &str) -> PotashResult<()> {
        if name.is_empty() {
            log::error!("Catalog entry name cannot be empty");
            return Err(PotashError::new(
                "Catalog entry name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        staged.put(
            COLLECTION_CATALOG,
            catalog_key(tag, name),
            Value::Bool(true),
        );
        Ok(())
    }

    pub(crate) fn stage_removal(staged: &mut StagedWrite, name: &str) {
        for tag in [TAG_COLLECTION, TAG_REPOSITORY, TAG_KEYED_REPOSITORY] {
            staged.remove(COLLECTION_CATALOG, catalog_key(tag, name));
        }
    }

    pub fn has_entry(&self, name: &str) -> PotashResult<bool> {
        for tag in [TAG_COLLECTION, TAG_REPOSITORY, TAG_KEYED_REPOSITORY] {
            if self.catalog_map.contains_key(&catalog_key(tag, name))? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn names_with_tag(&self, tag: &str) -> PotashResult<BTreeSet<String>> {
        let lower = Value::Array(vec![Value::from(tag)]);
        let mut names = BTreeSet::new();
        for (key, _) in self.catalog_map.scan(lower..)? {
            let parts = match key.as_array() {
                Some(parts) if parts.len() == 2 => parts,
                _ => {
                    log::error!("Invalid catalog key {}", key);
                    return Err(PotashError::new("Invalid catalog key", ErrorKind::Corruption));
                }
            };
            if parts[0].as_str() != Some(tag) {
                break;
            }
            if let Some(name) = parts[1].as_str() {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }

    pub fn collection_names(&self) -> PotashResult<BTreeSet<String>> {
        self.names_with_tag(TAG_COLLECTION)
    }

    pub fn repository_names(&self) -> PotashResult<BTreeSet<String>> {
        self.names_with_tag(TAG_REPOSITORY)
    }

    /// Keyed repositories grouped by key, e.g. `{"eu": {"Order"}}` for the
    /// collection `Order+eu`.
    pub fn keyed_repository_names(&self) -> PotashResult<BTreeMap<String, BTreeSet<String>>> {
        let mut result: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for name in self.names_with_tag(TAG_KEYED_REPOSITORY)? {
            if let Some((entity, key)) = name.split_once(KEY_OBJ_SEPARATOR) {
                result.entry(key.to_string()).or_default().insert(entity.to_string());
            }
        }
        Ok(result)
    }
}
