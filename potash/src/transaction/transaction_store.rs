use crate::common::{
    Key, LockRegistry, PotashPlugin, PotashPluginProvider, COLLECTION_CATALOG, INTERNAL_NAME_SEPARATOR,
    META_MAP_NAME,
};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::index::IndexDescriptor;
use crate::potash_config::PotashConfig;
use crate::store::{BatchOp, PotashStore, PotashStoreProvider, StoreConfig, StoreSnapshot, WriteBatch};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Private store of one transaction.
///
/// On first use it captures a snapshot of the primary store; afterwards all
/// reads and writes go to a private copy of that snapshot. Each write is
/// recorded per map and key so [TransactionStore::commit_to_primary] can
/// verify and replay the net changes.
#[derive(Clone)]
pub(crate) struct TransactionStore {
    inner: Arc<TransactionStoreInner>,
}

struct TransactionStoreInner {
    primary: PotashStore,
    view: Mutex<Option<TransactionView>>,
    closed: AtomicBool,
}

struct TransactionView {
    base: StoreSnapshot,
    working: StoreSnapshot,
    touched: BTreeMap<String, MapChanges>,
}

#[derive(Default)]
struct MapChanges {
    replaced: bool,
    keys: BTreeSet<Key>,
}

impl TransactionStore {
    pub(crate) fn new(primary: PotashStore) -> Self {
        TransactionStore {
            inner: Arc::new(TransactionStoreInner {
                primary,
                view: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Whether the snapshot has been captured.
    pub(crate) fn is_started(&self) -> bool {
        self.inner.view.lock().is_some()
    }

    pub(crate) fn has_changes(&self) -> bool {
        self.inner
            .view
            .lock()
            .as_ref()
            .is_some_and(|view| !view.touched.is_empty())
    }

    /// Discards the private view; every later operation fails.
    pub(crate) fn discard(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.view.lock().take();
    }

    /// Applies the net changes of the transaction to the primary store in
    /// one batch.
    ///
    /// Takes the write locks of every collection touched, in name order, then
    /// checks that each changed record still holds the value it had in the
    /// transaction snapshot and that the index catalog of every touched
    /// collection is unchanged.
    ///
    /// # Errors
    /// `TransactionConflict` when another writer changed one of those
    /// records or created or dropped an index on a touched collection; the
    /// primary store is left untouched.
    pub(crate) fn commit_to_primary(&self, lock_registry: &LockRegistry) -> PotashResult<()> {
        self.ensure_open()?;
        let view = self.inner.view.lock();
        let view = match view.as_ref() {
            Some(view) if !view.touched.is_empty() => view,
            _ => return Ok(()),
        };

        let owners = owner_collections(&view.touched);
        let handles = lock_registry.get_ordered_locks(owners.iter());
        let _guards: Vec<_> = handles.iter().map(|handle| handle.write()).collect();

        let live = self.inner.primary.snapshot()?;
        for owner in &owners {
            let catalog = IndexDescriptor::catalog_map_name(owner);
            if live.table(&catalog) != view.base.table(&catalog) {
                return Err(conflict(&catalog));
            }
        }

        let mut batch = WriteBatch::new();
        for (map, changes) in &view.touched {
            if changes.replaced {
                if live.table(map) != view.base.table(map) {
                    return Err(conflict(map));
                }
                batch.drop_map(map);
                if let Some(table) = view.working.table(map) {
                    batch.create_map(map);
                    for (key, value) in table.iter() {
                        batch.put(map, key.clone(), value.clone());
                    }
                }
                continue;
            }

            if view.base.has_map(map) && !live.has_map(map) {
                return Err(conflict(map));
            }
            if view.working.has_map(map) && !view.base.has_map(map) {
                batch.create_map(map);
            }

            for key in &changes.keys {
                let before = view.base.get(map, key);
                if live.get(map, key) != before {
                    return Err(conflict(map));
                }
                match view.working.get(map, key) {
                    Some(after) if before != Some(after) => batch.put(map, key.clone(), after.clone()),
                    None if before.is_some() => batch.remove(map, key.clone()),
                    _ => {}
                }
            }
        }

        if !batch.is_empty() {
            log::debug!("Committing {} transactional changes", batch.len());
            self.inner.primary.commit(batch)?;
        }
        Ok(())
    }

    fn ensure_open(&self) -> PotashResult<()> {
        if self.inner.closed.load(Ordering::Acquire) {
            log::error!("Transaction is closed");
            return Err(PotashError::new("Transaction is closed", ErrorKind::StoreClosed));
        }
        Ok(())
    }

    fn with_view<R>(&self, f: impl FnOnce(&mut TransactionView) -> R) -> PotashResult<R> {
        self.ensure_open()?;
        let mut view = self.inner.view.lock();
        if view.is_none() {
            let base = self.inner.primary.snapshot()?;
            *view = Some(TransactionView {
                working: base.clone(),
                base,
                touched: BTreeMap::new(),
            });
        }

        match view.as_mut() {
            Some(view) => Ok(f(view)),
            None => Err(PotashError::new("Transaction view is missing", ErrorKind::InternalError)),
        }
    }
}

fn conflict(map: &str) -> PotashError {
    log::error!("Transaction conflict on {}", map);
    PotashError::new(
        &format!("{} was changed by another writer", map),
        ErrorKind::TransactionConflict,
    )
}

/// Collections whose locks guard the touched maps.
fn owner_collections(touched: &BTreeMap<String, MapChanges>) -> BTreeSet<String> {
    let mut owners = BTreeSet::new();
    for (map, changes) in touched {
        if map == META_MAP_NAME {
            owners.extend(changes.keys.iter().filter_map(|k| k.as_str()).map(String::from));
        } else if map == COLLECTION_CATALOG {
            owners.extend(
                changes
                    .keys
                    .iter()
                    .filter_map(|k| k.as_array().and_then(|parts| parts.get(1)))
                    .filter_map(|name| name.as_str())
                    .map(String::from),
            );
        } else if map.starts_with('$') {
            if let Some(collection) = map.split(INTERNAL_NAME_SEPARATOR).nth(1) {
                owners.insert(collection.to_string());
            }
        } else {
            owners.insert(map.clone());
        }
    }
    owners
}

impl PotashPluginProvider for TransactionStore {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        self.discard();
        Ok(())
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashStoreProvider for TransactionStore {
    fn open_or_create(&self) -> PotashResult<()> {
        self.ensure_open()
    }

    fn is_closed(&self) -> PotashResult<bool> {
        Ok(self.inner.closed.load(Ordering::Acquire))
    }

    fn snapshot(&self) -> PotashResult<StoreSnapshot> {
        self.with_view(|view| view.working.clone())
    }

    fn commit(&self, batch: WriteBatch) -> PotashResult<()> {
        self.with_view(|view| {
            for op in batch.ops() {
                let changes = view.touched.entry(op.map_name().to_string()).or_default();
                match op {
                    BatchOp::DropMap { .. } => changes.replaced = true,
                    BatchOp::Put { key, .. } | BatchOp::Remove { key, .. } => {
                        changes.keys.insert(key.clone());
                    }
                    BatchOp::CreateMap { .. } => {}
                }
                view.working.apply_op(op);
            }
        })
    }

    fn flush(&self) -> PotashResult<()> {
        self.ensure_open()
    }

    fn compact(&self) -> PotashResult<()> {
        self.ensure_open()
    }

    fn store_config(&self) -> PotashResult<StoreConfig> {
        self.inner.primary.store_config()
    }

    fn store_version(&self) -> PotashResult<String> {
        self.inner.primary.store_version()
    }
}
