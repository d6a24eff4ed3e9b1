use super::transaction_store::TransactionStore;
use crate::collection::{
    validate_collection_name, CollectionEventRegistry, CollectionFactory, PendingEvents, PotashCollection,
};
use crate::common::{Convertible, LockRegistry, TAG_COLLECTION};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::potash_config::PotashConfig;
use crate::repository::{ObjectRepository, PotashEntity, RepositoryFactory};
use crate::store::PotashStore;
use parking_lot::Mutex;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    /// Created, nothing read or written yet.
    Open,
    /// Working on its snapshot.
    Active,
    Committed,
    RolledBack,
    /// Closed before it finished; its changes were discarded.
    Closed,
}

impl TransactionState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, TransactionState::Open | TransactionState::Active)
    }
}

impl Display for TransactionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransactionState::Open => "open",
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
            TransactionState::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

/// An isolated unit of work.
///
/// Collections and repositories obtained from a transaction read and write a
/// private copy of the store taken on first use. Nothing is visible outside
/// until [PotashTransaction::commit]; [PotashTransaction::rollback] or
/// [PotashTransaction::close] discard everything. Collection listeners hear
/// about the transaction's changes only after a successful commit. Once finished, every
/// handle obtained from the transaction fails with `StoreClosed`.
#[derive(Clone)]
pub struct PotashTransaction {
    inner: Arc<TransactionInner>,
}

impl std::fmt::Debug for PotashTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PotashTransaction").finish_non_exhaustive()
    }
}

struct TransactionInner {
    id: String,
    state: Mutex<TransactionState>,
    store: TransactionStore,
    collections: CollectionFactory,
    repositories: RepositoryFactory,
    lock_registry: LockRegistry,
    pending_events: PendingEvents,
    event_registry: CollectionEventRegistry,
}

impl PotashTransaction {
    pub(crate) fn new(primary: PotashStore, config: PotashConfig, lock_registry: LockRegistry) -> Self {
        let store = TransactionStore::new(primary);
        let pending_events = PendingEvents::new();
        let event_registry = config.event_registry().clone();
        let collections = CollectionFactory::deferring_events(
            PotashStore::new(store.clone()),
            config,
            LockRegistry::new(),
            pending_events.clone(),
        );
        let repositories = RepositoryFactory::new(collections.clone());

        PotashTransaction {
            inner: Arc::new(TransactionInner {
                id: Uuid::new_v4().to_string(),
                state: Mutex::new(TransactionState::Open),
                store,
                collections,
                repositories,
                lock_registry,
                pending_events,
                event_registry,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn state(&self) -> TransactionState {
        let state = *self.inner.state.lock();
        if state == TransactionState::Open && self.inner.store.is_started() {
            TransactionState::Active
        } else {
            state
        }
    }

    pub fn collection(&self, name: &str) -> PotashResult<PotashCollection> {
        self.check_usable()?;
        validate_collection_name(name)?;
        self.inner.collections.get_or_create(name, TAG_COLLECTION)
    }

    pub fn repository<T>(&self) -> PotashResult<ObjectRepository<T>>
    where
        T: PotashEntity + Convertible<Output = T> + Send + Sync + 'static,
    {
        self.check_usable()?;
        self.inner.repositories.get_or_create(None)
    }

    pub fn keyed_repository<T>(&self, key: &str) -> PotashResult<ObjectRepository<T>>
    where
        T: PotashEntity + Convertible<Output = T> + Send + Sync + 'static,
    {
        self.check_usable()?;
        self.inner.repositories.get_or_create(Some(key))
    }

    /// Publishes every change of the transaction atomically.
    ///
    /// # Errors
    /// `TransactionConflict` when a record this transaction changed was
    /// changed by someone else since the transaction started. The
    /// transaction is rolled back in that case.
    pub fn commit(&self) -> PotashResult<()> {
        let mut state = self.inner.state.lock();
        self.check_unfinished(*state)?;

        let result = if self.inner.store.has_changes() {
            self.inner.store.commit_to_primary(&self.inner.lock_registry)
        } else {
            Ok(())
        };
        let events = self.inner.pending_events.take();
        self.discard();

        match result {
            Ok(()) => {
                *state = TransactionState::Committed;
                log::debug!("Transaction {} committed", self.inner.id);
                drop(state);
                self.inner.event_registry.publish_all(events);
                Ok(())
            }
            Err(e) => {
                *state = TransactionState::RolledBack;
                log::error!("Transaction {} rolled back: {}", self.inner.id, e);
                Err(e)
            }
        }
    }

    pub fn rollback(&self) -> PotashResult<()> {
        let mut state = self.inner.state.lock();
        self.check_unfinished(*state)?;
        self.discard();
        *state = TransactionState::RolledBack;
        log::debug!("Transaction {} rolled back", self.inner.id);
        Ok(())
    }

    /// Discards the transaction if it has not finished yet.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        if !state.is_finished() {
            self.discard();
            *state = TransactionState::Closed;
            log::debug!("Transaction {} closed without commit", self.inner.id);
        }
    }

    fn discard(&self) {
        self.inner.store.discard();
        self.inner.pending_events.clear();
        self.inner.collections.clear();
        self.inner.repositories.clear();
    }

    fn check_unfinished(&self, state: TransactionState) -> PotashResult<()> {
        if state.is_finished() {
            log::error!("Transaction {} is already {}", self.inner.id, state);
            return Err(PotashError::new(
                &format!("Transaction is already {}", state),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn check_usable(&self) -> PotashResult<()> {
        let state = *self.inner.state.lock();
        if state.is_finished() {
            log::error!("Transaction {} is {}", self.inner.id, state);
            return Err(PotashError::new(
                &format!("Transaction is {}", state),
                ErrorKind::StoreClosed,
            ));
        }
        Ok(())
    }
}
