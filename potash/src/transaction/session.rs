use super::potash_transaction::PotashTransaction;
use crate::common::LockRegistry;
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::potash_config::PotashConfig;
use crate::store::PotashStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Runs transactions one after another.
///
/// A session must be closed; closing discards a transaction that has not
/// finished.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

struct SessionInner {
    id: String,
    active: AtomicBool,
    current: Mutex<Option<PotashTransaction>>,
    store: PotashStore,
    config: PotashConfig,
    lock_registry: LockRegistry,
}

impl Session {
    pub(crate) fn new(store: PotashStore, config: PotashConfig, lock_registry: LockRegistry) -> Self {
        Session {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4().to_string(),
                active: AtomicBool::new(true),
                current: Mutex::new(None),
                store,
                config,
                lock_registry,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Starts a new transaction.
    ///
    /// # Errors
    /// `InvalidOperation` when the session is closed or its previous
    /// transaction has not finished.
    pub fn begin_transaction(&self) -> PotashResult<PotashTransaction> {
        if !self.is_active() {
            log::error!("Session {} is closed", self.inner.id);
            return Err(PotashError::new("Session is closed", ErrorKind::InvalidOperation));
        }

        let mut current = self.inner.current.lock();
        if let Some(transaction) = current.as_ref() {
            if !transaction.state().is_finished() {
                log::error!(
                    "Session {} already runs transaction {}",
                    self.inner.id,
                    transaction.id()
                );
                return Err(PotashError::new(
                    "Another transaction of this session is still running",
                    ErrorKind::InvalidOperation,
                ));
            }
        }

        let transaction = PotashTransaction::new(
            self.inner.store.clone(),
            self.inner.config.clone(),
            self.inner.lock_registry.clone(),
        );
        *current = Some(transaction.clone());
        Ok(transaction)
    }

    /// Runs `f` in a new transaction, committing when it returns `Ok` and
    /// rolling back when it returns `Err`.
    pub fn with_transaction<R, F>(&self, f: F) -> PotashResult<R>
    where
        F: FnOnce(&PotashTransaction) -> PotashResult<R>,
    {
        let transaction = self.begin_transaction()?;
        match f(&transaction) {
            Ok(result) => {
                transaction.commit()?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_error) = transaction.rollback() {
                    log::warn!("Rollback of {} failed: {}", transaction.id(), rollback_error);
                }
                Err(e)
            }
        }
    }

    pub fn close(&self) {
        if self.inner.active.swap(false, Ordering::AcqRel) {
            if let Some(transaction) = self.inner.current.lock().take() {
                transaction.close();
            }
            log::debug!("Session {} closed", self.inner.id);
        }
    }
}
