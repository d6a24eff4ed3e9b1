use crate::collection::{validate_collection_name, CollectionFactory, PotashCollection};
use crate::common::security::AuthService;
use crate::common::{Convertible, LockRegistry, PotashModule, DEFAULT_FIELD_SEPARATOR, TAG_COLLECTION};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::potash_builder::PotashBuilder;
use crate::potash_config::PotashConfig;
use crate::repository::{repository_name, ObjectRepository, PotashEntity, RepositoryFactory};
use crate::store::PotashStore;
use crate::transaction::Session;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Plain configuration for [Potash::open].
///
/// Equivalent to the [PotashBuilder] calls of the same name.
pub struct PotashOptions {
    pub field_separator: String,
    pub modules: Vec<Box<dyn PotashModule>>,
}

impl Default for PotashOptions {
    fn default() -> Self {
        PotashOptions {
            field_separator: DEFAULT_FIELD_SEPARATOR.to_string(),
            modules: Vec::new(),
        }
    }
}

/// An open database.
///
/// Cheap to clone and safe to share between threads; all clones refer to
/// the same database. Once [Potash::close] has run every operation fails
/// with [ErrorKind::StoreClosed].
#[derive(Clone)]
pub struct Potash {
    inner: Arc<PotashInner>,
}

struct PotashInner {
    config: PotashConfig,
    store: PotashStore,
    lock_registry: LockRegistry,
    collection_factory: CollectionFactory,
    repository_factory: RepositoryFactory,
    closed: AtomicBool,
}

impl Potash {
    pub fn builder() -> PotashBuilder {
        PotashBuilder::new()
    }

    /// Opens a database from [PotashOptions].
    pub fn open(options: PotashOptions, username: Option<&str>, password: Option<&str>) -> PotashResult<Potash> {
        let config = PotashConfig::new();
        config.set_field_separator(&options.field_separator)?;
        for module in &options.modules {
            config.load_boxed_module(module.as_ref())?;
        }
        Potash::open_with_config(config, username, password)
    }

    pub(crate) fn open_with_config(
        config: PotashConfig,
        username: Option<&str>,
        password: Option<&str>,
    ) -> PotashResult<Potash> {
        config.initialize()?;
        let store = config.potash_store()?;

        let opened = store
            .open_or_create()
            .and_then(|_| AuthService::new(store.clone()).authenticate(username, password));
        if let Err(e) = opened {
            log::error!("Failed to open database: {}", e);
            if let Err(close_error) = config.close() {
                log::warn!("Failed to release the store after a failed open: {}", close_error);
            }
            return Err(e);
        }

        let lock_registry = LockRegistry::new();
        let collection_factory = CollectionFactory::new(store.clone(), config.clone(), lock_registry.clone());
        let repository_factory = RepositoryFactory::new(collection_factory.clone());

        log::info!("Database opened with store {}", store.store_version()?);
        Ok(Potash {
            inner: Arc::new(PotashInner {
                config,
                store,
                lock_registry,
                collection_factory,
                repository_factory,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Opens the collection `name`, creating it on first access.
    ///
    /// # Errors
    /// `ValidationError` when the name is empty, starts with `$`, contains
    /// a reserved character or already belongs to a repository.
    pub fn collection(&self, name: &str) -> PotashResult<PotashCollection> {
        validate_collection_name(name)?;
        self.check_opened()?;
        self.inner.collection_factory.get_or_create(name, TAG_COLLECTION)
    }

    pub fn repository<T>(&self) -> PotashResult<ObjectRepository<T>>
    where
        T: PotashEntity + Convertible<Output = T> + Send + Sync + 'static,
    {
        self.check_opened()?;
        self.inner.repository_factory.get_or_create::<T>(None)
    }

    /// Opens the repository of `T` stored under `key`. Keyed repositories
    /// of one type are independent collections.
    pub fn keyed_repository<T>(&self, key: &str) -> PotashResult<ObjectRepository<T>>
    where
        T: PotashEntity + Convertible<Output = T> + Send + Sync + 'static,
    {
        self.check_opened()?;
        self.inner.repository_factory.get_or_create::<T>(Some(key))
    }

    pub fn has_collection(&self, name: &str) -> PotashResult<bool> {
        Ok(self.list_collection_names()?.contains(name))
    }

    pub fn has_repository<T: PotashEntity>(&self) -> PotashResult<bool> {
        let (name, _) = repository_name::<T>(None)?;
        Ok(self.list_repositories()?.contains(&name))
    }

    pub fn has_keyed_repository<T: PotashEntity>(&self, key: &str) -> PotashResult<bool> {
        let repositories = self.list_keyed_repositories()?;
        Ok(repositories
            .get(key)
            .map(|entities| entities.contains(&T::entity_name()))
            .unwrap_or(false))
    }

    pub fn list_collection_names(&self) -> PotashResult<BTreeSet<String>> {
        self.check_opened()?;
        self.inner.store.store_catalog()?.collection_names()
    }

    pub fn list_repositories(&self) -> PotashResult<BTreeSet<String>> {
        self.check_opened()?;
        self.inner.store.store_catalog()?.repository_names()
    }

    /// Keyed repositories grouped by key.
    pub fn list_keyed_repositories(&self) -> PotashResult<BTreeMap<String, BTreeSet<String>>> {
        self.check_opened()?;
        self.inner.store.store_catalog()?.keyed_repository_names()
    }

    /// Drops the collection `name` with its documents and indexes. Missing
    /// collections are ignored.
    pub fn destroy_collection(&self, name: &str) -> PotashResult<()> {
        validate_collection_name(name)?;
        self.check_opened()?;
        self.inner.collection_factory.destroy(name, TAG_COLLECTION)
    }

    pub fn destroy_repository<T: PotashEntity>(&self) -> PotashResult<()> {
        self.check_opened()?;
        self.inner.repository_factory.destroy::<T>(None)
    }

    pub fn destroy_keyed_repository<T: PotashEntity>(&self, key: &str) -> PotashResult<()> {
        self.check_opened()?;
        self.inner.repository_factory.destroy::<T>(Some(key))
    }

    /// Starts a session. The caller must close it.
    pub fn session(&self) -> PotashResult<Session> {
        self.check_opened()?;
        Ok(Session::new(
            self.inner.store.clone(),
            self.inner.config.clone(),
            self.inner.lock_registry.clone(),
        ))
    }

    /// Runs `f` with a new session and closes the session afterwards,
    /// whatever `f` returns.
    pub fn with_session<R, F>(&self, f: F) -> PotashResult<R>
    where
        F: FnOnce(&Session) -> PotashResult<R>,
    {
        let session = self.session()?;
        let result = f(&session);
        session.close();
        result
    }

    /// Forces committed writes to durable storage.
    pub fn commit(&self) -> PotashResult<()> {
        self.check_opened()?;
        self.inner.store.flush()
    }

    pub fn compact(&self) -> PotashResult<()> {
        self.check_opened()?;
        self.inner.store.compact()
    }

    /// Flushes and closes the store and every plugin. Closing twice is a
    /// no-op.
    pub fn close(&self) -> PotashResult<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Err(e) = self.inner.store.flush() {
            log::warn!("Failed to flush the store before closing: {}", e);
        }
        self.inner.repository_factory.clear();
        self.inner.collection_factory.clear();
        self.inner.config.close()?;
        log::info!("Database closed");
        Ok(())
    }

    pub fn is_closed(&self) -> PotashResult<bool> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Ok(true);
        }
        self.inner.store.is_closed()
    }

    pub fn config(&self) -> PotashConfig {
        self.inner.config.clone()
    }

    pub fn store(&self) -> PotashStore {
        self.inner.store.clone()
    }

    fn check_opened(&self) -> PotashResult<()> {
        if self.is_closed()? {
            log::error!("Database is closed");
            return Err(PotashError::new("Database is closed", ErrorKind::StoreClosed));
        }
        Ok(())
    }
}
