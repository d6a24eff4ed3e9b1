use crate::common::{current_time_millis, PotashEventBus, Value};
use crate::errors::PotashResult;
use anyhow::Error;
use basu::error::BasuError;
use basu::event::Event;
use basu::Handle;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

/// The kind of document change a [CollectionEventInfo] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEvents {
    Insert,
    Update,
    Remove,
}

/// One committed document change, delivered to the listeners of the
/// collection named by [CollectionEventInfo::originator].
///
/// The item is the inserted or updated document as stored, or the document
/// as it was before removal.
#[derive(Clone)]
pub struct CollectionEventInfo {
    inner: Arc<CollectionEventInner>,
}

struct CollectionEventInner {
    item: Option<Value>,
    event_type: CollectionEvents,
    timestamp: i64,
    originator: String,
}

impl CollectionEventInfo {
    pub fn new(item: Option<Value>, event_type: CollectionEvents, originator: &str) -> Self {
        CollectionEventInfo {
            inner: Arc::new(CollectionEventInner {
                item,
                event_type,
                timestamp: current_time_millis(),
                originator: originator.to_string(),
            }),
        }
    }

    pub fn event_type(&self) -> CollectionEvents {
        self.inner.event_type
    }

    pub fn item(&self) -> Option<Value> {
        self.inner.item.clone()
    }

    /// Name of the collection the change was committed to.
    pub fn originator(&self) -> &str {
        &self.inner.originator
    }

    /// Milliseconds since the epoch at which the change was staged.
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp
    }
}

impl Debug for CollectionEventInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionEventInfo")
            .field("item", &self.inner.item)
            .field("event_type", &self.inner.event_type)
            .field("timestamp", &self.inner.timestamp)
            .field("originator", &self.inner.originator)
            .finish()
    }
}

/// Signature of a collection event callback. Any matching closure
/// implements it.
pub trait CollectionEventCallback: Send + Sync + Fn(CollectionEventInfo) -> PotashResult<()> {}

impl<F> CollectionEventCallback for F where F: Send + Sync + Fn(CollectionEventInfo) -> PotashResult<()> {}

/// A listener that can be subscribed to a collection or repository.
///
/// ```rust,ignore
/// let subscriber = collection.subscribe(CollectionEventListener::new(|event| {
///     log::info!("{:?} in {}", event.event_type(), event.originator());
///     Ok(())
/// }))?;
/// collection.unsubscribe(subscriber)?;
/// ```
#[derive(Clone)]
pub struct CollectionEventListener {
    on_event: Arc<dyn CollectionEventCallback>,
}

impl CollectionEventListener {
    pub fn new(on_event: impl CollectionEventCallback + 'static) -> Self {
        CollectionEventListener {
            on_event: Arc::new(on_event),
        }
    }
}

impl Handle<CollectionEventInfo> for CollectionEventListener {
    fn handle(&self, event: &Event<CollectionEventInfo>) -> Result<(), BasuError> {
        (self.on_event)(event.data.clone()).map_err(|e| BasuError::HandlerError(Error::from(e)))
    }
}

impl Debug for CollectionEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionEventListener").finish()
    }
}

pub(crate) type CollectionEventBus = PotashEventBus<CollectionEventInfo, CollectionEventListener>;

/// The event buses of one database, one per collection name.
///
/// Transactional handles of a collection share the bus of the primary
/// handle, so a listener sees a transaction's changes once it commits.
#[derive(Clone, Default)]
pub(crate) struct CollectionEventRegistry {
    buses: Arc<DashMap<String, CollectionEventBus>>,
}

impl CollectionEventRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bus(&self, collection_name: &str) -> CollectionEventBus {
        self.buses
            .entry(collection_name.to_string())
            .or_default()
            .clone()
    }

    /// Publishes each event to the bus of its originator. Listener failures
    /// are logged; the change they report is already committed.
    pub(crate) fn publish_all(&self, events: Vec<CollectionEventInfo>) {
        for event in events {
            let bus = match self.buses.get(event.originator()) {
                Some(bus) => bus.clone(),
                None => continue,
            };
            let event_type = event.event_type();
            let originator = event.originator().to_string();
            if let Err(e) = bus.publish(event) {
                log::warn!("Failed to publish {:?} event for {}: {}", event_type, originator, e);
            }
        }
    }

    pub(crate) fn has_listeners(&self, collection_name: &str) -> bool {
        self.buses
            .get(collection_name)
            .map(|bus| bus.has_listeners())
            .unwrap_or(false)
    }

    pub(crate) fn close(&self) {
        for bus in self.buses.iter() {
            if let Err(e) = bus.close() {
                log::warn!("Failed to close event bus of {}: {}", bus.key(), e);
            }
        }
        self.buses.clear();
    }
}

/// Where the events of a committed write go: straight to the listeners,
/// or into the pending list of an open transaction.
#[derive(Clone)]
pub(crate) enum EventDispatch {
    Immediate(CollectionEventRegistry),
    Deferred(PendingEvents),
}

impl EventDispatch {
    pub(crate) fn is_wanted(&self, collection_name: &str) -> bool {
        match self {
            EventDispatch::Immediate(registry) => registry.has_listeners(collection_name),
            EventDispatch::Deferred(_) => true,
        }
    }

    pub(crate) fn dispatch(&self, events: Vec<CollectionEventInfo>) {
        if events.is_empty() {
            return;
        }
        match self {
            EventDispatch::Immediate(registry) => registry.publish_all(events),
            EventDispatch::Deferred(pending) => pending.push_all(events),
        }
    }
}

/// Events of a transaction's writes, held back until it commits.
#[derive(Clone, Default)]
pub(crate) struct PendingEvents {
    events: Arc<Mutex<Vec<CollectionEventInfo>>>,
}

impl PendingEvents {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push_all(&self, events: Vec<CollectionEventInfo>) {
        self.events.lock().extend(events);
    }

    pub(crate) fn take(&self) -> Vec<CollectionEventInfo> {
        std::mem::take(&mut *self.events.lock())
    }

    pub(crate) fn clear(&self) {
        self.events.lock().clear();
    }
}
