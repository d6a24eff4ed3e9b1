use crate::collection::CollectionEventListener;
use crate::common::POTASH_EVENT;
use crate::errors::{ErrorKind, PotashError, PotashResult};
use basu::error::BasuError;
use basu::event::Event;
use basu::{EventBus, Handle, HandlerId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Something that reports its committed document changes to listeners.
pub trait EventAware {
    /// Registers `listener` for every insert, update and remove committed
    /// from now on.
    fn subscribe(&self, listener: CollectionEventListener) -> PotashResult<SubscriberRef>;

    fn unsubscribe(&self, subscriber: SubscriberRef) -> PotashResult<()>;
}

/// Publish/subscribe channel between a source of events `E`
/// and listeners `L`.
///
/// Publishing is a no-op while nobody listens, so sources can publish
/// unconditionally.
///
/// ```ignore
/// let bus: PotashEventBus<MyEvent, MyListener> = PotashEventBus::new();
/// let subscriber = bus.register(MyListener)?;
/// bus.publish(MyEvent::default())?;
/// bus.deregister(subscriber)?;
/// ```
#[derive(Clone)]
pub struct PotashEventBus<E, L> {
    inner: Arc<PotashEventBusInner<E, L>>,
}

impl<E, L> Default for PotashEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, L> PotashEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    pub fn new() -> Self {
        PotashEventBus {
            inner: Arc::new(PotashEventBusInner {
                event_bus: EventBus::new(),
                phantom_data: PhantomData,
            }),
        }
    }

    pub fn register(&self, listener: L) -> PotashResult<SubscriberRef> {
        self.inner
            .event_bus
            .subscribe(POTASH_EVENT, Box::new(listener))
            .map(SubscriberRef::new)
            .map_err(to_potash_error)
    }

    pub fn deregister(&self, subscriber: SubscriberRef) -> PotashResult<()> {
        self.inner
            .event_bus
            .unsubscribe(POTASH_EVENT, &subscriber.inner)
            .map_err(to_potash_error)
    }

    /// Hands `event` to every registered listener.
    pub fn publish(&self, event: E) -> PotashResult<()> {
        if !self.has_listeners() {
            return Ok(());
        }

        self.inner
            .event_bus
            .publish(POTASH_EVENT, &Event::new(event))
            .map_err(to_potash_error)
    }

    /// Drops all listeners.
    pub fn close(&self) -> PotashResult<()> {
        self.inner.event_bus.clear().map_err(to_potash_error)
    }

    pub fn has_listeners(&self) -> bool {
        match self.inner.event_bus.get_handler_count(POTASH_EVENT) {
            Ok(count) => count > 0,
            Err(BasuError::EventTypeNotFOUND) => false,
            Err(e) => {
                log::warn!("Failed to count event listeners: {}", e);
                false
            }
        }
    }
}

struct PotashEventBusInner<E, L> {
    event_bus: EventBus<E>,
    phantom_data: PhantomData<L>,
}

/// Registration handle returned by `subscribe`, needed to unsubscribe.
#[derive(Debug)]
pub struct SubscriberRef {
    pub(crate) inner: HandlerId,
}

impl SubscriberRef {
    pub(crate) fn new(inner: HandlerId) -> Self {
        SubscriberRef { inner }
    }
}

fn to_potash_error(error: BasuError) -> PotashError {
    match error {
        BasuError::EventTypeNotFOUND => PotashError::new(
            "Event bus error: no listener is registered",
            ErrorKind::EventError,
        ),
        BasuError::MutexPoisoned => PotashError::new(
            "Event bus error: internal mutex poisoned",
            ErrorKind::EventError,
        ),
        BasuError::HandlerError(e) => PotashError::new(
            &format!("Event listener failed: {}", e),
            ErrorKind::EventError,
        ),
    }
}
