use crate::domain::event::RealtimePayload;
use crate::domain::ports::EventSink;
use chrono::Utc;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;
use tracing::{debug, error, warn};

type SubscriberFn = dyn Fn(&RealtimePayload) + Send + Sync;

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Point-in-time connectivity snapshot, for diagnostic display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub subscribers: usize,
}

struct BusInner {
    subscribers: RwLock<HashMap<u64, Arc<SubscriberFn>>>,
    next_id: AtomicU64,
    connected: AtomicBool,
}

/// In-process publish/subscribe hub for lifecycle notifications.
///
/// An explicitly constructed service object: create one per composition root
/// (or per test) and clone it wherever a handle is needed. Delivery is
/// best-effort; events broadcast while disconnected are dropped, not queued.
/// No delivery-order guarantee exists across subscribers.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a bus in the connected state with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                connected: AtomicBool::new(true),
            }),
        }
    }

    /// Registers a callback invoked once per broadcast event.
    ///
    /// The returned handle removes the callback; unsubscribing twice is a
    /// no-op. Dropping the handle without calling it leaves the subscription
    /// alive for the lifetime of the bus.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&RealtimePayload) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner());
        subscribers.insert(id, Arc::new(callback));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    pub fn connect(&self) {
        self.inner.connected.store(true, Ordering::SeqCst);
        debug!("event bus connected");
    }

    pub fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
        debug!("event bus disconnected");
    }

    /// Retries the connect step with a doubling delay, giving up after a
    /// fixed attempt ceiling.
    pub async fn reconnect(&self) -> bool {
        let mut delay = RECONNECT_BASE_DELAY;
        for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
            if self.try_connect() {
                debug!(attempt, "event bus reconnected");
                return true;
            }
            warn!(attempt, "event bus reconnect attempt failed, backing off");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
        error!(
            attempts = MAX_RECONNECT_ATTEMPTS,
            "event bus reconnect abandoned"
        );
        false
    }

    // The connect step itself; a placeholder for a real transport handshake.
    fn try_connect(&self) -> bool {
        self.inner.connected.store(true, Ordering::SeqCst);
        true
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        let subscribers = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        ConnectionStatus {
            connected: self.inner.connected.load(Ordering::SeqCst),
            subscribers,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    /// Delivers `payload` to every registered subscriber.
    ///
    /// A missing timestamp is backfilled before delivery so all subscribers
    /// observe the same instant. A panicking subscriber is caught and logged
    /// without interrupting delivery to the rest.
    fn broadcast(&self, payload: RealtimePayload) {
        if !self.inner.connected.load(Ordering::SeqCst) {
            warn!(event = payload.event.name(), "event bus disconnected, dropping event");
            return;
        }

        let mut payload = payload;
        if payload.timestamp.is_none() {
            payload.timestamp = Some(Utc::now());
        }

        // Deliver from a snapshot so callbacks may subscribe or unsubscribe
        // without re-entering the registry lock.
        let subscribers: Vec<(u64, Arc<SubscriberFn>)> = {
            let registry = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(|e| e.into_inner());
            registry.iter().map(|(id, cb)| (*id, cb.clone())).collect()
        };
        debug!(
            event = payload.event.name(),
            subscribers = subscribers.len(),
            "broadcasting event"
        );
        for (id, callback) in subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback(&payload))).is_err() {
                error!(subscriber = id, event = payload.event.name(), "subscriber panicked during delivery");
            }
        }
    }
}

/// Handle to an active subscription.
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Removes the callback from the bus. Calling this more than once (or
    /// after the bus is gone) is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.bus.upgrade() {
            let mut subscribers = inner.subscribers.write().unwrap_or_else(|e| e.into_inner());
            subscribers.remove(&self.id);
        }
    }
}
