//! Process-wide event bus
//!
//! Fan-out without buffering: an event reaches the listeners subscribed to
//! its topic at publish time, once each, in registration order. Nothing is
//! queued for later subscribers.
//!
//! The bus also owns the process-wide [`ConnectionStatus`] cell. Status
//! events update it before any listener runs, so it is always current for
//! readers created at any time.

use crate::{ConnectionStatus, RealtimeEvent, Topic};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

type Handler = Box<dyn Fn(&RealtimeEvent) + Send + Sync>;

struct Listener {
    id: u64,
    active: AtomicBool,
    handler: Handler,
}

/// Topic-routed listener registry
pub struct EventBus {
    listeners: DashMap<Topic, Vec<Arc<Listener>>>,
    status: watch::Sender<ConnectionStatus>,
    next_id: AtomicU64,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self {
            listeners: DashMap::new(),
            status,
            next_id: AtomicU64::new(0),
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Reader of the status cell, seeded with the current value
    pub fn status_receiver(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Register `handler` for `topic`. The listener stays registered until
    /// the returned [`Subscription`] is cancelled or dropped.
    pub fn subscribe<F>(self: &Arc<Self>, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        let listener = Arc::new(Listener {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            handler: Box::new(handler),
        });

        self.listeners
            .entry(topic)
            .or_insert_with(Vec::new)
            .push(listener.clone());
        tracing::trace!(topic = %topic, id = listener.id, "listener subscribed");

        Subscription {
            bus: Arc::downgrade(self),
            topic,
            listener: Some(listener),
        }
    }

    /// Deliver `event` to current listeners of its topic.
    ///
    /// Returns the number of listeners invoked. Listeners are snapshotted
    /// before dispatch and no lock is held while they run, so a listener
    /// may subscribe or cancel re-entrantly; one cancelled before its turn
    /// is skipped.
    pub fn publish(&self, event: &RealtimeEvent) -> usize {
        let topic = event.topic();
        self.published.fetch_add(1, Ordering::Relaxed);

        if topic != Topic::RecordsChanged {
            self.status.send_if_modified(|status| {
                let next = status.apply(event);
                if next == *status {
                    return false;
                }
                tracing::debug!(from = ?*status, to = ?next, "connection status changed");
                *status = next;
                true
            });
        }

        let snapshot: Vec<Arc<Listener>> = match self.listeners.get(&topic) {
            Some(listeners) => listeners.clone(),
            None => Vec::new(),
        };

        let mut invoked = 0;
        for listener in &snapshot {
            if listener.active.load(Ordering::Acquire) {
                (listener.handler)(event);
                invoked += 1;
            }
        }

        if invoked == 0 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(topic = %topic, "no live listeners, event dropped");
            return 0;
        }
        self.delivered.fetch_add(invoked as u64, Ordering::Relaxed);
        invoked
    }

    /// Number of live listeners on `topic`
    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners.get(&topic).map_or(0, |l| l.len())
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn remove(&self, topic: Topic, id: u64) {
        if let Some(mut listeners) = self.listeners.get_mut(&topic) {
            listeners.retain(|l| l.id != id);
        }
    }
}

/// Bus counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BusStats {
    pub published: u64,
    /// Listener invocations
    pub delivered: u64,
    /// Events published with no listener on their topic
    pub dropped: u64,
}

/// Registration handle; unsubscribes on cancel or drop
pub struct Subscription {
    bus: Weak<EventBus>,
    topic: Topic,
    listener: Option<Arc<Listener>>,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn is_active(&self) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|l| l.active.load(Ordering::Acquire))
    }

    /// Unsubscribe now. Later publishes never reach the handler, and a
    /// dispatch in progress on the cancelling thread skips it. A dispatch
    /// running concurrently on another thread may already have passed the
    /// check and still invoke it once.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        listener.active.store(false, Ordering::Release);
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.topic, listener.id);
        }
        tracing::trace!(topic = %self.topic, id = listener.id, "listener unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("active", &self.is_active())
            .finish()
    }
}
