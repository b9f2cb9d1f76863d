//! Refresh trigger
//!
//! Runs a zero-argument callback whenever records change server-side. The
//! callback sits in a slot owned by the trigger and is read at dispatch
//! time, so swapping it never re-subscribes and never runs a stale one.

use crate::bus::{EventBus, Subscription};
use crate::Topic;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

type RefreshCallback = Box<dyn Fn() + Send + Sync>;

/// One records-changed subscription with a swappable callback
pub struct RefreshTrigger {
    slot: Arc<ArcSwapOption<RefreshCallback>>,
    subscription: Option<Subscription>,
}

impl RefreshTrigger {
    /// Subscribe to records-changed events on `bus`
    pub fn activate<F>(bus: &Arc<EventBus>, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: RefreshCallback = Box::new(callback);
        let slot = Arc::new(ArcSwapOption::new(Some(Arc::new(callback))));

        let current = slot.clone();
        let subscription = bus.subscribe(Topic::RecordsChanged, move |_| {
            if let Some(callback) = current.load_full() {
                (*callback)();
            }
        });

        Self {
            slot,
            subscription: Some(subscription),
        }
    }

    /// Replace the callback used for subsequent events
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: RefreshCallback = Box::new(callback);
        self.slot.store(Some(Arc::new(callback)));
    }

    pub fn is_active(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Unsubscribe and release the callback
    pub fn deactivate(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.slot.store(None);
    }
}

impl Drop for RefreshTrigger {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for RefreshTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTrigger")
            .field("active", &self.is_active())
            .finish()
    }
}
