//! Realtime channel hub
//!
//! One per process. Owns the event bus and hands out listeners; the bus
//! outlives every listener created from it.

use crate::bus::{BusStats, EventBus};
use crate::{LiveConnectionDriver, RealtimeEvent, RefreshTrigger, StatusFacility};
use std::sync::Arc;

/// Process-wide realtime channel
#[derive(Clone, Default)]
pub struct RealtimeChannel {
    bus: Arc<EventBus>,
}

impl RealtimeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to current listeners; returns how many ran
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        tracing::debug!(topic = %event.topic(), "publishing realtime event");
        self.bus.publish(&event)
    }

    /// Signal that backend records changed
    pub fn notify_records_changed(&self, payload: serde_json::Value) -> usize {
        self.publish(RealtimeEvent::RecordsChanged { payload })
    }

    /// Observe the process-wide connection status
    pub fn status(&self) -> StatusFacility {
        StatusFacility::activate(&self.bus)
    }

    /// Register a refresh callback
    pub fn on_refresh<F>(&self, callback: F) -> RefreshTrigger
    where
        F: Fn() + Send + Sync + 'static,
    {
        RefreshTrigger::activate(&self.bus, callback)
    }

    /// Driver feeding a live connection into this channel
    pub fn driver(&self) -> LiveConnectionDriver {
        LiveConnectionDriver::new(self.bus.clone())
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn stats(&self) -> BusStats {
        self.bus.stats()
    }
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("stats", &self.stats())
            .finish()
    }
}
