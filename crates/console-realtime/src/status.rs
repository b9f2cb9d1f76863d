//! Connection status facility

use crate::bus::EventBus;
use crate::RealtimeEvent;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Live connection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    /// Status after a status event. The last signal wins; there is no
    /// debounce and no rejected transition.
    pub fn apply(self, event: &RealtimeEvent) -> Self {
        match event {
            RealtimeEvent::Connecting => Self::Connecting,
            RealtimeEvent::Connected => Self::Connected,
            RealtimeEvent::Disconnected => Self::Disconnected,
            RealtimeEvent::RecordsChanged { .. } => self,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Read handle on the bus's [`ConnectionStatus`] cell
///
/// Every facility on a bus observes the same value, seeded with the status
/// current at activation. Any number of readers can observe it through
/// [`StatusFacility::get`] or a [`watch::Receiver`] from
/// [`StatusFacility::watch`].
pub struct StatusFacility {
    rx: watch::Receiver<ConnectionStatus>,
}

impl StatusFacility {
    /// Start observing the status tracked by `bus`
    pub fn activate(bus: &Arc<EventBus>) -> Self {
        Self {
            rx: bus.status_receiver(),
        }
    }

    /// Current status
    pub fn get(&self) -> ConnectionStatus {
        *self.rx.borrow()
    }

    /// Receiver notified on every status change
    pub fn watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.rx.clone()
    }

    /// Stop observing. The bus keeps tracking for other readers.
    pub fn deactivate(self) {
        drop(self.rx);
    }
}

impl std::fmt::Debug for StatusFacility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusFacility")
            .field("status", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let bus = EventBus::new();
        let status = StatusFacility::activate(&bus);
        assert_eq!(status.get(), ConnectionStatus::Disconnected);

        bus.publish(&RealtimeEvent::Connecting);
        assert_eq!(status.get(), ConnectionStatus::Connecting);

        bus.publish(&RealtimeEvent::Connected);
        assert!(status.get().is_connected());

        bus.publish(&RealtimeEvent::Disconnected);
        assert_eq!(status.get(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_last_signal_wins() {
        let bus = EventBus::new();
        let status = StatusFacility::activate(&bus);

        bus.publish(&RealtimeEvent::Connected);
        bus.publish(&RealtimeEvent::Disconnected);
        bus.publish(&RealtimeEvent::Connected);
        bus.publish(&RealtimeEvent::records_changed());
        assert_eq!(status.get(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_multiple_listeners_agree() {
        let bus = EventBus::new();
        let first = StatusFacility::activate(&bus);
        let second = StatusFacility::activate(&bus);
        let reader = first.watch();

        bus.publish(&RealtimeEvent::Connected);
        assert_eq!(first.get(), ConnectionStatus::Connected);
        assert_eq!(second.get(), ConnectionStatus::Connected);
        assert_eq!(*reader.borrow(), ConnectionStatus::Connected);

        bus.publish(&RealtimeEvent::Disconnected);
        assert_eq!(first.get(), ConnectionStatus::Disconnected);
        assert_eq!(second.get(), ConnectionStatus::Disconnected);
        assert_eq!(*reader.borrow(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_late_activation_sees_current_status() {
        let bus = EventBus::new();
        let early = StatusFacility::activate(&bus);

        bus.publish(&RealtimeEvent::Connected);
        let late = StatusFacility::activate(&bus);

        assert_eq!(early.get(), ConnectionStatus::Connected);
        assert_eq!(late.get(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_tracked_with_no_facility_active() {
        let bus = EventBus::new();
        bus.publish(&RealtimeEvent::Connecting);
        bus.publish(&RealtimeEvent::Connected);

        assert!(StatusFacility::activate(&bus).get().is_connected());
    }

    #[test]
    fn test_deactivate_leaves_other_readers() {
        let bus = EventBus::new();
        let first = StatusFacility::activate(&bus);
        let second = StatusFacility::activate(&bus);

        first.deactivate();
        bus.publish(&RealtimeEvent::Connected);
        assert_eq!(second.get(), ConnectionStatus::Connected);
        assert_eq!(bus.listener_count(crate::Topic::Connected), 0);
    }

    #[tokio::test]
    async fn test_watch_wakes_reader() {
        let bus = EventBus::new();
        let status = StatusFacility::activate(&bus);
        let mut reader = status.watch();

        bus.publish(&RealtimeEvent::Connected);
        reader.changed().await.unwrap();
        assert_eq!(*reader.borrow_and_update(), ConnectionStatus::Connected);
    }
}
