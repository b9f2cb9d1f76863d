//! Live connection driver
//!
//! Pumps text frames from the portal's `/ws` feed into the event bus and
//! reports connection transitions. Reconnecting is the caller's job: run
//! the driver again on a fresh stream.

use crate::bus::EventBus;
use crate::{RealtimeEvent, WsMessage};
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;

/// Counters for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub frames: u64,
    /// Frames that mapped to a channel event
    pub events: u64,
    /// Frames that failed to decode
    pub malformed: u64,
    /// Stream ended with a transport error
    pub failed: bool,
}

/// Feeds one live connection into the bus
#[derive(Clone)]
pub struct LiveConnectionDriver {
    bus: Arc<EventBus>,
}

impl LiveConnectionDriver {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Consume `frames` until the stream ends or errors.
    ///
    /// Publishes `Connecting` on entry and `Disconnected` on exit; the
    /// server's own `connected` frame moves the status to `Connected`.
    pub async fn run<S, E>(&self, frames: S) -> DriverReport
    where
        S: Stream<Item = Result<String, E>>,
        E: Display,
    {
        let mut report = DriverReport::default();
        let mut frames = std::pin::pin!(frames);

        self.bus.publish(&RealtimeEvent::Connecting);

        while let Some(frame) = frames.next().await {
            let text = match frame {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "live connection failed");
                    report.failed = true;
                    break;
                }
            };
            report.frames += 1;

            match WsMessage::parse(&text) {
                Ok(message) => {
                    let msg_type = message.msg_type.clone();
                    match message.into_event() {
                        Some(event) => {
                            report.events += 1;
                            self.bus.publish(&event);
                        }
                        None => tracing::trace!(msg_type = %msg_type, "control frame ignored"),
                    }
                }
                Err(e) => {
                    report.malformed += 1;
                    tracing::warn!(error = %e, "skipping malformed frame");
                }
            }
        }

        self.bus.publish(&RealtimeEvent::Disconnected);
        tracing::info!(frames = report.frames, failed = report.failed, "live connection closed");
        report
    }
}
