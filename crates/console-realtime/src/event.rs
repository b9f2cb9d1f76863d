//! Realtime events and their wire form
//!
//! Events are a closed set so handlers match exhaustively instead of
//! comparing topic strings. On the wire they travel as the portal's
//! `{ "msg_type": ..., "data": ... }` text frames.

use crate::RealtimeResult;
use serde::{Deserialize, Serialize};

/// Event discriminant, used to route subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Backend records changed; listeners re-fetch
    RecordsChanged,
    Connecting,
    Connected,
    Disconnected,
}

impl Topic {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecordsChanged => "records_changed",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "records_changed" => Some(Self::RecordsChanged),
            "connecting" => Some(Self::Connecting),
            "connected" => Some(Self::Connected),
            "disconnected" => Some(Self::Disconnected),
            _ => None,
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification carried by the realtime channel
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// Something changed server-side. The payload is informational only.
    RecordsChanged { payload: serde_json::Value },
    Connecting,
    Connected,
    Disconnected,
}

impl RealtimeEvent {
    pub fn records_changed() -> Self {
        Self::RecordsChanged {
            payload: serde_json::Value::Null,
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Self::RecordsChanged { .. } => Topic::RecordsChanged,
            Self::Connecting => Topic::Connecting,
            Self::Connected => Topic::Connected,
            Self::Disconnected => Topic::Disconnected,
        }
    }

    /// Encode as a wire message
    pub fn to_message(&self) -> WsMessage {
        let data = match self {
            Self::RecordsChanged { payload } => payload.clone(),
            _ => serde_json::json!({}),
        };
        WsMessage {
            msg_type: self.topic().as_str().to_string(),
            data,
        }
    }
}

/// Text frame exchanged with the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    pub msg_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WsMessage {
    pub fn parse(text: &str) -> RealtimeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> RealtimeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Map to a channel event. Control frames (`ping`, `pong`,
    /// `subscribed`, ...) yield `None`.
    pub fn into_event(self) -> Option<RealtimeEvent> {
        let event = match Topic::from_wire(&self.msg_type)? {
            Topic::RecordsChanged => RealtimeEvent::RecordsChanged { payload: self.data },
            Topic::Connecting => RealtimeEvent::Connecting,
            Topic::Connected => RealtimeEvent::Connected,
            Topic::Disconnected => RealtimeEvent::Disconnected,
        };
        Some(event)
    }
}
