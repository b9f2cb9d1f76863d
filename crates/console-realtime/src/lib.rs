//! Tenant Console Realtime Channel
//!
//! Process-wide notifications for the console: "records changed" signals
//! that prompt views to re-fetch, and the status of the live connection.
//!
//! # Architecture
//!
//! ```text
//!   portal /ws frames
//!          │
//!   ┌──────▼───────────────┐
//!   │ LiveConnectionDriver │  Connecting / Connected / Disconnected
//!   └──────┬───────────────┘  RecordsChanged
//!          │ publish
//!   ┌──────▼──────────────────────────────────────────────┐
//!   │                     EVENT BUS                       │
//!   │   topic → [listener₁, listener₂, ...] (reg. order)  │
//!   └──────┬───────────────────────────────┬──────────────┘
//!          │                               │
//!   ┌──────▼─────────┐             ┌───────▼────────┐
//!   │ StatusFacility │             │ RefreshTrigger │
//!   │ watch<Status>  │             │ swappable slot │
//!   └────────────────┘             └────────────────┘
//! ```
//!
//! Delivery is at-most-once to listeners subscribed at publish time. There
//! is no buffering or replay; listeners re-derive state on activation.

pub mod bus;
pub mod channel;
pub mod driver;
pub mod error;
pub mod event;
pub mod refresh;
pub mod status;

pub use bus::{BusStats, EventBus, Subscription};
pub use channel::RealtimeChannel;
pub use driver::{DriverReport, LiveConnectionDriver};
pub use error::{RealtimeError, RealtimeResult};
pub use event::{RealtimeEvent, Topic, WsMessage};
pub use refresh::RefreshTrigger;
pub use status::{ConnectionStatus, StatusFacility};
