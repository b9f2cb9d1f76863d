//! Session context
//!
//! The current identity is owned by a single [`SessionWriter`] (the auth
//! subsystem) and observed through any number of [`SessionReader`]s. Each
//! write bumps a generation so observers can tell a replaced actor from an
//! unchanged one.

use crate::{AccessError, AccessResult, Actor};
use std::sync::Arc;
use tokio::sync::watch;

/// Resolved identity of the session
#[derive(Debug, Clone, Default)]
pub enum Identity {
    /// No identity yet, or signed out
    #[default]
    Absent,
    /// Known actor
    Actor(Arc<Actor>),
    /// Identity payload with an unknown actor kind
    Unrecognized { kind: String },
}

impl Identity {
    /// Classify an identity payload from the session subsystem
    pub fn from_payload(payload: Option<serde_json::Value>) -> AccessResult<Self> {
        let Some(value) = payload else {
            return Ok(Self::Absent);
        };

        match Actor::from_json(value) {
            Ok(actor) => Ok(Self::Actor(Arc::new(actor))),
            Err(AccessError::UnrecognizedActor(kind)) => Ok(Self::Unrecognized { kind }),
            Err(e) => Err(e),
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Actor(actor) => Some(actor),
            _ => None,
        }
    }
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub identity: Identity,
    /// Incremented on every write
    pub generation: u64,
}

impl SessionSnapshot {
    /// True once hydration finished with some identity present
    pub fn is_resolved(&self) -> bool {
        self.authenticated && !matches!(self.identity, Identity::Absent)
    }
}

/// Create a session context with no identity
pub fn session_context() -> (SessionWriter, SessionReader) {
    let (tx, rx) = watch::channel(SessionSnapshot::default());
    (SessionWriter { tx }, SessionReader { rx })
}

/// Sole writer of the session identity
#[derive(Debug)]
pub struct SessionWriter {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionWriter {
    /// Mark the session as hydrating (identity not yet known)
    pub fn set_loading(&self) {
        self.publish(false, Identity::Absent);
    }

    /// Install a freshly authenticated actor
    pub fn sign_in(&self, actor: Actor) {
        tracing::info!(actor_id = actor.id(), "session signed in");
        self.publish(true, Identity::Actor(Arc::new(actor)));
    }

    /// Install an actor decoded from a raw session payload.
    ///
    /// A payload that fails to decode clears the session before the error
    /// is returned; the previous actor never survives a re-auth.
    pub fn sign_in_payload(&self, payload: serde_json::Value) -> AccessResult<()> {
        let identity = match Identity::from_payload(Some(payload)) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "session payload rejected, clearing identity");
                self.publish(false, Identity::Absent);
                return Err(e);
            }
        };
        if let Identity::Unrecognized { kind } = &identity {
            tracing::warn!(kind = %kind, "session carries unrecognized actor kind");
        }
        self.publish(true, identity);
        Ok(())
    }

    /// Replace the actor after a profile refresh
    pub fn refresh(&self, actor: Actor) {
        tracing::debug!(actor_id = actor.id(), "session refreshed");
        self.publish(true, Identity::Actor(Arc::new(actor)));
    }

    pub fn sign_out(&self) {
        tracing::info!("session signed out");
        self.publish(false, Identity::Absent);
    }

    /// New reader observing this session
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            rx: self.tx.subscribe(),
        }
    }

    fn publish(&self, authenticated: bool, identity: Identity) {
        self.tx.send_modify(|snapshot| {
            snapshot.authenticated = authenticated;
            snapshot.identity = identity;
            snapshot.generation += 1;
        });
    }
}

/// Read-only handle on the session
#[derive(Debug, Clone)]
pub struct SessionReader {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionReader {
    /// Current snapshot
    pub fn current(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next write. Returns `false` once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Current snapshot, marking it as seen
    pub fn current_and_mark_seen(&mut self) -> SessionSnapshot {
        self.rx.borrow_and_update().clone()
    }
}
