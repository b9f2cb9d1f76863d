//! Navigation guard
//!
//! Re-evaluates page access whenever the session identity or the navigation
//! target changes and replaces the current history entry with the forbidden
//! page on deny. This is a UX gate; the API enforces access on its own.

use crate::registry::normalize_path;
use crate::session::{Identity, SessionReader, SessionSnapshot};
use crate::DecisionEngine;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Default redirect target on deny
pub const DEFAULT_FORBIDDEN_PATH: &str = "/forbidden";

/// Navigation side effect performed by the guard
pub trait Navigator: Send + Sync {
    /// Replace the current history entry with `path` (no push)
    fn replace(&self, path: &str);
}

/// Result of one guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Identity still hydrating
    Deferred,
    /// Platform actor, not subject to page gating
    Exempt,
    Allowed,
    Redirected,
    /// Denied without redirect (unrecognized identity or already on the
    /// forbidden page)
    Suppressed,
    /// Same identity generation and path as the last evaluation
    Unchanged,
    /// Guard was deactivated
    Inactive,
}

/// Evaluates the decision engine for the current identity and path
pub struct GuardController<N> {
    engine: Arc<DecisionEngine>,
    navigator: N,
    forbidden_path: String,
    last_input: Option<(u64, String)>,
    active: bool,
}

impl<N: Navigator> GuardController<N> {
    pub fn new(engine: Arc<DecisionEngine>, navigator: N) -> Self {
        Self::with_forbidden_path(engine, navigator, DEFAULT_FORBIDDEN_PATH)
    }

    pub fn with_forbidden_path(engine: Arc<DecisionEngine>, navigator: N, forbidden_path: &str) -> Self {
        Self {
            engine,
            navigator,
            forbidden_path: normalize_path(forbidden_path),
            last_input: None,
            active: true,
        }
    }

    /// Evaluate access for `session` on `path`
    pub fn evaluate(&mut self, session: &SessionSnapshot, path: &str) -> GuardOutcome {
        if !self.active {
            return GuardOutcome::Inactive;
        }
        // Not recorded, so the same path is evaluated once hydration completes
        if !session.is_resolved() {
            return GuardOutcome::Deferred;
        }

        let input = (session.generation, normalize_path(path));
        if self.last_input.as_ref() == Some(&input) {
            return GuardOutcome::Unchanged;
        }
        let path = &self.last_input.insert(input).1;

        if session.identity.actor().is_some_and(|a| a.is_platform()) {
            return GuardOutcome::Exempt;
        }

        let Some(verdict) = self.engine.decide_identity(&session.identity, path) else {
            return GuardOutcome::Deferred;
        };
        if verdict.allowed {
            return GuardOutcome::Allowed;
        }

        if let Identity::Unrecognized { kind } = &session.identity {
            tracing::warn!(kind = %kind, path = %path, "access denied for unrecognized identity");
            return GuardOutcome::Suppressed;
        }
        if *path == self.forbidden_path {
            return GuardOutcome::Suppressed;
        }

        tracing::debug!(path = %path, reason = ?verdict.reason, "page access denied, redirecting");
        self.navigator.replace(&self.forbidden_path);
        GuardOutcome::Redirected
    }

    /// Stop acting on further evaluations
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn forbidden_path(&self) -> &str {
        &self.forbidden_path
    }
}

/// Guard driven by session and navigation changes on a tokio task
pub struct GuardTask<N> {
    controller: Arc<Mutex<GuardController<N>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl<N: Navigator + 'static> GuardTask<N> {
    /// Spawn the guard. It evaluates immediately, then again after every
    /// session write or navigation change.
    pub fn spawn(
        controller: GuardController<N>,
        mut session: SessionReader,
        mut navigation: watch::Receiver<String>,
    ) -> Self {
        let controller = Arc::new(Mutex::new(controller));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_controller = controller.clone();
        let handle = tokio::spawn(async move {
            loop {
                let snapshot = session.current_and_mark_seen();
                let path = navigation.borrow_and_update().clone();
                task_controller.lock().evaluate(&snapshot, &path);

                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    changed = session.changed() => {
                        if !changed {
                            break;
                        }
                    }
                    changed = navigation.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("guard task stopped");
        });

        Self {
            controller,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Tear down the guard. No redirect happens after this returns, even if
    /// an evaluation was in flight.
    pub async fn deactivate(mut self) {
        self.controller.lock().deactivate();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl<N> Drop for GuardTask<N> {
    fn drop(&mut self) {
        self.controller.lock().active = false;
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::session_context;
    use crate::{Actor, OrgActor, PageRequirements, PlatformActor, PlatformRole};
    use serde_json::json;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingNavigator {
        replaced: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNavigator {
        fn redirects(&self) -> Vec<String> {
            self.replaced.lock().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn replace(&self, path: &str) {
            self.replaced.lock().push(path.to_string());
        }
    }

    fn engine() -> Arc<DecisionEngine> {
        Arc::new(DecisionEngine::new(Arc::new(PageRequirements::from_pairs([
            ("/orders", "orders"),
            ("/usage", "usage-billing"),
            ("/agent", "agent"),
            ("/faqs", ""),
        ]))))
    }

    fn member(features: &[&str]) -> Actor {
        Actor::Org(OrgActor::new("u-1", "o-1", features.iter().copied()).with_vertical("clinic"))
    }

    #[test]
    fn test_single_redirect_per_navigation() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();
        writer.sign_in(member(&["orders"]));
        let snap = reader.current();

        assert_eq!(guard.evaluate(&snap, "/usage"), GuardOutcome::Redirected);
        assert_eq!(guard.evaluate(&snap, "/usage"), GuardOutcome::Unchanged);
        assert_eq!(guard.evaluate(&snap, "/usage/?tab=2"), GuardOutcome::Unchanged);
        assert_eq!(nav.redirects(), vec!["/forbidden".to_string()]);

        assert_eq!(guard.evaluate(&snap, "/orders"), GuardOutcome::Allowed);
        assert_eq!(guard.evaluate(&snap, "/usage"), GuardOutcome::Redirected);
        assert_eq!(nav.redirects().len(), 2);
    }

    #[test]
    fn test_allowed_never_redirects() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();
        writer.sign_in(member(&["orders"]));

        for _ in 0..3 {
            guard.evaluate(&reader.current(), "/orders");
            guard.evaluate(&reader.current(), "/faqs");
        }
        assert!(nav.redirects().is_empty());
    }

    #[test]
    fn test_defers_until_resolved() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();

        writer.set_loading();
        assert_eq!(guard.evaluate(&reader.current(), "/agent"), GuardOutcome::Deferred);
        assert!(nav.redirects().is_empty());

        writer.sign_in(member(&[]));
        assert_eq!(guard.evaluate(&reader.current(), "/agent"), GuardOutcome::Redirected);
        assert_eq!(nav.redirects().len(), 1);
    }

    #[test]
    fn test_platform_actor_exempt() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();
        writer.sign_in(Actor::Platform(PlatformActor {
            id: "p-1".into(),
            email: "ops@example.com".into(),
            role: PlatformRole::SuperAdmin,
        }));

        assert_eq!(guard.evaluate(&reader.current(), "/usage"), GuardOutcome::Exempt);
        assert!(nav.redirects().is_empty());
    }

    #[test]
    fn test_unrecognized_identity_no_redirect() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();
        writer.sign_in_payload(json!({ "kind": "robot", "id": "r-1" })).unwrap();

        assert_eq!(guard.evaluate(&reader.current(), "/faqs"), GuardOutcome::Suppressed);
        assert!(nav.redirects().is_empty());
    }

    #[test]
    fn test_identity_change_reevaluates() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();

        writer.sign_in(member(&["usage-billing"]));
        assert_eq!(guard.evaluate(&reader.current(), "/usage"), GuardOutcome::Allowed);

        // Entitlement revoked on profile refresh, same path
        writer.refresh(member(&[]));
        assert_eq!(guard.evaluate(&reader.current(), "/usage"), GuardOutcome::Redirected);
        assert_eq!(nav.redirects().len(), 1);
    }

    #[test]
    fn test_rejected_reauth_drops_old_entitlements() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();

        writer.sign_in(member(&["usage-billing"]));
        assert_eq!(guard.evaluate(&reader.current(), "/usage"), GuardOutcome::Allowed);

        assert!(writer.sign_in_payload(json!({ "kind": "org", "id": "u-2" })).is_err());
        assert_eq!(guard.evaluate(&reader.current(), "/usage"), GuardOutcome::Deferred);
        assert!(nav.redirects().is_empty());
    }

    #[test]
    fn test_deactivated_controller_is_inert() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();
        writer.sign_in(member(&[]));

        guard.deactivate();
        assert_eq!(guard.evaluate(&reader.current(), "/agent"), GuardOutcome::Inactive);
        assert!(nav.redirects().is_empty());
    }

    #[test]
    fn test_clinic_scenario() {
        let nav = RecordingNavigator::default();
        let mut guard = GuardController::new(engine(), nav.clone());
        let (writer, reader) = session_context();
        writer.sign_in(member(&[]));

        assert_eq!(guard.evaluate(&reader.current(), "/agent"), GuardOutcome::Redirected);
        assert_eq!(guard.evaluate(&reader.current(), "/faqs"), GuardOutcome::Allowed);
        assert_eq!(nav.redirects(), vec!["/forbidden".to_string()]);
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_task_follows_navigation() {
        let nav = RecordingNavigator::default();
        let (writer, reader) = session_context();
        let (nav_tx, nav_rx) = watch::channel("/faqs".to_string());

        writer.set_loading();
        let task = GuardTask::spawn(GuardController::new(engine(), nav.clone()), reader, nav_rx);
        settle().await;

        nav_tx.send("/agent".to_string()).unwrap();
        settle().await;
        assert!(nav.redirects().is_empty(), "must wait for hydration");

        writer.sign_in(member(&[]));
        settle().await;
        assert_eq!(nav.redirects().len(), 1);

        nav_tx.send("/faqs".to_string()).unwrap();
        settle().await;
        assert_eq!(nav.redirects().len(), 1);

        task.deactivate().await;

        let _ = nav_tx.send("/usage".to_string());
        settle().await;
        assert_eq!(nav.redirects().len(), 1);
    }
}
