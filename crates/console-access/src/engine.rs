//! Access decision engine

use crate::policy::{AccessPolicy, AccessVerdict, DenyReason, FeatureOnly, PolicyKind};
use crate::session::Identity;
use crate::{Actor, PageRequirements};
use std::sync::Arc;

/// Decide with the default feature-only policy
pub fn decide(actor: &Actor, path: &str, pages: &PageRequirements) -> AccessVerdict {
    FeatureOnly.decide(actor, path, pages)
}

/// Page access engine
///
/// Holds the page registry and the selected policy. Decisions are pure:
/// the same actor and path always produce the same verdict.
pub struct DecisionEngine {
    pages: Arc<PageRequirements>,
    policy: Box<dyn AccessPolicy>,
}

impl DecisionEngine {
    /// Create engine with the default policy
    pub fn new(pages: Arc<PageRequirements>) -> Self {
        Self::with_policy(pages, PolicyKind::default().build())
    }

    pub fn with_policy(pages: Arc<PageRequirements>, policy: Box<dyn AccessPolicy>) -> Self {
        Self { pages, policy }
    }

    /// Decide whether `actor` may view `path`
    #[inline]
    pub fn decide(&self, actor: &Actor, path: &str) -> AccessVerdict {
        self.policy.decide(actor, path, &self.pages)
    }

    /// Decide for a session identity.
    ///
    /// Returns `None` while no identity is resolved. An unrecognized
    /// identity is denied.
    pub fn decide_identity(&self, identity: &Identity, path: &str) -> Option<AccessVerdict> {
        match identity {
            Identity::Absent => None,
            Identity::Actor(actor) => Some(self.decide(actor, path)),
            Identity::Unrecognized { .. } => {
                Some(AccessVerdict::deny(DenyReason::UnrecognizedIdentity))
            }
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn pages(&self) -> &Arc<PageRequirements> {
        &self.pages
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("pages", &self.pages.len())
            .field("policy", &self.policy.name())
            .finish()
    }
}
