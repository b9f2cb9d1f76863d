//! Access policies
//!
//! Two interchangeable strategies decide whether an org member may open a
//! page. Platform actors and public pages are allowed by both.

use crate::{Actor, OrgActor, PageRequirements};
use serde::{Deserialize, Serialize};

/// Allow/deny outcome for one actor and path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessVerdict {
    pub allowed: bool,
    /// Why access was denied; always `None` when allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl AccessVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Reason attached to a denial, for logs only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenyReason {
    /// Member lacks the page's feature key
    MissingFeature { feature: String },
    /// Member's organization vertical may not open the page
    VerticalNotEntitled { vertical: Option<String> },
    /// Identity was not one of the known actor kinds
    UnrecognizedIdentity,
}

/// Strategy combining actor attributes with page requirements
pub trait AccessPolicy: Send + Sync {
    /// Short name used in logs and config
    fn name(&self) -> &'static str;

    /// Decide for an org member on a page that requires `feature`.
    ///
    /// Called only after platform actors and public pages have been
    /// allowed, so `feature` is never empty.
    fn decide_member(
        &self,
        member: &OrgActor,
        path: &str,
        feature: &str,
        pages: &PageRequirements,
    ) -> AccessVerdict;

    /// Full decision for any actor
    fn decide(&self, actor: &Actor, path: &str, pages: &PageRequirements) -> AccessVerdict {
        let member = match actor {
            Actor::Platform(_) => return AccessVerdict::allow(),
            Actor::Org(member) => member,
        };

        match pages.required_feature(path) {
            None => AccessVerdict::allow(),
            Some(feature) => self.decide_member(member, path, feature, pages),
        }
    }
}

fn feature_check(member: &OrgActor, feature: &str) -> AccessVerdict {
    if member.has_feature(feature) {
        AccessVerdict::allow()
    } else {
        AccessVerdict::deny(DenyReason::MissingFeature {
            feature: feature.to_string(),
        })
    }
}

/// Allowed iff the member holds the page's feature key
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureOnly;

impl AccessPolicy for FeatureOnly {
    fn name(&self) -> &'static str {
        "feature_only"
    }

    fn decide_member(
        &self,
        member: &OrgActor,
        _path: &str,
        feature: &str,
        _pages: &PageRequirements,
    ) -> AccessVerdict {
        feature_check(member, feature)
    }
}

/// Vertical restriction first, then admin override, then feature key
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOverrideWithVertical;

impl AccessPolicy for AdminOverrideWithVertical {
    fn name(&self) -> &'static str {
        "admin_override_with_vertical"
    }

    fn decide_member(
        &self,
        member: &OrgActor,
        path: &str,
        feature: &str,
        pages: &PageRequirements,
    ) -> AccessVerdict {
        if let Some(permitted) = pages.permitted_verticals(path) {
            let vertical = member.vertical();
            if !vertical.is_some_and(|v| permitted.contains(v)) {
                return AccessVerdict::deny(DenyReason::VerticalNotEntitled {
                    vertical: vertical.map(str::to_string),
                });
            }
        }

        if member.is_admin {
            return AccessVerdict::allow();
        }

        feature_check(member, feature)
    }
}

/// Policy selector used in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    FeatureOnly,
    AdminOverrideWithVertical,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn AccessPolicy> {
        match self {
            Self::FeatureOnly => Box::new(FeatureOnly),
            Self::AdminOverrideWithVertical => Box::new(AdminOverrideWithVertical),
        }
    }
}
