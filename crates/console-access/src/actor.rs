//! Actor Data Model
//!
//! An actor is either a platform operator or a member of a tenant
//! organization. Feature lists and organization data only exist on the
//! member variant, so callers must narrow before reading them.

use crate::{AccessError, AccessResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// Platform operator, exempt from tenant feature gating
    Platform(PlatformActor),
    /// Tenant organization member
    Org(OrgActor),
}

impl Actor {
    /// Decode an actor from a session payload.
    ///
    /// A payload whose `kind` is neither `platform` nor `org` is reported as
    /// [`AccessError::UnrecognizedActor`] rather than a generic decode error.
    pub fn from_json(value: serde_json::Value) -> AccessResult<Self> {
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();

        match kind {
            "platform" | "org" => Ok(serde_json::from_value(value)?),
            other => Err(AccessError::UnrecognizedActor(other.to_string())),
        }
    }

    /// Actor ID
    pub fn id(&self) -> &str {
        match self {
            Self::Platform(p) => &p.id,
            Self::Org(o) => &o.id,
        }
    }

    /// Narrow to the org member variant
    pub fn as_org(&self) -> Option<&OrgActor> {
        match self {
            Self::Org(o) => Some(o),
            Self::Platform(_) => None,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, Self::Platform(_))
    }
}

/// Platform operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformActor {
    pub id: String,
    pub email: String,
    pub role: PlatformRole,
}

/// Platform operator role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    SuperAdmin,
    Support,
}

/// Organization member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgActor {
    pub id: String,
    pub org_id: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub role_name: String,
    pub status: MemberStatus,
    /// Feature keys granted to this member
    #[serde(default)]
    pub features: HashSet<String>,
    #[serde(default)]
    pub organization: Option<Organization>,
}

impl OrgActor {
    /// Create an active, non-admin member with the given features
    pub fn new<I, S>(id: &str, org_id: &str, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            org_id: org_id.to_string(),
            is_admin: false,
            role_name: "member".to_string(),
            status: MemberStatus::Active,
            features: features.into_iter().map(Into::into).collect(),
            organization: None,
        }
    }

    /// Attach organization data with the given vertical
    pub fn with_vertical(mut self, vertical_key: &str) -> Self {
        let org = self.organization.get_or_insert_with(Organization::default);
        org.vertical_key = Some(vertical_key.to_string());
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Industry vertical of the member's organization, if known
    pub fn vertical(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .and_then(|o| o.vertical_key.as_deref())
    }
}

/// Membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Invited,
    Suspended,
}

/// Organization summary carried on a member session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vertical_key: Option<String>,
    #[serde(default)]
    pub status: OrganizationStatus,
}

/// Organization lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    #[default]
    Active,
    Trial,
    Suspended,
    #[serde(other)]
    Other,
}
