//! Tenant Console Access Control
//!
//! Decides whether an authenticated actor may view a console page and
//! enforces the verdict on navigation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     SESSION CONTEXT                          │
//! │   SessionWriter (auth subsystem) ──► SessionReader (many)    │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ identity + generation
//! ┌──────────────┐     ┌─────────▼────────┐     ┌──────────────┐
//! │    Page      │────►│ Decision Engine  │◄────│ AccessPolicy │
//! │ Requirements │     │ decide(actor,    │     │ FeatureOnly /│
//! │ path→feature │     │        path)     │     │ AdminOverride│
//! └──────────────┘     └─────────┬────────┘     └──────────────┘
//!                                │ verdict
//!                      ┌─────────▼────────┐
//!                      │ Guard Controller │──► Navigator::replace
//!                      └──────────────────┘       ("/forbidden")
//! ```
//!
//! Unmapped paths are public. Any new feature-gated route must be added to
//! the [`PageRequirements`] table or it silently becomes reachable.

pub mod actor;
pub mod engine;
pub mod error;
pub mod guard;
pub mod policy;
pub mod registry;
pub mod session;

pub use actor::{Actor, MemberStatus, OrgActor, Organization, OrganizationStatus, PlatformActor, PlatformRole};
pub use engine::{decide, DecisionEngine};
pub use error::{AccessError, AccessResult};
pub use guard::{GuardController, GuardOutcome, GuardTask, Navigator, DEFAULT_FORBIDDEN_PATH};
pub use policy::{AccessPolicy, AccessVerdict, AdminOverrideWithVertical, DenyReason, FeatureOnly, PolicyKind};
pub use registry::{normalize_path, PageRequirements};
pub use session::{session_context, Identity, SessionReader, SessionSnapshot, SessionWriter};
