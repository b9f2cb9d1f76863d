//! Portal Configuration

use console_access::{AccessError, DecisionEngine, PageRequirements, PolicyKind, DEFAULT_FORBIDDEN_PATH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Env var naming the config file
pub const CONFIG_ENV: &str = "CONSOLE_PORTAL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "console-portal.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Access(#[from] AccessError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub listen_addr: String,
    /// Redirect target for denied pages
    pub forbidden_path: String,
    pub policy: PolicyKind,
    /// Keepalive interval on `/ws`
    pub heartbeat_secs: u64,
    /// Feature-gated pages; every gated route must be listed
    pub pages: BTreeMap<String, String>,
    /// Verticals allowed on a page (vertical-aware policy only)
    pub page_verticals: BTreeMap<String, Vec<String>>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            forbidden_path: DEFAULT_FORBIDDEN_PATH.to_string(),
            policy: PolicyKind::default(),
            heartbeat_secs: 30,
            pages: BTreeMap::new(),
            page_verticals: BTreeMap::new(),
        }
    }
}

impl PortalConfig {
    /// Load from the file named by `CONSOLE_PORTAL_CONFIG`
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load(&path)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn page_requirements(&self) -> Result<PageRequirements, ConfigError> {
        let mut pages = PageRequirements::from_pairs(&self.pages);
        for (path, verticals) in &self.page_verticals {
            pages.restrict_verticals(path, verticals.iter().cloned())?;
        }
        Ok(pages)
    }

    pub fn build_engine(&self) -> Result<DecisionEngine, ConfigError> {
        let pages = Arc::new(self.page_requirements()?);
        Ok(DecisionEngine::with_policy(pages, self.policy.build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_access::{Actor, OrgActor};

    const SAMPLE: &str = r#"
listen_addr = "127.0.0.1:9000"
policy = "admin_override_with_vertical"

[pages]
"/orders" = "orders"
"/usage" = "usage-billing"
"/agent" = "agent"
"/faqs" = ""

[page_verticals]
"/agent" = ["clinic"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = PortalConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.forbidden_path, "/forbidden");
        assert_eq!(config.heartbeat_secs, 30);
        assert_eq!(config.policy, PolicyKind::AdminOverrideWithVertical);

        let engine = config.build_engine().unwrap();
        assert_eq!(engine.policy_name(), "admin_override_with_vertical");

        let retail = Actor::Org(OrgActor::new("u-1", "o-1", ["agent"]).with_vertical("retail"));
        let clinic = Actor::Org(OrgActor::new("u-2", "o-1", ["agent"]).with_vertical("clinic"));
        assert!(!engine.decide(&retail, "/agent").allowed);
        assert!(engine.decide(&clinic, "/agent").allowed);
        assert!(engine.decide(&retail, "/faqs").allowed);
    }

    #[test]
    fn test_defaults() {
        let config = PortalConfig::parse("").unwrap();
        assert_eq!(config.policy, PolicyKind::FeatureOnly);
        assert!(config.page_requirements().unwrap().is_empty());
    }

    #[test]
    fn test_vertical_on_public_page_rejected() {
        let config = PortalConfig::parse(
            r#"
[pages]
"/faqs" = ""

[page_verticals]
"/faqs" = ["clinic"]
"#,
        )
        .unwrap();
        assert!(matches!(config.build_engine(), Err(ConfigError::Access(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = PortalConfig::load(Path::new("/nonexistent/console-portal.toml")).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_policy() {
        assert!(matches!(
            PortalConfig::parse(r#"policy = "open_bar""#),
            Err(ConfigError::Parse(_))
        ));
    }
}
