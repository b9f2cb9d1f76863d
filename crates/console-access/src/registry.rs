//! Page requirement registry
//!
//! Static lookup from a navigable path to the feature key needed to view it.
//! Paths are matched exactly after normalization; anything unmapped is
//! public, so every feature-gated route must be registered here.

use crate::{AccessError, AccessResult};
use std::collections::{HashMap, HashSet};

/// Read-only path → requirement table
#[derive(Debug, Clone, Default)]
pub struct PageRequirements {
    features: HashMap<String, String>,
    verticals: HashMap<String, HashSet<String>>,
}

impl PageRequirements {
    /// Create empty registry (every page public)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(path, feature)` pairs. Empty feature keys mark the path
    /// as explicitly public.
    pub fn from_pairs<I, P, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, F)>,
        P: AsRef<str>,
        F: Into<String>,
    {
        let mut registry = Self::new();
        for (path, feature) in pairs {
            registry.insert(path.as_ref(), feature);
        }
        registry
    }

    /// Register the feature a page requires
    pub fn insert(&mut self, path: &str, feature: impl Into<String>) {
        self.features.insert(normalize_path(path), feature.into());
    }

    /// Restrict a page to organizations in the given verticals.
    ///
    /// Only consulted by policies that check verticals; a restriction on a
    /// page that has no feature requirement is rejected because such a page
    /// is public for every policy.
    pub fn restrict_verticals<I, S>(&mut self, path: &str, verticals: I) -> AccessResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = normalize_path(path);
        if self.required_feature(&path).is_none() {
            return Err(AccessError::InvalidRequirement {
                path,
                reason: "vertical restriction on a public page".to_string(),
            });
        }
        self.verticals
            .entry(path)
            .or_default()
            .extend(verticals.into_iter().map(Into::into));
        Ok(())
    }

    /// Feature required for `path`, or `None` for a public page
    pub fn required_feature(&self, path: &str) -> Option<&str> {
        self.features
            .get(&normalize_path(path))
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }

    /// Verticals permitted on `path`, or `None` when unrestricted
    pub fn permitted_verticals(&self, path: &str) -> Option<&HashSet<String>> {
        self.verticals
            .get(&normalize_path(path))
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Normalize a navigation target for lookup: drop query and fragment,
/// trim trailing slashes, keep `/` for the root.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PageRequirements {
        PageRequirements::from_pairs([
            ("/orders", "orders"),
            ("/usage", "usage-billing"),
            ("/agent", "agent"),
            ("/faqs", ""),
        ])
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/orders"), "/orders");
        assert_eq!(normalize_path("/orders/"), "/orders");
        assert_eq!(normalize_path("/orders?page=2"), "/orders");
        assert_eq!(normalize_path("/orders/#top"), "/orders");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/?tab=1"), "/");
    }

    #[test]
    fn test_lookup() {
        let reg = registry();
        assert_eq!(reg.required_feature("/orders"), Some("orders"));
        assert_eq!(reg.required_feature("/orders/?sort=asc"), Some("orders"));
        assert_eq!(reg.required_feature("/usage"), Some("usage-billing"));
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn test_empty_and_unmapped_are_public() {
        let reg = registry();
        assert_eq!(reg.required_feature("/faqs"), None);
        assert_eq!(reg.required_feature("/settings"), None);
        // Exact match only, no prefix semantics
        assert_eq!(reg.required_feature("/orders/42"), None);
    }

    #[test]
    fn test_vertical_restrictions() {
        let mut reg = registry();
        reg.restrict_verticals("/agent", ["clinic", "retail"]).unwrap();

        let verticals = reg.permitted_verticals("/agent/").unwrap();
        assert!(verticals.contains("clinic"));
        assert!(reg.permitted_verticals("/orders").is_none());

        let err = reg.restrict_verticals("/faqs", ["clinic"]).unwrap_err();
        assert!(matches!(err, AccessError::InvalidRequirement { .. }));
    }
}
