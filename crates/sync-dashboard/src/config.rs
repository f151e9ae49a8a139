//! # Dashboard Configuration
//!
//! Everything the dashboard needs to start: where the API lives, the session token,
//! and one [`SyncConfig`] per synchronized view. Deserializable with every field
//! optional; environment variables override on top.
//!
//! | Variable | Field |
//! |---|---|
//! | `DASHBOARD_API_BASE` | `api_base` |
//! | `DASHBOARD_ACCESS_TOKEN` | `access_token` |

use serde::Deserialize;
use sync_framework::{CacheConfig, SortDirection, SyncConfig};

pub const API_BASE_VAR: &str = "DASHBOARD_API_BASE";
pub const ACCESS_TOKEN_VAR: &str = "DASHBOARD_ACCESS_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base: String,
    pub access_token: Option<String>,
    pub news: SyncConfig,
    pub sectors: SyncConfig,
    pub lookups: CacheConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/api".to_string(),
            access_token: None,
            news: SyncConfig::default(),
            sectors: SyncConfig {
                page_limit: 50,
                order_by: "name".to_string(),
                order_direction: SortDirection::Asc,
                ..SyncConfig::default()
            },
            lookups: CacheConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults with the process environment applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(base) = read(API_BASE_VAR) {
            self.api_base = base;
        }
        if let Some(token) = read(ACCESS_TOKEN_VAR) {
            self.access_token = Some(token);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.news.page_limit, 20);
        assert_eq!(config.sectors.page_limit, 50);
        assert_eq!(config.sectors.order_by, "name");
        assert_eq!(config.lookups.ttl_ms, 300_000);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{ "api_base": "https://api.example.org", "news": { "debounce_ms": 500 } }"#,
        )
        .unwrap();
        assert_eq!(config.api_base, "https://api.example.org");
        assert_eq!(config.news.debounce_ms, 500);
        assert_eq!(config.news.page_limit, 20);
        assert_eq!(config.sectors.page_limit, 50);
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (API_BASE_VAR, "https://staging.example.org/api"),
            (ACCESS_TOKEN_VAR, "tok-123"),
        ]);
        let config =
            DashboardConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_base, "https://staging.example.org/api");
        assert_eq!(config.access_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_blank_environment_values_are_ignored() {
        let config = DashboardConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert!(config.access_token.is_none());
    }
}
