//! # Configuration
//!
//! Tunables for a controller and for the shared lookup cache. Both types deserialize
//! from JSON with every field optional, so a deployment only spells out what it changes:
//!
//! ```rust
//! use sync_framework::config::{OverlapPolicy, SyncConfig};
//!
//! let config: SyncConfig = serde_json::from_str(r#"{ "debounce_ms": 150, "overlap": "supersede" }"#).unwrap();
//! assert_eq!(config.debounce_ms, 150);
//! assert_eq!(config.overlap, OverlapPolicy::Supersede);
//! assert_eq!(config.max_retries, 3);
//! ```

use crate::query::SortDirection;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// What to do with a fetch that arrives while another is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Drop the newcomer. A later trigger will naturally supersede it.
    #[default]
    Drop,
    /// Cancel the in-flight fetch and issue the newcomer.
    Supersede,
}

/// Which failures the retry executor retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOn {
    /// Every non-fatal failure, including 4xx and `success: false`.
    #[default]
    Any,
    /// Only network errors, timeouts and 5xx responses.
    Transient,
}

/// Per-controller configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub page_limit: u32,
    pub debounce_ms: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub timeout_ms: u64,
    pub retry_on: RetryOn,
    pub overlap: OverlapPolicy,
    /// Filter keys whose changes skip the debounce gate.
    pub immediate_filters: BTreeSet<String>,
    pub fetch_on_start: bool,
    pub order_by: String,
    pub order_direction: SortDirection,
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_limit: 20,
            debounce_ms: 300,
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 5_000,
            timeout_ms: 10_000,
            retry_on: RetryOn::Any,
            overlap: OverlapPolicy::Drop,
            immediate_filters: BTreeSet::from(["category".to_string()]),
            fetch_on_start: true,
            order_by: "created_at".to_string(),
            order_direction: SortDirection::Desc,
            channel_capacity: 32,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_immediate_filter(&self, key: &str) -> bool {
        self.immediate_filters.contains(key)
    }
}

/// Configuration for a [`TtlCache`](crate::cache::TtlCache).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_ms: 5 * 60 * 1_000 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.page_limit, 20);
        assert!(config.is_immediate_filter("category"));
        assert!(!config.is_immediate_filter("search"));
        assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_json() {
        let config: SyncConfig = serde_json::from_str(
            r#"{ "retry_on": "transient", "immediate_filters": ["sector", "category"] }"#,
        )
        .unwrap();
        assert_eq!(config.retry_on, RetryOn::Transient);
        assert!(config.is_immediate_filter("sector"));
        assert_eq!(config.timeout_ms, 10_000);
    }
}
