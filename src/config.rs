// ⚙️ Configuration
// Gateway endpoint settings and the engine's filtering/ordering knobs.
//
// Every field has a default, so a JSON file only needs the keys it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Public ESI endpoint
pub const ESI_BASE_URL: &str = "https://esi.evetech.net/latest";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!("affiliation-history/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SYSTEM-OPERATED RANGE
// ============================================================================

/// Closed ID range reserved for groups run by the game itself (NPC corporations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemOperatedRange {
    pub min: i64,
    pub max: i64,
}

impl SystemOperatedRange {
    pub const NPC_CORPORATIONS: SystemOperatedRange = SystemOperatedRange {
        min: 1_000_000,
        max: 2_000_000,
    };

    pub fn contains(&self, id: i64) -> bool {
        self.min <= id && id <= self.max
    }
}

impl Default for SystemOperatedRange {
    fn default() -> Self {
        Self::NPC_CORPORATIONS
    }
}

// ============================================================================
// FEED ORDER
// ============================================================================

/// Chronological order of the raw history arrays returned by a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FeedOrder {
    /// Most recent period is the last element
    #[default]
    OldestFirst,

    /// Most recent period is the first element
    NewestFirst,
}

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: ESI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub system_operated: SystemOperatedRange,

    /// Overrides the order the gateway declares; `None` trusts the gateway
    pub feed_order: Option<FeedOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config JSON")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_operated_bounds_are_inclusive() {
        let range = SystemOperatedRange::NPC_CORPORATIONS;

        assert!(range.contains(1_000_000));
        assert!(range.contains(1_500_000));
        assert!(range.contains(2_000_000));
        assert!(!range.contains(999_999));
        assert!(!range.contains(2_000_001));
        assert!(!range.contains(98_000_001));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{"gateway": {"timeout_secs": 5}, "engine": {"feed_order": "newest-first"}}"#,
        )
        .unwrap();

        assert_eq!(config.gateway.timeout_secs, 5);
        assert_eq!(config.gateway.base_url, ESI_BASE_URL);
        assert_eq!(config.engine.feed_order, Some(FeedOrder::NewestFirst));
        assert_eq!(config.engine.system_operated, SystemOperatedRange::NPC_CORPORATIONS);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = AppConfig::from_json("{}").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine.feed_order, None);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
