//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use yac_consensus::VoteStorageConfig;
use yac_ordering::SynchronizerConfig;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration of the agreement core.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,yac_ordering=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to register Prometheus metrics.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Retention limits of the vote storage.
    #[serde(default)]
    pub vote_storage: VoteStorageConfig,

    /// Ordering gate settings.
    #[serde(default)]
    pub synchronizer: SynchronizerConfig,
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NodeConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Parsed `log_format`.
    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            vote_storage: VoteStorageConfig::default(),
            synchronizer: SynchronizerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.vote_storage.max_rounds, 128);
        assert_eq!(config.synchronizer.max_pending, 1024);
        assert_eq!(config.synchronizer.starting_height, 0);
        assert_eq!(config.log_format, "human");
        assert!(!config.enable_metrics);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            enable_metrics = true

            [synchronizer]
            starting_height = 42

            [vote_storage]
            max_rounds = 16
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert!(config.enable_metrics);
        assert_eq!(config.synchronizer.starting_height, 42);
        assert_eq!(config.synchronizer.max_pending, 1024);
        assert_eq!(config.vote_storage.max_rounds, 16);
        assert_eq!(config.vote_storage.max_equivocation_proofs, 1024);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = NodeConfig::from_toml_str("enable_metrics = \"yes\"").unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let config = NodeConfig {
            log_format: "xml".into(),
            ..NodeConfig::default()
        };
        assert!(config.log_format().is_err());
        assert_eq!(NodeConfig::default().log_format().unwrap(), LogFormat::Human);
    }
}
