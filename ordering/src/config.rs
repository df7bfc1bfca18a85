use serde::{Deserialize, Serialize};
use yac_types::Height;

/// Settings of the ordering gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizerConfig {
    /// Height of the last block already committed when the node starts.
    #[serde(default)]
    pub starting_height: Height,

    /// Maximum number of proposals waiting for release.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
}

fn default_max_pending() -> usize {
    1024
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            starting_height: 0,
            max_pending: default_max_pending(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config: SynchronizerConfig = toml::from_str("").unwrap();
        assert_eq!(config, SynchronizerConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config: SynchronizerConfig = toml::from_str("starting_height = 12").unwrap();
        assert_eq!(config.starting_height, 12);
        assert_eq!(config.max_pending, 1024);
    }
}
