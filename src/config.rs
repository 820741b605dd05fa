//! Generator configuration and network presets.
//!
//! Network labels are cosmetic. EVM addresses are the same on every chain,
//! so the selected network never changes derived keys or addresses.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keys::MnemonicLength;
use crate::path::{PathTemplate, DEFAULT_PATH_TEMPLATE};

/// Default upper bound on a single batch.
pub const MAX_WALLET_COUNT: usize = 10_000;

/// A display-only network entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPreset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub is_custom: bool,
}

impl NetworkPreset {
    fn preset(name: &str, rpc_url: &str, chain_id: u64) -> Self {
        Self {
            name: name.to_string(),
            rpc_url: Some(rpc_url.to_string()),
            chain_id: Some(chain_id),
            is_custom: false,
        }
    }
}

/// Built-in EVM presets plus a custom entry.
pub fn preset_networks() -> Vec<NetworkPreset> {
    vec![
        NetworkPreset::preset("Ethereum", "https://rpc.ankr.com/eth", 1),
        NetworkPreset::preset("BNB Smart Chain", "https://rpc.ankr.com/bsc", 56),
        NetworkPreset::preset("Polygon", "https://rpc.ankr.com/polygon", 137),
        NetworkPreset::preset("Arbitrum One", "https://rpc.ankr.com/arbitrum", 42161),
        NetworkPreset::preset("Optimism", "https://rpc.ankr.com/optimism", 10),
        NetworkPreset::preset("Sepolia Testnet", "https://rpc.ankr.com/eth_sepolia", 11_155_111),
        NetworkPreset {
            name: "Custom Network / RPC".to_string(),
            rpc_url: None,
            chain_id: None,
            is_custom: true,
        },
    ]
}

/// Basic RPC URL format check. No connection is attempted.
pub fn validate_rpc_url(url: &str) -> bool {
    !url.is_empty() && (url.starts_with("http://") || url.starts_with("https://"))
}

/// Everything the generator reads, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub max_wallet_count: usize,
    pub derivation_path_template: String,
    pub mnemonic_length: MnemonicLength,
    pub networks: Vec<NetworkPreset>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_wallet_count: MAX_WALLET_COUNT,
            derivation_path_template: DEFAULT_PATH_TEMPLATE.to_string(),
            mnemonic_length: MnemonicLength::default(),
            networks: preset_networks(),
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON config file; missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_wallet_count == 0 {
            return Err(ConfigError::Invalid("max_wallet_count must be at least 1".into()));
        }
        PathTemplate::parse(&self.derivation_path_template).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        for network in &self.networks {
            if let Some(url) = &network.rpc_url {
                if !validate_rpc_url(url) {
                    return Err(ConfigError::Invalid(format!(
                        "network '{}' has an invalid rpc url, expected http:// or https://",
                        network.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up a network by case-insensitive name.
    pub fn network(&self, name: &str) -> Option<&NetworkPreset> {
        self.networks.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.max_wallet_count, 10_000);
        assert_eq!(config.network("polygon").unwrap().chain_id, Some(137));
        assert!(config.networks.iter().any(|n| n.is_custom));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "max_wallet_count": 50, "mnemonic_length": 24 }"#).unwrap();
        assert_eq!(config.max_wallet_count, 50);
        assert_eq!(config.mnemonic_length, MnemonicLength::Words24);
        assert_eq!(config.derivation_path_template, DEFAULT_PATH_TEMPLATE);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GeneratorConfig { max_wallet_count: 0, ..Default::default() };
        assert!(config.validate().is_err());

        config.max_wallet_count = 10;
        config.derivation_path_template = "m/44'/60'/0'/0/0".into();
        assert!(config.validate().is_err());

        config.derivation_path_template = DEFAULT_PATH_TEMPLATE.into();
        config.networks[0].rpc_url = Some("ftp://example".into());
        assert!(config.validate().is_err());

        assert!(serde_json::from_str::<GeneratorConfig>(r#"{ "mnemonic_length": 13 }"#).is_err());
    }

    #[test]
    fn test_rpc_url() {
        assert!(validate_rpc_url("https://rpc.ankr.com/eth"));
        assert!(validate_rpc_url("http://localhost:8545"));
        assert!(!validate_rpc_url(""));
        assert!(!validate_rpc_url("ws://localhost:8546"));
    }
}
