//! Launch Configuration
//!
//! Token parameters and chain settings, loaded from TOML. Every field has a
//! default, so an empty file describes the canonical launch.

use std::path::Path;

use anyhow::{Context, Result};
use lib_tokens::{GenesisParams, GENESIS_DECIMALS, GENESIS_WHOLE_TOKENS};
use lib_types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

use crate::execution::DEFAULT_GAS_LIMIT;

/// Largest supported decimals; 10^36 still leaves room in a u128 for supply
pub const MAX_DECIMALS: u8 = 36;

/// Configuration validation error
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid launch configuration: {0}")]
    Invalid(String),

    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] toml::de::Error),
}

/// `[token]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Supply in whole tokens, scaled by `10^decimals`
    pub supply_whole_tokens: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        let params = GenesisParams::default();
        Self {
            name: params.name,
            symbol: params.symbol,
            decimals: GENESIS_DECIMALS,
            supply_whole_tokens: GENESIS_WHOLE_TOKENS as u64,
        }
    }
}

/// `[chain]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Timestamp of block 0
    pub genesis_timestamp: Timestamp,
    /// Seconds between consecutive blocks
    pub block_interval_secs: u64,
    /// Gas budget of every transaction
    pub gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            genesis_timestamp: 1_600_000_000,
            block_interval_secs: 13,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

/// Complete launch configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub token: TokenConfig,
    pub chain: ChainConfig,
}

impl LaunchConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LaunchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read launch config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid launch config {}", path.display()))?;

        tracing::info!(
            "Loaded launch config from {}: {} ({}), {} whole tokens",
            path.display(),
            config.token.name,
            config.token.symbol,
            config.token.supply_whole_tokens
        );
        Ok(config)
    }

    /// Total supply in base units: `supply_whole_tokens * 10^decimals`
    pub fn total_supply(&self) -> Result<Amount, ConfigError> {
        let scale = 10u128
            .checked_pow(u32::from(self.token.decimals))
            .ok_or_else(|| ConfigError::Invalid(format!("decimals {} overflow", self.token.decimals)))?;
        Amount::from(self.token.supply_whole_tokens)
            .checked_mul(scale)
            .ok_or_else(|| ConfigError::Invalid("total supply overflows".to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let token = &self.token;
        if token.name.trim().is_empty() {
            return Err(ConfigError::Invalid("token name is empty".to_string()));
        }
        if token.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("token symbol is empty".to_string()));
        }
        if token.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "decimals {} exceed maximum {}",
                token.decimals, MAX_DECIMALS
            )));
        }
        if token.supply_whole_tokens == 0 {
            return Err(ConfigError::Invalid("supply must be non-zero".to_string()));
        }
        self.total_supply()?;

        if self.chain.block_interval_secs == 0 {
            return Err(ConfigError::Invalid("block interval must be non-zero".to_string()));
        }
        if self.chain.gas_limit == 0 {
            return Err(ConfigError::Invalid("gas limit must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Token construction parameters
    pub fn genesis_params(&self) -> Result<GenesisParams, ConfigError> {
        Ok(GenesisParams {
            name: self.token.name.clone(),
            symbol: self.token.symbol.clone(),
            decimals: self.token.decimals,
            supply: self.total_supply()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_tokens::GENESIS_SUPPLY;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_canonical() {
        let config = LaunchConfig::from_toml_str("").unwrap();

        assert_eq!(config, LaunchConfig::default());
        assert_eq!(config.total_supply().unwrap(), GENESIS_SUPPLY);
        assert_eq!(config.genesis_params().unwrap(), GenesisParams::default());
        assert_eq!(config.chain.block_interval_secs, 13);
    }

    #[test]
    fn test_partial_sections() {
        let config = LaunchConfig::from_toml_str(
            r#"
            [token]
            symbol = "TST"
            supply_whole_tokens = 300

            [chain]
            gas_limit = 50000
            "#,
        )
        .unwrap();

        assert_eq!(config.token.symbol, "TST");
        assert_eq!(config.token.name, "Growth Token");
        assert_eq!(config.total_supply().unwrap(), 300 * 10u128.pow(18));
        assert_eq!(config.chain.gas_limit, 50_000);
        assert_eq!(config.chain.genesis_timestamp, 1_600_000_000);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            "[token]\nsupply_whole_tokens = 0",
            "[token]\ndecimals = 37",
            "[token]\nname = \"\"",
            "[token]\nsymbol = \"  \"",
            "[chain]\nblock_interval_secs = 0",
            "[chain]\ngas_limit = 0",
            "[token]\ndecimals = 36\nsupply_whole_tokens = 18446744073709551615",
        ];
        for case in cases {
            let result = LaunchConfig::from_toml_str(case);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "accepted: {}", case);
        }
    }

    #[test]
    fn test_parse_error() {
        let result = LaunchConfig::from_toml_str("[token\nname = 1");
        assert!(matches!(result, Err(ConfigError::Parsing(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[token]\nname = \"Test\"\nsymbol = \"T\"\ndecimals = 6").unwrap();

        let config = LaunchConfig::load(file.path()).unwrap();

        assert_eq!(config.token.decimals, 6);
        assert_eq!(config.total_supply().unwrap(), 100_000_000 * 1_000_000);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = LaunchConfig::load(&path).unwrap_err();

        assert!(err.to_string().contains("missing.toml"));
    }
}
