//! Token configuration file (TOML)
//!
//! Example:
//!
//! ```toml
//! [token]
//! name = "Surge"
//! symbol = "SURGE"
//! initial_price = 10000
//! deployed_at = 1700000000
//!
//! [roles]
//! owner = "0x..."
//! beneficiary = "0x..."
//! contract = "0x..."
//! pool_manager = "0x..."
//!
//! [distribution]
//! beneficiary_ratio = 500
//! liquidity_ratio = 500
//! beneficiary_policy = "strict"
//!
//! [liquidity]
//! fee_tier = 3000
//! tick_spacing = 60
//! starting_ratio = 1
//! unprovisioned = "hold"
//! rollback_failed_provision = true
//!
//! [harvest]
//! interval_secs = 3600
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use surge_core::Address;
use surge_economics::constants::{
    DEFAULT_BENEFICIARY_RATIO, DEFAULT_HARVEST_INTERVAL_SECS, DEFAULT_LIQUIDITY_RATIO,
    INITIAL_PRICE,
};
use surge_economics::DistributionConfig;
use surge_liquidity::{PoolKey, DEFAULT_FEE_TIER, DEFAULT_TICK_SPACING};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// What happens when the beneficiary payout is rejected
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BeneficiaryPolicy {
    /// The whole purchase fails
    #[default]
    Strict,
    /// The share is added to the liquidity share
    Lenient,
}

impl fmt::Display for BeneficiaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeneficiaryPolicy::Strict => write!(f, "strict"),
            BeneficiaryPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for BeneficiaryPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(BeneficiaryPolicy::Strict),
            "lenient" => Ok(BeneficiaryPolicy::Lenient),
            other => Err(ConfigError::Invalid(format!(
                "unknown beneficiary policy '{}'",
                other
            ))),
        }
    }
}

/// What happens to the liquidity share before the pool exists
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnprovisionedPolicy {
    /// Keep it as pending liquidity
    #[default]
    Hold,
    /// Fail the purchase
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenSection {
    pub name: String,
    pub symbol: String,
    pub initial_price: u64,
    /// Unix seconds; seeds the harvest cooldown
    pub deployed_at: u64,
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            name: "Surge".to_string(),
            symbol: "SURGE".to_string(),
            initial_price: INITIAL_PRICE as u64,
            deployed_at: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RolesSection {
    pub owner: Address,
    pub beneficiary: Address,
    /// The contract's own holder identity
    pub contract: Address,
    pub pool_manager: Address,
}

impl Default for RolesSection {
    fn default() -> Self {
        Self {
            owner: Address::from_label("surge-owner"),
            beneficiary: Address::from_label("surge-beneficiary"),
            contract: Address::from_label("surge-token"),
            pool_manager: Address::from_label("surge-pool-manager"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DistributionSection {
    pub beneficiary_ratio: u16,
    pub liquidity_ratio: u16,
    pub beneficiary_policy: BeneficiaryPolicy,
}

impl Default for DistributionSection {
    fn default() -> Self {
        Self {
            beneficiary_ratio: DEFAULT_BENEFICIARY_RATIO,
            liquidity_ratio: DEFAULT_LIQUIDITY_RATIO,
            beneficiary_policy: BeneficiaryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LiquiditySection {
    pub fee_tier: u32,
    pub tick_spacing: i32,
    /// Passed through to the pool service on initialization
    pub starting_ratio: u64,
    pub unprovisioned: UnprovisionedPolicy,
    pub rollback_failed_provision: bool,
}

impl Default for LiquiditySection {
    fn default() -> Self {
        Self {
            fee_tier: DEFAULT_FEE_TIER,
            tick_spacing: DEFAULT_TICK_SPACING,
            starting_ratio: 1,
            unprovisioned: UnprovisionedPolicy::default(),
            rollback_failed_provision: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarvestSection {
    pub interval_secs: u64,
}

impl Default for HarvestSection {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_HARVEST_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenConfig {
    pub token: TokenSection,
    pub roles: RolesSection,
    pub distribution: DistributionSection,
    pub liquidity: LiquiditySection,
    pub harvest: HarvestSection,
}

impl TokenConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: TokenConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.name.trim().is_empty() || self.token.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "token name and symbol must not be empty".to_string(),
            ));
        }

        if self.token.initial_price == 0 {
            return Err(ConfigError::Invalid(
                "initial price must be positive".to_string(),
            ));
        }

        let roles = [
            ("owner", self.roles.owner),
            ("beneficiary", self.roles.beneficiary),
            ("contract", self.roles.contract),
            ("pool_manager", self.roles.pool_manager),
        ];
        if let Some((role, _)) = roles.iter().find(|(_, addr)| addr.is_zero()) {
            return Err(ConfigError::Invalid(format!("{} must not be the zero address", role)));
        }
        if self.roles.contract == self.roles.pool_manager {
            return Err(ConfigError::Invalid(
                "contract and pool_manager must differ".to_string(),
            ));
        }

        self.distribution()?;

        if self.liquidity.tick_spacing <= 0 {
            return Err(ConfigError::Invalid(
                "tick spacing must be positive".to_string(),
            ));
        }
        if self.liquidity.fee_tier >= 1_000_000 {
            return Err(ConfigError::Invalid(format!(
                "fee tier {} is not below 100%",
                self.liquidity.fee_tier
            )));
        }
        if self.liquidity.starting_ratio == 0 {
            return Err(ConfigError::Invalid(
                "starting ratio must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn distribution(&self) -> Result<DistributionConfig, ConfigError> {
        DistributionConfig::new(
            self.distribution.beneficiary_ratio,
            self.distribution.liquidity_ratio,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Pool pairing the token with the native base asset
    pub fn pool_key(&self) -> PoolKey {
        PoolKey::new(
            self.roles.contract,
            surge_liquidity::NATIVE,
            self.liquidity.fee_tier,
            self.liquidity.tick_spacing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TokenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token.initial_price, 10_000);
        assert_eq!(config.distribution.beneficiary_policy, BeneficiaryPolicy::Strict);
        assert_eq!(config.liquidity.unprovisioned, UnprovisionedPolicy::Hold);
        assert!(config.liquidity.rollback_failed_provision);
    }

    #[test]
    fn test_parse_partial_file() {
        let content = r#"
            [token]
            name = "Test"
            symbol = "TST"
            initial_price = 20000

            [distribution]
            beneficiary_ratio = 300
            liquidity_ratio = 700
            beneficiary_policy = "lenient"
        "#;

        let config = TokenConfig::parse(content).unwrap();
        assert_eq!(config.token.symbol, "TST");
        assert_eq!(config.token.initial_price, 20_000);
        assert_eq!(config.distribution.beneficiary_policy, BeneficiaryPolicy::Lenient);
        assert_eq!(config.harvest.interval_secs, DEFAULT_HARVEST_INTERVAL_SECS);
        assert_eq!(config.distribution().unwrap().liquidity_ratio(), 700);
    }

    #[test]
    fn test_rejects_bad_ratios() {
        let content = r#"
            [distribution]
            beneficiary_ratio = 600
            liquidity_ratio = 600
        "#;
        assert!(matches!(
            TokenConfig::parse(content),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_zero_role() {
        let mut config = TokenConfig::default();
        config.roles.beneficiary = Address::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("beneficiary"));
    }

    #[test]
    fn test_rejects_zero_price() {
        let mut config = TokenConfig::default();
        config.token.initial_price = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surge.toml");

        let mut config = TokenConfig::default();
        config.harvest.interval_secs = 600;
        config.liquidity.unprovisioned = UnprovisionedPolicy::Reject;
        config.save_to_file(&path).unwrap();

        let loaded = TokenConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Lenient".parse::<BeneficiaryPolicy>().unwrap(), BeneficiaryPolicy::Lenient);
        assert!("loose".parse::<BeneficiaryPolicy>().is_err());
    }
}
