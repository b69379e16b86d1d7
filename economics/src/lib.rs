//! SURGE Economics Module
//!
//! Implements the economic model including:
//! - Fixed-point arithmetic
//! - Volume-weighted purchase pricing
//! - Beneficiary/liquidity fund distribution
//! - Fee-burn accounting

pub mod distribution;
pub mod error;
pub mod math;
pub mod pricing;
pub mod supply;

pub use distribution::{DistributionConfig, FundSplit, FundSplitter};
pub use error::{EconomicsError, MathError, Result};
pub use math::{format_units, mul_div, parse_units};
pub use pricing::{PriceEngine, PriceGrowthStats, PriceUpdate, PurchasePrice};
pub use supply::{BurnAccounting, BurnStats};

/// Economic constants
pub mod constants {
    /// Token and base-asset decimal places
    pub const DECIMALS: u8 = 18;

    /// Fixed-point scale (1.0)
    pub const SCALE: u128 = 1_000_000_000_000_000_000;

    /// Contract price at deployment
    pub const INITIAL_PRICE: u128 = 10_000;

    /// Growth factor scale (1.0)
    pub const GROWTH_SCALE: u128 = 1_000_000;

    /// Growth factor for one full base-asset unit (1.001)
    pub const PRICE_IMPACT_RATE: u128 = 1_001_000;

    /// Volume granularity: micro-units per base-asset unit
    pub const VOLUME_UNITS_PER_BASE: u128 = 1_000_000;

    /// Denominator of the distribution ratios
    pub const RATIO_DENOMINATOR: u16 = 1000;

    /// Beneficiary share (50%)
    pub const DEFAULT_BENEFICIARY_RATIO: u16 = 500;

    /// Liquidity share (50%)
    pub const DEFAULT_LIQUIDITY_RATIO: u16 = 500;

    /// Minimum gap between fee harvests (1 hour)
    pub const DEFAULT_HARVEST_INTERVAL_SECS: u64 = 3600;

    pub const BPS_DENOMINATOR: u128 = 10_000;
}
