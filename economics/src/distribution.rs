//! Payment distribution between beneficiary and liquidity

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BENEFICIARY_RATIO, DEFAULT_LIQUIDITY_RATIO, RATIO_DENOMINATOR};
use crate::error::{EconomicsError, Result};
use crate::math::mul_div;

/// Beneficiary/liquidity ratios out of [`RATIO_DENOMINATOR`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionConfig {
    beneficiary_ratio: u16,
    liquidity_ratio: u16,
}

impl DistributionConfig {
    /// Both ratios are validated together; they must sum to exactly 1000
    pub fn new(beneficiary_ratio: u16, liquidity_ratio: u16) -> Result<Self> {
        let sum = beneficiary_ratio as u32 + liquidity_ratio as u32;
        if sum != RATIO_DENOMINATOR as u32 {
            return Err(EconomicsError::RatioSum {
                beneficiary: beneficiary_ratio,
                liquidity: liquidity_ratio,
                expected: RATIO_DENOMINATOR,
            });
        }

        Ok(Self {
            beneficiary_ratio,
            liquidity_ratio,
        })
    }

    pub fn beneficiary_ratio(&self) -> u16 {
        self.beneficiary_ratio
    }

    pub fn liquidity_ratio(&self) -> u16 {
        self.liquidity_ratio
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            beneficiary_ratio: DEFAULT_BENEFICIARY_RATIO,
            liquidity_ratio: DEFAULT_LIQUIDITY_RATIO,
        }
    }
}

/// Shares of a single payment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FundSplit {
    pub beneficiary_share: u128,
    pub liquidity_share: u128,
    /// Truncation dust claimed by neither share (at most 1 unit)
    pub residue: u128,
}

pub struct FundSplitter;

impl FundSplitter {
    /// Split `payment_amount` by the configured ratios, flooring both shares
    pub fn split(payment_amount: u128, config: &DistributionConfig) -> Result<FundSplit> {
        let denominator = RATIO_DENOMINATOR as u128;
        let beneficiary_share =
            mul_div(payment_amount, config.beneficiary_ratio as u128, denominator)?;
        let liquidity_share = mul_div(payment_amount, config.liquidity_ratio as u128, denominator)?;

        Ok(FundSplit {
            beneficiary_share,
            liquidity_share,
            residue: payment_amount - beneficiary_share - liquidity_share,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let split = FundSplitter::split(1000, &DistributionConfig::default()).unwrap();
        assert_eq!(split.beneficiary_share, 500);
        assert_eq!(split.liquidity_share, 500);
        assert_eq!(split.residue, 0);
    }

    #[test]
    fn test_odd_payment_leaves_residue() {
        let split = FundSplitter::split(7, &DistributionConfig::default()).unwrap();
        assert_eq!(split.beneficiary_share, 3);
        assert_eq!(split.liquidity_share, 3);
        assert_eq!(split.residue, 1);
    }

    #[test]
    fn test_uneven_ratios() {
        let config = DistributionConfig::new(300, 700).unwrap();
        let split = FundSplitter::split(1_000_000, &config).unwrap();
        assert_eq!(split.beneficiary_share, 300_000);
        assert_eq!(split.liquidity_share, 700_000);

        let all_liquidity = DistributionConfig::new(0, 1000).unwrap();
        let split = FundSplitter::split(999, &all_liquidity).unwrap();
        assert_eq!(split.beneficiary_share, 0);
        assert_eq!(split.liquidity_share, 999);
    }

    #[test]
    fn test_ratio_sum_enforced() {
        assert!(matches!(
            DistributionConfig::new(500, 499),
            Err(EconomicsError::RatioSum { .. })
        ));
        assert!(DistributionConfig::new(u16::MAX, 1).is_err());
        assert!(DistributionConfig::new(1000, 0).is_ok());
    }

    #[test]
    fn test_residue_never_exceeds_one() {
        let config = DistributionConfig::new(333, 667).unwrap();
        for payment in 1..2_000u128 {
            let split = FundSplitter::split(payment, &config).unwrap();
            assert!(split.residue <= 1, "payment {} left {}", payment, split.residue);
            assert_eq!(
                split.beneficiary_share + split.liquidity_share + split.residue,
                payment
            );
        }
    }
}
