//! Purchase pricing
//!
//! The contract price only moves on purchases. Each purchase multiplies it by
//! a growth factor that is linear in the payment volume: every full unit of
//! the base asset adds 0.1%. Volume is counted in micro-units
//! (`SCALE / 1_000_000`); anything below one micro-unit adds nothing.

use serde::{Deserialize, Serialize};
use surge_core::{EventSink, SurgeEvent};

use crate::constants::{
    BPS_DENOMINATOR, GROWTH_SCALE, PRICE_IMPACT_RATE, SCALE, VOLUME_UNITS_PER_BASE,
};
use crate::error::{EconomicsError, MathError, Result};
use crate::math::mul_div;

/// Result of a price growth step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceUpdate {
    pub old_price: u128,
    pub new_price: u128,
    pub buy_count: u64,
    pub payment_amount: u128,
}

/// Read-only purchase preview
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchasePrice {
    pub payment_amount: u128,
    pub token_amount: u128,
    pub price_before: u128,
    pub price_after: u128,
}

/// Price growth statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceGrowthStats {
    pub initial_price: u128,
    pub current_price: u128,
    /// `floor(current * 10000 / initial) - 10000`, never negative
    pub growth_bps: u128,
    pub buy_count: u64,
    pub cumulative_volume: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEngine {
    initial_price: u128,
    contract_price: u128,
    buy_count: u64,
    cumulative_volume: u128,
}

impl PriceEngine {
    pub fn new(initial_price: u128) -> Result<Self> {
        if initial_price == 0 {
            return Err(EconomicsError::InvalidPrice(
                "initial price must be positive".to_string(),
            ));
        }

        Ok(Self {
            initial_price,
            contract_price: initial_price,
            buy_count: 0,
            cumulative_volume: 0,
        })
    }

    pub fn current_price(&self) -> u128 {
        self.contract_price
    }

    pub fn initial_price(&self) -> u128 {
        self.initial_price
    }

    pub fn buy_count(&self) -> u64 {
        self.buy_count
    }

    pub fn cumulative_volume(&self) -> u128 {
        self.cumulative_volume
    }

    /// `floor(payment * SCALE / price)`
    pub fn quote_tokens_for_payment(&self, payment_amount: u128) -> Result<u128> {
        Ok(mul_div(payment_amount, SCALE, self.contract_price)?)
    }

    /// `floor(tokens * price / SCALE)`
    pub fn quote_payment_for_tokens(&self, token_amount: u128) -> Result<u128> {
        Ok(mul_div(token_amount, self.contract_price, SCALE)?)
    }

    /// Price after a purchase of `payment_amount`, without applying it
    pub fn grown_price(&self, payment_amount: u128) -> Result<u128> {
        let micro_units = mul_div(payment_amount, VOLUME_UNITS_PER_BASE, SCALE)?;

        // Factor at scale GROWTH_SCALE * VOLUME_UNITS_PER_BASE
        let denominator = GROWTH_SCALE * VOLUME_UNITS_PER_BASE;
        let factor = (PRICE_IMPACT_RATE - GROWTH_SCALE)
            .checked_mul(micro_units)
            .and_then(|impact| impact.checked_add(denominator))
            .ok_or(MathError::Overflow)?;

        Ok(mul_div(self.contract_price, factor, denominator)?)
    }

    pub fn preview_purchase(&self, payment_amount: u128) -> Result<PurchasePrice> {
        Ok(PurchasePrice {
            payment_amount,
            token_amount: self.quote_tokens_for_payment(payment_amount)?,
            price_before: self.contract_price,
            price_after: self.grown_price(payment_amount)?,
        })
    }

    /// Grow the price for a completed purchase and count it
    pub fn apply_volume_growth(
        &mut self,
        payment_amount: u128,
        sink: &mut dyn EventSink,
    ) -> Result<PriceUpdate> {
        let new_price = self.grown_price(payment_amount)?;
        let old_price = self.contract_price;

        self.contract_price = new_price;
        self.buy_count += 1;
        self.cumulative_volume = self.cumulative_volume.saturating_add(payment_amount);

        log::debug!(
            "price {} -> {} after buy #{} ({} paid)",
            old_price,
            new_price,
            self.buy_count,
            payment_amount
        );

        let update = PriceUpdate {
            old_price,
            new_price,
            buy_count: self.buy_count,
            payment_amount,
        };
        sink.emit(SurgeEvent::PriceUpdated {
            old_price,
            new_price,
            buy_count: update.buy_count,
            payment_amount,
        });
        Ok(update)
    }

    pub fn growth_stats(&self) -> PriceGrowthStats {
        let ratio_bps = mul_div(self.contract_price, BPS_DENOMINATOR, self.initial_price)
            .unwrap_or(u128::MAX);

        PriceGrowthStats {
            initial_price: self.initial_price,
            current_price: self.contract_price,
            growth_bps: ratio_bps.saturating_sub(BPS_DENOMINATOR),
            buy_count: self.buy_count,
            cumulative_volume: self.cumulative_volume,
        }
    }
}
