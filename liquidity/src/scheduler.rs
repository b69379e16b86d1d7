//! Harvest-and-burn scheduling
//!
//! Fees accrued by the position are collected at most once per harvest
//! interval and destroyed. Token-side fees are burned directly. Base-side
//! fees are converted at the current contract price into freshly minted
//! tokens that are burned in the same step, so the supply never grows from
//! them.

use serde::{Deserialize, Serialize};
use surge_core::{EventSink, SurgeEvent, TokenLedger};
use surge_economics::{BurnAccounting, BurnStats, PriceEngine};

use crate::collaborator::{CollectedFees, LiquidityCollaborator};
use crate::error::{LiquidityError, Result};
use crate::ledger::LiquidityLedger;

/// Result of a successful harvest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestReceipt {
    pub timestamp: u64,
    pub token_fees: u128,
    pub base_fees: u128,
    /// Token-side fees burned as-is
    pub burned_from_token_fees: u128,
    /// Tokens minted for base-side fees and burned
    pub burned_from_base_fees: u128,
    /// Fee-burn total after this harvest
    pub total_burned: u128,
}

impl HarvestReceipt {
    pub fn burned(&self) -> u128 {
        self.burned_from_token_fees + self.burned_from_base_fees
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnScheduler {
    accounting: BurnAccounting,
}

impl BurnScheduler {
    pub fn new(harvest_interval_secs: u64, started_at: u64) -> Self {
        Self {
            accounting: BurnAccounting::new(harvest_interval_secs, started_at),
        }
    }

    pub fn stats(&self) -> &BurnStats {
        self.accounting.stats()
    }

    pub fn total_burned(&self) -> u128 {
        self.accounting.total_burned()
    }

    pub fn harvest_interval(&self) -> u64 {
        self.accounting.harvest_interval()
    }

    pub fn last_harvest_timestamp(&self) -> u64 {
        self.accounting.last_harvest_timestamp()
    }

    pub fn next_harvest_at(&self) -> u64 {
        self.accounting.next_harvest_at()
    }

    pub fn can_harvest(&self, now: u64) -> bool {
        self.accounting.can_harvest(now)
    }

    /// Returns the previous interval
    pub fn set_harvest_interval(&mut self, interval_secs: u64) -> u64 {
        self.accounting.set_harvest_interval(interval_secs)
    }

    /// Collect the position's fees and burn them.
    ///
    /// The harvest timestamp is stamped before the pool is called and is
    /// kept even when collection fails, so a failing pool cannot be retried
    /// before the next interval. The failure is reported through `sink` as
    /// well as the returned error.
    ///
    /// Fees that were collected but could not be burned come back as
    /// [`LiquidityError::FeesNotBurned`]; token fees stay in pool-manager
    /// custody and the caller keeps the base fees.
    pub fn harvest_and_burn(
        &mut self,
        now: u64,
        liquidity: &mut LiquidityLedger,
        price: &PriceEngine,
        tokens: &mut TokenLedger,
        collaborator: &mut dyn LiquidityCollaborator,
        sink: &mut dyn EventSink,
    ) -> Result<HarvestReceipt> {
        if !liquidity.is_initialized() {
            return Err(LiquidityError::NotInitialized);
        }
        if !self.accounting.can_harvest(now) {
            return Err(LiquidityError::TooSoon {
                now,
                next_allowed: self.accounting.next_harvest_at(),
            });
        }

        self.accounting.mark_harvest(now);

        let fees = match liquidity.collect_fees(collaborator) {
            Ok(fees) => fees,
            Err(e) => return Err(harvest_failed(e, sink)),
        };

        let holder = liquidity.holder();
        let pool_manager = liquidity.pool_manager();

        // The fees have left the pool; from here a failure reports them back
        self.accounting.record_fees(fees.token_amount, fees.base_amount);
        sink.emit(SurgeEvent::FeesCollected {
            token_amount: fees.token_amount,
            base_amount: fees.base_amount,
        });

        let custody = tokens.balance_of(&pool_manager);
        if custody < fees.token_amount {
            let reason = format!(
                "reported {} token fees but custody holds {}",
                fees.token_amount, custody
            );
            return Err(harvest_failed(fees_not_burned(fees, reason), sink));
        }
        let converted = match price
            .quote_tokens_for_payment(fees.base_amount)
            .map_err(LiquidityError::from)
            .and_then(|amount| {
                tokens.ensure_mintable(amount)?;
                Ok(amount)
            }) {
            Ok(amount) => amount,
            Err(e) => return Err(harvest_failed(fees_not_burned(fees, e.to_string()), sink)),
        };

        if fees.token_amount > 0 {
            tokens.transfer(pool_manager, holder, fees.token_amount, sink)?;
            tokens.burn(holder, fees.token_amount, sink)?;
        }
        if converted > 0 {
            tokens.mint(holder, converted, sink)?;
            tokens.burn(holder, converted, sink)?;
        }

        let burned = fees.token_amount + converted;
        let total_burned = self.accounting.record_burn(burned);

        log::info!(
            "harvest at {}: fees ({} tokens, {} base), burned {} (total {})",
            now,
            fees.token_amount,
            fees.base_amount,
            burned,
            total_burned
        );
        sink.emit(SurgeEvent::TokensBurned {
            amount: burned,
            total_burned,
        });

        Ok(HarvestReceipt {
            timestamp: now,
            token_fees: fees.token_amount,
            base_fees: fees.base_amount,
            burned_from_token_fees: fees.token_amount,
            burned_from_base_fees: converted,
            total_burned,
        })
    }
}

fn fees_not_burned(fees: CollectedFees, reason: String) -> LiquidityError {
    LiquidityError::FeesNotBurned {
        token_amount: fees.token_amount,
        base_amount: fees.base_amount,
        reason,
    }
}

fn harvest_failed(error: LiquidityError, sink: &mut dyn EventSink) -> LiquidityError {
    log::warn!("harvest failed: {}", error);
    sink.emit(SurgeEvent::HarvestFailed {
        reason: error.to_string(),
    });
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolKey;
    use crate::simulated::SimulatedPool;
    use surge_core::{Address, EventLog};
    use surge_economics::constants::{INITIAL_PRICE, SCALE};

    const DEPLOYED_AT: u64 = 1_700_000_000;
    const INTERVAL: u64 = 3600;

    struct Fixture {
        scheduler: BurnScheduler,
        liquidity: LiquidityLedger,
        price: PriceEngine,
        tokens: TokenLedger,
        pool: SimulatedPool,
        log: EventLog,
    }

    impl Fixture {
        fn new() -> Self {
            let holder = Address::from_label("surge-token");
            let pool = SimulatedPool::new();
            let mut fixture = Self {
                scheduler: BurnScheduler::new(INTERVAL, DEPLOYED_AT),
                liquidity: LiquidityLedger::new(
                    PoolKey::native_pair(holder),
                    holder,
                    Address::from_label("pool-manager"),
                ),
                price: PriceEngine::new(INITIAL_PRICE).unwrap(),
                tokens: TokenLedger::new("Surge", "SURGE"),
                pool,
                log: EventLog::new(),
            };
            let mut collaborator = fixture.pool.clone();
            fixture
                .liquidity
                .initialize_pool(1, &mut collaborator, &mut fixture.log)
                .unwrap();
            fixture
                .liquidity
                .provision(
                    SCALE,
                    &fixture.price,
                    &mut fixture.tokens,
                    &mut collaborator,
                    true,
                    &mut fixture.log,
                )
                .unwrap();
            fixture
        }

        fn harvest(&mut self, now: u64) -> Result<HarvestReceipt> {
            let mut collaborator = self.pool.clone();
            self.scheduler.harvest_and_burn(
                now,
                &mut self.liquidity,
                &self.price,
                &mut self.tokens,
                &mut collaborator,
                &mut self.log,
            )
        }
    }

    #[test]
    fn test_first_harvest_waits_one_interval() {
        let mut f = Fixture::new();

        let early = f.harvest(DEPLOYED_AT + INTERVAL - 1);
        assert_eq!(
            early,
            Err(LiquidityError::TooSoon {
                now: DEPLOYED_AT + INTERVAL - 1,
                next_allowed: DEPLOYED_AT + INTERVAL,
            })
        );
        assert!(f.harvest(DEPLOYED_AT + INTERVAL).is_ok());
    }

    #[test]
    fn test_harvest_burns_both_fee_sides() {
        let mut f = Fixture::new();
        let supply_before = f.tokens.total_supply();
        f.pool.accrue_fees(1_000, SCALE / 100);

        let receipt = f.harvest(DEPLOYED_AT + INTERVAL).unwrap();

        let converted = (SCALE / 100) * SCALE / INITIAL_PRICE;
        assert_eq!(receipt.burned_from_token_fees, 1_000);
        assert_eq!(receipt.burned_from_base_fees, converted);
        assert_eq!(receipt.total_burned, 1_000 + converted);
        assert_eq!(f.scheduler.total_burned(), 1_000 + converted);
        assert_eq!(f.tokens.total_supply(), supply_before - 1_000);
        assert_eq!(f.tokens.total_supply(), f.tokens.sum_of_balances());
        assert_eq!(f.log.count("FeesCollected"), 1);
        assert_eq!(f.log.count("TokensBurned"), 1);
    }

    #[test]
    fn test_harvest_with_no_fees_succeeds() {
        let mut f = Fixture::new();
        let receipt = f.harvest(DEPLOYED_AT + INTERVAL).unwrap();
        assert_eq!(receipt.burned(), 0);
        assert_eq!(f.scheduler.last_harvest_timestamp(), DEPLOYED_AT + INTERVAL);
    }

    #[test]
    fn test_failed_collection_keeps_timestamp() {
        let mut f = Fixture::new();
        f.pool.set_fail_collect(true);
        let now = DEPLOYED_AT + INTERVAL;

        let result = f.harvest(now);
        assert!(matches!(result, Err(LiquidityError::Collaborator(_))));
        assert_eq!(f.scheduler.last_harvest_timestamp(), now);
        assert_eq!(f.scheduler.total_burned(), 0);
        assert_eq!(f.log.count("HarvestFailed"), 1);

        f.pool.set_fail_collect(false);
        assert!(matches!(
            f.harvest(now + 1),
            Err(LiquidityError::TooSoon { .. })
        ));
        assert!(f.harvest(now + INTERVAL).is_ok());
    }

    #[test]
    fn test_custody_shortfall_reports_collected_fees() {
        let mut f = Fixture::new();
        let pool_manager = f.liquidity.pool_manager();
        let custody = f.tokens.balance_of(&pool_manager);
        f.tokens
            .transfer(pool_manager, Address::from_label("elsewhere"), custody, &mut f.log)
            .unwrap();
        f.pool.accrue_fees(1_000, SCALE / 100);
        let supply_before = f.tokens.total_supply();

        let result = f.harvest(DEPLOYED_AT + INTERVAL);
        match result {
            Err(LiquidityError::FeesNotBurned {
                token_amount,
                base_amount,
                ..
            }) => {
                assert_eq!(token_amount, 1_000);
                assert_eq!(base_amount, SCALE / 100);
            }
            other => panic!("expected FeesNotBurned, got {:?}", other),
        }
        assert_eq!(f.scheduler.stats().total_base_fees, SCALE / 100);
        assert_eq!(f.scheduler.total_burned(), 0);
        assert_eq!(f.tokens.total_supply(), supply_before);
        assert_eq!(f.log.count("FeesCollected"), 1);
        assert_eq!(f.log.count("HarvestFailed"), 1);
    }

    #[test]
    fn test_harvest_requires_pool() {
        let holder = Address::from_label("surge-token");
        let mut scheduler = BurnScheduler::new(INTERVAL, 0);
        let mut liquidity = LiquidityLedger::new(
            PoolKey::native_pair(holder),
            holder,
            Address::from_label("pool-manager"),
        );
        let price = PriceEngine::new(INITIAL_PRICE).unwrap();
        let mut tokens = TokenLedger::new("Surge", "SURGE");
        let mut pool = SimulatedPool::new();
        let mut log = EventLog::new();

        let result = scheduler.harvest_and_burn(
            INTERVAL,
            &mut liquidity,
            &price,
            &mut tokens,
            &mut pool,
            &mut log,
        );
        assert_eq!(result, Err(LiquidityError::NotInitialized));
        assert_eq!(scheduler.last_harvest_timestamp(), 0);
    }
}
