//! In-process pool service
//!
//! Used by the simulator and by tests. Clones share one state, so a caller
//! can hand a clone to the contract and keep another to steer failures and
//! accrue fees.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::collaborator::{
    CollectedFees, LiquidityCollaborator, LiquidityDelta, PoolError, SettledAmounts,
};
use crate::pool::{PoolKey, TickRange};
use surge_economics::constants::BPS_DENOMINATOR;

#[derive(Debug, Clone, Default)]
struct SimulatedState {
    pool: Option<PoolKey>,
    starting_ratio: u128,
    token_reserve: u128,
    base_reserve: u128,
    accrued: CollectedFees,
    fill_bps: u128,
    fail_initialize: bool,
    fail_add_liquidity: bool,
    fail_collect: bool,
}

#[derive(Debug, Clone)]
pub struct SimulatedPool {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedPool {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState {
                fill_bps: BPS_DENOMINATOR,
                ..SimulatedState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_fail_initialize(&self, fail: bool) {
        self.state().fail_initialize = fail;
    }

    pub fn set_fail_add_liquidity(&self, fail: bool) {
        self.state().fail_add_liquidity = fail;
    }

    pub fn set_fail_collect(&self, fail: bool) {
        self.state().fail_collect = fail;
    }

    /// Share of each offered amount the pool takes, in basis points
    pub fn set_fill_bps(&self, bps: u32) {
        self.state().fill_bps = u128::from(bps).min(BPS_DENOMINATOR);
    }

    pub fn is_initialized(&self) -> bool {
        self.state().pool.is_some()
    }

    pub fn starting_ratio(&self) -> u128 {
        self.state().starting_ratio
    }

    /// (token, base) reserves backing the position
    pub fn reserves(&self) -> (u128, u128) {
        let state = self.state();
        (state.token_reserve, state.base_reserve)
    }

    pub fn accrued_fees(&self) -> CollectedFees {
        self.state().accrued
    }

    /// Simulate trading activity. Token fees are carved out of the token
    /// reserve, so they are capped by it. Returns what was accrued.
    pub fn accrue_fees(&self, token_amount: u128, base_amount: u128) -> CollectedFees {
        let mut state = self.state();
        let token_amount = token_amount.min(state.token_reserve);
        state.token_reserve -= token_amount;
        state.accrued.token_amount += token_amount;
        state.accrued.base_amount = state.accrued.base_amount.saturating_add(base_amount);

        CollectedFees {
            token_amount,
            base_amount,
        }
    }

    fn check_pool(state: &SimulatedState, pool: &PoolKey) -> Result<(), PoolError> {
        match &state.pool {
            Some(known) if known == pool => Ok(()),
            Some(_) => Err(PoolError::Rejected("unknown pool key".to_string())),
            None => Err(PoolError::Rejected("pool not initialized".to_string())),
        }
    }
}

impl Default for SimulatedPool {
    fn default() -> Self {
        Self::new()
    }
}

impl LiquidityCollaborator for SimulatedPool {
    fn initialize(&mut self, pool: &PoolKey, starting_ratio: u128) -> Result<(), PoolError> {
        let mut state = self.state();
        if state.fail_initialize {
            return Err(PoolError::Unavailable("initialize disabled".to_string()));
        }
        if state.pool.is_some() {
            return Err(PoolError::Rejected("pool already exists".to_string()));
        }
        if starting_ratio == 0 {
            return Err(PoolError::Rejected("zero starting ratio".to_string()));
        }

        state.pool = Some(*pool);
        state.starting_ratio = starting_ratio;
        Ok(())
    }

    fn add_liquidity(
        &mut self,
        pool: &PoolKey,
        _range: TickRange,
        delta: LiquidityDelta,
    ) -> Result<SettledAmounts, PoolError> {
        let mut state = self.state();
        if state.fail_add_liquidity {
            return Err(PoolError::Unavailable("add liquidity disabled".to_string()));
        }
        Self::check_pool(&state, pool)?;

        let fill = state.fill_bps;
        let settled = SettledAmounts {
            token_amount: delta.token_amount / BPS_DENOMINATOR * fill
                + delta.token_amount % BPS_DENOMINATOR * fill / BPS_DENOMINATOR,
            base_amount: delta.base_amount / BPS_DENOMINATOR * fill
                + delta.base_amount % BPS_DENOMINATOR * fill / BPS_DENOMINATOR,
        };

        state.token_reserve += settled.token_amount;
        state.base_reserve += settled.base_amount;
        Ok(settled)
    }

    fn collect_fees(&mut self, pool: &PoolKey, _range: TickRange) -> Result<CollectedFees, PoolError> {
        let mut state = self.state();
        if state.fail_collect {
            return Err(PoolError::Unavailable("fee collection disabled".to_string()));
        }
        Self::check_pool(&state, pool)?;

        Ok(std::mem::take(&mut state.accrued))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surge_core::Address;

    fn key() -> PoolKey {
        PoolKey::native_pair(Address::from_label("surge-token"))
    }

    #[test]
    fn test_clones_share_state() {
        let pool = SimulatedPool::new();
        let mut handle = pool.clone();

        handle.initialize(&key(), 1).unwrap();
        assert!(pool.is_initialized());

        pool.set_fail_collect(true);
        assert!(handle.collect_fees(&key(), key().full_range()).is_err());
    }

    #[test]
    fn test_fill_fraction() {
        let mut pool = SimulatedPool::new();
        pool.initialize(&key(), 1).unwrap();
        pool.set_fill_bps(5_000);

        let settled = pool
            .add_liquidity(
                &key(),
                key().full_range(),
                LiquidityDelta {
                    token_amount: 1_001,
                    base_amount: 10,
                },
            )
            .unwrap();

        assert_eq!(settled.token_amount, 500);
        assert_eq!(settled.base_amount, 5);
    }

    #[test]
    fn test_fees_capped_by_reserve() {
        let mut pool = SimulatedPool::new();
        pool.initialize(&key(), 1).unwrap();
        pool.add_liquidity(
            &key(),
            key().full_range(),
            LiquidityDelta {
                token_amount: 100,
                base_amount: 1,
            },
        )
        .unwrap();

        let accrued = pool.accrue_fees(150, 7);
        assert_eq!(accrued.token_amount, 100);
        assert_eq!(pool.reserves().0, 0);

        let collected = pool.collect_fees(&key(), key().full_range()).unwrap();
        assert_eq!(collected, accrued);
        assert_eq!(pool.accrued_fees(), CollectedFees::default());
    }

    #[test]
    fn test_add_before_initialize_rejected() {
        let mut pool = SimulatedPool::new();
        let result = pool.add_liquidity(
            &key(),
            key().full_range(),
            LiquidityDelta {
                token_amount: 1,
                base_amount: 1,
            },
        );
        assert!(matches!(result, Err(PoolError::Rejected(_))));
    }
}
