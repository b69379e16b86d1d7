//! Liquidity position bookkeeping
//!
//! Tracks the pool identity, the one-way initialization flag and the
//! full-range position the contract owns, and mediates every call to the
//! external pool service.

use serde::{Deserialize, Serialize};
use surge_core::{Address, EventSink, SurgeEvent, TokenLedger};
use surge_economics::PriceEngine;

use crate::collaborator::{CollectedFees, LiquidityCollaborator, LiquidityDelta, SettledAmounts};
use crate::error::{LiquidityError, Result};
use crate::pool::{PoolId, PoolKey, TickRange};
use crate::settlement::{LiquidityIntent, Settlement, SettlementAmounts, SettlementState};

/// Cumulative amounts settled into the position
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionTotals {
    pub token_deposited: u128,
    pub base_deposited: u128,
    pub provision_count: u64,
    pub failed_provisions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Provisioned {
        /// Base amount offered
        base_amount: u128,
        /// Matching tokens minted for the offer
        token_amount: u128,
        settled: SettledAmounts,
    },
    Failed {
        base_amount: u128,
        token_amount: u128,
        rolled_back: bool,
        reason: String,
    },
}

impl ProvisionOutcome {
    pub fn is_provisioned(&self) -> bool {
        matches!(self, ProvisionOutcome::Provisioned { .. })
    }

    /// Base asset that actually left the contract
    pub fn settled_base(&self) -> u128 {
        match self {
            ProvisionOutcome::Provisioned { settled, .. } => settled.base_amount,
            ProvisionOutcome::Failed { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityLedger {
    pool: PoolKey,
    range: TickRange,
    initialized: bool,
    settlement: Settlement,
    position: PositionTotals,
    /// Base asset held back until it can be provisioned
    pending_base: u128,
    /// The token contract's own holder identity
    holder: Address,
    /// Holder identity of the pool service's token custody
    pool_manager: Address,
}

impl LiquidityLedger {
    pub fn new(pool: PoolKey, holder: Address, pool_manager: Address) -> Self {
        Self {
            range: pool.full_range(),
            pool,
            initialized: false,
            settlement: Settlement::new(),
            position: PositionTotals::default(),
            pending_base: 0,
            holder,
            pool_manager,
        }
    }

    pub fn pool(&self) -> &PoolKey {
        &self.pool
    }

    pub fn pool_id(&self) -> PoolId {
        self.pool.id()
    }

    pub fn range(&self) -> TickRange {
        self.range
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn position(&self) -> &PositionTotals {
        &self.position
    }

    pub fn pending_base(&self) -> u128 {
        self.pending_base
    }

    pub fn holder(&self) -> Address {
        self.holder
    }

    pub fn pool_manager(&self) -> Address {
        self.pool_manager
    }

    pub fn settlement_state(&self) -> &SettlementState {
        self.settlement.state()
    }

    /// Create the pool. The flag only flips if the pool service accepts.
    pub fn initialize_pool(
        &mut self,
        starting_ratio: u128,
        collaborator: &mut dyn LiquidityCollaborator,
        sink: &mut dyn EventSink,
    ) -> Result<PoolId> {
        if self.initialized {
            return Err(LiquidityError::AlreadyInitialized);
        }

        let pool_id = self.pool.id();
        if let Err(e) = collaborator.initialize(&self.pool, starting_ratio) {
            log::warn!("pool {} initialization rejected: {}", pool_id, e);
            sink.emit(SurgeEvent::PoolInitializationFailed {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        self.initialized = true;
        log::info!(
            "pool {} initialized (ticks {}..{}, ratio {})",
            pool_id,
            self.range.lower,
            self.range.upper,
            starting_ratio
        );
        sink.emit(SurgeEvent::PoolInitialized {
            pool_id: pool_id.0,
            starting_ratio,
        });
        Ok(pool_id)
    }

    /// Keep `amount` of base asset for a later provisioning call
    pub fn hold(&mut self, amount: u128, sink: &mut dyn EventSink) -> u128 {
        self.pending_base = self.pending_base.saturating_add(amount);
        sink.emit(SurgeEvent::LiquidityHeld {
            amount,
            pending_total: self.pending_base,
        });
        self.pending_base
    }

    pub fn take_pending(&mut self) -> u128 {
        std::mem::take(&mut self.pending_base)
    }

    /// Put back an amount taken with [`take_pending`](Self::take_pending)
    /// whose provisioning errored out.
    pub fn restore_pending(&mut self, amount: u128) {
        self.pending_base = self.pending_base.saturating_add(amount);
    }

    /// Add `base_amount` plus freshly minted matching tokens as full-range
    /// liquidity.
    ///
    /// A rejection by the pool service is not an error: it is reported as
    /// [`ProvisionOutcome::Failed`], the base amount goes back to pending, and
    /// the matching mint is burned again when `rollback_on_failure` is set.
    pub fn provision(
        &mut self,
        base_amount: u128,
        price: &PriceEngine,
        tokens: &mut TokenLedger,
        collaborator: &mut dyn LiquidityCollaborator,
        rollback_on_failure: bool,
        sink: &mut dyn EventSink,
    ) -> Result<ProvisionOutcome> {
        if !self.initialized {
            return Err(LiquidityError::NotInitialized);
        }

        let token_amount = price.quote_tokens_for_payment(base_amount)?;
        let delta = LiquidityDelta {
            token_amount,
            base_amount,
        };

        let handle = self.settlement.begin(LiquidityIntent::AddLiquidity(delta))?;
        if let Err(e) = tokens.mint(self.holder, token_amount, sink) {
            self.settlement.abort(handle)?;
            return Err(e.into());
        }

        let settled = collaborator
            .add_liquidity(&self.pool, self.range, delta)
            .map_err(LiquidityError::from)
            .and_then(|amounts| {
                self.settlement
                    .settle(handle, SettlementAmounts::Added(amounts))
                    .map(|_| amounts)
            });

        match settled {
            Ok(amounts) => {
                if amounts.token_amount > 0 {
                    tokens.transfer(self.holder, self.pool_manager, amounts.token_amount, sink)?;
                }

                self.position.token_deposited += amounts.token_amount;
                self.position.base_deposited += amounts.base_amount;
                self.position.provision_count += 1;

                // Whatever the pool did not take stays pending
                let unsettled = base_amount - amounts.base_amount;
                if unsettled > 0 {
                    self.pending_base += unsettled;
                }

                log::info!(
                    "provisioned {} base + {} tokens into {}",
                    amounts.base_amount,
                    amounts.token_amount,
                    self.pool.id()
                );
                sink.emit(SurgeEvent::LiquidityProvisioned {
                    base_amount: amounts.base_amount,
                    token_amount: amounts.token_amount,
                });

                Ok(ProvisionOutcome::Provisioned {
                    base_amount,
                    token_amount,
                    settled: amounts,
                })
            }
            Err(e) => {
                if !self.settlement.is_idle() {
                    self.settlement.abort(handle)?;
                }

                if rollback_on_failure {
                    tokens.burn(self.holder, token_amount, sink)?;
                }

                self.pending_base += base_amount;
                self.position.failed_provisions += 1;

                let reason = e.to_string();
                log::warn!(
                    "provisioning {} base failed ({}), rolled back: {}",
                    base_amount,
                    reason,
                    rollback_on_failure
                );
                sink.emit(SurgeEvent::LiquidityProvisionFailed {
                    base_amount,
                    token_amount,
                    rolled_back: rollback_on_failure,
                    reason: reason.clone(),
                });

                Ok(ProvisionOutcome::Failed {
                    base_amount,
                    token_amount,
                    rolled_back: rollback_on_failure,
                    reason,
                })
            }
        }
    }

    /// Collect the fees accrued by the position
    pub fn collect_fees(
        &mut self,
        collaborator: &mut dyn LiquidityCollaborator,
    ) -> Result<CollectedFees> {
        if !self.initialized {
            return Err(LiquidityError::NotInitialized);
        }

        let handle = self.settlement.begin(LiquidityIntent::CollectFees)?;
        match collaborator.collect_fees(&self.pool, self.range) {
            Ok(fees) => {
                self.settlement.settle(handle, SettlementAmounts::Fees(fees))?;
                Ok(fees)
            }
            Err(e) => {
                self.settlement.abort(handle)?;
                Err(e.into())
            }
        }
    }
}
