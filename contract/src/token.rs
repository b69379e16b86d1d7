//! The SURGE token contract
//!
//! [`SurgeToken`] composes the price engine, fund splitter, token ledger,
//! liquidity position and burn schedule behind one serialized entry point
//! per operation. Every operation buffers its notifications and hands them
//! to the injected sink only once it commits.

use serde::{Deserialize, Serialize};
use surge_core::{Address, EventLog, EventSink, SupplyStats, SurgeEvent, TokenLedger};
use surge_economics::{
    BurnStats, DistributionConfig, PriceEngine, PriceGrowthStats, PurchasePrice,
};
use surge_liquidity::{
    BurnScheduler, LiquidityCollaborator, LiquidityLedger, PoolId, PoolKey, PositionTotals,
    ProvisionOutcome, TickRange,
};

use crate::access::Ownership;
use crate::config::{BeneficiaryPolicy, TokenConfig, UnprovisionedPolicy};
use crate::error::{Result, TokenError};
use crate::guard::ReentrancyGuard;
use crate::payout::PayoutRail;

/// Point-in-time view of the contract's public state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub name: String,
    pub symbol: String,
    pub owner: Address,
    pub beneficiary: Address,
    pub beneficiary_policy: BeneficiaryPolicy,
    pub distribution: DistributionConfig,
    pub price: PriceGrowthStats,
    pub supply: SupplyStats,
    pub burn: BurnStats,
    pub next_harvest_at: u64,
    pub pool_id: String,
    pub pool_initialized: bool,
    pub position: PositionTotals,
    pub pending_liquidity: u128,
    pub held_base: u128,
}

pub struct SurgeToken {
    contract: Address,
    ownership: Ownership,
    beneficiary: Address,
    beneficiary_policy: BeneficiaryPolicy,
    unprovisioned_policy: UnprovisionedPolicy,
    rollback_failed_provision: bool,
    distribution: DistributionConfig,
    starting_ratio: u128,
    pub(crate) price: PriceEngine,
    pub(crate) tokens: TokenLedger,
    pub(crate) liquidity: LiquidityLedger,
    pub(crate) scheduler: BurnScheduler,
    /// Base asset held by the contract, pending liquidity included
    pub(crate) held_base: u128,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) pool: Box<dyn LiquidityCollaborator>,
    pub(crate) rail: Box<dyn PayoutRail>,
    sink: Box<dyn EventSink + Send>,
}

impl SurgeToken {
    pub fn new(
        config: &TokenConfig,
        pool: Box<dyn LiquidityCollaborator>,
        rail: Box<dyn PayoutRail>,
        sink: Box<dyn EventSink + Send>,
    ) -> Result<Self> {
        config.validate()?;

        let roles = &config.roles;
        let token = Self {
            contract: roles.contract,
            ownership: Ownership::new(roles.owner),
            beneficiary: roles.beneficiary,
            beneficiary_policy: config.distribution.beneficiary_policy,
            unprovisioned_policy: config.liquidity.unprovisioned,
            rollback_failed_provision: config.liquidity.rollback_failed_provision,
            distribution: config.distribution()?,
            starting_ratio: u128::from(config.liquidity.starting_ratio),
            price: PriceEngine::new(u128::from(config.token.initial_price))?,
            tokens: TokenLedger::new(config.token.name.clone(), config.token.symbol.clone()),
            liquidity: LiquidityLedger::new(config.pool_key(), roles.contract, roles.pool_manager),
            scheduler: BurnScheduler::new(config.harvest.interval_secs, config.token.deployed_at),
            held_base: 0,
            guard: ReentrancyGuard::new(),
            pool,
            rail,
            sink,
        };

        log::info!(
            "deployed {} ({}) at {}, price {}, pool {}",
            config.token.name,
            config.token.symbol,
            token.contract,
            token.price.current_price(),
            token.liquidity.pool_id()
        );
        Ok(token)
    }

    /// Hand a committed operation's notifications to the sink
    pub(crate) fn commit(&mut self, mut events: EventLog) {
        events.flush_into(self.sink.as_mut());
    }

    /// Supply conservation and base-asset bookkeeping
    pub(crate) fn verify_invariants(&self) -> Result<()> {
        let sum = self.tokens.sum_of_balances();
        if sum != self.tokens.total_supply() {
            return Err(TokenError::InvariantViolation(format!(
                "total supply {} != sum of balances {}",
                self.tokens.total_supply(),
                sum
            )));
        }
        if self.liquidity.pending_base() > self.held_base {
            return Err(TokenError::InvariantViolation(format!(
                "pending liquidity {} exceeds held base {}",
                self.liquidity.pending_base(),
                self.held_base
            )));
        }
        Ok(())
    }

    // ---- read surface ----

    pub fn name(&self) -> &str {
        self.tokens.name()
    }

    pub fn symbol(&self) -> &str {
        self.tokens.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.tokens.decimals()
    }

    pub fn contract_address(&self) -> Address {
        self.contract
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn total_supply(&self) -> u128 {
        self.tokens.total_supply()
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.tokens.balance_of(holder)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.tokens.allowance(owner, spender)
    }

    pub fn supply_stats(&self) -> SupplyStats {
        self.tokens.stats()
    }

    pub fn current_price(&self) -> u128 {
        self.price.current_price()
    }

    pub fn buy_count(&self) -> u64 {
        self.price.buy_count()
    }

    pub fn quote_tokens_for_payment(&self, payment_amount: u128) -> Result<u128> {
        Ok(self.price.quote_tokens_for_payment(payment_amount)?)
    }

    pub fn quote_payment_for_tokens(&self, token_amount: u128) -> Result<u128> {
        Ok(self.price.quote_payment_for_tokens(token_amount)?)
    }

    pub fn preview_purchase(&self, payment_amount: u128) -> Result<PurchasePrice> {
        Ok(self.price.preview_purchase(payment_amount)?)
    }

    pub fn price_growth_stats(&self) -> PriceGrowthStats {
        self.price.growth_stats()
    }

    pub fn distribution(&self) -> DistributionConfig {
        self.distribution
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn beneficiary_policy(&self) -> BeneficiaryPolicy {
        self.beneficiary_policy
    }

    pub fn unprovisioned_policy(&self) -> UnprovisionedPolicy {
        self.unprovisioned_policy
    }

    /// Whether a rejected provisioning burns its matching mint again
    pub fn rollback_failed_provision(&self) -> bool {
        self.rollback_failed_provision
    }

    /// Units destroyed through harvest-and-burn
    pub fn total_burned(&self) -> u128 {
        self.scheduler.total_burned()
    }

    pub fn burn_stats(&self) -> &BurnStats {
        self.scheduler.stats()
    }

    pub fn harvest_interval(&self) -> u64 {
        self.scheduler.harvest_interval()
    }

    pub fn next_harvest_at(&self) -> u64 {
        self.scheduler.next_harvest_at()
    }

    pub fn pool_key(&self) -> &PoolKey {
        self.liquidity.pool()
    }

    pub fn pool_id(&self) -> PoolId {
        self.liquidity.pool_id()
    }

    pub fn position_range(&self) -> TickRange {
        self.liquidity.range()
    }

    pub fn is_pool_initialized(&self) -> bool {
        self.liquidity.is_initialized()
    }

    pub fn position(&self) -> &PositionTotals {
        self.liquidity.position()
    }

    pub fn pending_liquidity(&self) -> u128 {
        self.liquidity.pending_base()
    }

    pub fn held_base(&self) -> u128 {
        self.held_base
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            name: self.name().to_string(),
            symbol: self.symbol().to_string(),
            owner: self.owner(),
            beneficiary: self.beneficiary,
            beneficiary_policy: self.beneficiary_policy,
            distribution: self.distribution,
            price: self.price_growth_stats(),
            supply: self.supply_stats(),
            burn: self.burn_stats().clone(),
            next_harvest_at: self.next_harvest_at(),
            pool_id: self.pool_id().to_string(),
            pool_initialized: self.is_pool_initialized(),
            position: self.position().clone(),
            pending_liquidity: self.pending_liquidity(),
            held_base: self.held_base,
        }
    }

    // ---- configuration surface (owner only) ----

    pub fn set_beneficiary(&mut self, caller: &Address, beneficiary: Address) -> Result<()> {
        self.ownership.require_owner(caller)?;
        if beneficiary.is_zero() {
            return Err(TokenError::InvalidAddress(
                "beneficiary cannot be the zero address".to_string(),
            ));
        }

        let previous = std::mem::replace(&mut self.beneficiary, beneficiary);
        let mut events = EventLog::new();
        events.emit(SurgeEvent::BeneficiaryUpdated {
            previous,
            current: beneficiary,
        });
        self.commit(events);
        Ok(())
    }

    /// Replace both ratios at once; a sum other than the denominator leaves
    /// the current split untouched.
    pub fn set_distribution(
        &mut self,
        caller: &Address,
        beneficiary_ratio: u16,
        liquidity_ratio: u16,
    ) -> Result<()> {
        self.ownership.require_owner(caller)?;
        self.distribution = DistributionConfig::new(beneficiary_ratio, liquidity_ratio)?;

        let mut events = EventLog::new();
        events.emit(SurgeEvent::DistributionUpdated {
            beneficiary_ratio,
            liquidity_ratio,
        });
        self.commit(events);
        Ok(())
    }

    pub fn set_harvest_interval(&mut self, caller: &Address, interval_secs: u64) -> Result<()> {
        self.ownership.require_owner(caller)?;
        let previous = self.scheduler.set_harvest_interval(interval_secs);

        let mut events = EventLog::new();
        events.emit(SurgeEvent::HarvestIntervalUpdated {
            previous,
            current: interval_secs,
        });
        self.commit(events);
        Ok(())
    }

    pub fn set_beneficiary_policy(
        &mut self,
        caller: &Address,
        policy: BeneficiaryPolicy,
    ) -> Result<()> {
        self.ownership.require_owner(caller)?;
        self.beneficiary_policy = policy;

        let mut events = EventLog::new();
        events.emit(SurgeEvent::BeneficiaryPolicyUpdated {
            policy: policy.to_string(),
        });
        self.commit(events);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        let previous = self.ownership.transfer(caller, new_owner)?;

        let mut events = EventLog::new();
        events.emit(SurgeEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        self.commit(events);
        Ok(())
    }

    // ---- liquidity ----

    /// Create the pool with the configured starting ratio. A rejection is
    /// reported through the sink and may be retried.
    pub fn initialize_pool(&mut self, caller: &Address) -> Result<PoolId> {
        self.ownership.require_owner(caller)?;

        self.guard.enter()?;
        let mut events = EventLog::new();
        let result =
            self.liquidity
                .initialize_pool(self.starting_ratio, self.pool.as_mut(), &mut events);
        self.guard.exit();
        self.commit(events);
        Ok(result?)
    }

    /// Provision liquidity held back before the pool existed or after a
    /// failed provisioning. Returns `None` when nothing is pending.
    pub fn provision_pending(&mut self, caller: &Address) -> Result<Option<ProvisionOutcome>> {
        self.ownership.require_owner(caller)?;
        if !self.liquidity.is_initialized() {
            return Err(TokenError::NotInitialized);
        }

        self.guard.enter()?;
        let result = self.provision_pending_inner();
        self.guard.exit();
        result
    }

    fn provision_pending_inner(&mut self) -> Result<Option<ProvisionOutcome>> {
        let amount = self.liquidity.pending_base();
        if amount == 0 {
            return Ok(None);
        }

        let matching = self.price.quote_tokens_for_payment(amount)?;
        self.tokens.ensure_mintable(matching)?;

        let mut events = EventLog::new();
        let amount = self.liquidity.take_pending();
        let outcome = match self.liquidity.provision(
            amount,
            &self.price,
            &mut self.tokens,
            self.pool.as_mut(),
            self.rollback_failed_provision,
            &mut events,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.liquidity.restore_pending(amount);
                return Err(e.into());
            }
        };
        self.held_base -= outcome.settled_base();

        self.verify_invariants()?;
        self.commit(events);
        Ok(Some(outcome))
    }

    // ---- holder operations ----

    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        let mut events = EventLog::new();
        self.tokens.transfer(from, to, amount, &mut events)?;
        self.commit(events);
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()> {
        let mut events = EventLog::new();
        self.tokens.approve(owner, spender, amount, &mut events)?;
        self.commit(events);
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        let mut events = EventLog::new();
        self.tokens
            .transfer_from(spender, from, to, amount, &mut events)?;
        self.commit(events);
        Ok(())
    }

    /// Holder-initiated burn. Not counted in the fee-burn total.
    pub fn burn(&mut self, from: Address, amount: u128) -> Result<()> {
        let mut events = EventLog::new();
        self.tokens.burn(from, amount, &mut events)?;
        self.commit(events);
        Ok(())
    }
}

impl std::fmt::Debug for SurgeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurgeToken")
            .field("contract", &self.contract)
            .field("owner", &self.ownership.owner())
            .field("price", &self.price.current_price())
            .field("total_supply", &self.tokens.total_supply())
            .field("pool_initialized", &self.liquidity.is_initialized())
            .field("held_base", &self.held_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payout::RecordingRail;
    use surge_core::SharedEventLog;
    use surge_liquidity::SimulatedPool;

    fn token() -> (SurgeToken, SimulatedPool, SharedEventLog) {
        let config = TokenConfig::default();
        let pool = SimulatedPool::new();
        let events = SharedEventLog::new();
        let token = SurgeToken::new(
            &config,
            Box::new(pool.clone()),
            Box::new(RecordingRail::new()),
            Box::new(events.clone()),
        )
        .unwrap();
        (token, pool, events)
    }

    #[test]
    fn test_initialize_pool_rejected_while_entered() {
        let (mut token, pool, events) = token();
        let owner = token.owner();

        token.guard.enter().unwrap();
        assert!(matches!(
            token.initialize_pool(&owner),
            Err(TokenError::Reentrancy)
        ));
        assert!(!pool.is_initialized());
        assert!(!token.is_pool_initialized());
        assert!(events.is_empty());

        token.guard.exit();
        token.initialize_pool(&owner).unwrap();
        assert!(pool.is_initialized());
    }

    #[test]
    fn test_initialize_pool_releases_guard_on_failure() {
        let (mut token, pool, _events) = token();
        let owner = token.owner();

        pool.set_fail_initialize(true);
        assert!(token.initialize_pool(&owner).is_err());

        pool.set_fail_initialize(false);
        token.initialize_pool(&owner).unwrap();
    }
}
