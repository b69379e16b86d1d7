//! Purchase flow
//!
//! An inbound payment mints tokens to the buyer at the pre-purchase price,
//! pays the beneficiary share, provisions (or holds) the liquidity share and
//! finally grows the price. Every check that can reject the purchase runs
//! before the first externally visible effect.

use serde::{Deserialize, Serialize};
use surge_core::{Address, EventLog, EventSink, SurgeEvent};
use surge_economics::{FundSplitter, MathError};
use surge_liquidity::ProvisionOutcome;

use crate::config::{BeneficiaryPolicy, UnprovisionedPolicy};
use crate::error::{Result, TokenError};
use crate::token::SurgeToken;

/// Where the liquidity share of a purchase went
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LiquidityDisposition {
    /// The liquidity share was zero
    None,
    /// Kept by the contract until the pool exists
    Held { amount: u128, pending_total: u128 },
    Provision(ProvisionOutcome),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub buyer: Address,
    pub payment_amount: u128,
    pub token_amount: u128,
    /// Amount actually paid out to the beneficiary
    pub beneficiary_paid: u128,
    /// Liquidity share, including a folded beneficiary share
    pub liquidity_share: u128,
    /// Rounding remainder kept by the contract
    pub residue: u128,
    pub price_before: u128,
    pub price_after: u128,
    pub buy_count: u64,
    pub liquidity: LiquidityDisposition,
}

impl SurgeToken {
    /// Handle an inbound payment of `payment_amount` from `buyer`
    pub fn purchase(&mut self, buyer: Address, payment_amount: u128) -> Result<PurchaseReceipt> {
        self.guard.enter()?;
        let result = self.purchase_inner(buyer, payment_amount);
        self.guard.exit();
        result
    }

    fn purchase_inner(&mut self, buyer: Address, payment_amount: u128) -> Result<PurchaseReceipt> {
        if payment_amount == 0 {
            return Err(TokenError::InvalidPayment("payment must be positive".to_string()));
        }
        if buyer.is_zero() {
            return Err(TokenError::InvalidAddress(
                "buyer cannot be the zero address".to_string(),
            ));
        }

        let quote = self.price.preview_purchase(payment_amount)?;
        let split = FundSplitter::split(payment_amount, &self.distribution())?;
        let pool_ready = self.liquidity.is_initialized();
        let must_hold = |share: u128, token: &SurgeToken| {
            share > 0
                && !pool_ready
                && token.unprovisioned_policy() == UnprovisionedPolicy::Reject
        };
        if must_hold(split.liquidity_share, self) {
            return Err(TokenError::NotInitialized);
        }

        // The matching mint is bounded by both shares, in case the
        // beneficiary share is folded into liquidity
        let matching_bound = self
            .price
            .quote_tokens_for_payment(split.beneficiary_share + split.liquidity_share)?;
        let mint_bound = quote
            .token_amount
            .checked_add(matching_bound)
            .ok_or(MathError::Overflow)?;
        self.tokens.ensure_mintable(mint_bound)?;
        let held_after_payment = self
            .held_base
            .checked_add(payment_amount)
            .ok_or(MathError::Overflow)?;

        let beneficiary = self.beneficiary();
        let mut liquidity_share = split.liquidity_share;
        let mut beneficiary_paid = 0;
        let mut payout_failure = None;
        if split.beneficiary_share > 0 {
            match self.rail.send(beneficiary, split.beneficiary_share) {
                Ok(()) => beneficiary_paid = split.beneficiary_share,
                Err(e) => match self.beneficiary_policy() {
                    BeneficiaryPolicy::Strict => {
                        log::warn!("purchase by {} aborted: {}", buyer, e);
                        return Err(TokenError::TransferFailed {
                            to: beneficiary,
                            amount: split.beneficiary_share,
                            reason: e.to_string(),
                        });
                    }
                    BeneficiaryPolicy::Lenient => {
                        // Nothing has moved yet
                        if must_hold(liquidity_share + split.beneficiary_share, self) {
                            return Err(TokenError::NotInitialized);
                        }
                        log::warn!(
                            "beneficiary payout of {} failed ({}), folding into liquidity",
                            split.beneficiary_share,
                            e
                        );
                        liquidity_share += split.beneficiary_share;
                        payout_failure = Some(e.to_string());
                    }
                },
            }
        }

        let mut events = EventLog::new();
        self.held_base = held_after_payment - beneficiary_paid;
        self.tokens.mint(buyer, quote.token_amount, &mut events)?;

        match payout_failure {
            None if beneficiary_paid > 0 => events.emit(SurgeEvent::BeneficiaryPaid {
                beneficiary,
                amount: beneficiary_paid,
            }),
            None => {}
            Some(reason) => events.emit(SurgeEvent::BeneficiaryPayoutFailed {
                beneficiary,
                amount: split.beneficiary_share,
                reason,
            }),
        }

        let liquidity = if liquidity_share == 0 {
            LiquidityDisposition::None
        } else if pool_ready {
            let rollback = self.rollback_failed_provision();
            let outcome = self.liquidity.provision(
                liquidity_share,
                &self.price,
                &mut self.tokens,
                self.pool.as_mut(),
                rollback,
                &mut events,
            )?;
            self.held_base -= outcome.settled_base();
            LiquidityDisposition::Provision(outcome)
        } else {
            let pending_total = self.liquidity.hold(liquidity_share, &mut events);
            LiquidityDisposition::Held {
                amount: liquidity_share,
                pending_total,
            }
        };

        let update = self.price.apply_volume_growth(payment_amount, &mut events)?;
        events.emit(SurgeEvent::Purchase {
            buyer,
            payment_amount,
            token_amount: quote.token_amount,
        });

        self.verify_invariants()?;
        self.commit(events);

        log::info!(
            "purchase #{}: {} paid {} for {} tokens, price {} -> {}",
            update.buy_count,
            buyer,
            payment_amount,
            quote.token_amount,
            update.old_price,
            update.new_price
        );

        Ok(PurchaseReceipt {
            buyer,
            payment_amount,
            token_amount: quote.token_amount,
            beneficiary_paid,
            liquidity_share,
            residue: split.residue,
            price_before: update.old_price,
            price_after: update.new_price,
            buy_count: update.buy_count,
            liquidity,
        })
    }
}
