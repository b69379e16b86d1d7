//! Two-phase settlement of liquidity operations
//!
//! A liquidity operation first registers its intent and receives a handle.
//! The amounts the pool reports are then settled against that handle. Only
//! one operation can be awaiting settlement at a time, which rules out a
//! nested liquidity call while one is in flight.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::collaborator::{CollectedFees, LiquidityDelta, SettledAmounts};
use crate::error::{LiquidityError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementHandle(u64);

impl fmt::Display for SettlementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LiquidityIntent {
    AddLiquidity(LiquidityDelta),
    CollectFees,
}

/// What the pool reported for a pending operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SettlementAmounts {
    Added(SettledAmounts),
    Fees(CollectedFees),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SettlementState {
    Idle,
    AwaitingSettlement {
        handle: SettlementHandle,
        intent: LiquidityIntent,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    state: SettlementState,
    next_handle: u64,
}

impl Settlement {
    pub fn new() -> Self {
        Self {
            state: SettlementState::Idle,
            next_handle: 1,
        }
    }

    pub fn state(&self) -> &SettlementState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SettlementState::Idle
    }

    pub fn begin(&mut self, intent: LiquidityIntent) -> Result<SettlementHandle> {
        if let SettlementState::AwaitingSettlement { handle, .. } = self.state {
            return Err(LiquidityError::SettlementInProgress(handle));
        }

        let handle = SettlementHandle(self.next_handle);
        self.next_handle += 1;
        self.state = SettlementState::AwaitingSettlement { handle, intent };
        Ok(handle)
    }

    /// Close the pending operation with the amounts the pool reported.
    ///
    /// Added amounts may not exceed what the intent offered. On any error the
    /// operation stays pending; callers `abort` it.
    pub fn settle(
        &mut self,
        handle: SettlementHandle,
        amounts: SettlementAmounts,
    ) -> Result<LiquidityIntent> {
        let intent = self.pending_intent(handle)?;

        match (intent, amounts) {
            (LiquidityIntent::AddLiquidity(offered), SettlementAmounts::Added(settled)) => {
                if settled.token_amount > offered.token_amount
                    || settled.base_amount > offered.base_amount
                {
                    return Err(LiquidityError::SettlementExceedsIntent(format!(
                        "settled ({}, {}) but offered ({}, {})",
                        settled.token_amount,
                        settled.base_amount,
                        offered.token_amount,
                        offered.base_amount
                    )));
                }
            }
            (LiquidityIntent::CollectFees, SettlementAmounts::Fees(_)) => {}
            (intent, amounts) => {
                return Err(LiquidityError::SettlementExceedsIntent(format!(
                    "{:?} cannot settle {:?}",
                    intent, amounts
                )));
            }
        }

        self.state = SettlementState::Idle;
        Ok(intent)
    }

    /// Drop the pending operation without settling it
    pub fn abort(&mut self, handle: SettlementHandle) -> Result<LiquidityIntent> {
        let intent = self.pending_intent(handle)?;
        self.state = SettlementState::Idle;
        Ok(intent)
    }

    fn pending_intent(&self, handle: SettlementHandle) -> Result<LiquidityIntent> {
        match self.state {
            SettlementState::AwaitingSettlement {
                handle: pending,
                intent,
            } if pending == handle => Ok(intent),
            _ => Err(LiquidityError::UnknownSettlement(handle)),
        }
    }
}

impl Default for Settlement {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(token_amount: u128, base_amount: u128) -> LiquidityIntent {
        LiquidityIntent::AddLiquidity(LiquidityDelta {
            token_amount,
            base_amount,
        })
    }

    #[test]
    fn test_begin_settle_cycle() {
        let mut settlement = Settlement::new();
        let handle = settlement.begin(add(100, 10)).unwrap();
        assert!(!settlement.is_idle());

        let intent = settlement
            .settle(
                handle,
                SettlementAmounts::Added(SettledAmounts {
                    token_amount: 100,
                    base_amount: 9,
                }),
            )
            .unwrap();

        assert_eq!(intent, add(100, 10));
        assert!(settlement.is_idle());
    }

    #[test]
    fn test_nested_begin_rejected() {
        let mut settlement = Settlement::new();
        let handle = settlement.begin(LiquidityIntent::CollectFees).unwrap();

        let result = settlement.begin(add(1, 1));
        assert_eq!(result, Err(LiquidityError::SettlementInProgress(handle)));
    }

    #[test]
    fn test_settle_over_intent_rejected() {
        let mut settlement = Settlement::new();
        let handle = settlement.begin(add(100, 10)).unwrap();

        let result = settlement.settle(
            handle,
            SettlementAmounts::Added(SettledAmounts {
                token_amount: 101,
                base_amount: 10,
            }),
        );
        assert!(matches!(
            result,
            Err(LiquidityError::SettlementExceedsIntent(_))
        ));
        assert!(!settlement.is_idle());

        settlement.abort(handle).unwrap();
        assert!(settlement.is_idle());
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut settlement = Settlement::new();
        let first = settlement.begin(LiquidityIntent::CollectFees).unwrap();
        settlement.abort(first).unwrap();

        let second = settlement.begin(LiquidityIntent::CollectFees).unwrap();
        assert_ne!(first, second);
        assert_eq!(
            settlement.settle(first, SettlementAmounts::Fees(CollectedFees::default())),
            Err(LiquidityError::UnknownSettlement(first))
        );
    }

    #[test]
    fn test_mismatched_amount_kind_rejected() {
        let mut settlement = Settlement::new();
        let handle = settlement.begin(LiquidityIntent::CollectFees).unwrap();

        let result = settlement.settle(handle, SettlementAmounts::Added(SettledAmounts::default()));
        assert!(result.is_err());
    }
}
