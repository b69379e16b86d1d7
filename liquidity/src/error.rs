//! Liquidity error types

use surge_core::LedgerError;
use surge_economics::EconomicsError;
use thiserror::Error;

use crate::collaborator::PoolError;
use crate::settlement::SettlementHandle;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiquidityError {
    #[error("Pool already initialized")]
    AlreadyInitialized,

    #[error("Pool not initialized")]
    NotInitialized,

    #[error("Harvest too soon: now {now}, next allowed at {next_allowed}")]
    TooSoon { now: u64, next_allowed: u64 },

    #[error("Liquidity collaborator failure: {0}")]
    Collaborator(#[from] PoolError),

    #[error("A liquidity operation is already awaiting settlement ({0})")]
    SettlementInProgress(SettlementHandle),

    #[error("No pending settlement for handle {0}")]
    UnknownSettlement(SettlementHandle),

    #[error("Settlement exceeds intent: {0}")]
    SettlementExceedsIntent(String),

    #[error("Collected fees not burned ({token_amount} tokens, {base_amount} base): {reason}")]
    FeesNotBurned {
        token_amount: u128,
        base_amount: u128,
        reason: String,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Economics error: {0}")]
    Economics(#[from] EconomicsError),
}

pub type Result<T> = std::result::Result<T, LiquidityError>;
