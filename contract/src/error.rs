//! Contract error types
//!
//! Lower-level errors are folded into one taxonomy so callers can match on
//! what went wrong without knowing which component reported it.

use surge_core::{Address, LedgerError};
use surge_economics::{EconomicsError, MathError};
use surge_liquidity::LiquidityError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Pool already initialized")]
    AlreadyInitialized,

    #[error("Pool not initialized")]
    NotInitialized,

    #[error("Harvest too soon: now {now}, next allowed at {next_allowed}")]
    TooSoon { now: u64, next_allowed: u64 },

    #[error("Transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: Address,
        amount: u128,
        reason: String,
    },

    #[error("Liquidity collaborator failure: {0}")]
    CollaboratorFailure(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Insufficient balance for {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Address,
        requested: u128,
        available: u128,
    },

    #[error("Insufficient allowance for {spender}: requested {requested}, approved {approved}")]
    InsufficientAllowance {
        spender: Address,
        requested: u128,
        approved: u128,
    },

    #[error("Re-entrant call rejected")]
    Reentrancy,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, TokenError>;

impl From<LedgerError> for TokenError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                holder,
                requested,
                available,
            } => TokenError::InsufficientBalance {
                holder,
                requested,
                available,
            },
            LedgerError::InsufficientAllowance {
                spender,
                requested,
                approved,
            } => TokenError::InsufficientAllowance {
                spender,
                requested,
                approved,
            },
            LedgerError::SupplyOverflow => TokenError::Math(MathError::Overflow),
            LedgerError::ZeroAddress(role) => {
                TokenError::InvalidAddress(format!("zero address as {}", role))
            }
            LedgerError::InvalidAddress(addr) => TokenError::InvalidAddress(addr),
        }
    }
}

impl From<EconomicsError> for TokenError {
    fn from(err: EconomicsError) -> Self {
        match err {
            EconomicsError::Math(e) => TokenError::Math(e),
            e @ EconomicsError::RatioSum { .. } => TokenError::InvariantViolation(e.to_string()),
            other => TokenError::InvalidParameter(other.to_string()),
        }
    }
}

impl From<LiquidityError> for TokenError {
    fn from(err: LiquidityError) -> Self {
        match err {
            LiquidityError::AlreadyInitialized => TokenError::AlreadyInitialized,
            LiquidityError::NotInitialized => TokenError::NotInitialized,
            LiquidityError::TooSoon { now, next_allowed } => {
                TokenError::TooSoon { now, next_allowed }
            }
            LiquidityError::Collaborator(e) => TokenError::CollaboratorFailure(e.to_string()),
            e @ LiquidityError::FeesNotBurned { .. } => {
                TokenError::CollaboratorFailure(e.to_string())
            }
            LiquidityError::Ledger(e) => e.into(),
            LiquidityError::Economics(e) => e.into(),
            e @ (LiquidityError::SettlementInProgress(_)
            | LiquidityError::UnknownSettlement(_)
            | LiquidityError::SettlementExceedsIntent(_)) => {
                TokenError::InvariantViolation(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surge_liquidity::PoolError;

    #[test]
    fn test_liquidity_errors_map_to_taxonomy() {
        let err: TokenError = LiquidityError::Collaborator(PoolError::Unavailable("down".into())).into();
        assert!(matches!(err, TokenError::CollaboratorFailure(_)));

        let err: TokenError = LiquidityError::TooSoon {
            now: 5,
            next_allowed: 10,
        }
        .into();
        assert!(matches!(
            err,
            TokenError::TooSoon {
                now: 5,
                next_allowed: 10
            }
        ));
    }

    #[test]
    fn test_ratio_sum_mismatch_is_invariant_violation() {
        let err: TokenError = EconomicsError::RatioSum {
            beneficiary: 600,
            liquidity: 600,
            expected: 1000,
        }
        .into();
        assert!(matches!(err, TokenError::InvariantViolation(_)));

        let err: TokenError = LiquidityError::Economics(EconomicsError::RatioSum {
            beneficiary: 0,
            liquidity: 0,
            expected: 1000,
        })
        .into();
        assert!(matches!(err, TokenError::InvariantViolation(_)));
    }

    #[test]
    fn test_unburned_fees_are_collaborator_failure() {
        let err: TokenError = LiquidityError::FeesNotBurned {
            token_amount: 1,
            base_amount: 2,
            reason: "custody".into(),
        }
        .into();
        assert!(matches!(err, TokenError::CollaboratorFailure(_)));
    }

    #[test]
    fn test_supply_overflow_is_math_error() {
        let err: TokenError = LedgerError::SupplyOverflow.into();
        assert!(matches!(err, TokenError::Math(MathError::Overflow)));
    }
}
