//! External liquidity pool service
//!
//! The pool service is opaque: the contract only sees whether a call was
//! accepted and which amounts were settled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool::{PoolKey, TickRange};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Rejected by pool: {0}")]
    Rejected(String),

    #[error("Pool unavailable: {0}")]
    Unavailable(String),
}

/// Maximum amounts offered to the pool for one liquidity addition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiquidityDelta {
    pub token_amount: u128,
    pub base_amount: u128,
}

/// Amounts the pool actually took
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettledAmounts {
    pub token_amount: u128,
    pub base_amount: u128,
}

/// Accrued trading fees released by the pool
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectedFees {
    pub token_amount: u128,
    pub base_amount: u128,
}

pub trait LiquidityCollaborator: Send {
    /// Create the pool at `starting_ratio` (collaborator-defined price encoding)
    fn initialize(&mut self, pool: &PoolKey, starting_ratio: u128) -> Result<(), PoolError>;

    fn add_liquidity(
        &mut self,
        pool: &PoolKey,
        range: TickRange,
        delta: LiquidityDelta,
    ) -> Result<SettledAmounts, PoolError>;

    fn collect_fees(&mut self, pool: &PoolKey, range: TickRange) -> Result<CollectedFees, PoolError>;
}
