//! SURGE Liquidity Module
//!
//! Pool identity, the contract's full-range position, two-phase settlement
//! of pool calls, and the harvest-and-burn schedule.

pub mod collaborator;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod scheduler;
pub mod settlement;
pub mod simulated;

pub use collaborator::{
    CollectedFees, LiquidityCollaborator, LiquidityDelta, PoolError, SettledAmounts,
};
pub use error::{LiquidityError, Result};
pub use ledger::{LiquidityLedger, PositionTotals, ProvisionOutcome};
pub use pool::{
    PoolId, PoolKey, TickRange, DEFAULT_FEE_TIER, DEFAULT_TICK_SPACING, MAX_TICK, MIN_TICK, NATIVE,
};
pub use scheduler::{BurnScheduler, HarvestReceipt};
pub use settlement::{
    LiquidityIntent, Settlement, SettlementAmounts, SettlementHandle, SettlementState,
};
pub use simulated::SimulatedPool;
