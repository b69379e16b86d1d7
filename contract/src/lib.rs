//! SURGE Token Contract
//!
//! The composed bonding-curve token: purchases, harvest-and-burn, the
//! owner configuration surface and ERC20-like holder operations.

pub mod access;
pub mod config;
pub mod error;
pub mod guard;
pub mod harvest;
pub mod payout;
pub mod purchase;
pub mod shared;
pub mod token;

pub use access::Ownership;
pub use config::{BeneficiaryPolicy, ConfigError, TokenConfig, UnprovisionedPolicy};
pub use error::{Result, TokenError};
pub use guard::ReentrancyGuard;
pub use payout::{PayoutError, PayoutRail, RecordingRail};
pub use purchase::{LiquidityDisposition, PurchaseReceipt};
pub use shared::SharedSurgeToken;
pub use token::{SurgeToken, TokenSnapshot};

pub use surge_liquidity::{HarvestReceipt, ProvisionOutcome, SimulatedPool};
