//! SURGE Core Library
//!
//! Holder identities, the token ledger and the notification log shared by
//! every other SURGE crate.

pub mod error;
pub mod events;
pub mod identity;
pub mod ledger;

// Re-export main types
pub use error::{LedgerError, Result};
pub use events::{EventLog, EventSink, LogSink, SharedEventLog, SurgeEvent};
pub use identity::Address;
pub use ledger::{SupplyStats, TokenLedger, TOKEN_DECIMALS};
