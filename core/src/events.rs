//! Contract notifications
//!
//! Every observable state change is reported as a [`SurgeEvent`] pushed into
//! an [`EventSink`]. Sinks are append-only: nothing reads back or rewrites an
//! emitted event.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::identity::Address;

/// Notifications emitted by the token contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SurgeEvent {
    /// Balance movement. Mints come from the zero address, burns go to it.
    Transfer {
        from: Address,
        to: Address,
        amount: u128,
    },

    /// Spending allowance set
    Approval {
        owner: Address,
        spender: Address,
        amount: u128,
    },

    /// Contract price grown after a purchase
    PriceUpdated {
        old_price: u128,
        new_price: u128,
        buy_count: u64,
        payment_amount: u128,
    },

    /// Purchase completed
    Purchase {
        buyer: Address,
        payment_amount: u128,
        token_amount: u128,
    },

    /// Beneficiary share paid out
    BeneficiaryPaid { beneficiary: Address, amount: u128 },

    /// Beneficiary payout rejected (lenient policy folds it into liquidity)
    BeneficiaryPayoutFailed {
        beneficiary: Address,
        amount: u128,
        reason: String,
    },

    /// Liquidity share kept by the contract until it can be provisioned
    LiquidityHeld { amount: u128, pending_total: u128 },

    /// Full-range liquidity added to the pool
    LiquidityProvisioned {
        base_amount: u128,
        token_amount: u128,
    },

    /// Liquidity collaborator rejected a provisioning call
    LiquidityProvisionFailed {
        base_amount: u128,
        token_amount: u128,
        rolled_back: bool,
        reason: String,
    },

    /// Pool created with the collaborator
    PoolInitialized {
        pool_id: [u8; 32],
        starting_ratio: u128,
    },

    /// Pool creation rejected; the position stays uninitialized
    PoolInitializationFailed { reason: String },

    /// Trading fees collected from the position
    FeesCollected {
        token_amount: u128,
        base_amount: u128,
    },

    /// Tokens destroyed through the fee-burn path
    TokensBurned { amount: u128, total_burned: u128 },

    /// Fee collection rejected by the collaborator
    HarvestFailed { reason: String },

    DistributionUpdated {
        beneficiary_ratio: u16,
        liquidity_ratio: u16,
    },

    BeneficiaryUpdated { previous: Address, current: Address },

    BeneficiaryPolicyUpdated { policy: String },

    HarvestIntervalUpdated { previous: u64, current: u64 },

    OwnershipTransferred { previous: Address, current: Address },
}

impl SurgeEvent {
    /// Short event name used in logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            SurgeEvent::Transfer { .. } => "Transfer",
            SurgeEvent::Approval { .. } => "Approval",
            SurgeEvent::PriceUpdated { .. } => "PriceUpdated",
            SurgeEvent::Purchase { .. } => "Purchase",
            SurgeEvent::BeneficiaryPaid { .. } => "BeneficiaryPaid",
            SurgeEvent::BeneficiaryPayoutFailed { .. } => "BeneficiaryPayoutFailed",
            SurgeEvent::LiquidityHeld { .. } => "LiquidityHeld",
            SurgeEvent::LiquidityProvisioned { .. } => "LiquidityProvisioned",
            SurgeEvent::LiquidityProvisionFailed { .. } => "LiquidityProvisionFailed",
            SurgeEvent::PoolInitialized { .. } => "PoolInitialized",
            SurgeEvent::PoolInitializationFailed { .. } => "PoolInitializationFailed",
            SurgeEvent::FeesCollected { .. } => "FeesCollected",
            SurgeEvent::TokensBurned { .. } => "TokensBurned",
            SurgeEvent::HarvestFailed { .. } => "HarvestFailed",
            SurgeEvent::DistributionUpdated { .. } => "DistributionUpdated",
            SurgeEvent::BeneficiaryUpdated { .. } => "BeneficiaryUpdated",
            SurgeEvent::BeneficiaryPolicyUpdated { .. } => "BeneficiaryPolicyUpdated",
            SurgeEvent::HarvestIntervalUpdated { .. } => "HarvestIntervalUpdated",
            SurgeEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SurgeEvent::BeneficiaryPayoutFailed { .. }
                | SurgeEvent::LiquidityProvisionFailed { .. }
                | SurgeEvent::PoolInitializationFailed { .. }
                | SurgeEvent::HarvestFailed { .. }
        )
    }
}

impl fmt::Display for SurgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{}", self.name()),
        }
    }
}

/// Append-only notification sink
pub trait EventSink {
    fn emit(&mut self, event: SurgeEvent);
}

/// In-memory event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<SurgeEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SurgeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count events with the given name
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    /// Move every buffered event into `sink`, leaving this log empty
    pub fn flush_into(&mut self, sink: &mut dyn EventSink) {
        for event in self.events.drain(..) {
            sink.emit(event);
        }
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: SurgeEvent) {
        self.events.push(event);
    }
}

/// Sink that writes every notification through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: SurgeEvent) {
        if event.is_failure() {
            log::warn!(target: "surge::events", "{}", event);
        } else {
            log::info!(target: "surge::events", "{}", event);
        }
    }
}

/// Event log behind a shared handle. Clones observe the same events, so a
/// caller can hand one clone to the contract and read through another.
#[derive(Debug, Clone, Default)]
pub struct SharedEventLog {
    inner: Arc<Mutex<EventLog>>,
}

impl SharedEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EventLog> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Vec<SurgeEvent> {
        self.lock().events().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count(&self, name: &str) -> usize {
        self.lock().count(name)
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<SurgeEvent> {
        std::mem::take(&mut *self.lock()).events
    }
}

impl EventSink for SharedEventLog {
    fn emit(&mut self, event: SurgeEvent) {
        self.lock().emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_moves_events() {
        let mut buffer = EventLog::new();
        buffer.emit(SurgeEvent::HarvestFailed {
            reason: "pool offline".to_string(),
        });
        buffer.emit(SurgeEvent::FeesCollected {
            token_amount: 1,
            base_amount: 2,
        });

        let mut log = EventLog::new();
        buffer.flush_into(&mut log);

        assert!(buffer.is_empty());
        assert_eq!(log.len(), 2);
        assert_eq!(log.count("HarvestFailed"), 1);
        assert!(log.events()[0].is_failure());
    }

    #[test]
    fn test_display_is_json() {
        let event = SurgeEvent::TokensBurned {
            amount: 5,
            total_burned: 9,
        };
        let text = event.to_string();
        assert!(text.contains("TokensBurned"));
        assert!(text.contains("\"total_burned\":9"));
    }

    #[test]
    fn test_shared_log_clones_see_same_events() {
        let shared = SharedEventLog::new();
        let mut writer = shared.clone();
        writer.emit(SurgeEvent::HarvestFailed {
            reason: "offline".to_string(),
        });

        assert_eq!(shared.count("HarvestFailed"), 1);
        assert_eq!(shared.drain().len(), 1);
        assert!(writer.is_empty());
    }
}
