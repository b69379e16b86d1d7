//! Outbound base-asset transfers
//!
//! The beneficiary leg of a purchase goes through a [`PayoutRail`]. The rail
//! either moves the whole amount or reports an error; there is no partial
//! payout.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use surge_core::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("Recipient {0} rejected the payment")]
    Rejected(Address),

    #[error("Payout rail unavailable: {0}")]
    Unavailable(String),
}

pub trait PayoutRail: Send {
    fn send(&mut self, to: Address, amount: u128) -> Result<(), PayoutError>;
}

#[derive(Debug, Default)]
struct RailState {
    paid: HashMap<Address, u128>,
    history: Vec<(Address, u128)>,
    rejecting: HashSet<Address>,
    offline: bool,
}

/// Rail that records payouts in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingRail {
    state: Arc<Mutex<RailState>>,
}

impl RecordingRail {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RailState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `recipient` refuse incoming payments
    pub fn reject(&self, recipient: Address, rejecting: bool) {
        let mut state = self.state();
        if rejecting {
            state.rejecting.insert(recipient);
        } else {
            state.rejecting.remove(&recipient);
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn paid_to(&self, recipient: &Address) -> u128 {
        self.state().paid.get(recipient).copied().unwrap_or(0)
    }

    pub fn history(&self) -> Vec<(Address, u128)> {
        self.state().history.clone()
    }
}

impl PayoutRail for RecordingRail {
    fn send(&mut self, to: Address, amount: u128) -> Result<(), PayoutError> {
        let mut state = self.state();
        if state.offline {
            return Err(PayoutError::Unavailable("rail offline".to_string()));
        }
        if state.rejecting.contains(&to) {
            return Err(PayoutError::Rejected(to));
        }

        *state.paid.entry(to).or_insert(0) += amount;
        state.history.push((to, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_payouts() {
        let rail = RecordingRail::new();
        let mut sender = rail.clone();
        let alice = Address::from_label("alice");

        sender.send(alice, 5).unwrap();
        sender.send(alice, 7).unwrap();

        assert_eq!(rail.paid_to(&alice), 12);
        assert_eq!(rail.history().len(), 2);
    }

    #[test]
    fn test_rejecting_recipient() {
        let rail = RecordingRail::new();
        let mut sender = rail.clone();
        let bob = Address::from_label("bob");

        rail.reject(bob, true);
        assert_eq!(sender.send(bob, 1), Err(PayoutError::Rejected(bob)));
        assert_eq!(rail.paid_to(&bob), 0);

        rail.reject(bob, false);
        assert!(sender.send(bob, 1).is_ok());
    }
}
