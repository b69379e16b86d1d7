//! Token ledger
//!
//! Holder balances and total supply. `mint`, `burn` and `transfer` are the
//! only mutators of balances, so `total_supply` always equals the sum of all
//! balances.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::events::{EventSink, SurgeEvent};
use crate::identity::Address;

/// Token decimals (18-digit fixed point)
pub const TOKEN_DECIMALS: u8 = 18;

/// Lifetime supply counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplyStats {
    pub total_supply: u128,
    pub total_minted: u128,
    /// Every unit ever burned, whatever the path
    pub total_burned: u128,
    pub holders: usize,
}

#[derive(Debug, Clone)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    decimals: u8,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    total_minted: u128,
    total_burned: u128,
}

impl TokenLedger {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        TokenLedger {
            name: name.into(),
            symbol: symbol.into(),
            decimals: TOKEN_DECIMALS,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            total_minted: 0,
            total_burned: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of every balance. Equal to `total_supply` at every observation point.
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.values().sum()
    }

    pub fn stats(&self) -> SupplyStats {
        SupplyStats {
            total_supply: self.total_supply,
            total_minted: self.total_minted,
            total_burned: self.total_burned,
            holders: self.balances.values().filter(|b| **b > 0).count(),
        }
    }

    /// Check that `amount` can be minted without overflowing the supply
    pub fn ensure_mintable(&self, amount: u128) -> Result<()> {
        self.total_supply
            .checked_add(amount)
            .map(|_| ())
            .ok_or(LedgerError::SupplyOverflow)
    }

    pub fn mint(&mut self, to: Address, amount: u128, sink: &mut dyn EventSink) -> Result<()> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress("mint recipient"));
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;

        // The supply bounds every balance, so this cannot overflow
        *self.balances.entry(to).or_insert(0) += amount;
        self.total_supply = new_supply;
        self.total_minted = self.total_minted.saturating_add(amount);

        sink.emit(SurgeEvent::Transfer {
            from: Address::ZERO,
            to,
            amount,
        });
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: u128, sink: &mut dyn EventSink) -> Result<()> {
        self.debit(&from, amount)?;
        self.total_supply -= amount;
        self.total_burned = self.total_burned.saturating_add(amount);

        sink.emit(SurgeEvent::Transfer {
            from,
            to: Address::ZERO,
            amount,
        });
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress("transfer recipient"));
        }

        self.debit(&from, amount)?;
        *self.balances.entry(to).or_insert(0) += amount;

        sink.emit(SurgeEvent::Transfer { from, to, amount });
        Ok(())
    }

    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: u128,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        if spender.is_zero() {
            return Err(LedgerError::ZeroAddress("spender"));
        }

        self.allowances.insert((owner, spender), amount);
        sink.emit(SurgeEvent::Approval {
            owner,
            spender,
            amount,
        });
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    /// An allowance of `u128::MAX` is never decremented.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let approved = self.allowance(&from, &spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                spender,
                requested: amount,
                approved,
            });
        }

        self.transfer(from, to, amount, sink)?;

        if approved != u128::MAX {
            self.allowances.insert((from, spender), approved - amount);
        }
        Ok(())
    }

    fn debit(&mut self, holder: &Address, amount: u128) -> Result<()> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                holder: *holder,
                requested: amount,
                available,
            });
        }

        if let Some(balance) = self.balances.get_mut(holder) {
            *balance -= amount;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    #[test]
    fn test_mint() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        ledger.mint(alice(), 1000, &mut log).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 1000);
        assert_eq!(ledger.total_supply(), 1000);
        assert_eq!(
            log.events()[0],
            SurgeEvent::Transfer {
                from: Address::ZERO,
                to: alice(),
                amount: 1000
            }
        );
    }

    #[test]
    fn test_transfer() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        ledger.mint(alice(), 1000, &mut log).unwrap();
        ledger.transfer(alice(), bob(), 400, &mut log).unwrap();

        assert_eq!(ledger.balance_of(&alice()), 600);
        assert_eq!(ledger.balance_of(&bob()), 400);
        assert_eq!(ledger.total_supply(), ledger.sum_of_balances());
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        ledger.mint(alice(), 10, &mut log).unwrap();
        let result = ledger.transfer(alice(), bob(), 11, &mut log);

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                requested: 11,
                available: 10,
                ..
            })
        ));
        assert_eq!(ledger.balance_of(&alice()), 10);
        assert_eq!(ledger.balance_of(&bob()), 0);
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        ledger.mint(alice(), 1000, &mut log).unwrap();
        ledger.burn(alice(), 250, &mut log).unwrap();

        assert_eq!(ledger.total_supply(), 750);
        let stats = ledger.stats();
        assert_eq!(stats.total_minted, 1000);
        assert_eq!(stats.total_burned, 250);
        assert_eq!(stats.holders, 1);
        assert_eq!(ledger.total_supply(), ledger.sum_of_balances());
    }

    #[test]
    fn test_mint_to_zero_address_rejected() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        let result = ledger.mint(Address::ZERO, 1, &mut log);
        assert!(matches!(result, Err(LedgerError::ZeroAddress(_))));
        assert!(log.is_empty());
    }

    #[test]
    fn test_supply_overflow() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        ledger.mint(alice(), u128::MAX, &mut log).unwrap();
        assert_eq!(ledger.ensure_mintable(1), Err(LedgerError::SupplyOverflow));
        assert_eq!(
            ledger.mint(bob(), 1, &mut log),
            Err(LedgerError::SupplyOverflow)
        );
        assert_eq!(ledger.balance_of(&bob()), 0);
    }

    #[test]
    fn test_allowance_flow() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();
        let carol = Address::from_label("carol");

        ledger.mint(alice(), 1000, &mut log).unwrap();
        ledger.approve(alice(), bob(), 300, &mut log).unwrap();

        ledger.transfer_from(bob(), alice(), carol, 200, &mut log).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), 100);
        assert_eq!(ledger.balance_of(&carol), 200);

        let result = ledger.transfer_from(bob(), alice(), carol, 101, &mut log);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientAllowance { approved: 100, .. })
        ));
    }

    #[test]
    fn test_unlimited_allowance_not_decremented() {
        let mut ledger = TokenLedger::new("Surge", "SURGE");
        let mut log = EventLog::new();

        ledger.mint(alice(), 1000, &mut log).unwrap();
        ledger.approve(alice(), bob(), u128::MAX, &mut log).unwrap();
        ledger.transfer_from(bob(), alice(), bob(), 500, &mut log).unwrap();

        assert_eq!(ledger.allowance(&alice(), &bob()), u128::MAX);
    }
}
