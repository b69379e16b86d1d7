//! Fee-burn accounting and harvest cooldown

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BurnStats {
    /// Units destroyed through the fee-burn path only
    pub total_burned: u128,
    pub harvest_count: u64,
    pub total_token_fees: u128,
    pub total_base_fees: u128,
    pub last_harvest_timestamp: u64,
    pub harvest_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnAccounting {
    stats: BurnStats,
}

impl BurnAccounting {
    /// `started_at` seeds the cooldown, so the first harvest is allowed one
    /// full interval after deployment.
    pub fn new(harvest_interval_secs: u64, started_at: u64) -> Self {
        Self {
            stats: BurnStats {
                last_harvest_timestamp: started_at,
                harvest_interval_secs,
                ..BurnStats::default()
            },
        }
    }

    pub fn stats(&self) -> &BurnStats {
        &self.stats
    }

    pub fn total_burned(&self) -> u128 {
        self.stats.total_burned
    }

    pub fn harvest_interval(&self) -> u64 {
        self.stats.harvest_interval_secs
    }

    pub fn last_harvest_timestamp(&self) -> u64 {
        self.stats.last_harvest_timestamp
    }

    pub fn next_harvest_at(&self) -> u64 {
        self.stats
            .last_harvest_timestamp
            .saturating_add(self.stats.harvest_interval_secs)
    }

    pub fn can_harvest(&self, now: u64) -> bool {
        now >= self.next_harvest_at()
    }

    pub fn set_harvest_interval(&mut self, interval_secs: u64) -> u64 {
        std::mem::replace(&mut self.stats.harvest_interval_secs, interval_secs)
    }

    /// Stamp a harvest attempt. Called before the fee collection call.
    pub fn mark_harvest(&mut self, now: u64) {
        self.stats.last_harvest_timestamp = now;
        self.stats.harvest_count += 1;
    }

    pub fn record_fees(&mut self, token_amount: u128, base_amount: u128) {
        self.stats.total_token_fees = self.stats.total_token_fees.saturating_add(token_amount);
        self.stats.total_base_fees = self.stats.total_base_fees.saturating_add(base_amount);
    }

    /// Returns the new fee-burn total
    pub fn record_burn(&mut self, amount: u128) -> u128 {
        self.stats.total_burned = self.stats.total_burned.saturating_add(amount);
        self.stats.total_burned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_window() {
        let mut accounting = BurnAccounting::new(3600, 1_000);

        assert!(!accounting.can_harvest(1_000));
        assert!(!accounting.can_harvest(4_599));
        assert!(accounting.can_harvest(4_600));

        accounting.mark_harvest(4_600);
        assert_eq!(accounting.next_harvest_at(), 8_200);
        assert!(!accounting.can_harvest(8_199));
        assert_eq!(accounting.stats().harvest_count, 1);
    }

    #[test]
    fn test_burn_totals() {
        let mut accounting = BurnAccounting::new(60, 0);

        accounting.record_fees(10, 20);
        assert_eq!(accounting.record_burn(10), 10);
        assert_eq!(accounting.record_burn(5), 15);
        assert_eq!(accounting.total_burned(), 15);
        assert_eq!(accounting.stats().total_base_fees, 20);
    }

    #[test]
    fn test_interval_update() {
        let mut accounting = BurnAccounting::new(60, 0);
        assert_eq!(accounting.set_harvest_interval(120), 60);
        assert_eq!(accounting.next_harvest_at(), 120);
    }
}
