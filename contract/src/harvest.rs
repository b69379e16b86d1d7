//! Harvest-and-burn entry point

use surge_core::EventLog;
use surge_liquidity::{HarvestReceipt, LiquidityError};

use crate::error::Result;
use crate::token::SurgeToken;

impl SurgeToken {
    /// Collect the position's trading fees and burn them. Callable by
    /// anyone once per harvest interval.
    ///
    /// A collaborator failure still commits the new harvest timestamp and
    /// the failure notification. Base fees collected before a failed burn
    /// are kept as held base.
    pub fn harvest_and_burn(&mut self, now: u64) -> Result<HarvestReceipt> {
        self.guard.enter()?;

        let mut events = EventLog::new();
        let result = self.scheduler.harvest_and_burn(
            now,
            &mut self.liquidity,
            &self.price,
            &mut self.tokens,
            self.pool.as_mut(),
            &mut events,
        );
        self.guard.exit();

        match result {
            Ok(receipt) => {
                // Base-side fees stay with the contract
                self.held_base = self.held_base.saturating_add(receipt.base_fees);
                self.verify_invariants()?;
                self.commit(events);
                Ok(receipt)
            }
            Err(e) => {
                if let LiquidityError::FeesNotBurned { base_amount, .. } = &e {
                    self.held_base = self.held_base.saturating_add(*base_amount);
                }
                self.commit(events);
                Err(e.into())
            }
        }
    }
}
