//! Single-owner access control

use serde::{Deserialize, Serialize};
use surge_core::Address;

use crate::error::{Result, TokenError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Gate for every owner-only operation
    pub fn require_owner(&self, caller: &Address) -> Result<()> {
        if caller != &self.owner {
            log::warn!("rejected owner-only call from {}", caller);
            return Err(TokenError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, caller: &Address, new_owner: Address) -> Result<Address> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::InvalidAddress(
                "ownership cannot go to the zero address".to_string(),
            ));
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
