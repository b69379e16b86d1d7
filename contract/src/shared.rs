//! Shared async handle
//!
//! Wraps a [`SurgeToken`] in `Arc<Mutex<_>>` so concurrent tasks can drive
//! one contract instance. The mutex serializes every operation.

use std::sync::Arc;

use surge_core::Address;
use surge_liquidity::HarvestReceipt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::purchase::PurchaseReceipt;
use crate::token::{SurgeToken, TokenSnapshot};

#[derive(Debug, Clone)]
pub struct SharedSurgeToken {
    inner: Arc<Mutex<SurgeToken>>,
}

impl SharedSurgeToken {
    pub fn new(token: SurgeToken) -> Self {
        Self {
            inner: Arc::new(Mutex::new(token)),
        }
    }

    pub async fn purchase(&self, buyer: Address, payment_amount: u128) -> Result<PurchaseReceipt> {
        self.inner.lock().await.purchase(buyer, payment_amount)
    }

    pub async fn harvest_and_burn(&self, now: u64) -> Result<HarvestReceipt> {
        self.inner.lock().await.harvest_and_burn(now)
    }

    /// Harvest at the current wall-clock time
    pub async fn harvest_now(&self) -> Result<HarvestReceipt> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.harvest_and_burn(now).await
    }

    pub async fn current_price(&self) -> u128 {
        self.inner.lock().await.current_price()
    }

    pub async fn balance_of(&self, holder: &Address) -> u128 {
        self.inner.lock().await.balance_of(holder)
    }

    pub async fn snapshot(&self) -> TokenSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Run `f` with exclusive access to the contract
    pub async fn with<R>(&self, f: impl FnOnce(&mut SurgeToken) -> R) -> R {
        let mut token = self.inner.lock().await;
        f(&mut token)
    }
}
