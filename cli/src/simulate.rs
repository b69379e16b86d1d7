//! Scripted purchase and harvest scenario against the in-process pool

use std::collections::BTreeMap;

use serde::Serialize;
use surge_contract::{
    HarvestReceipt, PurchaseReceipt, RecordingRail, SharedSurgeToken, SimulatedPool, SurgeToken,
    TokenConfig, TokenSnapshot,
};
use surge_core::{Address, SharedEventLog, SurgeEvent};
use surge_economics::constants::BPS_DENOMINATOR;
use surge_economics::mul_div;

#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub buyers: usize,
    pub purchases: usize,
    /// Base-asset units paid per purchase
    pub payment: u128,
    /// Pool trading fees accrued per purchase, in basis points of its volume
    pub fee_bps: u128,
    /// Simulated seconds between purchases
    pub step_secs: u64,
    /// Make every n-th provisioning call fail
    pub fail_provision_every: Option<usize>,
    pub initialize_pool: bool,
    pub record_events: bool,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            buyers: 4,
            purchases: 24,
            payment: 500_000_000_000_000_000,
            fee_bps: 30,
            step_secs: 900,
            fail_provision_every: None,
            initialize_pool: true,
            record_events: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub started_at: u64,
    pub finished_at: u64,
    pub purchases: Vec<PurchaseReceipt>,
    pub harvests: Vec<HarvestReceipt>,
    pub failed_harvests: usize,
    pub beneficiary_received: u128,
    pub snapshot: TokenSnapshot,
    pub event_counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SurgeEvent>,
}

pub async fn run(config: &TokenConfig, params: &ScenarioParams) -> surge_contract::Result<ScenarioReport> {
    let pool = SimulatedPool::new();
    let rail = RecordingRail::new();
    let events = SharedEventLog::new();
    let token = SurgeToken::new(
        config,
        Box::new(pool.clone()),
        Box::new(rail.clone()),
        Box::new(events.clone()),
    )?;
    let shared = SharedSurgeToken::new(token);
    let owner = config.roles.owner;

    if params.initialize_pool {
        shared.with(|token| token.initialize_pool(&owner)).await?;
    }

    let started_at = config.token.deployed_at;
    let mut now = started_at;
    let mut purchases = Vec::with_capacity(params.purchases);
    let mut harvests = Vec::new();
    let mut failed_harvests = 0;

    for i in 0..params.purchases {
        let buyer = Address::from_label(&format!("buyer-{}", i % params.buyers.max(1)));
        if let Some(every) = params.fail_provision_every {
            pool.set_fail_add_liquidity(every > 0 && (i + 1) % every == 0);
        }

        let receipt = shared.purchase(buyer, params.payment).await?;
        if pool.is_initialized() {
            let token_fee = mul_div(receipt.token_amount, params.fee_bps, BPS_DENOMINATOR)?;
            let base_fee = mul_div(params.payment, params.fee_bps, BPS_DENOMINATOR)?;
            pool.accrue_fees(token_fee, base_fee);
        }
        purchases.push(receipt);

        now += params.step_secs;
        let due = shared
            .with(|token| token.is_pool_initialized() && now >= token.next_harvest_at())
            .await;
        if due {
            match shared.harvest_and_burn(now).await {
                Ok(receipt) => harvests.push(receipt),
                Err(e) => {
                    log::warn!("simulated harvest at {} failed: {}", now, e);
                    failed_harvests += 1;
                }
            }
        }
    }

    // Retry whatever failed provisioning left behind
    if params.initialize_pool {
        pool.set_fail_add_liquidity(false);
        shared.with(|token| token.provision_pending(&owner)).await?;
    }

    let recorded = events.snapshot();
    let mut event_counts = BTreeMap::new();
    for event in &recorded {
        *event_counts.entry(event.name().to_string()).or_insert(0) += 1;
    }

    Ok(ScenarioReport {
        started_at,
        finished_at: now,
        purchases,
        harvests,
        failed_harvests,
        beneficiary_received: rail.paid_to(&config.roles.beneficiary),
        snapshot: shared.snapshot().await,
        event_counts,
        events: if params.record_events {
            recorded
        } else {
            Vec::new()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use surge_economics::constants::{INITIAL_PRICE, SCALE};

    fn config() -> TokenConfig {
        let mut config = TokenConfig::default();
        config.token.deployed_at = 1_700_000_000;
        config
    }

    #[tokio::test]
    async fn test_default_scenario() {
        let params = ScenarioParams::default();
        let report = run(&config(), &params).await.unwrap();

        assert_eq!(report.purchases.len(), params.purchases);
        assert_eq!(report.snapshot.price.buy_count, params.purchases as u64);
        assert!(report.snapshot.price.current_price > INITIAL_PRICE);
        assert!(!report.harvests.is_empty());
        assert!(report.snapshot.burn.total_burned > 0);
        assert_eq!(
            report.beneficiary_received,
            params.payment / 2 * params.purchases as u128
        );
        assert_eq!(report.event_counts.get("Purchase"), Some(&params.purchases));
        assert!(report.events.is_empty());
    }

    #[tokio::test]
    async fn test_failed_provisions_are_retried() {
        let params = ScenarioParams {
            purchases: 6,
            fail_provision_every: Some(2),
            record_events: true,
            ..ScenarioParams::default()
        };
        let report = run(&config(), &params).await.unwrap();

        assert_eq!(report.event_counts.get("LiquidityProvisionFailed"), Some(&3));
        assert_eq!(report.snapshot.pending_liquidity, 0);
        assert_eq!(report.snapshot.position.base_deposited, 6 * params.payment / 2);
        assert_eq!(report.events.len(), report.event_counts.values().sum::<usize>());
    }

    #[tokio::test]
    async fn test_without_pool_everything_is_held() {
        let params = ScenarioParams {
            purchases: 3,
            payment: SCALE,
            initialize_pool: false,
            ..ScenarioParams::default()
        };
        let report = run(&config(), &params).await.unwrap();

        assert!(report.harvests.is_empty());
        assert_eq!(report.snapshot.pending_liquidity, 3 * SCALE / 2);
        assert_eq!(report.snapshot.held_base, 3 * SCALE / 2);
    }
}
