//! Terminal output

use owo_colors::OwoColorize;
use surge_contract::{LiquidityDisposition, ProvisionOutcome, TokenSnapshot};
use surge_economics::{format_units, PurchasePrice};

use crate::simulate::ScenarioReport;

pub fn banner(title: &str) {
    println!("\n{}", "═══════════════════════════════════════════════".cyan());
    println!("  {}", title.cyan().bold());
    println!("{}", "═══════════════════════════════════════════════".cyan());
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", format!("{}:", label).yellow(), value);
}

pub fn print_report(report: &ScenarioReport, verbose: bool) {
    banner("SURGE Simulation");

    if verbose {
        println!("\n{}", "Purchases".bright_white().bold());
        for receipt in &report.purchases {
            let liquidity = match &receipt.liquidity {
                LiquidityDisposition::None => "-".to_string(),
                LiquidityDisposition::Held { amount, .. } => {
                    format!("held {}", format_units(*amount)).yellow().to_string()
                }
                LiquidityDisposition::Provision(ProvisionOutcome::Provisioned { settled, .. }) => {
                    format!("pooled {}", format_units(settled.base_amount))
                        .green()
                        .to_string()
                }
                LiquidityDisposition::Provision(ProvisionOutcome::Failed { reason, .. }) => {
                    format!("failed: {}", reason).red().to_string()
                }
            };
            println!(
                "  #{:<4} {} -> {} tokens  price {} -> {}  {}",
                receipt.buy_count,
                format_units(receipt.payment_amount),
                format_units(receipt.token_amount).green(),
                receipt.price_before,
                receipt.price_after.to_string().bright_blue(),
                liquidity
            );
        }

        if !report.harvests.is_empty() {
            println!("\n{}", "Harvests".bright_white().bold());
            for harvest in &report.harvests {
                let when = chrono::DateTime::from_timestamp(harvest.timestamp as i64, 0)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| harvest.timestamp.to_string());
                println!(
                    "  {}  burned {} ({} from token fees, {} from base fees)",
                    when,
                    format_units(harvest.burned()).red(),
                    format_units(harvest.burned_from_token_fees),
                    format_units(harvest.burned_from_base_fees)
                );
            }
        }
    }

    println!();
    print_snapshot(&report.snapshot);
    row("Beneficiary received", format_units(report.beneficiary_received));
    row(
        "Harvests",
        format!("{} ok, {} failed", report.harvests.len(), report.failed_harvests),
    );
    row(
        "Simulated span",
        format!("{}s", report.finished_at.saturating_sub(report.started_at)),
    );

    println!("\n{}", "Events".bright_white().bold());
    for (name, count) in &report.event_counts {
        println!("  {:<26} {}", name, count);
    }
    println!();
}

pub fn print_snapshot(snapshot: &TokenSnapshot) {
    row("Token", format!("{} ({})", snapshot.name, snapshot.symbol));
    row("Pool", &snapshot.pool_id);
    row(
        "Pool initialized",
        if snapshot.pool_initialized {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        },
    );
    row(
        "Price",
        format!(
            "{} (initial {}, +{} bps)",
            snapshot.price.current_price.to_string().bright_blue(),
            snapshot.price.initial_price,
            snapshot.price.growth_bps
        ),
    );
    row("Buys", snapshot.price.buy_count);
    row("Volume", format_units(snapshot.price.cumulative_volume));
    row("Total supply", format_units(snapshot.supply.total_supply).green());
    row("Holders", snapshot.supply.holders);
    row("Fee burns", format_units(snapshot.burn.total_burned).red());
    row("Held base", format_units(snapshot.held_base));
    row("Pending liquidity", format_units(snapshot.pending_liquidity));
    row(
        "Position",
        format!(
            "{} tokens / {} base",
            format_units(snapshot.position.token_deposited),
            format_units(snapshot.position.base_deposited)
        ),
    );
}

pub fn print_quote(quote: &PurchasePrice) {
    banner("SURGE Quote");
    row("Payment", format_units(quote.payment_amount));
    row("Tokens", format_units(quote.token_amount).green());
    row("Price before", quote.price_before);
    row("Price after", quote.price_after.to_string().bright_blue());
    println!();
}
