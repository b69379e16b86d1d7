//! surge-sim - drive the SURGE token against a simulated pool

mod display;
mod simulate;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use surge_contract::TokenConfig;
use surge_economics::{parse_units, PriceEngine};

use crate::simulate::ScenarioParams;

#[derive(Parser)]
#[command(name = "surge-sim")]
#[command(about = "SURGE bonding-curve token simulator", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted sequence of purchases and harvests
    Simulate {
        /// Number of distinct buyers
        #[arg(long, default_value = "4")]
        buyers: usize,

        /// Number of purchases
        #[arg(short, long, default_value = "24")]
        purchases: usize,

        /// Payment per purchase, in base-asset units (e.g. "0.5")
        #[arg(long, default_value = "0.5")]
        payment: String,

        /// Pool fees accrued per purchase, in basis points of its volume
        #[arg(long, default_value = "30")]
        fee_bps: u128,

        /// Simulated seconds between purchases
        #[arg(long, default_value = "900")]
        step_secs: u64,

        /// Make every n-th provisioning call fail
        #[arg(long)]
        fail_provision_every: Option<usize>,

        /// Do not initialize the pool
        #[arg(long)]
        no_pool: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Include every purchase, harvest and event
        #[arg(short, long)]
        verbose: bool,
    },

    /// Quote a purchase at the configured initial price
    Quote {
        /// Payment in base-asset units
        #[arg(long, default_value = "1")]
        payment: String,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "surge.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<TokenConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            Ok(TokenConfig::load_from_file(path)?)
        }
        None => {
            let mut config = TokenConfig::default();
            config.token.deployed_at = chrono::Utc::now().timestamp().max(0) as u64;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("surge-sim {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    match cli.command {
        Commands::Simulate {
            buyers,
            purchases,
            payment,
            fee_bps,
            step_secs,
            fail_provision_every,
            no_pool,
            json,
            verbose,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let params = ScenarioParams {
                buyers,
                purchases,
                payment: parse_units(&payment)?,
                fee_bps,
                step_secs,
                fail_provision_every,
                initialize_pool: !no_pool,
                record_events: json && verbose,
            };

            let report = simulate::run(&config, &params).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_report(&report, verbose);
            }
        }

        Commands::Quote { payment, json } => {
            let config = load_config(cli.config.as_deref())?;
            let engine = PriceEngine::new(u128::from(config.token.initial_price))?;
            let quote = engine.preview_purchase(parse_units(&payment)?)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                display::print_quote(&quote);
            }
        }

        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                eprintln!(
                    "{} {} already exists (use --force to overwrite)",
                    "✗".red(),
                    output.display()
                );
                std::process::exit(1);
            }

            let config = match cli.config.as_deref() {
                Some(path) => TokenConfig::load_from_file(path)?,
                None => TokenConfig::default(),
            };
            config.save_to_file(&output)?;
            println!("{} Wrote {}", "✓".green(), output.display());
        }
    }

    Ok(())
}
