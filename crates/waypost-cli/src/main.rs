use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "waypost")]
#[command(about = "Delivery resolution: pickup points, zones, cost, and periods")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve an address to nearby pickup points and a pricing zone.
    Resolve {
        /// Free-text address, used when no structured fields are given.
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        /// Print the result as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Print the step-by-step resolution trace.
        #[arg(long)]
        trace: bool,
    },
    /// Estimate the delivery period to an address.
    Estimate {
        address: String,
        /// Origin city, overriding the configured default.
        #[arg(long)]
        origin: Option<String>,
        /// Carrier tariff id, overriding the configured default.
        #[arg(long)]
        tariff: Option<u32>,
        #[arg(long)]
        trace: bool,
    },
    /// Compute the shipping cost for an order subtotal under a policy file.
    Cost {
        /// YAML file describing the cost policy.
        #[arg(long)]
        policy: PathBuf,
        #[arg(long)]
        subtotal: Decimal,
        /// Pricing zone key, for zone-based policies.
        #[arg(long)]
        zone: Option<String>,
    },
    /// List the configured pricing zones.
    Zones,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = waypost_core::load_app_config_from_env()?;
    init_tracing(&config.log_level);

    let cli = Cli::parse();
    match cli.command {
        Commands::Resolve {
            address,
            city,
            street,
            region,
            postal_code,
            json,
            trace,
        } => {
            let input = commands::build_address(address, city, street, region, postal_code)?;
            commands::run_resolve(&config, input, json, trace).await
        }
        Commands::Estimate {
            address,
            origin,
            tariff,
            trace,
        } => commands::run_estimate(&config, address, origin, tariff, trace).await,
        Commands::Cost {
            policy,
            subtotal,
            zone,
        } => commands::run_cost(&policy, subtotal, zone.as_deref()),
        Commands::Zones => commands::run_zones(&config),
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
