//! Command handlers for the CLI.
//!
//! These are called from `main` after config and tracing are established.
//! Network-backed commands build a [`DeliveryEngine`] per invocation; the
//! cost command is pure and needs neither config nor network.

use std::path::Path;

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use waypost_core::{
    load_zones, AddressInput, AppConfig, DeliveryCostPolicy, ResolutionTrace, StructuredAddress,
};
use waypost_resolve::{compute_cost, DeliveryEngine, Outcome, ResolveRequest, ShippingCost};

/// Builds the address input from CLI arguments: structured fields win over
/// the positional free text, and at least one of the two must be present.
pub(crate) fn build_address(
    free_text: Option<String>,
    city: Option<String>,
    street: Option<String>,
    region: Option<String>,
    postal_code: Option<String>,
) -> anyhow::Result<AddressInput> {
    if city.is_some() || street.is_some() || region.is_some() || postal_code.is_some() {
        return Ok(AddressInput::Structured(StructuredAddress {
            city,
            street,
            region,
            postal_code,
            ..StructuredAddress::default()
        }));
    }
    let free_text = free_text.context("an address or structured fields are required")?;
    Ok(AddressInput::Raw(free_text))
}

pub(crate) async fn run_resolve(
    config: &AppConfig,
    address: AddressInput,
    json: bool,
    trace: bool,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let request = ResolveRequest { address };
    let resolution = engine.resolve(&request).await?;

    if trace {
        print_trace(&resolution.trace);
    }

    match resolution.outcome {
        Outcome::Found { points, zone } => {
            tracing::info!(
                points = points.len(),
                zone = zone.as_deref().unwrap_or("-"),
                "address resolved"
            );
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "zone": zone,
                        "points": points,
                    }))?
                );
                return Ok(());
            }
            match zone {
                Some(key) => println!("pricing zone: {key}"),
                None => println!("pricing zone: (not classified)"),
            }
            println!("{} pickup point(s):", points.len());
            for point in points {
                let coords = point
                    .point
                    .map_or_else(String::new, |p| format!(" [{:.4}, {:.4}]", p.lat, p.lon));
                println!("  {} — {}{coords}", point.code, point.address);
                if let Some(hours) = point.work_hours {
                    println!("      open: {hours}");
                }
            }
        }
        Outcome::NotFound => {
            tracing::warn!("no reachable pickup points for this address");
            println!("no reachable pickup points for this address");
        }
        Outcome::Cancelled => println!("resolution was cancelled"),
    }
    Ok(())
}

pub(crate) async fn run_estimate(
    config: &AppConfig,
    address: String,
    origin: Option<String>,
    tariff: Option<u32>,
    trace: bool,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let input = AddressInput::Raw(address);
    let origin_input = origin.map(AddressInput::Raw);
    let (estimate, steps) = engine
        .estimate_period(&input, origin_input.as_ref(), tariff)
        .await?;

    if trace {
        print_trace(&steps);
    }

    tracing::info!(
        min_days = estimate.min_days,
        max_days = estimate.max_days,
        "delivery period estimated"
    );
    let today = Utc::now().date_naive();
    let earliest = today + Duration::days(i64::from(estimate.min_days));
    let latest = today + Duration::days(i64::from(estimate.max_days));
    println!("estimated delivery: {}", estimate.description);
    println!("expected between {earliest} and {latest}");
    Ok(())
}

pub(crate) fn run_cost(
    policy_path: &Path,
    subtotal: Decimal,
    zone: Option<&str>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(policy_path)
        .with_context(|| format!("failed to read policy file {}", policy_path.display()))?;
    let policy: DeliveryCostPolicy =
        serde_yaml::from_str(&raw).context("failed to parse policy file")?;

    match compute_cost(&policy, subtotal, zone)? {
        ShippingCost::Price(price) => println!("shipping cost: {price}"),
        ShippingCost::Unavailable => {
            println!("no price configured for this zone; shipping cost unavailable");
        }
    }
    Ok(())
}

pub(crate) fn run_zones(config: &AppConfig) -> anyhow::Result<()> {
    let zones = load_zones(&config.zones_path)?;
    println!("{} pricing zone(s):", zones.zones.len());
    for zone in &zones.zones {
        println!("  {} — {} ({})", zone.key, zone.name, zone.price);
    }
    Ok(())
}

fn build_engine(config: &AppConfig) -> anyhow::Result<DeliveryEngine> {
    let zones = load_zones(&config.zones_path)
        .with_context(|| format!("failed to load zones from {}", config.zones_path.display()))?;
    DeliveryEngine::from_config(config, zones).context("failed to build delivery engine")
}

fn print_trace(trace: &ResolutionTrace) {
    if trace.is_empty() {
        return;
    }
    println!("resolution steps:");
    print!("{trace}");
}
