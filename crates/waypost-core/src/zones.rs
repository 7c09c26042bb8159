//! Pricing-zone configuration store.
//!
//! Zones and their optional polygon boundaries are read-only configuration
//! loaded from a YAML file at startup. Boundaries are listed inner-first;
//! the zone matcher tests them in file order.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;
use crate::ConfigError;

/// A configured pricing region used to select shipping price independent of
/// carrier tariff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingZone {
    pub key: String,
    pub name: String,
    pub price: Decimal,
    pub sort_order: u32,
}

/// A polygon ring assigning coordinates to a zone.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneBoundary {
    /// Key of the zone this ring assigns.
    pub zone: String,
    /// Polygon ring as `[lat, lon]` pairs; the closing vertex is implicit.
    pub ring: Vec<[f64; 2]>,
}

impl ZoneBoundary {
    #[must_use]
    pub fn points(&self) -> Vec<GeoPoint> {
        self.ring
            .iter()
            .map(|&[lat, lon]| GeoPoint::new(lat, lon))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ZonesFile {
    pub zones: Vec<PricingZone>,
    #[serde(default)]
    pub boundaries: Vec<ZoneBoundary>,
}

/// Load and validate the pricing-zone configuration from a YAML file.
///
/// Zones are returned sorted ascending by `sort_order`, which is the
/// tie-break order for text matching.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_zones(path: &Path) -> Result<ZonesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ZonesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut zones_file: ZonesFile = serde_yaml::from_str(&content)?;
    validate_zones(&zones_file)?;
    zones_file.zones.sort_by_key(|zone| zone.sort_order);

    Ok(zones_file)
}

fn validate_zones(zones_file: &ZonesFile) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();
    let mut seen_orders = HashSet::new();

    for zone in &zones_file.zones {
        if zone.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "zone key must be non-empty".to_owned(),
            ));
        }
        if zone.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "zone '{}' must have a non-empty name",
                zone.key
            )));
        }
        if zone.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "zone '{}' has negative price {}",
                zone.key, zone.price
            )));
        }
        if !seen_keys.insert(zone.key.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate zone key: '{}'",
                zone.key
            )));
        }
        if !seen_orders.insert(zone.sort_order) {
            return Err(ConfigError::Validation(format!(
                "duplicate sort_order {} (zone '{}'); tie-break order must be total",
                zone.sort_order, zone.key
            )));
        }
    }

    for boundary in &zones_file.boundaries {
        if !seen_keys.contains(&boundary.zone.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "boundary references unknown zone '{}'",
                boundary.zone
            )));
        }
        if boundary.ring.len() < 3 {
            return Err(ConfigError::Validation(format!(
                "boundary for zone '{}' needs at least 3 vertices, got {}",
                boundary.zone,
                boundary.ring.len()
            )));
        }
    }

    Ok(())
}
