//! Domain types shared across the resolution pipeline.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An immutable WGS-84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Structured address fields as supplied by checkout forms.
///
/// Every field is optional; the geocoder and the carrier both tolerate
/// partial addresses, so the engine does too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredAddress {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub postal_code: Option<String>,
}

impl StructuredAddress {
    /// Single-line rendering for free-text geocoding and carrier fallbacks.
    #[must_use]
    pub fn free_text(&self) -> String {
        [
            &self.postal_code,
            &self.country,
            &self.region,
            &self.city,
            &self.street,
            &self.house,
        ]
        .into_iter()
        .flatten()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A customer-supplied address, normalized at the pipeline entry point.
///
/// Upstream callers sometimes hold a raw string and sometimes a structured
/// record; everything past the orchestrator boundary works on this union.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AddressInput {
    Raw(String),
    Structured(StructuredAddress),
}

impl AddressInput {
    /// One-line free-text form, suitable for geocoding.
    #[must_use]
    pub fn free_text(&self) -> String {
        match self {
            AddressInput::Raw(text) => text.trim().to_owned(),
            AddressInput::Structured(fields) => fields.free_text(),
        }
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        match self {
            AddressInput::Raw(_) => None,
            AddressInput::Structured(fields) => fields.city.as_deref(),
        }
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            AddressInput::Raw(_) => None,
            AddressInput::Structured(fields) => fields.region.as_deref(),
        }
    }

    #[must_use]
    pub fn postal_code(&self) -> Option<&str> {
        match self {
            AddressInput::Raw(_) => None,
            AddressInput::Structured(fields) => fields.postal_code.as_deref(),
        }
    }
}

/// A carrier pickup point (PVZ) returned by a delivery-point search.
///
/// Ephemeral lookup result; persistence of backfilled coordinates belongs to
/// the collaborator behind the coordinate store seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupPoint {
    /// Carrier-assigned code, unique per carrier.
    pub code: String,
    pub name: String,
    pub address: String,
    pub point: Option<GeoPoint>,
    pub work_hours: Option<String>,
    pub phones: Vec<String>,
    pub has_cash_on_delivery: bool,
    pub has_fitting_room: bool,
}

/// How shipping cost is derived from an order subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryCostPolicy {
    Fixed { amount: Decimal },
    Percentage { rate: Decimal },
    FixedPlusPercentage { amount: Decimal, rate: Decimal },
    ZoneBased { prices: BTreeMap<String, Decimal> },
}

impl DeliveryCostPolicy {
    /// Checks the policy invariants: rates within `[0, 100]`, amounts and
    /// zone prices non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] naming the first violated bound.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match self {
            DeliveryCostPolicy::Fixed { amount } => check_amount(*amount),
            DeliveryCostPolicy::Percentage { rate } => check_rate(*rate),
            DeliveryCostPolicy::FixedPlusPercentage { amount, rate } => {
                check_amount(*amount)?;
                check_rate(*rate)
            }
            DeliveryCostPolicy::ZoneBased { prices } => {
                for (zone, price) in prices {
                    if price.is_sign_negative() {
                        return Err(PolicyError::NegativeZonePrice {
                            zone: zone.clone(),
                            price: *price,
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

fn check_amount(amount: Decimal) -> Result<(), PolicyError> {
    if amount.is_sign_negative() {
        return Err(PolicyError::NegativeAmount(amount));
    }
    Ok(())
}

fn check_rate(rate: Decimal) -> Result<(), PolicyError> {
    if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
        return Err(PolicyError::RateOutOfRange(rate));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("rate {0} out of range; must be within [0, 100]")]
    RateOutOfRange(Decimal),

    #[error("amount {0} must be non-negative")]
    NegativeAmount(Decimal),

    #[error("zone '{zone}' has negative price {price}")]
    NegativeZonePrice { zone: String, price: Decimal },
}

/// An estimated delivery window in whole days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPeriodEstimate {
    pub min_days: u32,
    pub max_days: u32,
    pub description: String,
}

impl DeliveryPeriodEstimate {
    /// Bounds are reordered if swapped so `min_days <= max_days` always holds.
    #[must_use]
    pub fn new(min_days: u32, max_days: u32, description: impl Into<String>) -> Self {
        Self {
            min_days: min_days.min(max_days),
            max_days: min_days.max(max_days),
            description: description.into(),
        }
    }
}

/// Ordered diagnostic record of which fallback tier fired at each step.
///
/// Observability only — never used to drive business decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionTrace(Vec<String>);

impl ResolutionTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        tracing::debug!(step = %entry, "resolution step");
        self.0.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ResolutionTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, entry) in self.0.iter().enumerate() {
            writeln!(f, "{}. {entry}", index + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn structured_free_text_joins_present_fields_in_postal_order() {
        let address = StructuredAddress {
            country: Some("Russia".to_owned()),
            region: Some("Moscow Oblast".to_owned()),
            city: Some("Khimki".to_owned()),
            street: Some("Leningradskaya".to_owned()),
            house: Some("18".to_owned()),
            postal_code: Some("141400".to_owned()),
        };
        assert_eq!(
            address.free_text(),
            "141400, Russia, Moscow Oblast, Khimki, Leningradskaya, 18"
        );
    }

    #[test]
    fn structured_free_text_skips_blank_fields() {
        let address = StructuredAddress {
            city: Some("Tver".to_owned()),
            street: Some("  ".to_owned()),
            ..StructuredAddress::default()
        };
        assert_eq!(address.free_text(), "Tver");
    }

    #[test]
    fn raw_input_has_no_structured_accessors() {
        let input = AddressInput::Raw("Moscow, Arbat 1".to_owned());
        assert!(input.city().is_none());
        assert!(input.region().is_none());
        assert!(input.postal_code().is_none());
        assert_eq!(input.free_text(), "Moscow, Arbat 1");
    }

    #[test]
    fn policy_validate_accepts_boundary_rates() {
        let zero = DeliveryCostPolicy::Percentage { rate: Decimal::ZERO };
        let hundred = DeliveryCostPolicy::Percentage {
            rate: Decimal::ONE_HUNDRED,
        };
        assert!(zero.validate().is_ok());
        assert!(hundred.validate().is_ok());
    }

    #[test]
    fn policy_validate_rejects_rate_above_hundred() {
        let policy = DeliveryCostPolicy::Percentage {
            rate: Decimal::new(101, 0),
        };
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::RateOutOfRange(_))
        ));
    }

    #[test]
    fn policy_validate_rejects_negative_amount() {
        let policy = DeliveryCostPolicy::FixedPlusPercentage {
            amount: Decimal::new(-1, 0),
            rate: Decimal::new(5, 0),
        };
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NegativeAmount(_))
        ));
    }

    #[test]
    fn policy_validate_rejects_negative_zone_price() {
        let mut prices = BTreeMap::new();
        prices.insert("inner".to_owned(), Decimal::new(-300, 0));
        let policy = DeliveryCostPolicy::ZoneBased { prices };
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NegativeZonePrice { .. })
        ));
    }

    #[test]
    fn period_estimate_reorders_swapped_bounds() {
        let estimate = DeliveryPeriodEstimate::new(7, 3, "3 to 7 days");
        assert_eq!(estimate.min_days, 3);
        assert_eq!(estimate.max_days, 7);
    }

    #[test]
    fn trace_preserves_push_order() {
        let mut trace = ResolutionTrace::new();
        trace.push("city resolved via geocoder");
        trace.push("12 pickup points fetched");
        assert_eq!(
            trace.entries(),
            ["city resolved via geocoder", "12 pickup points fetched"]
        );
        assert_eq!(
            trace.to_string(),
            "1. city resolved via geocoder\n2. 12 pickup points fetched\n"
        );
    }
}
