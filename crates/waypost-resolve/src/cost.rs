//! Shipping cost computation. Pure — no I/O, no clock.

use rust_decimal::{Decimal, RoundingStrategy};

use waypost_core::DeliveryCostPolicy;

use crate::error::ResolveError;

/// Outcome of a cost computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingCost {
    Price(Decimal),
    /// No price configured for the requested zone. An expected outcome that
    /// callers branch on — explicitly not zero.
    Unavailable,
}

/// Computes the shipping price for a subtotal under the given policy.
///
/// Percentages are applied against the subtotal and rounded half away from
/// zero to whole currency units.
///
/// # Errors
///
/// Returns [`ResolveError::Validation`] for a malformed policy or a negative
/// subtotal. Neither is ever silently clamped.
pub fn compute_cost(
    policy: &DeliveryCostPolicy,
    subtotal: Decimal,
    zone: Option<&str>,
) -> Result<ShippingCost, ResolveError> {
    policy.validate()?;
    if subtotal.is_sign_negative() {
        return Err(ResolveError::Validation(format!(
            "subtotal {subtotal} must be non-negative"
        )));
    }

    let cost = match policy {
        DeliveryCostPolicy::Fixed { amount } => ShippingCost::Price(*amount),
        DeliveryCostPolicy::Percentage { rate } => {
            ShippingCost::Price(percentage_of(subtotal, *rate))
        }
        DeliveryCostPolicy::FixedPlusPercentage { amount, rate } => {
            ShippingCost::Price(*amount + percentage_of(subtotal, *rate))
        }
        DeliveryCostPolicy::ZoneBased { prices } => match zone.and_then(|key| prices.get(key)) {
            Some(price) => ShippingCost::Price(*price),
            None => ShippingCost::Unavailable,
        },
    };

    Ok(cost)
}

fn percentage_of(subtotal: Decimal, rate: Decimal) -> Decimal {
    (subtotal * rate / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    #[test]
    fn fixed_plus_percentage_scenario() {
        // 300 fixed + 5% of 10000 = 300 + 500 = 800.
        let policy = DeliveryCostPolicy::FixedPlusPercentage {
            amount: dec(300),
            rate: dec(5),
        };
        let cost = compute_cost(&policy, dec(10_000), None).expect("valid inputs");
        assert_eq!(cost, ShippingCost::Price(dec(800)));
    }

    #[test]
    fn fixed_cost_ignores_subtotal() {
        let policy = DeliveryCostPolicy::Fixed { amount: dec(250) };
        for subtotal in [0, 1, 999, 1_000_000] {
            let cost = compute_cost(&policy, dec(subtotal), None).expect("valid inputs");
            assert_eq!(cost, ShippingCost::Price(dec(250)));
        }
    }

    #[test]
    fn percentage_cost_is_non_decreasing_in_subtotal() {
        let policy = DeliveryCostPolicy::Percentage { rate: dec(7) };
        let mut previous = Decimal::ZERO;
        for subtotal in [0, 10, 100, 5_000, 99_999] {
            let ShippingCost::Price(price) =
                compute_cost(&policy, dec(subtotal), None).expect("valid inputs")
            else {
                panic!("percentage policy never yields Unavailable");
            };
            assert!(price >= previous, "cost decreased at subtotal {subtotal}");
            previous = price;
        }
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        // 2.5% of 100 = 2.5 — rounds to 3, not banker's 2.
        let policy = DeliveryCostPolicy::Percentage {
            rate: Decimal::new(25, 1),
        };
        let cost = compute_cost(&policy, dec(100), None).expect("valid inputs");
        assert_eq!(cost, ShippingCost::Price(dec(3)));
    }

    #[test]
    fn zone_based_uses_configured_price() {
        let mut prices = BTreeMap::new();
        prices.insert("inner".to_owned(), dec(300));
        prices.insert("outer".to_owned(), dec(450));
        let policy = DeliveryCostPolicy::ZoneBased { prices };

        let cost = compute_cost(&policy, dec(1000), Some("outer")).expect("valid inputs");
        assert_eq!(cost, ShippingCost::Price(dec(450)));
    }

    #[test]
    fn zone_based_without_configured_zone_is_unavailable() {
        let policy = DeliveryCostPolicy::ZoneBased {
            prices: BTreeMap::new(),
        };
        assert_eq!(
            compute_cost(&policy, dec(1000), Some("inner")).expect("valid inputs"),
            ShippingCost::Unavailable
        );
        assert_eq!(
            compute_cost(&policy, dec(1000), None).expect("valid inputs"),
            ShippingCost::Unavailable
        );
    }

    #[test]
    fn negative_subtotal_is_a_validation_error() {
        let policy = DeliveryCostPolicy::Fixed { amount: dec(100) };
        let result = compute_cost(&policy, dec(-1), None);
        assert!(matches!(result, Err(ResolveError::Validation(_))));
    }

    #[test]
    fn malformed_policy_is_a_validation_error() {
        let policy = DeliveryCostPolicy::Percentage { rate: dec(150) };
        let result = compute_cost(&policy, dec(1000), None);
        assert!(matches!(result, Err(ResolveError::Validation(_))));
    }
}
