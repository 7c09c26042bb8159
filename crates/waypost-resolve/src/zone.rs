//! Pricing zone classification: geometry first, name matching as fallback.

use waypost_core::{GeoPoint, PricingZone, ZonesFile};

use crate::geo::point_in_ring;
use crate::translit::{normalized_tokens, share_token};

/// Classifies coordinates into pricing zones by polygon containment.
///
/// Boundaries are checked in file order, so the innermost ring must be listed
/// first when rings nest.
pub struct ZoneMatcher {
    boundaries: Vec<(String, Vec<GeoPoint>)>,
}

impl ZoneMatcher {
    #[must_use]
    pub fn new(file: &ZonesFile) -> Self {
        let boundaries = file
            .boundaries
            .iter()
            .map(|boundary| (boundary.zone.clone(), boundary.points()))
            .collect();
        Self { boundaries }
    }

    /// Key of the first zone whose boundary contains the point, if any.
    #[must_use]
    pub fn match_zone(&self, point: GeoPoint) -> Option<&str> {
        self.boundaries
            .iter()
            .find(|(_, ring)| point_in_ring(point, ring))
            .map(|(zone, _)| zone.as_str())
    }
}

/// Matches free-form address text against zone names when no coordinates are
/// available. Zones are assumed pre-sorted by `sort_order`, so the most
/// specific zone wins ties.
#[must_use]
pub fn match_zone_by_text<'a>(text: &str, zones: &'a [PricingZone]) -> Option<&'a PricingZone> {
    let address_tokens = normalized_tokens(text);
    if address_tokens.is_empty() {
        return None;
    }
    zones.iter().find(|zone| {
        let zone_tokens = normalized_tokens(&format!("{} {}", zone.name, zone.key));
        share_token(&address_tokens, &zone_tokens)
    })
}
