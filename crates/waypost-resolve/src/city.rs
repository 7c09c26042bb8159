//! Destination city resolution: a four-tier fallback chain.
//!
//! Tiers run in order until one produces a city code. Transient external
//! failures demote to the next tier; only carrier authentication failures
//! abort the chain.

use std::fmt;

use tracing::debug;

use waypost_carrier::{CarrierCity, CarrierClient, CityQuery};
use waypost_core::{AddressInput, GeoPoint, ResolutionTrace};
use waypost_geocode::{GeocodeClient, ResolvedAddress};

use crate::error::ResolveError;
use crate::translit::{canonical_slug, normalized_tokens, roundtrip_slug, share_token};

/// Which tier of the fallback chain produced a city resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// Geocoder-normalized fields fed into the carrier search.
    Geocoder,
    /// Carrier search on the raw input fields.
    CarrierSearch,
    /// Built-in table of major-city codes.
    StaticTable,
    /// Configured default destination. Never fails.
    Default,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionTier::Geocoder => "geocoder",
            ResolutionTier::CarrierSearch => "carrier-search",
            ResolutionTier::StaticTable => "static-table",
            ResolutionTier::Default => "default",
        };
        f.write_str(label)
    }
}

/// A resolved destination settlement.
#[derive(Debug, Clone)]
pub struct CityResolution {
    pub code: i64,
    pub admin_id: Option<String>,
    pub point: Option<GeoPoint>,
    pub tier: ResolutionTier,
}

/// Carrier city codes for major settlements, keyed by Latin slug. The last
/// resort before the configured default.
const MAJOR_CITY_CODES: &[(&str, i64)] = &[
    ("moskva", 44),
    ("moscow", 44),
    ("sankt-peterburg", 137),
    ("saint-petersburg", 137),
    ("novosibirsk", 270),
    ("ekaterinburg", 250),
    ("yekaterinburg", 250),
    ("kazan", 424),
    ("nizhniy-novgorod", 276),
];

pub struct CityResolver<'a> {
    pub carrier: &'a CarrierClient,
    pub geocode: &'a GeocodeClient,
    pub default_city_code: i64,
}

impl CityResolver<'_> {
    /// Resolves an address to a carrier city code, recording each tier
    /// attempt in the trace.
    ///
    /// # Errors
    ///
    /// Only [`ResolveError::Auth`]: rejected carrier credentials have no
    /// fallback.
    pub async fn resolve(
        &self,
        address: &AddressInput,
        trace: &mut ResolutionTrace,
    ) -> Result<CityResolution, ResolveError> {
        if let Some(resolution) = self.try_geocoder_tier(address, trace).await? {
            return Ok(resolution);
        }
        if let Some(resolution) = self.try_carrier_tier(address, trace).await? {
            return Ok(resolution);
        }
        if let Some(resolution) = lookup_static_table(address) {
            trace.push(format!(
                "city resolved from static table: code {}",
                resolution.code
            ));
            return Ok(resolution);
        }
        trace.push(format!(
            "city fell back to default code {}",
            self.default_city_code
        ));
        Ok(CityResolution {
            code: self.default_city_code,
            admin_id: None,
            point: None,
            tier: ResolutionTier::Default,
        })
    }

    async fn try_geocoder_tier(
        &self,
        address: &AddressInput,
        trace: &mut ResolutionTrace,
    ) -> Result<Option<CityResolution>, ResolveError> {
        if !self.geocode.is_configured() {
            trace.push("geocoder not configured, skipping tier");
            return Ok(None);
        }
        let Some(resolved) = self.geocode.resolve(&address.free_text()).await else {
            trace.push("geocoder returned no candidate");
            return Ok(None);
        };
        let Some(city) = resolved.city.clone() else {
            trace.push("geocoder candidate has no settlement");
            return Ok(None);
        };

        let query = CityQuery {
            name: Some(city),
            region: resolved.region.clone(),
            postal_code: resolved.postal_code.clone(),
        };
        match self.search_carrier(&query).await? {
            Some(found) => {
                trace.push(format!(
                    "city resolved via geocoder: code {} ({})",
                    found.code, found.city
                ));
                Ok(Some(resolution_from(found, &resolved, ResolutionTier::Geocoder)))
            }
            None => {
                trace.push("carrier found no city for geocoded fields");
                Ok(None)
            }
        }
    }

    async fn try_carrier_tier(
        &self,
        address: &AddressInput,
        trace: &mut ResolutionTrace,
    ) -> Result<Option<CityResolution>, ResolveError> {
        let query = CityQuery {
            name: address
                .city()
                .map(str::to_owned)
                .or_else(|| Some(address.free_text())),
            region: address.region().map(str::to_owned),
            postal_code: address.postal_code().map(str::to_owned),
        };
        match self.search_carrier(&query).await? {
            Some(found) => {
                trace.push(format!(
                    "city resolved via carrier search: code {} ({})",
                    found.code, found.city
                ));
                let point = found.point();
                Ok(Some(CityResolution {
                    code: found.code,
                    admin_id: found.fias_guid,
                    point,
                    tier: ResolutionTier::CarrierSearch,
                }))
            }
            None => {
                trace.push("carrier search on raw fields found no city");
                Ok(None)
            }
        }
    }

    /// Runs a carrier city search and picks the best candidate. Transient
    /// failures become `None` so the chain can continue.
    async fn search_carrier(
        &self,
        query: &CityQuery,
    ) -> Result<Option<CarrierCity>, ResolveError> {
        match self.carrier.search_cities(query).await {
            Ok(cities) => Ok(pick_city(cities, query.region.as_deref())),
            Err(err) if err.is_auth() => Err(ResolveError::Auth(err)),
            Err(err) => {
                debug!(error = %err, "carrier city search failed, falling through");
                Ok(None)
            }
        }
    }
}

fn resolution_from(
    city: CarrierCity,
    resolved: &ResolvedAddress,
    tier: ResolutionTier,
) -> CityResolution {
    // Carrier coordinates are settlement centroids; the geocoder's point is
    // address-level and wins when present.
    let point = resolved.point.or_else(|| city.point());
    CityResolution {
        code: city.code,
        admin_id: resolved.admin_id.clone().or(city.fias_guid),
        point,
        tier,
    }
}

/// Picks the candidate whose region shares a token with the hint, else the
/// first candidate.
fn pick_city(mut cities: Vec<CarrierCity>, region_hint: Option<&str>) -> Option<CarrierCity> {
    if cities.is_empty() {
        return None;
    }
    if let Some(hint) = region_hint {
        let hint_tokens = normalized_tokens(hint);
        if let Some(pos) = cities.iter().position(|city| {
            city.region
                .as_deref()
                .is_some_and(|region| share_token(&normalized_tokens(region), &hint_tokens))
        }) {
            return Some(cities.swap_remove(pos));
        }
    }
    Some(cities.swap_remove(0))
}

/// Looks the address up in the built-in major-city table, trying the
/// canonical and roundtrip slugs of the city name, then of each free-text
/// token.
fn lookup_static_table(address: &AddressInput) -> Option<CityResolution> {
    let mut candidates = Vec::new();
    if let Some(city) = address.city() {
        candidates.push(canonical_slug(city));
        candidates.push(roundtrip_slug(city));
    }
    let free_text = address.free_text();
    for token in free_text.split(|c: char| !(c.is_alphanumeric() || c == '-')) {
        if token.is_empty() {
            continue;
        }
        candidates.push(canonical_slug(token));
        candidates.push(roundtrip_slug(token));
    }

    for slug in candidates {
        if let Some(&(_, code)) = MAJOR_CITY_CODES.iter().find(|(key, _)| *key == slug) {
            return Some(CityResolution {
                code,
                admin_id: None,
                point: None,
                tier: ResolutionTier::StaticTable,
            });
        }
    }
    None
}
