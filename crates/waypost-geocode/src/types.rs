//! Typed shapes for the suggestion API boundary.

use serde::{Deserialize, Serialize};

use waypost_core::GeoPoint;

/// Normalized address fields extracted from a suggestion candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    /// FIAS-like administrative id of the settlement.
    pub admin_id: Option<String>,
    pub point: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Suggestion {
    #[serde(default)]
    pub data: SuggestionData,
}

/// The provider reports coordinates as strings and omits any field it could
/// not derive; everything is optional here and normalized once, below.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SuggestionData {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub settlement: Option<String>,
    #[serde(default)]
    pub region_with_type: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city_fias_id: Option<String>,
    #[serde(default)]
    pub settlement_fias_id: Option<String>,
    #[serde(default)]
    pub geo_lat: Option<String>,
    #[serde(default)]
    pub geo_lon: Option<String>,
}

impl Suggestion {
    /// Flattens the provider shape into a [`ResolvedAddress`].
    ///
    /// The city field falls back to the settlement for rural addresses, and
    /// so does the administrative id.
    pub(crate) fn into_resolved(self) -> ResolvedAddress {
        let data = self.data;
        let point = match (parse_coord(&data.geo_lat), parse_coord(&data.geo_lon)) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        ResolvedAddress {
            city: data.city.or(data.settlement),
            region: data.region_with_type,
            postal_code: data.postal_code,
            admin_id: data.city_fias_id.or(data.settlement_fias_id),
            point,
        }
    }

    pub(crate) fn region_contains(&self, hint: &str) -> bool {
        let hint = hint.to_lowercase();
        self.data
            .region_with_type
            .as_deref()
            .is_some_and(|region| region.to_lowercase().contains(&hint))
    }
}

fn parse_coord(raw: &Option<String>) -> Option<f64> {
    raw.as_deref().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_fills_in_for_missing_city() {
        let suggestion = Suggestion {
            data: SuggestionData {
                settlement: Some("Borovsk".to_owned()),
                settlement_fias_id: Some("f-1".to_owned()),
                geo_lat: Some("55.20".to_owned()),
                geo_lon: Some("36.48".to_owned()),
                ..SuggestionData::default()
            },
        };
        let resolved = suggestion.into_resolved();
        assert_eq!(resolved.city.as_deref(), Some("Borovsk"));
        assert_eq!(resolved.admin_id.as_deref(), Some("f-1"));
        assert!(resolved.point.is_some());
    }

    #[test]
    fn unparseable_coordinates_become_none() {
        let suggestion = Suggestion {
            data: SuggestionData {
                city: Some("Tver".to_owned()),
                geo_lat: Some("n/a".to_owned()),
                geo_lon: Some("35.9".to_owned()),
                ..SuggestionData::default()
            },
        };
        assert!(suggestion.into_resolved().point.is_none());
    }

    #[test]
    fn region_matching_is_case_insensitive() {
        let suggestion = Suggestion {
            data: SuggestionData {
                region_with_type: Some("Tverskaya oblast".to_owned()),
                ..SuggestionData::default()
            },
        };
        assert!(suggestion.region_contains("tverskaya"));
        assert!(!suggestion.region_contains("moscow"));
    }
}
