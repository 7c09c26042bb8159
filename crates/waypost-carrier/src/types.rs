//! Typed request and response shapes for the carrier API.
//!
//! Provider JSON is loosely shaped in the wild, so every optional field is an
//! `Option` (or defaulted collection) here. Parsing happens once at this
//! boundary; internal logic never re-checks field existence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use waypost_core::{GeoPoint, PickupPoint};

/// Parameters for a carrier city search. All fields optional; the search
/// uses whatever is known.
#[derive(Debug, Clone, Default)]
pub struct CityQuery {
    pub name: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

/// A settlement record from the carrier's city catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierCity {
    pub code: i64,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    /// FIAS-like administrative id disambiguating same-named settlements.
    #[serde(default)]
    pub fias_guid: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl CarrierCity {
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Parameters for a delivery-point search: either a city code (plus optional
/// administrative id) or a free-text city/address pair.
#[derive(Debug, Clone, Default)]
pub struct DeliveryPointQuery {
    pub city_code: Option<i64>,
    pub admin_id: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
}

impl DeliveryPointQuery {
    #[must_use]
    pub fn by_city_code(city_code: i64, admin_id: Option<String>) -> Self {
        Self {
            city_code: Some(city_code),
            admin_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_address(city: String, region: Option<String>, address: String) -> Self {
        Self {
            city: Some(city),
            region,
            address: Some(address),
            ..Self::default()
        }
    }
}

/// A pickup point as the carrier reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierPoint {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: PointLocation,
    #[serde(default)]
    pub work_time: Option<String>,
    #[serde(default)]
    pub phones: Vec<PhoneEntry>,
    #[serde(default)]
    pub have_cash: bool,
    #[serde(default)]
    pub is_dressing_room: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointLocation {
    #[serde(default)]
    pub address_full: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneEntry {
    pub number: String,
}

impl CarrierPoint {
    /// Converts the provider shape into the domain [`PickupPoint`].
    ///
    /// Missing coordinates stay `None`; the locator backfills them later.
    #[must_use]
    pub fn into_pickup_point(self) -> PickupPoint {
        let point = match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        let address = self
            .location
            .address_full
            .or(self.location.address)
            .unwrap_or_default();
        PickupPoint {
            name: self.name.unwrap_or_else(|| self.code.clone()),
            code: self.code,
            address,
            point,
            work_hours: self.work_time,
            phones: self.phones.into_iter().map(|p| p.number).collect(),
            has_cash_on_delivery: self.have_cash,
            has_fitting_room: self.is_dressing_room,
        }
    }
}

/// A tariff calculation request for a representative placeholder shipment.
#[derive(Debug, Clone)]
pub struct TariffRequest {
    pub tariff_code: u32,
    pub from_city_code: i64,
    pub to_city_code: i64,
}

/// Placeholder package used for period estimation: the estimate is about
/// route speed, not the actual parcel.
pub(crate) const PLACEHOLDER_PACKAGE: PlaceholderPackage = PlaceholderPackage {
    weight: 1000,
    length: 20,
    width: 20,
    height: 10,
};

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct PlaceholderPackage {
    /// Grams.
    pub weight: u32,
    /// Centimeters.
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

/// Parsed tariff calculator response.
#[derive(Debug, Clone, Deserialize)]
pub struct TariffEstimate {
    pub period_min: u32,
    pub period_max: u32,
    #[serde(default)]
    pub total_sum: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_without_coordinates_converts_with_none() {
        let raw = CarrierPoint {
            code: "MSK67".to_owned(),
            name: None,
            location: PointLocation {
                address_full: None,
                address: Some("Tverskaya 7".to_owned()),
                latitude: None,
                longitude: None,
            },
            work_time: Some("Mon-Sun 09:00-21:00".to_owned()),
            phones: vec![PhoneEntry {
                number: "+7 495 000-00-00".to_owned(),
            }],
            have_cash: true,
            is_dressing_room: false,
        };

        let point = raw.into_pickup_point();
        assert_eq!(point.code, "MSK67");
        assert_eq!(point.name, "MSK67", "missing name falls back to code");
        assert_eq!(point.address, "Tverskaya 7");
        assert!(point.point.is_none());
        assert!(point.has_cash_on_delivery);
        assert_eq!(point.phones, ["+7 495 000-00-00"]);
    }

    #[test]
    fn full_address_is_preferred_over_short_address() {
        let raw = CarrierPoint {
            code: "MSK1".to_owned(),
            name: Some("Central".to_owned()),
            location: PointLocation {
                address_full: Some("Moscow, Tverskaya 7".to_owned()),
                address: Some("Tverskaya 7".to_owned()),
                latitude: Some(55.76),
                longitude: Some(37.61),
            },
            work_time: None,
            phones: vec![],
            have_cash: false,
            is_dressing_room: true,
        };

        let point = raw.into_pickup_point();
        assert_eq!(point.address, "Moscow, Tverskaya 7");
        let coords = point.point.expect("coordinates should be present");
        assert!((coords.lat - 55.76).abs() < 1e-9);
        assert!(point.has_fitting_room);
    }
}
