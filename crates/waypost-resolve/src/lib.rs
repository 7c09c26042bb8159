//! Delivery resolution engine: address → pickup points, pricing zone,
//! shipping cost, and delivery period, with fallbacks at every external
//! seam.

pub mod city;
pub mod cost;
pub mod error;
pub mod geo;
pub mod orchestrator;
pub mod period;
pub mod pvz;
pub mod translit;
pub mod zone;

pub use city::{CityResolution, CityResolver, ResolutionTier};
pub use cost::{compute_cost, ShippingCost};
pub use error::ResolveError;
pub use geo::haversine_km;
pub use orchestrator::{DeliveryEngine, Outcome, Resolution, ResolveRequest};
pub use period::{PeriodEstimator, HANDLING_BUFFER_DAYS};
pub use pvz::{
    filter_by_radius, filter_by_tiers, CoordinateStore, NoopCoordinateStore, PvzLocator,
    MAX_POINTS, RADIUS_TIERS_KM,
};
pub use zone::{match_zone_by_text, ZoneMatcher};
