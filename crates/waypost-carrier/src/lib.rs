//! HTTP client for the carrier REST API.
//!
//! Wraps `reqwest` with carrier-specific error handling, a cached OAuth
//! client-credentials token, and typed response deserialization. Covers the
//! three endpoints the resolution engine consumes: city search, delivery
//! points, and tariff calculation.

mod client;
mod error;
mod token;
pub mod types;

pub use client::CarrierClient;
pub use error::CarrierError;
pub use types::{
    CarrierCity, CarrierPoint, CityQuery, DeliveryPointQuery, TariffEstimate, TariffRequest,
};
