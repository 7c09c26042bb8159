//! Shared domain types and configuration for the waypost delivery engine.

pub mod app_config;
pub mod config;
pub mod types;
pub mod zones;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    AddressInput, DeliveryCostPolicy, DeliveryPeriodEstimate, GeoPoint, PickupPoint, PolicyError,
    ResolutionTrace, StructuredAddress,
};
pub use zones::{load_zones, PricingZone, ZoneBoundary, ZonesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read zones file {path}: {source}")]
    ZonesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse zones file: {0}")]
    ZonesFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
