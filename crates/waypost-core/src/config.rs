use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let carrier_base_url = require("WAYPOST_CARRIER_BASE_URL")?;
    let carrier_client_id = require("WAYPOST_CARRIER_CLIENT_ID")?;
    let carrier_client_secret = require("WAYPOST_CARRIER_CLIENT_SECRET")?;

    let geocoder_base_url = or_default(
        "WAYPOST_GEOCODER_BASE_URL",
        "https://suggestions.dadata.ru/suggestions/api/4_1/rs",
    );
    let geocoder_api_key = lookup("WAYPOST_GEOCODER_API_KEY").ok();

    let request_timeout_secs = parse_u64("WAYPOST_REQUEST_TIMEOUT_SECS", "10")?;
    let default_city_code = parse_i64("WAYPOST_DEFAULT_CITY_CODE", "44")?;
    let default_origin_city = or_default("WAYPOST_DEFAULT_ORIGIN_CITY", "Moscow");
    let default_tariff_id = parse_u32("WAYPOST_DEFAULT_TARIFF_ID", "136")?;
    let zones_path = PathBuf::from(or_default("WAYPOST_ZONES_PATH", "./config/zones.yaml"));
    let log_level = or_default("WAYPOST_LOG_LEVEL", "info");

    Ok(AppConfig {
        carrier_base_url,
        carrier_client_id,
        carrier_client_secret,
        geocoder_base_url,
        geocoder_api_key,
        request_timeout_secs,
        default_city_code,
        default_origin_city,
        default_tariff_id,
        zones_path,
        log_level,
    })
}
