use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub carrier_base_url: String,
    pub carrier_client_id: String,
    pub carrier_client_secret: String,
    pub geocoder_base_url: String,
    pub geocoder_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub default_city_code: i64,
    pub default_origin_city: String,
    pub default_tariff_id: u32,
    pub zones_path: PathBuf,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("carrier_base_url", &self.carrier_base_url)
            .field("carrier_client_id", &self.carrier_client_id)
            .field("carrier_client_secret", &"[redacted]")
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field(
                "geocoder_api_key",
                &self.geocoder_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("default_city_code", &self.default_city_code)
            .field("default_origin_city", &self.default_origin_city)
            .field("default_tariff_id", &self.default_tariff_id)
            .field("zones_path", &self.zones_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}
