//! The carrier API client.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::CarrierError;
use crate::token::{join_url, TokenCache};
use crate::types::{
    CarrierCity, CarrierPoint, CityQuery, DeliveryPointQuery, TariffEstimate, TariffRequest,
    PLACEHOLDER_PACKAGE,
};

/// Client for the carrier REST API.
///
/// Manages the HTTP client, the OAuth token cache, and the base URL. Point
/// `base_url` at a `wiremock` server in tests.
pub struct CarrierClient {
    http: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    tokens: TokenCache,
}

impl CarrierClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`CarrierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CarrierError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
    ) -> Result<Self, CarrierError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("waypost/0.1 (delivery-resolution)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CarrierError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            tokens: TokenCache::new(),
        })
    }

    /// Searches the carrier city catalogue with whatever fields are known.
    ///
    /// # Errors
    ///
    /// - [`CarrierError::Auth`] if the credential exchange is rejected.
    /// - [`CarrierError::Http`] / [`CarrierError::UnexpectedStatus`] on
    ///   transport failure.
    /// - [`CarrierError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search_cities(&self, query: &CityQuery) -> Result<Vec<CarrierCity>, CarrierError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(name) = query.name.as_deref() {
            params.push(("city", name));
        }
        if let Some(region) = query.region.as_deref() {
            params.push(("region", region));
        }
        if let Some(postal_code) = query.postal_code.as_deref() {
            params.push(("postal_code", postal_code));
        }

        let url = self.build_url("location/cities", &params)?;
        self.get_typed(url, "location/cities").await
    }

    /// Fetches delivery points by city code or free-text address.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`CarrierClient::search_cities`].
    pub async fn delivery_points(
        &self,
        query: &DeliveryPointQuery,
    ) -> Result<Vec<CarrierPoint>, CarrierError> {
        let city_code_string;
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(city_code) = query.city_code {
            city_code_string = city_code.to_string();
            params.push(("city_code", &city_code_string));
        }
        if let Some(admin_id) = query.admin_id.as_deref() {
            params.push(("fias_guid", admin_id));
        }
        if let Some(city) = query.city.as_deref() {
            params.push(("city", city));
        }
        if let Some(region) = query.region.as_deref() {
            params.push(("region", region));
        }
        if let Some(address) = query.address.as_deref() {
            params.push(("address", address));
        }

        let url = self.build_url("deliverypoints", &params)?;
        self.get_typed(url, "deliverypoints").await
    }

    /// Runs the tariff calculator for a representative placeholder shipment
    /// between two city codes.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`CarrierClient::search_cities`].
    pub async fn calculate_tariff(
        &self,
        request: &TariffRequest,
    ) -> Result<TariffEstimate, CarrierError> {
        let url = self.build_url("calculator/tariff", &[])?;
        let token = self.bearer().await?;

        let body = json!({
            "tariff_code": request.tariff_code,
            "from_location": { "code": request.from_city_code },
            "to_location": { "code": request.to_city_code },
            "packages": [PLACEHOLDER_PACKAGE],
        });

        let response = self
            .http
            .post(url.clone())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarrierError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| CarrierError::Deserialize {
            context: "calculator/tariff".to_owned(),
            source: e,
        })
    }

    async fn bearer(&self) -> Result<String, CarrierError> {
        self.tokens
            .bearer(&self.http, &self.base_url, &self.client_id, &self.client_secret)
            .await
    }

    /// Builds a request URL with properly percent-encoded query parameters.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, CarrierError> {
        let mut url = join_url(&self.base_url, path)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends an authenticated GET, asserts a 2xx status, and parses the body.
    async fn get_typed<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, CarrierError> {
        let token = self.bearer().await?;
        let response = self.http.get(url.clone()).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarrierError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| CarrierError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
