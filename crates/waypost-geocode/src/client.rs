//! The suggestion API client and its process-lifetime cache.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;
use thiserror::Error;

use crate::types::{ResolvedAddress, Suggestion, SuggestionResponse};

/// How many ranked candidates to request per query.
const CANDIDATE_COUNT: u8 = 5;

/// Errors from the suggestion API boundary. Lookup failures are absorbed
/// into `None` results; only construction surfaces this type to callers.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("JSON deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid suggestion URL: {0}")]
    InvalidUrl(String),
}

/// Client for the address-suggestion API.
///
/// Construct once and share by reference; the cache lives as long as the
/// client. Without an API key the client is inert: every resolve returns
/// `None` so the pipeline skips straight to the next tier.
pub struct GeocodeClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    cache: RwLock<HashMap<String, Option<ResolvedAddress>>>,
}

impl GeocodeClient {
    /// Creates a new client. `base_url` can point at a mock server in tests.
    ///
    /// # Errors
    ///
    /// [`GeocodeError::InvalidUrl`] if the base URL does not parse,
    /// [`GeocodeError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, GeocodeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("waypost/0.1 (delivery-resolution)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// `true` when an API key is configured and resolutions can succeed.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Resolves a free-text address to normalized fields, or `None`.
    ///
    /// Never fails: a missing API key, a transport error, or an empty
    /// candidate list all yield `None` (logged at debug). Results are cached
    /// by the exact query string for the process lifetime, misses included.
    pub async fn resolve(&self, query: &str) -> Option<ResolvedAddress> {
        self.resolve_with_hint(query, None).await
    }

    /// Like [`GeocodeClient::resolve`], but prefers the best candidate whose
    /// region contains `region_hint` (case-insensitive) when the top
    /// candidate is ambiguous.
    pub async fn resolve_in_region(
        &self,
        query: &str,
        region_hint: &str,
    ) -> Option<ResolvedAddress> {
        self.resolve_with_hint(query, Some(region_hint)).await
    }

    async fn resolve_with_hint(
        &self,
        query: &str,
        region_hint: Option<&str>,
    ) -> Option<ResolvedAddress> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("geocoder not configured; skipping");
            return None;
        };

        let cache_key = match region_hint {
            None => query.to_owned(),
            Some(hint) => format!("{query} | region:{hint}"),
        };
        if let Some(cached) = self.cached(&cache_key) {
            return cached;
        }

        let resolved = match self.suggest(api_key, query).await {
            Ok(candidates) => pick_candidate(candidates, region_hint),
            Err(error) => {
                tracing::debug!(query, %error, "geocode lookup failed; treating as miss");
                None
            }
        };

        self.store(cache_key, resolved.clone());
        resolved
    }

    async fn suggest(&self, api_key: &str, query: &str) -> Result<Vec<Suggestion>, GeocodeError> {
        let url = self
            .base_url
            .join("suggest/address")
            .map_err(|e| GeocodeError::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Token {api_key}"))
            .json(&json!({ "query": query, "count": CANDIDATE_COUNT }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SuggestionResponse = serde_json::from_str(&body)?;
        Ok(parsed.suggestions)
    }

    fn cached(&self, key: &str) -> Option<Option<ResolvedAddress>> {
        let cache = self.cache.read().ok()?;
        cache.get(key).cloned()
    }

    fn store(&self, key: String, value: Option<ResolvedAddress>) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, value);
        }
    }
}

/// First candidate matching the region hint wins; without a hint (or without
/// a match) the top-ranked candidate does.
fn pick_candidate(
    candidates: Vec<Suggestion>,
    region_hint: Option<&str>,
) -> Option<ResolvedAddress> {
    if let Some(hint) = region_hint {
        if let Some(index) = candidates.iter().position(|c| c.region_contains(hint)) {
            let mut candidates = candidates;
            return Some(candidates.swap_remove(index).into_resolved());
        }
    }
    candidates.into_iter().next().map(Suggestion::into_resolved)
}
