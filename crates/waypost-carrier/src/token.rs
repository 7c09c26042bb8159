//! OAuth client-credentials token cache.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::Url;
use serde::Deserialize;

use crate::error::CarrierError;

/// Refresh this long before the reported expiry so a token never dies
/// mid-request.
const SAFETY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Caches the carrier bearer token for the process lifetime.
///
/// The lock guards only the cache slot; the credential exchange itself runs
/// outside it, so concurrent refreshes may duplicate the token call. The
/// carrier tolerates duplicates and the last writer wins.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns a bearer token, reusing the cached one while it is still
    /// comfortably within its lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`CarrierError::Auth`] if the carrier rejects the credentials
    /// and [`CarrierError::Http`] on network failure. Neither is retried
    /// here; auth rejection has no fallback and transient failures are the
    /// caller's tier to handle.
    pub(crate) async fn bearer(
        &self,
        http: &reqwest::Client,
        base_url: &Url,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, CarrierError> {
        if let Some(token) = self.fresh_token(Instant::now()) {
            return Ok(token);
        }

        let url = join_url(base_url, "oauth/token")?;
        let response = http
            .post(url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CarrierError::Auth {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| CarrierError::Deserialize {
                context: "oauth/token".to_owned(),
                source: e,
            })?;

        let expires_at = Instant::now() + Duration::from_secs(parsed.expires_in);
        self.store(parsed.access_token.clone(), expires_at);
        tracing::debug!(expires_in = parsed.expires_in, "carrier token refreshed");

        Ok(parsed.access_token)
    }

    fn fresh_token(&self, now: Instant) -> Option<String> {
        let slot = self.slot.lock().ok()?;
        let cached = slot.as_ref()?;
        is_fresh(cached.expires_at, now).then(|| cached.value.clone())
    }

    fn store(&self, value: String, expires_at: Instant) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CachedToken { value, expires_at });
        }
    }
}

pub(crate) fn join_url(base_url: &Url, path: &str) -> Result<Url, CarrierError> {
    base_url.join(path).map_err(|e| CarrierError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

fn is_fresh(expires_at: Instant, now: Instant) -> bool {
    expires_at.checked_duration_since(now).is_some_and(|left| left > SAFETY_MARGIN)
}
