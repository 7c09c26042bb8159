use thiserror::Error;

/// Errors returned by the carrier API client.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The credential exchange was rejected. There is no fallback for access
    /// denial; callers must surface this as operator misconfiguration.
    #[error("carrier rejected credentials (status {status}): {detail}")]
    Auth { status: u16, detail: String },

    /// A non-2xx status from a business endpoint.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl CarrierError {
    /// `true` for the one error class that must never be swallowed by a
    /// fallback tier.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, CarrierError::Auth { .. })
    }
}
