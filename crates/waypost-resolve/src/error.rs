use thiserror::Error;

use waypost_carrier::CarrierError;
use waypost_core::PolicyError;

/// The only errors the engine lets escape. Transient external failures are
/// absorbed by fallback tiers and never appear here.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Carrier credential exchange rejected — operator misconfiguration with
    /// no fallback.
    #[error("carrier authentication failed: {0}")]
    Auth(#[source] CarrierError),

    /// Malformed input (bad policy, negative subtotal, missing required
    /// fields). Raised immediately, never retried or defaulted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The engine could not be constructed (bad base URL, client build
    /// failure).
    #[error("engine setup failed: {0}")]
    Setup(String),
}

impl From<PolicyError> for ResolveError {
    fn from(err: PolicyError) -> Self {
        ResolveError::Validation(err.to_string())
    }
}
