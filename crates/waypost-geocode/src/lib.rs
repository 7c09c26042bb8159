//! Address-suggestion (geocoding) client.
//!
//! Wraps the suggestion API behind a surface that never fails: any problem —
//! missing API key, network error, empty candidate list — yields `None` so
//! callers proceed to the next fallback tier. Results (including misses) are
//! cached for the process lifetime, keyed by the exact query string.

mod client;
mod types;

pub use client::{GeocodeClient, GeocodeError};
pub use types::ResolvedAddress;
