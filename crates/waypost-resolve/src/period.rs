//! Delivery period estimation: carrier tariff calculator with a static
//! band fallback.

use tracing::warn;

use waypost_carrier::{CarrierClient, TariffRequest};
use waypost_core::{DeliveryPeriodEstimate, ResolutionTrace};

use crate::city::{CityResolution, ResolutionTier};
use crate::error::ResolveError;

/// Warehouse handling time added on top of carrier transit days.
pub const HANDLING_BUFFER_DAYS: u32 = 2;

pub struct PeriodEstimator<'a> {
    pub carrier: &'a CarrierClient,
    pub tariff_id: u32,
}

impl PeriodEstimator<'_> {
    /// Estimates the door-to-pickup delivery period in days.
    ///
    /// The carrier's tariff calculator is authoritative; when it fails
    /// transiently the estimate falls back to a static band whose width
    /// reflects how confidently the destination was resolved.
    ///
    /// # Errors
    ///
    /// Only [`ResolveError::Auth`].
    pub async fn estimate(
        &self,
        origin_code: i64,
        destination: &CityResolution,
        trace: &mut ResolutionTrace,
    ) -> Result<DeliveryPeriodEstimate, ResolveError> {
        let request = TariffRequest {
            tariff_code: self.tariff_id,
            from_city_code: origin_code,
            to_city_code: destination.code,
        };
        match self.carrier.calculate_tariff(&request).await {
            Ok(tariff) => {
                let min = buffered(tariff.period_min);
                let max = buffered(tariff.period_max);
                trace.push(format!("carrier tariff period: {min}-{max} days"));
                Ok(DeliveryPeriodEstimate::new(min, max, describe(min, max)))
            }
            Err(err) if err.is_auth() => Err(ResolveError::Auth(err)),
            Err(err) => {
                warn!(error = %err, "tariff calculation failed, using static band");
                let (min, max) = static_band(destination.tier);
                trace.push(format!(
                    "static period band for {} resolution: {min}-{max} days",
                    destination.tier
                ));
                Ok(DeliveryPeriodEstimate::new(min, max, describe(min, max)))
            }
        }
    }
}

/// Transit days plus the handling buffer. Carrier-supplied values are
/// untrusted, so the add saturates instead of overflowing.
fn buffered(transit_days: u32) -> u32 {
    transit_days.saturating_add(HANDLING_BUFFER_DAYS)
}

/// Fallback period band. The less precise the destination resolution, the
/// wider and later the band.
fn static_band(tier: ResolutionTier) -> (u32, u32) {
    match tier {
        ResolutionTier::Geocoder | ResolutionTier::CarrierSearch => (3, 5),
        ResolutionTier::StaticTable => (5, 7),
        ResolutionTier::Default => (7, 10),
    }
}

fn describe(min: u32, max: u32) -> String {
    if min == max {
        format!("{min} {}", day_word(min))
    } else {
        format!("{min} to {max} days")
    }
}

fn day_word(days: u32) -> &'static str {
    if days == 1 { "day" } else { "days" }
}
