//! The end-to-end resolution pipeline.
//!
//! Composes city resolution, pickup point lookup, coordinate backfill,
//! proximity filtering, and zone classification into one call, carrying a
//! human-readable trace of every decision.

use tokio::sync::{watch, OnceCell};
use tracing::info;

use waypost_carrier::CarrierClient;
use waypost_core::{
    AddressInput, AppConfig, DeliveryPeriodEstimate, PickupPoint, PricingZone, ResolutionTrace,
    ZonesFile,
};
use waypost_geocode::GeocodeClient;

use crate::city::{CityResolution, CityResolver};
use crate::error::ResolveError;
use crate::period::PeriodEstimator;
use crate::pvz::{filter_by_tiers, CoordinateStore, NoopCoordinateStore, PvzLocator, MAX_POINTS};
use crate::zone::{match_zone_by_text, ZoneMatcher};

/// A delivery resolution request.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub address: AddressInput,
}

/// What the pipeline concluded for an address.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Pickup points were found; `zone` is the pricing zone key when the
    /// address could be classified.
    Found {
        points: Vec<PickupPoint>,
        zone: Option<String>,
    },
    /// The address resolved but no pickup point is reachable.
    NotFound,
    /// The caller cancelled before the pipeline finished.
    Cancelled,
}

/// Pipeline result: the outcome plus the decision trace that produced it.
#[derive(Debug)]
pub struct Resolution {
    pub outcome: Outcome,
    pub trace: ResolutionTrace,
}

/// The delivery resolution engine. Construct once, share by reference.
pub struct DeliveryEngine<S: CoordinateStore = NoopCoordinateStore> {
    carrier: CarrierClient,
    geocode: GeocodeClient,
    zones: Vec<PricingZone>,
    matcher: ZoneMatcher,
    store: S,
    default_city_code: i64,
    default_origin_city: String,
    default_tariff_id: u32,
    /// Origin resolution is identical for every request; resolved once.
    origin: OnceCell<CityResolution>,
}

impl DeliveryEngine<NoopCoordinateStore> {
    /// Builds an engine from application config and a validated zones file.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Setup`] if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, zones: ZonesFile) -> Result<Self, ResolveError> {
        Self::with_store(config, zones, NoopCoordinateStore)
    }
}

impl<S: CoordinateStore> DeliveryEngine<S> {
    /// Like [`DeliveryEngine::from_config`] with a custom coordinate store.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Setup`] if either HTTP client cannot be constructed.
    pub fn with_store(config: &AppConfig, zones: ZonesFile, store: S) -> Result<Self, ResolveError> {
        let carrier = CarrierClient::new(
            &config.carrier_base_url,
            &config.carrier_client_id,
            &config.carrier_client_secret,
            config.request_timeout_secs,
        )
        .map_err(|e| ResolveError::Setup(format!("carrier client: {e}")))?;
        let geocode = GeocodeClient::new(
            &config.geocoder_base_url,
            config.geocoder_api_key.clone(),
            config.request_timeout_secs,
        )
        .map_err(|e| ResolveError::Setup(format!("geocode client: {e}")))?;

        let matcher = ZoneMatcher::new(&zones);
        Ok(Self {
            carrier,
            geocode,
            zones: zones.zones,
            matcher,
            store,
            default_city_code: config.default_city_code,
            default_origin_city: config.default_origin_city.clone(),
            default_tariff_id: config.default_tariff_id,
            origin: OnceCell::new(),
        })
    }

    /// Resolves an address to nearby pickup points and a pricing zone.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Validation`] for an empty address and
    /// [`ResolveError::Auth`] for rejected carrier credentials. Everything
    /// else degrades through fallbacks and lands in the outcome.
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, ResolveError> {
        let free_text = request.address.free_text();
        if free_text.trim().is_empty() {
            return Err(ResolveError::Validation(
                "address must not be empty".to_owned(),
            ));
        }

        let mut trace = ResolutionTrace::new();
        let city = self.city_resolver().resolve(&request.address, &mut trace).await?;

        // The point lookup and the requester geocode are independent; the
        // geocode result usually comes straight from the client cache.
        let locator = self.locator();
        let (points, requester) = tokio::join!(
            locator.locate_by_city(&city),
            self.geocode.resolve(&free_text)
        );
        let mut points = points?;

        if points.is_empty() {
            trace.push("no points for city code, retrying with address query");
            let city_text = request
                .address
                .city()
                .map_or_else(|| free_text.clone(), str::to_owned);
            points = locator
                .locate_by_address(
                    city_text,
                    request.address.region().map(str::to_owned),
                    free_text.clone(),
                )
                .await?;
        }

        locator.backfill_coordinates(&mut points).await;

        let requester_point = requester.as_ref().and_then(|r| r.point).or(city.point);
        let points = match requester_point {
            Some(center) => filter_by_tiers(&points, center, &mut trace),
            None => {
                trace.push("requester coordinates unknown, skipping proximity filter");
                points.sort_by(|a, b| a.code.cmp(&b.code));
                points.truncate(MAX_POINTS);
                points
            }
        };

        if points.is_empty() {
            info!("no reachable pickup points for address");
            return Ok(Resolution {
                outcome: Outcome::NotFound,
                trace,
            });
        }

        let zone = match requester_point {
            Some(center) => self.matcher.match_zone(center).map(str::to_owned),
            None => match_zone_by_text(&free_text, &self.zones).map(|z| z.key.clone()),
        };
        match &zone {
            Some(key) => trace.push(format!("pricing zone: {key}")),
            None => trace.push("no pricing zone matched"),
        }

        Ok(Resolution {
            outcome: Outcome::Found { points, zone },
            trace,
        })
    }

    /// Like [`DeliveryEngine::resolve`], but abandons the pipeline as soon
    /// as the watch channel reads `true`.
    ///
    /// # Errors
    ///
    /// Same as [`DeliveryEngine::resolve`].
    pub async fn resolve_until(
        &self,
        request: &ResolveRequest,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<Resolution, ResolveError> {
        if *cancel.borrow() {
            return Ok(cancelled());
        }
        tokio::select! {
            result = self.resolve(request) => result,
            // A dropped sender disables this branch instead of cancelling.
            Ok(_) = cancel.wait_for(|&flag| flag) => Ok(cancelled()),
        }
    }

    /// Estimates the delivery period to the given address. Without an
    /// origin override the configured default origin is used; its
    /// resolution is cached across calls.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Validation`] for an empty address,
    /// [`ResolveError::Auth`] for rejected credentials.
    pub async fn estimate_period(
        &self,
        destination: &AddressInput,
        origin_override: Option<&AddressInput>,
        tariff_id: Option<u32>,
    ) -> Result<(DeliveryPeriodEstimate, ResolutionTrace), ResolveError> {
        if destination.free_text().trim().is_empty() {
            return Err(ResolveError::Validation(
                "address must not be empty".to_owned(),
            ));
        }

        let mut trace = ResolutionTrace::new();
        let destination = self.city_resolver().resolve(destination, &mut trace).await?;
        let origin_code = match origin_override {
            Some(origin) => {
                self.city_resolver()
                    .resolve(origin, &mut trace)
                    .await?
                    .code
            }
            None => self.origin().await?.code,
        };
        let estimator = PeriodEstimator {
            carrier: &self.carrier,
            tariff_id: tariff_id.unwrap_or(self.default_tariff_id),
        };
        let estimate = estimator
            .estimate(origin_code, &destination, &mut trace)
            .await?;
        Ok((estimate, trace))
    }

    /// The configured pricing zones, in match order.
    #[must_use]
    pub fn zones(&self) -> &[PricingZone] {
        &self.zones
    }

    async fn origin(&self) -> Result<&CityResolution, ResolveError> {
        self.origin
            .get_or_try_init(|| async {
                let mut trace = ResolutionTrace::new();
                let origin_input = AddressInput::Raw(self.default_origin_city.clone());
                self.city_resolver().resolve(&origin_input, &mut trace).await
            })
            .await
    }

    fn city_resolver(&self) -> CityResolver<'_> {
        CityResolver {
            carrier: &self.carrier,
            geocode: &self.geocode,
            default_city_code: self.default_city_code,
        }
    }

    fn locator(&self) -> PvzLocator<'_, S> {
        PvzLocator {
            carrier: &self.carrier,
            geocode: &self.geocode,
            store: &self.store,
        }
    }
}

fn cancelled() -> Resolution {
    let mut trace = ResolutionTrace::new();
    trace.push("resolution cancelled by caller");
    Resolution {
        outcome: Outcome::Cancelled,
        trace,
    }
}
