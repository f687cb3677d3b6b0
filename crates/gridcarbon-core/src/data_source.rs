//! Carbon-intensity data source.
//!
//! Combines a [`LocationResolver`], a [`RegionResolver`] and a
//! [`ProviderClient`] into the caller-facing API:
//!
//! | Operation | Response | Description |
//! |-----------|----------|-------------|
//! | [`get_carbon_intensity`](EmissionsDataSource::get_carbon_intensity) | `Vec<EmissionsData>` | Historical ratings per location and window |
//! | [`get_current_carbon_intensity_forecast`](EmissionsDataSource::get_current_carbon_intensity_forecast) | [`EmissionsForecast`] | Provider forecast with inferred sample durations |
//!
//! All ratings are converted to g/kWh. Records are assembled only after every
//! provider call for a location has completed, so dropping an in-flight call
//! never leaves partially converted output behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gridcarbon_core::{
//!     CarbonIntensityDataSource, EmissionsDataSource, Location, ProviderConfig,
//!     ReqwestHttpClient, StaticLocationResolver, WattTimeClient,
//! };
//!
//! let provider = WattTimeClient::with_http_client(
//!     Arc::new(ReqwestHttpClient::new()),
//!     ProviderConfig::watttime(token),
//! );
//! let source = CarbonIntensityDataSource::new(Arc::new(provider), Arc::new(resolver));
//! let forecast = source.get_current_carbon_intensity_forecast(&location).await?;
//! ```

use std::sync::Arc;

use futures::future::try_join_all;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, info_span, Instrument};

use crate::location::LocationResolver;
use crate::provider::{ProviderClient, SourceError, SourceFuture};
use crate::region::RegionResolver;
use crate::{EmissionsData, EmissionsForecast, GridEmissionDataPoint, Location, RegionId, ValidationError};

/// Minimum forecast length; a sampling interval needs two timestamps.
pub const MIN_FORECAST_POINTS: usize = 2;

/// Caller-facing carbon-intensity API.
///
/// Implementations must be `Send + Sync`; calls share no mutable state.
pub trait EmissionsDataSource: Send + Sync {
    /// Historical ratings for every location over `[start, end]`.
    ///
    /// Output follows input location order, then provider sample order.
    /// Windows without samples contribute no records.
    ///
    /// # Errors
    ///
    /// Any location that fails to resolve aborts the call before any
    /// provider request is made.
    fn get_carbon_intensity<'a>(
        &'a self,
        locations: &'a [Location],
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceFuture<'a, Vec<EmissionsData>>;

    /// The provider's current forecast for `location`.
    ///
    /// # Errors
    ///
    /// Provider-data error when the forecast has fewer than
    /// [`MIN_FORECAST_POINTS`] samples.
    fn get_current_carbon_intensity_forecast<'a>(
        &'a self,
        location: &'a Location,
    ) -> SourceFuture<'a, EmissionsForecast>;
}

/// Tuning knobs for [`CarbonIntensityDataSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataSourceOptions {
    /// Run per-location provider calls concurrently. Results are still
    /// returned in input order.
    pub concurrent_locations: bool,
}

/// [`EmissionsDataSource`] backed by a single provider.
#[derive(Clone)]
pub struct CarbonIntensityDataSource {
    provider: Arc<dyn ProviderClient>,
    location_resolver: Arc<dyn LocationResolver>,
    region_resolver: RegionResolver,
    options: DataSourceOptions,
}

impl CarbonIntensityDataSource {
    pub fn new(provider: Arc<dyn ProviderClient>, location_resolver: Arc<dyn LocationResolver>) -> Self {
        Self {
            region_resolver: RegionResolver::new(provider.clone()),
            provider,
            location_resolver,
            options: DataSourceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DataSourceOptions) -> Self {
        self.options = options;
        self
    }

    async fn fetch_carbon_intensity(
        &self,
        locations: &[Location],
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<EmissionsData>, SourceError> {
        if start > end {
            return Err(ValidationError::InvalidTimeWindow {
                start: start.to_string(),
                end: end.to_string(),
            }
            .into());
        }

        let mut resolved = Vec::with_capacity(locations.len());
        for location in locations {
            resolved.push(self.location_resolver.resolve(location).await?);
        }

        let batches = if self.options.concurrent_locations {
            try_join_all(
                resolved
                    .iter()
                    .map(|location| self.location_intensity(location, start, end)),
            )
            .await?
        } else {
            let mut batches = Vec::with_capacity(resolved.len());
            for location in &resolved {
                batches.push(self.location_intensity(location, start, end).await?);
            }
            batches
        };

        let records: Vec<EmissionsData> = batches.into_iter().flatten().collect();
        info!(records = records.len(), "carbon intensity lookup complete");
        Ok(records)
    }

    async fn location_intensity(
        &self,
        location: &Location,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<EmissionsData>, SourceError> {
        let region = self.region_resolver.resolve(location).await?;
        let points = self.provider.get_data_points(&region, start, end).await?;
        debug!(location = %location, region = %region, points = points.len(), "fetched data points");

        Ok(points
            .iter()
            .map(|point| EmissionsData {
                location: region.to_string(),
                rating: point.grams_per_kwh(),
                time: point.time,
                duration: None,
            })
            .collect())
    }

    async fn fetch_current_forecast(&self, location: &Location) -> Result<EmissionsForecast, SourceError> {
        let resolved = self.location_resolver.resolve(location).await?;
        let region = self.region_resolver.resolve(&resolved).await?;
        let forecast = self.provider.get_current_forecast(&region).await?;

        let forecast_data = forecast_records(&region, &forecast.data)?;
        info!(region = %region, records = forecast_data.len(), "forecast lookup complete");

        Ok(EmissionsForecast {
            generated_at: forecast.generated_at,
            location: location.clone(),
            forecast_data,
        })
    }
}

impl EmissionsDataSource for CarbonIntensityDataSource {
    fn get_carbon_intensity<'a>(
        &'a self,
        locations: &'a [Location],
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceFuture<'a, Vec<EmissionsData>> {
        let span = info_span!(
            "get_carbon_intensity",
            provider = %self.provider.id(),
            locations = locations.len(),
            start = %start,
            end = %end
        );
        Box::pin(self.fetch_carbon_intensity(locations, start, end).instrument(span))
    }

    fn get_current_carbon_intensity_forecast<'a>(
        &'a self,
        location: &'a Location,
    ) -> SourceFuture<'a, EmissionsForecast> {
        let span = info_span!(
            "get_current_carbon_intensity_forecast",
            provider = %self.provider.id(),
            location = %location
        );
        Box::pin(self.fetch_current_forecast(location).instrument(span))
    }
}

/// Converts forecast samples to g/kWh records annotated with the gap to the
/// next sample. The last sample has no successor and reuses the gap before it.
///
/// # Errors
///
/// Provider-data error for fewer than [`MIN_FORECAST_POINTS`] samples; no
/// conversion happens in that case.
pub fn forecast_records(
    region: &RegionId,
    points: &[GridEmissionDataPoint],
) -> Result<Vec<EmissionsData>, SourceError> {
    if points.len() < MIN_FORECAST_POINTS {
        return Err(SourceError::provider_data(format!(
            "insufficient data points to infer duration for {region}: got {}, need at least {MIN_FORECAST_POINTS}",
            points.len()
        )));
    }

    let mut duration = Duration::ZERO;
    let records = points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            if let Some(next) = points.get(index + 1) {
                duration = next.time - point.time;
            }
            EmissionsData {
                location: region.to_string(),
                rating: point.grams_per_kwh(),
                time: point.time,
                duration: Some(duration),
            }
        })
        .collect();

    Ok(records)
}
