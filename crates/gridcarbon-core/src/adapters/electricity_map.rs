use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{normalize_records, parse_json, transport_error, ProviderRecord};
use crate::config::{ProviderConfig, StaticConfig};
use crate::http_client::HttpClient;
use crate::provider::{ProviderClient, SourceError, SourceFuture};
use crate::query::build_query_string;
use crate::transport::{AuthenticatedTransport, RequestTags};
use crate::{Forecast, GridEmissionDataPoint, ProviderId, RegionId};

const PAST_RANGE_PATH: &str = "carbon-intensity/past-range";
const FORECAST_PATH: &str = "carbon-intensity/forecast";
const LATEST_PATH: &str = "carbon-intensity/latest";

mod query_keys {
    pub const ZONE: &str = "zone";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "lon";
}

/// electricityMap v3 client. Reports carbon intensity in gCO2eq/kWh.
#[derive(Clone)]
pub struct ElectricityMapClient {
    transport: AuthenticatedTransport,
}

impl ElectricityMapClient {
    pub fn new(transport: AuthenticatedTransport) -> Self {
        Self { transport }
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: ProviderConfig) -> Self {
        Self::new(AuthenticatedTransport::new(
            http_client,
            Arc::new(StaticConfig::new(config)),
        ))
    }

    async fn fetch_past_range(
        &self,
        zone: &RegionId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<GridEmissionDataPoint>, SourceError> {
        info!(zone = %zone, start = %start, end = %end, "requesting electricitymap past range");

        let params = BTreeMap::from([
            (query_keys::ZONE, zone.as_str().to_owned()),
            (query_keys::START, format_timestamp(start)?),
            (query_keys::END, format_timestamp(end)?),
        ]);
        let body = self.request(PAST_RANGE_PATH, &params).await?;

        let response: ElectricityMapRangeResponse =
            parse_json(ProviderId::ElectricityMap, "past-range", &body)?;
        debug!(count = response.data.len(), "parsed electricitymap records");

        let zone = response_zone(response.zone.as_deref(), zone);
        normalize_records(
            response.data.into_iter().map(ProviderRecord::ElectricityMap),
            &zone,
        )
    }

    async fn fetch_forecast(&self, zone: &RegionId) -> Result<Forecast, SourceError> {
        info!(zone = %zone, "requesting electricitymap forecast");

        let params = BTreeMap::from([(query_keys::ZONE, zone.as_str().to_owned())]);
        let body = self.request(FORECAST_PATH, &params).await?;

        let response: Option<ElectricityMapForecastResponse> =
            parse_json(ProviderId::ElectricityMap, "forecast", &body)?;
        let no_forecast = || SourceError::provider_data(format!("no forecast available for {zone}"));
        let response = response.ok_or_else(no_forecast)?;

        if let Some(reason) = response.error.or(response.message) {
            return Err(SourceError::provider_data(format!(
                "electricitymap reported no forecast for {zone}: {reason}"
            )));
        }

        let (generated_at, forecast) = match (response.updated_at, response.forecast) {
            (Some(updated_at), Some(forecast)) => (updated_at, forecast),
            _ => return Err(no_forecast()),
        };

        let zone = response_zone(response.zone.as_deref(), zone);
        let data = normalize_records(
            forecast.into_iter().map(ProviderRecord::ElectricityMap),
            &zone,
        )?;
        Ok(Forecast { generated_at, data })
    }

    async fn fetch_zone(&self, latitude: f64, longitude: f64) -> Result<RegionId, SourceError> {
        info!(latitude, longitude, "requesting electricitymap zone");

        let params = BTreeMap::from([
            (query_keys::LATITUDE, latitude.to_string()),
            (query_keys::LONGITUDE, longitude.to_string()),
        ]);
        let body = match self.request(LATEST_PATH, &params).await {
            Err(error) if error.status() == Some(404) => {
                return Err(no_coverage(latitude, longitude));
            }
            other => other?,
        };

        let response: Option<ElectricityMapZoneResponse> =
            parse_json(ProviderId::ElectricityMap, "zone", &body)?;
        response
            .and_then(|latest| latest.zone)
            .and_then(|zone| RegionId::parse(&zone).ok())
            .ok_or_else(|| no_coverage(latitude, longitude))
    }

    async fn request(
        &self,
        path: &str,
        params: &BTreeMap<&str, String>,
    ) -> Result<String, SourceError> {
        let url = build_query_string(Some(path), params);
        let tags: RequestTags = params
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect();

        self.transport
            .fetch(&url, &tags)
            .await
            .map_err(transport_error(ProviderId::ElectricityMap))
    }
}

impl ProviderClient for ElectricityMapClient {
    fn id(&self) -> ProviderId {
        ProviderId::ElectricityMap
    }

    fn get_data_points<'a>(
        &'a self,
        region: &'a RegionId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceFuture<'a, Vec<GridEmissionDataPoint>> {
        Box::pin(self.fetch_past_range(region, start, end))
    }

    fn get_current_forecast<'a>(&'a self, region: &'a RegionId) -> SourceFuture<'a, Forecast> {
        Box::pin(self.fetch_forecast(region))
    }

    fn get_region_for_coordinates<'a>(
        &'a self,
        latitude: f64,
        longitude: f64,
    ) -> SourceFuture<'a, RegionId> {
        Box::pin(self.fetch_zone(latitude, longitude))
    }
}

/// electricityMap carbon-intensity entry as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityMapRecord {
    #[serde(default)]
    pub zone: Option<String>,
    pub carbon_intensity: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElectricityMapRangeResponse {
    #[serde(default)]
    zone: Option<String>,
    #[serde(default)]
    data: Vec<ElectricityMapRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElectricityMapForecastResponse {
    #[serde(default)]
    zone: Option<String>,
    #[serde(default)]
    forecast: Option<Vec<ElectricityMapRecord>>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ElectricityMapZoneResponse {
    #[serde(default)]
    zone: Option<String>,
}

/// Zone named in the response envelope, or the requested one.
fn response_zone(reported: Option<&str>, requested: &RegionId) -> RegionId {
    reported
        .and_then(|zone| RegionId::parse(zone).ok())
        .unwrap_or_else(|| requested.clone())
}

fn format_timestamp(value: OffsetDateTime) -> Result<String, SourceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| SourceError::invalid_request(format!("timestamp {value} is not RFC 3339: {e}")))
}

fn no_coverage(latitude: f64, longitude: f64) -> SourceError {
    SourceError::region(format!(
        "electricitymap has no zone covering ({latitude}, {longitude})"
    ))
}
