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

const DATA_PATH: &str = "data";
const FORECAST_PATH: &str = "forecast";
const BALANCING_AUTHORITY_PATH: &str = "ba-from-loc";

mod query_keys {
    pub const BALANCING_AUTHORITY: &str = "ba";
    pub const START_TIME: &str = "starttime";
    pub const END_TIME: &str = "endtime";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
}

/// WattTime v2 client. Reports MOER values in lbs/MWh.
#[derive(Clone)]
pub struct WattTimeClient {
    transport: AuthenticatedTransport,
}

impl WattTimeClient {
    pub fn new(transport: AuthenticatedTransport) -> Self {
        Self { transport }
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: ProviderConfig) -> Self {
        Self::new(AuthenticatedTransport::new(
            http_client,
            Arc::new(StaticConfig::new(config)),
        ))
    }

    async fn fetch_data_points(
        &self,
        region: &RegionId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<GridEmissionDataPoint>, SourceError> {
        info!(
            balancing_authority = %region,
            start = %start,
            end = %end,
            "requesting watttime data"
        );

        let params = BTreeMap::from([
            (query_keys::BALANCING_AUTHORITY, region.as_str().to_owned()),
            (query_keys::START_TIME, format_timestamp(start)?),
            (query_keys::END_TIME, format_timestamp(end)?),
        ]);
        let body = self.request(DATA_PATH, &params).await?;

        let records: Vec<WattTimeDataPoint> = parse_json(ProviderId::WattTime, "data", &body)?;
        debug!(count = records.len(), "parsed watttime data points");
        normalize_records(records.into_iter().map(ProviderRecord::WattTime), region)
    }

    async fn fetch_current_forecast(&self, region: &RegionId) -> Result<Forecast, SourceError> {
        info!(balancing_authority = %region, "requesting watttime current forecast");

        let params = BTreeMap::from([(query_keys::BALANCING_AUTHORITY, region.as_str().to_owned())]);
        let body = self.request(FORECAST_PATH, &params).await?;

        let response: Option<WattTimeForecastResponse> =
            parse_json(ProviderId::WattTime, "forecast", &body)?;
        let no_forecast = || SourceError::provider_data(format!("no forecast available for {region}"));
        let response = response.ok_or_else(no_forecast)?;

        if let Some(reason) = response.error.or(response.message) {
            return Err(SourceError::provider_data(format!(
                "watttime reported no forecast for {region}: {reason}"
            )));
        }

        let (generated_at, forecast) = match (response.generated_at, response.forecast) {
            (Some(generated_at), Some(forecast)) => (generated_at, forecast),
            _ => return Err(no_forecast()),
        };

        let data = normalize_records(forecast.into_iter().map(ProviderRecord::WattTime), region)?;
        Ok(Forecast { generated_at, data })
    }

    async fn fetch_balancing_authority(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RegionId, SourceError> {
        info!(latitude, longitude, "requesting watttime balancing authority");

        let params = BTreeMap::from([
            (query_keys::LATITUDE, latitude.to_string()),
            (query_keys::LONGITUDE, longitude.to_string()),
        ]);
        let body = match self.request(BALANCING_AUTHORITY_PATH, &params).await {
            Err(error) if error.status() == Some(404) => {
                return Err(no_coverage(latitude, longitude));
            }
            other => other?,
        };

        let response: Option<WattTimeBalancingAuthority> =
            parse_json(ProviderId::WattTime, "balancing authority", &body)?;
        response
            .and_then(|authority| authority.abbrev)
            .and_then(|abbrev| RegionId::parse(&abbrev).ok())
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
            .map_err(transport_error(ProviderId::WattTime))
    }
}

impl ProviderClient for WattTimeClient {
    fn id(&self) -> ProviderId {
        ProviderId::WattTime
    }

    fn get_data_points<'a>(
        &'a self,
        region: &'a RegionId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceFuture<'a, Vec<GridEmissionDataPoint>> {
        Box::pin(self.fetch_data_points(region, start, end))
    }

    fn get_current_forecast<'a>(&'a self, region: &'a RegionId) -> SourceFuture<'a, Forecast> {
        Box::pin(self.fetch_current_forecast(region))
    }

    fn get_region_for_coordinates<'a>(
        &'a self,
        latitude: f64,
        longitude: f64,
    ) -> SourceFuture<'a, RegionId> {
        Box::pin(self.fetch_balancing_authority(latitude, longitude))
    }
}

/// WattTime emissions sample as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WattTimeDataPoint {
    #[serde(rename = "ba")]
    pub balancing_authority: String,
    #[serde(with = "time::serde::rfc3339")]
    pub point_time: OffsetDateTime,
    pub value: f64,
    #[serde(default)]
    pub frequency: Option<i64>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WattTimeForecastResponse {
    #[serde(default, with = "time::serde::rfc3339::option")]
    generated_at: Option<OffsetDateTime>,
    #[serde(default)]
    forecast: Option<Vec<WattTimeDataPoint>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WattTimeBalancingAuthority {
    #[serde(default)]
    abbrev: Option<String>,
}

fn format_timestamp(value: OffsetDateTime) -> Result<String, SourceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| SourceError::invalid_request(format!("timestamp {value} is not RFC 3339: {e}")))
}

fn no_coverage(latitude: f64, longitude: f64) -> SourceError {
    SourceError::region(format!(
        "watttime has no balancing authority covering ({latitude}, {longitude})"
    ))
}
