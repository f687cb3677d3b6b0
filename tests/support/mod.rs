//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use gridcarbon_core::{
    Coordinates, EmissionsUnit, Forecast, GridEmissionDataPoint, HttpClient, HttpError,
    HttpRequest, HttpResponse, Location, LocationResolver, ProviderClient, ProviderId, RegionId,
    SourceError, SourceFuture,
};
use time::OffsetDateTime;

pub fn region(value: &str) -> RegionId {
    RegionId::parse(value).expect("valid region")
}

pub fn moer_point(region_id: &str, time: OffsetDateTime, value: f64) -> GridEmissionDataPoint {
    GridEmissionDataPoint::new(
        region(region_id),
        time,
        value,
        EmissionsUnit::PoundsPerMegawattHour,
    )
}

/// Provider double that answers from canned data and records every call.
#[derive(Default)]
pub struct FakeProvider {
    regions: HashMap<String, Result<RegionId, SourceError>>,
    default_region: Option<Result<RegionId, SourceError>>,
    data: HashMap<String, Vec<GridEmissionDataPoint>>,
    forecast: Option<Result<Forecast, SourceError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every coordinate pair resolves to `region_id`.
    pub fn with_region(mut self, region_id: &str) -> Self {
        self.default_region = Some(Ok(region(region_id)));
        self
    }

    /// Coordinates with this latitude resolve to `region_id`.
    pub fn with_region_at(mut self, latitude: f64, region_id: &str) -> Self {
        self.regions
            .insert(latitude.to_string(), Ok(region(region_id)));
        self
    }

    pub fn failing_region(mut self, error: SourceError) -> Self {
        self.default_region = Some(Err(error));
        self
    }

    pub fn with_data(mut self, region_id: &str, points: Vec<GridEmissionDataPoint>) -> Self {
        self.data.insert(region_id.to_owned(), points);
        self
    }

    pub fn with_forecast(mut self, forecast: Forecast) -> Self {
        self.forecast = Some(Ok(forecast));
        self
    }

    pub fn failing_forecast(mut self, error: SourceError) -> Self {
        self.forecast = Some(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("call log should not be poisoned")
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .expect("call log should not be poisoned")
            .push(call);
    }
}

impl ProviderClient for FakeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WattTime
    }

    fn get_data_points<'a>(
        &'a self,
        region_id: &'a RegionId,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> SourceFuture<'a, Vec<GridEmissionDataPoint>> {
        self.record(format!("data:{region_id}"));
        let points = self
            .data
            .get(region_id.as_str())
            .cloned()
            .unwrap_or_default();
        Box::pin(async move { Ok(points) })
    }

    fn get_current_forecast<'a>(&'a self, region_id: &'a RegionId) -> SourceFuture<'a, Forecast> {
        self.record(format!("forecast:{region_id}"));
        let forecast = self
            .forecast
            .clone()
            .unwrap_or_else(|| Err(SourceError::provider_data("no forecast configured")));
        Box::pin(async move { forecast })
    }

    fn get_region_for_coordinates<'a>(
        &'a self,
        latitude: f64,
        longitude: f64,
    ) -> SourceFuture<'a, RegionId> {
        self.record(format!("region:{latitude},{longitude}"));
        let region_id = self
            .regions
            .get(&latitude.to_string())
            .cloned()
            .or_else(|| self.default_region.clone())
            .unwrap_or_else(|| Err(SourceError::region("no region configured")));
        Box::pin(async move { region_id })
    }
}

/// Resolver double that attaches fixed coordinates, or fails for named
/// locations.
pub struct FakeLocationResolver {
    coordinates: Coordinates,
    per_name: HashMap<String, Coordinates>,
    failing: Vec<String>,
    resolved: Mutex<Vec<String>>,
}

impl FakeLocationResolver {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude).expect("valid coordinates"),
            per_name: HashMap::new(),
            failing: Vec::new(),
            resolved: Mutex::new(Vec::new()),
        }
    }

    pub fn with_location(mut self, name: &str, latitude: f64, longitude: f64) -> Self {
        self.per_name.insert(
            name.to_owned(),
            Coordinates::new(latitude, longitude).expect("valid coordinates"),
        );
        self
    }

    pub fn failing_for(mut self, name: &str) -> Self {
        self.failing.push(name.to_owned());
        self
    }

    pub fn resolved(&self) -> Vec<String> {
        self.resolved
            .lock()
            .expect("resolution log should not be poisoned")
            .clone()
    }
}

impl LocationResolver for FakeLocationResolver {
    fn resolve<'a>(&'a self, location: &'a Location) -> SourceFuture<'a, Location> {
        self.resolved
            .lock()
            .expect("resolution log should not be poisoned")
            .push(location.name.clone());

        let result = if self.failing.contains(&location.name) {
            Err(SourceError::location(format!(
                "cannot geocode '{}'",
                location.name
            )))
        } else {
            let coordinates = self
                .per_name
                .get(&location.name)
                .copied()
                .unwrap_or(self.coordinates);
            Ok(location.with_coordinates(coordinates))
        };
        Box::pin(async move { result })
    }
}

/// HTTP double that replays queued responses in order and records requests.
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(status: u16, body: &str) -> Self {
        Self::new(vec![Ok(HttpResponse::new(status, body))])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.url)
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("response queue should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("no scripted response left")));
        Box::pin(async move { response })
    }
}
