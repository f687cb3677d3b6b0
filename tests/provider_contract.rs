//! Provider contract tests
//!
//! Drive the WattTime and electricityMap clients end to end over a scripted
//! HTTP client, and verify both honor the same `ProviderClient` contract.

mod support;

use std::sync::Arc;

use gridcarbon_core::{
    convert_moer_to_grams_per_kwh, CarbonIntensityDataSource, CloudProvider, Coordinates,
    ElectricityMapClient, EmissionsDataSource, HttpError, HttpResponse, Location,
    ProviderClient, ProviderConfig, ProviderId, SourceErrorKind, StaticLocationResolver,
    WattTimeClient,
};
use rstest::rstest;
use support::{region, ScriptedHttpClient};
use time::macros::datetime;
use time::Duration;

fn watttime(http: Arc<ScriptedHttpClient>) -> WattTimeClient {
    let config = ProviderConfig::watttime("wt-token")
        .with_base_url("https://watttime.test/v2")
        .expect("valid base url");
    WattTimeClient::with_http_client(http, config)
}

fn electricity_map(http: Arc<ScriptedHttpClient>) -> ElectricityMapClient {
    let config = ProviderConfig::electricity_map("em-token")
        .with_base_url("https://emap.test/v3")
        .expect("valid base url");
    ElectricityMapClient::with_http_client(http, config)
}

fn client_for(provider: ProviderId, http: Arc<ScriptedHttpClient>) -> Arc<dyn ProviderClient> {
    match provider {
        ProviderId::WattTime => Arc::new(watttime(http)),
        ProviderId::ElectricityMap => Arc::new(electricity_map(http)),
    }
}

fn eastus_resolver() -> Arc<StaticLocationResolver> {
    Arc::new(StaticLocationResolver::new().with_region(
        CloudProvider::Azure,
        "eastus",
        Coordinates::new(37.3719, -79.8164).expect("valid coordinates"),
    ))
}

// =============================================================================
// WattTime end to end
// =============================================================================

#[tokio::test]
async fn watttime_history_flows_from_coordinates_to_converted_records() {
    // Given: WattTime answers the region lookup and the data query
    let http = Arc::new(ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok_json(r#"{"abbrev": "PJM_ROANOKE", "id": 232}"#)),
        Ok(HttpResponse::ok_json(
            r#"[{"ba": "PJM_ROANOKE", "point_time": "2022-04-18T18:32:42Z", "value": 10.0}]"#,
        )),
    ]));
    let source = CarbonIntensityDataSource::new(Arc::new(watttime(http.clone())), eastus_resolver());
    let location = Location::cloud_region(CloudProvider::Azure, "eastus");

    // When
    let records = source
        .get_carbon_intensity(
            &[location],
            datetime!(2022-04-18 12:30 -6),
            datetime!(2022-04-18 12:40 -6),
        )
        .await
        .expect("lookup should succeed");

    // Then: One converted record and two provider calls in order
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].location, "PJM_ROANOKE");
    assert_eq!(records[0].rating, convert_moer_to_grams_per_kwh(10.0));
    assert_eq!(records[0].time, datetime!(2022-04-18 18:32:42 UTC));

    let urls = http.urls();
    assert_eq!(urls.len(), 2);
    assert_eq!(
        urls[0],
        "https://watttime.test/v2/ba-from-loc?latitude=37.3719&longitude=-79.8164"
    );
    assert!(urls[1].starts_with("https://watttime.test/v2/data?ba=PJM_ROANOKE&"));
    for request in http.requests() {
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer wt-token")
        );
    }
}

#[tokio::test]
async fn watttime_expired_token_is_retried_once_inside_a_lookup() {
    // Given: The first region lookup is rejected with 401
    let http = Arc::new(ScriptedHttpClient::new(vec![
        Ok(HttpResponse::new(401, "token expired")),
        Ok(HttpResponse::ok_json(r#"{"abbrev": "BA"}"#)),
        Ok(HttpResponse::ok_json("[]")),
    ]));
    let source = CarbonIntensityDataSource::new(Arc::new(watttime(http.clone())), eastus_resolver());
    let location = Location::geoposition(37.3719, -79.8164);

    // When
    let records = source
        .get_carbon_intensity(
            &[location],
            datetime!(2022-04-18 12:30 -6),
            datetime!(2022-04-18 12:40 -6),
        )
        .await
        .expect("retry should recover");

    // Then: The rejected request was re-issued unchanged
    assert!(records.is_empty());
    let requests = http.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0], requests[1]);
}

#[tokio::test]
async fn watttime_forecast_gets_inferred_durations() {
    // Given: A WattTime forecast with three samples
    let http = Arc::new(ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok_json(r#"{"abbrev": "BA"}"#)),
        Ok(HttpResponse::ok_json(
            r#"{
                "generated_at": "2022-04-18T18:30:00Z",
                "forecast": [
                    {"ba": "BA", "point_time": "2022-04-18T18:35:00Z", "value": 10},
                    {"ba": "BA", "point_time": "2022-04-18T18:40:00Z", "value": 20},
                    {"ba": "BA", "point_time": "2022-04-18T18:45:00Z", "value": 30}
                ]
            }"#,
        )),
    ]));
    let source = CarbonIntensityDataSource::new(Arc::new(watttime(http.clone())), eastus_resolver());
    let location = Location::cloud_region(CloudProvider::Azure, "EastUS");

    // When
    let forecast = source
        .get_current_carbon_intensity_forecast(&location)
        .await
        .expect("forecast should succeed");

    // Then
    assert_eq!(forecast.generated_at, datetime!(2022-04-18 18:30 UTC));
    assert_eq!(forecast.location, location);
    assert!(forecast
        .forecast_data
        .iter()
        .all(|record| record.duration == Some(Duration::minutes(5))));
    assert_eq!(http.urls()[1], "https://watttime.test/v2/forecast?ba=BA");
}

// =============================================================================
// electricityMap end to end
// =============================================================================

#[tokio::test]
async fn electricity_map_forecast_keeps_grams_and_uses_updated_at() {
    // Given: electricityMap answers the zone lookup and the forecast
    let http = Arc::new(ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok_json(r#"{"zone": "US-MIDA-PJM", "carbonIntensity": 400}"#)),
        Ok(HttpResponse::ok_json(
            r#"{
                "zone": "US-MIDA-PJM",
                "forecast": [
                    {"carbonIntensity": 380, "datetime": "2022-04-18T19:00:00.000Z"},
                    {"carbonIntensity": 360, "datetime": "2022-04-18T20:00:00.000Z"}
                ],
                "updatedAt": "2022-04-18T18:55:00.000Z"
            }"#,
        )),
    ]));
    let source =
        CarbonIntensityDataSource::new(Arc::new(electricity_map(http.clone())), eastus_resolver());

    // When
    let forecast = source
        .get_current_carbon_intensity_forecast(&Location::geoposition(37.3719, -79.8164))
        .await
        .expect("forecast should succeed");

    // Then: g/kWh values pass through, hourly durations are inferred
    assert_eq!(forecast.generated_at, datetime!(2022-04-18 18:55 UTC));
    let ratings: Vec<_> = forecast.forecast_data.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![380.0, 360.0]);
    assert!(forecast
        .forecast_data
        .iter()
        .all(|record| record.duration == Some(Duration::hours(1)) && record.location == "US-MIDA-PJM"));

    let urls = http.urls();
    assert_eq!(urls[0], "https://emap.test/v3/carbon-intensity/latest?lat=37.3719&lon=-79.8164");
    assert_eq!(urls[1], "https://emap.test/v3/carbon-intensity/forecast?zone=US-MIDA-PJM");
    assert_eq!(
        http.requests()[0].headers.get("auth-token").map(String::as_str),
        Some("em-token")
    );
}

// =============================================================================
// Shared contract
// =============================================================================

#[rstest]
#[case::watttime(ProviderId::WattTime)]
#[case::electricity_map(ProviderId::ElectricityMap)]
#[tokio::test]
async fn uncovered_coordinates_are_region_errors(#[case] provider: ProviderId) {
    let http = Arc::new(ScriptedHttpClient::replying(404, r#"{"error": "not found"}"#));
    let client = client_for(provider, http);

    let error = client
        .get_region_for_coordinates(0.0, 0.0)
        .await
        .expect_err("404 means no coverage");

    assert_eq!(error.kind(), SourceErrorKind::Region);
}

#[rstest]
#[case::watttime(ProviderId::WattTime)]
#[case::electricity_map(ProviderId::ElectricityMap)]
#[tokio::test]
async fn null_forecast_is_provider_data_error(#[case] provider: ProviderId) {
    let http = Arc::new(ScriptedHttpClient::replying(200, "null"));
    let client = client_for(provider, http);

    let error = client
        .get_current_forecast(&region("BA"))
        .await
        .expect_err("null forecast");

    assert_eq!(error.kind(), SourceErrorKind::ProviderData);
}

#[rstest]
#[case::watttime(ProviderId::WattTime)]
#[case::electricity_map(ProviderId::ElectricityMap)]
#[tokio::test]
async fn server_failures_surface_status_and_are_retryable(#[case] provider: ProviderId) {
    let http = Arc::new(ScriptedHttpClient::replying(503, "maintenance"));
    let client = client_for(provider, http.clone());

    let error = client
        .get_data_points(
            &region("BA"),
            datetime!(2022-04-18 12:30 UTC),
            datetime!(2022-04-18 12:40 UTC),
        )
        .await
        .expect_err("503 must fail");

    assert_eq!(error.kind(), SourceErrorKind::Transport);
    assert_eq!(error.status(), Some(503));
    assert!(error.retryable());
    assert_eq!(http.requests().len(), 1, "5xx is not re-issued");
}

#[rstest]
#[case::watttime(ProviderId::WattTime)]
#[case::electricity_map(ProviderId::ElectricityMap)]
#[tokio::test]
async fn persistent_auth_failure_is_not_retried_twice(#[case] provider: ProviderId) {
    let http = Arc::new(ScriptedHttpClient::new(vec![
        Ok(HttpResponse::new(403, "forbidden")),
        Ok(HttpResponse::new(403, "still forbidden")),
        Ok(HttpResponse::ok_json("[]")),
    ]));
    let client = client_for(provider, http.clone());

    let error = client
        .get_region_for_coordinates(37.3719, -79.8164)
        .await
        .expect_err("second 403 is final");

    assert_eq!(error.kind(), SourceErrorKind::Transport);
    assert_eq!(error.status(), Some(403));
    assert!(!error.retryable());
    assert_eq!(http.requests().len(), 2);
}

#[rstest]
#[case::watttime(ProviderId::WattTime)]
#[case::electricity_map(ProviderId::ElectricityMap)]
#[tokio::test]
async fn network_failures_are_retryable_transport_errors(#[case] provider: ProviderId) {
    let http = Arc::new(ScriptedHttpClient::new(vec![Err(HttpError::new(
        "connection reset",
    ))]));
    let client = client_for(provider, http);

    let error = client
        .get_current_forecast(&region("BA"))
        .await
        .expect_err("network failure");

    assert_eq!(error.kind(), SourceErrorKind::Transport);
    assert_eq!(error.status(), None);
    assert!(error.retryable());
}
