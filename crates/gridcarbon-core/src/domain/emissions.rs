use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{EmissionsUnit, Location, RegionId};

/// One provider-reported sample, still in the provider's native unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEmissionDataPoint {
    pub region: RegionId,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub value: f64,
    pub unit: EmissionsUnit,
}

impl GridEmissionDataPoint {
    pub fn new(region: RegionId, time: OffsetDateTime, value: f64, unit: EmissionsUnit) -> Self {
        Self {
            region,
            time,
            value,
            unit,
        }
    }

    pub fn grams_per_kwh(&self) -> f64 {
        self.unit.to_grams_per_kwh(self.value)
    }
}

/// Provider forecast as returned on the wire, normalized to data points.
///
/// Points are kept in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub data: Vec<GridEmissionDataPoint>,
}

/// Caller-facing emissions record in g/kWh.
///
/// `location` holds the resolved region token, not the caller's location.
/// `duration` is only set on forecast records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsData {
    pub location: String,
    pub rating: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

/// Caller-facing forecast with converted, duration-annotated records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsForecast {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub location: Location,
    pub forecast_data: Vec<EmissionsData>,
}
