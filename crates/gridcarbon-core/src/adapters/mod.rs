//! Provider adapters.
//!
//! Each provider module owns its wire contract: endpoint paths, query keys and
//! the serde shapes of its JSON. Wire records are wrapped in [`ProviderRecord`]
//! and normalized through [`ProviderRecord::into_data_point`]; nothing above
//! this module sees provider field names.

pub mod electricity_map;
pub mod watttime;

pub use electricity_map::{ElectricityMapClient, ElectricityMapRecord};
pub use watttime::{WattTimeClient, WattTimeDataPoint};

use serde::de::DeserializeOwned;

use crate::http_client::HttpError;
use crate::provider::SourceError;
use crate::{EmissionsUnit, GridEmissionDataPoint, ProviderId, RegionId};

/// Provider-native emissions record.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRecord {
    WattTime(WattTimeDataPoint),
    ElectricityMap(ElectricityMapRecord),
}

impl ProviderRecord {
    pub const fn provider(&self) -> ProviderId {
        match self {
            Self::WattTime(_) => ProviderId::WattTime,
            Self::ElectricityMap(_) => ProviderId::ElectricityMap,
        }
    }

    /// Normalizes the record. `requested` stands in for the region when the
    /// record does not name one itself.
    pub fn into_data_point(self, requested: &RegionId) -> Result<GridEmissionDataPoint, SourceError> {
        match self {
            Self::WattTime(record) => Ok(GridEmissionDataPoint::new(
                region_or(&record.balancing_authority, requested)?,
                record.point_time,
                record.value,
                EmissionsUnit::PoundsPerMegawattHour,
            )),
            Self::ElectricityMap(record) => Ok(GridEmissionDataPoint::new(
                region_or(record.zone.as_deref().unwrap_or(""), requested)?,
                record.datetime,
                record.carbon_intensity,
                EmissionsUnit::GramsPerKilowattHour,
            )),
        }
    }
}

fn region_or(reported: &str, requested: &RegionId) -> Result<RegionId, SourceError> {
    if reported.trim().is_empty() {
        return Ok(requested.clone());
    }
    RegionId::parse(reported).map_err(|e| SourceError::provider_data(e.to_string()))
}

fn normalize_records<I>(records: I, requested: &RegionId) -> Result<Vec<GridEmissionDataPoint>, SourceError>
where
    I: IntoIterator<Item = ProviderRecord>,
{
    records
        .into_iter()
        .map(|record| record.into_data_point(requested))
        .collect()
}

fn parse_json<T>(provider: ProviderId, what: &str, body: &str) -> Result<T, SourceError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        SourceError::provider_data(format!("failed to parse {provider} {what} response: {e}"))
    })
}

fn transport_error(provider: ProviderId) -> impl Fn(HttpError) -> SourceError {
    move |error| SourceError::transport(provider, &error)
}
