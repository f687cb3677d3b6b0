//! # Domain Models
//!
//! Canonical domain types for grid carbon-intensity data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Location`] | Caller-supplied place, optionally with coordinates |
//! | [`Coordinates`] | Range-checked latitude/longitude |
//! | [`RegionId`] | Provider region token (balancing authority, zone) |
//! | [`GridEmissionDataPoint`] | Provider sample in its native unit |
//! | [`Forecast`] | Provider forecast (generated-at + samples) |
//! | [`EmissionsData`] | Caller-facing record in g/kWh |
//! | [`EmissionsForecast`] | Caller-facing forecast |
//!
//! All caller-facing ratings are grams CO2e per kilowatt-hour; see
//! [`convert_moer_to_grams_per_kwh`].

mod emissions;
mod location;
mod region;
mod units;

pub use emissions::{EmissionsData, EmissionsForecast, Forecast, GridEmissionDataPoint};
pub use location::{CloudProvider, Coordinates, Location, LocationKind};
pub use region::RegionId;
pub use units::{
    convert_moer_to_grams_per_kwh, EmissionsUnit, GRAMS_TO_POUNDS, LBS_TO_GRAMS, MWH_TO_KWH,
};
