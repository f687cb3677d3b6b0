use thiserror::Error;

/// Validation and contract errors exposed by `gridcarbon-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("region identifier cannot be empty")]
    EmptyRegion,

    #[error("latitude {value} must be a finite value within [-90, 90]")]
    InvalidLatitude { value: f64 },
    #[error("longitude {value} must be a finite value within [-180, 180]")]
    InvalidLongitude { value: f64 },
    #[error("location '{name}' has no resolved coordinates")]
    MissingCoordinates { name: String },

    #[error("invalid provider '{value}', expected one of watttime, electricitymap")]
    InvalidProvider { value: String },

    #[error("setting '{name}' has an invalid value: '{value}'")]
    InvalidSetting { name: &'static str, value: String },
    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },

    #[error("time window start {start} is after end {end}")]
    InvalidTimeWindow { start: String, end: String },
}
