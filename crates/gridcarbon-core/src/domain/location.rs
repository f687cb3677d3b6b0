use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Cloud vendor whose region names a [`Location`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Azure,
    Aws,
    Gcp,
}

impl CloudProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Azure => "azure",
            Self::Aws => "aws",
            Self::Gcp => "gcp",
        }
    }
}

/// How a [`Location`] identifies a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "cloud_provider")]
pub enum LocationKind {
    /// A named cloud region such as `eastus` or `westeurope`.
    CloudProvider(CloudProvider),
    /// A raw latitude/longitude pair.
    Geoposition,
}

/// A place of interest as supplied by the caller.
///
/// Coordinates are optional until a [`LocationResolver`](crate::LocationResolver)
/// fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub kind: LocationKind,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn cloud_region(provider: CloudProvider, region_name: impl Into<String>) -> Self {
        Self {
            name: region_name.into(),
            kind: LocationKind::CloudProvider(provider),
            latitude: None,
            longitude: None,
        }
    }

    pub fn geoposition(latitude: f64, longitude: f64) -> Self {
        Self {
            name: format!("{latitude:.4}, {longitude:.4}"),
            kind: LocationKind::Geoposition,
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Returns a copy of this location with the given coordinates attached.
    pub fn with_coordinates(&self, coordinates: Coordinates) -> Self {
        Self {
            latitude: Some(coordinates.latitude()),
            longitude: Some(coordinates.longitude()),
            ..self.clone()
        }
    }

    /// Validated coordinates, failing when the location has not been resolved.
    pub fn coordinates(&self) -> Result<Coordinates, ValidationError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude),
            _ => Err(ValidationError::MissingCoordinates {
                name: self.name.clone(),
            }),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            LocationKind::CloudProvider(provider) => {
                write!(f, "{}:{}", provider.as_str(), self.name)
            }
            LocationKind::Geoposition => f.write_str(&self.name),
        }
    }
}

/// WGS84 coordinate pair with range-checked components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::InvalidLatitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::InvalidLongitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}
