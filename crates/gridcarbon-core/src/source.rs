use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Emissions-data provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    WattTime,
    ElectricityMap,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::WattTime, Self::ElectricityMap];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WattTime => "watttime",
            Self::ElectricityMap => "electricitymap",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "watttime" => Ok(Self::WattTime),
            "electricitymap" | "electricity_map" => Ok(Self::ElectricityMap),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
