use serde::{Deserialize, Serialize};

/// Pounds per gram.
pub const GRAMS_TO_POUNDS: f64 = 0.00220462262185;
/// Grams per pound.
pub const LBS_TO_GRAMS: f64 = 1.0 / GRAMS_TO_POUNDS;
/// Kilowatt-hours per megawatt-hour.
pub const MWH_TO_KWH: f64 = 1000.0;

/// Unit a provider reports emissions intensity in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionsUnit {
    /// lbs CO2 / MWh, the WattTime MOER unit.
    PoundsPerMegawattHour,
    /// g CO2e / kWh, the canonical unit.
    GramsPerKilowattHour,
}

impl EmissionsUnit {
    pub fn to_grams_per_kwh(self, value: f64) -> f64 {
        match self {
            Self::PoundsPerMegawattHour => convert_moer_to_grams_per_kwh(value),
            Self::GramsPerKilowattHour => value,
        }
    }
}

/// Converts a marginal operating emissions rate in lbs/MWh to g/kWh.
///
/// Negative input is not special-cased.
pub fn convert_moer_to_grams_per_kwh(lbs_per_mwh: f64) -> f64 {
    lbs_per_mwh * LBS_TO_GRAMS / MWH_TO_KWH
}
