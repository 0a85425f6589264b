//! Atmospheric calculations for ballistics.
//!
//! Air density comes from the Magnus-Tetens saturation vapor pressure and a
//! two-component (dry air + water vapor) ideal gas mix. The ICAO troposphere
//! model fills in temperature and pressure when the caller only knows the
//! altitude.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CELSIUS_TO_KELVIN, G_ACCEL_MPS2, MAGNUS_A, MAGNUS_B_C, MAGNUS_E0_HPA, R_DRY_AIR,
    R_WATER_VAPOR,
};
use crate::error::{BallisticsError, Validator};

/// ICAO sea-level temperature (K)
const ICAO_SEA_LEVEL_TEMP_K: f64 = 288.15;
/// ICAO sea-level pressure (hPa)
const ICAO_SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;
/// Troposphere temperature lapse rate (K/m)
const ICAO_LAPSE_RATE: f64 = -0.0065;
/// Top of the troposphere (m)
const ICAO_TROPOPAUSE_M: f64 = 11_000.0;

/// Sane bounds accepted by validation
const MIN_TEMPERATURE_C: f64 = -80.0;
const MAX_TEMPERATURE_C: f64 = 70.0;
const MAX_PRESSURE_HPA: f64 = 1200.0;

/// Atmospheric snapshot for a single calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    /// Relative humidity, 0-100. Out-of-range values are clamped, not rejected.
    pub humidity_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::standard()
    }
}

impl Environment {
    pub fn new(temperature_c: f64, pressure_hpa: f64, humidity_pct: f64) -> Self {
        Self {
            temperature_c,
            pressure_hpa,
            humidity_pct,
            altitude_m: None,
        }
    }

    /// ICAO sea level, dry air.
    pub fn standard() -> Self {
        Self::new(
            ICAO_SEA_LEVEL_TEMP_K - CELSIUS_TO_KELVIN,
            ICAO_SEA_LEVEL_PRESSURE_HPA,
            0.0,
        )
    }

    /// ICAO standard temperature and pressure at an altitude.
    ///
    /// Uses the troposphere lapse-rate model; altitudes above the tropopause
    /// are clamped to it, below sea level to zero.
    pub fn icao_at_altitude(altitude_m: f64, humidity_pct: f64) -> Self {
        let altitude = altitude_m.clamp(0.0, ICAO_TROPOPAUSE_M);
        let temp_k = ICAO_SEA_LEVEL_TEMP_K + ICAO_LAPSE_RATE * altitude;
        let exponent = -G_ACCEL_MPS2 / (ICAO_LAPSE_RATE * R_DRY_AIR);
        let pressure_hpa = ICAO_SEA_LEVEL_PRESSURE_HPA * (temp_k / ICAO_SEA_LEVEL_TEMP_K).powf(exponent);

        Self {
            temperature_c: temp_k - CELSIUS_TO_KELVIN,
            pressure_hpa,
            humidity_pct,
            altitude_m: Some(altitude_m),
        }
    }

    /// Humidity clamped to [0, 100].
    pub fn clamped_humidity(&self) -> f64 {
        self.humidity_pct.clamp(0.0, 100.0)
    }

    pub fn air_density(&self) -> f64 {
        compute_air_density(self)
    }

    pub(crate) fn check(&self, v: &mut Validator) {
        v.within("temperature_c", self.temperature_c, MIN_TEMPERATURE_C, MAX_TEMPERATURE_C);
        v.positive("pressure_hpa", self.pressure_hpa);
        if self.pressure_hpa.is_finite() && self.pressure_hpa > MAX_PRESSURE_HPA {
            v.push("pressure_hpa", format!("must not exceed {MAX_PRESSURE_HPA}"));
        }
        v.finite("humidity_pct", self.humidity_pct);
        if let Some(alt) = self.altitude_m {
            v.finite("altitude_m", alt);
        }
    }

    /// Reject physically meaningless snapshots. Humidity is never rejected
    /// for being out of range.
    pub fn validate(&self) -> Result<(), BallisticsError> {
        let mut v = Validator::new();
        self.check(&mut v);
        v.finish()
    }
}

/// Saturation vapor pressure over water (hPa), Magnus-Tetens.
pub fn saturation_vapor_pressure_hpa(temp_c: f64) -> f64 {
    MAGNUS_E0_HPA * (MAGNUS_A * temp_c / (MAGNUS_B_C + temp_c)).exp()
}

/// Air density (kg/m³) of moist air.
///
/// Dry-air partial pressure is floored at zero so a saturated hot sample
/// at low pressure can never produce a negative density.
pub fn compute_air_density(env: &Environment) -> f64 {
    let temp_k = env.temperature_c + CELSIUS_TO_KELVIN;
    let humidity = env.clamped_humidity();

    let es_hpa = saturation_vapor_pressure_hpa(env.temperature_c);
    let vapor_pa = humidity / 100.0 * es_hpa * 100.0;
    let dry_pa = (env.pressure_hpa * 100.0 - vapor_pa).max(0.0);

    dry_pa / (R_DRY_AIR * temp_k) + vapor_pa / (R_WATER_VAPOR * temp_k)
}
