//! Wind effects layered on top of the still-air trajectory.
//!
//! Both models here are deliberately simple approximations, not a full
//! 6-DOF wind treatment. Direction convention everywhere: 0° = headwind
//! (wind from 12 o'clock), 90° = wind from the left pushing the bullet right,
//! 180° = tailwind.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CROSSWIND_DRIFT_SCALE, EARTH_ROTATION_RAD_S, HEADWIND_VELOCITY_DERATE, MIN_VELOCITY_THRESHOLD,
};

/// Wind conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_ms: f64,
    pub direction_deg: f64,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            speed_ms: 0.0,
            direction_deg: 0.0,
        }
    }
}

impl Wind {
    pub fn new(speed_ms: f64, direction_deg: f64) -> Self {
        Self { speed_ms, direction_deg }
    }

    /// Crosswind component (m/s), positive pushes right
    pub fn crosswind(&self) -> f64 {
        self.speed_ms * self.direction_deg.to_radians().sin()
    }

    /// Headwind component (m/s), negative for a tailwind
    pub fn headwind(&self) -> f64 {
        self.speed_ms * self.direction_deg.to_radians().cos()
    }
}

/// Lateral drift (m) from a crosswind.
///
/// `speed·sin(dir)·tof² / (2·avg_velocity) · 100`. The ×100 scale is
/// empirical and kept for numerical compatibility with stored results.
pub fn crosswind_drift(
    wind_speed_ms: f64,
    wind_direction_deg: f64,
    time_of_flight_s: f64,
    avg_velocity_ms: f64,
) -> f64 {
    if avg_velocity_ms.abs() < MIN_VELOCITY_THRESHOLD {
        return 0.0;
    }
    let crosswind = Wind::new(wind_speed_ms, wind_direction_deg).crosswind();
    crosswind * time_of_flight_s * time_of_flight_s / (2.0 * avg_velocity_ms) * CROSSWIND_DRIFT_SCALE
}

/// Muzzle velocity multiplier for a head/tailwind: `1 - headwind·0.001`.
pub fn velocity_effect(wind_speed_ms: f64, wind_direction_deg: f64) -> f64 {
    1.0 - Wind::new(wind_speed_ms, wind_direction_deg).headwind() * HEADWIND_VELOCITY_DERATE
}

/// Approximate horizontal Coriolis deflection (m), eastward positive.
///
/// `ω · tof · range · cos(latitude)`; informational only, the solver never
/// adds it to the wind drift.
pub fn coriolis_drift(range_m: f64, time_of_flight_s: f64, latitude_deg: f64) -> f64 {
    EARTH_ROTATION_RAD_S * time_of_flight_s * range_m * latitude_deg.to_radians().cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_full_crosswind_is_maximal() {
        let full = crosswind_drift(5.0, 90.0, 0.4, 750.0);
        for dir in (0..360).step_by(5) {
            let d = crosswind_drift(5.0, dir as f64, 0.4, 750.0);
            assert!(d.abs() <= full.abs() + 1e-12, "{dir}° exceeded full value");
        }
        assert!(full > 0.0);
    }

    #[test]
    fn test_head_and_tail_wind_no_drift() {
        assert!(crosswind_drift(10.0, 0.0, 0.5, 700.0).abs() < 1e-12);
        assert!(crosswind_drift(10.0, 180.0, 0.5, 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_left_crosswind_drifts_left() {
        let right = crosswind_drift(4.0, 90.0, 0.6, 600.0);
        let left = crosswind_drift(4.0, 270.0, 0.6, 600.0);
        assert_relative_eq!(left, -right, epsilon = 1e-12);
    }

    #[test]
    fn test_crosswind_drift_formula() {
        // 5 m/s · 0.16 s² / 1500 m/s · 100
        assert_relative_eq!(crosswind_drift(5.0, 90.0, 0.4, 750.0), 0.053_333_333, epsilon = 1e-8);
    }

    #[test]
    fn test_crosswind_drift_zero_velocity() {
        assert_eq!(crosswind_drift(5.0, 90.0, 0.4, 0.0), 0.0);
    }

    #[test]
    fn test_velocity_effect() {
        assert_relative_eq!(velocity_effect(10.0, 0.0), 0.99, epsilon = 1e-12);
        assert_relative_eq!(velocity_effect(10.0, 180.0), 1.01, epsilon = 1e-12);
        assert_relative_eq!(velocity_effect(10.0, 90.0), 1.0, epsilon = 1e-12);
        assert_eq!(velocity_effect(0.0, 45.0), 1.0);
    }

    #[test]
    fn test_wind_components() {
        let w = Wind::new(10.0, 30.0);
        assert_relative_eq!(w.crosswind(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(w.headwind(), 8.660_254_037_844_386, epsilon = 1e-12);
    }

    #[test]
    fn test_coriolis_drift() {
        assert_relative_eq!(
            coriolis_drift(1000.0, 1.5, 0.0),
            EARTH_ROTATION_RAD_S * 1500.0,
            epsilon = 1e-15
        );
        assert!(coriolis_drift(1000.0, 1.5, 90.0).abs() < 1e-15);
    }
}
