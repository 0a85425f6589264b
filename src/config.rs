//! Solver tuning knobs, loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GROUND_FLOOR_M, DEFAULT_MAX_STEPS, DEFAULT_TIME_STEP_S, ROOT_FINDING_TOLERANCE,
    SPEED_OF_SOUND_MPS, STANDARD_AIR_DENSITY,
};
use crate::error::{BallisticsError, Validator};

/// Fixed-step integration scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integrator {
    /// Semi-implicit Euler: velocity first, then position with the new velocity
    Euler,
    /// Explicit midpoint (RK2)
    Midpoint,
    Rk4,
}

impl Integrator {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "euler" => Some(Integrator::Euler),
            "midpoint" | "rk2" => Some(Integrator::Midpoint),
            "rk4" => Some(Integrator::Rk4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub time_step_s: f64,
    /// Mach reference; fixed rather than temperature-corrected
    pub speed_of_sound_mps: f64,
    /// Density the drag tables are normalized to
    pub reference_density: f64,
    /// Integration stops when the bullet falls this far below the line of sight
    pub ground_floor_m: f64,
    pub max_steps: usize,
    pub integrator: Integrator,
    /// Acceptable height error at the zero distance (m)
    pub zero_tolerance_m: f64,
    pub zero_max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_step_s: DEFAULT_TIME_STEP_S,
            speed_of_sound_mps: SPEED_OF_SOUND_MPS,
            reference_density: STANDARD_AIR_DENSITY,
            ground_floor_m: DEFAULT_GROUND_FLOOR_M,
            max_steps: DEFAULT_MAX_STEPS,
            integrator: Integrator::Rk4,
            zero_tolerance_m: ROOT_FINDING_TOLERANCE,
            zero_max_iterations: 100,
        }
    }
}

impl SolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BallisticsError> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BallisticsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        let mut v = Validator::new();
        v.positive("time_step_s", self.time_step_s);
        v.positive("speed_of_sound_mps", self.speed_of_sound_mps);
        v.positive("reference_density", self.reference_density);
        if v.finite("ground_floor_m", self.ground_floor_m) && self.ground_floor_m >= 0.0 {
            v.push("ground_floor_m", "must be below the line of sight (negative)");
        }
        if self.max_steps == 0 {
            v.push("max_steps", "must be greater than zero");
        }
        v.positive("zero_tolerance_m", self.zero_tolerance_m);
        if self.zero_max_iterations == 0 {
            v.push("zero_max_iterations", "must be greater than zero");
        }
        v.finish()
    }
}
