//! Physical constants used in ballistics calculations

/// Gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Reference air density used to scale drag (kg/m³), ICAO sea level
pub const STANDARD_AIR_DENSITY: f64 = 1.225;

/// Speed of sound used for Mach lookups.
///
/// Value: 343.0 m/s (20°C, dry air). Held constant rather than derived from
/// the environment temperature; `SolverConfig::speed_of_sound_mps` overrides it.
pub const SPEED_OF_SOUND_MPS: f64 = 343.0;

/// Specific gas constant for dry air (J/(kg·K))
pub const R_DRY_AIR: f64 = 287.058;

/// Specific gas constant for water vapor (J/(kg·K))
pub const R_WATER_VAPOR: f64 = 461.495;

/// Offset between Celsius and Kelvin
pub const CELSIUS_TO_KELVIN: f64 = 273.15;

/// Magnus-Tetens coefficients (saturation vapor pressure over water, hPa)
pub const MAGNUS_E0_HPA: f64 = 6.112;
pub const MAGNUS_A: f64 = 17.62;
pub const MAGNUS_B_C: f64 = 243.12;

/// Mil to MOA factor.
///
/// Fixed constant, not re-derived from 360·60/(2π·1000), so that stored DOPE
/// data round-trips exactly.
pub const MIL_TO_MOA: f64 = 3.43774677;

/// Offset-to-angle constants for scope corrections (cm at range → angle).
///
/// 1 mil subtends 10 cm at 100 m. The MOA figure 34.38 is the mil constant
/// scaled by 3.438 and must stay as-is for compatibility with existing data.
pub const CM_TO_MIL_AT_RANGE: f64 = 10.0;
pub const CM_TO_MOA_AT_RANGE: f64 = 34.38;

/// Empirical crosswind drift scale factor
pub const CROSSWIND_DRIFT_SCALE: f64 = 100.0;

/// Head/tailwind muzzle velocity derating per m/s of headwind
pub const HEADWIND_VELOCITY_DERATE: f64 = 0.001;

/// BC conversion: lb/in² → kg/m²
pub const BC_LB_IN2_TO_KG_M2: f64 = 703.069_58;

/// Conversion factor: grams to grains
pub const GRAMS_TO_GRAINS: f64 = 15.432_358_35;

/// Conversion factor: millimeters to inches
pub const MM_TO_INCHES: f64 = 1.0 / 25.4;

/// Earth rotation rate (rad/s)
pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115_9e-5;

// Numerical stability constants

/// Minimum threshold for velocity magnitude to avoid division by zero
pub const MIN_VELOCITY_THRESHOLD: f64 = 1e-6;

/// Minimum threshold for preventing division by zero in general calculations
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

/// Tolerance for the zero-angle root find (meters of height at the zero range)
pub const ROOT_FINDING_TOLERANCE: f64 = 1e-5;

// Solver defaults

/// Default integration time step (s)
pub const DEFAULT_TIME_STEP_S: f64 = 0.001;

/// Default sanity floor below the line of sight (m)
pub const DEFAULT_GROUND_FLOOR_M: f64 = -10.0;

/// Default integration step bound
pub const DEFAULT_MAX_STEPS: usize = 200_000;
