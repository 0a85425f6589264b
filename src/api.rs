//! Request/result types and the solve entry points.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::angle_calculations::{solve_zero, ZeroFailure};
use crate::atmosphere::{compute_air_density, Environment};
use crate::config::SolverConfig;
use crate::constants::{GRAMS_TO_GRAINS, MM_TO_INCHES};
use crate::error::{BallisticsError, Validator};
use crate::no_drag;
use crate::trajectory_solver::{FlightOutcome, FlightState, StopReason, TrajectorySolver};
use crate::units::{hold_mil, mil_to_moa, Hold};
use crate::wind::{crosswind_drift, velocity_effect, Wind};
use crate::DragModel;

const GRAINS_PER_POUND: f64 = 7000.0;
/// Launch elevation accepted on top of the zero (degrees)
const MAX_LAUNCH_ANGLE_DEG: f64 = 89.0;

/// Projectile and load data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub muzzle_velocity_ms: f64,
    pub drag_model: DragModel,
    /// G1/G7 ballistic coefficient (lb/in²); ignored for `DragModel::None`
    pub ballistic_coefficient: f64,
    pub bullet_mass_grams: f64,
    pub bullet_diameter_mm: f64,
}

impl ProjectileSpec {
    pub fn new(
        muzzle_velocity_ms: f64,
        drag_model: DragModel,
        ballistic_coefficient: f64,
        bullet_mass_grams: f64,
        bullet_diameter_mm: f64,
    ) -> Self {
        Self {
            muzzle_velocity_ms,
            drag_model,
            ballistic_coefficient,
            bullet_mass_grams,
            bullet_diameter_mm,
        }
    }

    pub fn mass_kg(&self) -> f64 {
        self.bullet_mass_grams / 1000.0
    }

    /// Sectional density (lb/in²)
    pub fn sectional_density(&self) -> f64 {
        let pounds = self.bullet_mass_grams * GRAMS_TO_GRAINS / GRAINS_PER_POUND;
        let diameter_in = self.bullet_diameter_mm * MM_TO_INCHES;
        pounds / (diameter_in * diameter_in)
    }

    /// Form factor relative to the reference projectile, `SD / BC`.
    pub fn form_factor(&self) -> Option<f64> {
        (self.drag_model.has_drag() && self.ballistic_coefficient > 0.0)
            .then(|| self.sectional_density() / self.ballistic_coefficient)
    }

    pub fn kinetic_energy_j(&self, speed_ms: f64) -> f64 {
        0.5 * self.mass_kg() * speed_ms * speed_ms
    }

    fn check(&self, v: &mut Validator) {
        v.positive("muzzle_velocity_ms", self.muzzle_velocity_ms);
        if self.drag_model.has_drag() {
            v.positive("ballistic_coefficient", self.ballistic_coefficient);
        }
        v.positive("bullet_mass_grams", self.bullet_mass_grams);
        v.positive("bullet_diameter_mm", self.bullet_diameter_mm);
    }
}

/// A single firing request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiringSolution {
    pub projectile: ProjectileSpec,
    pub range_m: f64,
    /// Extra elevation on top of the zero (degrees)
    #[serde(default)]
    pub launch_angle_deg: f64,
    /// Sight axis above bore axis (m)
    #[serde(default)]
    pub height_over_bore_m: f64,
    /// Distance at which the sight line and trajectory cross; 0 disables zeroing
    #[serde(default)]
    pub zero_distance_m: f64,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub wind_speed_ms: f64,
    /// 0° headwind, 90° from the left (pushes right), 180° tailwind
    #[serde(default)]
    pub wind_direction_deg: f64,
}

impl FiringSolution {
    /// Flat-fired, unzeroed request in still standard air.
    pub fn new(projectile: ProjectileSpec, range_m: f64) -> Self {
        Self {
            projectile,
            range_m,
            launch_angle_deg: 0.0,
            height_over_bore_m: 0.0,
            zero_distance_m: 0.0,
            environment: Environment::standard(),
            wind_speed_ms: 0.0,
            wind_direction_deg: 0.0,
        }
    }

    pub fn wind(&self) -> Wind {
        Wind::new(self.wind_speed_ms, self.wind_direction_deg)
    }

    /// Every offending field is reported, not just the first.
    pub fn validate(&self) -> Result<(), BallisticsError> {
        let mut v = Validator::new();
        self.projectile.check(&mut v);
        v.positive("range_m", self.range_m);
        v.within("launch_angle_deg", self.launch_angle_deg, -MAX_LAUNCH_ANGLE_DEG, MAX_LAUNCH_ANGLE_DEG);
        v.finite("height_over_bore_m", self.height_over_bore_m);
        v.non_negative("zero_distance_m", self.zero_distance_m);
        v.non_negative("wind_speed_ms", self.wind_speed_ms);
        v.finite("wind_direction_deg", self.wind_direction_deg);
        self.environment.check(&mut v);
        v.finish()
    }
}

/// Whether a result can be shown as a firing solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionStatus {
    Valid,
    /// The range was not reached; numbers describe where the flight stopped
    NonConvergent(StopReason),
    /// A non-finite number came out of the solve; numeric fields are zeroed
    Invalid,
}

impl SolutionStatus {
    pub fn is_valid(self) -> bool {
        self == SolutionStatus::Valid
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionStatus::Valid => write!(f, "valid"),
            SolutionStatus::NonConvergent(reason) => write!(f, "non-convergent ({reason})"),
            SolutionStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// Solution at one range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryResult {
    pub range_m: f64,
    pub time_of_flight_s: f64,
    pub impact_velocity_ms: f64,
    /// Positive below the line of sight
    pub drop_m: f64,
    /// Positive right
    pub wind_drift_m: f64,
    /// Elevation hold, positive up
    pub hold_mil: f64,
    pub hold_moa: f64,
    /// Windage hold, positive right
    pub windage_mil: f64,
    pub windage_moa: f64,
    pub air_density_used: f64,
    pub model_used: DragModel,
    pub bore_angle_deg: f64,
    /// Highest point above the line of sight before the target
    pub max_ordinate_m: f64,
    pub mach_at_impact: f64,
    pub muzzle_energy_j: f64,
    pub impact_energy_j: f64,
    pub status: SolutionStatus,
}

impl TrajectoryResult {
    fn empty(range_m: f64, air_density: f64, model: DragModel, status: SolutionStatus) -> Self {
        Self {
            range_m,
            time_of_flight_s: 0.0,
            impact_velocity_ms: 0.0,
            drop_m: 0.0,
            wind_drift_m: 0.0,
            hold_mil: 0.0,
            hold_moa: 0.0,
            windage_mil: 0.0,
            windage_moa: 0.0,
            air_density_used: if air_density.is_finite() { air_density } else { 0.0 },
            model_used: model,
            bore_angle_deg: 0.0,
            max_ordinate_m: 0.0,
            mach_at_impact: 0.0,
            muzzle_energy_j: 0.0,
            impact_energy_j: 0.0,
            status,
        }
    }

    /// Holds as consumed by [`crate::units::suggest_scope_correction`].
    pub fn hold(&self) -> Hold {
        Hold {
            up_mil: self.hold_mil,
            right_mil: self.windage_mil,
        }
    }

    fn is_finite(&self) -> bool {
        [
            self.range_m,
            self.time_of_flight_s,
            self.impact_velocity_ms,
            self.drop_m,
            self.wind_drift_m,
            self.hold_mil,
            self.hold_moa,
            self.windage_mil,
            self.windage_moa,
            self.air_density_used,
            self.bore_angle_deg,
            self.max_ordinate_m,
            self.mach_at_impact,
            self.muzzle_energy_j,
            self.impact_energy_j,
        ]
        .iter()
        .all(|x| x.is_finite())
    }
}

/// Everything fixed for a request once the zero is known.
struct Shot<'a> {
    request: &'a FiringSolution,
    config: &'a SolverConfig,
    air_density: f64,
    bore_angle_rad: f64,
    muzzle_velocity_ms: f64,
}

impl<'a> Shot<'a> {
    fn prepare(
        request: &'a FiringSolution,
        config: &'a SolverConfig,
        air_density: f64,
    ) -> Result<Self, ZeroFailure> {
        let zero = if request.zero_distance_m > 0.0 {
            solve_zero(request, config, air_density)?
        } else {
            0.0
        };
        let wind = request.wind();

        Ok(Self {
            request,
            config,
            air_density,
            bore_angle_rad: zero + request.launch_angle_deg.to_radians(),
            muzzle_velocity_ms: request.projectile.muzzle_velocity_ms
                * velocity_effect(wind.speed_ms, wind.direction_deg),
        })
    }

    fn fly(&self, range_m: f64) -> FlightOutcome {
        let projectile = &self.request.projectile;
        let floor = self.config.ground_floor_m;
        match TrajectorySolver::new(
            projectile.drag_model,
            projectile.ballistic_coefficient,
            self.air_density,
            self.config,
        ) {
            Some(solver) => {
                let launch = FlightState::launch(
                    self.muzzle_velocity_ms,
                    self.bore_angle_rad,
                    self.request.height_over_bore_m,
                );
                solver.fly(launch, range_m, floor)
            }
            None => no_drag::fly(
                self.muzzle_velocity_ms,
                self.bore_angle_rad,
                self.request.height_over_bore_m,
                range_m,
                floor,
            ),
        }
    }

    fn fire(&self, range_m: f64) -> TrajectoryResult {
        let projectile = &self.request.projectile;
        let outcome = self.fly(range_m);

        let tof = outcome.state.time;
        let impact_velocity = outcome.state.speed();
        let drop = -outcome.state.position.y;
        let avg_velocity = if tof > 0.0 { outcome.state.position.x / tof } else { 0.0 };
        let drift = crosswind_drift(
            self.request.wind_speed_ms,
            self.request.wind_direction_deg,
            tof,
            avg_velocity,
        );

        let hold = hold_mil(drop, range_m);
        let windage = hold_mil(-drift, range_m);
        let status = match outcome.stop {
            StopReason::ReachedRange => SolutionStatus::Valid,
            StopReason::NonFinite => SolutionStatus::Invalid,
            reason => SolutionStatus::NonConvergent(reason),
        };

        let result = TrajectoryResult {
            range_m,
            time_of_flight_s: tof,
            impact_velocity_ms: impact_velocity,
            drop_m: drop,
            wind_drift_m: drift,
            hold_mil: hold,
            hold_moa: mil_to_moa(hold),
            windage_mil: windage,
            windage_moa: mil_to_moa(windage),
            air_density_used: self.air_density,
            model_used: projectile.drag_model,
            bore_angle_deg: self.bore_angle_rad.to_degrees(),
            max_ordinate_m: outcome.max_ordinate_m,
            mach_at_impact: impact_velocity / self.config.speed_of_sound_mps,
            muzzle_energy_j: projectile.kinetic_energy_j(self.muzzle_velocity_ms),
            impact_energy_j: projectile.kinetic_energy_j(impact_velocity),
            status,
        };

        if status == SolutionStatus::Invalid || !result.is_finite() {
            warn!("non-finite solution at {range_m} m; returning invalid result");
            return TrajectoryResult::empty(range_m, self.air_density, projectile.drag_model, SolutionStatus::Invalid);
        }
        if let SolutionStatus::NonConvergent(reason) = status {
            warn!(
                "{range_m} m not reached ({reason}) after {:.1} m and {} steps",
                outcome.state.position.x, outcome.steps
            );
        }
        result
    }
}

fn unsolved(request: &FiringSolution, range_m: f64, air_density: f64, failure: ZeroFailure) -> TrajectoryResult {
    warn!(
        "no zero at {} m for {} at {} m/s: {failure:?}",
        request.zero_distance_m, request.projectile.drag_model, request.projectile.muzzle_velocity_ms
    );
    TrajectoryResult::empty(
        range_m,
        air_density,
        request.projectile.drag_model,
        SolutionStatus::NonConvergent(StopReason::ZeroNotFound),
    )
}

fn validated_density(request: &FiringSolution, config: &SolverConfig) -> Result<f64, BallisticsError> {
    request.validate()?;
    config.validate()?;
    Ok(compute_air_density(&request.environment))
}

/// Solve a request with the default solver configuration.
pub fn solve_trajectory(request: &FiringSolution) -> Result<TrajectoryResult, BallisticsError> {
    solve_trajectory_with_config(request, &SolverConfig::default())
}

/// Solve a request.
///
/// Invalid input is an `Err`; a flight that never reaches the range is an
/// `Ok` result whose `status` says so.
pub fn solve_trajectory_with_config(
    request: &FiringSolution,
    config: &SolverConfig,
) -> Result<TrajectoryResult, BallisticsError> {
    let air_density = validated_density(request, config)?;
    debug!(
        "solving {} to {} m (ρ = {air_density:.4} kg/m³, {:?})",
        request.projectile.drag_model, request.range_m, config.integrator
    );

    Ok(match Shot::prepare(request, config, air_density) {
        Ok(shot) => shot.fire(request.range_m),
        Err(failure) => unsolved(request, request.range_m, air_density, failure),
    })
}

/// Bore elevation (degrees) that zeroes the request at `zero_distance_m`.
///
/// `Ok(None)` when the zero distance cannot be reached.
pub fn zero_angle(request: &FiringSolution, config: &SolverConfig) -> Result<Option<f64>, BallisticsError> {
    let air_density = validated_density(request, config)?;
    if request.zero_distance_m <= 0.0 {
        let mut v = Validator::new();
        v.positive("zero_distance_m", request.zero_distance_m);
        v.finish()?;
    }
    Ok(solve_zero(request, config, air_density).ok().map(f64::to_degrees))
}

/// DOPE card for a list of ranges with the default solver configuration.
pub fn dope_table(request: &FiringSolution, ranges_m: &[f64]) -> Result<Vec<TrajectoryResult>, BallisticsError> {
    dope_table_with_config(request, ranges_m, &SolverConfig::default())
}

/// Solve every range against a single zero, in parallel.
///
/// `request.range_m` is ignored. Rows come back sorted by range.
pub fn dope_table_with_config(
    request: &FiringSolution,
    ranges_m: &[f64],
    config: &SolverConfig,
) -> Result<Vec<TrajectoryResult>, BallisticsError> {
    let air_density = validated_density(request, config)?;

    let mut v = Validator::new();
    for (i, &range) in ranges_m.iter().enumerate() {
        v.positive(&format!("ranges_m[{i}]"), range);
    }
    v.finish()?;

    let mut rows: Vec<TrajectoryResult> = match Shot::prepare(request, config, air_density) {
        Ok(shot) => ranges_m.par_iter().map(|&range| shot.fire(range)).collect(),
        Err(failure) => ranges_m
            .iter()
            .map(|&range| unsolved(request, range, air_density, failure))
            .collect(),
    };
    rows.sort_by(|a, b| a.range_m.total_cmp(&b.range_m));

    debug!("dope table: {} rows", rows.len());
    Ok(rows)
}
