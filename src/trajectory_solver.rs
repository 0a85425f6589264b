use std::f64::consts::PI;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::config::{Integrator, SolverConfig};
use crate::constants::{
    BC_LB_IN2_TO_KG_M2, G_ACCEL_MPS2, MIN_DIVISION_THRESHOLD, MIN_VELOCITY_THRESHOLD,
    STANDARD_AIR_DENSITY,
};
use crate::drag::{drag_table, DragTable};
use crate::DragModel;

/// Folds the G-function reference area and the lb/in² → kg/m² BC conversion
/// into the `(ρ/ρ_ref)·v²·Cd/(2·BC)` retardation form.
const DRAG_SCALE: f64 = STANDARD_AIR_DENSITY * PI / (4.0 * BC_LB_IN2_TO_KG_M2);

/// Why the integration loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    ReachedRange,
    /// Fell below the sanity floor before reaching the range
    BelowFloor,
    /// Step bound exhausted before reaching the range
    StepLimit,
    /// State stopped being finite
    NonFinite,
    /// No bore elevation zeroes the rifle at the zero distance; nothing was flown
    ZeroNotFound,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::ReachedRange => "reached range",
            StopReason::BelowFloor => "fell below floor",
            StopReason::StepLimit => "step limit",
            StopReason::NonFinite => "non-finite state",
            StopReason::ZeroNotFound => "zero not found",
        };
        f.write_str(text)
    }
}

/// Point-mass state in the vertical firing plane. `x` downrange, `y` up,
/// measured from the line of sight at the muzzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightState {
    pub time: f64,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
}

impl FlightState {
    pub fn launch(muzzle_velocity_ms: f64, bore_angle_rad: f64, height_over_bore_m: f64) -> Self {
        Self {
            time: 0.0,
            position: Vector2::new(0.0, -height_over_bore_m),
            velocity: Vector2::new(
                muzzle_velocity_ms * bore_angle_rad.cos(),
                muzzle_velocity_ms * bore_angle_rad.sin(),
            ),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite())
    }

    fn lerp(&self, other: &FlightState, alpha: f64) -> FlightState {
        FlightState {
            time: self.time + alpha * (other.time - self.time),
            position: self.position.lerp(&other.position, alpha),
            velocity: self.velocity.lerp(&other.velocity, alpha),
        }
    }
}

/// Where a flight ended and what it passed through on the way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightOutcome {
    /// Final state; interpolated onto `x = range` when the range was reached
    pub state: FlightState,
    pub max_ordinate_m: f64,
    pub stop: StopReason,
    pub steps: usize,
}

impl FlightOutcome {
    pub fn reached(&self) -> bool {
        self.stop == StopReason::ReachedRange
    }
}

/// Fixed-step point-mass integrator against a G1/G7 reference table.
#[derive(Debug, Clone)]
pub struct TrajectorySolver<'a> {
    drag_model: DragModel,
    table: &'static DragTable,
    ballistic_coefficient: f64,
    density_ratio: f64,
    config: &'a SolverConfig,
}

impl<'a> TrajectorySolver<'a> {
    /// Returns `None` for `DragModel::None`, which has no table to integrate
    /// against and goes through the closed-form solver instead.
    pub fn new(
        drag_model: DragModel,
        ballistic_coefficient: f64,
        air_density: f64,
        config: &'a SolverConfig,
    ) -> Option<Self> {
        let table = drag_table(drag_model)?;
        Some(Self {
            drag_model,
            table,
            ballistic_coefficient,
            density_ratio: air_density / config.reference_density,
            config,
        })
    }

    pub fn drag_model(&self) -> DragModel {
        self.drag_model
    }

    pub fn mach(&self, speed_mps: f64) -> f64 {
        speed_mps / self.config.speed_of_sound_mps
    }

    /// Drag deceleration magnitude (m/s²) at a given airspeed.
    pub fn drag_deceleration(&self, speed_mps: f64) -> f64 {
        let cd = self.table.interpolate(self.mach(speed_mps));
        self.density_ratio * speed_mps * speed_mps * cd / (2.0 * self.ballistic_coefficient) * DRAG_SCALE
    }

    fn acceleration(&self, velocity: &Vector2<f64>) -> Vector2<f64> {
        let speed = velocity.norm();
        if !speed.is_finite() {
            // Overflowed state; let the caller's finiteness check stop the flight
            return Vector2::new(f64::NAN, f64::NAN);
        }
        if speed < MIN_VELOCITY_THRESHOLD {
            return Vector2::new(0.0, -G_ACCEL_MPS2);
        }

        let a_drag = self.drag_deceleration(speed);
        Vector2::new(
            -a_drag * velocity.x / speed,
            -(G_ACCEL_MPS2 + a_drag * velocity.y / speed),
        )
    }

    fn step(&self, s: &FlightState, dt: f64) -> FlightState {
        let (position, velocity) = match self.config.integrator {
            Integrator::Euler => {
                let velocity = s.velocity + self.acceleration(&s.velocity) * dt;
                (s.position + velocity * dt, velocity)
            }
            Integrator::Midpoint => {
                let vel_mid = s.velocity + self.acceleration(&s.velocity) * (dt * 0.5);
                (
                    s.position + vel_mid * dt,
                    s.velocity + self.acceleration(&vel_mid) * dt,
                )
            }
            Integrator::Rk4 => {
                // Acceleration depends on velocity only
                let acc1 = self.acceleration(&s.velocity);
                let vel2 = s.velocity + acc1 * (dt * 0.5);
                let acc2 = self.acceleration(&vel2);
                let vel3 = s.velocity + acc2 * (dt * 0.5);
                let acc3 = self.acceleration(&vel3);
                let vel4 = s.velocity + acc3 * dt;
                let acc4 = self.acceleration(&vel4);

                (
                    s.position + (s.velocity + vel2 * 2.0 + vel3 * 2.0 + vel4) * (dt / 6.0),
                    s.velocity + (acc1 + acc2 * 2.0 + acc3 * 2.0 + acc4) * (dt / 6.0),
                )
            }
        };

        FlightState {
            time: s.time + dt,
            position,
            velocity,
        }
    }

    /// Integrate from the muzzle until `x >= range_m`, the bullet drops below
    /// `floor_m`, or the configured step bound runs out.
    pub fn fly(&self, launch: FlightState, range_m: f64, floor_m: f64) -> FlightOutcome {
        let dt = self.config.time_step_s;
        let mut state = launch;
        let mut max_ordinate_m = state.position.y;

        for steps in 1..=self.config.max_steps {
            let next = self.step(&state, dt);

            if !next.is_finite() {
                return FlightOutcome { state, max_ordinate_m, stop: StopReason::NonFinite, steps };
            }

            if next.position.x >= range_m {
                let dx = next.position.x - state.position.x;
                let alpha = if dx > MIN_DIVISION_THRESHOLD {
                    ((range_m - state.position.x) / dx).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let hit = state.lerp(&next, alpha);
                return FlightOutcome {
                    max_ordinate_m: max_ordinate_m.max(hit.position.y),
                    state: hit,
                    stop: StopReason::ReachedRange,
                    steps,
                };
            }

            max_ordinate_m = max_ordinate_m.max(next.position.y);
            if next.position.y < floor_m {
                return FlightOutcome { state: next, max_ordinate_m, stop: StopReason::BelowFloor, steps };
            }

            state = next;
        }

        FlightOutcome {
            state,
            max_ordinate_m,
            stop: StopReason::StepLimit,
            steps: self.config.max_steps,
        }
    }

    /// Height relative to the line of sight at `range_m`, ignoring the floor.
    /// `None` when the range cannot be reached within the step bound.
    pub fn height_at(&self, launch: FlightState, range_m: f64) -> Option<f64> {
        let outcome = self.fly(launch, range_m, f64::NEG_INFINITY);
        outcome.reached().then_some(outcome.state.position.y)
    }
}
