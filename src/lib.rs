//! # DOPE Ballistics
//!
//! Point-mass exterior ballistics: G1/G7 drag tables, moist-air density,
//! zeroing, wind drift and mil/MOA scope corrections.

// Re-export the main types and functions
pub use api::{
    dope_table, dope_table_with_config, solve_trajectory, solve_trajectory_with_config,
    zero_angle, FiringSolution, ProjectileSpec, SolutionStatus, TrajectoryResult,
};
pub use atmosphere::{compute_air_density, Environment};
pub use config::{Integrator, SolverConfig};
pub use drag::drag_coefficient;
pub use drag_model::DragModel;
pub use error::{BallisticsError, FieldError};
pub use trajectory_solver::StopReason;
pub use units::{
    mil_from_offset, mil_to_moa, moa_from_offset, moa_to_mil, suggest_scope_correction,
    AngularUnit, Hold, ImpactOffset, ScopeCorrection,
};
pub use weather::{CachedEnvironmentSource, Clock, EnvironmentSource, SystemClock};
pub use wind::{coriolis_drift, crosswind_drift, velocity_effect, Wind};

// Module declarations
mod drag_model;
pub mod api;
pub mod atmosphere;
pub mod config;
pub mod constants;
pub mod drag;
mod error;
pub mod trajectory_solver;
mod angle_calculations;
mod no_drag;
pub mod units;
pub mod weather;
pub mod wind;
