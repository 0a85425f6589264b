//! Closed-form vacuum trajectory.

use crate::constants::G_ACCEL_MPS2;
use crate::trajectory_solver::{FlightOutcome, FlightState, StopReason};

/// Fly a vacuum trajectory to `range_m` analytically.
///
/// Same geometry as the integrator: line of sight at `y = 0`, bore starting
/// `height_over_bore_m` below it. The path is concave, so it is below the
/// floor at the range only if it crossed the floor on the way down.
pub fn fly(
    muzzle_velocity_ms: f64,
    bore_angle_rad: f64,
    height_over_bore_m: f64,
    range_m: f64,
    floor_m: f64,
) -> FlightOutcome {
    let launch = FlightState::launch(muzzle_velocity_ms, bore_angle_rad, height_over_bore_m);
    let vx = launch.velocity.x;
    let vy0 = launch.velocity.y;

    if vx <= 0.0 {
        return FlightOutcome {
            state: launch,
            max_ordinate_m: launch.position.y,
            stop: StopReason::StepLimit,
            steps: 0,
        };
    }

    let y0 = launch.position.y;
    let t_range = range_m / vx;
    let y_range = y0 + vy0 * t_range - 0.5 * G_ACCEL_MPS2 * t_range * t_range;

    // Past the floor, stop where the descending branch crosses it
    let (t, stop) = if y_range >= floor_m {
        (t_range, StopReason::ReachedRange)
    } else if y0 < floor_m {
        (0.0, StopReason::BelowFloor)
    } else {
        let disc = vy0 * vy0 + 2.0 * G_ACCEL_MPS2 * (y0 - floor_m);
        ((vy0 + disc.sqrt()) / G_ACCEL_MPS2, StopReason::BelowFloor)
    };

    let mut state = launch;
    state.time = t;
    state.position.x = if stop == StopReason::ReachedRange { range_m } else { vx * t };
    state.position.y = if stop == StopReason::ReachedRange { y_range } else { y0.min(floor_m) };
    state.velocity.y = vy0 - G_ACCEL_MPS2 * t;

    let apex_t = vy0 / G_ACCEL_MPS2;
    let max_ordinate_m = if vy0 > 0.0 && apex_t < t {
        y0 + vy0 * vy0 / (2.0 * G_ACCEL_MPS2)
    } else {
        y0.max(state.position.y)
    };

    FlightOutcome { state, max_ordinate_m, stop, steps: 0 }
}

/// Low-arc bore angle (rad) that crosses the line of sight at `zero_distance_m`.
///
/// Solves `-h + R·u - a·(1 + u²) = 0` for `u = tan θ` with `a = g·R²/(2·V²)`.
/// `None` when the distance is out of reach at this velocity.
pub fn zero_angle(muzzle_velocity_ms: f64, height_over_bore_m: f64, zero_distance_m: f64) -> Option<f64> {
    let r = zero_distance_m;
    let a = G_ACCEL_MPS2 * r * r / (2.0 * muzzle_velocity_ms * muzzle_velocity_ms);
    let disc = r * r - 4.0 * a * (height_over_bore_m + a);
    if !disc.is_finite() || disc < 0.0 || a <= 0.0 {
        return None;
    }
    let u = (r - disc.sqrt()) / (2.0 * a);
    Some(u.atan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_shot_300m() {
        let out = fly(800.0, 0.0, 0.0, 300.0, -10.0);
        assert_eq!(out.stop, StopReason::ReachedRange);
        assert_relative_eq!(out.state.time, 0.375, epsilon = 1e-12);
        assert_relative_eq!(out.state.position.y, -0.689_530, epsilon = 1e-5);
        assert_relative_eq!(out.max_ordinate_m, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_degree_shot_300m() {
        let out = fly(800.0, 2f64.to_radians(), 0.0, 300.0, -10.0);
        assert_relative_eq!(out.state.time, 0.375_23, epsilon = 1e-4);
        assert_relative_eq!(out.state.position.y, 9.79, epsilon = 0.01);
        assert!(out.max_ordinate_m >= out.state.position.y);
    }

    #[test]
    fn test_impact_speed_conserves_energy() {
        let out = fly(800.0, 0.05, 0.0, 600.0, -100.0);
        let v2 = out.state.speed().powi(2);
        let expected = 800.0 * 800.0 - 2.0 * G_ACCEL_MPS2 * out.state.position.y;
        assert_relative_eq!(v2, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_below_floor_stops_at_crossing() {
        let out = fly(300.0, 0.0, 0.0, 1000.0, -10.0);
        assert_eq!(out.stop, StopReason::BelowFloor);
        // 10 m of fall takes sqrt(20 / g)
        let t = (20.0 / G_ACCEL_MPS2).sqrt();
        assert_relative_eq!(out.state.time, t, epsilon = 1e-12);
        assert_relative_eq!(out.state.position.x, 300.0 * t, epsilon = 1e-9);
        assert_relative_eq!(out.state.position.y, -10.0, epsilon = 1e-12);
        assert!(out.state.position.x < 1000.0);
    }

    #[test]
    fn test_lofted_shot_crosses_floor_on_descent() {
        let out = fly(100.0, 0.3, 0.0, 5000.0, -10.0);
        assert_eq!(out.stop, StopReason::BelowFloor);
        assert!(out.state.velocity.y < 0.0);
        assert!(out.max_ordinate_m > 0.0);
        let x = out.state.position.x;
        let t = x / out.state.velocity.x;
        let y = 100.0 * 0.3f64.sin() * t - 0.5 * G_ACCEL_MPS2 * t * t;
        assert_relative_eq!(y, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_angle_300m() {
        let theta = zero_angle(800.0, 0.0, 300.0).unwrap();
        assert_relative_eq!(theta, 0.002_298, epsilon = 1e-6);
        let out = fly(800.0, theta, 0.0, 300.0, -10.0);
        assert!(out.state.position.y.abs() < 1e-9);
    }

    #[test]
    fn test_zero_angle_with_sight_height() {
        let theta = zero_angle(800.0, 0.05, 100.0).unwrap();
        let out = fly(800.0, theta, 0.05, 100.0, -10.0);
        assert!(out.state.position.y.abs() < 1e-9);
        assert!(theta > zero_angle(800.0, 0.0, 100.0).unwrap());
    }

    #[test]
    fn test_zero_angle_out_of_reach() {
        // Vacuum max range at 100 m/s is ~1020 m
        assert!(zero_angle(100.0, 0.0, 2000.0).is_none());
    }
}
