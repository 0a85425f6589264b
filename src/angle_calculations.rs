//! Zero-angle solving.
//!
//! The zero is the bore elevation at which the trajectory crosses the line of
//! sight at the zero distance. Drag-free requests use the closed form; G1/G7
//! requests root-find the integrator's height at the zero distance.

use log::{debug, trace};

use crate::api::FiringSolution;
use crate::config::SolverConfig;
use crate::no_drag;
use crate::trajectory_solver::{FlightState, TrajectorySolver};

/// Initial half-width of the elevation bracket (rad)
const INITIAL_BRACKET_RAD: f64 = 5.0 * std::f64::consts::PI / 180.0;
/// Upper bound on the elevation bracket (rad); beyond 45° the low arc is lost
const MAX_BRACKET_RAD: f64 = 45.0 * std::f64::consts::PI / 180.0;
/// Height reported when the zero distance is not reached within the step bound
const UNREACHED_HEIGHT_M: f64 = -1.0e3;

/// Outcome of a root find
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    pub root: f64,
    pub iterations: usize,
    /// |f(root)|
    pub residual: f64,
    pub converged: bool,
}

/// Why a zero could not be established
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZeroFailure {
    /// No sign change inside the widest bracket
    OutOfReach,
    /// Brent ran out of iterations
    NotConverged { residual: f64 },
}

/// Brent's method on a bracketing interval `[a, b]`.
///
/// `b` holds the best estimate, `c` the contrapoint on the other side of the
/// root and `a` the previous iterate. Converges when `|f(b)| < tolerance` or
/// the bracket `[b, c]` shrinks below it. `Err` when `f(a)` and `f(b)` do not
/// straddle zero.
pub fn brent_root_find<F>(
    f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<RootResult, ZeroFailure>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let (mut fa, mut fb) = (f(a), f(b));

    // Also rejects NaN endpoints
    if !(fa * fb <= 0.0) {
        return Err(ZeroFailure::OutOfReach);
    }

    let (mut c, mut fc) = (b, fb);
    let (mut d, mut e) = (0.0_f64, 0.0_f64);

    for iteration in 1..=max_iterations {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        trace!("brent iteration {iteration}: x = {b:.9}, f = {fb:.3e}");

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * tolerance;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb.abs() < tolerance {
            return Ok(RootResult { root: b, iterations: iteration, residual: fb.abs(), converged: true });
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // inverse quadratic
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b);
    }

    Err(ZeroFailure::NotConverged { residual: fb.abs() })
}

/// Widen `[lo, hi]` symmetrically until `f` changes sign or the limit is hit.
fn bracket<F>(f: &F) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let mut half_width = INITIAL_BRACKET_RAD;
    loop {
        let (lo, hi) = (-half_width, half_width);
        if f(lo) * f(hi) <= 0.0 {
            return Some((lo, hi));
        }
        if half_width >= MAX_BRACKET_RAD {
            return None;
        }
        half_width = (half_width * 2.0).min(MAX_BRACKET_RAD);
    }
}

/// Bore elevation (rad) that zeroes the request at its zero distance.
///
/// Uses the nominal muzzle velocity and still air; wind only affects the
/// shot, not the zero.
pub(crate) fn solve_zero(
    request: &FiringSolution,
    config: &SolverConfig,
    air_density: f64,
) -> Result<f64, ZeroFailure> {
    let projectile = &request.projectile;
    let distance = request.zero_distance_m;

    let Some(solver) = TrajectorySolver::new(
        projectile.drag_model,
        projectile.ballistic_coefficient,
        air_density,
        config,
    ) else {
        let angle = no_drag::zero_angle(projectile.muzzle_velocity_ms, request.height_over_bore_m, distance)
            .ok_or(ZeroFailure::OutOfReach)?;
        debug!("vacuum zero at {distance} m: {:.5}°", angle.to_degrees());
        return Ok(angle);
    };

    let height_at_zero = |angle: f64| {
        let launch = FlightState::launch(projectile.muzzle_velocity_ms, angle, request.height_over_bore_m);
        solver.height_at(launch, distance).unwrap_or(UNREACHED_HEIGHT_M)
    };

    let (lo, hi) = bracket(&height_at_zero).ok_or(ZeroFailure::OutOfReach)?;
    let result = brent_root_find(height_at_zero, lo, hi, config.zero_tolerance_m, config.zero_max_iterations)?;

    debug!(
        "{} zero at {distance} m: {:.5}° after {} iterations (residual {:.2e} m)",
        solver.drag_model(),
        result.root.to_degrees(),
        result.iterations,
        result.residual
    );
    Ok(result.root)
}
