use approx::assert_relative_eq;
use dope_ballistics::{
    compute_air_density, crosswind_drift, dope_table, drag_coefficient, mil_from_offset, mil_to_moa,
    moa_to_mil, solve_trajectory, zero_angle, DragModel, Environment, FiringSolution, ProjectileSpec,
    SolverConfig,
};

fn vacuum(range_m: f64) -> FiringSolution {
    FiringSolution::new(ProjectileSpec::new(800.0, DragModel::None, 0.0, 10.0, 7.82), range_m)
}

#[test]
fn test_vacuum_300m_flat_and_raised() {
    let flat = solve_trajectory(&vacuum(300.0)).unwrap();
    assert_relative_eq!(flat.time_of_flight_s, 0.375, epsilon = 1e-6);
    assert_relative_eq!(flat.drop_m, 0.690, epsilon = 1e-3);
    assert_relative_eq!(flat.hold_mil, 2.30, epsilon = 0.01);

    let raised = solve_trajectory(&FiringSolution { launch_angle_deg: 2.0, ..vacuum(300.0) }).unwrap();
    assert_relative_eq!(-raised.drop_m, 9.79, epsilon = 0.01);
    assert_relative_eq!(-raised.hold_mil, 32.6, epsilon = 0.05);
}

#[test]
fn test_vacuum_true_zero_at_300m() {
    let request = FiringSolution { zero_distance_m: 300.0, ..vacuum(300.0) };
    let deg = zero_angle(&request, &SolverConfig::default()).unwrap().unwrap();
    assert_relative_eq!(deg, 0.132, epsilon = 1e-3);

    let result = solve_trajectory(&request).unwrap();
    assert!(result.drop_m.abs() < 1e-9);
}

#[test]
fn test_density_monotonic_in_temperature() {
    let densities: Vec<f64> = (-40..=50)
        .map(|t| compute_air_density(&Environment::new(t as f64, 1013.25, 40.0)))
        .collect();
    assert!(densities.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_humid_air_is_lighter() {
    let dry = compute_air_density(&Environment::new(25.0, 1000.0, 0.0));
    let humid = compute_air_density(&Environment::new(25.0, 1000.0, 100.0));
    assert!(humid < dry);
    assert!((dry - humid) / dry < 0.02);
}

#[test]
fn test_g1_node_and_midpoint() {
    assert_eq!(drag_coefficient(1.0, DragModel::G1), 0.4805);
    let mid = drag_coefficient(1.0125, DragModel::G1);
    let (lo, hi) = (drag_coefficient(1.0, DragModel::G1), drag_coefficient(1.025, DragModel::G1));
    assert!(mid > lo.min(hi) && mid < lo.max(hi));
}

#[test]
fn test_scope_correction_signs() {
    assert!(mil_from_offset(300.0, 5.0, 0.0).unwrap().up < 0.0);
    assert!(mil_from_offset(0.0, 0.0, 0.0).is_err());
    for x in [-7.5, 0.0, 0.25, 3.0, 41.7] {
        assert!((moa_to_mil(mil_to_moa(x)) - x).abs() < 1e-9);
    }
}

#[test]
fn test_crosswind_peak_at_right_angle() {
    let full = crosswind_drift(6.0, 90.0, 0.7, 650.0);
    assert!(crosswind_drift(6.0, 45.0, 0.7, 650.0) < full);
    assert!(crosswind_drift(6.0, 0.0, 0.7, 650.0).abs() < 1e-12);
    assert!(crosswind_drift(6.0, 180.0, 0.7, 650.0).abs() < 1e-9);
}

#[test]
fn test_longer_range_never_shortens_flight() {
    for drag_model in [DragModel::None, DragModel::G1, DragModel::G7] {
        let request = FiringSolution::new(ProjectileSpec::new(820.0, drag_model, 0.45, 11.0, 7.82), 1.0);
        let ranges: Vec<f64> = (1..=12).map(|i| i as f64 * 50.0).collect();
        let rows = dope_table(&request, &ranges).unwrap();

        for pair in rows.windows(2) {
            assert!(pair[1].time_of_flight_s > pair[0].time_of_flight_s, "{drag_model}");
            assert!(pair[1].drop_m.abs() >= pair[0].drop_m.abs(), "{drag_model}");
        }
    }
}
