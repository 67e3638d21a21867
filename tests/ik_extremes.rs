//! Two-bone IK at and beyond the edges of the reachable annulus.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use glam::DVec2;
use lope::physics::ik::{forward, solve_two_bone};
use rstest::rstest;

#[rstest]
#[case(0.3, 0.28, DVec2::new(0.0, 1.0), 1.0)]
#[case(0.3, 0.28, DVec2::new(-3.0, 0.2), -1.0)]
#[case(0.25, 0.35, DVec2::new(0.5, 0.5), 1.0)]
#[case(0.3, 0.3, DVec2::new(1e6, -1e6), -1.0)]
fn distant_targets_extend_fully(
    #[case] upper: f64,
    #[case] lower: f64,
    #[case] target: DVec2,
    #[case] bend: f64,
) {
    let s = solve_two_bone(upper, lower, target, bend);
    assert!(s.clamped);
    assert!(s.hip.is_finite() && s.knee.is_finite());
    assert_relative_eq!(s.knee, 0.0, epsilon = 1e-6);
    let end = forward(upper, lower, s.hip, s.knee, bend);
    assert_relative_eq!(end.length(), upper + lower, epsilon = 1e-6);
    // The extended leg points at the target.
    assert_relative_eq!(end.normalize().dot(target.normalize()), 1.0, epsilon = 1e-6);
}

#[rstest]
#[case(0.3, 0.28, DVec2::new(0.0, 0.001), -1.0)]
#[case(0.3, 0.2, DVec2::new(0.05, 0.02), 1.0)]
#[case(0.3, 0.28, DVec2::ZERO, 1.0)]
#[case(0.3, 0.3, DVec2::new(1e-9, 0.0), -1.0)]
fn close_targets_flex_fully(
    #[case] upper: f64,
    #[case] lower: f64,
    #[case] target: DVec2,
    #[case] bend: f64,
) {
    let s = solve_two_bone(upper, lower, target, bend);
    assert!(s.clamped);
    assert!(s.hip.is_finite() && s.knee.is_finite());
    assert!(s.knee > PI - 0.01, "knee {}", s.knee);
    assert!(s.knee <= PI);
    let end = forward(upper, lower, s.hip, s.knee, bend);
    assert!(end.length() <= (upper - lower).abs() + 1e-3);
}

#[rstest]
#[case(DVec2::new(f64::NAN, 0.4))]
#[case(DVec2::new(f64::INFINITY, f64::NEG_INFINITY))]
fn non_finite_targets_stay_finite(#[case] target: DVec2) {
    let s = solve_two_bone(0.3, 0.28, target, 1.0);
    assert!(s.hip.is_finite() && s.knee.is_finite());
}
