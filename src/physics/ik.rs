//! Analytic two-bone IK in a leg's sagittal plane.
//!
//! Coordinates are `(u, w)`: `u` forward, `w` downward from the hip. Angles
//! are measured from straight down toward forward. A knee flexion of zero is
//! a straight leg.
use std::f64::consts::PI;

use glam::DVec2;

use crate::constants::EPSILON;
use crate::numeric::safe_atan2;

/// Joint angles solving one leg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegSolution {
    /// Thigh angle from straight down (rad).
    pub hip: f64,
    /// Knee flexion in `[0, π)` (rad).
    pub knee: f64,
    /// Whether the target was outside the reachable annulus.
    pub clamped: bool,
}

/// Unit direction at `angle` from straight down.
#[must_use]
pub fn bone_direction(angle: f64) -> DVec2 {
    DVec2::new(angle.sin(), angle.cos())
}

/// Solves a two-bone leg for the target `(u, w)`.
///
/// `bend` is `+1.0` for a knee that folds forward and `-1.0` for one that
/// folds backward. Targets beyond `upper + lower` give a fully extended leg
/// pointing at the target; targets closer than `|upper − lower|` give a fully
/// flexed one. Neither case produces NaN.
#[must_use]
pub fn solve_two_bone(upper: f64, lower: f64, target: DVec2, bend: f64) -> LegSolution {
    let upper = upper.max(EPSILON);
    let lower = lower.max(EPSILON);
    let min_reach = (upper - lower).abs() + EPSILON;
    let max_reach = upper + lower;
    let raw = if target.is_finite() { target.length() } else { max_reach };
    let distance = raw.clamp(min_reach, max_reach);
    let clamped = raw > max_reach || raw < min_reach;

    let interior = ((upper * upper + lower * lower - distance * distance) / (2.0 * upper * lower))
        .clamp(-1.0, 1.0)
        .acos();
    let knee = PI - interior;
    let offset = ((upper * upper + distance * distance - lower * lower) / (2.0 * upper * distance))
        .clamp(-1.0, 1.0)
        .acos();
    let aim = if target.is_finite() {
        safe_atan2(target.x, target.y, 0.0)
    } else {
        0.0
    };
    LegSolution {
        hip: aim + bend.signum() * offset,
        knee,
        clamped,
    }
}

/// End point `(u, w)` of a leg posed at `hip` and `knee`.
#[must_use]
pub fn forward(upper: f64, lower: f64, hip: f64, knee: f64, bend: f64) -> DVec2 {
    bone_direction(hip) * upper + bone_direction(hip - bend.signum() * knee) * lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const UPPER: f64 = 0.3;
    const LOWER: f64 = 0.28;

    #[rstest]
    #[case(DVec2::new(0.1, 0.45), 1.0)]
    #[case(DVec2::new(-0.2, 0.35), -1.0)]
    #[case(DVec2::new(0.0, 0.5), 1.0)]
    fn reachable_targets_are_hit(#[case] target: DVec2, #[case] bend: f64) {
        let s = solve_two_bone(UPPER, LOWER, target, bend);
        assert!(!s.clamped);
        let end = forward(UPPER, LOWER, s.hip, s.knee, bend);
        assert_relative_eq!(end.x, target.x, epsilon = 1e-9);
        assert_relative_eq!(end.y, target.y, epsilon = 1e-9);
    }

    #[test]
    fn distant_target_fully_extends() {
        let s = solve_two_bone(UPPER, LOWER, DVec2::new(2.0, 2.0), 1.0);
        assert!(s.clamped);
        assert!(s.hip.is_finite() && s.knee.is_finite());
        assert_relative_eq!(s.knee, 0.0, epsilon = 1e-6);
        let end = forward(UPPER, LOWER, s.hip, s.knee, 1.0);
        assert_relative_eq!(end.length(), UPPER + LOWER, epsilon = 1e-6);
    }

    #[test]
    fn close_target_fully_flexes() {
        let s = solve_two_bone(UPPER, LOWER, DVec2::new(0.0, 0.001), -1.0);
        assert!(s.clamped);
        assert!(s.hip.is_finite() && s.knee.is_finite());
        assert!(s.knee > 2.5);
    }

    #[test]
    fn coincident_target_is_nan_free() {
        let s = solve_two_bone(UPPER, LOWER, DVec2::ZERO, 1.0);
        assert!(s.hip.is_finite() && s.knee.is_finite());
        let s = solve_two_bone(UPPER, LOWER, DVec2::new(f64::NAN, 0.2), 1.0);
        assert!(s.hip.is_finite() && s.knee.is_finite());
    }
}
