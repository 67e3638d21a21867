//! Vector helpers on top of `glam`'s double-precision types.
//! Normalisation never yields `NaN`: invalid or zero vectors fall back to a
//! caller-supplied direction.
use glam::{DVec2, DVec3};

/// World up in the z-up convention.
pub const UP: DVec3 = DVec3::Z;

/// Returns the unit vector of `vector`, or `fallback` if it is zero or
/// non-finite.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use lope::vector_math::normalize_or;
/// let n = normalize_or(DVec3::new(3.0, 0.0, 4.0), DVec3::Z);
/// assert!((n.x - 0.6).abs() < 1e-9);
/// assert!((n.z - 0.8).abs() < 1e-9);
///
/// let fallback = normalize_or(DVec3::new(f64::NAN, 1.0, 0.0), DVec3::Z);
/// assert_eq!(fallback, DVec3::Z);
/// ```
#[must_use]
pub fn normalize_or(vector: DVec3, fallback: DVec3) -> DVec3 {
    if !vector.is_finite() {
        return fallback;
    }
    vector.try_normalize().unwrap_or(fallback)
}

/// Planar counterpart of [`normalize_or`].
#[must_use]
pub fn normalize2_or(vector: DVec2, fallback: DVec2) -> DVec2 {
    if !vector.is_finite() {
        return fallback;
    }
    vector.try_normalize().unwrap_or(fallback)
}

/// Normalises a ground normal, forcing it into the upper hemisphere.
///
/// Downward-facing or degenerate normals become [`UP`].
#[must_use]
pub fn ground_normal(normal: DVec3) -> DVec3 {
    let n = normalize_or(normal, UP);
    if n.z <= 0.0 {
        UP
    } else {
        n
    }
}

/// Rotates a body-frame planar offset by `yaw` radians about +z.
#[must_use]
pub fn rotate_yaw(offset: DVec2, yaw: f64) -> DVec2 {
    DVec2::from_angle(yaw).rotate(offset)
}

/// Pitch and roll (radians) of a body aligned with `normal` while facing
/// `yaw`.
///
/// Pitch is positive nose-up on an uphill slope along the heading; roll is
/// positive when the left side is higher.
#[must_use]
pub fn pitch_roll_from_normal(normal: DVec3, yaw: f64) -> (f64, f64) {
    let n = ground_normal(normal);
    let forward = DVec2::from_angle(yaw);
    let left = forward.perp();
    let planar = n.truncate();
    // Slope rises opposite the planar part of the normal.
    let pitch = (-planar.dot(forward)).atan2(n.z);
    let roll = (-planar.dot(left)).atan2(n.z);
    (pitch, roll)
}

/// Distance between two points in the ground plane.
#[must_use]
pub fn planar_distance(a: DVec3, b: DVec3) -> f64 {
    a.truncate().distance(b.truncate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn ground_normal_rejects_downward() {
        assert_eq!(ground_normal(DVec3::NEG_Z), UP);
        assert_eq!(ground_normal(DVec3::ZERO), UP);
    }

    #[test]
    fn rotate_yaw_quarter_turn() {
        let rotated = rotate_yaw(DVec2::X, FRAC_PI_2);
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn uphill_slope_pitches_nose_up() {
        // Ground rising towards +x has a normal leaning towards -x.
        let normal = DVec3::new(-0.2, 0.0, 1.0);
        let (pitch, roll) = pitch_roll_from_normal(normal, 0.0);
        assert!(pitch > 0.0);
        assert_relative_eq!(roll, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_ground_is_level() {
        let (pitch, roll) = pitch_roll_from_normal(UP, 1.0);
        assert_relative_eq!(pitch, 0.0);
        assert_relative_eq!(roll, 0.0);
    }
}
