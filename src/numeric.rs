//! Scalar helpers used across the per-tick pipeline.
//!
//! Every function here is total: non-finite inputs, zero-width ranges and
//! non-positive rates degrade to a stable value instead of propagating `NaN`.
//! The hot loop relies on this to stay panic-free.

use std::f64::consts::{PI, TAU};

use crate::constants::EPSILON;

/// Clamp into `[0, 1]`, mapping non-finite input to `0`.
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Return `value` when finite, otherwise `fallback`.
#[must_use]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Linear interpolation between `a` and `b`.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`.
///
/// A degenerate range behaves like a hard step at `edge0`.
///
/// # Examples
/// ```
/// use lope::numeric::smoothstep;
/// assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
/// assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
/// assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
/// ```
#[must_use]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let width = edge1 - edge0;
    if width.abs() < EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = clamp01((x - edge0) / width);
    t * t * (3.0 - 2.0 * t)
}

/// Wrap a phase into `[0, 1)`.
///
/// # Examples
/// ```
/// use lope::numeric::wrap01;
/// assert!((wrap01(1.25) - 0.25).abs() < 1e-12);
/// assert!((wrap01(-0.25) - 0.75).abs() < 1e-12);
/// assert_eq!(wrap01(f64::NAN), 0.0);
/// ```
#[must_use]
pub fn wrap01(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value - value.floor();
    // `x - floor(x)` can round up to exactly 1.0 for tiny negative inputs.
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest difference `to - from` between two phases, in `[-0.5, 0.5)`.
#[must_use]
pub fn phase_delta(from: f64, to: f64) -> f64 {
    wrap01(to - from + 0.5) - 0.5
}

/// Wrap an angle into `(-π, π]`.
#[must_use]
pub fn shortest_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Fraction of the remaining distance covered by exponential smoothing at
/// `rate` (1/s) over `dt` seconds.
#[must_use]
pub fn smoothing_factor(rate: f64, dt: f64) -> f64 {
    if rate <= 0.0 || dt <= 0.0 || !rate.is_finite() || !dt.is_finite() {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Exponentially approach `target` from `current`.
#[must_use]
pub fn approach(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    lerp(current, target, smoothing_factor(rate, dt))
}

/// Exponentially approach an angle along the shortest arc.
#[must_use]
pub fn approach_angle(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    let delta = shortest_angle(target - current);
    shortest_angle(current + delta * smoothing_factor(rate, dt))
}

/// `atan2` that returns `fallback` for a (near) zero vector.
#[must_use]
pub fn safe_atan2(y: f64, x: f64, fallback: f64) -> f64 {
    if !x.is_finite() || !y.is_finite() || x.hypot(y) < EPSILON {
        fallback
    } else {
        y.atan2(x)
    }
}

/// One explicit-Euler step of `accel = k·(target − pos) − c·vel`.
///
/// Velocity is updated first and the new velocity moves the position, which
/// keeps stiff settings stable at frame-rate timesteps. Returns
/// `(position, velocity)`.
#[must_use]
pub fn spring_damper_step(
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    dt: f64,
) -> (f64, f64) {
    if dt <= 0.0 || !dt.is_finite() {
        return (position, velocity);
    }
    let accel = stiffness * (target - position) - damping * velocity;
    let new_velocity = finite_or(velocity + accel * dt, 0.0);
    let new_position = finite_or(position + new_velocity * dt, target);
    (new_position, new_velocity)
}

/// Symmetric triangle envelope: 0 at `t = 0`, 1 at `t = 0.5`, 0 at `t = 1`.
#[must_use]
pub fn triangle01(t: f64) -> f64 {
    let t = clamp01(t);
    if t < 0.5 {
        t * 2.0
    } else {
        1.0 - (t - 0.5) * 2.0
    }
}

/// Deterministic pseudo-noise in `[-1, 1]` derived from a sine hash.
///
/// A pure function of its arguments: the same `(t, seed)` always yields the
/// same value, so jitter is reproducible frame to frame without any RNG
/// state.
#[must_use]
pub fn hash_noise(t: f64, seed: f64) -> f64 {
    let raw = (t * 12.9898 + seed * 78.233).sin() * 43_758.545_3;
    if !raw.is_finite() {
        return 0.0;
    }
    (raw - raw.floor()) * 2.0 - 1.0
}

/// Round a buffer value to an integer enum code.
///
/// Returns `None` for non-finite or out-of-range values.
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is rounded and range-checked before casting."
)]
#[must_use]
pub fn code_from_f64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if rounded < -1.0e9 || rounded > 1.0e9 {
        return None;
    }
    Some(rounded as i64)
}

/// Decode an integer-valued bitmask stored in an `f64` slot.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Negative and oversized values are rejected before casting."
)]
#[must_use]
pub fn bits_from_f64(value: f64) -> u32 {
    match code_from_f64(value) {
        Some(code) if (0..=i64::from(u32::MAX)).contains(&code) => code as u32,
        _ => 0,
    }
}
