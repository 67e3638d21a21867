//! Nominal foot targets.
//!
//! Each target is the leg's anatomical offset plus a forward reach along the
//! travel direction and a small outward splay, both driven by how far the
//! leg is into swing. Targets are anchored on the caller's world position,
//! not on the stabilised root, so the root correction cannot feed back into
//! the feet.
use glam::DVec2;

use crate::components::LocomotionComponent;
use crate::constants::{FULL_GAIT_SPEED, IDLE_SPEED};
use crate::numeric::{clamp01, lerp, smoothstep};
use crate::types::Leg;
use crate::vector_math::{normalize2_or, rotate_yaw};

/// Body-frame target offset of one leg.
///
/// `swing` is the swing fraction `1 − stance_alpha`; `direction` is the
/// body-frame travel direction (unit length).
#[must_use]
pub fn body_target(
    base: DVec2,
    direction: DVec2,
    stride: f64,
    swing: f64,
    side: f64,
    splay: f64,
) -> DVec2 {
    let swing = clamp01(swing);
    let reach = direction * stride * lerp(-0.5, 0.5, swing);
    let lateral = DVec2::new(0.0, side * splay * swing);
    base + reach + lateral
}

/// Body-frame travel direction: the velocity rotated into the body, or
/// straight ahead when (nearly) stationary.
#[must_use]
pub fn travel_direction(velocity: DVec2, speed: f64, yaw: f64) -> DVec2 {
    if speed < IDLE_SPEED {
        return DVec2::X;
    }
    normalize2_or(rotate_yaw(velocity, -yaw), DVec2::X)
}

/// Writes the nominal world-space target of every foot, and the predicted
/// lift and extension scalars. The reach fades out below walking speed, so a
/// standing creature keeps its feet under its shoulders and hips.
pub fn predict(component: &mut LocomotionComponent) {
    let inputs = &component.inputs;
    let body = &component.config.body;
    let yaw = component.root.yaw;
    let direction = travel_direction(inputs.velocity, inputs.speed, yaw);
    let stride = component.gait.stride * smoothstep(0.0, FULL_GAIT_SPEED, inputs.speed);
    for (leg, foot) in Leg::ALL.into_iter().zip(component.feet.iter_mut()) {
        let i = leg.index();
        let base = body.foot_offsets.get(i).copied().unwrap_or_default();
        let alpha = component.gait.stance_alpha.get(i).copied().unwrap_or(1.0);
        let swing = 1.0 - alpha;
        let local = body_target(base, direction, stride, swing, leg.side(), body.lateral_splay);
        let world = inputs.world_position + rotate_yaw(local, yaw);
        foot.target = world.extend(inputs.ground_height);
        foot.lift = swing;
        foot.extension = 1.0 - 0.4 * swing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn planted_leg_sits_half_a_stride_back() {
        let t = body_target(DVec2::new(0.45, 0.16), DVec2::X, 1.0, 0.0, 1.0, 0.015);
        assert_relative_eq!(t.x, -0.05, epsilon = 1e-12);
        assert_relative_eq!(t.y, 0.16, epsilon = 1e-12);
    }

    #[test]
    fn swinging_leg_reaches_forward_and_splays_out() {
        let t = body_target(DVec2::new(-0.45, -0.14), DVec2::X, 1.0, 1.0, -1.0, 0.015);
        assert_relative_eq!(t.x, 0.05, epsilon = 1e-12);
        assert_relative_eq!(t.y, -0.155, epsilon = 1e-12);
    }

    #[test]
    fn travel_direction_is_body_relative() {
        let dir = travel_direction(DVec2::new(0.0, 2.0), 2.0, FRAC_PI_2);
        assert_relative_eq!(dir.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(dir.y, 0.0, epsilon = 1e-12);
        assert_eq!(travel_direction(DVec2::new(0.0, 2.0), 0.0, 0.0), DVec2::X);
    }

    #[test]
    fn predict_places_targets_around_world_position() {
        let mut component = LocomotionComponent::default();
        component.inputs.world_position = DVec2::new(10.0, -3.0);
        component.inputs.ground_height = 0.4;
        predict(&mut component);
        let lf = component.feet[0].target;
        assert_relative_eq!(lf.x, 10.0 + 0.45, epsilon = 1e-12);
        assert_relative_eq!(lf.y, -3.0 + 0.16, epsilon = 1e-12);
        assert_relative_eq!(lf.z, 0.4);
    }

    #[test]
    fn moving_targets_sit_half_a_stride_back_in_stance() {
        let mut component = LocomotionComponent::default();
        component.inputs.speed = 1.0;
        component.inputs.velocity = DVec2::new(1.0, 0.0);
        component.gait.stride = 0.6;
        predict(&mut component);
        let lf = component.feet[0].target;
        assert_relative_eq!(lf.x, 0.45 - 0.3, epsilon = 1e-12);
    }
}
