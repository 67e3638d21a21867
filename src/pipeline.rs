//! Per-creature tick.
//!
//! Runs every kinematic stage in a fixed order. Long or invalid frame deltas
//! are sanitised and split into sub-steps so the spring-damper stages stay
//! stable at any frame rate.
use log::trace;

use crate::codec::decode_inputs;
use crate::components::LocomotionComponent;
use crate::constants::{MAX_FRAME_DT, MAX_KINEMATIC_STEP};
use crate::ground::GroundQuery;
use crate::{actions, foot_ik, foot_target, gait, root, secondary, spine, state};

/// Clamps a caller-supplied frame delta to `[0, MAX_FRAME_DT]`; non-finite
/// values become zero.
#[must_use]
pub fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Number of equal sub-steps `dt` is split into.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "dt is sanitised, so the quotient is a small non-negative number."
)]
#[must_use]
pub fn substeps(dt: f64) -> u32 {
    let count = (sanitize_dt(dt) / MAX_KINEMATIC_STEP).ceil();
    (count as u32).max(1)
}

fn step(component: &mut LocomotionComponent, ground: &dyn GroundQuery, dt: f64) {
    actions::update(component, dt);
    state::update(component, dt);
    gait::advance(component, dt);
    foot_target::predict(component);
    foot_ik::solve(component, ground, dt);
    root::stabilize(component, dt);
    spine::orient(component, dt);
    secondary::animate(component, dt);
    component.time += dt;
}

/// Advances `component` by `dt` seconds against `ground`.
///
/// Never fails: a zero, negative or non-finite `dt` still re-solves the pose
/// without advancing time.
pub fn tick(component: &mut LocomotionComponent, ground: &dyn GroundQuery, dt: f64) {
    let dt = sanitize_dt(dt);
    let count = substeps(dt);
    let sub_dt = dt / f64::from(count);
    component.gait.auto_switched = false;
    for _ in 0..count {
        step(component, ground, sub_dt);
    }
}

/// Decodes `inputs` into `component` and ticks it. A short input buffer
/// leaves the previous inputs in place.
pub fn tick_with_inputs(
    component: &mut LocomotionComponent,
    inputs: &[f64],
    ground: &dyn GroundQuery,
    dt: f64,
) {
    if !decode_inputs(inputs, &mut component.inputs) {
        trace!("input buffer of {} values skipped", inputs.len());
    }
    tick(component, ground, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{debug_flags, pose};
    use crate::ground::FlatGround;
    use crate::types::Gait;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(-1.0, 0.0)]
    #[case(0.016, 0.016)]
    #[case(10.0, MAX_FRAME_DT)]
    fn dt_is_sanitised(#[case] raw: f64, #[case] expected: f64) {
        assert_relative_eq!(sanitize_dt(raw), expected);
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(0.016, 1)]
    #[case(0.09, 3)]
    #[case(1.0, 8)]
    fn long_frames_are_split(#[case] dt: f64, #[case] expected: u32) {
        assert_eq!(substeps(dt), expected);
    }

    #[test]
    fn tick_advances_time_by_sanitised_dt() {
        let mut component = LocomotionComponent::default();
        let ground = FlatGround::default();
        tick(&mut component, &ground, 0.1);
        tick(&mut component, &ground, f64::INFINITY);
        assert_relative_eq!(component.time, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn a_switch_in_an_early_sub_step_is_reported_for_the_frame() {
        let mut component = LocomotionComponent::default();
        component.inputs.auto_gait = true;
        component.inputs.speed = 2.0;
        assert!(substeps(0.1) > 1);
        tick(&mut component, &FlatGround::default(), 0.1);
        assert_eq!(component.gait.gait, Gait::Trot);
        assert!(component.gait.auto_switched);
        assert_ne!(debug_flags(&component) & pose::DEBUG_AUTO_GAIT, 0);

        tick(&mut component, &FlatGround::default(), 0.1);
        assert!(!component.gait.auto_switched);
    }

    #[test]
    fn short_input_buffer_keeps_previous_inputs() {
        let mut component = LocomotionComponent::default();
        component.inputs.speed = 1.0;
        tick_with_inputs(&mut component, &[3.0; 4], &FlatGround::default(), 0.016);
        assert_relative_eq!(component.inputs.speed, 1.0);
    }
}
