//! Root stabiliser.
//!
//! Derives the pelvis transform from the four feet: height from their mean
//! height, pitch from the fore/hind height difference plus turn banking, a
//! centre-of-mass pull toward the foot centroid, and yaw from the travel
//! heading.
use glam::DVec2;

use crate::components::{FootState, LocomotionComponent};
use crate::config::BodyParams;
use crate::constants::{IDLE_SPEED, LEG_COUNT};
use crate::numeric::{approach, approach_angle, safe_atan2, smoothing_factor, spring_damper_step};
use crate::types::Leg;

/// Mean foot height.
#[must_use]
pub fn average_foot_height(feet: &[FootState; LEG_COUNT]) -> f64 {
    feet.iter().map(|f| f.position.z).sum::<f64>() / 4.0
}

/// Nose-up pitch target from the fore and hind foot heights, clamped.
#[must_use]
pub fn slope_pitch(feet: &[FootState; LEG_COUNT], body: &BodyParams) -> f64 {
    let (mut fore, mut hind) = (0.0, 0.0);
    for (leg, foot) in Leg::ALL.into_iter().zip(feet) {
        if leg.is_fore() {
            fore += foot.position.z * 0.5;
        } else {
            hind += foot.position.z * 0.5;
        }
    }
    ((fore - hind) * body.pitch_gain).clamp(-body.max_pitch, body.max_pitch)
}

/// Banking lean into a turn, clamped.
#[must_use]
pub fn turn_lean(turn_rate: f64, speed: f64, body: &BodyParams) -> f64 {
    (turn_rate * speed * body.lean_gain).clamp(-body.max_lean, body.max_lean)
}

fn foot_centroid(feet: &[FootState; LEG_COUNT]) -> DVec2 {
    feet.iter().map(|f| f.position.truncate()).sum::<DVec2>() / 4.0
}

/// Stabilises the root of `component` for a tick of `dt` seconds.
pub fn stabilize(component: &mut LocomotionComponent, dt: f64) {
    let dt = dt.max(0.0);
    let inputs = &component.inputs;
    let body = &component.config.body;
    let filter = &component.config.filter;
    let root = &mut component.root;

    if inputs.speed > IDLE_SPEED {
        let heading = safe_atan2(inputs.velocity.y, inputs.velocity.x, root.yaw);
        root.yaw = approach_angle(root.yaw, heading, filter.root_yaw, dt);
    }

    let target_height = average_foot_height(&component.feet) + body.pelvis_offset;
    let (height, velocity) = spring_damper_step(
        root.height,
        root.vertical_velocity,
        target_height,
        body.root_stiffness,
        body.root_damping,
        dt,
    );
    root.height = height;
    root.vertical_velocity = velocity;

    root.lean = turn_lean(inputs.turn_rate, inputs.speed, body);
    let pitch_target = (slope_pitch(&component.feet, body) + root.lean)
        .clamp(-body.max_pitch, body.max_pitch);
    root.pitch = approach(root.pitch, pitch_target, filter.root_pitch, dt);

    let pull = (foot_centroid(&component.feet) - inputs.world_position) * body.com_gain;
    let pull = pull.clamp_length_max(body.com_max);
    root.com_offset = root
        .com_offset
        .lerp(pull, smoothing_factor(filter.com, dt));
    root.position = inputs.world_position + root.com_offset;
}
