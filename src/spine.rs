//! Spine curve and neck/head look-at.
use glam::DVec2;

use crate::components::LocomotionComponent;
use crate::numeric::{approach, safe_atan2, shortest_angle};
use crate::state::blended;
use crate::types::{EmotionalState, LocomotionState, TerrainType};

/// Spine curvature of a state at rest (rad, positive arches).
#[must_use]
pub const fn state_spine_curve(state: LocomotionState) -> f64 {
    match state {
        LocomotionState::Idle => 0.0,
        LocomotionState::Prowl => -0.25,
        LocomotionState::Walk => 0.05,
        LocomotionState::Trot => 0.08,
        LocomotionState::Gallop => 0.2,
        LocomotionState::CombatReady => -0.15,
        LocomotionState::Stunned => 0.3,
    }
}

/// Head pitch posture of a state (rad, positive nose-up).
#[must_use]
pub const fn state_head_pitch(state: LocomotionState) -> f64 {
    match state {
        LocomotionState::Idle => 0.05,
        LocomotionState::Prowl => -0.25,
        LocomotionState::Walk => 0.0,
        LocomotionState::Trot => -0.05,
        LocomotionState::Gallop => -0.1,
        LocomotionState::CombatReady => -0.1,
        LocomotionState::Stunned => -0.3,
    }
}

const fn emotion_spine_multiplier(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Calm => 1.0,
        EmotionalState::Aggressive => 1.2,
        EmotionalState::Fearful => 1.4,
        EmotionalState::Desperate => 1.3,
        EmotionalState::Confident => 0.9,
        EmotionalState::Frustrated => 1.1,
    }
}

const fn terrain_spine_multiplier(terrain: TerrainType) -> f64 {
    match terrain {
        TerrainType::Open => 1.0,
        TerrainType::Forest | TerrainType::Mud => 1.05,
        TerrainType::Rocky => 1.15,
        TerrainType::Snow => 1.1,
        TerrainType::Ice => 1.2,
    }
}

const fn emotion_head_pitch(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Confident => 0.1,
        EmotionalState::Aggressive => 0.05,
        EmotionalState::Desperate => -0.1,
        EmotionalState::Fearful => -0.15,
        EmotionalState::Calm | EmotionalState::Frustrated => 0.0,
    }
}

/// World-frame aim direction: travel direction when moving fast enough,
/// otherwise the supplied target direction, otherwise straight ahead.
#[must_use]
pub fn aim_direction(component: &LocomotionComponent) -> DVec2 {
    let inputs = &component.inputs;
    let ahead = DVec2::from_angle(component.root.yaw);
    if inputs.speed > component.config.body.look_speed {
        inputs.velocity.try_normalize().unwrap_or(ahead)
    } else {
        inputs.target_direction.try_normalize().unwrap_or(ahead)
    }
}

/// Updates spine, neck and head of `component` for a tick of `dt` seconds.
pub fn orient(component: &mut LocomotionComponent, dt: f64) {
    let aim = aim_direction(component);
    let inputs = &component.inputs;
    let body = &component.config.body;
    let filter = &component.config.filter;
    let state = &component.state;
    let spine = &mut component.spine;

    let look_yaw = shortest_angle(
        safe_atan2(aim.y, aim.x, component.root.yaw) - component.root.yaw,
    );
    let look_pitch = blended(state, state_head_pitch) + emotion_head_pitch(inputs.emotion);
    let alert_boost = 1.0 + inputs.alertness;
    let neck_rate = filter.neck * alert_boost;
    let head_rate = filter.head * alert_boost;

    let neck_yaw = (look_yaw * body.neck_yaw_share).clamp(-body.neck_yaw_limit, body.neck_yaw_limit);
    let head_yaw = (look_yaw * body.head_yaw_share).clamp(-body.head_yaw_limit, body.head_yaw_limit);
    let neck_pitch = (look_pitch * 0.6).clamp(-body.neck_pitch_limit, body.neck_pitch_limit);
    let head_pitch = (look_pitch * 0.4 - body.head_stabilization * component.root.pitch)
        .clamp(-body.head_pitch_limit, body.head_pitch_limit);

    spine.neck_yaw = approach(spine.neck_yaw, neck_yaw, neck_rate, dt);
    spine.head_yaw = approach(spine.head_yaw, head_yaw, head_rate, dt);
    spine.neck_pitch = approach(spine.neck_pitch, neck_pitch, neck_rate, dt);
    spine.head_pitch = approach(spine.head_pitch, head_pitch, head_rate, dt);

    let morale_multiplier = 1.3 - 0.3 * inputs.morale;
    let turn = (inputs.turn_rate * body.spine_turn_gain)
        .clamp(-body.spine_turn_limit, body.spine_turn_limit);
    let spine_target = blended(state, state_spine_curve)
        * emotion_spine_multiplier(inputs.emotion)
        * terrain_spine_multiplier(inputs.terrain)
        * morale_multiplier
        + turn;
    spine.spine_curve = approach(spine.spine_curve, spine_target, filter.spine, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn standing_creature_looks_along_target_direction() {
        let mut component = LocomotionComponent::default();
        component.inputs.target_direction = DVec2::new(0.0, 1.0);
        for _ in 0..300 {
            orient(&mut component, 1.0 / 60.0);
        }
        let body = &component.config.body;
        assert_relative_eq!(component.spine.neck_yaw, body.neck_yaw_limit, epsilon = 1e-6);
        assert_relative_eq!(component.spine.head_yaw, body.head_yaw_limit, epsilon = 1e-6);
        assert!(FRAC_PI_2 * body.head_yaw_share > body.head_yaw_limit);
    }

    #[test]
    fn head_counters_root_pitch() {
        let mut level = LocomotionComponent::default();
        let mut pitched = LocomotionComponent::default();
        pitched.root.pitch = 0.2;
        for _ in 0..300 {
            orient(&mut level, 1.0 / 60.0);
            orient(&mut pitched, 1.0 / 60.0);
        }
        assert!(pitched.spine.head_pitch < level.spine.head_pitch);
    }

    #[test]
    fn fearful_prowl_hunches_more_than_calm_prowl() {
        let mut calm = LocomotionComponent::default();
        calm.state.current = LocomotionState::Prowl;
        calm.state.previous = LocomotionState::Prowl;
        let mut fearful = calm.clone();
        fearful.inputs.emotion = EmotionalState::Fearful;
        for _ in 0..300 {
            orient(&mut calm, 1.0 / 60.0);
            orient(&mut fearful, 1.0 / 60.0);
        }
        assert!(fearful.spine.spine_curve < calm.spine.spine_curve);
    }
}
