//! Locomotion state selector.
//!
//! Picks one of the high-level states from speed, alertness, emotion, morale
//! and the stun timer, and runs the blend that crossfades postures between
//! them. A state change never snaps: it restarts `blend_t` at zero and
//! consumers mix `previous` and `current` by [`blend_weight`].
use log::debug;

use crate::components::{LocomotionComponent, LocomotionInputs, StateMachineState};
use crate::config::StateConfig;
use crate::gait;
use crate::numeric::{clamp01, smoothstep};
use crate::types::{EmotionalState, Gait, LocomotionState, TerrainType};

fn alertness_threshold(emotion: EmotionalState, config: &StateConfig) -> f64 {
    let shift = match emotion {
        EmotionalState::Aggressive => config.aggressive_shift,
        EmotionalState::Fearful => config.fearful_shift,
        _ => 0.0,
    };
    clamp01(config.alertness_threshold + shift)
}

fn moving_tier(speed: f64, current: LocomotionState, config: &StateConfig) -> LocomotionState {
    let band = config.speed_hysteresis;
    // Widen the band the creature is already in.
    let walk_max = match current {
        LocomotionState::Walk | LocomotionState::Prowl => config.walk_max_speed + band,
        LocomotionState::Trot | LocomotionState::Gallop => config.walk_max_speed - band,
        _ => config.walk_max_speed,
    };
    let trot_max = match current {
        LocomotionState::Trot => config.trot_max_speed + band,
        LocomotionState::Gallop => config.trot_max_speed - band,
        _ => config.trot_max_speed,
    };
    if speed < walk_max {
        LocomotionState::Walk
    } else if speed < trot_max {
        LocomotionState::Trot
    } else {
        LocomotionState::Gallop
    }
}

const fn downgrade(state: LocomotionState) -> LocomotionState {
    match state {
        LocomotionState::Gallop => LocomotionState::Trot,
        LocomotionState::Trot => LocomotionState::Walk,
        LocomotionState::Walk => LocomotionState::Prowl,
        other => other,
    }
}

/// State the creature should be in, ignoring blend timing. `running` is the
/// gait actually in use, which under auto-selection can differ from the
/// requested one.
#[must_use]
pub fn select_target_state(
    inputs: &LocomotionInputs,
    running: Gait,
    current: LocomotionState,
    stun_active: bool,
    config: &StateConfig,
) -> LocomotionState {
    if stun_active {
        return LocomotionState::Stunned;
    }
    if inputs.speed < config.idle_speed {
        return if inputs.alertness >= alertness_threshold(inputs.emotion, config) {
            LocomotionState::CombatReady
        } else {
            LocomotionState::Idle
        };
    }
    let target = if running == Gait::Prowl {
        LocomotionState::Prowl
    } else {
        moving_tier(inputs.speed, current, config)
    };
    if inputs.morale < config.low_morale && inputs.terrain == TerrainType::Open {
        downgrade(target)
    } else {
        target
    }
}

/// Blend duration (s) for a transition, from emotion and intelligence.
///
/// Agitated creatures switch posture faster; clever ones commit faster.
#[must_use]
pub fn blend_duration(emotion: EmotionalState, intelligence: f64, config: &StateConfig) -> f64 {
    let emotion_factor = match emotion {
        EmotionalState::Calm => 1.0,
        EmotionalState::Aggressive => 0.7,
        EmotionalState::Fearful => 0.8,
        EmotionalState::Desperate => 0.75,
        EmotionalState::Confident => 1.1,
        EmotionalState::Frustrated => 0.9,
    };
    let intelligence_factor = 1.2 - 0.4 * clamp01(intelligence);
    (config.blend_base * emotion_factor * intelligence_factor)
        .clamp(config.blend_min, config.blend_max)
}

/// Smoothed crossfade weight of the current state.
#[must_use]
pub fn blend_weight(state: &StateMachineState) -> f64 {
    smoothstep(0.0, 1.0, state.blend_t)
}

/// Crossfades a per-state value between the previous and current state.
#[must_use]
pub fn blended(state: &StateMachineState, value: impl Fn(LocomotionState) -> f64) -> f64 {
    let w = blend_weight(state);
    value(state.previous) * (1.0 - w) + value(state.current) * w
}

/// Updates the state machine of `component` by `dt` seconds.
pub fn update(component: &mut LocomotionComponent, dt: f64) {
    let running = gait::running_gait(component);
    let config = &component.config.state;
    let inputs = &component.inputs;
    let machine = &mut component.state;
    let target = select_target_state(
        inputs,
        running,
        machine.current,
        component.action.stunned(),
        config,
    );
    if target != machine.current {
        machine.previous = machine.current;
        machine.current = target;
        machine.blend_t = 0.0;
        machine.blend_duration = blend_duration(inputs.emotion, inputs.intelligence, config);
        debug!(
            "state {:?} -> {:?} over {:.3}s",
            machine.previous, machine.current, machine.blend_duration
        );
    }
    if machine.blend_duration > 0.0 {
        machine.blend_t = clamp01(machine.blend_t + dt.max(0.0) / machine.blend_duration);
    } else {
        machine.blend_t = 1.0;
    }
}
