//! Action overlay.
//!
//! Bite, pounce, howl and stun drive additive envelopes on top of the base
//! pose. Overlays never overwrite the spine/head state; they are summed in
//! by the `posed_*` accessors on [`LocomotionComponent`] and by the pose
//! encoder.
use std::f64::consts::{PI, TAU};

use log::debug;

use crate::components::{ActionState, LocomotionComponent, LocomotionInputs};
use crate::config::ActionParams;
use crate::numeric::{clamp01, smoothstep, triangle01};
use crate::types::{Action, EmotionalState, PackRole};

const fn bite_emotion_factor(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Aggressive => 1.15,
        EmotionalState::Fearful => 0.8,
        EmotionalState::Desperate => 1.1,
        EmotionalState::Frustrated => 1.05,
        EmotionalState::Confident => 1.0,
        EmotionalState::Calm => 0.9,
    }
}

/// Rate (1/s) at which an idle jaw closes.
#[must_use]
pub const fn jaw_decay_rate(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Calm | EmotionalState::Confident => 8.0,
        EmotionalState::Aggressive => 5.0,
        EmotionalState::Fearful => 10.0,
        EmotionalState::Desperate | EmotionalState::Frustrated => 6.0,
    }
}

/// Stun duration (s): longer for dim or demoralised creatures.
#[must_use]
pub fn stun_duration(intelligence: f64, morale: f64, params: &ActionParams) -> f64 {
    let intelligence = 1.3 - 0.5 * clamp01(intelligence);
    let morale = 1.2 - 0.4 * clamp01(morale);
    (params.stun_base * intelligence * morale).clamp(params.stun_min, params.stun_max)
}

/// Jaw opening of a bite `elapsed` seconds in.
#[must_use]
pub fn bite_jaw(elapsed: f64, inputs: &LocomotionInputs, params: &ActionParams) -> f64 {
    let cycle = params.bite_cycle.max(f64::EPSILON);
    let envelope = triangle01(elapsed.rem_euclid(cycle) / cycle);
    clamp01(envelope * (0.6 + 0.4 * inputs.aggression) * bite_emotion_factor(inputs.emotion))
}

/// Jaw opening of a howl `elapsed` seconds in.
#[must_use]
pub fn howl_jaw(elapsed: f64, params: &ActionParams) -> f64 {
    let ramp = smoothstep(0.0, params.howl_ramp, elapsed);
    let wobble = (TAU * params.howl_frequency * elapsed).sin();
    clamp01(ramp * (params.howl_jaw + params.howl_jaw_wobble * wobble))
}

fn on_action_change(
    state: &mut ActionState,
    next: Action,
    inputs: &LocomotionInputs,
    params: &ActionParams,
) {
    if state.current == Action::Pounce {
        state.release_timer = params.pounce_release;
        debug!("pounce released after {:.2}s of charge", state.pounce_charge);
        state.pounce_charge = 0.0;
    }
    if next == Action::Stun {
        state.stun_timer = stun_duration(inputs.intelligence, inputs.morale, params);
        debug!("stunned for {:.2}s", state.stun_timer);
    }
    debug!("action {:?} -> {:?}", state.current, next);
    state.current = next;
    state.elapsed = 0.0;
}

/// Runs the action overlay of `component` for a tick of `dt` seconds.
pub fn update(component: &mut LocomotionComponent, dt: f64) {
    let dt = dt.max(0.0);
    let inputs = &component.inputs;
    let params = &component.config.action;
    let state = &mut component.action;

    if inputs.action != state.current {
        on_action_change(state, inputs.action, inputs, params);
    } else {
        state.elapsed += dt;
    }
    state.stun_timer = (state.stun_timer - dt).max(0.0);
    state.release_timer = (state.release_timer - dt).max(0.0);

    state.spine_overlay = 0.0;
    state.neck_pitch_overlay = 0.0;
    state.head_pitch_overlay = 0.0;
    state.feet_pinned = false;

    match state.current {
        Action::Bite => {
            state.jaw_open = bite_jaw(state.elapsed, inputs, params);
            if inputs.aggression > params.head_snap_aggression {
                let cycle = params.bite_cycle.max(f64::EPSILON);
                let snap = triangle01(state.elapsed.rem_euclid(cycle) / cycle);
                state.head_pitch_overlay = -params.head_snap_amplitude * snap;
            }
        }
        Action::Pounce => {
            state.pounce_charge = (state.pounce_charge + dt).min(params.pounce_max_charge);
            let charge = state.pounce_charge / params.pounce_max_charge.max(f64::EPSILON);
            state.spine_overlay = -params.pounce_spine * smoothstep(0.0, 1.0, charge);
            state.feet_pinned = true;
            state.jaw_open *= (-jaw_decay_rate(inputs.emotion) * dt).exp();
        }
        Action::Howl => {
            let ramp = smoothstep(0.0, params.howl_ramp, state.elapsed);
            state.jaw_open = howl_jaw(state.elapsed, params);
            let neck = if inputs.pack_role == PackRole::Leader {
                params.howl_leader_neck
            } else {
                params.howl_neck
            };
            state.neck_pitch_overlay = ramp * neck;
        }
        Action::None | Action::Stun => {
            state.jaw_open *= (-jaw_decay_rate(inputs.emotion) * dt).exp();
        }
    }

    if state.release_timer > 0.0 && params.pounce_release > 0.0 {
        let progress = 1.0 - state.release_timer / params.pounce_release;
        state.spine_overlay += (PI * progress).sin() * params.pounce_release_amplitude;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const DT: f64 = 0.016;

    fn run(component: &mut LocomotionComponent, seconds: f64) -> f64 {
        let mut peak: f64 = 0.0;
        let mut elapsed = 0.0;
        while elapsed < seconds {
            update(component, DT);
            peak = peak.max(component.action.jaw_open);
            elapsed += DT;
        }
        peak
    }

    #[test]
    fn howl_opens_then_jaw_closes() {
        let mut component = LocomotionComponent::default();
        component.inputs.action = Action::Howl;
        let peak = run(&mut component, 1.0);
        assert!(peak > 0.5);
        component.inputs.action = Action::None;
        run(&mut component, 0.5);
        assert!(component.action.jaw_open < 0.05);
    }

    #[test]
    fn leaders_howl_with_higher_neck() {
        let mut scout = LocomotionComponent::default();
        scout.inputs.action = Action::Howl;
        let mut leader = scout.clone();
        leader.inputs.pack_role = PackRole::Leader;
        run(&mut scout, 0.5);
        run(&mut leader, 0.5);
        assert!(leader.action.neck_pitch_overlay > scout.action.neck_pitch_overlay);
    }

    #[test]
    fn bite_follows_a_triangle_envelope() {
        let inputs = LocomotionInputs {
            aggression: 1.0,
            emotion: EmotionalState::Confident,
            ..LocomotionInputs::default()
        };
        let params = ActionParams::default();
        assert_relative_eq!(bite_jaw(0.0, &inputs, &params), 0.0);
        assert_relative_eq!(
            bite_jaw(params.bite_cycle / 2.0, &inputs, &params),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn pounce_pins_feet_and_compresses_spine() {
        let mut component = LocomotionComponent::default();
        component.inputs.action = Action::Pounce;
        run(&mut component, 2.0);
        assert!(component.action.feet_pinned);
        assert_relative_eq!(
            component.action.pounce_charge,
            component.config.action.pounce_max_charge
        );
        assert_relative_eq!(
            component.action.spine_overlay,
            -component.config.action.pounce_spine,
            epsilon = 1e-9
        );
    }

    #[test]
    fn pounce_release_pulses_then_settles() {
        let mut component = LocomotionComponent::default();
        component.inputs.action = Action::Pounce;
        run(&mut component, 1.0);
        component.inputs.action = Action::None;
        update(&mut component, DT);
        assert!(!component.action.feet_pinned);
        let mut peak: f64 = 0.0;
        for _ in 0..10 {
            update(&mut component, DT);
            peak = peak.max(component.action.spine_overlay);
        }
        assert!(peak > 0.0);
        run(&mut component, 0.5);
        assert_relative_eq!(component.action.spine_overlay, 0.0);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 1.0)]
    #[case(0.5, 0.5)]
    fn stun_duration_is_bounded(#[case] intelligence: f64, #[case] morale: f64) {
        let params = ActionParams::default();
        let d = stun_duration(intelligence, morale, &params);
        assert!(d >= params.stun_min && d <= params.stun_max);
    }

    #[test]
    fn stun_starts_timer_on_rising_edge() {
        let mut component = LocomotionComponent::default();
        component.inputs.action = Action::Stun;
        update(&mut component, DT);
        assert!(component.action.stunned());
        let before = component.action.stun_timer;
        update(&mut component, DT);
        assert!(component.action.stun_timer < before);
    }
}
