//! Secondary motion: tail, ears, breathing, fur and posture stretch.
//!
//! Everything here is cosmetic and never feeds back into the feet or the
//! root. Noise channels are deterministic in `(time, noise_seed)`.
use std::f64::consts::TAU;

use crate::components::LocomotionComponent;
use crate::numeric::{approach, hash_noise, lerp, smoothstep, spring_damper_step, wrap01};
use crate::types::{Action, EmotionalState, PackRole};

/// Tail wag angle at time `t` for an emotion.
#[must_use]
pub fn tail_wag(emotion: EmotionalState, t: f64) -> f64 {
    let (frequency, amplitude) = match emotion {
        EmotionalState::Confident => (8.0, 0.6),
        EmotionalState::Desperate => (12.0, 0.3),
        EmotionalState::Calm => (2.0, 0.15),
        EmotionalState::Fearful => (3.0, 0.05),
        EmotionalState::Frustrated => (6.0, 0.2),
        EmotionalState::Aggressive => (0.0, 0.0),
    };
    (t * frequency).sin() * amplitude
}

/// Resting tail carriage for an emotion and pack role (rad, positive up).
#[must_use]
pub const fn tail_carriage(emotion: EmotionalState, role: PackRole) -> f64 {
    let base = match emotion {
        EmotionalState::Calm => 0.0,
        EmotionalState::Aggressive => 0.2,
        EmotionalState::Fearful => -0.9,
        EmotionalState::Desperate => -0.3,
        EmotionalState::Confident => 0.35,
        EmotionalState::Frustrated => 0.1,
    };
    let role_bonus = match role {
        PackRole::Leader => 0.25,
        PackRole::Bruiser => 0.1,
        PackRole::Support => -0.05,
        PackRole::Skirmisher | PackRole::Scout => 0.0,
    };
    base + role_bonus
}

const fn ear_emotion_offset(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Aggressive => -0.4,
        EmotionalState::Fearful => -0.6,
        EmotionalState::Confident => 0.2,
        EmotionalState::Desperate => -0.2,
        EmotionalState::Frustrated => -0.1,
        EmotionalState::Calm => 0.0,
    }
}

const fn breath_emotion_rate(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Fearful => 0.3,
        EmotionalState::Aggressive => 0.2,
        EmotionalState::Desperate => 0.35,
        EmotionalState::Frustrated => 0.15,
        EmotionalState::Calm | EmotionalState::Confident => 0.0,
    }
}

const fn fur_emotion_factor(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Fearful => 1.5,
        EmotionalState::Aggressive => 1.3,
        EmotionalState::Desperate => 1.4,
        EmotionalState::Frustrated => 1.2,
        EmotionalState::Calm | EmotionalState::Confident => 1.0,
    }
}

/// Resting body stretch for an emotion (1 = neutral).
#[must_use]
pub const fn stretch_target(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Confident => 1.1,
        EmotionalState::Fearful => 0.85,
        EmotionalState::Desperate => 0.95,
        EmotionalState::Aggressive => 1.05,
        EmotionalState::Calm | EmotionalState::Frustrated => 1.0,
    }
}

/// Breathing frequency (Hz) for the current inputs.
#[must_use]
pub fn breath_frequency(component: &LocomotionComponent) -> f64 {
    let inputs = &component.inputs;
    let params = &component.config.secondary;
    params.breath_frequency
        + params.breath_speed_frequency * inputs.speed.max(0.0)
        + breath_emotion_rate(inputs.emotion)
        + (1.0 - inputs.morale) * 0.1
        + inputs.fatigue * 0.3
}

/// Updates secondary motion of `component` for a tick of `dt` seconds.
pub fn animate(component: &mut LocomotionComponent, dt: f64) {
    let dt = dt.max(0.0);
    let frequency = breath_frequency(component);
    let t = component.time;
    let seed = component.noise_seed;
    let inputs = &component.inputs;
    let params = &component.config.secondary;
    let filter = &component.config.filter;
    let action = &component.action;
    let pounce_max = component.config.action.pounce_max_charge;
    let pounce_crouch = component.config.action.pounce_crouch;
    let out = &mut component.secondary;

    let tail_target = -params.tail_turn_gain * inputs.turn_rate + tail_wag(inputs.emotion, t);
    let (yaw, velocity) = spring_damper_step(
        out.tail_yaw,
        out.tail_yaw_velocity,
        tail_target,
        params.tail_stiffness,
        params.tail_damping,
        dt,
    );
    out.tail_yaw = yaw;
    out.tail_yaw_velocity = velocity;
    out.tail_pitch = approach(
        out.tail_pitch,
        tail_carriage(inputs.emotion, inputs.pack_role),
        filter.tail,
        dt,
    );

    let ear_base = lerp(-0.3, 0.4, inputs.alertness) + ear_emotion_offset(inputs.emotion);
    let jitter = params.ear_jitter * (1.0 - 0.7 * inputs.intelligence);
    let ear_left = ear_base + hash_noise(t, seed + 1.0) * jitter;
    let ear_right = ear_base + hash_noise(t, seed + 2.0) * jitter;
    out.ear_left = approach(out.ear_left, ear_left, filter.ears, dt);
    out.ear_right = approach(out.ear_right, ear_right, filter.ears, dt);

    // Slow swell shared by a coordinated pack, on the chest and the coat.
    let pack_sync = if inputs.pack_size > 1.0 {
        params.pack_sync_amplitude
            * inputs.coordination
            * (TAU * (params.pack_sync_frequency * t + inputs.sync_phase)).sin()
    } else {
        0.0
    };

    out.breath_phase = wrap01(out.breath_phase + frequency * dt);
    let depth = params.breath_depth
        + params.breath_speed_depth * inputs.speed.max(0.0)
        + 0.02 * inputs.fatigue;
    out.breathing = (TAU * out.breath_phase).sin() * depth + pack_sync;
    let idle = 1.0 - smoothstep(0.0, 1.0, inputs.speed);
    out.fur_jitter = hash_noise(t, seed + 3.0)
        * params.fur_amplitude
        * (0.3 + 0.7 * idle)
        * fur_emotion_factor(inputs.emotion)
        + pack_sync;

    let mut stretch = stretch_target(inputs.emotion);
    if action.current == Action::Pounce && pounce_max > 0.0 {
        stretch = lerp(stretch, pounce_crouch, (action.pounce_charge / pounce_max).min(1.0));
    }
    out.body_stretch = approach(out.body_stretch, stretch, filter.stretch, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn run(component: &mut LocomotionComponent, seconds: f64) {
        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0;
        while elapsed < seconds {
            animate(component, dt);
            component.time += dt;
            elapsed += dt;
        }
    }

    #[rstest]
    #[case(EmotionalState::Fearful, PackRole::Scout, -0.9)]
    #[case(EmotionalState::Confident, PackRole::Leader, 0.6)]
    #[case(EmotionalState::Calm, PackRole::Support, -0.05)]
    fn tail_carriage_by_emotion_and_role(
        #[case] emotion: EmotionalState,
        #[case] role: PackRole,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(tail_carriage(emotion, role), expected, epsilon = 1e-12);
    }

    #[test]
    fn aggressive_tail_does_not_wag() {
        assert_relative_eq!(tail_wag(EmotionalState::Aggressive, 1.3), 0.0);
    }

    #[test]
    fn fearful_ears_pin_back() {
        let mut calm = LocomotionComponent::default();
        let mut fearful = LocomotionComponent::default();
        fearful.inputs.emotion = EmotionalState::Fearful;
        run(&mut calm, 2.0);
        run(&mut fearful, 2.0);
        assert!(fearful.secondary.ear_left < calm.secondary.ear_left);
        assert!(fearful.secondary.ear_right < calm.secondary.ear_right);
    }

    #[test]
    fn noise_is_deterministic_per_seed() {
        let mut a = LocomotionComponent::default();
        let mut b = LocomotionComponent::default();
        run(&mut a, 1.0);
        run(&mut b, 1.0);
        assert_eq!(a.secondary, b.secondary);
    }

    #[test]
    fn fatigue_quickens_breathing() {
        let rested = LocomotionComponent::default();
        let mut tired = LocomotionComponent::default();
        tired.inputs.fatigue = 1.0;
        assert!(breath_frequency(&tired) > breath_frequency(&rested));
    }

    #[test]
    fn pounce_charge_crouches_the_body() {
        let mut component = LocomotionComponent::default();
        component.action.current = Action::Pounce;
        component.action.pounce_charge = component.config.action.pounce_max_charge;
        run(&mut component, 3.0);
        assert_relative_eq!(
            component.secondary.body_stretch,
            component.config.action.pounce_crouch,
            epsilon = 1e-4
        );
    }

    #[test]
    fn a_coordinated_pack_breathes_together() {
        let mut lone = LocomotionComponent::default();
        let mut member = LocomotionComponent::default();
        member.inputs.pack_size = 4.0;
        member.inputs.coordination = 1.0;
        member.inputs.sync_phase = 0.25;
        run(&mut lone, 0.5);
        run(&mut member, 0.5);
        assert_relative_eq!(lone.secondary.breath_phase, member.secondary.breath_phase);
        let shift = member.secondary.breathing - lone.secondary.breathing;
        assert!(shift > 0.5 * member.config.secondary.pack_sync_amplitude, "shift {shift}");

        let mut scattered = member.clone();
        scattered.inputs.coordination = 0.0;
        scattered.secondary = LocomotionComponent::default().secondary;
        scattered.time = 0.0;
        run(&mut scattered, 0.5);
        assert_relative_eq!(scattered.secondary.breathing, lone.secondary.breathing);
    }

    #[test]
    fn breathing_stays_within_depth() {
        let mut component = LocomotionComponent::default();
        run(&mut component, 5.0);
        assert!(component.secondary.breathing.abs() <= component.config.secondary.breath_depth + 0.01);
    }
}
