//! Gait engine: per-leg phase accumulators and stance/swing partitioning.
//!
//! All legs share a master phase; each leg adds its own offset, which glides
//! toward the active gait's offsets so a gait change never pops. Stance is
//! the first `duty` of each leg's cycle, feathered with a smoothstep at both
//! ends so the stance weight stays continuous across the phase wrap.
use log::debug;

use crate::components::{GaitState, LocomotionComponent, LocomotionInputs};
use crate::config::{GaitConfig, GaitParams, GaitThresholds};
use crate::constants::{EPSILON, FULL_GAIT_SPEED};
use crate::numeric::{clamp01, lerp, phase_delta, smoothing_factor, smoothstep, wrap01};
use crate::types::{EmotionalState, Gait, PackRole, TerrainType};

/// Duty factor of `params` at `speed`.
///
/// The result always leaves room for the feather on both sides.
#[must_use]
pub fn duty_factor(params: &GaitParams, speed: f64) -> f64 {
    let speed = speed.max(0.0);
    (params.duty_base + params.duty_slope * speed)
        .clamp(params.duty_min, params.duty_max)
        .clamp(0.05, 0.95)
}

/// Stride length of `params` at `speed` (m).
#[must_use]
pub fn stride_length(params: &GaitParams, speed: f64) -> f64 {
    (params.stride_base + params.stride_slope * speed.max(0.0)).min(params.stride_max)
}

/// Authored cycle frequency of `params` at `speed` (Hz).
#[must_use]
pub fn authored_frequency(params: &GaitParams, speed: f64) -> f64 {
    params.frequency_base + params.frequency_slope * speed.max(0.0)
}

/// Cycle frequency: the mean of the authored curve and the kinematic
/// estimate `speed / stride`.
#[must_use]
pub fn cycle_frequency(params: &GaitParams, speed: f64) -> f64 {
    let speed = speed.max(0.0);
    let stride = stride_length(params, speed).max(EPSILON);
    0.5 * (authored_frequency(params, speed) + speed / stride)
}

/// Stance weight of a leg at `phase` for a duty factor `duty`.
///
/// Stance occupies `[0, duty)`. Both edges are smoothstep-feathered over
/// `feather` phase units; the half-width is capped so the feathers never
/// overlap. The split point between the two edges sits in the middle of
/// swing, where both smoothsteps are saturated, so the function is
/// continuous on the whole circle.
///
/// ```
/// use lope::gait::stance_alpha;
/// let before_wrap = stance_alpha(0.999_999, 0.5, 0.12);
/// let after_wrap = stance_alpha(0.0, 0.5, 0.12);
/// assert!((before_wrap - after_wrap).abs() < 1e-3);
/// ```
#[must_use]
pub fn stance_alpha(phase: f64, duty: f64, feather: f64) -> f64 {
    let duty = duty.clamp(0.05, 0.95);
    let half = (feather * 0.5)
        .min(0.45 * (1.0 - duty))
        .min(0.45 * duty)
        .max(0.0);
    let p = wrap01(phase);
    let split = 0.5 * (duty + 1.0);
    let q = if p < split { p } else { p - 1.0 };
    let rise = smoothstep(-half, half, q);
    let fall = smoothstep(duty - half, duty + half, q);
    clamp01(rise * (1.0 - fall))
}

/// Progress through swing in `[0, 1]`; `0` throughout stance.
#[must_use]
pub fn swing_progress(phase: f64, duty: f64) -> f64 {
    let p = wrap01(phase);
    if p < duty || duty >= 1.0 {
        0.0
    } else {
        clamp01((p - duty) / (1.0 - duty))
    }
}

/// Chooses a gait from speed with hysteresis.
///
/// Upward switches need the upper threshold, downward switches the lower
/// one, so a speed dwelling between them keeps the current gait.
#[must_use]
pub fn select_gait(current: Gait, speed: f64, alertness: f64, t: &GaitThresholds) -> Gait {
    match current {
        Gait::Prowl => {
            if speed > t.prowl_to_walk {
                Gait::Walk
            } else {
                Gait::Prowl
            }
        }
        Gait::Walk => {
            if speed > t.walk_to_trot {
                Gait::Trot
            } else if speed < t.walk_to_prowl && alertness >= t.prowl_alertness {
                Gait::Prowl
            } else {
                Gait::Walk
            }
        }
        Gait::Trot => {
            if speed > t.trot_to_gallop {
                Gait::Gallop
            } else if speed < t.trot_to_walk {
                Gait::Walk
            } else {
                Gait::Trot
            }
        }
        Gait::Gallop => {
            if speed < t.gallop_to_trot {
                Gait::Trot
            } else {
                Gait::Gallop
            }
        }
    }
}

/// Cadence multiplier of an emotional state.
#[must_use]
pub const fn emotion_frequency_multiplier(emotion: EmotionalState) -> f64 {
    match emotion {
        EmotionalState::Calm | EmotionalState::Confident => 1.0,
        EmotionalState::Aggressive => 1.1,
        EmotionalState::Fearful => 1.15,
        EmotionalState::Desperate => 1.2,
        EmotionalState::Frustrated => 1.05,
    }
}

/// Cadence multiplier of a terrain class.
#[must_use]
pub const fn terrain_frequency_multiplier(terrain: TerrainType) -> f64 {
    match terrain {
        TerrainType::Open => 1.0,
        TerrainType::Forest => 0.95,
        TerrainType::Rocky => 0.9,
        TerrainType::Snow => 0.85,
        TerrainType::Ice | TerrainType::Mud => 0.8,
    }
}

const fn role_sync_weight(role: PackRole) -> f64 {
    match role {
        PackRole::Leader => 0.0,
        PackRole::Bruiser => 0.6,
        PackRole::Skirmisher => 0.8,
        PackRole::Support => 1.0,
        PackRole::Scout => 0.5,
    }
}

/// Bounded phase offset that loosely entrains a creature to its pack.
///
/// Zero for lone creatures and for the leader, who sets the rhythm.
#[must_use]
pub fn pack_phase_offset(inputs: &LocomotionInputs, config: &GaitConfig) -> f64 {
    if inputs.pack_size < 2.0 {
        return 0.0;
    }
    let size = inputs.pack_size.min(6.0) / 6.0;
    let falloff = 1.0 / (1.0 + inputs.leader_distance.max(0.0) / 10.0);
    let pull = phase_delta(0.0, inputs.sync_phase);
    let offset = inputs.coordination
        * role_sync_weight(inputs.pack_role)
        * size
        * config.pack_offset_gain
        * pull
        * falloff;
    offset.clamp(-config.pack_offset_limit, config.pack_offset_limit)
}

fn slope_multiplier(inputs: &LocomotionInputs) -> f64 {
    (1.0 - 0.5 * (1.0 - inputs.slope_normal.z)).clamp(0.7, 1.0)
}

/// Whether `component` picks its own gait from speed and alertness.
#[must_use]
pub const fn auto_selecting(component: &LocomotionComponent) -> bool {
    component.config.gait.auto_select || component.inputs.auto_gait
}

/// The gait the creature is running: the requested one, or under
/// auto-selection the one picked on the previous step.
#[must_use]
pub const fn running_gait(component: &LocomotionComponent) -> Gait {
    if auto_selecting(component) {
        component.gait.gait
    } else {
        component.inputs.gait
    }
}

/// Advances the gait of `component` by `dt` seconds.
///
/// `auto_switched` only ever gets set here; the tick clears it once per
/// frame so a switch in any sub-step is still reported.
pub fn advance(component: &mut LocomotionComponent, dt: f64) {
    let auto = auto_selecting(component);
    let inputs = &component.inputs;
    let config = &component.config.gait;
    let gait = &mut component.gait;
    let speed = inputs.speed.max(0.0);

    let requested = if auto {
        let selected = select_gait(gait.gait, speed, inputs.alertness, &config.thresholds);
        gait.auto_switched |= selected != gait.gait;
        selected
    } else {
        inputs.gait
    };
    if requested != gait.gait {
        debug!("gait {:?} -> {:?} at {speed:.2} m/s", gait.gait, requested);
        gait.gait = requested;
    }

    let params = config.params(gait.gait);
    gait.duty = duty_factor(params, speed);
    gait.stride = stride_length(params, speed);
    let moving = smoothstep(0.0, FULL_GAIT_SPEED, speed);
    gait.frequency = cycle_frequency(params, speed)
        * emotion_frequency_multiplier(inputs.emotion)
        * terrain_frequency_multiplier(inputs.terrain)
        * slope_multiplier(inputs)
        * (1.0 - 0.2 * inputs.fatigue)
        * moving;
    gait.pack_offset = pack_phase_offset(inputs, config);

    advance_phases(gait, params, config, dt);
    let (duty, feather) = (gait.duty, config.feather);
    for (alpha, phase) in gait.stance_alpha.iter_mut().zip(gait.phases) {
        *alpha = lerp(1.0, stance_alpha(phase, duty, feather), moving);
    }
}

fn advance_phases(gait: &mut GaitState, params: &GaitParams, config: &GaitConfig, dt: f64) {
    let dt = dt.max(0.0);
    gait.master_phase = wrap01(gait.master_phase + gait.frequency * dt);
    let glide = smoothing_factor(config.offset_convergence_rate, dt);
    for ((offset, phase), target) in gait
        .offsets
        .iter_mut()
        .zip(gait.phases.iter_mut())
        .zip(params.phase_offsets)
    {
        *offset = wrap01(*offset + phase_delta(*offset, target) * glide);
        *phase = wrap01(gait.master_phase + *offset + gait.pack_offset + gait.phase_shift);
    }
}
