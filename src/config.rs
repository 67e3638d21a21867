//! Tuning parameters for the kinematic pipeline and the physics body.
//!
//! Every struct deserialises with `#[serde(default)]`, so a JSON document only
//! needs to name the values it overrides:
//!
//! ```
//! use lope::config::LocomotionConfig;
//! let config = LocomotionConfig::from_json_str(r#"{ "body": { "pelvis_offset": 0.6 } }"#)
//!     .expect("valid config");
//! assert!((config.body.pelvis_offset - 0.6).abs() < 1e-12);
//! assert!((config.ik.foot_stiffness - 400.0).abs() < 1e-12);
//! ```
use std::ops::RangeInclusive;

use glam::{DVec2, DVec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ANTI_SLIP_THRESHOLD, GRAVITY, IDLE_SPEED, LIMIT_SOLVER_PASSES, MAX_FRAME_DT, MAX_SUBSTEPS,
    PELVIS_OFFSET, PHYSICS_DT, STANCE_FEATHER,
};
use crate::error::ConfigError;
use crate::types::Gait;

fn check_range(field: &str, value: f64, range: RangeInclusive<f64>) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::invalid(field, "must be finite"));
    }
    if !range.contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!(
                "{value} is outside [{}, {}]",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("{value} must be finite and > 0"),
        ));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("{value} must be finite and >= 0"),
        ));
    }
    Ok(())
}

/// Phase, duty-factor, stride and frequency curves for one gait.
///
/// The curves are linear in speed and clamped: `duty = clamp(duty_base +
/// duty_slope·speed, duty_min, duty_max)`, `stride = min(stride_base +
/// stride_slope·speed, stride_max)`, `frequency = frequency_base +
/// frequency_slope·speed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitParams {
    /// Phase offset per leg (LF, RF, LH, RH) relative to the master phase.
    pub phase_offsets: [f64; 4],
    /// Duty factor at zero speed.
    pub duty_base: f64,
    /// Duty factor change per m/s.
    pub duty_slope: f64,
    /// Lower duty clamp.
    pub duty_min: f64,
    /// Upper duty clamp.
    pub duty_max: f64,
    /// Stride length at zero speed (m).
    pub stride_base: f64,
    /// Stride length gain per m/s.
    pub stride_slope: f64,
    /// Longest stride (m).
    pub stride_max: f64,
    /// Authored cycle frequency at zero speed (Hz).
    pub frequency_base: f64,
    /// Authored frequency gain per m/s.
    pub frequency_slope: f64,
}

impl GaitParams {
    /// Four-beat walk.
    #[must_use]
    pub const fn walk() -> Self {
        Self {
            phase_offsets: [0.0, 0.5, 0.75, 0.25],
            duty_base: 0.75,
            duty_slope: -0.05,
            duty_min: 0.6,
            duty_max: 0.8,
            stride_base: 0.35,
            stride_slope: 0.25,
            stride_max: 0.8,
            frequency_base: 1.2,
            frequency_slope: 0.4,
        }
    }

    /// Diagonal trot.
    #[must_use]
    pub const fn trot() -> Self {
        Self {
            phase_offsets: [0.0, 0.5, 0.5, 0.0],
            duty_base: 0.6,
            duty_slope: -0.05,
            duty_min: 0.4,
            duty_max: 0.65,
            stride_base: 0.5,
            stride_slope: 0.22,
            stride_max: 1.2,
            frequency_base: 1.6,
            frequency_slope: 0.35,
        }
    }

    /// Rotary gallop.
    #[must_use]
    pub const fn gallop() -> Self {
        Self {
            phase_offsets: [0.5, 0.6, 0.0, 0.1],
            duty_base: 0.4,
            duty_slope: -0.02,
            duty_min: 0.25,
            duty_max: 0.45,
            stride_base: 0.9,
            stride_slope: 0.2,
            stride_max: 2.2,
            frequency_base: 2.2,
            frequency_slope: 0.25,
        }
    }

    /// Stalking walk with long ground contact.
    #[must_use]
    pub const fn prowl() -> Self {
        Self {
            phase_offsets: [0.0, 0.5, 0.75, 0.25],
            duty_base: 0.85,
            duty_slope: -0.05,
            duty_min: 0.75,
            duty_max: 0.9,
            stride_base: 0.22,
            stride_slope: 0.2,
            stride_max: 0.5,
            frequency_base: 0.8,
            frequency_slope: 0.4,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        for (i, offset) in self.phase_offsets.iter().enumerate() {
            check_range(&format!("gait.{name}.phase_offsets[{i}]"), *offset, 0.0..=1.0)?;
        }
        check_range(&format!("gait.{name}.duty_min"), self.duty_min, 0.05..=0.95)?;
        check_range(&format!("gait.{name}.duty_max"), self.duty_max, 0.05..=0.95)?;
        if self.duty_min > self.duty_max {
            return Err(ConfigError::invalid(
                format!("gait.{name}.duty_min"),
                "must not exceed duty_max",
            ));
        }
        check_range(&format!("gait.{name}.duty_base"), self.duty_base, 0.0..=1.0)?;
        check_range(&format!("gait.{name}.duty_slope"), self.duty_slope, -1.0..=1.0)?;
        check_positive(&format!("gait.{name}.stride_base"), self.stride_base)?;
        check_non_negative(&format!("gait.{name}.stride_slope"), self.stride_slope)?;
        check_positive(&format!("gait.{name}.stride_max"), self.stride_max)?;
        check_positive(&format!("gait.{name}.frequency_base"), self.frequency_base)?;
        check_non_negative(&format!("gait.{name}.frequency_slope"), self.frequency_slope)
    }
}

impl Default for GaitParams {
    fn default() -> Self {
        Self::walk()
    }
}

/// Speed thresholds for automatic gait selection.
///
/// Each upward threshold sits above its downward counterpart; the gap is the
/// hysteresis band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitThresholds {
    /// Prowl switches to Walk above this speed.
    pub prowl_to_walk: f64,
    /// Walk drops to Prowl below this speed when alert.
    pub walk_to_prowl: f64,
    /// Alertness needed for Walk to drop into Prowl.
    pub prowl_alertness: f64,
    /// Walk switches to Trot above this speed.
    pub walk_to_trot: f64,
    /// Trot drops to Walk below this speed.
    pub trot_to_walk: f64,
    /// Trot switches to Gallop above this speed.
    pub trot_to_gallop: f64,
    /// Gallop drops to Trot below this speed.
    pub gallop_to_trot: f64,
}

impl Default for GaitThresholds {
    fn default() -> Self {
        Self {
            prowl_to_walk: 0.7,
            walk_to_prowl: 0.5,
            prowl_alertness: 0.6,
            walk_to_trot: 1.6,
            trot_to_walk: 1.3,
            trot_to_gallop: 4.0,
            gallop_to_trot: 3.4,
        }
    }
}

/// Gait engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    /// Walk curves.
    pub walk: GaitParams,
    /// Trot curves.
    pub trot: GaitParams,
    /// Gallop curves.
    pub gallop: GaitParams,
    /// Prowl curves.
    pub prowl: GaitParams,
    /// Width of the stance/swing feather in phase units.
    pub feather: f64,
    /// Rate (1/s) at which leg offsets glide to a new gait's offsets.
    pub offset_convergence_rate: f64,
    /// Select the gait from speed instead of the input gait.
    pub auto_select: bool,
    /// Auto-selection thresholds.
    pub thresholds: GaitThresholds,
    /// Scale of the pack synchronisation offset.
    pub pack_offset_gain: f64,
    /// Largest pack synchronisation offset in phase units.
    pub pack_offset_limit: f64,
}

impl GaitConfig {
    /// Curves for `gait`.
    #[must_use]
    pub const fn params(&self, gait: Gait) -> &GaitParams {
        match gait {
            Gait::Walk => &self.walk,
            Gait::Trot => &self.trot,
            Gait::Gallop => &self.gallop,
            Gait::Prowl => &self.prowl,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.walk.validate("walk")?;
        self.trot.validate("trot")?;
        self.gallop.validate("gallop")?;
        self.prowl.validate("prowl")?;
        check_range("gait.feather", self.feather, 0.0..=0.3)?;
        check_non_negative("gait.offset_convergence_rate", self.offset_convergence_rate)?;
        check_non_negative("gait.pack_offset_gain", self.pack_offset_gain)?;
        check_range("gait.pack_offset_limit", self.pack_offset_limit, 0.0..=0.5)?;
        let t = &self.thresholds;
        if t.walk_to_prowl >= t.prowl_to_walk
            || t.trot_to_walk >= t.walk_to_trot
            || t.gallop_to_trot >= t.trot_to_gallop
        {
            return Err(ConfigError::invalid(
                "gait.thresholds",
                "every downward threshold must sit below its upward threshold",
            ));
        }
        Ok(())
    }
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            walk: GaitParams::walk(),
            trot: GaitParams::trot(),
            gallop: GaitParams::gallop(),
            prowl: GaitParams::prowl(),
            feather: STANCE_FEATHER,
            offset_convergence_rate: 4.0,
            auto_select: false,
            thresholds: GaitThresholds::default(),
            pack_offset_gain: 0.25,
            pack_offset_limit: 0.15,
        }
    }
}

/// Locomotion state selector configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Below this speed the creature counts as standing.
    pub idle_speed: f64,
    /// Alertness above which a standing creature is combat-ready.
    pub alertness_threshold: f64,
    /// Threshold shift while Aggressive (negative lowers it).
    pub aggressive_shift: f64,
    /// Threshold shift while Fearful.
    pub fearful_shift: f64,
    /// Upper speed bound of the Walk band.
    pub walk_max_speed: f64,
    /// Upper speed bound of the Trot band.
    pub trot_max_speed: f64,
    /// Half-width of the hysteresis band around each speed boundary.
    pub speed_hysteresis: f64,
    /// Morale below which open terrain downgrades the state.
    pub low_morale: f64,
    /// Nominal blend duration (s).
    pub blend_base: f64,
    /// Shortest blend (s).
    pub blend_min: f64,
    /// Longest blend (s).
    pub blend_max: f64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            idle_speed: IDLE_SPEED,
            alertness_threshold: 0.5,
            aggressive_shift: -0.2,
            fearful_shift: 0.2,
            walk_max_speed: 1.5,
            trot_max_speed: 4.0,
            speed_hysteresis: 0.1,
            low_morale: 0.3,
            blend_base: 0.18,
            blend_min: 0.08,
            blend_max: 0.30,
        }
    }
}

impl StateConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("state.idle_speed", self.idle_speed)?;
        check_range("state.alertness_threshold", self.alertness_threshold, 0.0..=1.0)?;
        check_range("state.aggressive_shift", self.aggressive_shift, -1.0..=1.0)?;
        check_range("state.fearful_shift", self.fearful_shift, -1.0..=1.0)?;
        check_positive("state.walk_max_speed", self.walk_max_speed)?;
        check_positive("state.trot_max_speed", self.trot_max_speed)?;
        if self.walk_max_speed >= self.trot_max_speed {
            return Err(ConfigError::invalid(
                "state.walk_max_speed",
                "must be below trot_max_speed",
            ));
        }
        check_non_negative("state.speed_hysteresis", self.speed_hysteresis)?;
        check_range("state.low_morale", self.low_morale, 0.0..=1.0)?;
        check_positive("state.blend_base", self.blend_base)?;
        check_positive("state.blend_min", self.blend_min)?;
        check_positive("state.blend_max", self.blend_max)?;
        if self.blend_min > self.blend_max {
            return Err(ConfigError::invalid(
                "state.blend_min",
                "must not exceed blend_max",
            ));
        }
        Ok(())
    }
}

/// Foot lock, spring and swing-arc parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkParams {
    /// Stance alpha above which a leg is planted.
    pub stance_threshold: f64,
    /// Rate (1/s) at which a lock slides toward the refined target.
    pub lock_smoothing: f64,
    /// Lock drift (m) that triggers a re-grip.
    pub anti_slip_threshold: f64,
    /// Fraction of the drift removed by a re-grip.
    pub anti_slip_blend: f64,
    /// Speed (m/s) a re-gripping lock slides at, on top of the ground speed.
    pub regrip_speed: f64,
    /// Vertical foot spring stiffness (1/s²).
    pub foot_stiffness: f64,
    /// Vertical foot spring damping (1/s).
    pub foot_damping: f64,
    /// Rate (1/s) at which a swinging foot approaches its target.
    pub swing_rate: f64,
    /// Swing arc height at zero speed (m).
    pub swing_base_height: f64,
    /// Swing arc height gained per m/s.
    pub swing_speed_gain: f64,
    /// Extra clearance added to every arc (m).
    pub swing_clearance: f64,
    /// Extension lost at the top of the arc.
    pub swing_flexion: f64,
}

impl Default for IkParams {
    fn default() -> Self {
        Self {
            stance_threshold: 0.5,
            lock_smoothing: 3.0,
            anti_slip_threshold: ANTI_SLIP_THRESHOLD,
            anti_slip_blend: 0.5,
            regrip_speed: 1.5,
            foot_stiffness: 400.0,
            foot_damping: 40.0,
            swing_rate: 12.0,
            swing_base_height: 0.06,
            swing_speed_gain: 0.02,
            swing_clearance: 0.02,
            swing_flexion: 0.4,
        }
    }
}

impl IkParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("ik.stance_threshold", self.stance_threshold, 0.0..=1.0)?;
        check_non_negative("ik.lock_smoothing", self.lock_smoothing)?;
        check_positive("ik.anti_slip_threshold", self.anti_slip_threshold)?;
        check_range("ik.anti_slip_blend", self.anti_slip_blend, 0.0..=1.0)?;
        check_positive("ik.regrip_speed", self.regrip_speed)?;
        check_non_negative("ik.foot_stiffness", self.foot_stiffness)?;
        check_non_negative("ik.foot_damping", self.foot_damping)?;
        check_non_negative("ik.swing_rate", self.swing_rate)?;
        check_non_negative("ik.swing_base_height", self.swing_base_height)?;
        check_non_negative("ik.swing_speed_gain", self.swing_speed_gain)?;
        check_non_negative("ik.swing_clearance", self.swing_clearance)?;
        check_range("ik.swing_flexion", self.swing_flexion, 0.0..=1.0)
    }
}

/// Exponential smoothing rates (1/s) for joint channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Root yaw toward the travel heading.
    pub root_yaw: f64,
    /// Root pitch.
    pub root_pitch: f64,
    /// Centre-of-mass correction.
    pub com: f64,
    /// Spine curve.
    pub spine: f64,
    /// Neck yaw and pitch, before the alertness boost.
    pub neck: f64,
    /// Head yaw and pitch, before the alertness boost.
    pub head: f64,
    /// Tail pitch.
    pub tail: f64,
    /// Ears.
    pub ears: f64,
    /// Body stretch.
    pub stretch: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            root_yaw: 8.0,
            root_pitch: 6.0,
            com: 4.0,
            spine: 6.0,
            neck: 6.0,
            head: 8.0,
            tail: 5.0,
            ears: 10.0,
            stretch: 4.0,
        }
    }
}

impl FilterParams {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("filter.root_yaw", self.root_yaw),
            ("filter.root_pitch", self.root_pitch),
            ("filter.com", self.com),
            ("filter.spine", self.spine),
            ("filter.neck", self.neck),
            ("filter.head", self.head),
            ("filter.tail", self.tail),
            ("filter.ears", self.ears),
            ("filter.stretch", self.stretch),
        ] {
            check_non_negative(field, value)?;
        }
        Ok(())
    }
}

/// Body proportions and stabiliser gains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    /// Height of the pelvis above the averaged foot height (m).
    pub pelvis_offset: f64,
    /// Root height spring stiffness (1/s²).
    pub root_stiffness: f64,
    /// Root height spring damping (1/s).
    pub root_damping: f64,
    /// Pitch per metre of fore/hind foot height difference.
    pub pitch_gain: f64,
    /// Largest root pitch (rad).
    pub max_pitch: f64,
    /// Turn lean per (rad/s · m/s).
    pub lean_gain: f64,
    /// Largest turn lean (rad).
    pub max_lean: f64,
    /// Fraction of the foot-centroid offset applied to the root.
    pub com_gain: f64,
    /// Largest centre-of-mass correction (m).
    pub com_max: f64,
    /// Anatomical foot offsets in the body frame (LF, RF, LH, RH).
    pub foot_offsets: [DVec2; 4],
    /// Lateral splay of a swinging foot (m).
    pub lateral_splay: f64,
    /// Speed above which the head looks along the velocity.
    pub look_speed: f64,
    /// Share of the look yaw taken by the neck.
    pub neck_yaw_share: f64,
    /// Neck yaw clamp (rad).
    pub neck_yaw_limit: f64,
    /// Share of the look yaw taken by the head.
    pub head_yaw_share: f64,
    /// Head yaw clamp (rad).
    pub head_yaw_limit: f64,
    /// Neck pitch clamp (rad).
    pub neck_pitch_limit: f64,
    /// Head pitch clamp (rad).
    pub head_pitch_limit: f64,
    /// Fraction of root pitch cancelled by the head.
    pub head_stabilization: f64,
    /// Spine bend per rad/s of turn rate.
    pub spine_turn_gain: f64,
    /// Largest spine bend from turning (rad).
    pub spine_turn_limit: f64,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            pelvis_offset: PELVIS_OFFSET,
            root_stiffness: 120.0,
            root_damping: 22.0,
            pitch_gain: 1.2,
            max_pitch: 0.35,
            lean_gain: 0.08,
            max_lean: 0.25,
            com_gain: 0.3,
            com_max: 0.15,
            foot_offsets: [
                DVec2::new(0.45, 0.16),
                DVec2::new(0.45, -0.16),
                DVec2::new(-0.45, 0.14),
                DVec2::new(-0.45, -0.14),
            ],
            lateral_splay: 0.015,
            look_speed: 0.3,
            neck_yaw_share: 0.6,
            neck_yaw_limit: 0.7,
            head_yaw_share: 0.4,
            head_yaw_limit: 0.5,
            neck_pitch_limit: 0.6,
            head_pitch_limit: 0.5,
            head_stabilization: 0.8,
            spine_turn_gain: 0.08,
            spine_turn_limit: 0.2,
        }
    }
}

impl BodyParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive("body.pelvis_offset", self.pelvis_offset)?;
        check_non_negative("body.root_stiffness", self.root_stiffness)?;
        check_non_negative("body.root_damping", self.root_damping)?;
        check_non_negative("body.pitch_gain", self.pitch_gain)?;
        check_range("body.max_pitch", self.max_pitch, 0.0..=1.5)?;
        check_non_negative("body.lean_gain", self.lean_gain)?;
        check_range("body.max_lean", self.max_lean, 0.0..=1.5)?;
        check_range("body.com_gain", self.com_gain, 0.0..=1.0)?;
        check_non_negative("body.com_max", self.com_max)?;
        if !self.foot_offsets.iter().all(|o| o.is_finite()) {
            return Err(ConfigError::invalid("body.foot_offsets", "must be finite"));
        }
        check_non_negative("body.lateral_splay", self.lateral_splay)?;
        check_non_negative("body.look_speed", self.look_speed)?;
        check_range("body.neck_yaw_share", self.neck_yaw_share, 0.0..=1.0)?;
        check_range("body.head_yaw_share", self.head_yaw_share, 0.0..=1.0)?;
        check_non_negative("body.neck_yaw_limit", self.neck_yaw_limit)?;
        check_non_negative("body.head_yaw_limit", self.head_yaw_limit)?;
        check_non_negative("body.neck_pitch_limit", self.neck_pitch_limit)?;
        check_non_negative("body.head_pitch_limit", self.head_pitch_limit)?;
        check_range("body.head_stabilization", self.head_stabilization, 0.0..=1.0)?;
        check_non_negative("body.spine_turn_gain", self.spine_turn_gain)?;
        check_non_negative("body.spine_turn_limit", self.spine_turn_limit)
    }
}

/// Tail, ear, breathing and fur parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryParams {
    /// Tail yaw spring stiffness (1/s²).
    pub tail_stiffness: f64,
    /// Tail yaw spring damping (1/s).
    pub tail_damping: f64,
    /// Tail yaw swing opposite the turn, per rad/s.
    pub tail_turn_gain: f64,
    /// Ear jitter amplitude (rad) for an unintelligent creature.
    pub ear_jitter: f64,
    /// Resting breathing frequency (Hz).
    pub breath_frequency: f64,
    /// Breathing frequency gained per m/s.
    pub breath_speed_frequency: f64,
    /// Resting breathing depth.
    pub breath_depth: f64,
    /// Breathing depth gained per m/s.
    pub breath_speed_depth: f64,
    /// Fur jitter amplitude.
    pub fur_amplitude: f64,
    /// Amplitude of the shared pack sway.
    pub pack_sync_amplitude: f64,
    /// Frequency of the shared pack sway (Hz).
    pub pack_sync_frequency: f64,
}

impl Default for SecondaryParams {
    fn default() -> Self {
        Self {
            tail_stiffness: 60.0,
            tail_damping: 8.0,
            tail_turn_gain: 0.3,
            ear_jitter: 0.05,
            breath_frequency: 0.35,
            breath_speed_frequency: 0.2,
            breath_depth: 0.02,
            breath_speed_depth: 0.01,
            fur_amplitude: 0.02,
            pack_sync_amplitude: 0.005,
            pack_sync_frequency: 0.1,
        }
    }
}

impl SecondaryParams {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("secondary.tail_stiffness", self.tail_stiffness),
            ("secondary.tail_damping", self.tail_damping),
            ("secondary.tail_turn_gain", self.tail_turn_gain),
            ("secondary.ear_jitter", self.ear_jitter),
            ("secondary.breath_frequency", self.breath_frequency),
            ("secondary.breath_speed_frequency", self.breath_speed_frequency),
            ("secondary.breath_depth", self.breath_depth),
            ("secondary.breath_speed_depth", self.breath_speed_depth),
            ("secondary.fur_amplitude", self.fur_amplitude),
            ("secondary.pack_sync_amplitude", self.pack_sync_amplitude),
            ("secondary.pack_sync_frequency", self.pack_sync_frequency),
        ] {
            check_non_negative(field, value)?;
        }
        Ok(())
    }
}

/// Timing and amplitude of the action overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionParams {
    /// Length of one bite cycle (s).
    pub bite_cycle: f64,
    /// Aggression above which bites snap the head.
    pub head_snap_aggression: f64,
    /// Head snap amplitude (rad).
    pub head_snap_amplitude: f64,
    /// Longest pounce charge (s).
    pub pounce_max_charge: f64,
    /// Spine compression at full charge (rad).
    pub pounce_spine: f64,
    /// Body stretch at full charge.
    pub pounce_crouch: f64,
    /// Length of the release pulse (s).
    pub pounce_release: f64,
    /// Spine extension at the peak of the release pulse (rad).
    pub pounce_release_amplitude: f64,
    /// Howl ramp-in time (s).
    pub howl_ramp: f64,
    /// Howl jaw oscillation frequency (Hz).
    pub howl_frequency: f64,
    /// Mean howl jaw opening.
    pub howl_jaw: f64,
    /// Howl jaw oscillation amplitude.
    pub howl_jaw_wobble: f64,
    /// Howl neck pitch (rad).
    pub howl_neck: f64,
    /// Howl neck pitch for pack leaders (rad).
    pub howl_leader_neck: f64,
    /// Nominal stun duration (s).
    pub stun_base: f64,
    /// Shortest stun (s).
    pub stun_min: f64,
    /// Longest stun (s).
    pub stun_max: f64,
}

impl Default for ActionParams {
    fn default() -> Self {
        Self {
            bite_cycle: 0.35,
            head_snap_aggression: 0.7,
            head_snap_amplitude: 0.15,
            pounce_max_charge: 1.2,
            pounce_spine: 0.35,
            pounce_crouch: 0.7,
            pounce_release: 0.25,
            pounce_release_amplitude: 0.3,
            howl_ramp: 0.2,
            howl_frequency: 2.5,
            howl_jaw: 0.6,
            howl_jaw_wobble: 0.25,
            howl_neck: 0.6,
            howl_leader_neck: 0.85,
            stun_base: 1.2,
            stun_min: 0.4,
            stun_max: 2.5,
        }
    }
}

impl ActionParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive("action.bite_cycle", self.bite_cycle)?;
        check_range("action.head_snap_aggression", self.head_snap_aggression, 0.0..=1.0)?;
        check_non_negative("action.head_snap_amplitude", self.head_snap_amplitude)?;
        check_positive("action.pounce_max_charge", self.pounce_max_charge)?;
        check_non_negative("action.pounce_spine", self.pounce_spine)?;
        check_range("action.pounce_crouch", self.pounce_crouch, 0.1..=1.0)?;
        check_positive("action.pounce_release", self.pounce_release)?;
        check_non_negative("action.pounce_release_amplitude", self.pounce_release_amplitude)?;
        check_positive("action.howl_ramp", self.howl_ramp)?;
        check_non_negative("action.howl_frequency", self.howl_frequency)?;
        check_range("action.howl_jaw", self.howl_jaw, 0.0..=1.0)?;
        check_range("action.howl_jaw_wobble", self.howl_jaw_wobble, 0.0..=1.0)?;
        check_non_negative("action.howl_neck", self.howl_neck)?;
        check_non_negative("action.howl_leader_neck", self.howl_leader_neck)?;
        check_positive("action.stun_base", self.stun_base)?;
        check_positive("action.stun_min", self.stun_min)?;
        check_positive("action.stun_max", self.stun_max)?;
        if self.stun_min > self.stun_max {
            return Err(ConfigError::invalid(
                "action.stun_min",
                "must not exceed stun_max",
            ));
        }
        Ok(())
    }
}

/// Foothold sampling and scoring weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Radius of the candidate ring (m).
    pub sample_radius: f64,
    /// Weight of the slope term `1 - normal.z`.
    pub slope_weight: f64,
    /// Weight of the planar distance from the nominal target.
    pub offset_weight: f64,
    /// Weight of the height change from the current lock.
    pub height_weight: f64,
    /// Bonus per unit candidate weight.
    pub candidate_weight: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            sample_radius: 0.08,
            slope_weight: 2.0,
            offset_weight: 1.0,
            height_weight: 0.5,
            candidate_weight: 0.2,
        }
    }
}

impl TerrainParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("terrain.sample_radius", self.sample_radius)?;
        check_non_negative("terrain.slope_weight", self.slope_weight)?;
        check_non_negative("terrain.offset_weight", self.offset_weight)?;
        check_non_negative("terrain.height_weight", self.height_weight)?;
        check_non_negative("terrain.candidate_weight", self.candidate_weight)
    }
}

/// Complete configuration of the kinematic pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Gait engine.
    pub gait: GaitConfig,
    /// State selector.
    pub state: StateConfig,
    /// Foot IK.
    pub ik: IkParams,
    /// Smoothing rates.
    pub filter: FilterParams,
    /// Root stabiliser and posture.
    pub body: BodyParams,
    /// Secondary motion.
    pub secondary: SecondaryParams,
    /// Action overlays.
    pub action: ActionParams,
    /// Foothold refinement.
    pub terrain: TerrainParams,
}

impl LocomotionConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().inspect_err(|e| warn!("{e}"))?;
        Ok(config)
    }

    /// Checks every value for finiteness and range.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gait.validate()?;
        self.state.validate()?;
        self.ik.validate()?;
        self.filter.validate()?;
        self.body.validate()?;
        self.secondary.validate()?;
        self.action.validate()?;
        self.terrain.validate()
    }
}

/// Masses (kg) of the physics segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentMasses {
    /// Head.
    pub head: f64,
    /// Neck.
    pub neck: f64,
    /// Torso (chest and shoulders).
    pub torso: f64,
    /// Pelvis.
    pub pelvis: f64,
    /// Each leg, lumped at the paw.
    pub leg: f64,
}

impl Default for SegmentMasses {
    fn default() -> Self {
        Self {
            head: 3.5,
            neck: 2.5,
            torso: 16.0,
            pelvis: 8.0,
            leg: 2.5,
        }
    }
}

/// Lengths, radii and attachment offsets of the physics body (m).
///
/// Offsets are expressed in the parent segment's frame (`+x` forward, `+y`
/// left, `+z` up).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyGeometry {
    /// Upper leg bone.
    pub upper_leg: f64,
    /// Lower leg bone.
    pub lower_leg: f64,
    /// Leg capsule radius.
    pub leg_radius: f64,
    /// Torso capsule length.
    pub torso_length: f64,
    /// Torso capsule radius.
    pub torso_radius: f64,
    /// Pelvis capsule length.
    pub pelvis_length: f64,
    /// Pelvis capsule radius.
    pub pelvis_radius: f64,
    /// Neck capsule length.
    pub neck_length: f64,
    /// Neck capsule radius.
    pub neck_radius: f64,
    /// Head capsule length.
    pub head_length: f64,
    /// Head capsule radius.
    pub head_radius: f64,
    /// Pelvis centre relative to the torso.
    pub pelvis_attach: DVec3,
    /// Neck centre relative to the torso.
    pub neck_attach: DVec3,
    /// Head centre relative to the neck.
    pub head_attach: DVec3,
    /// Left fore shoulder relative to the torso (mirrored for the right).
    pub fore_anchor: DVec3,
    /// Left hind hip relative to the pelvis (mirrored for the right).
    pub hind_anchor: DVec3,
}

impl Default for BodyGeometry {
    fn default() -> Self {
        Self {
            upper_leg: 0.3,
            lower_leg: 0.28,
            leg_radius: 0.04,
            torso_length: 0.6,
            torso_radius: 0.15,
            pelvis_length: 0.3,
            pelvis_radius: 0.13,
            neck_length: 0.25,
            neck_radius: 0.07,
            head_length: 0.25,
            head_radius: 0.09,
            pelvis_attach: DVec3::new(-0.3, 0.0, 0.0),
            neck_attach: DVec3::new(0.35, 0.0, 0.1),
            head_attach: DVec3::new(0.2, 0.0, 0.05),
            fore_anchor: DVec3::new(0.45, 0.16, 0.0),
            hind_anchor: DVec3::new(-0.15, 0.14, 0.0),
        }
    }
}

/// Proportional and derivative gains with a force clamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdGains {
    /// Proportional gain.
    pub kp: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Largest absolute output.
    pub limit: f64,
}

impl PdGains {
    /// Gains with the given values.
    #[must_use]
    pub const fn new(kp: f64, kd: f64, limit: f64) -> Self {
        Self { kp, kd, limit }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        check_non_negative(&format!("{field}.kp"), self.kp)?;
        check_non_negative(&format!("{field}.kd"), self.kd)?;
        check_positive(&format!("{field}.limit"), self.limit)
    }
}

impl Default for PdGains {
    fn default() -> Self {
        Self::new(200.0, 15.0, 100.0)
    }
}

/// Penalty contact parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactParams {
    /// Normal stiffness (N/m).
    pub stiffness: f64,
    /// Normal damping (N·s/m).
    pub damping: f64,
    /// Coulomb friction coefficient.
    pub friction: f64,
    /// Restitution; scales down the compression damping.
    pub restitution: f64,
    /// Viscous tangential damping before the Coulomb cap (N·s/m).
    pub tangential_damping: f64,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            stiffness: 8000.0,
            damping: 120.0,
            friction: 0.8,
            restitution: 0.1,
            tangential_damping: 200.0,
        }
    }
}

/// First-order activation and fatigue dynamics of the muscle model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuscleParams {
    /// Activation time constant (s).
    pub activation_tau: f64,
    /// Deactivation time constant (s).
    pub deactivation_tau: f64,
    /// Width of the Gaussian force-length curve.
    pub force_length_width: f64,
    /// Fatigue gained per second at full activation.
    pub fatigue_rate: f64,
    /// Fraction of fatigue recovered per second at rest.
    pub recovery_rate: f64,
    /// Normalised length change per radian of joint angle.
    pub length_per_radian: f64,
}

impl Default for MuscleParams {
    fn default() -> Self {
        Self {
            activation_tau: 0.05,
            deactivation_tau: 0.1,
            force_length_width: 0.45,
            fatigue_rate: 0.02,
            recovery_rate: 0.05,
            length_per_radian: 0.25,
        }
    }
}

/// Configuration of the biomechanical physics body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed integration step (s).
    pub fixed_dt: f64,
    /// Longest frame delta accepted by the accumulator (s).
    pub max_frame_dt: f64,
    /// Most fixed steps run per `advance`.
    pub max_substeps: u32,
    /// Joint-limit solver passes per step.
    pub solver_passes: u32,
    /// Fraction of a limit violation removed per pass.
    pub relaxation: f64,
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    /// Quadratic drag coefficient on the torso (N·s²/m²).
    pub air_drag: f64,
    /// Segment masses.
    pub masses: SegmentMasses,
    /// Segment proportions.
    pub geometry: BodyGeometry,
    /// Paw contact.
    pub contact: ContactParams,
    /// Leg spring pulling each paw toward its forward-kinematics point.
    pub leg_spring: PdGains,
    /// Stiffness of the pelvis, neck and head attachments (N/m).
    pub attach_stiffness: f64,
    /// Torso orientation controller (torques).
    pub orientation: PdGains,
    /// Ground-plane tracking of the torso toward the root (forces). Height
    /// comes from the legs.
    pub root_tracking: PdGains,
    /// Spine joint controller.
    pub spine_joint: PdGains,
    /// Neck and head joint controller.
    pub neck_joint: PdGains,
    /// Fore leg joint controller.
    pub fore_leg_joint: PdGains,
    /// Hind leg joint controller.
    pub hind_leg_joint: PdGains,
    /// Largest combined bend of the spine and neck (rad).
    pub chain_bend_limit: f64,
    /// Muscle model.
    pub muscle: MuscleParams,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: PHYSICS_DT,
            max_frame_dt: MAX_FRAME_DT,
            max_substeps: MAX_SUBSTEPS,
            solver_passes: LIMIT_SOLVER_PASSES,
            relaxation: 0.8,
            gravity: GRAVITY,
            air_drag: 0.05,
            masses: SegmentMasses::default(),
            geometry: BodyGeometry::default(),
            contact: ContactParams::default(),
            leg_spring: PdGains::new(3000.0, 150.0, 2000.0),
            attach_stiffness: 4000.0,
            orientation: PdGains::new(40.0, 6.0, 80.0),
            root_tracking: PdGains::new(600.0, 200.0, 1500.0),
            spine_joint: PdGains::new(300.0, 20.0, 120.0),
            neck_joint: PdGains::new(150.0, 10.0, 60.0),
            fore_leg_joint: PdGains::new(250.0, 15.0, 150.0),
            hind_leg_joint: PdGains::new(300.0, 18.0, 180.0),
            chain_bend_limit: 1.2,
            muscle: MuscleParams::default(),
        }
    }
}

impl PhysicsConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().inspect_err(|e| warn!("{e}"))?;
        Ok(config)
    }

    /// Checks every value for finiteness and range.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("physics.fixed_dt", self.fixed_dt, 1e-5..=0.1)?;
        check_positive("physics.max_frame_dt", self.max_frame_dt)?;
        if self.max_substeps == 0 {
            return Err(ConfigError::invalid("physics.max_substeps", "must be >= 1"));
        }
        if self.solver_passes == 0 {
            return Err(ConfigError::invalid("physics.solver_passes", "must be >= 1"));
        }
        check_range("physics.relaxation", self.relaxation, 0.0..=1.0)?;
        check_non_negative("physics.gravity", self.gravity)?;
        check_non_negative("physics.air_drag", self.air_drag)?;
        let m = &self.masses;
        for (field, value) in [
            ("physics.masses.head", m.head),
            ("physics.masses.neck", m.neck),
            ("physics.masses.torso", m.torso),
            ("physics.masses.pelvis", m.pelvis),
            ("physics.masses.leg", m.leg),
        ] {
            check_positive(field, value)?;
        }
        let g = &self.geometry;
        for (field, value) in [
            ("physics.geometry.upper_leg", g.upper_leg),
            ("physics.geometry.lower_leg", g.lower_leg),
            ("physics.geometry.leg_radius", g.leg_radius),
            ("physics.geometry.torso_length", g.torso_length),
            ("physics.geometry.torso_radius", g.torso_radius),
            ("physics.geometry.pelvis_length", g.pelvis_length),
            ("physics.geometry.pelvis_radius", g.pelvis_radius),
            ("physics.geometry.neck_length", g.neck_length),
            ("physics.geometry.neck_radius", g.neck_radius),
            ("physics.geometry.head_length", g.head_length),
            ("physics.geometry.head_radius", g.head_radius),
        ] {
            check_positive(field, value)?;
        }
        check_positive("physics.contact.stiffness", self.contact.stiffness)?;
        check_non_negative("physics.contact.damping", self.contact.damping)?;
        check_non_negative("physics.contact.friction", self.contact.friction)?;
        check_range("physics.contact.restitution", self.contact.restitution, 0.0..=1.0)?;
        check_non_negative(
            "physics.contact.tangential_damping",
            self.contact.tangential_damping,
        )?;
        self.leg_spring.validate("physics.leg_spring")?;
        check_positive("physics.attach_stiffness", self.attach_stiffness)?;
        self.orientation.validate("physics.orientation")?;
        self.root_tracking.validate("physics.root_tracking")?;
        self.spine_joint.validate("physics.spine_joint")?;
        self.neck_joint.validate("physics.neck_joint")?;
        self.fore_leg_joint.validate("physics.fore_leg_joint")?;
        self.hind_leg_joint.validate("physics.hind_leg_joint")?;
        check_positive("physics.chain_bend_limit", self.chain_bend_limit)?;
        check_positive("physics.muscle.activation_tau", self.muscle.activation_tau)?;
        check_positive("physics.muscle.deactivation_tau", self.muscle.deactivation_tau)?;
        check_positive(
            "physics.muscle.force_length_width",
            self.muscle.force_length_width,
        )?;
        check_non_negative("physics.muscle.fatigue_rate", self.muscle.fatigue_rate)?;
        check_non_negative("physics.muscle.recovery_rate", self.muscle.recovery_rate)?;
        check_non_negative(
            "physics.muscle.length_per_radian",
            self.muscle.length_per_radian,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_validate() {
        LocomotionConfig::default()
            .validate()
            .expect("default locomotion config");
        PhysicsConfig::default()
            .validate()
            .expect("default physics config");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = LocomotionConfig::from_json_str(r#"{"gait": {"auto_select": true}}"#)
            .expect("partial config parses");
        assert!(config.gait.auto_select);
        assert_eq!(config.gait.trot, GaitParams::trot());
    }

    #[rstest]
    #[case(r#"{"gait": {"trot": {"duty_min": 0.0}}}"#, "gait.trot.duty_min")]
    #[case(r#"{"state": {"blend_min": 0.5}}"#, "state.blend_min")]
    #[case(r#"{"ik": {"anti_slip_threshold": -1.0}}"#, "ik.anti_slip_threshold")]
    fn out_of_range_values_are_rejected(#[case] json: &str, #[case] expected_field: &str) {
        match LocomotionConfig::from_json_str(json) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected Invalid for {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            PhysicsConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let err = PhysicsConfig::from_json_str(r#"{"fixed_dt": 0.0}"#)
            .expect_err("zero timestep must fail");
        assert!(err.to_string().contains("physics.fixed_dt"));
    }
}
