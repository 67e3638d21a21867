//! Per-creature state.
//!
//! [`LocomotionComponent`] is a struct of structs: caller-written inputs,
//! the state each pipeline stage owns, and the creature's configuration.
//! [`Creature`] pairs it with the optional physics body and is the unit
//! stored in the arena and in the Bevy world.
use bevy::prelude::Component;
use glam::{DVec2, DVec3};

use crate::config::{LocomotionConfig, PhysicsConfig};
use crate::constants::LEG_COUNT;
use crate::ground::GroundQuery;
use crate::physics::{PhysicsBody, PhysicsTargets, StepReport};
use crate::terrain::Foothold;
use crate::types::{Action, EmotionalState, Gait, Leg, LocomotionState, PackRole, TerrainType};
use crate::vector_math::{rotate_yaw, UP};

/// Per-tick inputs written by the caller, usually through
/// [`crate::codec::decode_inputs`].
#[derive(Clone, Debug, PartialEq)]
pub struct LocomotionInputs {
    /// Planar velocity (m/s).
    pub velocity: DVec2,
    /// Ground speed (m/s).
    pub speed: f64,
    /// Turn rate (rad/s, positive to the left).
    pub turn_rate: f64,
    /// Terrain slope normal under the body.
    pub slope_normal: DVec3,
    /// Ground height under the body.
    pub ground_height: f64,
    /// Host material code under the body.
    pub ground_material: i32,
    /// Requested gait.
    pub gait: Gait,
    /// Alertness in `[0, 1]`.
    pub alertness: f64,
    /// Fatigue in `[0, 1]`.
    pub fatigue: f64,
    /// Aim direction used while standing.
    pub target_direction: DVec2,
    /// Point of interest in the world.
    pub target_position: DVec2,
    /// Active action overlay.
    pub action: Action,
    /// Emotional state.
    pub emotion: EmotionalState,
    /// Terrain class.
    pub terrain: TerrainType,
    /// Pack role.
    pub pack_role: PackRole,
    /// Intelligence in `[0, 1]`.
    pub intelligence: f64,
    /// Aggression in `[0, 1]`.
    pub aggression: f64,
    /// Pack coordination in `[0, 1]`.
    pub coordination: f64,
    /// Morale in `[0, 1]`.
    pub morale: f64,
    /// Number of pack members, including this one.
    pub pack_size: f64,
    /// Distance to the pack leader (m).
    pub leader_distance: f64,
    /// Shared pack phase in `[0, 1)`.
    pub sync_phase: f64,
    /// World position maintained by the caller.
    pub world_position: DVec2,
    /// Select the gait from speed this tick.
    pub auto_gait: bool,
    /// Hold every foot planted.
    pub pin_feet: bool,
}

impl Default for LocomotionInputs {
    fn default() -> Self {
        Self {
            velocity: DVec2::ZERO,
            speed: 0.0,
            turn_rate: 0.0,
            slope_normal: UP,
            ground_height: 0.0,
            ground_material: 0,
            gait: Gait::Walk,
            alertness: 0.3,
            fatigue: 0.0,
            target_direction: DVec2::X,
            target_position: DVec2::ZERO,
            action: Action::None,
            emotion: EmotionalState::Calm,
            terrain: TerrainType::Open,
            pack_role: PackRole::Scout,
            intelligence: 0.5,
            aggression: 0.3,
            coordination: 0.5,
            morale: 0.8,
            pack_size: 1.0,
            leader_distance: 0.0,
            sync_phase: 0.0,
            world_position: DVec2::ZERO,
            auto_gait: false,
            pin_feet: false,
        }
    }
}

/// Gait engine state.
#[derive(Clone, Debug, PartialEq)]
pub struct GaitState {
    /// Gait currently driving the legs.
    pub gait: Gait,
    /// Master cycle phase in `[0, 1)`.
    pub master_phase: f64,
    /// Current per-leg offsets, gliding toward the gait's offsets.
    pub offsets: [f64; LEG_COUNT],
    /// Per-leg phase in `[0, 1)`.
    pub phases: [f64; LEG_COUNT],
    /// Per-leg stance weight in `[0, 1]`.
    pub stance_alpha: [f64; LEG_COUNT],
    /// Duty factor in effect.
    pub duty: f64,
    /// Stride length in effect (m).
    pub stride: f64,
    /// Cycle frequency in effect (Hz).
    pub frequency: f64,
    /// Pack synchronisation offset in phase units.
    pub pack_offset: f64,
    /// Per-creature phase shift applied to every leg.
    pub phase_shift: f64,
    /// Whether automatic selection switched the gait this tick.
    pub auto_switched: bool,
}

impl Default for GaitState {
    fn default() -> Self {
        let offsets = crate::config::GaitParams::walk().phase_offsets;
        Self {
            gait: Gait::Walk,
            master_phase: 0.0,
            offsets,
            phases: offsets,
            stance_alpha: [1.0; LEG_COUNT],
            duty: 0.75,
            stride: 0.35,
            frequency: 0.0,
            pack_offset: 0.0,
            phase_shift: 0.0,
            auto_switched: false,
        }
    }
}

/// Orientation of a paw (rad).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PawOrientation {
    /// Heading about `+z`.
    pub yaw: f64,
    /// Nose-up pitch.
    pub pitch: f64,
    /// Left-side-up roll.
    pub roll: f64,
}

/// Ground contact of a planted paw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactRecord {
    /// Whether the paw is planted.
    pub active: bool,
    /// Spring force pressing the paw down (N per unit mass).
    pub force: f64,
    /// Ground normal under the paw.
    pub normal: DVec3,
    /// Host material code under the paw.
    pub material: i32,
    /// Friction coefficient of the terrain class.
    pub friction: f64,
}

impl Default for ContactRecord {
    fn default() -> Self {
        Self {
            active: false,
            force: 0.0,
            normal: UP,
            material: 0,
            friction: 0.0,
        }
    }
}

/// One leg's foot state.
#[derive(Clone, Debug, PartialEq)]
pub struct FootState {
    /// Foot position in the world.
    pub position: DVec3,
    /// Vertical velocity of the stance spring.
    pub vertical_velocity: f64,
    /// Nominal target from the predictor.
    pub target: DVec3,
    /// Terrain-refined foothold.
    pub foothold: Foothold,
    /// Whether the foot is locked to the ground.
    pub locked: bool,
    /// Lock point in the world.
    pub lock: DVec3,
    /// Whether the lock is sliding back after drifting too far.
    pub regripping: bool,
    /// Paw orientation.
    pub orientation: PawOrientation,
    /// Ground contact.
    pub contact: ContactRecord,
    /// Leg extension in `[0, 1]`.
    pub extension: f64,
    /// Leg lift in `[0, 1]`.
    pub lift: f64,
}

impl FootState {
    /// A planted foot at `position` on flat ground.
    #[must_use]
    pub fn planted_at(position: DVec3) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            target: position,
            foothold: Foothold::flat(position),
            locked: false,
            lock: position,
            regripping: false,
            orientation: PawOrientation::default(),
            contact: ContactRecord::default(),
            extension: 1.0,
            lift: 0.0,
        }
    }
}

/// Root (pelvis) transform and stabiliser state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootState {
    /// Root position in the ground plane.
    pub position: DVec2,
    /// Root height (world `z`).
    pub height: f64,
    /// Vertical velocity of the height spring.
    pub vertical_velocity: f64,
    /// Heading (rad).
    pub yaw: f64,
    /// Nose-up pitch including turn banking (rad).
    pub pitch: f64,
    /// Turn lean (rad).
    pub lean: f64,
    /// Centre-of-mass correction added to the world position.
    pub com_offset: DVec2,
}

/// Spine curve and neck/head angles before action overlays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpineHeadState {
    /// Spine curvature (rad).
    pub spine_curve: f64,
    /// Neck yaw (rad).
    pub neck_yaw: f64,
    /// Neck pitch (rad).
    pub neck_pitch: f64,
    /// Head yaw (rad).
    pub head_yaw: f64,
    /// Head pitch (rad).
    pub head_pitch: f64,
}

/// Cosmetic secondary motion.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryMotionState {
    /// Tail yaw (rad).
    pub tail_yaw: f64,
    /// Tail yaw velocity (rad/s).
    pub tail_yaw_velocity: f64,
    /// Tail pitch (rad).
    pub tail_pitch: f64,
    /// Left ear angle (rad).
    pub ear_left: f64,
    /// Right ear angle (rad).
    pub ear_right: f64,
    /// Breathing displacement.
    pub breathing: f64,
    /// Breathing cycle phase in `[0, 1)`.
    pub breath_phase: f64,
    /// Fur jitter.
    pub fur_jitter: f64,
    /// Squash/stretch posture scalar (1 = neutral).
    pub body_stretch: f64,
}

impl Default for SecondaryMotionState {
    fn default() -> Self {
        Self {
            tail_yaw: 0.0,
            tail_yaw_velocity: 0.0,
            tail_pitch: 0.0,
            ear_left: 0.0,
            ear_right: 0.0,
            breathing: 0.0,
            breath_phase: 0.0,
            fur_jitter: 0.0,
            body_stretch: 1.0,
        }
    }
}

/// Action overlay timers and additive offsets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionState {
    /// Action seen on the previous tick.
    pub current: Action,
    /// Time spent in the current action (s).
    pub elapsed: f64,
    /// Jaw opening in `[0, 1]`.
    pub jaw_open: f64,
    /// Accumulated pounce anticipation (s).
    pub pounce_charge: f64,
    /// Remaining pounce release pulse (s).
    pub release_timer: f64,
    /// Remaining stun (s).
    pub stun_timer: f64,
    /// Additive spine curve.
    pub spine_overlay: f64,
    /// Additive neck pitch.
    pub neck_pitch_overlay: f64,
    /// Additive head pitch.
    pub head_pitch_overlay: f64,
    /// Whether the overlay holds every foot planted.
    pub feet_pinned: bool,
}

impl ActionState {
    /// Whether the stun timer is running.
    #[must_use]
    pub fn stunned(&self) -> bool {
        self.stun_timer > 0.0
    }
}

/// High-level state machine with blend progress.
#[derive(Clone, Debug, PartialEq)]
pub struct StateMachineState {
    /// Current state.
    pub current: LocomotionState,
    /// State being blended out.
    pub previous: LocomotionState,
    /// Blend progress in `[0, 1]`.
    pub blend_t: f64,
    /// Duration of the running blend (s).
    pub blend_duration: f64,
}

impl Default for StateMachineState {
    fn default() -> Self {
        Self {
            current: LocomotionState::Idle,
            previous: LocomotionState::Idle,
            blend_t: 1.0,
            blend_duration: 0.18,
        }
    }
}

/// Full locomotion state of one creature.
#[derive(Clone, Debug, PartialEq)]
pub struct LocomotionComponent {
    /// Caller-written inputs.
    pub inputs: LocomotionInputs,
    /// Gait engine.
    pub gait: GaitState,
    /// Feet in leg order.
    pub feet: [FootState; LEG_COUNT],
    /// Root stabiliser.
    pub root: RootState,
    /// Spine, neck and head.
    pub spine: SpineHeadState,
    /// Secondary motion.
    pub secondary: SecondaryMotionState,
    /// Action overlay.
    pub action: ActionState,
    /// State machine.
    pub state: StateMachineState,
    /// Elapsed simulated time (s).
    pub time: f64,
    /// Seed for the deterministic noise channels.
    pub noise_seed: f64,
    /// Tuning.
    pub config: LocomotionConfig,
}

impl Default for LocomotionComponent {
    fn default() -> Self {
        Self::new(LocomotionConfig::default())
    }
}

impl LocomotionComponent {
    /// A creature standing at the origin on flat ground at height zero,
    /// with its root resting on the ground.
    #[must_use]
    pub fn new(config: LocomotionConfig) -> Self {
        let feet = Leg::ALL.map(|leg| {
            let offset = config
                .body
                .foot_offsets
                .get(leg.index())
                .copied()
                .unwrap_or_default();
            FootState::planted_at(offset.extend(0.0))
        });
        Self {
            inputs: LocomotionInputs::default(),
            gait: GaitState::default(),
            feet,
            root: RootState::default(),
            spine: SpineHeadState::default(),
            secondary: SecondaryMotionState::default(),
            action: ActionState::default(),
            state: StateMachineState::default(),
            time: 0.0,
            noise_seed: 0.0,
            config,
        }
    }

    /// Moves the creature to `position` facing `yaw`, planting every foot at
    /// its anatomical offset on `ground` and resting the root at pelvis
    /// height.
    pub fn place(&mut self, position: DVec2, yaw: f64, ground: &dyn GroundQuery) {
        self.inputs.world_position = position;
        self.root.position = position;
        self.root.yaw = yaw;
        self.root.com_offset = DVec2::ZERO;
        let mut height_sum = 0.0;
        for (foot, offset) in self.feet.iter_mut().zip(self.config.body.foot_offsets) {
            let xy = position + rotate_yaw(offset, yaw);
            let hit = ground.ground_at(xy.x, xy.y);
            let z = if hit.is_valid() { hit.z } else { 0.0 };
            *foot = FootState::planted_at(xy.extend(z));
            height_sum += z;
        }
        self.root.height = height_sum / 4.0 + self.config.body.pelvis_offset;
        self.root.vertical_velocity = 0.0;
    }

    /// Spine curve including the action overlay.
    #[must_use]
    pub fn posed_spine_curve(&self) -> f64 {
        self.spine.spine_curve + self.action.spine_overlay
    }

    /// Neck pitch including the action overlay.
    #[must_use]
    pub fn posed_neck_pitch(&self) -> f64 {
        self.spine.neck_pitch + self.action.neck_pitch_overlay
    }

    /// Head pitch including the action overlay.
    #[must_use]
    pub fn posed_head_pitch(&self) -> f64 {
        self.spine.head_pitch + self.action.head_pitch_overlay
    }

    /// Foot position relative to the root, in the body frame.
    #[must_use]
    pub fn foot_offset(&self, leg: Leg) -> Option<DVec2> {
        let foot = self.feet.get(leg.index())?;
        let relative = foot.position.truncate() - self.root.position;
        Some(rotate_yaw(relative, -self.root.yaw))
    }

    /// Places a foot at a body-frame offset from the root, keeping its
    /// height. Used by the engine bridge.
    pub fn set_foot_offset(&mut self, leg: Leg, offset: DVec2) {
        let world = self.root.position + rotate_yaw(offset, self.root.yaw);
        if let Some(foot) = self.feet.get_mut(leg.index()) {
            foot.position.x = world.x;
            foot.position.y = world.y;
            if foot.locked {
                foot.lock = foot.position;
            }
        }
    }

    /// Whether the current state is still blending in.
    #[must_use]
    pub fn is_blending(&self) -> bool {
        self.state.blend_t < 1.0
    }
}

/// A creature: kinematic locomotion plus an optional physics body.
#[derive(Component, Clone, Debug)]
pub struct Creature {
    /// Kinematic pipeline state; authoritative for the rendered pose.
    pub locomotion: LocomotionComponent,
    /// Physics body stepped alongside, when enabled.
    pub body: Option<PhysicsBody>,
}

impl Creature {
    /// A creature without a physics body.
    #[must_use]
    pub const fn kinematic(locomotion: LocomotionComponent) -> Self {
        Self {
            locomotion,
            body: None,
        }
    }

    /// A creature with a physics body spawned under its current root.
    #[must_use]
    pub fn with_physics(locomotion: LocomotionComponent, physics: PhysicsConfig) -> Self {
        let spawn = locomotion.root.position.extend(locomotion.root.height);
        let body = PhysicsBody::new(physics, spawn, locomotion.root.yaw);
        Self {
            locomotion,
            body: Some(body),
        }
    }

    /// Runs one kinematic tick and, when present, advances the physics body
    /// toward the new pose.
    pub fn tick(&mut self, ground: &dyn GroundQuery, dt: f64) -> Option<StepReport> {
        crate::pipeline::tick(&mut self.locomotion, ground, dt);
        let body = self.body.as_mut()?;
        let targets = PhysicsTargets::from_component(&self.locomotion);
        Some(body.advance(dt, &targets, ground))
    }
}
