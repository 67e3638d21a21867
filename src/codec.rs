//! Fixed-layout numeric buffers.
//!
//! Hosts exchange data with the core through two flat `f64` buffers: a
//! 30-slot input buffer decoded into [`LocomotionInputs`] and a 40-slot pose
//! buffer encoded from a [`LocomotionComponent`]. Both directions are total:
//! a short buffer is skipped and leaves the destination untouched.
use glam::{DVec2, DVec3};
use serde::Serialize;

use crate::components::{LocomotionComponent, LocomotionInputs};
use crate::constants::{INPUT_LEN, LEG_COUNT, POSE_LEN};
use crate::numeric::{bits_from_f64, clamp01, code_from_f64, wrap01};
use crate::types::{Action, EmotionalState, Gait, PackRole, TerrainType};
use crate::vector_math::ground_normal;

/// Offsets into the input buffer.
pub mod input {
    /// Velocity x.
    pub const VELOCITY_X: usize = 0;
    /// Velocity y.
    pub const VELOCITY_Y: usize = 1;
    /// Speed.
    pub const SPEED: usize = 2;
    /// Turn rate.
    pub const TURN_RATE: usize = 3;
    /// Slope normal x.
    pub const SLOPE_X: usize = 4;
    /// Slope normal y.
    pub const SLOPE_Y: usize = 5;
    /// Slope normal z.
    pub const SLOPE_Z: usize = 6;
    /// Ground height.
    pub const GROUND_HEIGHT: usize = 7;
    /// Ground material.
    pub const GROUND_MATERIAL: usize = 8;
    /// Gait code.
    pub const GAIT: usize = 9;
    /// Alertness.
    pub const ALERTNESS: usize = 10;
    /// Fatigue.
    pub const FATIGUE: usize = 11;
    /// Target direction x.
    pub const TARGET_DIR_X: usize = 12;
    /// Target direction y.
    pub const TARGET_DIR_Y: usize = 13;
    /// Target position x.
    pub const TARGET_POS_X: usize = 14;
    /// Target position y.
    pub const TARGET_POS_Y: usize = 15;
    /// Action code.
    pub const ACTION: usize = 16;
    /// Emotional state code.
    pub const EMOTION: usize = 17;
    /// Terrain type code.
    pub const TERRAIN: usize = 18;
    /// Pack role code.
    pub const PACK_ROLE: usize = 19;
    /// Intelligence.
    pub const INTELLIGENCE: usize = 20;
    /// Aggression.
    pub const AGGRESSION: usize = 21;
    /// Coordination.
    pub const COORDINATION: usize = 22;
    /// Morale.
    pub const MORALE: usize = 23;
    /// Pack size.
    pub const PACK_SIZE: usize = 24;
    /// Leader distance.
    pub const LEADER_DISTANCE: usize = 25;
    /// Sync phase.
    pub const SYNC_PHASE: usize = 26;
    /// World position x.
    pub const WORLD_X: usize = 27;
    /// World position y.
    pub const WORLD_Y: usize = 28;
    /// Flag bits.
    pub const FLAGS: usize = 29;

    /// Flag bit: select the gait from speed.
    pub const FLAG_AUTO_GAIT: u32 = 1;
    /// Flag bit: hold every foot planted.
    pub const FLAG_PIN_FEET: u32 = 1 << 1;
}

/// Offsets into the pose buffer.
pub mod pose {
    /// Root x.
    pub const ROOT_X: usize = 0;
    /// Root y.
    pub const ROOT_Y: usize = 1;
    /// Root height.
    pub const ROOT_HEIGHT: usize = 2;
    /// Root yaw.
    pub const ROOT_YAW: usize = 3;
    /// Root pitch.
    pub const ROOT_PITCH: usize = 4;
    /// Spine curve.
    pub const SPINE: usize = 5;
    /// Neck yaw.
    pub const NECK_YAW: usize = 6;
    /// Neck pitch.
    pub const NECK_PITCH: usize = 7;
    /// Head yaw.
    pub const HEAD_YAW: usize = 8;
    /// Head pitch.
    pub const HEAD_PITCH: usize = 9;
    /// Jaw opening.
    pub const JAW: usize = 10;
    /// Tail yaw.
    pub const TAIL_YAW: usize = 11;
    /// Tail pitch.
    pub const TAIL_PITCH: usize = 12;
    /// Left ear.
    pub const EAR_LEFT: usize = 13;
    /// Right ear.
    pub const EAR_RIGHT: usize = 14;
    /// Breathing.
    pub const BREATHING: usize = 15;
    /// First foot slot; feet are `x, y` pairs in leg order.
    pub const FEET: usize = 16;
    /// First plant alpha slot.
    pub const PLANT: usize = 24;
    /// First leg extension slot.
    pub const EXTENSION: usize = 28;
    /// First leg lift slot.
    pub const LIFT: usize = 32;
    /// Fur jitter.
    pub const FUR: usize = 36;
    /// Body stretch.
    pub const STRETCH: usize = 37;
    /// State blend progress.
    pub const BLEND: usize = 38;
    /// Debug flag bits.
    pub const DEBUG: usize = 39;

    /// Debug bit of the first locked foot; legs follow in order.
    pub const DEBUG_LOCKED: u32 = 1;
    /// Debug bit: stunned.
    pub const DEBUG_STUNNED: u32 = 1 << 4;
    /// Debug bit: state blend in progress.
    pub const DEBUG_BLENDING: u32 = 1 << 5;
    /// Debug bit: automatic gait switch this tick.
    pub const DEBUG_AUTO_GAIT: u32 = 1 << 6;
}

struct Reader<'a> {
    buffer: &'a [f64],
}

impl Reader<'_> {
    fn raw(&self, offset: usize) -> Option<f64> {
        self.buffer.get(offset).copied().filter(|v| v.is_finite())
    }

    fn scalar(&self, offset: usize, previous: f64) -> f64 {
        self.raw(offset).unwrap_or(previous)
    }

    fn unit(&self, offset: usize, previous: f64) -> f64 {
        self.raw(offset).map_or(previous, clamp01)
    }

    fn non_negative(&self, offset: usize, previous: f64) -> f64 {
        self.raw(offset).map_or(previous, |v| v.max(0.0))
    }

    fn vec2(&self, x: usize, y: usize, previous: DVec2) -> DVec2 {
        match (self.raw(x), self.raw(y)) {
            (Some(x), Some(y)) => DVec2::new(x, y),
            _ => previous,
        }
    }
}

/// Decodes an input buffer into `inputs`.
///
/// Returns `false` and leaves `inputs` untouched when the buffer is shorter
/// than [`INPUT_LEN`]. Non-finite slots keep their previous value, 0..1
/// scalars are clamped and unknown enum codes decode to their defaults.
pub fn decode_inputs(buffer: &[f64], inputs: &mut LocomotionInputs) -> bool {
    if buffer.len() < INPUT_LEN {
        return false;
    }
    let r = Reader { buffer };
    inputs.velocity = r.vec2(input::VELOCITY_X, input::VELOCITY_Y, inputs.velocity);
    inputs.speed = r.non_negative(input::SPEED, inputs.speed);
    inputs.turn_rate = r.scalar(input::TURN_RATE, inputs.turn_rate);
    let slope = DVec3::new(
        r.scalar(input::SLOPE_X, inputs.slope_normal.x),
        r.scalar(input::SLOPE_Y, inputs.slope_normal.y),
        r.scalar(input::SLOPE_Z, inputs.slope_normal.z),
    );
    inputs.slope_normal = ground_normal(slope);
    inputs.ground_height = r.scalar(input::GROUND_HEIGHT, inputs.ground_height);
    if let Some(material) = r
        .raw(input::GROUND_MATERIAL)
        .and_then(code_from_f64)
        .and_then(|code| i32::try_from(code).ok())
    {
        inputs.ground_material = material;
    }
    inputs.gait = r.raw(input::GAIT).map_or(inputs.gait, Gait::from_code);
    inputs.alertness = r.unit(input::ALERTNESS, inputs.alertness);
    inputs.fatigue = r.unit(input::FATIGUE, inputs.fatigue);
    inputs.target_direction = r.vec2(
        input::TARGET_DIR_X,
        input::TARGET_DIR_Y,
        inputs.target_direction,
    );
    inputs.target_position = r.vec2(
        input::TARGET_POS_X,
        input::TARGET_POS_Y,
        inputs.target_position,
    );
    inputs.action = r.raw(input::ACTION).map_or(inputs.action, Action::from_code);
    inputs.emotion = r
        .raw(input::EMOTION)
        .map_or(inputs.emotion, EmotionalState::from_code);
    inputs.terrain = r
        .raw(input::TERRAIN)
        .map_or(inputs.terrain, TerrainType::from_code);
    inputs.pack_role = r
        .raw(input::PACK_ROLE)
        .map_or(inputs.pack_role, PackRole::from_code);
    inputs.intelligence = r.unit(input::INTELLIGENCE, inputs.intelligence);
    inputs.aggression = r.unit(input::AGGRESSION, inputs.aggression);
    inputs.coordination = r.unit(input::COORDINATION, inputs.coordination);
    inputs.morale = r.unit(input::MORALE, inputs.morale);
    inputs.pack_size = r.non_negative(input::PACK_SIZE, inputs.pack_size);
    inputs.leader_distance = r.non_negative(input::LEADER_DISTANCE, inputs.leader_distance);
    inputs.sync_phase = r.raw(input::SYNC_PHASE).map_or(inputs.sync_phase, wrap01);
    inputs.world_position = r.vec2(input::WORLD_X, input::WORLD_Y, inputs.world_position);
    if let Some(flags) = r.raw(input::FLAGS).map(bits_from_f64) {
        inputs.auto_gait = flags & input::FLAG_AUTO_GAIT != 0;
        inputs.pin_feet = flags & input::FLAG_PIN_FEET != 0;
    }
    true
}

/// Encodes `inputs` into a fresh input buffer. Mostly useful to hosts and
/// tests that build buffers from typed values.
#[must_use]
pub fn encode_inputs(inputs: &LocomotionInputs) -> [f64; INPUT_LEN] {
    let mut flags = 0;
    if inputs.auto_gait {
        flags |= input::FLAG_AUTO_GAIT;
    }
    if inputs.pin_feet {
        flags |= input::FLAG_PIN_FEET;
    }
    [
        inputs.velocity.x,
        inputs.velocity.y,
        inputs.speed,
        inputs.turn_rate,
        inputs.slope_normal.x,
        inputs.slope_normal.y,
        inputs.slope_normal.z,
        inputs.ground_height,
        f64::from(inputs.ground_material),
        inputs.gait.code(),
        inputs.alertness,
        inputs.fatigue,
        inputs.target_direction.x,
        inputs.target_direction.y,
        inputs.target_position.x,
        inputs.target_position.y,
        inputs.action.code(),
        inputs.emotion.code(),
        inputs.terrain.code(),
        inputs.pack_role.code(),
        inputs.intelligence,
        inputs.aggression,
        inputs.coordination,
        inputs.morale,
        inputs.pack_size,
        inputs.leader_distance,
        inputs.sync_phase,
        inputs.world_position.x,
        inputs.world_position.y,
        f64::from(flags),
    ]
}

/// Debug flag bits for the current component state.
#[must_use]
pub fn debug_flags(component: &LocomotionComponent) -> u32 {
    let mut flags = 0;
    for (i, foot) in component.feet.iter().enumerate() {
        if foot.locked {
            flags |= pose::DEBUG_LOCKED << i;
        }
    }
    if component.state.current == crate::types::LocomotionState::Stunned {
        flags |= pose::DEBUG_STUNNED;
    }
    if component.is_blending() {
        flags |= pose::DEBUG_BLENDING;
    }
    if component.gait.auto_switched {
        flags |= pose::DEBUG_AUTO_GAIT;
    }
    flags
}

/// Encodes the component's pose into `buffer`.
///
/// Returns `false` and leaves `buffer` untouched when it is shorter than
/// [`POSE_LEN`]. Trailing slots beyond [`POSE_LEN`] are not written.
pub fn encode_pose(component: &LocomotionComponent, buffer: &mut [f64]) -> bool {
    let Some(out) = buffer.get_mut(..POSE_LEN) else {
        return false;
    };
    out.copy_from_slice(&PoseSnapshot::capture(component).to_buffer());
    true
}

/// Typed view of the pose buffer, serialisable for tooling.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PoseSnapshot {
    /// Simulated time of the capture (s).
    pub time: f64,
    /// Root x, y, height.
    pub root: [f64; 3],
    /// Root yaw.
    pub root_yaw: f64,
    /// Root pitch.
    pub root_pitch: f64,
    /// Spine curve including overlays.
    pub spine: f64,
    /// Neck yaw and pitch.
    pub neck: [f64; 2],
    /// Head yaw and pitch.
    pub head: [f64; 2],
    /// Jaw opening.
    pub jaw: f64,
    /// Tail yaw and pitch.
    pub tail: [f64; 2],
    /// Left and right ear.
    pub ears: [f64; 2],
    /// Breathing.
    pub breathing: f64,
    /// Foot x, y per leg.
    pub feet: [[f64; 2]; LEG_COUNT],
    /// Plant alpha per leg.
    pub plant: [f64; LEG_COUNT],
    /// Extension per leg.
    pub extension: [f64; LEG_COUNT],
    /// Lift per leg.
    pub lift: [f64; LEG_COUNT],
    /// Fur jitter.
    pub fur: f64,
    /// Body stretch.
    pub stretch: f64,
    /// State blend progress.
    pub blend: f64,
    /// Debug flag bits.
    pub debug: u32,
}

impl PoseSnapshot {
    /// Captures the pose of `component`.
    #[must_use]
    pub fn capture(component: &LocomotionComponent) -> Self {
        let c = component;
        Self {
            time: c.time,
            root: [c.root.position.x, c.root.position.y, c.root.height],
            root_yaw: c.root.yaw,
            root_pitch: c.root.pitch,
            spine: c.posed_spine_curve(),
            neck: [c.spine.neck_yaw, c.posed_neck_pitch()],
            head: [c.spine.head_yaw, c.posed_head_pitch()],
            jaw: c.action.jaw_open,
            tail: [c.secondary.tail_yaw, c.secondary.tail_pitch],
            ears: [c.secondary.ear_left, c.secondary.ear_right],
            breathing: c.secondary.breathing,
            feet: c.feet.each_ref().map(|f| [f.position.x, f.position.y]),
            plant: c.gait.stance_alpha,
            extension: c.feet.each_ref().map(|f| f.extension),
            lift: c.feet.each_ref().map(|f| f.lift),
            fur: c.secondary.fur_jitter,
            stretch: c.secondary.body_stretch,
            blend: c.state.blend_t,
            debug: debug_flags(c),
        }
    }

    /// Flattens the snapshot into the pose buffer layout.
    #[must_use]
    pub fn to_buffer(&self) -> [f64; POSE_LEN] {
        let [root_x, root_y, root_height] = self.root;
        let [neck_yaw, neck_pitch] = self.neck;
        let [head_yaw, head_pitch] = self.head;
        let [tail_yaw, tail_pitch] = self.tail;
        let [ear_left, ear_right] = self.ears;
        let [[f0x, f0y], [f1x, f1y], [f2x, f2y], [f3x, f3y]] = self.feet;
        let [p0, p1, p2, p3] = self.plant;
        let [e0, e1, e2, e3] = self.extension;
        let [l0, l1, l2, l3] = self.lift;
        [
            root_x,
            root_y,
            root_height,
            self.root_yaw,
            self.root_pitch,
            self.spine,
            neck_yaw,
            neck_pitch,
            head_yaw,
            head_pitch,
            self.jaw,
            tail_yaw,
            tail_pitch,
            ear_left,
            ear_right,
            self.breathing,
            f0x,
            f0y,
            f1x,
            f1y,
            f2x,
            f2y,
            f3x,
            f3y,
            p0,
            p1,
            p2,
            p3,
            e0,
            e1,
            e2,
            e3,
            l0,
            l1,
            l2,
            l3,
            self.fur,
            self.stretch,
            self.blend,
            f64::from(self.debug),
        ]
    }
}
