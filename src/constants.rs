//! Tunables shared across the locomotion and physics layers.
//!
//! These are hard-coded and feed the `Default` implementations in
//! [`crate::config`]. Anything a host may want to tune per creature lives in
//! the config structs instead.

/// Number of legs. The topology is fixed.
pub const LEG_COUNT: usize = 4;
/// Length of the fixed-layout input buffer.
pub const INPUT_LEN: usize = 30;
/// Length of the fixed-layout output pose buffer.
pub const POSE_LEN: usize = 40;

/// Guard used by normalisation, `atan2` and distance helpers.
pub const EPSILON: f64 = 1e-6;
/// Speeds below this are treated as standing still.
pub const IDLE_SPEED: f64 = 0.05;
/// Speed at which gait phases reach their full advance rate.
pub const FULL_GAIT_SPEED: f64 = 0.35;

/// Longest kinematic sub-step (s); longer ticks are split.
pub const MAX_KINEMATIC_STEP: f64 = 1.0 / 30.0;

/// Width of the stance/swing feather, in phase units.
pub const STANCE_FEATHER: f64 = 0.12;

/// Gravitational acceleration along `-z` (m/s²).
pub const GRAVITY: f64 = 9.81;
/// Fixed physics timestep (s).
pub const PHYSICS_DT: f64 = 1.0 / 120.0;
/// Longest frame delta fed into the physics accumulator (s).
pub const MAX_FRAME_DT: f64 = 0.25;
/// Upper bound on fixed steps run by one `advance` call.
pub const MAX_SUBSTEPS: u32 = 8;
/// Number of joint-limit solver passes per physics step.
pub const LIMIT_SOLVER_PASSES: u32 = 4;

/// Default distance from the averaged foot height to the pelvis (m).
pub const PELVIS_OFFSET: f64 = 0.55;
/// Default anti-slip drift threshold for locked feet (m).
pub const ANTI_SLIP_THRESHOLD: f64 = 0.12;
