//! Procedural quadruped locomotion and biomechanics core.
//!
//! Each tick the caller writes a [`LocomotionInputs`] block (directly or via
//! the numeric input buffer in [`codec`]), hands the creature a
//! [`GroundQuery`], and reads back a pose. The kinematic pipeline in
//! [`pipeline`] runs the action overlay, state selector, gait engine, foot
//! targeting, foot IK, root stabiliser, spine and head orientation and the
//! secondary motion channels in that order. An optional [`physics`] body can
//! be stepped alongside to cross-check the pose.
//!
//! ```
//! use lope::components::LocomotionComponent;
//! use lope::ground::FlatGround;
//! use lope::pipeline;
//!
//! let mut wolf = LocomotionComponent::default();
//! wolf.inputs.speed = 1.2;
//! wolf.inputs.velocity = glam::DVec2::new(1.2, 0.0);
//! for _ in 0..60 {
//!     pipeline::tick(&mut wolf, &FlatGround::default(), 1.0 / 60.0);
//! }
//! assert!((wolf.time - 1.0).abs() < 1e-9);
//! ```
#[macro_use]
mod macros;

pub mod actions;
pub mod arena;
pub mod codec;
pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod foot_ik;
pub mod foot_target;
pub mod gait;
pub mod ground;
pub mod logging;
pub mod numeric;
pub mod physics;
pub mod pipeline;
pub mod plugin;
pub mod root;
pub mod secondary;
pub mod seeds;
pub mod spine;
pub mod state;
pub mod terrain;
pub mod types;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use arena::{CreatureArena, CreatureId};
pub use codec::{decode_inputs, encode_pose, PoseSnapshot};
pub use components::{Creature, LocomotionComponent, LocomotionInputs};
pub use config::{LocomotionConfig, PhysicsConfig};
pub use error::ConfigError;
pub use ground::{FlatGround, GroundHit, GroundQuery, PlaneGround};
pub use logging::init as init_logging;
pub use physics::{PhysicsBody, StepReport};
pub use plugin::{GroundResource, LocomotionPlugin, LocomotionSettings};
pub use seeds::{SeedRegistry, SeedStream};
pub use types::{Action, EmotionalState, Gait, Leg, LocomotionState, PackRole, TerrainType};

pub mod prelude {
    //! Prelude exports used by hosts driving creatures.
    //!
    //! ```rust,no_run
    //! use lope::prelude::*;
    //! ```

    pub use crate::pipeline::{tick, tick_with_inputs};
    pub use crate::CreatureArena;
    pub use crate::FlatGround;
    pub use crate::GroundQuery;
    pub use crate::LocomotionComponent;
    pub use crate::LocomotionPlugin;
    pub use crate::PoseSnapshot;
    pub use crate::{Action, EmotionalState, Gait, PackRole, TerrainType};
}
