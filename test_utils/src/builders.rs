//! Creature builders and the host-side drive loop.

use glam::DVec2;
use lope::components::LocomotionComponent;
use lope::config::LocomotionConfig;
use lope::ground::GroundQuery;
use lope::pipeline;
use lope::types::{Action, EmotionalState, Gait, PackRole};

/// Builds a [`LocomotionComponent`] standing on a given ground.
///
/// # Examples
/// ```
/// use lope::types::Gait;
/// use test_utils::{flat, WolfBuilder};
/// let wolf = WolfBuilder::new().gait(Gait::Trot).speed(2.0).build(&flat(0.0));
/// assert_eq!(wolf.inputs.gait, Gait::Trot);
/// assert!((wolf.inputs.velocity.x - 2.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct WolfBuilder {
    config: LocomotionConfig,
    position: DVec2,
    yaw: f64,
    gait: Gait,
    speed: f64,
    turn_rate: f64,
    action: Action,
    emotion: EmotionalState,
    role: PackRole,
    auto_gait: bool,
}

impl Default for WolfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WolfBuilder {
    /// A calm lone wolf standing at the origin facing `+x`.
    pub fn new() -> Self {
        Self {
            config: LocomotionConfig::default(),
            position: DVec2::ZERO,
            yaw: 0.0,
            gait: Gait::Walk,
            speed: 0.0,
            turn_rate: 0.0,
            action: Action::None,
            emotion: EmotionalState::Calm,
            role: PackRole::Scout,
            auto_gait: false,
        }
    }

    pub fn config(mut self, config: LocomotionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn at(mut self, position: DVec2, yaw: f64) -> Self {
        self.position = position;
        self.yaw = yaw;
        self
    }

    pub fn gait(mut self, gait: Gait) -> Self {
        self.gait = gait;
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn turn_rate(mut self, turn_rate: f64) -> Self {
        self.turn_rate = turn_rate;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn emotion(mut self, emotion: EmotionalState) -> Self {
        self.emotion = emotion;
        self
    }

    pub fn role(mut self, role: PackRole) -> Self {
        self.role = role;
        self
    }

    pub fn auto_gait(mut self) -> Self {
        self.auto_gait = true;
        self
    }

    /// Places the creature on `ground` and writes the inputs.
    pub fn build(self, ground: &dyn GroundQuery) -> LocomotionComponent {
        let mut wolf = LocomotionComponent::new(self.config);
        wolf.place(self.position, self.yaw, ground);
        let inputs = &mut wolf.inputs;
        inputs.gait = self.gait;
        inputs.speed = self.speed;
        inputs.velocity = DVec2::from_angle(self.yaw) * self.speed;
        inputs.turn_rate = self.turn_rate;
        inputs.action = self.action;
        inputs.emotion = self.emotion;
        inputs.pack_role = self.role;
        inputs.auto_gait = self.auto_gait;
        wolf
    }
}

/// Plays the host for `frames` ticks of `dt`, calling `observe` after each
/// tick with the frame number.
pub fn drive_with(
    wolf: &mut LocomotionComponent,
    ground: &dyn GroundQuery,
    dt: f64,
    frames: usize,
    mut observe: impl FnMut(&LocomotionComponent, usize),
) {
    for frame in 0..frames {
        let inputs = &mut wolf.inputs;
        if inputs.turn_rate != 0.0 {
            let heading = inputs.velocity.to_angle() + inputs.turn_rate * dt;
            inputs.velocity = DVec2::from_angle(heading) * inputs.speed;
        }
        inputs.world_position += inputs.velocity * dt;
        let hit = ground.ground_at(inputs.world_position.x, inputs.world_position.y);
        if hit.is_valid() {
            inputs.slope_normal = hit.normal;
            inputs.ground_height = hit.z;
            inputs.ground_material = hit.material;
        }
        pipeline::tick(wolf, ground, dt);
        observe(wolf, frame);
    }
}

/// Plays the host for `frames` ticks of `dt`.
pub fn drive(wolf: &mut LocomotionComponent, ground: &dyn GroundQuery, dt: f64, frames: usize) {
    drive_with(wolf, ground, dt, frames, |_, _| {});
}
