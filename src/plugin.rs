//! Bevy plugin ticking [`Creature`] components.
//!
//! The plugin is a thin adapter: each `Update` it reads the frame delta from
//! [`Time`] and runs every creature's pipeline against the ground held in
//! [`GroundResource`]. Inputs are written by the host directly into
//! `Creature::locomotion.inputs` before the update runs.
use bevy::prelude::*;
use log::{debug, trace};

use crate::components::Creature;
use crate::ground::{FlatGround, GroundQuery};

/// Ground queried by every creature.
#[derive(Resource)]
pub struct GroundResource(pub Box<dyn GroundQuery + Send + Sync>);

impl Default for GroundResource {
    fn default() -> Self {
        Self(Box::new(FlatGround::default()))
    }
}

impl std::fmt::Debug for GroundResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GroundResource(..)")
    }
}

/// Runtime switches for the locomotion systems.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocomotionSettings {
    /// Whether creatures with a physics body also step it.
    pub step_physics: bool,
    /// Whether ticking is suspended.
    pub paused: bool,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            step_physics: true,
            paused: false,
        }
    }
}

/// Ticks every [`Creature`] once per frame.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems take Res and Query parameters by value."
)]
pub fn tick_creatures(
    time: Res<Time>,
    ground: Res<GroundResource>,
    settings: Res<LocomotionSettings>,
    mut creatures: Query<&mut Creature>,
) {
    if settings.paused {
        return;
    }
    let dt = time.delta_secs_f64();
    let ground: &dyn GroundQuery = ground.0.as_ref();
    for mut creature in &mut creatures {
        if settings.step_physics {
            if let Some(report) = creature.tick(ground, dt) {
                trace!("physics took {} steps", report.steps);
            }
        } else {
            crate::pipeline::tick(&mut creature.locomotion, ground, dt);
        }
    }
}

/// Installs the locomotion resources and systems.
#[derive(Default)]
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        debug!("installing locomotion plugin");
        app.init_resource::<GroundResource>();
        app.init_resource::<LocomotionSettings>();
        app.add_systems(Update, tick_creatures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LocomotionComponent;
    use rstest::rstest;

    #[rstest]
    fn plugin_initialises_resources() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(LocomotionPlugin);
        assert!(app.world().contains_resource::<GroundResource>());
        assert!(app.world().contains_resource::<LocomotionSettings>());
    }

    #[rstest]
    fn paused_creatures_do_not_advance() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(LocomotionPlugin);
        app.insert_resource(LocomotionSettings {
            step_physics: false,
            paused: true,
        });
        let entity = app
            .world_mut()
            .spawn(Creature::kinematic(LocomotionComponent::default()))
            .id();
        for _ in 0..3 {
            app.update();
        }
        let time = app
            .world()
            .get::<Creature>(entity)
            .map(|c| c.locomotion.time);
        assert_eq!(time, Some(0.0));
    }
}
