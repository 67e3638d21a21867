//! Creature arena and engine bridge.
//!
//! Creatures live in a slot array addressed by generational
//! [`CreatureId`]s, so despawned slots are reused without handing stale ids
//! access to the new occupant. The arena owns the [`SeedRegistry`] that
//! gives every spawn its phase shift and noise seed.
//!
//! The bridge accessors (`spine_bend`, `set_leg`, ...) are addressed by raw
//! slot index for hosts that mirror creatures into an external skeleton
//! module. They never panic; bad indices and non-finite writes are rejected.
use glam::DVec2;
use log::{debug, trace, warn};

use crate::codec::decode_inputs;
use crate::components::{Creature, LocomotionComponent};
use crate::config::PhysicsConfig;
use crate::ground::GroundQuery;
use crate::physics::StepReport;
use crate::seeds::SeedRegistry;
use crate::types::Leg;

const PHASE_STREAM: &str = "gait-phase";
const NOISE_STREAM: &str = "noise";

/// Generational handle to a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CreatureId {
    index: usize,
    generation: u32,
}

impl CreatureId {
    /// Slot index, as used by the bridge accessors.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Generation of the slot when the id was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    creature: Option<Creature>,
}

/// Slot array of creatures.
#[derive(Clone, Debug, Default)]
pub struct CreatureArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    seeds: SeedRegistry,
}

impl CreatureArena {
    /// An empty arena whose seed streams derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            seeds: SeedRegistry::new(seed),
        }
    }

    /// Seed streams owned by the arena.
    pub fn seeds(&mut self) -> &mut SeedRegistry {
        &mut self.seeds
    }

    /// Adds a creature, giving it a global gait phase shift and a noise seed
    /// from the arena's seed streams. With `physics`, a physics body is
    /// spawned under its root.
    pub fn spawn(
        &mut self,
        mut locomotion: LocomotionComponent,
        physics: Option<PhysicsConfig>,
    ) -> CreatureId {
        locomotion.gait.phase_shift = self.seeds.stream(PHASE_STREAM).next_f64();
        locomotion.noise_seed = self.seeds.stream(NOISE_STREAM).range(0.0, 1000.0);
        let creature = match physics {
            Some(config) => Creature::with_physics(locomotion, config),
            None => Creature::kinematic(locomotion),
        };
        let index = self.free.pop().unwrap_or_else(|| {
            self.slots.push(Slot {
                generation: 0,
                creature: None,
            });
            self.slots.len() - 1
        });
        let mut generation = 0;
        if let Some(slot) = self.slots.get_mut(index) {
            slot.creature = Some(creature);
            generation = slot.generation;
        }
        let id = CreatureId { index, generation };
        debug!("spawned creature {} (generation {})", id.index, id.generation);
        id
    }

    /// Removes a creature. Stale ids return `None`.
    pub fn despawn(&mut self, id: CreatureId) -> Option<Creature> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let creature = slot.creature.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        debug!("despawned creature {}", id.index);
        Some(creature)
    }

    /// The creature behind `id`.
    #[must_use]
    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        let slot = self.slots.get(id.index)?;
        if slot.generation == id.generation {
            slot.creature.as_ref()
        } else {
            None
        }
    }

    /// The creature behind `id`, mutably.
    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation == id.generation {
            slot.creature.as_mut()
        } else {
            None
        }
    }

    /// Number of live creatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.creature.is_some()).count()
    }

    /// Whether no creature is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live creatures with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (CreatureId, &Creature)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let creature = slot.creature.as_ref()?;
            Some((
                CreatureId {
                    index,
                    generation: slot.generation,
                },
                creature,
            ))
        })
    }

    /// Decodes `inputs` into one creature and ticks it. Returns `None` for a
    /// stale id, otherwise the physics report (if the creature has a body).
    pub fn tick(
        &mut self,
        id: CreatureId,
        inputs: &[f64],
        ground: &dyn GroundQuery,
        dt: f64,
    ) -> Option<Option<StepReport>> {
        let creature = self.get_mut(id)?;
        if !decode_inputs(inputs, &mut creature.locomotion.inputs) {
            trace!("input buffer of {} values skipped", inputs.len());
        }
        Some(creature.tick(ground, dt))
    }

    /// Ticks every live creature with its current inputs.
    pub fn tick_all(&mut self, ground: &dyn GroundQuery, dt: f64) {
        for creature in self.slots.iter_mut().filter_map(|s| s.creature.as_mut()) {
            if let Some(report) = creature.tick(ground, dt) {
                trace!("physics residual {:.2e}", report.residual);
            }
        }
    }

    fn live(&self, index: usize) -> Option<&LocomotionComponent> {
        self.slots
            .get(index)?
            .creature
            .as_ref()
            .map(|c| &c.locomotion)
    }

    fn live_mut(&mut self, index: usize) -> Option<&mut LocomotionComponent> {
        let found = self
            .slots
            .get_mut(index)
            .and_then(|s| s.creature.as_mut())
            .map(|c| &mut c.locomotion);
        if found.is_none() {
            warn!("bridge write to empty slot {index}");
        }
        found
    }

    fn reject_non_finite(what: &str, index: usize, values: &[f64]) -> bool {
        if values.iter().all(|v| v.is_finite()) {
            false
        } else {
            warn!("rejected non-finite {what} for slot {index}");
            true
        }
    }

    /// Spine bend of the creature in slot `index`.
    #[must_use]
    pub fn spine_bend(&self, index: usize) -> Option<f64> {
        self.live(index).map(|c| c.spine.spine_curve)
    }

    /// Overwrites the spine bend. Returns `false` for a bad slot or value.
    pub fn set_spine_bend(&mut self, index: usize, value: f64) -> bool {
        if Self::reject_non_finite("spine bend", index, &[value]) {
            return false;
        }
        self.live_mut(index)
            .map(|c| c.spine.spine_curve = value)
            .is_some()
    }

    /// Head pitch of the creature in slot `index`.
    #[must_use]
    pub fn head_pitch(&self, index: usize) -> Option<f64> {
        self.live(index).map(|c| c.spine.head_pitch)
    }

    /// Overwrites the head pitch. Returns `false` for a bad slot or value.
    pub fn set_head_pitch(&mut self, index: usize, value: f64) -> bool {
        if Self::reject_non_finite("head pitch", index, &[value]) {
            return false;
        }
        self.live_mut(index)
            .map(|c| c.spine.head_pitch = value)
            .is_some()
    }

    /// Head yaw of the creature in slot `index`.
    #[must_use]
    pub fn head_yaw(&self, index: usize) -> Option<f64> {
        self.live(index).map(|c| c.spine.head_yaw)
    }

    /// Overwrites the head yaw. Returns `false` for a bad slot or value.
    pub fn set_head_yaw(&mut self, index: usize, value: f64) -> bool {
        if Self::reject_non_finite("head yaw", index, &[value]) {
            return false;
        }
        self.live_mut(index)
            .map(|c| c.spine.head_yaw = value)
            .is_some()
    }

    /// Body-frame forward offset of a foot from the root.
    #[must_use]
    pub fn leg_x(&self, index: usize, leg: usize) -> Option<f64> {
        let leg = Leg::from_index(leg)?;
        self.live(index)?.foot_offset(leg).map(|o| o.x)
    }

    /// Body-frame lateral offset of a foot from the root.
    #[must_use]
    pub fn leg_y(&self, index: usize, leg: usize) -> Option<f64> {
        let leg = Leg::from_index(leg)?;
        self.live(index)?.foot_offset(leg).map(|o| o.y)
    }

    /// Places a foot at a body-frame offset from the root. Returns `false`
    /// for a bad slot, leg or value.
    pub fn set_leg(&mut self, index: usize, leg: usize, x: f64, y: f64) -> bool {
        if Self::reject_non_finite("leg offset", index, &[x, y]) {
            return false;
        }
        let Some(leg) = Leg::from_index(leg) else {
            warn!("bridge write to unknown leg {leg} of slot {index}");
            return false;
        };
        self.live_mut(index)
            .map(|c| c.set_foot_offset(leg, DVec2::new(x, y)))
            .is_some()
    }
}
