//! Enumerations shared by every layer of the pipeline.
//!
//! All of them travel through the numeric buffers as integer codes; see
//! [`crate::codec`] for the offsets.

coded_enum! {
    /// Named locomotion pattern.
    pub enum Gait {
        /// Four-beat lateral sequence.
        Walk = 0,
        /// Diagonal pairs in antiphase.
        Trot = 1,
        /// Rotary gallop with a suspended phase.
        Gallop = 2,
        /// Low, slow stalking walk.
        Prowl = 3,
    }
    fallback = Walk;
}

coded_enum! {
    /// High-level locomotion state used for posture crossfades.
    pub enum LocomotionState {
        /// Standing still, relaxed.
        Idle = 0,
        /// Stalking.
        Prowl = 1,
        /// Walking.
        Walk = 2,
        /// Trotting.
        Trot = 3,
        /// Galloping.
        Gallop = 4,
        /// Standing still, braced.
        CombatReady = 5,
        /// Hit reaction; overrides everything while the stun timer runs.
        Stunned = 6,
    }
    fallback = Idle;
}

coded_enum! {
    /// Discrete, mutually exclusive action overlay.
    pub enum Action {
        /// No overlay.
        None = 0,
        /// Repeating jaw snap.
        Bite = 1,
        /// Crouched anticipation that releases when the action is cleared.
        Pounce = 2,
        /// Sustained vocalisation with raised neck.
        Howl = 3,
        /// Hit reaction; starts the stun timer on its rising edge.
        Stun = 4,
    }
    fallback = None;
}

coded_enum! {
    /// Emotional state supplied by the behaviour layer.
    pub enum EmotionalState {
        /// Neutral.
        Calm = 0,
        /// Hostile.
        Aggressive = 1,
        /// Afraid.
        Fearful = 2,
        /// Cornered or starving.
        Desperate = 3,
        /// Dominant.
        Confident = 4,
        /// Thwarted.
        Frustrated = 5,
    }
    fallback = Calm;
}

coded_enum! {
    /// Coarse terrain class under the creature.
    pub enum TerrainType {
        /// Open ground.
        Open = 0,
        /// Forest floor.
        Forest = 1,
        /// Rocky ground.
        Rocky = 2,
        /// Snow.
        Snow = 3,
        /// Ice.
        Ice = 4,
        /// Mud.
        Mud = 5,
    }
    fallback = Open;
}

coded_enum! {
    /// Role of the creature within its pack.
    pub enum PackRole {
        /// Pack leader.
        Leader = 0,
        /// Heavy hitter.
        Bruiser = 1,
        /// Flanker.
        Skirmisher = 2,
        /// Support.
        Support = 3,
        /// Scout; also used for lone creatures.
        Scout = 4,
    }
    fallback = Scout;
}

/// One of the four legs, in buffer order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Leg {
    /// Left fore.
    LeftFore,
    /// Right fore.
    RightFore,
    /// Left hind.
    LeftHind,
    /// Right hind.
    RightHind,
}

impl Leg {
    /// Legs in buffer order.
    pub const ALL: [Self; 4] = [
        Self::LeftFore,
        Self::RightFore,
        Self::LeftHind,
        Self::RightHind,
    ];

    /// Position of this leg in per-leg arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::LeftFore => 0,
            Self::RightFore => 1,
            Self::LeftHind => 2,
            Self::RightHind => 3,
        }
    }

    /// Looks a leg up by array index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::LeftFore),
            1 => Some(Self::RightFore),
            2 => Some(Self::LeftHind),
            3 => Some(Self::RightHind),
            _ => None,
        }
    }

    /// Whether this is a fore leg.
    #[must_use]
    pub const fn is_fore(self) -> bool {
        matches!(self, Self::LeftFore | Self::RightFore)
    }

    /// `+1` for left legs, `-1` for right legs (body `+y` is left).
    #[must_use]
    pub const fn side(self) -> f64 {
        match self {
            Self::LeftFore | Self::LeftHind => 1.0,
            Self::RightFore | Self::RightHind => -1.0,
        }
    }
}
