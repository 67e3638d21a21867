//! Deterministic seed streams keyed by name.
//!
//! The registry is owned by whoever runs the simulation (normally the
//! [`crate::arena::CreatureArena`]) and passed around by reference. Each
//! named stream is an independent xorshift generator whose start state is
//! derived from the registry seed and the stream name, so two registries
//! built from the same seed hand out the same numbers in the same order.
use hashbrown::HashMap;

/// One xorshift64 stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedStream {
    state: u64,
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

impl SeedStream {
    /// A stream for `name` under the registry seed `seed`.
    #[must_use]
    pub fn new(seed: u64, name: &str) -> Self {
        let state = fnv1a(name.as_bytes()) ^ seed.rotate_left(17);
        // xorshift never leaves zero.
        Self {
            state: if state == 0 { 0x9e37_79b9_7f4a_7c15 } else { state },
        }
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        // Fill the mantissa of a number in [1, 2).
        let bits = (self.next_u64() >> 12) | 0x3ff0_0000_0000_0000;
        f64::from_bits(bits) - 1.0
    }

    /// Next value in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }
}

/// Named seed streams.
#[derive(Clone, Debug, Default)]
pub struct SeedRegistry {
    seed: u64,
    streams: HashMap<String, SeedStream>,
}

impl SeedRegistry {
    /// An empty registry rooted at `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    /// Root seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The stream called `name`, created on first use.
    pub fn stream(&mut self, name: &str) -> &mut SeedStream {
        let seed = self.seed;
        self.streams
            .entry_ref(name)
            .or_insert_with(|| SeedStream::new(seed, name))
    }

    /// Number of streams created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no stream has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
