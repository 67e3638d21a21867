//! Ground fixtures.

use std::cell::Cell;

use glam::{DVec2, DVec3};
use lope::ground::{FlatGround, GroundHit, GroundQuery, PlaneGround};

/// Flat ground at `height`.
///
/// # Examples
/// ```
/// use lope::ground::GroundQuery;
/// let ground = test_utils::flat(0.5);
/// assert_eq!(ground.ground_at(3.0, -2.0).z, 0.5);
/// ```
pub fn flat(height: f64) -> FlatGround {
    FlatGround::at(height)
}

/// Plane through the origin rising `gradient_x` per metre along `x` and
/// `gradient_y` along `y`.
pub fn tilted(gradient_x: f64, gradient_y: f64) -> PlaneGround {
    PlaneGround {
        height: 0.0,
        gradient_x,
        gradient_y,
    }
}

/// A level step along `x`: `low` before `edge`, `high` from it onwards.
#[derive(Clone, Copy, Debug)]
pub struct StepGround {
    pub edge: f64,
    pub low: f64,
    pub high: f64,
}

impl GroundQuery for StepGround {
    fn ground_at(&self, x: f64, _y: f64) -> GroundHit {
        let z = if x < self.edge { self.low } else { self.high };
        GroundHit::new(z, DVec3::Z, 0)
    }
}

/// Flat ground at zero with a circular hole of `depth` where nothing is hit
/// when `bottomless` is set.
#[derive(Clone, Copy, Debug)]
pub struct PitGround {
    pub centre: DVec2,
    pub radius: f64,
    pub depth: f64,
    pub bottomless: bool,
}

impl GroundQuery for PitGround {
    fn ground_at(&self, x: f64, y: f64) -> GroundHit {
        if DVec2::new(x, y).distance(self.centre) > self.radius {
            return GroundHit::new(0.0, DVec3::Z, 0);
        }
        if self.bottomless {
            GroundHit::miss()
        } else {
            GroundHit::new(-self.depth, DVec3::Z, 1)
        }
    }
}

/// Wraps a ground and counts the probes made against it.
#[derive(Debug, Default)]
pub struct CountingGround<G> {
    pub inner: G,
    probes: Cell<usize>,
}

impl<G> CountingGround<G> {
    /// Wraps `inner` with a zeroed counter.
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            probes: Cell::new(0),
        }
    }

    /// Probes made so far.
    pub fn probes(&self) -> usize {
        self.probes.get()
    }

    /// Zeroes the counter.
    pub fn reset(&self) {
        self.probes.set(0);
    }
}

impl<G: GroundQuery> GroundQuery for CountingGround<G> {
    fn ground_at(&self, x: f64, y: f64) -> GroundHit {
        self.probes.set(self.probes.get() + 1);
        self.inner.ground_at(x, y)
    }
}
