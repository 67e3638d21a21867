//! Ground query collaborator.
//!
//! The host supplies terrain through [`GroundQuery`]. The pipeline calls it
//! several times per tick (once per foothold candidate and once per paw in
//! the physics body), so implementations must be synchronous, pure and
//! deterministic for a given `(x, y)`.
use glam::DVec3;

use crate::vector_math::{ground_normal, UP};

/// Result of a single ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// Whether the probe found ground.
    pub hit: bool,
    /// Ground height at the probe (world `z`).
    pub z: f64,
    /// Upward unit normal.
    pub normal: DVec3,
    /// Host-defined material code.
    pub material: i32,
}

impl GroundHit {
    /// A hit on ground with the given height and normal.
    ///
    /// The normal is normalised and forced upward.
    #[must_use]
    pub fn new(z: f64, normal: DVec3, material: i32) -> Self {
        Self {
            hit: true,
            z,
            normal: ground_normal(normal),
            material,
        }
    }

    /// A probe that found nothing.
    #[must_use]
    pub const fn miss() -> Self {
        Self {
            hit: false,
            z: 0.0,
            normal: UP,
            material: 0,
        }
    }

    /// Whether the probe hit and every field is usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.hit && self.z.is_finite() && self.normal.is_finite()
    }
}

/// Synchronous terrain probe addressed by planar world coordinates.
pub trait GroundQuery {
    /// Probes the ground under `(x, y)`.
    fn ground_at(&self, x: f64, y: f64) -> GroundHit;
}

impl<T: GroundQuery + ?Sized> GroundQuery for &T {
    fn ground_at(&self, x: f64, y: f64) -> GroundHit {
        (**self).ground_at(x, y)
    }
}

impl<T: GroundQuery + ?Sized> GroundQuery for Box<T> {
    fn ground_at(&self, x: f64, y: f64) -> GroundHit {
        (**self).ground_at(x, y)
    }
}

/// Adapts a closure into a [`GroundQuery`].
///
/// ```
/// use glam::DVec3;
/// use lope::ground::{GroundFn, GroundHit, GroundQuery};
/// let ramp = GroundFn(|x: f64, _y: f64| GroundHit::new(0.1 * x, DVec3::new(-0.1, 0.0, 1.0), 0));
/// assert!((ramp.ground_at(2.0, 0.0).z - 0.2).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GroundFn<F>(pub F);

impl<F: Fn(f64, f64) -> GroundHit> GroundQuery for GroundFn<F> {
    fn ground_at(&self, x: f64, y: f64) -> GroundHit {
        (self.0)(x, y)
    }
}

/// Infinite horizontal plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatGround {
    /// Height of the plane.
    pub height: f64,
    /// Material reported for every probe.
    pub material: i32,
}

impl FlatGround {
    /// A flat plane at `height`.
    #[must_use]
    pub const fn at(height: f64) -> Self {
        Self {
            height,
            material: 0,
        }
    }
}

impl GroundQuery for FlatGround {
    fn ground_at(&self, _x: f64, _y: f64) -> GroundHit {
        GroundHit {
            hit: true,
            z: self.height,
            normal: UP,
            material: self.material,
        }
    }
}

/// Infinite tilted plane `z = height + gradient · (x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneGround {
    /// Height at the origin.
    pub height: f64,
    /// Rise per metre along `x`.
    pub gradient_x: f64,
    /// Rise per metre along `y`.
    pub gradient_y: f64,
}

impl GroundQuery for PlaneGround {
    fn ground_at(&self, x: f64, y: f64) -> GroundHit {
        let z = self.height + self.gradient_x * x + self.gradient_y * y;
        GroundHit::new(z, DVec3::new(-self.gradient_x, -self.gradient_y, 1.0), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_normal_leans_against_the_rise() {
        let plane = PlaneGround {
            height: 1.0,
            gradient_x: 0.5,
            gradient_y: 0.0,
        };
        let hit = plane.ground_at(2.0, 7.0);
        assert_relative_eq!(hit.z, 2.0);
        assert!(hit.normal.x < 0.0);
        assert_relative_eq!(hit.normal.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn downward_normals_are_flipped_to_up() {
        let hit = GroundHit::new(0.0, DVec3::NEG_Z, 3);
        assert_eq!(hit.normal, UP);
        assert_eq!(hit.material, 3);
    }

    #[test]
    fn boxed_queries_delegate() {
        let boxed: Box<dyn GroundQuery> = Box::new(FlatGround::at(0.25));
        assert_relative_eq!(boxed.ground_at(0.0, 0.0).z, 0.25);
        assert!(!GroundHit::miss().is_valid());
    }
}
