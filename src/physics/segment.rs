//! Rigid capsule segments of the physics body.
use glam::{DQuat, DVec3, EulerRot};

use crate::types::Leg;

/// Which part of the body a segment models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Skull and jaw.
    Head,
    /// Neck.
    Neck,
    /// Chest and shoulders; the root of the body.
    Torso,
    /// Hips.
    Pelvis,
    /// A leg, lumped at its paw.
    Leg(Leg),
}

impl SegmentKind {
    /// Every segment, body first and then the legs in leg order.
    pub const ALL: [Self; 8] = [
        Self::Head,
        Self::Neck,
        Self::Torso,
        Self::Pelvis,
        Self::Leg(Leg::LeftFore),
        Self::Leg(Leg::RightFore),
        Self::Leg(Leg::LeftHind),
        Self::Leg(Leg::RightHind),
    ];
}

/// Moments of inertia of a solid capsule of mass `mass`, radius `radius`
/// and length `length`, as `(transverse, axial)`.
#[must_use]
pub fn capsule_inertia(mass: f64, radius: f64, length: f64) -> (f64, f64) {
    let transverse = mass * (3.0 * radius * radius + length * length) / 12.0;
    let axial = mass * radius * radius / 2.0;
    (transverse, axial)
}

/// Rotation of a body-frame vector into the world for Euler angles
/// `(roll, pitch, yaw)` with pitch positive nose-up.
#[must_use]
pub fn body_rotation(euler: DVec3) -> DQuat {
    DQuat::from_euler(EulerRot::ZYX, euler.z, -euler.y, euler.x)
}

/// One rigid segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Part of the body.
    pub kind: SegmentKind,
    /// Mass (kg).
    pub mass: f64,
    /// Capsule length (m).
    pub length: f64,
    /// Capsule radius (m).
    pub radius: f64,
    /// Centre position.
    pub position: DVec3,
    /// Position before the last step, for render interpolation.
    pub prev_position: DVec3,
    /// Linear velocity.
    pub velocity: DVec3,
    /// Euler angles `(roll, pitch, yaw)`.
    pub orientation: DVec3,
    /// Angular velocity about `(roll, pitch, yaw)`.
    pub angular_velocity: DVec3,
    /// Force accumulated this step.
    pub force: DVec3,
    /// Torque accumulated this step.
    pub torque: DVec3,
    /// Moments of inertia about `(roll, pitch, yaw)`; the long axis is the
    /// body's forward axis.
    pub inertia: DVec3,
}

impl Segment {
    /// A resting segment at `position`.
    #[must_use]
    pub fn new(kind: SegmentKind, mass: f64, length: f64, radius: f64, position: DVec3) -> Self {
        let (transverse, axial) = capsule_inertia(mass, radius, length);
        Self {
            kind,
            mass,
            length,
            radius,
            position,
            prev_position: position,
            velocity: DVec3::ZERO,
            orientation: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            force: DVec3::ZERO,
            torque: DVec3::ZERO,
            inertia: DVec3::new(axial, transverse, transverse),
        }
    }

    /// Adds a force for this step.
    pub fn apply_force(&mut self, force: DVec3) {
        if force.is_finite() {
            self.force += force;
        }
    }

    /// Adds a torque for this step.
    pub fn apply_torque(&mut self, torque: DVec3) {
        if torque.is_finite() {
            self.torque += torque;
        }
    }

    /// Semi-implicit Euler: velocities first, then positions from the new
    /// velocities. Clears the accumulators.
    pub fn integrate(&mut self, dt: f64) {
        self.prev_position = self.position;
        self.velocity += self.force / self.mass.max(f64::EPSILON) * dt;
        self.position += self.velocity * dt;
        let inertia = self.inertia.max(DVec3::splat(f64::EPSILON));
        self.angular_velocity += self.torque / inertia * dt;
        self.orientation += self.angular_velocity * dt;
        self.force = DVec3::ZERO;
        self.torque = DVec3::ZERO;
    }

    /// Linear interpolation between the last two positions.
    #[must_use]
    pub fn interpolated(&self, alpha: f64) -> DVec3 {
        self.prev_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }
}
