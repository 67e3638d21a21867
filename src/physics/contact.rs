//! Penalty contact between a paw and the ground.
use glam::DVec3;

use crate::config::ContactParams;
use crate::ground::GroundHit;

/// Contact force on one paw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactForce {
    /// Penetration depth along the ground normal (m).
    pub penetration: f64,
    /// Normal force magnitude (N).
    pub normal_force: f64,
    /// Friction force (N).
    pub friction: DVec3,
    /// Total force to apply.
    pub total: DVec3,
}

/// Computes the contact force on a paw at `position` moving at `velocity`.
///
/// Returns `None` when the ground query missed or the paw is above the
/// ground. The normal force is `kn·penetration − cn·v_n`, clamped at zero;
/// separation is damped by the restitution fraction of `cn` only. Friction
/// is viscous in the tangential velocity and capped by the Coulomb cone.
#[must_use]
pub fn resolve_contact(
    position: DVec3,
    velocity: DVec3,
    hit: &GroundHit,
    params: &ContactParams,
) -> Option<ContactForce> {
    if !hit.is_valid() {
        return None;
    }
    let normal = hit.normal;
    let penetration = (hit.z - position.z) * normal.z;
    if penetration <= 0.0 {
        return None;
    }
    let normal_speed = velocity.dot(normal);
    let damping = if normal_speed < 0.0 {
        params.damping
    } else {
        params.damping * params.restitution
    };
    let normal_force = (params.stiffness * penetration - damping * normal_speed).max(0.0);
    let tangential = velocity - normal * normal_speed;
    let friction = (-tangential * params.tangential_damping)
        .clamp_length_max(params.friction * normal_force);
    Some(ContactForce {
        penetration,
        normal_force,
        friction,
        total: normal * normal_force + friction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::segment::{Segment, SegmentKind};
    use crate::types::Leg;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 120.0;
    const GRAVITY: f64 = 9.81;

    #[test]
    fn no_force_above_ground_or_on_miss() {
        let params = ContactParams::default();
        let hit = GroundHit::new(0.0, DVec3::Z, 0);
        assert!(resolve_contact(DVec3::new(0.0, 0.0, 0.1), DVec3::ZERO, &hit, &params).is_none());
        assert!(resolve_contact(DVec3::ZERO, DVec3::ZERO, &GroundHit::miss(), &params).is_none());
    }

    #[test]
    fn resting_paw_balances_its_weight() {
        let params = ContactParams::default();
        let hit = GroundHit::new(0.0, DVec3::Z, 0);
        let mut paw = Segment::new(SegmentKind::Leg(Leg::LeftFore), 2.5, 0.58, 0.04, DVec3::ZERO);
        let weight = paw.mass * GRAVITY;
        let mut penetration_at_one_second = 0.0;
        let mut last = ContactForce::default();
        for step in 1..=240 {
            paw.apply_force(DVec3::new(0.0, 0.0, -weight));
            if let Some(contact) = resolve_contact(paw.position, paw.velocity, &hit, &params) {
                paw.apply_force(contact.total);
                last = contact;
            }
            paw.integrate(DT);
            if step == 120 {
                penetration_at_one_second = last.penetration;
            }
        }
        assert_relative_eq!(last.normal_force, weight, max_relative = 0.01);
        assert_relative_eq!(last.penetration, weight / params.stiffness, max_relative = 0.01);
        assert!(last.penetration <= penetration_at_one_second + 1e-6);
    }

    #[test]
    fn friction_is_capped_by_the_cone() {
        let params = ContactParams::default();
        let hit = GroundHit::new(0.0, DVec3::Z, 0);
        let contact = resolve_contact(
            DVec3::new(0.0, 0.0, -0.01),
            DVec3::new(5.0, 0.0, 0.0),
            &hit,
            &params,
        )
        .expect("paw below ground is in contact");
        assert_relative_eq!(
            contact.friction.length(),
            params.friction * contact.normal_force,
            epsilon = 1e-9
        );
        assert!(contact.friction.x < 0.0);
    }
}
