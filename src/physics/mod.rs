//! Biomechanical physics body.
//!
//! A simplified multi-body approximation of the creature, stepped on a fixed
//! timestep behind an accumulator. The kinematic pipeline stays
//! authoritative for the rendered pose: the body reads the same targets
//! (spine bend, neck and head angles, foot positions), drives its joints
//! toward them with PD controllers and reports how far it had to diverge to
//! stay physically plausible.
//!
//! Each step:
//! 1. joint controllers run and feed their muscle groups;
//! 2. gravity, quadratic drag, ground-plane root tracking and an
//!    orientation controller act on the torso;
//! 3. pelvis, neck and head hang off the torso on stiff critically damped
//!    attachments;
//! 4. each leg solves two-bone IK from its target hip toward its foot
//!    target, its joint tracks the solution and the paw is sprung toward
//!    the joint's forward kinematics from the actual hip, with the reaction
//!    on the shoulder or hip. The legs alone hold the body up;
//! 5. paws collide with the ground through penalty contacts;
//! 6. every segment integrates with semi-implicit Euler;
//! 7. a bounded number of relaxed passes clamp the joint limits and the
//!    worst remaining violation is reported.
pub mod contact;
pub mod ik;
pub mod joint;
pub mod muscle;
pub mod segment;

use glam::{DQuat, DVec2, DVec3};
use log::trace;

use crate::components::LocomotionComponent;
use crate::config::PhysicsConfig;
use crate::constants::LEG_COUNT;
use crate::ground::GroundQuery;
use crate::numeric::{safe_atan2, shortest_angle};
use crate::types::Leg;
use crate::vector_math::planar_distance;

use self::contact::{resolve_contact, ContactForce};
use self::ik::{forward, solve_two_bone, LegSolution};
use self::joint::{chain_excess, enforce_chain_bend, Joint, JointKind};
use self::segment::{body_rotation, Segment, SegmentKind};

/// Kinematic pose the body is driven toward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhysicsTargets {
    /// Spine bend (rad).
    pub spine_bend: f64,
    /// Neck pitch (rad).
    pub neck_pitch: f64,
    /// Neck yaw (rad).
    pub neck_yaw: f64,
    /// Head pitch (rad).
    pub head_pitch: f64,
    /// Head yaw (rad).
    pub head_yaw: f64,
    /// World foot positions in leg order.
    pub feet: [DVec3; LEG_COUNT],
    /// Root position in the ground plane.
    pub root: DVec2,
    /// Root height.
    pub root_height: f64,
    /// Root yaw (rad).
    pub root_yaw: f64,
    /// Root pitch (rad, positive nose-up).
    pub root_pitch: f64,
}

impl PhysicsTargets {
    /// Targets from the current kinematic pose, action overlays included.
    #[must_use]
    pub fn from_component(component: &LocomotionComponent) -> Self {
        Self {
            spine_bend: component.posed_spine_curve(),
            neck_pitch: component.posed_neck_pitch(),
            neck_yaw: component.spine.neck_yaw,
            head_pitch: component.posed_head_pitch(),
            head_yaw: component.spine.head_yaw,
            feet: component.feet.each_ref().map(|foot| foot.position),
            root: component.root.position,
            root_height: component.root.height,
            root_yaw: component.root.yaw,
            root_pitch: component.root.pitch,
        }
    }
}

/// Outcome of one [`PhysicsBody::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Fixed steps run.
    pub steps: u32,
    /// Leftover fraction of a fixed step, for render interpolation.
    pub alpha: f64,
    /// Worst joint-limit violation left after the solver passes (rad).
    pub residual: f64,
}

/// One leg: the lumped paw segment, its joint and the latest solve.
#[derive(Clone, Debug, PartialEq)]
pub struct LegBody {
    /// Which leg.
    pub leg: Leg,
    /// Paw segment carrying the leg's mass.
    pub paw: Segment,
    /// Shoulder or hip joint.
    pub joint: Joint,
    /// IK solution toward the current foot target.
    pub solution: LegSolution,
    /// Ground contact during the last step.
    pub contact: Option<ContactForce>,
}

impl LegBody {
    /// `+1` for a knee folding forward (hind), `-1` for an elbow folding
    /// backward (fore).
    #[must_use]
    pub const fn bend(&self) -> f64 {
        if self.leg.is_fore() {
            -1.0
        } else {
            1.0
        }
    }
}

/// The simulated body.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsBody {
    /// Tuning.
    pub config: PhysicsConfig,
    /// Head segment.
    pub head: Segment,
    /// Neck segment.
    pub neck: Segment,
    /// Torso segment; the root of the body.
    pub torso: Segment,
    /// Pelvis segment.
    pub pelvis: Segment,
    /// Legs in leg order.
    pub legs: [LegBody; LEG_COUNT],
    /// Pelvis to torso joint.
    pub spine_joint: Joint,
    /// Torso to neck joint.
    pub neck_joint: Joint,
    /// Neck to head joint.
    pub head_joint: Joint,
    /// Simulated time (s).
    pub time: f64,
    /// Residual reported by the last step.
    pub residual: f64,
    accumulator: f64,
}

fn mirrored(offset: DVec3, leg: Leg) -> DVec3 {
    DVec3::new(offset.x, offset.y * leg.side(), offset.z)
}

fn joint_rotation(angles: [f64; 3]) -> DQuat {
    let [pitch, yaw, _] = angles;
    body_rotation(DVec3::new(0.0, pitch, yaw))
}

fn joint_euler(angles: [f64; 3]) -> DVec3 {
    let [pitch, yaw, _] = angles;
    DVec3::new(0.0, pitch, yaw)
}

/// Critically damped spring holding `child` at `anchor` on `parent`.
fn attach(child: &mut Segment, parent: &mut Segment, anchor: DVec3, stiffness: f64) {
    let damping = 2.0 * (stiffness * child.mass).sqrt();
    let force = (anchor - child.position) * stiffness - (child.velocity - parent.velocity) * damping;
    child.apply_force(force);
    parent.apply_force(-force);
}

impl PhysicsBody {
    /// A body at rest with its torso at `spawn`, facing `yaw`, legs hanging
    /// straight down.
    #[must_use]
    pub fn new(config: PhysicsConfig, spawn: DVec3, yaw: f64) -> Self {
        let g = &config.geometry;
        let m = &config.masses;
        let orientation = DVec3::new(0.0, 0.0, yaw);
        let rot = body_rotation(orientation);
        let leg_length = g.upper_leg + g.lower_leg;

        let mut torso = Segment::new(SegmentKind::Torso, m.torso, g.torso_length, g.torso_radius, spawn);
        torso.orientation = orientation;
        let pelvis_position = spawn + rot * g.pelvis_attach;
        let mut pelvis = Segment::new(
            SegmentKind::Pelvis,
            m.pelvis,
            g.pelvis_length,
            g.pelvis_radius,
            pelvis_position,
        );
        pelvis.orientation = orientation;
        let neck_position = spawn + rot * g.neck_attach;
        let mut neck = Segment::new(SegmentKind::Neck, m.neck, g.neck_length, g.neck_radius, neck_position);
        neck.orientation = orientation;
        let mut head = Segment::new(
            SegmentKind::Head,
            m.head,
            g.head_length,
            g.head_radius,
            neck_position + rot * g.head_attach,
        );
        head.orientation = orientation;

        let legs = Leg::ALL.map(|leg| {
            let (anchor, offset, gains) = if leg.is_fore() {
                (spawn, g.fore_anchor, config.fore_leg_joint)
            } else {
                (pelvis_position, g.hind_anchor, config.hind_leg_joint)
            };
            let hip = anchor + rot * mirrored(offset, leg);
            let mut paw = Segment::new(
                SegmentKind::Leg(leg),
                m.leg,
                leg_length,
                g.leg_radius,
                hip - DVec3::Z * leg_length,
            );
            paw.orientation = orientation;
            let inertia = m.leg * (leg_length * 0.5).powi(2);
            LegBody {
                leg,
                paw,
                joint: Joint::new(JointKind::Leg(leg), gains, inertia),
                solution: LegSolution {
                    hip: 0.0,
                    knee: 0.0,
                    clamped: false,
                },
                contact: None,
            }
        });

        let spine_joint = Joint::new(
            JointKind::PelvisTorso,
            config.spine_joint,
            m.pelvis * g.pelvis_attach.length_squared(),
        );
        let neck_joint = Joint::new(
            JointKind::TorsoNeck,
            config.neck_joint,
            (m.neck + m.head) * (g.neck_length * 0.5).powi(2),
        );
        let head_joint = Joint::new(
            JointKind::NeckHead,
            config.neck_joint,
            m.head * g.head_attach.length_squared(),
        );

        Self {
            config,
            head,
            neck,
            torso,
            pelvis,
            legs,
            spine_joint,
            neck_joint,
            head_joint,
            time: 0.0,
            residual: 0.0,
            accumulator: 0.0,
        }
    }

    /// Feeds a variable frame delta into the accumulator and runs the fixed
    /// steps it covers.
    ///
    /// The delta is clamped to `max_frame_dt` and at most `max_substeps`
    /// steps run; time beyond that is dropped rather than carried into the
    /// next frame.
    pub fn advance(
        &mut self,
        frame_dt: f64,
        targets: &PhysicsTargets,
        ground: &dyn GroundQuery,
    ) -> StepReport {
        let fixed = self.config.fixed_dt;
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.config.max_frame_dt)
        } else {
            0.0
        };
        self.accumulator += frame_dt;
        let mut steps = 0;
        while self.accumulator >= fixed && steps < self.config.max_substeps {
            self.step(fixed, targets, ground);
            self.accumulator -= fixed;
            steps += 1;
        }
        if self.accumulator >= fixed {
            trace!(
                "physics dropped {:.4}s after {steps} steps",
                self.accumulator - self.accumulator % fixed
            );
            self.accumulator %= fixed;
        }
        let report = StepReport {
            steps,
            alpha: self.accumulator / fixed,
            residual: self.residual,
        };
        trace!(
            "physics advanced {} steps, alpha {:.3}, residual {:.2e}",
            report.steps,
            report.alpha,
            report.residual
        );
        report
    }

    /// Runs exactly one step of `dt` seconds.
    pub fn step(&mut self, dt: f64, targets: &PhysicsTargets, ground: &dyn GroundQuery) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        let rot = body_rotation(self.torso.orientation);
        self.drive_axial_joints(targets, dt);
        self.apply_torso_forces(targets);
        self.apply_attachments(rot);
        self.apply_legs(rot, targets, ground, dt);
        self.integrate(dt);
        self.residual = self.solve_limits();
        self.time += dt;
    }

    fn drive_axial_joints(&mut self, targets: &PhysicsTargets, dt: f64) {
        let muscle = &self.config.muscle;
        self.spine_joint.set_targets([targets.spine_bend, 0.0, 0.0]);
        self.neck_joint
            .set_targets([targets.neck_pitch, targets.neck_yaw, 0.0]);
        self.head_joint
            .set_targets([targets.head_pitch, targets.head_yaw, 0.0]);
        self.spine_joint.step(muscle, dt);
        self.neck_joint.step(muscle, dt);
        self.head_joint.step(muscle, dt);
    }

    fn apply_torso_forces(&mut self, targets: &PhysicsTargets) {
        let c = &self.config;
        let torso = &mut self.torso;
        torso.apply_force(DVec3::NEG_Z * torso.mass * c.gravity);

        // Height is left to the legs; tracking only steers the ground plane.
        let error = targets.root - torso.position.truncate();
        let tracking = (error * c.root_tracking.kp - torso.velocity.truncate() * c.root_tracking.kd)
            .clamp_length_max(c.root_tracking.limit);
        torso.apply_force(tracking.extend(0.0));

        let speed = torso.velocity.length();
        torso.apply_force(-torso.velocity * speed * c.air_drag);

        let current = torso.orientation;
        let error = DVec3::new(
            -current.x,
            targets.root_pitch - current.y,
            shortest_angle(targets.root_yaw - current.z),
        );
        let gains = &c.orientation;
        let torque = (error * gains.kp - torso.angular_velocity * gains.kd)
            .clamp(DVec3::splat(-gains.limit), DVec3::splat(gains.limit));
        torso.apply_torque(torque);
    }

    fn apply_attachments(&mut self, rot: DQuat) {
        let c = &self.config;
        let g = &c.geometry;
        let gravity = DVec3::NEG_Z * c.gravity;

        let spine = rot * joint_rotation(self.spine_joint.angles);
        let pelvis_anchor = self.torso.position + spine * g.pelvis_attach;
        attach(&mut self.pelvis, &mut self.torso, pelvis_anchor, c.attach_stiffness);
        self.pelvis.orientation = self.torso.orientation + joint_euler(self.spine_joint.angles);

        let neck_rot = rot * joint_rotation(self.neck_joint.angles);
        let neck_anchor = self.torso.position + neck_rot * g.neck_attach;
        attach(&mut self.neck, &mut self.torso, neck_anchor, c.attach_stiffness);
        self.neck.orientation = self.torso.orientation + joint_euler(self.neck_joint.angles);

        let head_rot = neck_rot * joint_rotation(self.head_joint.angles);
        let head_anchor = self.neck.position + head_rot * g.head_attach;
        attach(&mut self.head, &mut self.neck, head_anchor, c.attach_stiffness);
        self.head.orientation = self.neck.orientation + joint_euler(self.head_joint.angles);

        for segment in [&mut self.pelvis, &mut self.neck, &mut self.head] {
            let weight = gravity * segment.mass;
            segment.apply_force(weight);
        }
    }

    fn apply_legs(
        &mut self,
        rot: DQuat,
        targets: &PhysicsTargets,
        ground: &dyn GroundQuery,
        dt: f64,
    ) {
        let c = &self.config;
        let g = &c.geometry;
        let target_rot = body_rotation(DVec3::new(0.0, targets.root_pitch, targets.root_yaw));
        let target_inverse = target_rot.inverse();
        let target_torso = targets.root.extend(targets.root_height);
        let target_pelvis = target_torso
            + target_rot * joint_rotation([targets.spine_bend, 0.0, 0.0]) * g.pelvis_attach;
        let yaw = self.torso.orientation.z;
        for (body, target) in self.legs.iter_mut().zip(targets.feet) {
            let leg = body.leg;
            let bend = body.bend();
            let (anchor, target_anchor, offset) = if leg.is_fore() {
                (&mut self.torso, target_torso, g.fore_anchor)
            } else {
                (&mut self.pelvis, target_pelvis, g.hind_anchor)
            };
            let hip = anchor.position + rot * mirrored(offset, leg);

            // Solved from where the hip should be, so a sagging body shortens
            // the leg and its spring pushes the anchor back up.
            let target_hip = target_anchor + target_rot * mirrored(offset, leg);
            let local = target_inverse * (target - target_hip);
            let down = -local.z;
            let abduction = safe_atan2(local.y, down.max(0.0), 0.0);
            let reach = if down >= 0.0 { down.hypot(local.y) } else { down };
            body.solution = solve_two_bone(g.upper_leg, g.lower_leg, DVec2::new(local.x, reach), bend);
            body.joint
                .set_targets([body.solution.hip, body.solution.knee, abduction]);
            body.joint.step(&c.muscle, dt);

            let [hip_angle, knee_angle, abduction_angle] = body.joint.angles;
            let planar = forward(g.upper_leg, g.lower_leg, hip_angle, knee_angle, bend);
            let (sin_abd, cos_abd) = abduction_angle.sin_cos();
            let reach_point = hip + rot * DVec3::new(planar.x, planar.y * sin_abd, -planar.y * cos_abd);

            let spring = &c.leg_spring;
            let force = ((reach_point - body.paw.position) * spring.kp
                - (body.paw.velocity - anchor.velocity) * spring.kd)
                .clamp_length_max(spring.limit);
            body.paw.apply_force(force + DVec3::NEG_Z * body.paw.mass * c.gravity);
            anchor.apply_force(-force);

            let hit = ground.ground_at(body.paw.position.x, body.paw.position.y);
            body.contact = resolve_contact(body.paw.position, body.paw.velocity, &hit, &c.contact);
            if let Some(contact) = &body.contact {
                body.paw.apply_force(contact.total);
            }
            body.paw.orientation = DVec3::new(0.0, 0.0, yaw);
        }
    }

    fn integrate(&mut self, dt: f64) {
        self.torso.integrate(dt);
        self.pelvis.integrate(dt);
        self.neck.integrate(dt);
        self.head.integrate(dt);
        for body in &mut self.legs {
            body.paw.integrate(dt);
        }
    }

    fn solve_limits(&mut self) -> f64 {
        let relaxation = self.config.relaxation;
        let limit = self.config.chain_bend_limit;
        for _ in 0..self.config.solver_passes {
            self.spine_joint.enforce_limits(relaxation);
            self.neck_joint.enforce_limits(relaxation);
            self.head_joint.enforce_limits(relaxation);
            for body in &mut self.legs {
                body.joint.enforce_limits(relaxation);
            }
            enforce_chain_bend(
                &mut [
                    &mut self.spine_joint,
                    &mut self.neck_joint,
                    &mut self.head_joint,
                ],
                limit,
                relaxation,
            );
        }
        let chain = chain_excess(&[&self.spine_joint, &self.neck_joint, &self.head_joint], limit);
        self.joints()
            .map(Joint::violation)
            .fold(chain, f64::max)
    }

    /// Every joint: spine, neck, head, then the legs in leg order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        [&self.spine_joint, &self.neck_joint, &self.head_joint]
            .into_iter()
            .chain(self.legs.iter().map(|body| &body.joint))
    }

    /// Every segment: head, neck, torso, pelvis, then the paws in leg order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        [&self.head, &self.neck, &self.torso, &self.pelvis]
            .into_iter()
            .chain(self.legs.iter().map(|body| &body.paw))
    }

    /// The segment of `kind`.
    #[must_use]
    pub fn segment(&self, kind: SegmentKind) -> &Segment {
        match kind {
            SegmentKind::Head => &self.head,
            SegmentKind::Neck => &self.neck,
            SegmentKind::Torso => &self.torso,
            SegmentKind::Pelvis => &self.pelvis,
            SegmentKind::Leg(leg) => {
                let [lf, rf, lh, rh] = &self.legs;
                match leg {
                    Leg::LeftFore => &lf.paw,
                    Leg::RightFore => &rf.paw,
                    Leg::LeftHind => &lh.paw,
                    Leg::RightHind => &rh.paw,
                }
            }
        }
    }

    /// Position of a segment interpolated between the last two steps.
    #[must_use]
    pub fn interpolated_position(&self, kind: SegmentKind, alpha: f64) -> DVec3 {
        self.segment(kind).interpolated(alpha)
    }

    /// Mass-weighted centre of all segments.
    #[must_use]
    pub fn center_of_mass(&self) -> DVec3 {
        let (weighted, mass) = self
            .segments()
            .fold((DVec3::ZERO, 0.0), |(sum, total), s| {
                (sum + s.position * s.mass, total + s.mass)
            });
        if mass > 0.0 {
            weighted / mass
        } else {
            self.torso.position
        }
    }

    /// Mean planar distance between the paws and the kinematic feet.
    #[must_use]
    pub fn divergence(&self, component: &LocomotionComponent) -> f64 {
        let total: f64 = self
            .legs
            .iter()
            .zip(&component.feet)
            .map(|(body, foot)| planar_distance(body.paw.position, foot.position))
            .sum();
        total / 4.0
    }

    /// Mean muscle fatigue across every joint.
    #[must_use]
    pub fn mean_fatigue(&self) -> f64 {
        let total: f64 = self.joints().map(|j| j.muscles.fatigue()).sum();
        total / 7.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::FlatGround;
    use approx::assert_relative_eq;

    fn standing() -> (LocomotionComponent, PhysicsBody) {
        let mut component = LocomotionComponent::default();
        component.place(DVec2::ZERO, 0.0, &FlatGround::default());
        let spawn = component.root.position.extend(component.root.height);
        let body = PhysicsBody::new(PhysicsConfig::default(), spawn, 0.0);
        (component, body)
    }

    #[test]
    fn legs_hang_under_their_anchors() {
        let (_, body) = standing();
        let lf = body.segment(SegmentKind::Leg(Leg::LeftFore));
        assert_relative_eq!(lf.position.x, 0.45, epsilon = 1e-12);
        assert_relative_eq!(lf.position.y, 0.16, epsilon = 1e-12);
        let rh = body.segment(SegmentKind::Leg(Leg::RightHind));
        assert_relative_eq!(rh.position.x, -0.45, epsilon = 1e-12);
        assert_relative_eq!(rh.position.y, -0.14, epsilon = 1e-12);
    }

    #[test]
    fn accumulator_runs_whole_steps() {
        let (component, mut body) = standing();
        let targets = PhysicsTargets::from_component(&component);
        let ground = FlatGround::default();
        let report = body.advance(0.02, &targets, &ground);
        assert_eq!(report.steps, 2);
        assert!(report.alpha >= 0.0 && report.alpha < 1.0);
        let report = body.advance(0.001, &targets, &ground);
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn long_frames_are_bounded() {
        let (component, mut body) = standing();
        let targets = PhysicsTargets::from_component(&component);
        let report = body.advance(10.0, &targets, &FlatGround::default());
        assert_eq!(report.steps, body.config.max_substeps);
        assert!(report.alpha < 1.0);
        let report = body.advance(f64::NAN, &targets, &FlatGround::default());
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn standing_body_settles_near_the_kinematic_pose() {
        let (component, mut body) = standing();
        let targets = PhysicsTargets::from_component(&component);
        let ground = FlatGround::default();
        for _ in 0..180 {
            body.advance(1.0 / 60.0, &targets, &ground);
        }
        assert!(body.segments().all(|s| s.position.is_finite()));
        assert!((body.torso.position.z - component.root.height).abs() < 0.1);
        assert!(body.divergence(&component) < 0.1);
        assert!(body.residual < 1e-2);
        let com = body.center_of_mass();
        assert!(com.z > 0.0 && com.z < component.root.height);
    }
}
