//! PD-driven joints, joint limits and the limit solver.
use crate::config::{MuscleParams, PdGains};
use crate::physics::muscle::MuscleGroup;
use crate::types::Leg;

/// Joints of the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointKind {
    /// Pelvis to torso: `[pitch, yaw]`.
    PelvisTorso,
    /// Torso to neck: `[pitch, yaw]`.
    TorsoNeck,
    /// Neck to head: `[pitch, yaw]`.
    NeckHead,
    /// Shoulder or hip of a leg: `[hip, knee, abduction]`.
    Leg(Leg),
}

impl JointKind {
    /// Degrees of freedom.
    #[must_use]
    pub const fn dof(self) -> usize {
        match self {
            Self::Leg(_) => 3,
            _ => 2,
        }
    }

    /// `(min, max)` per axis (rad). Unused axes are pinned at zero.
    #[must_use]
    pub const fn limits(self) -> [(f64, f64); 3] {
        match self {
            Self::PelvisTorso => [(-0.6, 0.6), (-0.4, 0.4), (0.0, 0.0)],
            Self::TorsoNeck => [(-0.8, 0.8), (-0.9, 0.9), (0.0, 0.0)],
            Self::NeckHead => [(-0.7, 0.7), (-0.6, 0.6), (0.0, 0.0)],
            Self::Leg(_) => [(-1.2, 1.2), (0.0, 2.6), (-0.4, 0.4)],
        }
    }

    /// Number of muscles in the group this joint drives.
    #[must_use]
    pub const fn muscle_count(self) -> u32 {
        match self {
            Self::PelvisTorso => 8,
            Self::TorsoNeck => 4,
            Self::NeckHead => 2,
            Self::Leg(leg) => {
                if leg.is_fore() {
                    6
                } else {
                    8
                }
            }
        }
    }
}

/// PD controller output for one axis.
///
/// The derivative term is the finite difference of the error over the step,
/// so a moving target is tracked without lag and a still target damps the
/// joint velocity. The result is clamped to `±gains.limit`.
#[must_use]
pub fn pd_output(gains: &PdGains, error: f64, previous_error: f64, dt: f64) -> f64 {
    let derivative = if dt > 0.0 {
        (error - previous_error) / dt
    } else {
        0.0
    };
    let raw = gains.kp * error + gains.kd * derivative;
    if raw.is_finite() {
        raw.clamp(-gains.limit, gains.limit)
    } else {
        0.0
    }
}

/// One joint with its controller state and muscle group.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    /// Which joint.
    pub kind: JointKind,
    /// Controller gains.
    pub gains: PdGains,
    /// Effective inertia of the driven chain (kg·m²).
    pub inertia: f64,
    /// Current angles.
    pub angles: [f64; 3],
    /// Angular velocities.
    pub velocities: [f64; 3],
    /// Target angles.
    pub targets: [f64; 3],
    /// Last controller outputs.
    pub commands: [f64; 3],
    /// Errors at the previous step.
    pub previous_errors: [f64; 3],
    /// Muscles driven by the primary axis.
    pub muscles: MuscleGroup,
}

impl Joint {
    /// A joint at rest with zero angles.
    #[must_use]
    pub fn new(kind: JointKind, gains: PdGains, inertia: f64) -> Self {
        Self {
            kind,
            gains,
            inertia: inertia.max(1e-3),
            angles: [0.0; 3],
            velocities: [0.0; 3],
            targets: [0.0; 3],
            commands: [0.0; 3],
            previous_errors: [0.0; 3],
            muscles: MuscleGroup::new(kind.muscle_count(), gains.limit * 8.0),
        }
    }

    /// Sets targets, clamped to the joint limits.
    pub fn set_targets(&mut self, targets: [f64; 3]) {
        for ((slot, target), (min, max)) in self
            .targets
            .iter_mut()
            .zip(targets)
            .zip(self.kind.limits())
        {
            *slot = if target.is_finite() {
                target.clamp(min, max)
            } else {
                0.0
            };
        }
    }

    /// Runs the controller, integrates the angles and drives the muscles.
    pub fn step(&mut self, muscle: &MuscleParams, dt: f64) {
        let dof = self.kind.dof();
        for axis in 0..dof {
            let (Some(angle), Some(velocity), Some(target), Some(command), Some(previous)) = (
                self.angles.get_mut(axis),
                self.velocities.get_mut(axis),
                self.targets.get(axis),
                self.commands.get_mut(axis),
                self.previous_errors.get_mut(axis),
            ) else {
                continue;
            };
            let error = target - *angle;
            *command = pd_output(&self.gains, error, *previous, dt);
            *previous = error;
            *velocity += *command / self.inertia * dt;
            *angle += *velocity * dt;
        }
        let [primary, ..] = self.angles;
        let [drive, ..] = self.commands;
        self.muscles.drive(drive, self.gains.limit, primary, muscle, dt);
    }

    /// One relaxed pass of the limit solver. Returns the largest violation
    /// seen before the correction.
    pub fn enforce_limits(&mut self, relaxation: f64) -> f64 {
        let mut worst: f64 = 0.0;
        for ((angle, velocity), (min, max)) in self
            .angles
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.kind.limits())
        {
            let clamped = angle.clamp(min, max);
            let violation = clamped - *angle;
            if violation.abs() > 0.0 {
                worst = worst.max(violation.abs());
                *angle += violation * relaxation;
                // Stop motion further into the limit.
                if *velocity * violation < 0.0 {
                    *velocity = 0.0;
                }
            }
        }
        worst
    }

    /// Current violation of the joint limits.
    #[must_use]
    pub fn violation(&self) -> f64 {
        self.angles
            .iter()
            .zip(self.kind.limits())
            .map(|(angle, (min, max))| (angle.clamp(min, max) - angle).abs())
            .fold(0.0, f64::max)
    }
}

/// Coupled limit on the summed pitch of a chain of joints. Returns the
/// excess before the correction.
pub fn enforce_chain_bend(chain: &mut [&mut Joint], limit: f64, relaxation: f64) -> f64 {
    let total: f64 = chain.iter().map(|j| j.angles.first().copied().unwrap_or(0.0)).sum();
    let excess = total.abs() - limit.max(0.0);
    if excess <= 0.0 || total.abs() <= f64::EPSILON {
        return 0.0;
    }
    let scale = 1.0 - relaxation * excess / total.abs();
    for joint in chain.iter_mut() {
        if let Some(pitch) = joint.angles.first_mut() {
            *pitch *= scale;
        }
    }
    excess
}

/// Current excess of a chain's summed pitch over `limit`.
#[must_use]
pub fn chain_excess(chain: &[&Joint], limit: f64) -> f64 {
    let total: f64 = chain.iter().map(|j| j.angles.first().copied().unwrap_or(0.0)).sum();
    (total.abs() - limit).max(0.0)
}
