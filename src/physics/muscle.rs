//! Hill-style muscle groups.
//!
//! Muscles are driven by their joint's controller output. They do not push
//! the body; activation and fatigue are exposed for inspection and
//! visualisation.
use crate::config::MuscleParams;
use crate::numeric::clamp01;

/// Gaussian active force-length factor; 1 at the rest length.
#[must_use]
pub fn force_length(normalized_length: f64, width: f64) -> f64 {
    let width = width.max(f64::EPSILON);
    let x = (normalized_length - 1.0) / width;
    (-x * x).exp()
}

/// One muscle of a group.
#[derive(Clone, Debug, PartialEq)]
pub struct Muscle {
    /// `+1.0` for an agonist of the joint's primary axis, `-1.0` for an
    /// antagonist.
    pub direction: f64,
    /// Neural excitation in `[0, 1]`.
    pub excitation: f64,
    /// Activation in `[0, 1]`.
    pub activation: f64,
    /// Fatigue in `[0, 1]`.
    pub fatigue: f64,
    /// Length normalised to the rest length.
    pub length: f64,
    /// Peak isometric force (N).
    pub max_force: f64,
    /// Current active force (N).
    pub force: f64,
}

impl Muscle {
    /// A relaxed muscle at rest length.
    #[must_use]
    pub const fn new(direction: f64, max_force: f64) -> Self {
        Self {
            direction,
            excitation: 0.0,
            activation: 0.0,
            fatigue: 0.0,
            length: 1.0,
            max_force,
            force: 0.0,
        }
    }

    /// Advances activation, fatigue and force by `dt`.
    pub fn update(&mut self, excitation: f64, length: f64, params: &MuscleParams, dt: f64) {
        self.excitation = clamp01(excitation);
        self.length = length;
        let tau = if self.excitation > self.activation {
            params.activation_tau
        } else {
            params.deactivation_tau
        };
        let blend = (dt / tau.max(f64::EPSILON)).min(1.0);
        self.activation = clamp01(self.activation + (self.excitation - self.activation) * blend);
        let gain = params.fatigue_rate * self.activation;
        let recovery = params.recovery_rate * (1.0 - self.activation) * self.fatigue;
        self.fatigue = clamp01(self.fatigue + (gain - recovery) * dt);
        self.force = self.max_force
            * self.activation
            * force_length(self.length, params.force_length_width)
            * (1.0 - self.fatigue);
    }
}

/// Agonist/antagonist muscles driven by one joint.
#[derive(Clone, Debug, PartialEq)]
pub struct MuscleGroup {
    /// Muscles, alternating agonist and antagonist.
    pub muscles: Vec<Muscle>,
}

impl MuscleGroup {
    /// `count` muscles sharing `max_force` between them.
    #[must_use]
    pub fn new(count: u32, max_force: f64) -> Self {
        let share = max_force / f64::from(count.max(1));
        let muscles = (0..count)
            .map(|i| Muscle::new(if i % 2 == 0 { 1.0 } else { -1.0 }, share))
            .collect();
        Self { muscles }
    }

    /// Drives every muscle from a joint's controller output `command`
    /// (already clamped to `±limit`) and primary joint angle.
    pub fn drive(&mut self, command: f64, limit: f64, angle: f64, params: &MuscleParams, dt: f64) {
        let normalized = if limit > 0.0 { command / limit } else { 0.0 };
        for muscle in &mut self.muscles {
            let excitation = (muscle.direction * normalized).max(0.0);
            let length = 1.0 - muscle.direction * angle * params.length_per_radian;
            muscle.update(excitation, length, params, dt);
        }
    }

    /// Mean activation.
    #[must_use]
    pub fn activation(&self) -> f64 {
        mean(self.muscles.iter().map(|m| m.activation))
    }

    /// Mean fatigue.
    #[must_use]
    pub fn fatigue(&self) -> f64 {
        mean(self.muscles.iter().map(|m| m.fatigue))
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Muscle groups hold a handful of muscles."
)]
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn force_length_peaks_at_rest() {
        assert_relative_eq!(force_length(1.0, 0.45), 1.0);
        assert!(force_length(1.3, 0.45) < 1.0);
        assert_relative_eq!(force_length(1.3, 0.45), force_length(0.7, 0.45), epsilon = 1e-12);
    }

    #[test]
    fn activation_rises_faster_than_it_falls() {
        let params = MuscleParams::default();
        let mut m = Muscle::new(1.0, 100.0);
        m.update(1.0, 1.0, &params, 0.01);
        let rise = m.activation;
        m.activation = 1.0;
        m.update(0.0, 1.0, &params, 0.01);
        let fall = 1.0 - m.activation;
        assert!(rise > fall);
    }

    #[test]
    fn sustained_effort_fatigues_and_rest_recovers() {
        let params = MuscleParams::default();
        let mut group = MuscleGroup::new(8, 800.0);
        for _ in 0..1000 {
            group.drive(100.0, 100.0, 0.0, &params, 0.01);
        }
        let tired = group.fatigue();
        assert!(tired > 0.0);
        assert!(group.activation() > 0.4);
        for _ in 0..1000 {
            group.drive(0.0, 100.0, 0.0, &params, 0.01);
        }
        assert!(group.fatigue() < tired);
    }

    #[test]
    fn antagonists_stay_quiet() {
        let params = MuscleParams::default();
        let mut group = MuscleGroup::new(4, 400.0);
        group.drive(50.0, 100.0, 0.0, &params, 0.1);
        for m in &group.muscles {
            if m.direction < 0.0 {
                assert_relative_eq!(m.activation, 0.0);
            } else {
                assert!(m.activation > 0.0);
            }
        }
    }
}
