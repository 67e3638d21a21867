//! Behavioural test: a trotting wolf settles into diagonal pairs.
//!
//! A default wolf is switched from its initial walk to a trot at 2 m/s and
//! stepped at 16 ms for two seconds. The diagonal pairs must end up in
//! antiphase and the stance weight, averaged over the second half of the
//! run, must match the trot duty-factor curve.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use lope::components::LocomotionComponent;
use lope::config::GaitParams;
use lope::gait::duty_factor;
use lope::numeric::phase_delta;
use lope::types::{Gait, Leg};
use rspec::block::Context as Scenario;
use rspec_runner::run_serial;
use test_utils::{drive_with, flat, WolfBuilder};

const DT: f64 = 0.016;
const TICKS: usize = 120;
const SPEED: f64 = 2.0;

#[derive(Clone, Debug)]
struct TrotRun {
    wolf: LocomotionComponent,
    mean_stance: f64,
    ran: bool,
}

impl TrotRun {
    fn start() -> Self {
        let ground = flat(0.0);
        Self {
            wolf: WolfBuilder::new().gait(Gait::Trot).speed(SPEED).build(&ground),
            mean_stance: 0.0,
            ran: false,
        }
    }

    fn run(&mut self) {
        if std::mem::replace(&mut self.ran, true) {
            return;
        }
        let ground = flat(0.0);
        let mut sum = 0.0;
        let mut samples = 0.0;
        drive_with(&mut self.wolf, &ground, DT, TICKS, |wolf, frame| {
            if frame >= TICKS / 2 {
                sum += wolf.gait.stance_alpha.iter().sum::<f64>() / 4.0;
                samples += 1.0;
            }
        });
        self.mean_stance = sum / samples;
    }

    fn phase(&self, leg: Leg) -> f64 {
        self.wolf.gait.phases[leg.index()]
    }
}

#[test]
fn trotting_wolf_moves_diagonal_pairs_in_antiphase() {
    run_serial(&rspec::given(
        "a walking wolf asked to trot at 2 m/s",
        TrotRun::start(),
        |scenario: &mut Scenario<TrotRun>| {
            scenario.when("it is stepped at 16 ms for two seconds", |scenario| {
                scenario.before_each(TrotRun::run);

                scenario.then("the gait engine runs the trot", |run| {
                    assert_eq!(run.wolf.gait.gait, Gait::Trot);
                });

                scenario.then("each diagonal pair moves together", |run| {
                    let lf_rh = phase_delta(run.phase(Leg::LeftFore), run.phase(Leg::RightHind));
                    let rf_lh = phase_delta(run.phase(Leg::RightFore), run.phase(Leg::LeftHind));
                    assert!(lf_rh.abs() < 0.02, "LF/RH apart by {lf_rh}");
                    assert!(rf_lh.abs() < 0.02, "RF/LH apart by {rf_lh}");
                });

                scenario.then("the two pairs are in antiphase", |run| {
                    let pairs = phase_delta(run.phase(Leg::LeftFore), run.phase(Leg::RightFore));
                    assert!(
                        (pairs.abs() - 0.5).abs() < 0.02,
                        "pairs apart by {pairs}"
                    );
                });

                scenario.then("the mean stance weight matches the duty curve", |run| {
                    let expected = duty_factor(&GaitParams::trot(), SPEED);
                    assert!((run.wolf.gait.duty - expected).abs() < 1e-12);
                    assert!(
                        (run.mean_stance - expected).abs() < 0.03,
                        "mean stance {} vs duty {expected}",
                        run.mean_stance
                    );
                });
            });
        },
    ));
}
