//! Behavioural tests for the action overlays driven through the pipeline.
//!
//! Fixture steps are idempotent: rspec may run a context's `before_each`
//! more than once against the same environment.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use lope::components::LocomotionComponent;
use lope::types::{Action, LocomotionState};
use rspec::block::Context as Scenario;
use rspec_runner::run_serial;
use test_utils::{drive, drive_with, flat, WolfBuilder};

const DT: f64 = 1.0 / 60.0;

#[derive(Clone, Debug)]
struct HowlRun {
    wolf: LocomotionComponent,
    peak_jaw: f64,
    peak_neck: f64,
    howled: bool,
    silenced: bool,
}

impl HowlRun {
    fn start() -> Self {
        Self {
            wolf: WolfBuilder::new().action(Action::Howl).build(&flat(0.0)),
            peak_jaw: 0.0,
            peak_neck: 0.0,
            howled: false,
            silenced: false,
        }
    }

    fn howl_for_a_second(&mut self) {
        if std::mem::replace(&mut self.howled, true) {
            return;
        }
        let (mut jaw, mut neck) = (0.0_f64, 0.0_f64);
        drive_with(&mut self.wolf, &flat(0.0), DT, 60, |wolf, _| {
            jaw = jaw.max(wolf.action.jaw_open);
            neck = neck.max(wolf.action.neck_pitch_overlay);
        });
        self.peak_jaw = jaw;
        self.peak_neck = neck;
    }

    fn fall_silent(&mut self) {
        if std::mem::replace(&mut self.silenced, true) {
            return;
        }
        self.wolf.inputs.action = Action::None;
        drive(&mut self.wolf, &flat(0.0), DT, 30);
    }
}

#[test]
fn howl_opens_and_closes_the_jaw() {
    run_serial(&rspec::given(
        "a standing wolf told to howl",
        HowlRun::start(),
        |scenario: &mut Scenario<HowlRun>| {
            scenario.when("it howls for one second", |scenario| {
                scenario.before_each(HowlRun::howl_for_a_second);

                scenario.then("the jaw opens past half way", |run| {
                    assert!(run.peak_jaw > 0.5, "peak jaw {}", run.peak_jaw);
                });

                scenario.then("the neck is raised", |run| {
                    assert!(run.peak_neck > 0.3);
                    assert!(run.wolf.posed_neck_pitch() > run.wolf.spine.neck_pitch);
                });

                scenario.when("the action is cleared for half a second", |scenario| {
                    scenario.before_each(HowlRun::fall_silent);

                    scenario.then("the jaw has all but closed", |run| {
                        assert!(run.wolf.action.jaw_open < 0.05);
                    });

                    scenario.then("the neck overlay is gone", |run| {
                        assert_eq!(run.wolf.action.neck_pitch_overlay, 0.0);
                    });
                });
            });
        },
    ));
}

#[derive(Clone, Debug)]
struct StunRun {
    wolf: LocomotionComponent,
    stunned_ticks: usize,
    hit: bool,
    recovered: bool,
}

impl StunRun {
    fn start() -> Self {
        Self {
            wolf: WolfBuilder::new().speed(1.0).build(&flat(0.0)),
            stunned_ticks: 0,
            hit: false,
            recovered: false,
        }
    }

    fn take_a_hit(&mut self) {
        if std::mem::replace(&mut self.hit, true) {
            return;
        }
        drive(&mut self.wolf, &flat(0.0), DT, 30);
        self.wolf.inputs.action = Action::Stun;
        let mut stunned = 0;
        drive_with(&mut self.wolf, &flat(0.0), DT, 60, |wolf, _| {
            if wolf.state.current == LocomotionState::Stunned {
                stunned += 1;
            }
        });
        self.stunned_ticks = stunned;
    }

    fn wait_it_out(&mut self) {
        if std::mem::replace(&mut self.recovered, true) {
            return;
        }
        self.wolf.inputs.action = Action::None;
        drive(&mut self.wolf, &flat(0.0), DT, 240);
    }
}

#[test]
fn stun_overrides_locomotion_until_it_wears_off() {
    run_serial(&rspec::given(
        "a walking wolf",
        StunRun::start(),
        |scenario: &mut Scenario<StunRun>| {
            scenario.when("it is stunned", |scenario| {
                scenario.before_each(StunRun::take_a_hit);

                scenario.then("it enters the stunned state on the same tick", |run| {
                    assert_eq!(run.stunned_ticks, 60);
                    assert!(run.wolf.action.stunned());
                });

                scenario.when("the timer runs out", |scenario| {
                    scenario.before_each(StunRun::wait_it_out);

                    scenario.then("it walks again", |run| {
                        assert!(!run.wolf.action.stunned());
                        assert_eq!(run.wolf.state.current, LocomotionState::Walk);
                    });
                });
            });
        },
    ));
}
