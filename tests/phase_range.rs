//! Phase bookkeeping stays in range for any frame delta.

use lope::codec::encode_pose;
use lope::constants::POSE_LEN;
use lope::gait::stance_alpha;
use lope::pipeline;
use lope::types::Gait;
use rstest::rstest;
use test_utils::{flat, tilted, WolfBuilder};

#[rstest]
#[case(Gait::Walk, 1.0)]
#[case(Gait::Trot, 2.5)]
#[case(Gait::Gallop, 6.0)]
#[case(Gait::Prowl, 0.4)]
fn phases_stay_in_the_unit_interval(#[case] gait: Gait, #[case] speed: f64) {
    let ground = tilted(0.1, -0.05);
    let mut wolf = WolfBuilder::new().gait(gait).speed(speed).build(&ground);
    let deltas = [
        0.0,
        1e-9,
        0.016,
        0.1,
        0.25,
        3.0,
        -1.0,
        f64::NAN,
        f64::INFINITY,
        1.0 / 144.0,
    ];
    let mut pose = [0.0; POSE_LEN];
    for round in 0..40 {
        for dt in deltas {
            pipeline::tick(&mut wolf, &ground, dt);
            let gait = &wolf.gait;
            assert!((0.0..1.0).contains(&gait.master_phase), "round {round}");
            for (phase, alpha) in gait.phases.iter().zip(gait.stance_alpha) {
                assert!((0.0..1.0).contains(phase), "phase {phase} after dt {dt}");
                assert!((0.0..=1.0).contains(&alpha));
            }
            assert!(encode_pose(&wolf, &mut pose));
            assert!(pose.iter().all(|v| v.is_finite()), "non-finite pose after dt {dt}");
        }
    }
    assert!(wolf.time.is_finite());
}

#[rstest]
#[case(0.3)]
#[case(0.5)]
#[case(0.75)]
#[case(0.9)]
fn stance_alpha_is_continuous_around_the_wrap(#[case] duty: f64) {
    let feather: f64 = 0.12;
    let half = (0.5 * feather).min(0.45 * (1.0 - duty)).min(0.45 * duty);
    let step = 1e-4;
    // Steepest slope of a smoothstep spanning `2 * half`.
    let bound = 1.01 * 1.5 / (2.0 * half) * step;
    let mut previous = stance_alpha(1.0 - step, duty, feather);
    for i in 0..=20_000 {
        let phase = (f64::from(i) * step).rem_euclid(1.0);
        let alpha = stance_alpha(phase, duty, feather);
        assert!(
            (alpha - previous).abs() <= bound,
            "jump of {} at phase {phase}",
            (alpha - previous).abs()
        );
        previous = alpha;
    }
}

#[test]
fn standing_still_keeps_every_leg_in_stance() {
    let ground = flat(0.0);
    let mut wolf = WolfBuilder::new().gait(Gait::Gallop).build(&ground);
    for _ in 0..120 {
        pipeline::tick(&mut wolf, &ground, 1.0 / 60.0);
    }
    assert!(wolf.gait.stance_alpha.iter().all(|a| (*a - 1.0).abs() < 1e-12));
    assert!(wolf.feet.iter().all(|f| f.locked));
}
