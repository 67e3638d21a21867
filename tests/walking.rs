//! Planted feet stay planted while the body walks over them.

use glam::DVec2;
use lope::constants::LEG_COUNT;
use lope::types::Gait;
use test_utils::{drive_with, flat, WolfBuilder};

const DT: f64 = 1.0 / 60.0;

#[test]
fn stance_feet_never_jump_while_walking() {
    let ground = flat(0.0);
    let speed = 1.0;
    let mut wolf = WolfBuilder::new().gait(Gait::Walk).speed(speed).build(&ground);
    let mut previous: [Option<DVec2>; LEG_COUNT] = [None; LEG_COUNT];
    let mut worst: f64 = 0.0;
    let mut planted_frames = 0;
    drive_with(&mut wolf, &ground, DT, 600, |wolf, frame| {
        for (foot, last) in wolf.feet.iter().zip(previous.iter_mut()) {
            let here = foot.position.truncate();
            if let (true, Some(before)) = (foot.locked, *last) {
                if frame > 60 {
                    worst = worst.max(here.distance(before));
                    planted_frames += 1;
                }
            }
            *last = foot.locked.then_some(here);
        }
    });
    assert!(planted_frames > 100, "only {planted_frames} planted frames");
    let body_step = speed * DT;
    assert!(
        worst < 5.0 * body_step,
        "stance foot slid {worst} m in one frame (body moves {body_step} m)"
    );
}
