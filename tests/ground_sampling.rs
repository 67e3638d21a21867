//! The pipeline samples the ground through the host-supplied query only.

use glam::{DVec2, DVec3};
use lope::components::LocomotionComponent;
use lope::ground::{GroundHit, GroundQuery};
use lope::pipeline;
use lope::terrain::CANDIDATES;
use mockall::mock;
use test_utils::{flat, CountingGround, PitGround, WolfBuilder};

mock! {
    pub Ground {}
    impl GroundQuery for Ground {
        fn ground_at(&self, x: f64, y: f64) -> GroundHit;
    }
}

fn standing_wolf() -> LocomotionComponent {
    WolfBuilder::new().build(&flat(0.0))
}

#[test]
fn every_foot_probes_each_candidate_once_per_step() {
    let mut ground = MockGround::new();
    ground
        .expect_ground_at()
        .times(4 * CANDIDATES.len())
        .returning(|_, _| GroundHit::new(0.0, DVec3::Z, 0));
    let mut wolf = standing_wolf();
    pipeline::tick(&mut wolf, &ground, 1.0 / 60.0);
}

#[test]
fn long_frames_probe_once_per_sub_step() {
    let ground = CountingGround::new(flat(0.0));
    let mut wolf = standing_wolf();
    pipeline::tick(&mut wolf, &ground, 0.09);
    let steps = pipeline::substeps(0.09) as usize;
    assert_eq!(ground.probes(), steps * 4 * CANDIDATES.len());
}

#[test]
fn probes_stay_near_the_feet() {
    let wolf = standing_wolf();
    let feet: Vec<DVec2> = wolf.feet.iter().map(|f| f.position.truncate()).collect();
    let mut ground = MockGround::new();
    ground
        .expect_ground_at()
        .withf(move |x, y| {
            let probe = DVec2::new(*x, *y);
            feet.iter().any(|f| f.distance(probe) < 0.2)
        })
        .returning(|_, _| GroundHit::new(0.0, DVec3::Z, 0));
    let mut wolf = wolf;
    pipeline::tick(&mut wolf, &ground, 1.0 / 60.0);
}

#[test]
fn missing_ground_falls_back_to_the_body_height() {
    let mut ground = MockGround::new();
    ground.expect_ground_at().returning(|_, _| GroundHit::miss());
    let mut wolf = standing_wolf();
    wolf.inputs.ground_height = -0.25;
    for _ in 0..60 {
        pipeline::tick(&mut wolf, &ground, 1.0 / 60.0);
    }
    for foot in &wolf.feet {
        assert!(!foot.foothold.hit);
        assert!((foot.foothold.position.z + 0.25).abs() < 1e-12);
        assert!(foot.position.z.is_finite());
    }
}

#[test]
fn a_bottomless_pit_under_one_foot_keeps_the_pose_finite() {
    let ground = PitGround {
        centre: DVec2::new(0.45, 0.16),
        radius: 0.3,
        depth: 0.0,
        bottomless: true,
    };
    let mut wolf = WolfBuilder::new().speed(1.0).build(&flat(0.0));
    for _ in 0..120 {
        pipeline::tick(&mut wolf, &ground, 1.0 / 60.0);
    }
    assert!(wolf.root.height.is_finite());
    assert!(wolf.feet.iter().all(|f| f.position.is_finite()));
}
