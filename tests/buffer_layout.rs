//! Host-facing buffer layouts.

use glam::DVec2;
use lope::codec::{decode_inputs, encode_inputs, encode_pose, input, pose, PoseSnapshot};
use lope::components::LocomotionInputs;
use lope::constants::{INPUT_LEN, POSE_LEN};
use lope::pipeline;
use lope::types::{Action, Gait, PackRole};
use static_assertions::const_assert_eq;
use test_utils::{drive, flat, WolfBuilder};

const_assert_eq!(INPUT_LEN, 30);
const_assert_eq!(POSE_LEN, 40);
const_assert_eq!(input::FLAGS, INPUT_LEN - 1);
const_assert_eq!(pose::DEBUG, POSE_LEN - 1);
const_assert_eq!(pose::PLANT, pose::FEET + 8);

#[test]
fn short_input_buffers_leave_inputs_alone() {
    let mut inputs = LocomotionInputs {
        speed: 1.25,
        ..LocomotionInputs::default()
    };
    let before = inputs.clone();
    assert!(!decode_inputs(&[0.0; INPUT_LEN - 1], &mut inputs));
    assert_eq!(inputs, before);
}

#[test]
fn unknown_codes_decode_to_defaults() {
    let mut buffer = encode_inputs(&LocomotionInputs::default());
    buffer[input::GAIT] = 17.0;
    buffer[input::ACTION] = -3.0;
    buffer[input::PACK_ROLE] = f64::NAN;
    let mut inputs = LocomotionInputs {
        gait: Gait::Gallop,
        pack_role: PackRole::Leader,
        ..LocomotionInputs::default()
    };
    assert!(decode_inputs(&buffer, &mut inputs));
    assert_eq!(inputs.gait, Gait::Walk);
    assert_eq!(inputs.action, Action::None);
    // A non-finite slot keeps the previous value.
    assert_eq!(inputs.pack_role, PackRole::Leader);
}

#[test]
fn decoded_scalars_are_clamped() {
    let mut buffer = encode_inputs(&LocomotionInputs::default());
    buffer[input::ALERTNESS] = 4.0;
    buffer[input::SPEED] = -2.0;
    buffer[input::SYNC_PHASE] = 1.25;
    buffer[input::FLAGS] = f64::from(input::FLAG_AUTO_GAIT | input::FLAG_PIN_FEET);
    let mut inputs = LocomotionInputs::default();
    assert!(decode_inputs(&buffer, &mut inputs));
    assert!((inputs.alertness - 1.0).abs() < f64::EPSILON);
    assert!(inputs.speed.abs() < f64::EPSILON);
    assert!((inputs.sync_phase - 0.25).abs() < 1e-12);
    assert!(inputs.auto_gait && inputs.pin_feet);
}

#[test]
fn short_pose_buffers_are_untouched() {
    let wolf = WolfBuilder::new().build(&flat(0.0));
    let mut buffer = [7.0; POSE_LEN - 1];
    assert!(!encode_pose(&wolf, &mut buffer));
    assert!(buffer.iter().all(|v| (*v - 7.0).abs() < f64::EPSILON));
}

#[test]
fn long_pose_buffers_keep_their_tail() {
    let wolf = WolfBuilder::new().build(&flat(0.0));
    let mut buffer = [7.0; POSE_LEN + 3];
    assert!(encode_pose(&wolf, &mut buffer));
    assert!(buffer[POSE_LEN..].iter().all(|v| (*v - 7.0).abs() < f64::EPSILON));
}

#[test]
fn snapshot_matches_the_encoded_pose() {
    let ground = flat(0.0);
    let mut wolf = WolfBuilder::new().gait(Gait::Trot).speed(2.0).build(&ground);
    drive(&mut wolf, &ground, 1.0 / 60.0, 45);
    let mut buffer = [0.0; POSE_LEN];
    assert!(encode_pose(&wolf, &mut buffer));
    let snapshot = PoseSnapshot::capture(&wolf);
    assert_eq!(snapshot.to_buffer(), buffer);
    assert!((buffer[pose::ROOT_X] - wolf.root.position.x).abs() < f64::EPSILON);
    assert!((buffer[pose::PLANT + 2] - wolf.gait.stance_alpha[2]).abs() < f64::EPSILON);
}

#[test]
fn input_buffers_drive_the_pipeline() {
    let ground = flat(0.0);
    let mut wolf = WolfBuilder::new().build(&ground);
    let typed = LocomotionInputs {
        velocity: DVec2::new(1.0, 0.0),
        speed: 1.0,
        gait: Gait::Trot,
        ..LocomotionInputs::default()
    };
    let buffer = encode_inputs(&typed);
    pipeline::tick_with_inputs(&mut wolf, &buffer, &ground, 1.0 / 60.0);
    assert_eq!(wolf.inputs.gait, Gait::Trot);
    assert_eq!(wolf.gait.gait, Gait::Trot);
    assert!(wolf.time > 0.0);

    pipeline::tick_with_inputs(&mut wolf, &buffer[..5], &ground, 1.0 / 60.0);
    assert_eq!(wolf.inputs, typed);
}
