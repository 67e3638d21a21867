//! Utility helpers for tests.
//!
//! Ground fixtures, creature builders and a `drive` loop that plays the
//! host's part: it advances the world position by the commanded velocity,
//! samples the ground under the body and ticks the pipeline.
pub mod builders;
pub mod ground;

pub use builders::{drive, drive_with, WolfBuilder};
pub use ground::{flat, tilted, CountingGround, PitGround, StepGround};
