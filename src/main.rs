//! Headless scenario driver printing creature poses as JSON.
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::DVec2;
use log::{debug, info};
use lope::{
    init_logging, Action, Creature, Gait, GroundQuery, LocomotionComponent, LocomotionConfig,
    PhysicsConfig, PlaneGround, PoseSnapshot,
};

/// Gaits selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum GaitArg {
    Walk,
    Trot,
    Gallop,
    Prowl,
    /// Pick the gait from speed every tick.
    Auto,
}

/// Actions selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ActionArg {
    None,
    Bite,
    Pounce,
    Howl,
    Stun,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::None => Self::None,
            ActionArg::Bite => Self::Bite,
            ActionArg::Pounce => Self::Pounce,
            ActionArg::Howl => Self::Howl,
            ActionArg::Stun => Self::Stun,
        }
    }
}

/// Runs a headless locomotion scenario and prints poses as JSON
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gait to request
    #[arg(long, value_enum, default_value_t = GaitArg::Walk)]
    gait: GaitArg,
    /// Ground speed (m/s)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
    /// Turn rate (rad/s, positive to the left)
    #[arg(long, default_value_t = 0.0)]
    turn_rate: f64,
    /// Simulated duration (s)
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,
    /// Frame delta (s)
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,
    /// Action overlay held for the whole run
    #[arg(long, value_enum, default_value_t = ActionArg::None)]
    action: ActionArg,
    /// Step a physics body alongside the kinematic pose
    #[arg(long)]
    physics: bool,
    /// JSON file overriding the locomotion tuning
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also print every Nth frame
    #[arg(long)]
    every: Option<u32>,
    /// Ground rise per metre along +x
    #[arg(long, default_value_t = 0.0)]
    slope: f64,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<LocomotionConfig> {
    let Some(path) = path else {
        return Ok(LocomotionConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    LocomotionConfig::from_json_str(&json)
        .with_context(|| format!("loading config {}", path.display()))
}

fn print_pose(out: &mut impl Write, component: &LocomotionComponent) -> Result<()> {
    let json = serde_json::to_string(&PoseSnapshot::capture(component))?;
    writeln!(out, "{json}")?;
    Ok(())
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "frame count is a clamped, non-negative float."
)]
fn frame_count(seconds: f64, dt: f64) -> u64 {
    if dt > 0.0 && seconds.is_finite() {
        (seconds.max(0.0) / dt).round().min(1e7) as u64
    } else {
        0
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let ground = PlaneGround {
        height: 0.0,
        gradient_x: args.slope,
        gradient_y: 0.0,
    };
    let mut locomotion = LocomotionComponent::new(load_config(args.config.as_ref())?);
    locomotion.place(DVec2::ZERO, 0.0, &ground);
    let mut creature = if args.physics {
        Creature::with_physics(locomotion, PhysicsConfig::default())
    } else {
        Creature::kinematic(locomotion)
    };

    let inputs = &mut creature.locomotion.inputs;
    match args.gait {
        GaitArg::Walk => inputs.gait = Gait::Walk,
        GaitArg::Trot => inputs.gait = Gait::Trot,
        GaitArg::Gallop => inputs.gait = Gait::Gallop,
        GaitArg::Prowl => inputs.gait = Gait::Prowl,
        GaitArg::Auto => inputs.auto_gait = true,
    }
    inputs.action = args.action.into();
    inputs.speed = args.speed.max(0.0);
    inputs.turn_rate = args.turn_rate;

    let frames = frame_count(args.seconds, args.dt);
    info!("running {frames} frames of {:?}", args.gait);
    let mut heading: f64 = 0.0;
    let mut out = io::stdout().lock();
    for frame in 0..frames {
        heading += args.turn_rate * args.dt;
        let inputs = &mut creature.locomotion.inputs;
        inputs.velocity = DVec2::from_angle(heading) * inputs.speed;
        inputs.world_position += inputs.velocity * args.dt;
        let hit = ground.ground_at(inputs.world_position.x, inputs.world_position.y);
        inputs.slope_normal = hit.normal;
        inputs.ground_height = hit.z;
        if let Some(report) = creature.tick(&ground, args.dt) {
            debug!(
                "frame {frame}: {} physics steps, residual {:.2e}",
                report.steps, report.residual
            );
        }
        if args
            .every
            .is_some_and(|n| n > 0 && frame % u64::from(n) == 0)
        {
            print_pose(&mut out, &creature.locomotion)?;
        }
    }
    print_pose(&mut out, &creature.locomotion)?;
    if let Some(body) = &creature.body {
        info!(
            "physics divergence {:.3} m, mean muscle fatigue {:.3}",
            body.divergence(&creature.locomotion),
            body.mean_fatigue()
        );
    }
    Ok(())
}
