//! Foot IK: stance locking and swing arcs.
//!
//! A planted foot is pinned to a lock point that slides slowly toward the
//! refined foothold and, when it drifts too far, re-grips by sliding back at
//! a bounded speed over a few frames; its height follows a spring-damper. A swinging foot releases the lock, glides toward the
//! predicted foothold and rides a parabolic arc over the landing height.
use glam::DVec3;

use crate::components::{ContactRecord, FootState, LocomotionComponent, PawOrientation};
use crate::config::IkParams;
use crate::gait::swing_progress;
use crate::ground::GroundQuery;
use crate::numeric::{clamp01, smoothing_factor, spring_damper_step};
use crate::terrain::{refine_foothold, terrain_friction, GroundFallback};
use crate::vector_math::pitch_roll_from_normal;

/// Peak of the swing arc at `speed` (m).
#[must_use]
pub fn swing_peak(params: &IkParams, speed: f64) -> f64 {
    params.swing_base_height + params.swing_speed_gain * speed.max(0.0) + params.swing_clearance
}

/// Height of the swing arc at progress `t`: `4t(1−t)·peak`.
#[must_use]
pub fn swing_arc(t: f64, peak: f64) -> f64 {
    let t = clamp01(t);
    4.0 * t * (1.0 - t) * peak
}

/// Paw orientation aligned to `normal`, facing `yaw`, with `lean` added to
/// the roll.
#[must_use]
pub fn paw_orientation(normal: DVec3, yaw: f64, lean: f64) -> PawOrientation {
    let (pitch, roll) = pitch_roll_from_normal(normal, yaw);
    PawOrientation {
        yaw,
        pitch,
        roll: roll + lean,
    }
}

/// Context shared by every leg for one tick.
#[derive(Clone, Copy, Debug)]
pub struct LegContext {
    /// Root yaw.
    pub yaw: f64,
    /// Root lean.
    pub lean: f64,
    /// Ground speed.
    pub speed: f64,
    /// Terrain friction coefficient.
    pub friction: f64,
    /// Duty factor in effect.
    pub duty: f64,
    /// Tick length (s).
    pub dt: f64,
}

/// Stance update of one foot.
pub fn stance(foot: &mut FootState, params: &IkParams, ctx: &LegContext) {
    let refined = foot.foothold.position;
    let refined_xy = refined.truncate();
    if !foot.locked {
        foot.locked = true;
        foot.regripping = false;
        foot.lock = refined;
    }
    let slide = smoothing_factor(params.lock_smoothing, ctx.dt);
    let mut lock_xy = foot.lock.truncate().lerp(refined_xy, slide);
    if lock_xy.distance(refined_xy) > params.anti_slip_threshold {
        foot.regripping = true;
    }
    if foot.regripping {
        let step = (params.regrip_speed + ctx.speed.max(0.0)) * ctx.dt;
        lock_xy += (refined_xy - lock_xy).clamp_length_max(step);
        let settled = params.anti_slip_threshold * (1.0 - params.anti_slip_blend);
        foot.regripping = lock_xy.distance(refined_xy) > settled;
    }
    foot.lock = lock_xy.extend(refined.z);

    let (z, vz) = spring_damper_step(
        foot.position.z,
        foot.vertical_velocity,
        foot.lock.z,
        params.foot_stiffness,
        params.foot_damping,
        ctx.dt,
    );
    foot.position = lock_xy.extend(z);
    foot.vertical_velocity = vz;

    foot.extension = 1.0;
    foot.lift = 0.0;
    foot.orientation = paw_orientation(foot.foothold.normal, ctx.yaw, ctx.lean);
    foot.contact = ContactRecord {
        active: true,
        force: (params.foot_stiffness * (foot.lock.z - z)).max(0.0),
        normal: foot.foothold.normal,
        material: foot.foothold.material,
        friction: ctx.friction,
    };
}

/// Swing update of one foot at `phase`.
pub fn swing(foot: &mut FootState, phase: f64, params: &IkParams, ctx: &LegContext) {
    foot.locked = false;
    foot.regripping = false;
    let landing = foot.foothold.position;
    let xy = foot
        .position
        .truncate()
        .lerp(landing.truncate(), smoothing_factor(params.swing_rate, ctx.dt));
    let peak = swing_peak(params, ctx.speed);
    let arc = swing_arc(swing_progress(phase, ctx.duty), peak);
    foot.position = xy.extend(landing.z + arc);
    foot.vertical_velocity = 0.0;
    foot.lift = if peak > 0.0 { clamp01(arc / peak) } else { 0.0 };
    foot.extension = 1.0 - params.swing_flexion * foot.lift;
    foot.orientation = paw_orientation(foot.foothold.normal, ctx.yaw, 0.0);
    foot.contact = ContactRecord {
        active: false,
        force: 0.0,
        normal: foot.foothold.normal,
        material: foot.foothold.material,
        friction: ctx.friction,
    };
}

/// Refines every foot target against the ground and runs the stance/swing
/// controller.
pub fn solve(component: &mut LocomotionComponent, ground: &dyn GroundQuery, dt: f64) {
    let inputs = &component.inputs;
    let params = &component.config.ik;
    let ctx = LegContext {
        yaw: component.root.yaw,
        lean: component.root.lean,
        speed: inputs.speed,
        friction: terrain_friction(inputs.terrain),
        duty: component.gait.duty,
        dt: dt.max(0.0),
    };
    let fallback = GroundFallback {
        height: inputs.ground_height,
        normal: inputs.slope_normal,
        material: inputs.ground_material,
    };
    let pinned = inputs.pin_feet || component.action.feet_pinned;
    for ((foot, alpha), phase) in component
        .feet
        .iter_mut()
        .zip(component.gait.stance_alpha)
        .zip(component.gait.phases)
    {
        let reference = if foot.locked {
            foot.lock.z
        } else {
            foot.position.z
        };
        foot.foothold = refine_foothold(
            foot.target.truncate(),
            reference,
            ground,
            &component.config.terrain,
            fallback,
        );
        if pinned || alpha > params.stance_threshold {
            stance(foot, params, &ctx);
        } else {
            swing(foot, phase, params, &ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Foothold;
    use approx::assert_relative_eq;

    fn ctx() -> LegContext {
        LegContext {
            yaw: 0.0,
            lean: 0.0,
            speed: 1.0,
            friction: 0.8,
            duty: 0.5,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn stance_entry_locks_to_the_foothold() {
        let mut foot = FootState::planted_at(DVec3::new(0.0, 0.0, 0.2));
        foot.foothold = Foothold::flat(DVec3::new(0.3, 0.1, 0.0));
        stance(&mut foot, &IkParams::default(), &ctx());
        assert!(foot.locked);
        assert_relative_eq!(foot.position.x, 0.3);
        assert!(foot.contact.active);
        assert_relative_eq!(foot.extension, 1.0);
    }

    #[test]
    fn stance_spring_settles_on_the_ground() {
        let mut foot = FootState::planted_at(DVec3::new(0.0, 0.0, 0.1));
        foot.foothold = Foothold::flat(DVec3::ZERO);
        for _ in 0..120 {
            stance(&mut foot, &IkParams::default(), &ctx());
        }
        assert_relative_eq!(foot.position.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn drifting_lock_regrips_over_several_frames() {
        let params = IkParams::default();
        let ctx = ctx();
        let mut foot = FootState::planted_at(DVec3::ZERO);
        foot.locked = true;
        foot.foothold = Foothold::flat(DVec3::new(0.3, 0.0, 0.0));
        let slide = smoothing_factor(params.lock_smoothing, ctx.dt);
        let step_limit = (params.regrip_speed + ctx.speed) * ctx.dt + 0.3 * slide + 1e-9;
        let mut frames = 0;
        let mut previous = foot.position.x;
        let settled = params.anti_slip_threshold * (1.0 - params.anti_slip_blend);
        while foot.foothold.position.x - foot.lock.x > settled {
            stance(&mut foot, &params, &ctx);
            assert!(foot.position.x - previous < step_limit, "slid {}", foot.position.x - previous);
            previous = foot.position.x;
            frames += 1;
            assert!(frames < 60, "lock never caught up");
        }
        assert!(frames > 2, "re-grip finished in {frames} frames");
        assert!(!foot.regripping);
    }

    #[test]
    fn a_small_drift_only_slides() {
        let params = IkParams::default();
        let mut foot = FootState::planted_at(DVec3::ZERO);
        foot.locked = true;
        foot.foothold = Foothold::flat(DVec3::new(0.05, 0.0, 0.0));
        stance(&mut foot, &params, &ctx());
        assert!(!foot.regripping);
        let slide = smoothing_factor(params.lock_smoothing, ctx().dt);
        assert_relative_eq!(foot.lock.x, 0.05 * slide, epsilon = 1e-12);
    }

    #[test]
    fn swing_arc_peaks_mid_swing() {
        let params = IkParams::default();
        let mut foot = FootState::planted_at(DVec3::ZERO);
        foot.locked = true;
        foot.foothold = Foothold::flat(DVec3::new(0.2, 0.0, 0.0));
        swing(&mut foot, 0.75, &params, &ctx());
        assert!(!foot.locked);
        assert_relative_eq!(foot.position.z, swing_peak(&params, 1.0), epsilon = 1e-12);
        assert_relative_eq!(foot.lift, 1.0, epsilon = 1e-12);
        assert_relative_eq!(foot.extension, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn arc_is_zero_at_the_ends() {
        assert_relative_eq!(swing_arc(0.0, 0.1), 0.0);
        assert_relative_eq!(swing_arc(1.0, 0.1), 0.0);
    }
}
