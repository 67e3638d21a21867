//! Terrain-aware foothold refinement.
//!
//! A nominal foot target is refined by probing a ring of nine candidates
//! (centre, four axis points, four diagonals) and keeping the cheapest one.
//! The search is greedy and single-shot.
use std::f64::consts::FRAC_1_SQRT_2;

use glam::{DVec2, DVec3};

use crate::config::TerrainParams;
use crate::ground::GroundQuery;
use crate::types::TerrainType;
use crate::vector_math::{ground_normal, UP};

/// Planar offsets (in units of the sample radius) and weights of the
/// foothold candidates.
pub const CANDIDATES: [(DVec2, f64); 9] = [
    (DVec2::new(0.0, 0.0), 1.0),
    (DVec2::new(1.0, 0.0), 0.5),
    (DVec2::new(-1.0, 0.0), 0.5),
    (DVec2::new(0.0, 1.0), 0.5),
    (DVec2::new(0.0, -1.0), 0.5),
    (DVec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2), 0.25),
    (DVec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2), 0.25),
    (DVec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2), 0.25),
    (DVec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2), 0.25),
];

/// A refined foothold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Foothold {
    /// Foothold position on the ground.
    pub position: DVec3,
    /// Ground normal at the foothold.
    pub normal: DVec3,
    /// Host material code.
    pub material: i32,
    /// Whether any candidate hit the ground.
    pub hit: bool,
    /// Score of the chosen candidate (lower is better).
    pub score: f64,
}

impl Foothold {
    /// A foothold on flat ground at `position`.
    #[must_use]
    pub const fn flat(position: DVec3) -> Self {
        Self {
            position,
            normal: UP,
            material: 0,
            hit: true,
            score: 0.0,
        }
    }
}

/// Fallback ground used when no candidate hits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundFallback {
    /// Ground height under the body.
    pub height: f64,
    /// Slope normal under the body.
    pub normal: DVec3,
    /// Material code under the body.
    pub material: i32,
}

/// Cost of a candidate foothold.
///
/// `slope·(1 − n.z) + offset·|planar offset| + height·|Δz| − weight·w`.
#[must_use]
pub fn score_candidate(
    params: &TerrainParams,
    normal: DVec3,
    planar_offset: f64,
    height_delta: f64,
    weight: f64,
) -> f64 {
    params.slope_weight * (1.0 - normal.z)
        + params.offset_weight * planar_offset
        + params.height_weight * height_delta.abs()
        - params.candidate_weight * weight
}

/// Refines `nominal` against the ground.
///
/// `reference_height` is the height of the foot's current lock (or of the
/// foot itself while swinging). Candidates that miss or return non-finite
/// data are skipped; if all of them do, the foothold falls back to the
/// body's ground height and slope.
#[must_use]
pub fn refine_foothold(
    nominal: DVec2,
    reference_height: f64,
    ground: &dyn GroundQuery,
    params: &TerrainParams,
    fallback: GroundFallback,
) -> Foothold {
    let mut best: Option<Foothold> = None;
    for (direction, weight) in CANDIDATES {
        let offset = direction * params.sample_radius;
        let xy = nominal + offset;
        let hit = ground.ground_at(xy.x, xy.y);
        if !hit.is_valid() {
            continue;
        }
        let normal = ground_normal(hit.normal);
        let score = score_candidate(
            params,
            normal,
            offset.length(),
            hit.z - reference_height,
            weight,
        );
        if best.is_none_or(|b| score < b.score) {
            best = Some(Foothold {
                position: xy.extend(hit.z),
                normal,
                material: hit.material,
                hit: true,
                score,
            });
        }
    }
    best.unwrap_or(Foothold {
        position: nominal.extend(fallback.height),
        normal: ground_normal(fallback.normal),
        material: fallback.material,
        hit: false,
        score: f64::INFINITY,
    })
}

/// Coulomb friction coefficient of a terrain class.
#[must_use]
pub const fn terrain_friction(terrain: TerrainType) -> f64 {
    match terrain {
        TerrainType::Open => 0.8,
        TerrainType::Forest => 0.75,
        TerrainType::Rocky => 0.9,
        TerrainType::Snow => 0.35,
        TerrainType::Ice => 0.1,
        TerrainType::Mud => 0.45,
    }
}
