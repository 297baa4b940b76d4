//! Path generators for fragment motion.
//!
//! Two families: the helical path used by the spiral reconstruction driver,
//! and the curved "hill" targets the magnetic resolver assigns to ranked
//! fragments.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec3;

/// Peak of the parabolic arc on a magnetic hill path, in world units.
const MAX_HILL_HEIGHT: f32 = 3.0;
/// Sideways bulge of the hill path at its midpoint.
const LATERAL_SPREAD: f32 = 1.5;
/// Amplitude of the deterministic per-rank lateral jitter.
const JITTER_AMPLITUDE: f32 = 0.5;

/// Helix parameters for the spiral reconstruction phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralParams {
    pub center: Vec3,
    pub radius: f32,
    pub height: f32,
    pub turns: f32,
}

/// Helix angle at phase progress `t` in `[0, 1]`.
pub fn spiral_angle(params: &SpiralParams, t: f32) -> f32 {
    t * params.turns * TAU
}

/// Point on the helix at phase progress `t` in `[0, 1]`: circular offset in
/// the XZ plane, rising linearly to `height`.
pub fn spiral_point(params: &SpiralParams, t: f32) -> Vec3 {
    let angle = spiral_angle(params, t);
    params.center
        + Vec3::new(
            angle.cos() * params.radius,
            t * params.height,
            angle.sin() * params.radius,
        )
}

/// Target point for the fragment of rank `rank` among `count` attracted
/// fragments. Rank 0 snaps to the field source. Later ranks sit on a
/// parabolic-height, laterally offset curve between their rest position and
/// the source, with a deterministic per-rank jitter so queued fragments do
/// not stack on one line.
pub fn hill_target(rank: usize, count: usize, source: Vec3, rest: Vec3) -> Vec3 {
    if rank == 0 {
        return source;
    }

    let ratio = rank as f32 / count.saturating_sub(1).max(1) as f32;

    let to_source = (source - rest).normalize_or_zero();
    let mut lateral_axis = to_source.cross(Vec3::Y);
    if lateral_axis.length() < 0.1 {
        // Rest-to-source axis is near vertical; pick a different basis.
        lateral_axis = to_source.cross(Vec3::X);
    }
    let lateral_axis = lateral_axis.normalize_or_zero();

    let base = rest.lerp(source, 1.0 - ratio);
    let lift = 4.0 * ratio * (1.0 - ratio) * MAX_HILL_HEIGHT;
    let spread = (ratio * PI).sin() * LATERAL_SPREAD;
    let jitter = (rank as f32 * 2.3).sin() * JITTER_AMPLITUDE;

    base + Vec3::Y * lift + lateral_axis * (spread + jitter)
}
