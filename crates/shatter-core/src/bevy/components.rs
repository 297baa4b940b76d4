//! ECS components for assemblies, fragments, and animation drivers.

use bevy::prelude::*;

use crate::curve::SpiralParams;

/// Root entity of one fractured structure. Fragments are its children while
/// assembled; detached fragments are unparented until reconstructed.
#[derive(Component, Debug, Clone)]
pub struct Assembly {
    /// Shape key used to look up the persisted fragment layout.
    pub shape: String,
    /// World-space origin, used as explosion and spiral epicenter.
    pub epicenter: Vec3,
}

/// One fragment of an assembly.
#[derive(Component, Debug, Clone)]
pub struct Fragment {
    /// The assembly this fragment belongs to, kept across detachment.
    pub assembly: Entity,
    /// Creation index within the assembly. Stable across frames, used for
    /// deterministic ordering and for positional layout lookup.
    pub index: u32,
    /// World-space rest position within the assembled structure.
    pub rest_position: Vec3,
    /// World-space rest rotation within the assembled structure.
    pub rest_rotation: Quat,
    /// Distance rank assigned by the last reconstruction request, 1-based.
    /// Zero means unranked.
    pub rank: u32,
}

/// Marker for fragments currently blown off their assembly.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Detached;

/// Per-fragment velocity state for the magnetic force resolver.
#[derive(Component, Debug, Clone, Default)]
pub struct MagneticMotion {
    pub velocity: Vec3,
}

/// What started a glide animation. Reconstruction glides are exempt from
/// magnetic capture; return glides are cancelled when the field re-attracts
/// the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlideOrigin {
    Reassembly,
    MagneticReturn,
}

/// Straight-line interpolation from a captured start pose to a target pose
/// over a fixed duration, after an optional delay.
#[derive(Component, Debug, Clone)]
pub struct GlideAnimation {
    pub start_position: Vec3,
    pub start_rotation: Quat,
    pub target_position: Vec3,
    pub target_rotation: Quat,
    /// Seconds since the glide was stamped, including the delay.
    pub elapsed: f32,
    /// Seconds of stillness before the glide starts moving.
    pub delay: f32,
    pub duration: f32,
    pub origin: GlideOrigin,
}

impl GlideAnimation {
    pub fn new(
        start: (Vec3, Quat),
        target: (Vec3, Quat),
        duration: f32,
        delay: f32,
        origin: GlideOrigin,
    ) -> Self {
        Self {
            start_position: start.0,
            start_rotation: start.1,
            target_position: target.0,
            target_rotation: target.1,
            elapsed: 0.0,
            delay,
            duration,
            origin,
        }
    }
}

/// Two-phase reconstruction flourish: ride a helix around the epicenter,
/// then glide straight to the rest pose.
#[derive(Component, Debug, Clone)]
pub struct SpiralAnimation {
    pub start_position: Vec3,
    pub start_rotation: Quat,
    pub target_position: Vec3,
    pub target_rotation: Quat,
    pub spiral: SpiralParams,
    /// Seconds since the task was stamped, spanning the delay and both
    /// phases.
    pub elapsed: f32,
    /// Stagger delay so fragments of one batch enter the helix in sequence.
    pub delay: f32,
    pub spiral_duration: f32,
    pub move_duration: f32,
}
