//! Shatter-Core Library
//!
//! Simulation core for a reversible explode/reconstruct effect over fragment
//! assemblies: an explosion scatters fragments ballistically, a batched
//! scheduler collects them back into their rest poses, and a magnetic field
//! resolver pulls idle fragments along curved paths toward a moving source.
//!
//! Pure logic (ordering, curves, coordinate frames, layouts, physics world)
//! lives at the crate root; the Bevy ECS integration lives under [`bevy`].

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod curve;
pub mod layout;
pub mod ordering;
pub mod physics;
pub mod request;
pub mod space;

// Bevy integration
pub mod bevy;

pub use curve::{SpiralParams, hill_target, spiral_angle, spiral_point};
pub use layout::{FragmentLayout, PoseRecord};
pub use ordering::assign_ranks;
pub use physics::{PHYSICS_DT, PhysicsWorld, default_gravity};
pub use request::{
    ExplosionRequest, MagnetRequest, ReconstructionRequest, ReconstructionStyle, RequestError,
};
pub use space::world_to_local;
