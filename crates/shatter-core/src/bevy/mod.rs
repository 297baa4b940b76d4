//! Bevy-based simulation for fragment explosion and reconstruction.
//!
//! This module provides the complete ECS integration: physics via direct
//! `Rapier3D` access, components for assemblies and fragments, resources for
//! the reconstruction scheduler and the magnetic field, and the systems that
//! drive explosion, batched reconstruction, animation, and magnetism.

pub mod components;
pub mod events;
pub mod plugin;
pub mod rapier_plugin;
pub mod resources;
pub mod spawn;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::ShatterHeadlessPlugin;
pub use rapier_plugin::{FragmentPhysicsPlugin, PhysicsBody, PhysicsSet, PhysicsWorldRes};
pub use resources::*;
pub use spawn::spawn_assembly;
