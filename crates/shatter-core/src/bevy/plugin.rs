//! Bevy plugin for the fragment simulation.
//!
//! `ShatterHeadlessPlugin` contains all simulation logic without rendering
//! or window dependencies. Use it with `MinimalPlugins` (plus
//! `TransformPlugin` for hierarchy propagation) to run the ECS systems in
//! tests or an embedding host.

use bevy::prelude::*;

use crate::bevy::events::{
    ExplosionRequestEvent, MagnetOffEvent, MagnetRequestEvent, ReconstructionRequestEvent,
};
use crate::bevy::rapier_plugin::{FragmentPhysicsPlugin, PhysicsSet};
use crate::bevy::resources::{CommandQueue, LayoutLibrary, MagnetState, ReconstructionScheduler};
use crate::bevy::systems;
use crate::physics::PHYSICS_DT;

/// Headless plugin wiring physics, scheduling, animation, and magnetism
/// into `FixedUpdate`.
#[derive(Default)]
pub struct ShatterHeadlessPlugin {
    /// External queue to drive the simulation; a fresh one is created when
    /// absent.
    pub command_queue: Option<CommandQueue>,
}

impl Plugin for ShatterHeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(PHYSICS_DT)));
        app.add_plugins(FragmentPhysicsPlugin);

        app.insert_resource(self.command_queue.clone().unwrap_or_default())
            .init_resource::<ReconstructionScheduler>()
            .init_resource::<MagnetState>()
            .init_resource::<LayoutLibrary>();

        app.add_message::<ExplosionRequestEvent>()
            .add_message::<ReconstructionRequestEvent>()
            .add_message::<MagnetRequestEvent>()
            .add_message::<MagnetOffEvent>();

        // Requests and batch release run before the physics step so bodies
        // created or removed this tick are simulated consistently.
        app.add_systems(
            FixedUpdate,
            (
                systems::process_commands,
                systems::handle_explosion_requests,
                systems::handle_reconstruction_requests,
                systems::run_reconstruction_batches,
            )
                .chain()
                .before(PhysicsSet::Step),
        );

        // Motion resolvers run after physics writeback so they see this
        // tick's ballistic poses.
        app.add_systems(
            FixedUpdate,
            (
                systems::handle_magnet_requests,
                systems::apply_magnetic_forces,
                systems::drive_glide_animations,
                systems::drive_spiral_animations,
            )
                .chain()
                .after(PhysicsSet::SyncFromRapier),
        );
    }
}
