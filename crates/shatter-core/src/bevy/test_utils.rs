//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `ShatterHeadlessPlugin` for testing simulation logic
//! without a rendering or windowing backend.

use std::time::Duration;

use bevy::prelude::*;
use bevy::transform::TransformPlugin;

use crate::bevy::components::Fragment;
use crate::bevy::plugin::ShatterHeadlessPlugin;
use crate::bevy::resources::{CommandQueue, LayoutLibrary, SimCommand};
use crate::bevy::spawn::spawn_assembly;
use crate::layout::{FragmentLayout, PoseRecord};
use crate::request::{ExplosionRequest, MagnetRequest, ReconstructionRequest};

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Shape key used by `spawn_line_assembly`.
    pub const SHAPE: &'static str = "line";

    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TransformPlugin);
        app.add_plugins(ShatterHeadlessPlugin::default());
        // Pause virtual time so that only explicit step() calls advance the
        // simulation.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        // Run one update to initialize all resources
        app.update();
        Self { app }
    }

    /// Advance the simulation by exactly `n` fixed timesteps.
    ///
    /// Feeds time directly into the fixed-timestep accumulator, bypassing
    /// virtual time; with virtual time paused this is fully deterministic.
    pub fn step(&mut self, n: usize) {
        let dt = self.app.world().resource::<Time<Fixed>>().timestep();
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Override the fixed timestep for delay-gating and exactness tests.
    pub fn set_fixed_dt(&mut self, dt: f32) {
        self.app
            .world_mut()
            .resource_mut::<Time<Fixed>>()
            .set_timestep(Duration::from_secs_f32(dt));
    }

    pub fn push(&mut self, command: SimCommand) {
        self.app.world().resource::<CommandQueue>().push(command);
    }

    pub fn explode(&mut self, request: ExplosionRequest) {
        self.push(SimCommand::Explode(request));
    }

    pub fn reconstruct(&mut self, request: ReconstructionRequest) {
        self.push(SimCommand::Reconstruct(request));
    }

    pub fn magnetize(&mut self, request: MagnetRequest) {
        self.push(SimCommand::Magnetize(request));
    }

    pub fn demagnetize(&mut self) {
        self.push(SimCommand::Demagnetize);
    }

    /// Spawns an assembly at the origin with `count` fragments along +X,
    /// spaced 2 units apart, and registers its layout under `SHAPE`.
    ///
    /// Returns the assembly entity and the fragments in index order.
    pub fn spawn_line_assembly(&mut self, count: usize) -> (Entity, Vec<Entity>) {
        let layout = FragmentLayout {
            items: (0..count)
                .map(|i| PoseRecord::new(Vec3::new(i as f32 * 2.0, 0.0, 0.0), Quat::IDENTITY))
                .collect(),
        };
        self.app
            .world_mut()
            .resource_mut::<LayoutLibrary>()
            .insert(Self::SHAPE, layout.clone());

        let assembly =
            spawn_assembly(self.app.world_mut(), Self::SHAPE, Transform::IDENTITY, &layout);
        // Settle GlobalTransforms before any simulation runs.
        self.app.update();

        let world = self.app.world_mut();
        let mut query = world.query::<(Entity, &Fragment)>();
        let mut fragments: Vec<(u32, Entity)> = query
            .iter(world)
            .filter(|(_, fragment)| fragment.assembly == assembly)
            .map(|(entity, fragment)| (fragment.index, entity))
            .collect();
        fragments.sort_by_key(|(index, _)| *index);

        (assembly, fragments.into_iter().map(|(_, entity)| entity).collect())
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
