//! Custom Rapier3D physics plugin for Bevy.
//!
//! Integrates `PhysicsWorld` directly instead of going through a rapier
//! plugin crate. Detached fragments are the only physics clients: each gets
//! a dynamic body on detachment, and the body's pose is written back into
//! the fragment's `Transform` after every step.

use bevy::prelude::*;
use rapier3d::prelude::*;

use crate::physics::PhysicsWorld;

/// Bevy Resource wrapping `PhysicsWorld` for direct Rapier access.
#[derive(Resource, Default)]
pub struct PhysicsWorldRes {
    pub world: PhysicsWorld,
}

impl PhysicsWorldRes {
    pub fn new() -> Self {
        Self {
            world: PhysicsWorld::new(),
        }
    }
}

/// Entity ↔ RigidBody mapping component. Present only while a fragment is
/// in ballistic flight.
#[derive(Component, Debug, Clone, Copy)]
pub struct PhysicsBody(pub RigidBodyHandle);

/// Physics phases within `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    /// Run the physics simulation step.
    Step,
    /// Sync Rapier state → Bevy Transforms.
    SyncFromRapier,
}

/// Creates a ballistic dynamic body for a detached fragment. No collider:
/// fragments fly under gravity alone and pass through each other.
pub fn spawn_ballistic_body(
    world: &mut PhysicsWorld,
    position: Vec3,
    rotation: Quat,
    linvel: Vec3,
    angvel: Vec3,
) -> RigidBodyHandle {
    let body = RigidBodyBuilder::dynamic()
        .translation(Vector::new(position.x, position.y, position.z))
        .rotation(rotation.to_scaled_axis())
        .linvel(Vector::new(linvel.x, linvel.y, linvel.z))
        .angvel(Vector::new(angvel.x, angvel.y, angvel.z))
        .additional_mass(1.0)
        .build();
    world.add_rigid_body(body)
}

/// Runs one physics simulation step.
pub fn run_physics_step(mut physics: ResMut<PhysicsWorldRes>) {
    physics.world.step();
}

/// Syncs Rapier body state back to Bevy Transforms.
///
/// Detached fragments are unparented, so their `Transform` is world-space
/// and the body pose can be written directly.
pub fn sync_from_rapier(
    physics: Res<PhysicsWorldRes>,
    mut bodies: Query<(&PhysicsBody, &mut Transform)>,
) {
    for (body_comp, mut transform) in bodies.iter_mut() {
        if let Some(body) = physics.world.get_rigid_body(body_comp.0) {
            let pos = body.translation();
            let rot = body.rotation();
            transform.translation = Vec3::new(pos.x, pos.y, pos.z);
            transform.rotation = Quat::from_xyzw(rot.x, rot.y, rot.z, rot.w);
        }
    }
}

/// Physics plugin wiring the step and writeback into `FixedUpdate`.
pub struct FragmentPhysicsPlugin;

impl Plugin for FragmentPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PhysicsWorldRes::new());

        app.configure_sets(
            FixedUpdate,
            (PhysicsSet::Step, PhysicsSet::SyncFromRapier).chain(),
        );

        app.add_systems(FixedUpdate, run_physics_step.in_set(PhysicsSet::Step));
        app.add_systems(
            FixedUpdate,
            sync_from_rapier.in_set(PhysicsSet::SyncFromRapier),
        );
    }
}
