//! Ballistic physics using `Rapier3D` with deterministic behavior.
//!
//! Detached fragments fly as dynamic rigid bodies without colliders: the
//! simulation only needs gravity and the explosion's initial velocities,
//! not contact resolution.

use rapier3d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed timestep for the simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Default gravity vector (downward, m/s²).
pub fn default_gravity() -> Vector {
    Vector::new(0.0, -9.81, 0.0)
}

/// Physics world containing all `Rapier3D` components for deterministic
/// simulation.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings.
    pub fn new() -> Self {
        Self::with_gravity(default_gravity())
    }

    /// Creates a new physics world with custom gravity.
    pub fn with_gravity(gravity: Vector) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity,
            frame: 0,
        }
    }

    /// Advances the physics simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.frame += 1;
    }

    /// Advances the physics simulation by multiple steps.
    pub fn step_n(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Removes a rigid body and its attached colliders.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Number of rigid bodies currently in flight.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Computes a deterministic hash of the current physics state, used to
    /// verify that identical inputs produce identical trajectories.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);
            hash_f32(pos.z, &mut hasher);

            let rot = body.rotation();
            hash_f32(rot.x, &mut hasher);
            hash_f32(rot.y, &mut hasher);
            hash_f32(rot.z, &mut hasher);
            hash_f32(rot.w, &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
            hash_f32(linvel.z, &mut hasher);

            let angvel = body.angvel();
            hash_f32(angvel.x, &mut hasher);
            hash_f32(angvel.y, &mut hasher);
            hash_f32(angvel.z, &mut hasher);
        }

        hasher.finish()
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.frame, 0);
        assert_eq!(world.integration_parameters.dt, PHYSICS_DT);
    }

    #[test]
    fn test_step_advances_frame() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.current_frame(), 0);

        world.step();
        assert_eq!(world.current_frame(), 1);

        world.step_n(10);
        assert_eq!(world.current_frame(), 11);
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut world = PhysicsWorld::new();

        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(5.0, 5.0, 0.0))
            .additional_mass(1.0)
            .build();
        let handle = world.add_rigid_body(body);

        assert!(world.get_rigid_body(handle).is_some());
        assert_eq!(world.body_count(), 1);

        world.remove_rigid_body(handle);
        assert!(world.get_rigid_body(handle).is_none());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut world1 = PhysicsWorld::new();
        let mut world2 = PhysicsWorld::new();

        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(1.0, 10.0, -2.0))
            .linvel(Vector::new(3.0, 6.0, 1.0))
            .angvel(Vector::new(0.0, 2.0, 0.0))
            .additional_mass(1.0)
            .build();

        let handle1 = world1.add_rigid_body(body.clone());
        let handle2 = world2.add_rigid_body(body);

        for _ in 0..100 {
            world1.step();
            world2.step();
        }

        assert_eq!(world1.compute_hash(), world2.compute_hash());

        let pos1 = world1.get_rigid_body(handle1).unwrap().translation();
        let pos2 = world2.get_rigid_body(handle2).unwrap().translation();
        assert_eq!(pos1, pos2);
    }

    #[test]
    fn test_gravity_pulls_bodies_down() {
        let mut world = PhysicsWorld::new();
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(0.0, 10.0, 0.0))
            .additional_mass(1.0)
            .build();
        let handle = world.add_rigid_body(body);

        world.step_n(60);

        let y = world.get_rigid_body(handle).unwrap().translation().y;
        assert!(y < 10.0, "body did not fall: y = {y}");
    }
}
