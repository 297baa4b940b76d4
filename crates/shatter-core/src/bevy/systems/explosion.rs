//! Explosion impulse.
//!
//! Detaches every assembled fragment within the blast radius and hands it to
//! physics with an outward impulse scaled by linear distance falloff.

use bevy::prelude::*;

use crate::bevy::components::{Detached, Fragment, GlideAnimation, SpiralAnimation};
use crate::bevy::events::ExplosionRequestEvent;
use crate::bevy::rapier_plugin::{spawn_ballistic_body, PhysicsBody, PhysicsWorldRes};

/// System that detaches fragments caught in an explosion.
///
/// Fragments already detached are unaffected. Detachment unparents the
/// fragment, snapshots its world pose into its own `Transform`, and spawns a
/// ballistic rigid body carrying the impulse.
pub fn handle_explosion_requests(
    mut commands: Commands,
    mut events: MessageReader<ExplosionRequestEvent>,
    mut physics: ResMut<PhysicsWorldRes>,
    fragments: Query<(Entity, &GlobalTransform), (With<Fragment>, Without<Detached>)>,
) {
    for ExplosionRequestEvent(request) in events.read() {
        let mut detached = 0u32;

        for (entity, global) in fragments.iter() {
            let world_position = global.translation();
            let offset = world_position - request.epicenter;
            let distance = offset.length();
            if distance > request.radius {
                continue;
            }

            // A fragment sitting exactly on the epicenter is launched
            // straight up.
            let direction = offset.try_normalize().unwrap_or(Vec3::Y);
            let falloff = 1.0 - distance / request.radius;
            let linvel = direction * request.force * falloff;
            let angvel = direction * request.rotation_amount;

            let world_rotation = global.rotation();
            let handle =
                spawn_ballistic_body(&mut physics.world, world_position, world_rotation, linvel, angvel);

            commands
                .entity(entity)
                .remove::<ChildOf>()
                .remove::<GlideAnimation>()
                .remove::<SpiralAnimation>()
                .insert(Transform::from_translation(world_position).with_rotation(world_rotation))
                .insert((Detached, PhysicsBody(handle)));
            detached += 1;
        }

        tracing::info!(
            detached,
            radius = request.radius,
            "explosion at {:?}",
            request.epicenter
        );
    }
}
