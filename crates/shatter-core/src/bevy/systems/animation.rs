//! Animation drivers that carry reattached fragments to their rest pose.
//!
//! Both drivers work in world space and convert the result into the parent's
//! local frame each tick. Clocks advance before evaluation, so a duration
//! that is an exact multiple of the tick lands on `t = 1.0` and the final
//! pose is written exactly.

use bevy::prelude::*;

use crate::bevy::components::{GlideAnimation, SpiralAnimation};
use crate::curve::{spiral_angle, spiral_point};
use crate::space::world_to_local;

/// Reads an animated entity's world pose from its own transform and its
/// parent's global transform.
pub(crate) fn world_pose(
    transform: &Transform,
    child_of: Option<&ChildOf>,
    parents: &Query<&GlobalTransform>,
) -> (Vec3, Quat) {
    match child_of.and_then(|child_of| parents.get(child_of.parent()).ok()) {
        Some(parent) => (
            parent.to_matrix().transform_point3(transform.translation),
            parent.rotation() * transform.rotation,
        ),
        None => (transform.translation, transform.rotation),
    }
}

/// Writes a world-space pose into `transform`, converting through the
/// parent's frame when there is one. Falls back to writing the world values
/// directly while the parent matrix is degenerate.
pub(crate) fn write_world_pose(
    transform: &mut Transform,
    child_of: Option<&ChildOf>,
    parents: &Query<&GlobalTransform>,
    position: Vec3,
    rotation: Quat,
) {
    if let Some(parent) = child_of.and_then(|child_of| parents.get(child_of.parent()).ok()) {
        let matrix = parent.to_matrix();
        if let Some((local_position, local_rotation)) =
            world_to_local(&matrix, parent.rotation(), position, rotation)
        {
            transform.translation = local_position;
            transform.rotation = local_rotation;
            return;
        }
    }
    transform.translation = position;
    transform.rotation = rotation;
}

/// System driving straight-line glides. Removes the animation on the tick
/// that reaches the target.
pub fn drive_glide_animations(
    mut commands: Commands,
    time: Res<Time>,
    mut animated: Query<(Entity, &mut GlideAnimation, &mut Transform, Option<&ChildOf>)>,
    parents: Query<&GlobalTransform>,
) {
    let dt = time.delta_secs();

    for (entity, mut animation, mut transform, child_of) in animated.iter_mut() {
        animation.elapsed += dt;
        if animation.elapsed < animation.delay {
            continue;
        }

        // One clock covers delay and motion, so the surplus of the tick
        // that crosses the delay already counts toward progress.
        let t = ((animation.elapsed - animation.delay) / animation.duration).min(1.0);

        if t >= 1.0 {
            write_world_pose(
                &mut transform,
                child_of,
                &parents,
                animation.target_position,
                animation.target_rotation,
            );
            commands.entity(entity).remove::<GlideAnimation>();
            continue;
        }

        let position = animation.start_position.lerp(animation.target_position, t);
        let rotation = animation.start_rotation.slerp(animation.target_rotation, t);
        write_world_pose(&mut transform, child_of, &parents, position, rotation);
    }
}

/// System driving the two-phase spiral flourish: ride the helix up, then
/// glide straight to the rest pose.
pub fn drive_spiral_animations(
    mut commands: Commands,
    time: Res<Time>,
    mut animated: Query<(Entity, &mut SpiralAnimation, &mut Transform, Option<&ChildOf>)>,
    parents: Query<&GlobalTransform>,
) {
    let dt = time.delta_secs();

    for (entity, mut animation, mut transform, child_of) in animated.iter_mut() {
        animation.elapsed += dt;
        if animation.elapsed < animation.delay {
            continue;
        }

        let since = animation.elapsed - animation.delay;

        if since < animation.spiral_duration {
            let t = since / animation.spiral_duration;
            // Blend from the scattered pose onto the moving helix point, so
            // the fragment joins the spiral without a jump.
            let position = animation
                .start_position
                .lerp(spiral_point(&animation.spiral, t), t);
            // Half the helix angle keeps the visual spin slower than the
            // orbit.
            let rotation =
                Quat::from_rotation_y(spiral_angle(&animation.spiral, t) * 0.5)
                    * animation.start_rotation;
            write_world_pose(&mut transform, child_of, &parents, position, rotation);
            continue;
        }

        let exit_position = spiral_point(&animation.spiral, 1.0);
        let t = ((since - animation.spiral_duration) / animation.move_duration).min(1.0);

        if t >= 1.0 {
            write_world_pose(
                &mut transform,
                child_of,
                &parents,
                animation.target_position,
                animation.target_rotation,
            );
            commands.entity(entity).remove::<SpiralAnimation>();
            continue;
        }

        let position = exit_position.lerp(animation.target_position, t);
        let rotation = animation.start_rotation.slerp(animation.target_rotation, t);
        write_world_pose(&mut transform, child_of, &parents, position, rotation);
    }
}
