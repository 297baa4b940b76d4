//! World ↔ parent-local coordinate conversion.
//!
//! Every animation driver and the reconstruction scheduler compute poses in
//! world space and convert them into the owning assembly's local frame per
//! tick. A near-singular parent matrix is a recoverable condition: callers
//! fall back to writing world-space values directly until the parent
//! transform becomes valid again.

use bevy::math::{Mat4, Quat, Vec3};

/// Determinant magnitude below which a parent matrix is treated as singular.
pub const DEGENERATE_DETERMINANT: f32 = 1e-6;

/// Converts a world-space pose into the local frame of a parent whose
/// world matrix is `parent_matrix` and world rotation is `parent_rotation`.
///
/// Returns `None` when the parent matrix is non-invertible.
pub fn world_to_local(
    parent_matrix: &Mat4,
    parent_rotation: Quat,
    position: Vec3,
    rotation: Quat,
) -> Option<(Vec3, Quat)> {
    if parent_matrix.determinant().abs() < DEGENERATE_DETERMINANT {
        return None;
    }
    let inverse = parent_matrix.inverse();
    Some((
        inverse.transform_point3(position),
        parent_rotation.inverse() * rotation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::EulerRot;

    fn parent(translation: Vec3, rotation: Quat) -> (Mat4, Quat) {
        (
            Mat4::from_rotation_translation(rotation, translation),
            rotation,
        )
    }

    #[test]
    fn identity_parent_is_a_passthrough() {
        let pose = (Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7));
        let (matrix, rotation) = parent(Vec3::ZERO, Quat::IDENTITY);
        let (local_pos, local_rot) =
            world_to_local(&matrix, rotation, pose.0, pose.1).expect("identity is invertible");
        assert_eq!(local_pos, pose.0);
        assert_eq!(local_rot, pose.1);
    }

    #[test]
    fn local_pose_composes_back_to_world() {
        let parent_rot = Quat::from_euler(EulerRot::XYZ, 0.3, 1.2, -0.4);
        let parent_pos = Vec3::new(-2.0, 5.0, 1.5);
        let (matrix, rotation) = parent(parent_pos, parent_rot);

        let world_pos = Vec3::new(4.0, -1.0, 2.0);
        let world_rot = Quat::from_rotation_x(0.9);
        let (local_pos, local_rot) =
            world_to_local(&matrix, rotation, world_pos, world_rot).unwrap();

        let recomposed_pos = matrix.transform_point3(local_pos);
        let recomposed_rot = parent_rot * local_rot;
        assert!(recomposed_pos.distance(world_pos) < 1e-4);
        assert!(recomposed_rot.angle_between(world_rot) < 1e-4);
    }

    #[test]
    fn singular_matrix_is_rejected() {
        // Zero scale on one axis collapses the matrix.
        let matrix = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(world_to_local(&matrix, Quat::IDENTITY, Vec3::ONE, Quat::IDENTITY).is_none());
    }
}
