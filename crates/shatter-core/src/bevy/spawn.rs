//! Assembly spawning.

use bevy::prelude::*;

use crate::bevy::components::{Assembly, Fragment, MagneticMotion};
use crate::layout::FragmentLayout;

/// Spawns an assembly at `origin` with one child fragment per layout record.
///
/// Layout poses are world-space rest poses; child transforms are derived
/// from them relative to the assembly origin. Returns the assembly entity.
pub fn spawn_assembly(
    world: &mut World,
    shape: &str,
    origin: Transform,
    layout: &FragmentLayout,
) -> Entity {
    let assembly = world
        .spawn((
            Assembly {
                shape: shape.to_string(),
                epicenter: origin.translation,
            },
            origin,
        ))
        .id();

    for (index, record) in layout.items.iter().enumerate() {
        let rest_position = record.position();
        let rest_rotation = record.rotation();

        let local_translation = origin.rotation.inverse() * (rest_position - origin.translation);
        let local_rotation = origin.rotation.inverse() * rest_rotation;

        world.spawn((
            Fragment {
                assembly,
                index: index as u32,
                rest_position,
                rest_rotation,
                rank: 0,
            },
            MagneticMotion::default(),
            Transform::from_translation(local_translation).with_rotation(local_rotation),
            ChildOf(assembly),
        ));
    }

    tracing::info!(
        shape,
        fragments = layout.len(),
        "spawned assembly at {:?}",
        origin.translation
    );

    assembly
}
