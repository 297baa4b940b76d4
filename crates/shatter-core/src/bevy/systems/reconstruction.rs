//! Batched reconstruction scheduler.
//!
//! Reconstruction runs as a resumable process: each fixed tick accumulates
//! time toward the batch delay, and every time the delay elapses the next
//! batch of detached fragments is released. Released fragments leave physics,
//! reattach to their assembly, and receive an animation driver that carries
//! them home. The process ends on the first tick that finds no detached
//! fragments left.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::bevy::components::{
    Assembly, Detached, Fragment, GlideAnimation, GlideOrigin, SpiralAnimation,
};
use crate::bevy::events::ReconstructionRequestEvent;
use crate::bevy::rapier_plugin::{PhysicsBody, PhysicsWorldRes};
use crate::bevy::resources::{LayoutLibrary, ReconstructionProcess, ReconstructionScheduler};
use crate::curve::SpiralParams;
use crate::ordering::assign_ranks;
use crate::request::ReconstructionStyle;
use crate::space::world_to_local;

/// Helix dimensions for the spiral reconstruction style.
const SPIRAL_RADIUS: f32 = 4.0;
const SPIRAL_HEIGHT: f32 = 6.0;
const SPIRAL_TURNS: f32 = 4.0;
/// Per-slot stagger so one batch enters the helix in sequence.
const SPIRAL_STAGGER: f32 = 0.05;

/// System that accepts reconstruction requests.
///
/// At most one reconstruction runs at a time; requests arriving while one is
/// active are discarded. Accepting a request reseeds rest poses from the
/// layout library and ranks every detached fragment by distance from the
/// reference point.
pub fn handle_reconstruction_requests(
    mut events: MessageReader<ReconstructionRequestEvent>,
    mut scheduler: ResMut<ReconstructionScheduler>,
    library: Res<LayoutLibrary>,
    assemblies: Query<&Assembly>,
    mut fragments: Query<(Entity, &mut Fragment, Has<Detached>)>,
) {
    for ReconstructionRequestEvent(request) in events.read() {
        if scheduler.is_active() {
            tracing::debug!("reconstruction already running, discarding request");
            continue;
        }
        // Requests validate at construction, but the fields are open.
        if request.batch_size == 0 || request.animation_duration <= 0.0 || request.batch_delay < 0.0
        {
            tracing::warn!(?request, "dropping malformed reconstruction request");
            continue;
        }

        for (_, mut fragment, _) in fragments.iter_mut() {
            let Ok(assembly) = assemblies.get(fragment.assembly) else {
                continue;
            };
            let Some(layout) = library.get(&assembly.shape) else {
                continue;
            };
            if let Some(record) = layout.items.get(fragment.index as usize) {
                fragment.rest_position = record.position();
                fragment.rest_rotation = record.rotation();
            }
        }

        // Rank every fragment of each assembly by rest-position distance
        // from the reference point. Index order keeps ties stable across
        // archetype moves.
        let mut by_assembly: HashMap<Entity, Vec<(Entity, u32, Vec3)>> = HashMap::new();
        let mut candidates = 0usize;
        for (entity, fragment, is_detached) in fragments.iter() {
            by_assembly.entry(fragment.assembly).or_default().push((
                entity,
                fragment.index,
                fragment.rest_position,
            ));
            candidates += usize::from(is_detached);
        }

        let mut ranks: HashMap<Entity, u32> = HashMap::new();
        for members in by_assembly.values_mut() {
            members.sort_by_key(|(_, index, _)| *index);
            let positions: Vec<(Entity, Vec3)> = members
                .iter()
                .map(|(entity, _, rest)| (*entity, *rest))
                .collect();
            ranks.extend(assign_ranks(&positions, request.reference_point));
        }

        for (entity, mut fragment, _) in fragments.iter_mut() {
            if let Some(rank) = ranks.get(&entity) {
                fragment.rank = *rank;
            }
        }

        scheduler.process = Some(ReconstructionProcess::from_request(request));
        tracing::info!(
            candidates,
            batch_size = request.batch_size,
            style = ?request.style,
            "reconstruction started"
        );
    }
}

/// System that releases one batch per elapsed delay window.
pub fn run_reconstruction_batches(
    mut commands: Commands,
    time: Res<Time>,
    mut scheduler: ResMut<ReconstructionScheduler>,
    mut physics: ResMut<PhysicsWorldRes>,
    assemblies: Query<&GlobalTransform, With<Assembly>>,
    detached: Query<(Entity, &Fragment, &Transform, Option<&PhysicsBody>), With<Detached>>,
) {
    let Some(mut process) = scheduler.process.take() else {
        return;
    };

    process.elapsed_since_batch += time.delta_secs();
    if process.elapsed_since_batch < process.batch_delay {
        scheduler.process = Some(process);
        return;
    }
    process.elapsed_since_batch = 0.0;

    let mut candidates: Vec<_> = detached.iter().collect();
    if candidates.is_empty() {
        tracing::info!(released = process.released, "reconstruction complete");
        return;
    }
    if !process.randomize {
        candidates.sort_by_key(|(_, fragment, _, _)| fragment.rank);
    }

    let batch_len = (process.batch_size as usize).min(candidates.len());
    let (batch, rest) = candidates.split_at(batch_len);

    for (slot, (entity, fragment, transform, body)) in batch.iter().enumerate() {
        if let Some(body) = body {
            physics.world.remove_rigid_body(body.0);
        }

        let start = (transform.translation, transform.rotation);
        let target = (fragment.rest_position, fragment.rest_rotation);

        let mut entity_commands = commands.entity(*entity);
        entity_commands.remove::<(Detached, PhysicsBody)>();
        entity_commands.insert(ChildOf(fragment.assembly));

        // Reparenting keeps the world pose: rewrite the Transform into the
        // assembly's local frame, or leave it untouched if the assembly's
        // matrix is degenerate this tick.
        if let Ok(parent) = assemblies.get(fragment.assembly) {
            let matrix = parent.to_matrix();
            if let Some((local_position, local_rotation)) =
                world_to_local(&matrix, parent.rotation(), start.0, start.1)
            {
                entity_commands.insert(
                    Transform::from_translation(local_position).with_rotation(local_rotation),
                );
            }
        }

        match process.style {
            ReconstructionStyle::Default => {
                entity_commands.insert(GlideAnimation::new(
                    start,
                    target,
                    process.animation_duration,
                    0.0,
                    GlideOrigin::Reassembly,
                ));
            }
            ReconstructionStyle::Spiral => {
                entity_commands.insert(SpiralAnimation {
                    start_position: start.0,
                    start_rotation: start.1,
                    target_position: target.0,
                    target_rotation: target.1,
                    spiral: SpiralParams {
                        center: process.reference_point,
                        radius: SPIRAL_RADIUS,
                        height: SPIRAL_HEIGHT,
                        turns: SPIRAL_TURNS,
                    },
                    elapsed: 0.0,
                    delay: slot as f32 * SPIRAL_STAGGER,
                    spiral_duration: process.animation_duration * 2.0,
                    move_duration: process.animation_duration * 0.5,
                });
            }
        }
    }

    if process.freeze_unprocessed {
        for (entity, _, _, body) in rest {
            if let Some(body) = body {
                physics.world.remove_rigid_body(body.0);
                commands.entity(*entity).remove::<PhysicsBody>();
            }
        }
    }

    process.released += batch_len as u32;
    tracing::debug!(
        batch = batch_len,
        released = process.released,
        remaining = rest.len(),
        "reconstruction batch released"
    );
    scheduler.process = Some(process);
}
