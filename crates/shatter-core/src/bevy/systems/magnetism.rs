//! Magnetic attraction field.
//!
//! An active field captures assembled fragments inside a sphere-and-cone
//! region, ranks them by distance each tick, and pulls each toward a curved
//! hill target keyed to its rank. Deactivating the field keeps its record
//! around so displaced fragments glide back to their rest pose; if no field
//! was ever created, nothing here runs at all.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::bevy::components::{
    Detached, Fragment, GlideAnimation, GlideOrigin, MagneticMotion, SpiralAnimation,
};
use crate::bevy::events::{MagnetOffEvent, MagnetRequestEvent};
use crate::bevy::rapier_plugin::PhysicsBody;
use crate::bevy::resources::{MagneticField, MagnetState};
use crate::bevy::systems::animation::{world_pose, write_world_pose};
use crate::curve::hill_target;
use crate::ordering::sort_by_distance;

/// Inside this distance of the source the direction is undefined, so the
/// cone test is skipped and the fragment counts as captured rather than
/// dropping to the return path while it sits on the source.
const MIN_FIELD_DISTANCE: f32 = 0.1;
/// Distance at which a fragment counts as sitting on its hill target.
const TARGET_REACHED: f32 = 0.1;
/// Velocity smoothing rates, per second.
const ATTRACT_SMOOTHING: f32 = 5.0;
const DAMP_SMOOTHING: f32 = 2.0;
/// Attraction weakens by this fraction at the back of the queue.
const FORCE_RANK_FALLOFF: f32 = 0.3;
/// Attraction tapers linearly inside this distance of the target.
const SLOWDOWN_RANGE: f32 = 2.0;
/// Return-to-rest glide length after deactivation.
const RETURN_DURATION: f32 = 1.5;
/// Displacement below this counts as already home.
const DISPLACEMENT_EPSILON: f32 = 0.1;

/// System that creates, retargets, and deactivates the magnetic field.
pub fn handle_magnet_requests(
    mut magnet_events: MessageReader<MagnetRequestEvent>,
    mut off_events: MessageReader<MagnetOffEvent>,
    mut state: ResMut<MagnetState>,
) {
    for MagnetRequestEvent(request) in magnet_events.read() {
        state.field = Some(MagneticField::from_request(request));
        tracing::info!(
            radius = request.radius,
            force = request.force,
            "magnetic field at {:?}",
            request.position
        );
    }
    for _ in off_events.read() {
        if let Some(field) = state.field.as_mut() {
            if field.active {
                field.active = false;
                tracing::info!("magnetic field deactivated");
            }
        }
    }
}

/// System applying magnetic attraction. Captured fragments chase their hill
/// targets; everything else bleeds off velocity and, once displaced, glides
/// back to its rest pose. Deactivating the field empties the captured set,
/// sending every displaced fragment home.
///
/// Fragments in ballistic flight, detached fragments, spiral riders, and
/// fragments gliding home from reconstruction are all exempt.
pub fn apply_magnetic_forces(
    mut commands: Commands,
    time: Res<Time>,
    state: Res<MagnetState>,
    mut fragments: Query<
        (
            Entity,
            &Fragment,
            &mut MagneticMotion,
            &mut Transform,
            Option<&ChildOf>,
            Option<&GlideAnimation>,
        ),
        (Without<PhysicsBody>, Without<Detached>, Without<SpiralAnimation>),
    >,
    parents: Query<&GlobalTransform>,
) {
    let Some(field) = state.field else {
        return;
    };
    let dt = time.delta_secs();

    // An inactive field captures nothing, which routes every fragment into
    // the return-to-rest branch below.
    let mut captured: Vec<(Entity, f32)> = Vec::new();
    if field.active {
        for (entity, _, _, transform, child_of, glide) in fragments.iter() {
            if matches!(glide, Some(glide) if glide.origin == GlideOrigin::Reassembly) {
                continue;
            }
            let (position, _) = world_pose(transform, child_of, &parents);
            let offset = position - field.position;
            let distance = offset.length();
            if distance > field.radius {
                continue;
            }
            if distance >= MIN_FIELD_DISTANCE
                && offset.angle_between(field.direction) > field.cone_half_angle
            {
                continue;
            }
            captured.push((entity, distance));
        }
    }

    sort_by_distance(&mut captured);
    let count = captured.len();
    let rank_of: HashMap<Entity, usize> = captured
        .iter()
        .enumerate()
        .map(|(rank, (entity, _))| (*entity, rank))
        .collect();

    for (entity, fragment, mut motion, mut transform, child_of, glide) in fragments.iter_mut() {
        if matches!(glide, Some(glide) if glide.origin == GlideOrigin::Reassembly) {
            continue;
        }
        let (position, rotation) = world_pose(&transform, child_of, &parents);

        if let Some(&rank) = rank_of.get(&entity) {
            // Re-capture cancels an in-flight return glide.
            if glide.is_some() {
                commands.entity(entity).remove::<GlideAnimation>();
            }

            let target = hill_target(rank, count, field.position, fragment.rest_position);
            let to_target = target - position;
            let distance = to_target.length();

            if distance <= TARGET_REACHED {
                motion.velocity = motion.velocity.lerp(Vec3::ZERO, (DAMP_SMOOTHING * dt).min(1.0));
            } else {
                let ratio = rank as f32 / count.saturating_sub(1).max(1) as f32;
                let strength = field.force
                    * (1.0 - FORCE_RANK_FALLOFF * ratio)
                    * (distance / SLOWDOWN_RANGE).min(1.0);
                let desired = to_target / distance * strength;
                motion.velocity = motion.velocity.lerp(desired, (ATTRACT_SMOOTHING * dt).min(1.0));
            }
        } else {
            // Lost or never captured: bleed off velocity and glide back to
            // the rest pose once displaced.
            motion.velocity = motion.velocity.lerp(Vec3::ZERO, (DAMP_SMOOTHING * dt).min(1.0));

            if glide.is_some() {
                continue;
            }
            if position.distance(fragment.rest_position) > DISPLACEMENT_EPSILON {
                motion.velocity = Vec3::ZERO;
                commands.entity(entity).insert(GlideAnimation::new(
                    (position, rotation),
                    (fragment.rest_position, fragment.rest_rotation),
                    RETURN_DURATION,
                    0.0,
                    GlideOrigin::MagneticReturn,
                ));
                continue;
            }
        }

        if motion.velocity.length_squared() > 1e-8 {
            let position = position + motion.velocity * dt;
            write_world_pose(&mut transform, child_of, &parents, position, rotation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::test_utils::TestApp;
    use crate::request::MagnetRequest;

    /// Field floating above the line of fragments, cone pointing down.
    fn overhead_field(cone_half_angle: f32) -> MagnetRequest {
        MagnetRequest::new(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::NEG_Y,
            10.0,
            20.0,
            cone_half_angle,
        )
        .unwrap()
    }

    fn translation_of(app: &TestApp, entity: Entity) -> Vec3 {
        app.world().entity(entity).get::<Transform>().unwrap().translation
    }

    #[test]
    fn only_fragments_inside_the_cone_are_attracted() {
        let mut app = TestApp::new();
        let (_, fragments) = app.spawn_line_assembly(4);
        let rest: Vec<Vec3> = fragments.iter().map(|&f| translation_of(&app, f)).collect();

        // Half-angle 0.5rad: x = 0 and x = 2 are inside, x = 4 and x = 6
        // fall outside the cone.
        app.magnetize(overhead_field(0.5));
        app.step(30);

        assert!(translation_of(&app, fragments[0]).distance(rest[0]) > 0.05);
        assert!(translation_of(&app, fragments[1]).distance(rest[1]) > 0.05);
        assert_eq!(translation_of(&app, fragments[2]), rest[2]);
        assert_eq!(translation_of(&app, fragments[3]), rest[3]);
    }

    #[test]
    fn radius_boundary_is_sharp() {
        let eps = 1e-3;
        // The fragment rests at the origin, exactly 5 units below the
        // source, on the cone axis.
        let field = |radius: f32| {
            MagnetRequest::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, radius, 20.0, 1.0).unwrap()
        };

        let mut inside = TestApp::new();
        let (_, fragments) = inside.spawn_line_assembly(1);
        inside.magnetize(field(5.0 + eps));
        inside.step(10);
        assert!(
            translation_of(&inside, fragments[0]).distance(Vec3::ZERO) > 1e-3,
            "fragment just inside the radius was not attracted"
        );

        let mut outside = TestApp::new();
        let (_, fragments) = outside.spawn_line_assembly(1);
        outside.magnetize(field(5.0 - eps));
        outside.step(10);
        assert_eq!(translation_of(&outside, fragments[0]), Vec3::ZERO);
    }

    #[test]
    fn cone_boundary_is_sharp() {
        let eps = 1e-3;
        // Fragment 1 rests at (2, 0, 0), well inside the radius; its offset
        // from the source sits at this angle off the downward axis.
        let axis_angle = Vec3::new(2.0, -5.0, 0.0).angle_between(Vec3::NEG_Y);
        let rest = Vec3::new(2.0, 0.0, 0.0);

        let mut inside = TestApp::new();
        let (_, fragments) = inside.spawn_line_assembly(2);
        inside.magnetize(overhead_field(axis_angle + eps));
        inside.step(10);
        assert!(
            translation_of(&inside, fragments[1]).distance(rest) > 1e-3,
            "fragment just inside the cone was not attracted"
        );

        let mut outside = TestApp::new();
        let (_, fragments) = outside.spawn_line_assembly(2);
        outside.magnetize(overhead_field(axis_angle - eps));
        outside.step(10);
        assert_eq!(translation_of(&outside, fragments[1]), rest);
    }

    #[test]
    fn out_of_radius_fragments_are_ignored() {
        let mut app = TestApp::new();
        let (_, fragments) = app.spawn_line_assembly(2);
        let rest = translation_of(&app, fragments[0]);

        // Wide cone but a radius too short to reach any fragment.
        let request =
            MagnetRequest::new(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Y, 3.0, 20.0, 1.5).unwrap();
        app.magnetize(request);
        app.step(30);

        assert_eq!(translation_of(&app, fragments[0]), rest);
    }

    #[test]
    fn closest_fragment_settles_on_the_field_source() {
        let mut app = TestApp::new();
        let (_, fragments) = app.spawn_line_assembly(3);

        app.magnetize(overhead_field(1.2));
        app.step(240);

        let position = translation_of(&app, fragments[0]);
        let distance = position.distance(Vec3::new(0.0, 5.0, 0.0));
        assert!(distance < 1.0, "rank-0 fragment stalled at {distance}");
    }

    #[test]
    fn deactivation_sends_displaced_fragments_home() {
        let mut app = TestApp::new();
        let (_, fragments) = app.spawn_line_assembly(2);
        let rest = translation_of(&app, fragments[0]);

        app.magnetize(overhead_field(1.2));
        app.step(60);
        assert!(translation_of(&app, fragments[0]).distance(rest) > 0.1);

        app.demagnetize();
        app.step(1);
        let glide = app
            .world()
            .entity(fragments[0])
            .get::<GlideAnimation>()
            .expect("displaced fragment should glide home");
        assert_eq!(glide.origin, GlideOrigin::MagneticReturn);

        // 1.5s return glide at 60Hz.
        app.step(120);
        assert!(!app.world().entity(fragments[0]).contains::<GlideAnimation>());
        assert_eq!(translation_of(&app, fragments[0]), rest);
    }

    #[test]
    fn without_any_field_nothing_returns_home() {
        let mut app = TestApp::new();
        let (_, fragments) = app.spawn_line_assembly(1);

        let displaced = Vec3::new(3.0, 3.0, 3.0);
        app.world_mut()
            .entity_mut(fragments[0])
            .get_mut::<Transform>()
            .unwrap()
            .translation = displaced;
        app.step(30);

        assert!(!app.world().entity(fragments[0]).contains::<GlideAnimation>());
        assert_eq!(translation_of(&app, fragments[0]), displaced);
    }

    #[test]
    fn recapture_cancels_a_return_glide() {
        let mut app = TestApp::new();
        let (_, fragments) = app.spawn_line_assembly(1);

        // Short pull so the fragment is displaced but still well inside
        // the field when it is recreated.
        app.magnetize(overhead_field(1.2));
        app.step(10);
        app.demagnetize();
        app.step(1);
        assert!(app.world().entity(fragments[0]).contains::<GlideAnimation>());

        app.magnetize(overhead_field(1.2));
        app.step(2);
        assert!(!app.world().entity(fragments[0]).contains::<GlideAnimation>());
    }
}
