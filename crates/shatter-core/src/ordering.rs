//! Distance-based fragment ordering.
//!
//! Produces the 1-based rank permutation used to sequence reconstruction
//! batches, and the transient by-distance order used by the magnetic
//! resolver. Sorts are stable, so equidistant entries keep their input
//! (creation) order.

use bevy::math::Vec3;

/// Stable ascending sort of `(id, distance)` pairs.
pub fn sort_by_distance<I>(entries: &mut [(I, f32)]) {
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
}

/// Ranks `items` by Euclidean distance from each rest position to
/// `reference`, ascending. Returns `(id, rank)` pairs with ranks forming
/// the permutation `1..=N`; the closest item gets rank 1.
pub fn assign_ranks<I: Copy>(items: &[(I, Vec3)], reference: Vec3) -> Vec<(I, u32)> {
    let mut ordered: Vec<(I, f32)> = items
        .iter()
        .map(|(id, rest)| (*id, rest.distance(reference)))
        .collect();
    sort_by_distance(&mut ordered);
    ordered
        .into_iter()
        .enumerate()
        .map(|(position, (id, _))| (id, position as u32 + 1))
        .collect()
}
