//! Mating Protocol
//!
//! Mutual-consent reproduction. Both partners must have tracked each other
//! within reproduction range for the full consecutive-round threshold before
//! an offspring is placed. Only the first candidate to cross the threshold is
//! considered in a given round; candidates that left range are dropped from
//! the tracker afterwards.

use bevy_ecs::prelude::*;
use std::sync::Arc;

use savanna_events::EventKind;

use crate::components::animal::{AnimalId, Lifecycle, MateTracker};
use crate::components::grid::{Coord, Grid};
use crate::movement::{self, chebyshev};
use crate::perception::{AnimalView, VisionGrid};
use crate::setup;
use crate::species::{SpeciesDescriptor, ROUNDS_TO_REPRODUCE};
use crate::systems::record_event;
use crate::SimRng;

/// Runs one round of the mating protocol for the animal at `coord`.
pub fn run_mating(
    world: &mut World,
    view: &mut VisionGrid,
    entity: Entity,
    coord: Coord,
    species: &Arc<SpeciesDescriptor>,
) {
    let Some(lifecycle) = world.get::<Lifecycle>(entity) else {
        return;
    };
    if lifecycle.age < species.profile.bearing_age
        || lifecycle.time_since_litter < species.profile.litter_pause
    {
        return;
    }

    view.clear(view.self_local);
    let self_local = view.self_local;
    let candidates: Vec<(Coord, AnimalView)> = view
        .living_named(&species.profile.name)
        .into_iter()
        .filter(|(candidate_coord, _)| {
            chebyshev(self_local, *candidate_coord) <= species.profile.reproduction_range
        })
        .collect();
    let Some(my_id) = world.get::<AnimalId>(entity).copied() else {
        return;
    };

    let mut in_range = Vec::with_capacity(candidates.len());
    for (_, candidate) in &candidates {
        in_range.push(candidate.id);
        let my_count = match world.get_mut::<MateTracker>(entity) {
            Some(mut tracker) => tracker.increment(candidate.id),
            None => return,
        };
        if my_count >= ROUNDS_TO_REPRODUCE {
            let mutual = world
                .get::<MateTracker>(candidate.entity)
                .map_or(false, |tracker| tracker.count_for(my_id) >= ROUNDS_TO_REPRODUCE);
            if mutual {
                mate(world, entity, my_id, candidate.entity, coord, species);
                return;
            }
        }
    }

    if let Some(mut tracker) = world.get_mut::<MateTracker>(entity) {
        tracker.retain_candidates(&in_range);
    }
}

/// Places an offspring at a random valid adjacent cell (skipped when none is
/// free), then clears the candidate map and resets the litter pause. The
/// partner's entry for this animal is dropped and its pause reset as well, so
/// a successful mating restarts candidacy from scratch on both sides.
fn mate(
    world: &mut World,
    entity: Entity,
    my_id: AnimalId,
    partner: Entity,
    coord: Coord,
    species: &Arc<SpeciesDescriptor>,
) {
    let view = crate::perception::full_window(world, coord);
    let directions = movement::valid_directions(&view, view.self_local);
    let direction = {
        let mut rng = world.resource_mut::<SimRng>();
        movement::random_direction(&directions, &mut rng.0)
    };
    if let Some(direction) = direction {
        if let Some(target) = world.resource::<Grid>().target(coord, direction) {
            if let Some(child) = setup::spawn_animal(world, species.clone(), target) {
                if let Some(mut lifecycle) = world.get_mut::<Lifecycle>(entity) {
                    lifecycle.offspring += 1;
                }
                record_event(world, EventKind::Birth, child, target, None, None);
            }
        }
    }
    if let Some(mut tracker) = world.get_mut::<MateTracker>(entity) {
        tracker.clear();
    }
    if let Some(mut lifecycle) = world.get_mut::<Lifecycle>(entity) {
        lifecycle.time_since_litter = 0.0;
    }
    if let Some(mut tracker) = world.get_mut::<MateTracker>(partner) {
        tracker.remove(my_id);
    }
    if let Some(mut lifecycle) = world.get_mut::<Lifecycle>(partner) {
        lifecycle.time_since_litter = 0.0;
    }
}
