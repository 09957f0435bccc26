//! World Setup
//!
//! Builds a fresh world with all engine resources installed and spawns the
//! initial population.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::components::animal::{AnimalId, Attributes, Lifecycle, MateTracker, Species, Vitals};
use crate::components::grid::{Coord, Grid};
use crate::components::world::WorldState;
use crate::config::{Config, SpawnConfig};
use crate::events::RoundEvents;
use crate::output::snapshot::SnapshotTracker;
use crate::species::{SpeciesDescriptor, SpeciesRegistry};
use crate::SimRng;

/// Creates a world with every engine resource installed and an empty grid.
pub fn empty_world(height: usize, width: usize, seed: u64) -> World {
    let mut world = World::new();
    world.insert_resource(Grid::new(height, width));
    world.insert_resource(WorldState::new());
    world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(SpeciesRegistry::with_defaults());
    world.insert_resource(RoundEvents::new());
    world.insert_resource(SnapshotTracker::new(crate::output::snapshot::DEFAULT_SNAPSHOT_INTERVAL));
    world
}

/// Creates a world from the configuration and spawns the initial animals.
pub fn build_world(config: &Config) -> World {
    let mut world = empty_world(config.world.height, config.world.width, config.world.seed);
    world.insert_resource(SnapshotTracker::new(config.output.snapshot_interval));
    populate(&mut world, &config.spawn);
    world
}

/// Spawns the configured initial population at random vacant cells.
pub fn populate(world: &mut World, spawn: &SpawnConfig) {
    for _ in 0..spawn.antelopes {
        spawn_at_random_vacant(world, 'A');
    }
    for _ in 0..spawn.lions {
        spawn_at_random_vacant(world, 'L');
    }
}

/// Spawns a default-initialised animal of the given species into a cell.
/// Returns `None` (and changes nothing) when the cell is occupied or out of
/// range.
pub fn spawn_animal(
    world: &mut World,
    species: Arc<SpeciesDescriptor>,
    coord: Coord,
) -> Option<Entity> {
    if !world.resource::<Grid>().is_vacant(coord) {
        return None;
    }
    let id = world.resource_mut::<WorldState>().allocate_id();
    let attributes = Attributes::from_profile(&species.profile);
    let entity = world
        .spawn((
            id,
            Species(species),
            attributes,
            Vitals::at_max(attributes),
            Lifecycle::new(),
            MateTracker::new(),
        ))
        .id();
    world.resource_mut::<Grid>().place(entity, coord);
    world.resource_mut::<WorldState>().animals += 1;
    Some(entity)
}

/// Spawns an animal of the keyed species at a random vacant cell. A no-op
/// when the key is unknown or the grid is full.
pub fn spawn_at_random_vacant(world: &mut World, key: char) -> Option<Entity> {
    let Some(species) = world.resource::<SpeciesRegistry>().get(key) else {
        tracing::warn!("no species registered for creation key '{key}'");
        return None;
    };
    let coord = world.resource_scope(|world, mut rng: Mut<SimRng>| {
        world.resource::<Grid>().random_vacant(&mut rng.0)
    })?;
    spawn_animal(world, species, coord)
}

/// Restores an animal with explicit state (used by snapshot rehydration).
#[allow(clippy::too_many_arguments)]
pub fn spawn_restored(
    world: &mut World,
    species: Arc<SpeciesDescriptor>,
    coord: Coord,
    id: AnimalId,
    attributes: Attributes,
    vitals: Vitals,
    lifecycle: Lifecycle,
    tracker: MateTracker,
) -> Option<Entity> {
    if !world.resource::<Grid>().is_vacant(coord) {
        return None;
    }
    let entity = world
        .spawn((id, Species(species), attributes, vitals, lifecycle, tracker))
        .id();
    world.resource_mut::<Grid>().place(entity, coord);
    let mut state = world.resource_mut::<WorldState>();
    state.animals += 1;
    state.reserve_ids_through(id.0);
    Some(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_animal_initialises_at_max() {
        let mut world = empty_world(10, 10, 1);
        let species = world.resource::<SpeciesRegistry>().get('L').unwrap();

        let entity = spawn_animal(&mut world, species, Coord::new(3, 3)).unwrap();

        let vitals = world.get::<Vitals>(entity).unwrap();
        assert_eq!(vitals.health(), 100.0);
        assert_eq!(vitals.stamina(), 200.0);
        assert!(world.get::<Lifecycle>(entity).unwrap().is_alive());
        assert_eq!(world.resource::<WorldState>().animals, 1);
    }

    #[test]
    fn test_spawn_into_occupied_cell_is_noop() {
        let mut world = empty_world(10, 10, 1);
        let species = world.resource::<SpeciesRegistry>().get('A').unwrap();
        spawn_animal(&mut world, species.clone(), Coord::new(3, 3)).unwrap();

        assert!(spawn_animal(&mut world, species, Coord::new(3, 3)).is_none());
        assert_eq!(world.resource::<WorldState>().animals, 1);
    }

    #[test]
    fn test_spawn_at_random_vacant_unknown_key() {
        let mut world = empty_world(10, 10, 1);

        assert!(spawn_at_random_vacant(&mut world, 'Z').is_none());
        assert_eq!(world.resource::<WorldState>().animals, 0);
    }

    #[test]
    fn test_spawn_fills_up_to_grid_capacity() {
        let mut world = empty_world(2, 3, 1);

        for _ in 0..10 {
            spawn_at_random_vacant(&mut world, 'A');
        }

        assert_eq!(world.resource::<WorldState>().animals, 6);
        assert_eq!(world.resource::<Grid>().occupied_count(), 6);
    }

    #[test]
    fn test_animal_ids_are_unique() {
        let mut world = empty_world(5, 5, 1);
        let mut ids = Vec::new();
        for _ in 0..5 {
            let entity = spawn_at_random_vacant(&mut world, 'A').unwrap();
            ids.push(*world.get::<AnimalId>(entity).unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
