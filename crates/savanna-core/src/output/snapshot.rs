//! Snapshot Capture & Restore
//!
//! Converts the live world to a serialisable [`WorldSnapshot`] and rebuilds
//! an equivalent world from one, going through the species registry so that
//! externally registered species rehydrate the same way built-ins do.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use savanna_events::{generate_snapshot_id, AnimalSnapshot, WorldSnapshot};

use crate::components::animal::{AnimalId, Attributes, Lifecycle, MateTracker, Species, Vitals};
use crate::components::grid::{Coord, Grid};
use crate::components::world::WorldState;
use crate::setup;
use crate::species::SpeciesRegistry;

/// Default rounds between periodic snapshots
pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 100;

/// Resource tracking snapshot ids and the interval policy.
#[derive(Resource, Debug)]
pub struct SnapshotTracker {
    next_snapshot_id: u64,
    snapshot_interval: u64,
    last_snapshot_round: u64,
}

impl SnapshotTracker {
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            next_snapshot_id: 1,
            snapshot_interval,
            last_snapshot_round: 0,
        }
    }

    pub fn should_snapshot(&self, round: u64) -> bool {
        self.snapshot_interval > 0 && round > 0 && round % self.snapshot_interval == 0
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn mark_snapshot(&mut self, round: u64) {
        self.last_snapshot_round = round;
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id - 1
    }
}

/// Captures the complete state of every occupied cell.
pub fn capture(world: &mut World) -> WorldSnapshot {
    let snapshot_id = world.resource_mut::<SnapshotTracker>().next_id();
    let grid = world.resource::<Grid>();
    let state = world.resource::<WorldState>();

    let mut snapshot = WorldSnapshot::new(snapshot_id, state.round, grid.height(), grid.width());
    for coord in grid.occupied() {
        let Some(entity) = grid.get(coord) else {
            continue;
        };
        let (Some(id), Some(species), Some(attributes), Some(vitals), Some(lifecycle), Some(tracker)) = (
            world.get::<AnimalId>(entity),
            world.get::<Species>(entity),
            world.get::<Attributes>(entity),
            world.get::<Vitals>(entity),
            world.get::<Lifecycle>(entity),
            world.get::<MateTracker>(entity),
        ) else {
            continue;
        };
        snapshot.animals.push(AnimalSnapshot {
            id: id.0,
            species_key: species.0.profile.key,
            row: coord.row,
            col: coord.col,
            health: vitals.health(),
            stamina: vitals.stamina(),
            speed: attributes.speed,
            vision: attributes.vision,
            endurance: attributes.endurance,
            defence: attributes.defence,
            alive: lifecycle.is_alive(),
            rounds_dead: lifecycle.rounds_dead,
            age: lifecycle.age,
            time_since_litter: lifecycle.time_since_litter,
            offspring: lifecycle.offspring,
            mate_counts: tracker.iter().map(|(id, count)| (id.0, *count)).collect(),
        });
    }
    snapshot
}

/// Rebuilds the grid and all animals from a snapshot. Animals whose species
/// key is not registered are skipped with a warning, mirroring how unknown
/// saves behave elsewhere; everything else is restored verbatim.
pub fn restore(world: &mut World, snapshot: &WorldSnapshot) {
    let existing: Vec<Entity> = {
        let grid = world.resource::<Grid>();
        grid.occupied()
            .into_iter()
            .filter_map(|coord| grid.get(coord))
            .collect()
    };
    for entity in existing {
        world.despawn(entity);
    }
    world.insert_resource(Grid::new(snapshot.height, snapshot.width));
    {
        let mut state = world.resource_mut::<WorldState>();
        state.round = snapshot.round;
        state.animals = 0;
    }

    for animal in &snapshot.animals {
        let Some(species) = world.resource::<SpeciesRegistry>().get(animal.species_key) else {
            tracing::warn!(
                "skipping animal {} with unregistered species key '{}'",
                animal.id,
                animal.species_key
            );
            continue;
        };
        let attributes = Attributes {
            speed: animal.speed,
            vision: animal.vision,
            endurance: animal.endurance,
            defence: animal.defence,
        };
        let vitals = Vitals::from_parts(animal.health, animal.stamina, attributes);
        let lifecycle = Lifecycle {
            alive: animal.alive,
            age: animal.age,
            rounds_dead: animal.rounds_dead,
            time_since_litter: animal.time_since_litter,
            offspring: animal.offspring,
        };
        let tracker = MateTracker::from_counts(
            animal
                .mate_counts
                .iter()
                .map(|(id, count)| (AnimalId(*id), *count))
                .collect::<HashMap<_, _>>(),
        );
        setup::spawn_restored(
            world,
            species,
            Coord::new(animal.row, animal.col),
            AnimalId(animal.id),
            attributes,
            vitals,
            lifecycle,
            tracker,
        );
    }
}

/// Errors raised while writing a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotWriteError {
    #[error("could not write snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialise snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes a snapshot as pretty JSON into the given directory, named by its
/// snapshot id. Returns the path written.
pub fn write_snapshot(dir: impl AsRef<Path>, snapshot: &WorldSnapshot) -> Result<PathBuf, SnapshotWriteError> {
    fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join(format!("{}.json", snapshot.snapshot_id));
    fs::write(&path, snapshot.to_json_pretty()?)?;
    Ok(path)
}
