//! World State
//!
//! Global round and population bookkeeping, plus the stable animal id
//! allocator.

use bevy_ecs::prelude::*;

use super::animal::AnimalId;

/// Resource: current round, population count and id allocation.
#[derive(Resource, Debug)]
pub struct WorldState {
    /// Completed-round counter; starts at zero
    pub round: u64,
    /// Animals currently on the grid, alive or decomposing
    pub animals: usize,
    next_animal_id: u64,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            round: 0,
            animals: 0,
            next_animal_id: 1,
        }
    }

    /// Advances the round counter by one.
    pub fn advance_round(&mut self) {
        self.round += 1;
    }

    /// Allocates the next stable animal id.
    pub fn allocate_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next_animal_id);
        self.next_animal_id += 1;
        id
    }

    /// Raises the id allocator floor so restored ids are never reissued.
    pub fn reserve_ids_through(&mut self, highest: u64) {
        if self.next_animal_id <= highest {
            self.next_animal_id = highest + 1;
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}
