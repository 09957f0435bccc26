//! Snapshot Types
//!
//! Serialization structs for world snapshots.
//!
//! Snapshots capture the complete state of every occupied cell at the end of
//! a round, sufficient to reconstruct an equivalent grid. Mate counters are
//! keyed by the stable animal id rather than by any in-memory reference.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Full state of one animal, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    /// Stable animal id
    pub id: u64,
    /// Creation key of the species (used to rebuild via the registry)
    pub species_key: char,
    pub row: usize,
    pub col: usize,
    pub health: f64,
    pub stamina: f64,
    pub speed: u32,
    pub vision: u32,
    pub endurance: u32,
    pub defence: u32,
    pub alive: bool,
    pub rounds_dead: u32,
    pub age: f64,
    pub time_since_litter: f64,
    #[serde(default)]
    pub offspring: u32,
    /// Consecutive-proximity counters toward candidate mates, by animal id
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub mate_counts: HashMap<u64, u32>,
}

/// Complete world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Unique identifier (e.g. "snap_000001")
    pub snapshot_id: String,
    /// Round counter at capture time
    pub round: u64,
    pub height: usize,
    pub width: usize,
    /// Every occupied cell's animal, in row-major order
    pub animals: Vec<AnimalSnapshot>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot with the given dimensions.
    pub fn new(snapshot_id: impl Into<String>, round: u64, height: usize, width: usize) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            round,
            height,
            width,
            animals: Vec::new(),
        }
    }

    /// Finds an animal by its stable id.
    pub fn find_animal(&self, id: u64) -> Option<&AnimalSnapshot> {
        self.animals.iter().find(|a| a.id == id)
    }

    /// Returns the animal occupying the given cell, if any.
    pub fn animal_at(&self, row: usize, col: usize) -> Option<&AnimalSnapshot> {
        self.animals.iter().find(|a| a.row == row && a.col == col)
    }

    /// Returns the number of animals on the grid (alive or decomposing).
    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    /// Returns the number of living animals.
    pub fn living_count(&self) -> usize {
        self.animals.iter().filter(|a| a.alive).count()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
