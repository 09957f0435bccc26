//! Event Types
//!
//! Round events are the atomic units of simulation history: births, deaths,
//! attacks and grid removals. They are collected per round by the engine and
//! written out as JSONL.

use serde::{Deserialize, Serialize};

/// Primary event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An offspring was placed on the grid
    Birth,
    /// An animal died (starvation, old age or predation)
    Death,
    /// A predator struck an adjacent prey animal
    Attack,
    /// A carcass or a faulty animal was removed from the grid
    Removal,
}

impl EventKind {
    /// Returns all event kind variants.
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Birth,
            EventKind::Death,
            EventKind::Attack,
            EventKind::Removal,
        ]
    }
}

/// Detail strings attached to death events.
pub mod death_causes {
    /// Health decayed to zero
    pub const STARVED: &str = "starved";
    /// Age passed the species limit
    pub const OLD_AGE: &str = "old_age";
    /// Killed by a predator's attack
    pub const KILLED: &str = "killed";
}

/// Detail strings attached to removal events.
pub mod removal_reasons {
    /// Carcass finished decomposing
    pub const DECOMPOSED: &str = "decomposed";
    /// The animal's turn panicked and it was evicted
    pub const CRASHED: &str = "crashed";
}

/// A single simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g. "evt_00000042")
    pub event_id: String,
    /// Round in which the event occurred
    pub round: u64,
    /// Event category
    pub kind: EventKind,
    /// Species name of the acting animal
    pub species: String,
    /// Stable id of the acting animal
    pub animal_id: u64,
    /// Grid row of the acting animal
    pub row: usize,
    /// Grid column of the acting animal
    pub col: usize,
    /// Other animal involved (e.g. the attacked prey)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<u64>,
    /// Cause or reason string (see [`death_causes`], [`removal_reasons`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Event {
    /// Creates a new event with the required fields.
    pub fn new(
        event_id: impl Into<String>,
        round: u64,
        kind: EventKind,
        species: impl Into<String>,
        animal_id: u64,
        row: usize,
        col: usize,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            round,
            kind,
            species: species.into(),
            animal_id,
            row,
            col,
            target_id: None,
            detail: None,
        }
    }

    /// Sets the secondary animal involved in the event.
    pub fn with_target(mut self, target_id: u64) -> Self {
        self.target_id = Some(target_id);
        self
    }

    /// Sets the cause/reason detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}
