//! Shared event and snapshot types for the savanna simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the engine and for any external renderer or
//! persistence consumer.

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::{generate_event_id, removal_reasons, death_causes, Event, EventKind};

// Re-export snapshot types
pub use snapshot::{generate_snapshot_id, AnimalSnapshot, WorldSnapshot};
