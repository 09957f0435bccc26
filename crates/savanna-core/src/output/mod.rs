//! Output Boundaries
//!
//! Read-only views for rendering/transport collaborators and snapshot
//! capture/restore for persistence collaborators.

pub mod display;
pub mod snapshot;

pub use display::{
    animal_card_at, animal_card_by_id, position_of, world_view, AnimalCard, CellGlyph,
    SpeciesChoice, WorldView,
};
pub use snapshot::{capture, restore, write_snapshot, SnapshotTracker};
