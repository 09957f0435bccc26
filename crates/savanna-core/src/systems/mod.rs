//! Engine Systems
//!
//! Round progression, the mating protocol, and action
//! generation/selection/execution.

use bevy_ecs::prelude::*;

use savanna_events::{Event, EventKind};

use crate::components::animal::{AnimalId, Species};
use crate::components::grid::Coord;
use crate::components::world::WorldState;
use crate::events::RoundEvents;

pub mod action;
pub mod mating;
pub mod turn;

pub use action::{choose_weighted, execute, Action, WeightedAction};
pub use mating::run_mating;
pub use turn::run_round;

/// Buffers an event for the given animal into the round's event log.
/// Silently does nothing when the animal's identity is already gone.
pub(crate) fn record_event(
    world: &mut World,
    kind: EventKind,
    entity: Entity,
    coord: Coord,
    target_id: Option<u64>,
    detail: Option<&str>,
) {
    let round = world.resource::<WorldState>().round;
    let (species, id) = match (world.get::<Species>(entity), world.get::<AnimalId>(entity)) {
        (Some(species), Some(id)) => (species.0.profile.name.clone(), id.0),
        _ => return,
    };
    let mut events = world.resource_mut::<RoundEvents>();
    let event_id = events.next_id();
    let mut event = Event::new(event_id, round, kind, species, id, coord.row, coord.col);
    if let Some(target_id) = target_id {
        event = event.with_target(target_id);
    }
    if let Some(detail) = detail {
        event = event.with_detail(detail);
    }
    events.push(event);
}
