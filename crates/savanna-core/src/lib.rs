//! Savanna predator-prey simulation engine.
//!
//! A bounded 2-D grid world populated by autonomous animals of pluggable
//! species, advanced one discrete round at a time. Each animal perceives a
//! vision-limited window of the grid, runs the mating protocol, then selects
//! a weighted-random action consistent with its vitals. The engine owns
//! placement, lifecycle and fault isolation; species supply the decision
//! policy through the [`species::Strategy`] trait.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod events;
pub mod movement;
pub mod output;
pub mod perception;
pub mod setup;
pub mod species;
pub mod systems;

pub use components::*;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
