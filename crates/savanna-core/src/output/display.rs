//! Display Views
//!
//! Read-only, serialisable snapshots of the grid and of individual animals,
//! taken after a round completes. Rendering and transport layers consume
//! these without touching engine state.

use bevy_ecs::prelude::*;
use serde::Serialize;

use crate::components::animal::{AnimalId, Lifecycle, Species, Vitals};
use crate::components::grid::{Coord, Grid};
use crate::components::world::WorldState;
use crate::species::SpeciesRegistry;

/// How one occupied cell is rendered.
#[derive(Debug, Clone, Serialize)]
pub struct CellGlyph {
    pub glyph: char,
    pub emoji: String,
    pub alive: bool,
}

/// An advertised species choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesChoice {
    pub name: String,
    pub key: char,
}

/// The full grid as seen by a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct WorldView {
    pub height: usize,
    pub width: usize,
    pub round: u64,
    pub animals: usize,
    pub species_available: Vec<SpeciesChoice>,
    /// Row-major cells; `None` is an empty cell
    pub cells: Vec<Vec<Option<CellGlyph>>>,
}

/// Detail card for a single animal.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalCard {
    pub name: String,
    pub id: u64,
    pub emoji: String,
    pub health: f64,
    pub max_health: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub age: f64,
    pub offspring: u32,
    pub alive: bool,
    pub decomposed: bool,
}

/// Builds the renderer's view of the whole grid.
pub fn world_view(world: &World) -> WorldView {
    let grid = world.resource::<Grid>();
    let state = world.resource::<WorldState>();
    let registry = world.resource::<SpeciesRegistry>();

    let mut cells = Vec::with_capacity(grid.height());
    for row in 0..grid.height() {
        let mut row_cells = Vec::with_capacity(grid.width());
        for col in 0..grid.width() {
            let cell = grid.get(Coord::new(row, col)).and_then(|entity| {
                let species = world.get::<Species>(entity)?;
                let lifecycle = world.get::<Lifecycle>(entity)?;
                Some(CellGlyph {
                    glyph: species.0.profile.glyph,
                    emoji: species.0.profile.emoji.clone(),
                    alive: lifecycle.is_alive(),
                })
            });
            row_cells.push(cell);
        }
        cells.push(row_cells);
    }

    WorldView {
        height: grid.height(),
        width: grid.width(),
        round: state.round,
        animals: state.animals,
        species_available: registry
            .available()
            .into_iter()
            .map(|(name, key)| SpeciesChoice { name, key })
            .collect(),
        cells,
    }
}

/// Card data for the animal at a grid position, if any.
pub fn animal_card_at(world: &World, coord: Coord) -> Option<AnimalCard> {
    let entity = world.resource::<Grid>().get(coord)?;
    card_for(world, entity)
}

/// Card data for an animal looked up by its stable id.
pub fn animal_card_by_id(world: &World, id: AnimalId) -> Option<AnimalCard> {
    let coord = position_of(world, id)?;
    animal_card_at(world, coord)
}

/// Grid position of an animal looked up by its stable id.
pub fn position_of(world: &World, id: AnimalId) -> Option<Coord> {
    let grid = world.resource::<Grid>();
    for coord in grid.occupied() {
        if let Some(entity) = grid.get(coord) {
            if world.get::<AnimalId>(entity) == Some(&id) {
                return Some(coord);
            }
        }
    }
    None
}

fn card_for(world: &World, entity: Entity) -> Option<AnimalCard> {
    let id = world.get::<AnimalId>(entity)?;
    let species = world.get::<Species>(entity)?;
    let vitals = world.get::<Vitals>(entity)?;
    let lifecycle = world.get::<Lifecycle>(entity)?;
    Some(AnimalCard {
        name: species.0.profile.name.clone(),
        id: id.0,
        emoji: species.0.profile.emoji.clone(),
        health: vitals.health(),
        max_health: vitals.max_health(),
        stamina: vitals.stamina(),
        max_stamina: vitals.max_stamina(),
        age: lifecycle.age,
        offspring: lifecycle.offspring,
        alive: lifecycle.is_alive(),
        decomposed: !lifecycle.is_alive()
            && lifecycle.rounds_dead >= species.0.profile.rounds_to_decompose,
    })
}
