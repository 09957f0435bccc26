//! Perception
//!
//! Builds the vision-limited window an animal acts on: a rectangular scratch
//! copy of the grid clipped to world bounds, centered on the animal as far as
//! the bounds allow. The window is read/write within a single turn and never
//! persisted.

use bevy_ecs::prelude::*;

use crate::components::animal::{AnimalId, Lifecycle, Species};
use crate::components::grid::{Coord, Grid};
use crate::movement::{step_within, Direction};

/// What one occupied cell looks like from the acting animal's point of view.
#[derive(Debug, Clone)]
pub struct AnimalView {
    pub entity: Entity,
    pub id: AnimalId,
    pub species: String,
    pub alive: bool,
}

impl AnimalView {
    pub fn new(entity: Entity, id: AnimalId, species: impl Into<String>, alive: bool) -> Self {
        Self {
            entity,
            id,
            species: species.into(),
            alive,
        }
    }
}

/// A clipped rectangular view of the grid, in window-local coordinates.
#[derive(Debug, Clone)]
pub struct VisionGrid {
    height: usize,
    width: usize,
    /// Global coordinate of the window's local (0, 0)
    origin: Coord,
    cells: Vec<Option<AnimalView>>,
    /// The acting animal's own cell, in window-local coordinates
    pub self_local: Coord,
}

impl VisionGrid {
    /// Creates an empty window; cells are filled in with [`VisionGrid::set`].
    pub fn new(height: usize, width: usize, origin: Coord, self_local: Coord) -> Self {
        Self {
            height,
            width,
            origin,
            cells: vec![None; height * width],
            self_local,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.width + coord.col
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    pub fn get(&self, coord: Coord) -> Option<&AnimalView> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.cells[self.index(coord)].as_ref()
    }

    pub fn set(&mut self, coord: Coord, view: AnimalView) {
        if self.in_bounds(coord) {
            let index = self.index(coord);
            self.cells[index] = Some(view);
        }
    }

    /// Blanks out a cell; strategies use this to remove themselves from their
    /// own surroundings before scanning.
    pub fn clear(&mut self, coord: Coord) {
        if self.in_bounds(coord) {
            let index = self.index(coord);
            self.cells[index] = None;
        }
    }

    /// True when the cell is inside the window and empty.
    pub fn is_vacant(&self, coord: Coord) -> bool {
        self.in_bounds(coord) && self.cells[self.index(coord)].is_none()
    }

    /// The in-window neighbour reached by applying a direction, if any.
    pub fn target(&self, from: Coord, direction: Direction) -> Option<Coord> {
        step_within(from, direction, self.height, self.width)
    }

    /// Translates a window-local coordinate back to the global grid.
    pub fn to_global(&self, local: Coord) -> Coord {
        Coord::new(self.origin.row + local.row, self.origin.col + local.col)
    }

    /// All living animals of the named species, with their window-local
    /// coordinates, in row-major order.
    pub fn living_named(&self, species: &str) -> Vec<(Coord, AnimalView)> {
        let mut found = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let coord = Coord::new(row, col);
                if let Some(view) = self.get(coord) {
                    if view.alive && view.species == species {
                        found.push((coord, view.clone()));
                    }
                }
            }
        }
        found
    }
}

/// Builds the window clipped to `[row - vision, row + vision] x
/// [col - vision, col + vision]` intersected with world bounds.
pub fn visible_window(world: &World, center: Coord, vision: usize) -> VisionGrid {
    let grid = world.resource::<Grid>();
    let row_start = center.row.saturating_sub(vision);
    let col_start = center.col.saturating_sub(vision);
    let row_end = (center.row + vision).min(grid.height().saturating_sub(1));
    let col_end = (center.col + vision).min(grid.width().saturating_sub(1));
    let origin = Coord::new(row_start, col_start);
    let self_local = Coord::new(center.row - row_start, center.col - col_start);

    let mut view = VisionGrid::new(row_end - row_start + 1, col_end - col_start + 1, origin, self_local);
    fill_window(world, grid, &mut view);
    view
}

/// Builds a window covering the entire grid (used for scent tracking and
/// offspring placement, which consider the whole field).
pub fn full_window(world: &World, center: Coord) -> VisionGrid {
    let grid = world.resource::<Grid>();
    let mut view = VisionGrid::new(grid.height(), grid.width(), Coord::new(0, 0), center);
    fill_window(world, grid, &mut view);
    view
}

fn fill_window(world: &World, grid: &Grid, view: &mut VisionGrid) {
    for local_row in 0..view.height() {
        for local_col in 0..view.width() {
            let local = Coord::new(local_row, local_col);
            let global = view.to_global(local);
            let Some(entity) = grid.get(global) else {
                continue;
            };
            let (Some(id), Some(species), Some(lifecycle)) = (
                world.get::<AnimalId>(entity),
                world.get::<Species>(entity),
                world.get::<Lifecycle>(entity),
            ) else {
                continue;
            };
            view.set(
                local,
                AnimalView::new(entity, *id, species.0.profile.name.clone(), lifecycle.is_alive()),
            );
        }
    }
}
