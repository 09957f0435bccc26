//! Spatial Grid
//!
//! A fixed-size 2-D field of cells, each empty or holding exactly one animal
//! entity. The grid exclusively owns cell occupancy; animals only ever hold a
//! coordinate snapshot valid for the current round.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::movement::{step_within, Direction};

/// A (row, column) pair addressing one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The world field. Every placement mutation goes through this resource.
#[derive(Resource, Debug)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Option<Entity>>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![None; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.width + coord.col
    }

    /// Returns the occupant of a cell, or `None` when empty or out of range.
    pub fn get(&self, coord: Coord) -> Option<Entity> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.cells[self.index(coord)]
    }

    /// True when the cell is in range and empty.
    pub fn is_vacant(&self, coord: Coord) -> bool {
        self.in_bounds(coord) && self.cells[self.index(coord)].is_none()
    }

    /// Places an entity into a cell. Fails silently (returns `false`) when
    /// the cell is occupied or out of range.
    pub fn place(&mut self, entity: Entity, coord: Coord) -> bool {
        if !self.is_vacant(coord) {
            return false;
        }
        let index = self.index(coord);
        self.cells[index] = Some(entity);
        true
    }

    /// Empties a cell, returning the previous occupant.
    pub fn clear(&mut self, coord: Coord) -> Option<Entity> {
        if !self.in_bounds(coord) {
            return None;
        }
        let index = self.index(coord);
        self.cells[index].take()
    }

    /// The in-range neighbour reached by applying a direction, if any.
    pub fn target(&self, from: Coord, direction: Direction) -> Option<Coord> {
        step_within(from, direction, self.height, self.width)
    }

    /// Swaps the source cell with the neighbour in the given direction.
    /// No-op (returns `None`) when the target is out of range or occupied.
    pub fn step(&mut self, from: Coord, direction: Direction) -> Option<Coord> {
        let to = self.target(from, direction)?;
        if !self.is_vacant(to) {
            return None;
        }
        let from_index = self.index(from);
        let to_index = self.index(to);
        self.cells.swap(from_index, to_index);
        Some(to)
    }

    /// Coordinates of every occupied cell, in row-major order.
    pub fn occupied(&self) -> Vec<Coord> {
        let mut coords = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let coord = Coord::new(row, col);
                if self.cells[self.index(coord)].is_some() {
                    coords.push(coord);
                }
            }
        }
        coords
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Finds the cell currently holding the given entity.
    pub fn position_of(&self, entity: Entity) -> Option<Coord> {
        self.cells.iter().position(|&cell| cell == Some(entity)).map(|index| {
            Coord::new(index / self.width, index % self.width)
        })
    }

    /// Picks a random vacant cell by probing random coordinates, falling back
    /// to a uniform choice among all vacant cells after a full grid's worth
    /// of probes. Returns `None` when the grid is full.
    pub fn random_vacant(&self, rng: &mut SmallRng) -> Option<Coord> {
        if !self.cells.iter().any(|cell| cell.is_none()) {
            return None;
        }
        for _ in 0..self.cells.len() {
            let coord = Coord::new(rng.gen_range(0..self.height), rng.gen_range(0..self.width));
            if self.is_vacant(coord) {
                return Some(coord);
            }
        }
        let vacant: Vec<Coord> = (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| Coord::new(row, col)))
            .filter(|&coord| self.is_vacant(coord))
            .collect();
        vacant.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn test_place_and_get() {
        let mut grid = Grid::new(10, 15);
        let coord = Coord::new(9, 14);

        assert!(grid.place(entity(1), coord));
        assert_eq!(grid.get(coord), Some(entity(1)));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_place_on_occupied_cell_is_noop() {
        let mut grid = Grid::new(5, 5);
        let coord = Coord::new(2, 2);
        grid.place(entity(1), coord);

        assert!(!grid.place(entity(2), coord));
        assert_eq!(grid.get(coord), Some(entity(1)));
    }

    #[test]
    fn test_place_out_of_range_is_noop() {
        let mut grid = Grid::new(5, 5);

        assert!(!grid.place(entity(1), Coord::new(5, 0)));
        assert!(!grid.place(entity(1), Coord::new(0, 5)));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_step_swaps_cells() {
        let mut grid = Grid::new(10, 15);
        grid.place(entity(1), Coord::new(8, 14));

        let landed = grid.step(Coord::new(8, 14), Direction::South);

        assert_eq!(landed, Some(Coord::new(9, 14)));
        assert_eq!(grid.get(Coord::new(8, 14)), None);
        assert_eq!(grid.get(Coord::new(9, 14)), Some(entity(1)));
    }

    #[test]
    fn test_step_into_occupied_cell_is_noop() {
        let mut grid = Grid::new(5, 5);
        grid.place(entity(1), Coord::new(1, 1));
        grid.place(entity(2), Coord::new(1, 2));

        assert_eq!(grid.step(Coord::new(1, 1), Direction::East), None);
        assert_eq!(grid.get(Coord::new(1, 1)), Some(entity(1)));
        assert_eq!(grid.get(Coord::new(1, 2)), Some(entity(2)));
    }

    #[test]
    fn test_step_out_of_bounds_is_noop() {
        let mut grid = Grid::new(5, 5);
        grid.place(entity(1), Coord::new(0, 0));

        assert_eq!(grid.step(Coord::new(0, 0), Direction::North), None);
        assert_eq!(grid.step(Coord::new(0, 0), Direction::West), None);
        assert_eq!(grid.get(Coord::new(0, 0)), Some(entity(1)));
    }

    #[test]
    fn test_occupied_lists_row_major() {
        let mut grid = Grid::new(3, 3);
        grid.place(entity(1), Coord::new(2, 0));
        grid.place(entity(2), Coord::new(0, 1));

        assert_eq!(grid.occupied(), vec![Coord::new(0, 1), Coord::new(2, 0)]);
    }

    #[test]
    fn test_random_vacant_finds_last_free_cell() {
        let mut grid = Grid::new(3, 3);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut next = 0u32;
        for row in 0..3 {
            for col in 0..3 {
                if (row, col) != (1, 1) {
                    grid.place(entity(next), Coord::new(row, col));
                    next += 1;
                }
            }
        }

        assert_eq!(grid.random_vacant(&mut rng), Some(Coord::new(1, 1)));
    }

    #[test]
    fn test_random_vacant_on_full_grid_is_none() {
        let mut grid = Grid::new(2, 2);
        let mut rng = SmallRng::seed_from_u64(7);
        for (index, coord) in [(0, 0), (0, 1), (1, 0), (1, 1)].iter().enumerate() {
            grid.place(entity(index as u32), Coord::new(coord.0, coord.1));
        }

        assert_eq!(grid.random_vacant(&mut rng), None);
    }
}
