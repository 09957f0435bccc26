//! Movement Utility
//!
//! Pure functions over the 8 compass directions: validity checks against a
//! vision window, Chebyshev-distance tie-breaking toward or away from a
//! target, and uniform random selection.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::components::grid::Coord;
use crate::perception::VisionGrid;

/// The 8 compass directions an animal can move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit (row, column) delta for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

/// Applies a direction to a coordinate, bounded by `height` x `width`.
pub fn step_within(from: Coord, direction: Direction, height: usize, width: usize) -> Option<Coord> {
    let (delta_row, delta_col) = direction.offset();
    let row = from.row as i64 + i64::from(delta_row);
    let col = from.col as i64 + i64::from(delta_col);
    if row < 0 || col < 0 || row >= height as i64 || col >= width as i64 {
        return None;
    }
    Some(Coord::new(row as usize, col as usize))
}

/// Chebyshev distance: the number of moves between two cells.
pub fn chebyshev(from: Coord, to: Coord) -> usize {
    from.row.abs_diff(to.row).max(from.col.abs_diff(to.col))
}

/// All directions whose target cell is inside the window and empty.
pub fn valid_directions(view: &VisionGrid, from: Coord) -> Vec<Direction> {
    Direction::ALL
        .iter()
        .copied()
        .filter(|&direction| {
            view.target(from, direction)
                .map_or(false, |coord| view.is_vacant(coord))
        })
        .collect()
}

/// Uniformly samples one direction, or signals "no direction" on an empty
/// candidate list.
pub fn random_direction(directions: &[Direction], rng: &mut SmallRng) -> Option<Direction> {
    directions.choose(rng).copied()
}

/// Directions minimising the post-move Chebyshev distance to a target
/// (pursuit). Ties are all returned.
pub fn directions_toward(
    view: &VisionGrid,
    directions: &[Direction],
    from: Coord,
    target: Coord,
) -> Vec<Direction> {
    extremal_directions(view, directions, from, target, false)
}

/// Directions maximising the post-move Chebyshev distance to a threat
/// (flight). Ties are all returned.
pub fn directions_away(
    view: &VisionGrid,
    directions: &[Direction],
    from: Coord,
    threat: Coord,
) -> Vec<Direction> {
    extremal_directions(view, directions, from, threat, true)
}

fn extremal_directions(
    view: &VisionGrid,
    directions: &[Direction],
    from: Coord,
    target: Coord,
    pick_max: bool,
) -> Vec<Direction> {
    let scored: Vec<(Direction, usize)> = directions
        .iter()
        .filter_map(|&direction| {
            view.target(from, direction)
                .map(|coord| (direction, chebyshev(coord, target)))
        })
        .collect();
    let extreme = if pick_max {
        scored.iter().map(|&(_, distance)| distance).max()
    } else {
        scored.iter().map(|&(_, distance)| distance).min()
    };
    let Some(extreme) = extreme else {
        return Vec::new();
    };
    scored
        .into_iter()
        .filter(|&(_, distance)| distance == extreme)
        .map(|(direction, _)| direction)
        .collect()
}
