//! Core Components
//!
//! Components and resources that make up the simulation state: animal
//! identity and vitals, the spatial grid, and global world bookkeeping.

pub mod animal;
pub mod grid;
pub mod world;

pub use animal::{AnimalId, Attributes, Lifecycle, MateTracker, Species, Vitals};
pub use grid::{Coord, Grid};
pub use world::WorldState;
