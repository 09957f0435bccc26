//! Actions
//!
//! The verbs an animal can perform in one round. Strategies emit weighted
//! candidates carrying their own tuning (costs, damage, healing), so the
//! shared selection and execution paths stay species-agnostic.

use bevy_ecs::prelude::*;

use crate::movement::Direction;

pub mod execute;
pub mod select;

pub use execute::execute;
pub use select::choose_weighted;

/// One candidate action. Resource costs are negative stamina changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Step to an adjacent cell; `None` means no direction was available and
    /// execution falls back to Rest.
    Move(Option<Direction>),
    /// Strike an adjacent animal.
    Attack {
        target: Entity,
        cost: f64,
        damage: f64,
        /// Health regained when the strike kills the target
        heal_on_kill: f64,
    },
    /// Smell out the nearest prey across the whole field and move toward it
    /// at an extra cost.
    TrackScent { cost: f64, prey: String },
    /// Stop to eat, regaining health.
    Graze { cost: f64, healing: f64 },
    /// Spend stamina to no further effect.
    Roar { cost: f64 },
    /// Recover a little stamina.
    Rest,
    /// Recover a large fraction of maximum stamina.
    Sleep,
}

/// An action candidate with its selection weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedAction {
    pub action: Action,
    pub weight: u32,
}

impl WeightedAction {
    pub fn new(action: Action, weight: u32) -> Self {
        Self { action, weight }
    }
}
