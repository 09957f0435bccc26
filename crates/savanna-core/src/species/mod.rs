//! Species
//!
//! The capability interface every species supplies: a constants profile
//! consumed by the engine and a decision [`Strategy`] producing weighted
//! action candidates. A [`SpeciesRegistry`] maps one-character creation keys
//! to descriptors; registration is static and first-come-first-served.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::components::animal::{Attributes, Vitals};
use crate::components::grid::Coord;
use crate::movement::chebyshev;
use crate::perception::{AnimalView, VisionGrid};
use crate::systems::action::WeightedAction;

pub mod antelope;
pub mod lion;

// Base constants shared by every species; per-species maxima and costs are
// multiples of these.
pub const BASE_MAX_STAMINA: f64 = 25.0;
pub const BASE_MAX_HEALTH: f64 = 25.0;
pub const REST_RECOVERY_PER_ENDURANCE: f64 = 2.5;
pub const ACTION_STAMINA_COST: f64 = 25.0;
pub const SLEEP_RECOVERY_FRACTION: f64 = 0.75;
pub const ROUNDS_TO_REPRODUCE: u32 = 3;
pub const TIME_PER_ROUND: f64 = 0.01;

/// Constants the engine consumes for one species.
#[derive(Debug, Clone)]
pub struct SpeciesProfile {
    /// Human-readable species name; strategies hunt and flee by name
    pub name: String,
    /// One-character creation key, unique per registry
    pub key: char,
    /// Single-character display glyph
    pub glyph: char,
    /// Emoji display label
    pub emoji: String,
    pub speed: u32,
    pub vision: u32,
    pub endurance: u32,
    pub defence: u32,
    /// Rounds a carcass stays on the grid before removal
    pub rounds_to_decompose: u32,
    /// Health lost every round while alive
    pub health_decay: f64,
    /// Chebyshev range within which mating candidacy accrues
    pub reproduction_range: usize,
    pub max_age: f64,
    /// Minimum age before the mating protocol runs
    pub bearing_age: f64,
    /// Minimum time between litters
    pub litter_pause: f64,
}

/// A registered species: engine constants plus the decision policy.
pub struct SpeciesDescriptor {
    pub profile: SpeciesProfile,
    pub strategy: Box<dyn Strategy>,
}

/// Snapshot of the acting animal handed to its strategy.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub vitals: Vitals,
    pub attributes: Attributes,
    /// The animal's global grid coordinate this round
    pub global: Coord,
}

/// Per-species decision policy.
///
/// Receives the (mutable, scratch) vision window with the actor still in it,
/// and returns the weighted candidate set for this round. Candidates are
/// re-validated for affordability at execution time, so a strategy may emit
/// actions the animal turns out not to afford.
pub trait Strategy: Send + Sync {
    fn decide(
        &self,
        view: &mut VisionGrid,
        ctx: &TurnContext,
        rng: &mut SmallRng,
    ) -> Vec<WeightedAction>;
}

/// Picks the closest of the given animals, breaking distance ties uniformly
/// at random.
pub fn closest_target(
    candidates: &[(Coord, AnimalView)],
    from: Coord,
    rng: &mut SmallRng,
) -> Option<(Coord, AnimalView)> {
    let nearest = candidates
        .iter()
        .map(|(coord, _)| chebyshev(from, *coord))
        .min()?;
    let tied: Vec<&(Coord, AnimalView)> = candidates
        .iter()
        .filter(|(coord, _)| chebyshev(from, *coord) == nearest)
        .collect();
    tied.choose(rng).map(|&(coord, view)| (*coord, view.clone()))
}

/// Errors raised by species registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("creation key '{key}' is already used by {existing}")]
    KeyTaken { key: char, existing: String },
}

/// Resource: creation key -> species descriptor, in registration order.
#[derive(Resource, Default)]
pub struct SpeciesRegistry {
    species: HashMap<char, Arc<SpeciesDescriptor>>,
    order: Vec<char>,
}

impl SpeciesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in Antelope and Lion.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for descriptor in [antelope::descriptor(), lion::descriptor()] {
            if let Err(error) = registry.register(descriptor) {
                tracing::warn!("skipping species registration: {error}");
            }
        }
        registry
    }

    /// Registers a species. The first registration of a key wins; later
    /// registrations of the same key are rejected.
    pub fn register(&mut self, descriptor: SpeciesDescriptor) -> Result<(), RegistryError> {
        let key = descriptor.profile.key;
        if let Some(existing) = self.species.get(&key) {
            return Err(RegistryError::KeyTaken {
                key,
                existing: existing.profile.name.clone(),
            });
        }
        self.order.push(key);
        self.species.insert(key, Arc::new(descriptor));
        Ok(())
    }

    /// Looks up a species by its creation key.
    pub fn get(&self, key: char) -> Option<Arc<SpeciesDescriptor>> {
        self.species.get(&key).cloned()
    }

    /// Advertised (name, creation key) pairs, in registration order.
    pub fn available(&self) -> Vec<(String, char)> {
        self.order
            .iter()
            .filter_map(|key| self.species.get(key))
            .map(|descriptor| (descriptor.profile.name.clone(), descriptor.profile.key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
