//! Animal Components
//!
//! Identity, physical attributes, vitals, lifecycle and mate tracking for a
//! single animal. Health and stamina never leave `[0, max]`; the maxima are
//! derived from the animal's own attributes and the shared base constants.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::species::{SpeciesDescriptor, SpeciesProfile, BASE_MAX_HEALTH, BASE_MAX_STAMINA, REST_RECOVERY_PER_ENDURANCE};

/// Stable identifier for an animal, unique for the lifetime of a world.
///
/// Cross-animal references (mate counters, snapshots) always use this id,
/// never an entity handle.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimalId(pub u64);

impl std::fmt::Display for AnimalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to the animal's species descriptor (constants + strategy).
#[derive(Component, Clone)]
pub struct Species(pub Arc<SpeciesDescriptor>);

/// Physical attributes, initialised from the species defaults.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    pub speed: u32,
    pub vision: u32,
    pub endurance: u32,
    pub defence: u32,
}

impl Attributes {
    pub fn from_profile(profile: &SpeciesProfile) -> Self {
        Self {
            speed: profile.speed,
            vision: profile.vision,
            endurance: profile.endurance,
            defence: profile.defence,
        }
    }

    /// Maximum stamina, derived from speed.
    pub fn max_stamina(&self) -> f64 {
        BASE_MAX_STAMINA * f64::from(self.speed)
    }

    /// Maximum health, derived from defence.
    pub fn max_health(&self) -> f64 {
        BASE_MAX_HEALTH * f64::from(self.defence)
    }

    /// Stamina regained by a single Rest, derived from endurance.
    pub fn rest_recovery(&self) -> f64 {
        REST_RECOVERY_PER_ENDURANCE * f64::from(self.endurance)
    }
}

/// Current health and stamina, clamped to `[0, max]` on every mutation.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Vitals {
    health: f64,
    stamina: f64,
    max_health: f64,
    max_stamina: f64,
}

impl Vitals {
    /// Creates vitals at full health and stamina for the given attributes.
    pub fn at_max(attributes: Attributes) -> Self {
        Self {
            health: attributes.max_health(),
            stamina: attributes.max_stamina(),
            max_health: attributes.max_health(),
            max_stamina: attributes.max_stamina(),
        }
    }

    /// Rebuilds vitals from persisted values, clamped to the attribute maxima.
    pub fn from_parts(health: f64, stamina: f64, attributes: Attributes) -> Self {
        let max_health = attributes.max_health();
        let max_stamina = attributes.max_stamina();
        Self {
            health: health.clamp(0.0, max_health),
            stamina: stamina.clamp(0.0, max_stamina),
            max_health,
            max_stamina,
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn stamina(&self) -> f64 {
        self.stamina
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn max_stamina(&self) -> f64 {
        self.max_stamina
    }

    /// True when the animal can pay for an action with the given stamina
    /// change without going below zero.
    pub fn can_afford(&self, stamina_change: f64) -> bool {
        self.stamina + stamina_change >= 0.0
    }

    /// Adds health, saturating at the maximum.
    pub fn heal(&mut self, amount: f64) {
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    /// Subtracts health, flooring at zero.
    pub fn damage(&mut self, amount: f64) {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
    }

    /// Applies a stamina gain or spend, clamped to `[0, max]`.
    pub fn change_stamina(&mut self, amount: f64) {
        self.stamina = (self.stamina + amount).clamp(0.0, self.max_stamina);
    }

    /// True when health has reached zero.
    pub fn is_drained(&self) -> bool {
        self.health <= 0.0
    }
}

/// Age, death and reproduction bookkeeping.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Lifecycle {
    pub alive: bool,
    /// Age in world time units (advances by the per-round time step)
    pub age: f64,
    /// Rounds elapsed since death; drives decomposition
    pub rounds_dead: u32,
    /// World time elapsed since the last litter
    pub time_since_litter: f64,
    /// Children successfully placed on the grid
    pub offspring: u32,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            alive: true,
            age: 0.0,
            rounds_dead: 0,
            time_since_litter: 0.0,
            offspring: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Irreversible transition to the dead state.
    pub fn kill(&mut self) {
        self.alive = false;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-animal map from candidate mate to a consecutive-proximity counter.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct MateTracker {
    counts: HashMap<AnimalId, u32>,
}

impl MateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a tracker from persisted counters.
    pub fn from_counts(counts: HashMap<AnimalId, u32>) -> Self {
        Self { counts }
    }

    /// Bumps the counter for a candidate and returns the new value.
    pub fn increment(&mut self, candidate: AnimalId) -> u32 {
        let count = self.counts.entry(candidate).or_insert(0);
        *count += 1;
        *count
    }

    /// Current counter for a candidate (zero when untracked).
    pub fn count_for(&self, candidate: AnimalId) -> u32 {
        self.counts.get(&candidate).copied().unwrap_or(0)
    }

    /// Drops every candidate not present in range this round.
    pub fn retain_candidates(&mut self, in_range: &[AnimalId]) {
        self.counts.retain(|id, _| in_range.contains(id));
    }

    /// Drops a single candidate (the partner's entry after a mating).
    pub fn remove(&mut self, candidate: AnimalId) {
        self.counts.remove(&candidate);
    }

    /// Clears the whole map (after a successful mating).
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Iterates the tracked counters (for snapshots).
    pub fn iter(&self) -> impl Iterator<Item = (&AnimalId, &u32)> {
        self.counts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_attributes() -> Attributes {
        Attributes {
            speed: 3,
            vision: 5,
            endurance: 8,
            defence: 2,
        }
    }

    #[test]
    fn test_derived_maxima() {
        let attrs = test_attributes();
        assert_eq!(attrs.max_stamina(), 75.0);
        assert_eq!(attrs.max_health(), 50.0);
        assert_eq!(attrs.rest_recovery(), 20.0);
    }

    #[test]
    fn test_vitals_start_at_max() {
        let vitals = Vitals::at_max(test_attributes());
        assert_eq!(vitals.health(), vitals.max_health());
        assert_eq!(vitals.stamina(), vitals.max_stamina());
    }

    #[test]
    fn test_heal_saturates_at_max() {
        let mut vitals = Vitals::at_max(test_attributes());
        vitals.damage(10.0);
        vitals.heal(1_000.0);
        assert_eq!(vitals.health(), vitals.max_health());
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut vitals = Vitals::at_max(test_attributes());
        vitals.damage(1_000.0);
        assert_eq!(vitals.health(), 0.0);
        assert!(vitals.is_drained());
    }

    #[test]
    fn test_stamina_stays_in_bounds() {
        let mut vitals = Vitals::at_max(test_attributes());
        vitals.change_stamina(500.0);
        assert_eq!(vitals.stamina(), vitals.max_stamina());
        vitals.change_stamina(-10_000.0);
        assert_eq!(vitals.stamina(), 0.0);
    }

    #[test]
    fn test_can_afford() {
        let mut vitals = Vitals::at_max(test_attributes());
        assert!(vitals.can_afford(-75.0));
        vitals.change_stamina(-50.0);
        assert!(!vitals.can_afford(-30.0));
        assert!(vitals.can_afford(-25.0));
    }

    #[test]
    fn test_from_parts_clamps() {
        let vitals = Vitals::from_parts(9_999.0, -5.0, test_attributes());
        assert_eq!(vitals.health(), 50.0);
        assert_eq!(vitals.stamina(), 0.0);
    }

    #[test]
    fn test_lifecycle_kill_is_irreversible_by_api() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.is_alive());
        lifecycle.kill();
        assert!(!lifecycle.is_alive());
    }

    #[test]
    fn test_mate_tracker_increment_and_drop() {
        let mut tracker = MateTracker::new();
        let a = AnimalId(1);
        let b = AnimalId(2);

        assert_eq!(tracker.increment(a), 1);
        assert_eq!(tracker.increment(a), 2);
        assert_eq!(tracker.increment(b), 1);
        assert_eq!(tracker.count_for(a), 2);

        tracker.retain_candidates(&[b]);
        assert_eq!(tracker.count_for(a), 0);
        assert_eq!(tracker.count_for(b), 1);

        tracker.clear();
        assert!(tracker.is_empty());
    }
}
