//! Lion
//!
//! Built-in predator species. Attacks adjacent prey, pursues the nearest
//! visible antelope, sleeps when tired, tracks prey by scent across the
//! whole field when hungry, otherwise picks among wandering, roaring and
//! recovery by weight.

use rand::rngs::SmallRng;

use crate::components::grid::Coord;
use crate::movement::{self, chebyshev, Direction};
use crate::perception::{AnimalView, VisionGrid};
use crate::systems::action::{Action, WeightedAction};

use super::{closest_target, SpeciesDescriptor, SpeciesProfile, Strategy, TurnContext, ACTION_STAMINA_COST, BASE_MAX_HEALTH};

// Lion settings as constants
const LION_NAME: &str = "Lion";
const LION_GLYPH: char = 'L';
const LION_EMOJI: &str = "\u{1F981}";
const LION_CREATION_KEY: char = 'L';
const LION_SPEED: u32 = 8;
const LION_VISION: u32 = 4;
const LION_ENDURANCE: u32 = 2;
const LION_DEFENCE: u32 = 4;

const LION_ROUNDS_TO_DECOMPOSE: u32 = 15;
const LION_HEALTH_DECAY: f64 = 0.5;
const LION_TIRED_FRACTION: f64 = 0.7;
const LION_REPRODUCTION_RANGE: usize = 2;
const LION_MAX_AGE: f64 = 15.0;
const LION_BEARING_AGE: f64 = 3.0;
const LION_LITTER_PAUSE: f64 = 2.5;
const LION_HUNGRY_FRACTION: f64 = 0.5;

const REST_WEIGHT: u32 = 30;
const SLEEP_WEIGHT: u32 = 6;
const MOVE_WEIGHT: u32 = 54;
const ROAR_WEIGHT: u32 = 10;

const ROAR_COST_MULTIPLIER: f64 = 0.4;
const ATTACK_COST_MULTIPLIER: f64 = 0.2;
const ATTACK_DAMAGE_MULTIPLIER: f64 = 0.8;
const ATTACK_KILL_HEAL_FRACTION: f64 = 0.5;
const SCENT_COST_MULTIPLIER: f64 = 0.4;

const PREY_NAME: &str = "Antelope";

/// Builds the Lion descriptor for registration.
pub fn descriptor() -> SpeciesDescriptor {
    SpeciesDescriptor {
        profile: SpeciesProfile {
            name: LION_NAME.to_string(),
            key: LION_CREATION_KEY,
            glyph: LION_GLYPH,
            emoji: LION_EMOJI.to_string(),
            speed: LION_SPEED,
            vision: LION_VISION,
            endurance: LION_ENDURANCE,
            defence: LION_DEFENCE,
            rounds_to_decompose: LION_ROUNDS_TO_DECOMPOSE,
            health_decay: LION_HEALTH_DECAY,
            reproduction_range: LION_REPRODUCTION_RANGE,
            max_age: LION_MAX_AGE,
            bearing_age: LION_BEARING_AGE,
            litter_pause: LION_LITTER_PAUSE,
        },
        strategy: Box::new(LionStrategy),
    }
}

/// Lion decision policy.
pub struct LionStrategy;

impl LionStrategy {
    fn attack_action(ctx: &TurnContext, target: &AnimalView) -> Action {
        Action::Attack {
            target: target.entity,
            cost: -ACTION_STAMINA_COST * ATTACK_COST_MULTIPLIER,
            damage: BASE_MAX_HEALTH * ATTACK_DAMAGE_MULTIPLIER,
            heal_on_kill: ctx.vitals.max_health() * ATTACK_KILL_HEAL_FRACTION,
        }
    }

    /// Direction minimising the post-move distance to the nearest visible
    /// prey; plain random wandering when none was passed.
    fn decide_move_direction(
        view: &VisionGrid,
        self_local: Coord,
        prey: &[(Coord, AnimalView)],
        rng: &mut SmallRng,
    ) -> Option<Direction> {
        let mut directions = movement::valid_directions(view, self_local);
        if directions.is_empty() {
            return None;
        }
        if let Some((prey_coord, _)) = closest_target(prey, self_local, rng) {
            directions = movement::directions_toward(view, &directions, self_local, prey_coord);
        }
        movement::random_direction(&directions, rng)
    }
}

impl Strategy for LionStrategy {
    fn decide(
        &self,
        view: &mut VisionGrid,
        ctx: &TurnContext,
        rng: &mut SmallRng,
    ) -> Vec<WeightedAction> {
        view.clear(view.self_local);
        let self_local = view.self_local;
        let prey = view.living_named(PREY_NAME);
        let mut candidates = Vec::new();

        if !prey.is_empty() {
            // Two independent nearest-prey picks, as in the original: one to
            // test adjacency, one inside the pursuit direction choice.
            let nearest = closest_target(&prey, self_local, rng);
            match nearest {
                Some((coord, target)) if chebyshev(self_local, coord) == 1 => {
                    candidates.push(WeightedAction::new(Self::attack_action(ctx, &target), 0));
                }
                _ => {
                    let direction = Self::decide_move_direction(view, self_local, &prey, rng);
                    candidates.push(WeightedAction::new(Action::Move(direction), MOVE_WEIGHT));
                }
            }
        } else if ctx.vitals.stamina() < ctx.vitals.max_stamina() * LION_TIRED_FRACTION {
            candidates.push(WeightedAction::new(Action::Sleep, SLEEP_WEIGHT));
        } else if ctx.vitals.health() < ctx.vitals.max_health() * LION_HUNGRY_FRACTION {
            candidates.push(WeightedAction::new(
                Action::TrackScent {
                    cost: -ACTION_STAMINA_COST * SCENT_COST_MULTIPLIER,
                    prey: PREY_NAME.to_string(),
                },
                0,
            ));
        } else {
            if ctx.vitals.can_afford(-ACTION_STAMINA_COST) {
                let direction = Self::decide_move_direction(view, self_local, &[], rng);
                candidates.push(WeightedAction::new(Action::Move(direction), MOVE_WEIGHT));
            }
            if ctx.vitals.can_afford(-ACTION_STAMINA_COST * ROAR_COST_MULTIPLIER) {
                candidates.push(WeightedAction::new(
                    Action::Roar {
                        cost: -ACTION_STAMINA_COST * ROAR_COST_MULTIPLIER,
                    },
                    ROAR_WEIGHT,
                ));
            }
            candidates.push(WeightedAction::new(Action::Rest, REST_WEIGHT));
            candidates.push(WeightedAction::new(Action::Sleep, SLEEP_WEIGHT));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::entity::Entity;
    use rand::SeedableRng;

    use crate::components::animal::{AnimalId, Attributes, Vitals};

    fn context(health: f64, stamina: f64) -> TurnContext {
        let attributes = Attributes::from_profile(&descriptor().profile);
        TurnContext {
            vitals: Vitals::from_parts(health, stamina, attributes),
            attributes,
            global: Coord::new(2, 2),
        }
    }

    fn open_view() -> VisionGrid {
        VisionGrid::new(5, 5, Coord::new(0, 0), Coord::new(2, 2))
    }

    fn antelope_at(view: &mut VisionGrid, coord: Coord, index: u32) {
        view.set(
            coord,
            AnimalView::new(Entity::from_raw(index), AnimalId(u64::from(index)), "Antelope", true),
        );
    }

    #[test]
    fn test_attacks_adjacent_prey() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut view = open_view();
        antelope_at(&mut view, Coord::new(2, 3), 1);
        let ctx = context(100.0, 200.0);

        let candidates = LionStrategy.decide(&mut view, &ctx, &mut rng);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].weight, 0);
        let Action::Attack { cost, damage, heal_on_kill, .. } = candidates[0].action.clone() else {
            panic!("expected an attack, got {:?}", candidates[0].action);
        };
        assert_eq!(cost, -5.0);
        assert_eq!(damage, 20.0);
        assert_eq!(heal_on_kill, 50.0);
    }

    #[test]
    fn test_pursues_distant_prey() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut view = open_view();
        antelope_at(&mut view, Coord::new(0, 2), 1);
        let ctx = context(100.0, 200.0);

        let candidates = LionStrategy.decide(&mut view, &ctx, &mut rng);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].weight, MOVE_WEIGHT);
        let Action::Move(Some(direction)) = candidates[0].action.clone() else {
            panic!("expected a pursuit move, got {:?}", candidates[0].action);
        };
        let landed = view.target(Coord::new(2, 2), direction).unwrap();
        assert_eq!(chebyshev(landed, Coord::new(0, 2)), 1);
    }

    #[test]
    fn test_sleeps_when_tired_before_hunting_by_scent() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut view = open_view();
        // Hungry and tired at once: the tired check comes first.
        let ctx = context(10.0, 100.0);

        let candidates = LionStrategy.decide(&mut view, &ctx, &mut rng);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].action, Action::Sleep);
    }

    #[test]
    fn test_tracks_scent_when_hungry() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut view = open_view();
        // Below half health, stamina above the tired threshold.
        let ctx = context(40.0, 180.0);

        let candidates = LionStrategy.decide(&mut view, &ctx, &mut rng);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].weight, 0);
        assert!(matches!(candidates[0].action, Action::TrackScent { .. }));
    }

    #[test]
    fn test_default_candidate_set() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut view = open_view();
        let ctx = context(100.0, 200.0);

        let candidates = LionStrategy.decide(&mut view, &ctx, &mut rng);

        assert_eq!(candidates.len(), 4);
        assert!(matches!(candidates[0].action, Action::Move(Some(_))));
        assert!(matches!(candidates[1].action, Action::Roar { .. }));
        assert_eq!(candidates[2].action, Action::Rest);
        assert_eq!(candidates[3].action, Action::Sleep);
        let total: u32 = candidates.iter().map(|candidate| candidate.weight).sum();
        assert_eq!(total, MOVE_WEIGHT + ROAR_WEIGHT + REST_WEIGHT + SLEEP_WEIGHT);
    }
}
