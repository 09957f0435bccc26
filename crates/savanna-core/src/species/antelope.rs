//! Antelope
//!
//! Built-in prey species. Flees the nearest visible lion, grazes when
//! hungry, sleeps when tired, otherwise picks among wandering, grazing and
//! recovery by weight.

use rand::rngs::SmallRng;

use crate::components::grid::Coord;
use crate::movement::{self, Direction};
use crate::perception::{AnimalView, VisionGrid};
use crate::systems::action::{Action, WeightedAction};

use super::{closest_target, SpeciesDescriptor, SpeciesProfile, Strategy, TurnContext, ACTION_STAMINA_COST};

// Antelope settings as constants
const ANTELOPE_NAME: &str = "Antelope";
const ANTELOPE_GLYPH: char = 'A';
const ANTELOPE_EMOJI: &str = "\u{1F98C}";
const ANTELOPE_CREATION_KEY: char = 'A';
const ANTELOPE_SPEED: u32 = 3;
const ANTELOPE_VISION: u32 = 5;
const ANTELOPE_ENDURANCE: u32 = 8;
const ANTELOPE_DEFENCE: u32 = 2;

const ANTELOPE_ROUNDS_TO_DECOMPOSE: u32 = 10;
const ANTELOPE_HEALTH_DECAY: f64 = 0.5;
const ANTELOPE_TIRED_FRACTION: f64 = 0.4;
const ANTELOPE_REPRODUCTION_RANGE: usize = 2;
const ANTELOPE_MAX_AGE: f64 = 18.0;
const ANTELOPE_BEARING_AGE: f64 = 2.0;
const ANTELOPE_LITTER_PAUSE: f64 = 1.5;
const ANTELOPE_HUNGRY_FRACTION: f64 = 0.1;

const REST_WEIGHT: u32 = 25;
const SLEEP_WEIGHT: u32 = 5;
const MOVE_WEIGHT: u32 = 35;
const GRAZE_WEIGHT: u32 = 35;

const GRAZE_COST_MULTIPLIER: f64 = 0.2;
const GRAZE_HEAL_FRACTION: f64 = 0.1;

const PREDATOR_NAME: &str = "Lion";

/// Builds the Antelope descriptor for registration.
pub fn descriptor() -> SpeciesDescriptor {
    SpeciesDescriptor {
        profile: SpeciesProfile {
            name: ANTELOPE_NAME.to_string(),
            key: ANTELOPE_CREATION_KEY,
            glyph: ANTELOPE_GLYPH,
            emoji: ANTELOPE_EMOJI.to_string(),
            speed: ANTELOPE_SPEED,
            vision: ANTELOPE_VISION,
            endurance: ANTELOPE_ENDURANCE,
            defence: ANTELOPE_DEFENCE,
            rounds_to_decompose: ANTELOPE_ROUNDS_TO_DECOMPOSE,
            health_decay: ANTELOPE_HEALTH_DECAY,
            reproduction_range: ANTELOPE_REPRODUCTION_RANGE,
            max_age: ANTELOPE_MAX_AGE,
            bearing_age: ANTELOPE_BEARING_AGE,
            litter_pause: ANTELOPE_LITTER_PAUSE,
        },
        strategy: Box::new(AntelopeStrategy),
    }
}

/// Antelope decision policy.
pub struct AntelopeStrategy;

impl AntelopeStrategy {
    fn graze_action(ctx: &TurnContext) -> Action {
        Action::Graze {
            cost: -ACTION_STAMINA_COST * GRAZE_COST_MULTIPLIER,
            healing: ctx.vitals.max_health() * GRAZE_HEAL_FRACTION,
        }
    }

    /// Direction maximising the post-move distance from the nearest visible
    /// predator; plain random wandering when none was passed.
    fn decide_move_direction(
        view: &VisionGrid,
        self_local: Coord,
        threats: &[(Coord, AnimalView)],
        rng: &mut SmallRng,
    ) -> Option<Direction> {
        let mut directions = movement::valid_directions(view, self_local);
        if directions.is_empty() {
            return None;
        }
        if let Some((threat_coord, _)) = closest_target(threats, self_local, rng) {
            directions = movement::directions_away(view, &directions, self_local, threat_coord);
        }
        movement::random_direction(&directions, rng)
    }
}

impl Strategy for AntelopeStrategy {
    fn decide(
        &self,
        view: &mut VisionGrid,
        ctx: &TurnContext,
        rng: &mut SmallRng,
    ) -> Vec<WeightedAction> {
        view.clear(view.self_local);
        let self_local = view.self_local;
        let predators = view.living_named(PREDATOR_NAME);
        let mut candidates = Vec::new();

        if !predators.is_empty() {
            let direction = Self::decide_move_direction(view, self_local, &predators, rng);
            candidates.push(WeightedAction::new(Action::Move(direction), MOVE_WEIGHT));
        } else if ctx.vitals.health() < ctx.vitals.max_health() * ANTELOPE_HUNGRY_FRACTION {
            candidates.push(WeightedAction::new(Self::graze_action(ctx), GRAZE_WEIGHT));
        } else if ctx.vitals.stamina() < ctx.vitals.max_stamina() * ANTELOPE_TIRED_FRACTION {
            candidates.push(WeightedAction::new(Action::Sleep, SLEEP_WEIGHT));
        } else {
            if ctx.vitals.can_afford(-ACTION_STAMINA_COST) {
                let direction = Self::decide_move_direction(view, self_local, &[], rng);
                candidates.push(WeightedAction::new(Action::Move(direction), MOVE_WEIGHT));
            }
            if ctx.vitals.can_afford(-ACTION_STAMINA_COST * GRAZE_COST_MULTIPLIER) {
                candidates.push(WeightedAction::new(Self::graze_action(ctx), GRAZE_WEIGHT));
            }
            candidates.push(WeightedAction::new(Action::Rest, REST_WEIGHT));
            candidates.push(WeightedAction::new(Action::Sleep, SLEEP_WEIGHT));
        }
        candidates
    }
}
