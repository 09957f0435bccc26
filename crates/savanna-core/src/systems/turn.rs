//! Round Engine
//!
//! Advances the world one round: shuffles the round-start list of occupied
//! coordinates, then processes each animal strictly in that order. An animal
//! processed later in the round observes the already-mutated grid. A panic
//! inside one animal's turn removes that animal and the round continues; this
//! is the engine's only fault-isolation boundary.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use savanna_events::{death_causes, removal_reasons, EventKind};

use crate::components::animal::{Attributes, Lifecycle, Species, Vitals};
use crate::components::grid::{Coord, Grid};
use crate::components::world::WorldState;
use crate::perception;
use crate::species::{SpeciesDescriptor, TurnContext, TIME_PER_ROUND};
use crate::systems::{action, mating, record_event};
use crate::SimRng;

/// Makes one whole turn for the world.
pub fn run_round(world: &mut World) {
    let mut coords = world.resource::<Grid>().occupied();
    {
        let mut rng = world.resource_mut::<SimRng>();
        coords.shuffle(&mut rng.0);
    }
    for coord in coords {
        // The occupant may have moved away or been removed earlier this
        // round; the cell is looked up again at processing time.
        let Some(entity) = world.resource::<Grid>().get(coord) else {
            continue;
        };
        if is_decomposed(world, entity) {
            record_event(
                world,
                EventKind::Removal,
                entity,
                coord,
                None,
                Some(removal_reasons::DECOMPOSED),
            );
            remove_animal(world, entity, coord);
            continue;
        }
        let outcome = catch_unwind(AssertUnwindSafe(|| take_turn(world, entity, coord)));
        if outcome.is_err() {
            tracing::warn!(
                row = coord.row,
                column = coord.col,
                "animal crashed during its turn and will be removed"
            );
            record_event(
                world,
                EventKind::Removal,
                entity,
                coord,
                None,
                Some(removal_reasons::CRASHED),
            );
            remove_animal(world, entity, coord);
        }
    }
    world.resource_mut::<WorldState>().advance_round();
}

/// One animal's turn: aging and decay, then perception, mating and the
/// species' action decision.
fn take_turn(world: &mut World, entity: Entity, coord: Coord) {
    let Some(species) = world.get::<Species>(entity).map(|species| species.0.clone()) else {
        return;
    };
    if !per_round_update(world, entity, coord, &species) {
        return;
    }
    let Some(attributes) = world.get::<Attributes>(entity).copied() else {
        return;
    };
    let mut view = perception::visible_window(world, coord, attributes.vision as usize);
    mating::run_mating(world, &mut view, entity, coord, &species);

    let Some(vitals) = world.get::<Vitals>(entity).cloned() else {
        return;
    };
    let ctx = TurnContext {
        vitals,
        attributes,
        global: coord,
    };
    let selected = {
        let mut rng = world.resource_mut::<SimRng>();
        let candidates = species.strategy.decide(&mut view, &ctx, &mut rng.0);
        action::choose_weighted(&candidates, &mut rng.0)
    };
    if let Some(selected) = selected {
        action::execute(world, entity, coord, selected);
    }
}

/// Unconditional per-round aging and decay. Returns whether the animal is
/// still alive afterwards; a dead animal only advances its decomposition
/// counter.
fn per_round_update(
    world: &mut World,
    entity: Entity,
    coord: Coord,
    species: &Arc<SpeciesDescriptor>,
) -> bool {
    let alive = world
        .get::<Lifecycle>(entity)
        .map_or(false, |lifecycle| lifecycle.is_alive());
    if !alive {
        if let Some(mut lifecycle) = world.get_mut::<Lifecycle>(entity) {
            lifecycle.rounds_dead += 1;
        }
        return false;
    }
    let too_old = {
        let Some(mut lifecycle) = world.get_mut::<Lifecycle>(entity) else {
            return false;
        };
        lifecycle.age += TIME_PER_ROUND;
        lifecycle.time_since_litter += TIME_PER_ROUND;
        lifecycle.age > species.profile.max_age
    };
    let starved = {
        let Some(mut vitals) = world.get_mut::<Vitals>(entity) else {
            return false;
        };
        vitals.damage(species.profile.health_decay);
        vitals.is_drained()
    };
    if starved || too_old {
        if let Some(mut lifecycle) = world.get_mut::<Lifecycle>(entity) {
            lifecycle.kill();
        }
        let cause = if starved {
            death_causes::STARVED
        } else {
            death_causes::OLD_AGE
        };
        record_event(world, EventKind::Death, entity, coord, None, Some(cause));
        return false;
    }
    true
}

fn is_decomposed(world: &World, entity: Entity) -> bool {
    match (world.get::<Lifecycle>(entity), world.get::<Species>(entity)) {
        (Some(lifecycle), Some(species)) => {
            !lifecycle.is_alive()
                && lifecycle.rounds_dead >= species.0.profile.rounds_to_decompose
        }
        _ => false,
    }
}

/// Takes an animal off the grid and out of the world. The grid cell is
/// resolved again in case the animal moved before faulting.
fn remove_animal(world: &mut World, entity: Entity, coord: Coord) {
    {
        let mut grid = world.resource_mut::<Grid>();
        if grid.get(coord) == Some(entity) {
            grid.clear(coord);
        } else if let Some(actual) = grid.position_of(entity) {
            grid.clear(actual);
        }
    }
    world.despawn(entity);
    let mut state = world.resource_mut::<WorldState>();
    state.animals = state.animals.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    use crate::events::RoundEvents;
    use crate::perception::VisionGrid;
    use crate::setup;
    use crate::species::{SpeciesProfile, SpeciesRegistry, Strategy};
    use crate::systems::action::WeightedAction;

    struct PanickingStrategy;

    impl Strategy for PanickingStrategy {
        fn decide(
            &self,
            _view: &mut VisionGrid,
            _ctx: &TurnContext,
            _rng: &mut SmallRng,
        ) -> Vec<WeightedAction> {
            panic!("faulty external species")
        }
    }

    fn faulty_descriptor() -> SpeciesDescriptor {
        SpeciesDescriptor {
            profile: SpeciesProfile {
                name: "Glitch".to_string(),
                key: 'G',
                glyph: 'G',
                emoji: "?".to_string(),
                speed: 2,
                vision: 3,
                endurance: 2,
                defence: 2,
                rounds_to_decompose: 5,
                health_decay: 0.5,
                reproduction_range: 2,
                max_age: 10.0,
                bearing_age: 1.0,
                litter_pause: 1.0,
            },
            strategy: Box::new(PanickingStrategy),
        }
    }

    fn spawn(world: &mut World, key: char, coord: Coord) -> Entity {
        let species = world.resource::<SpeciesRegistry>().get(key).unwrap();
        setup::spawn_animal(world, species, coord).unwrap()
    }

    #[test]
    fn test_empty_world_rounds_only_advance_counter() {
        let mut world = setup::empty_world(10, 10, 1);

        for _ in 0..7 {
            run_round(&mut world);
        }

        assert_eq!(world.resource::<WorldState>().round, 7);
        assert_eq!(world.resource::<WorldState>().animals, 0);
    }

    #[test]
    fn test_round_ages_and_decays_animals() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        let full_health = world.get::<Vitals>(entity).unwrap().max_health();
        {
            // Exhausted but healthy: the round's action is a sleep, which
            // leaves health untouched.
            let mut vitals = world.get_mut::<Vitals>(entity).unwrap();
            let drain = -vitals.stamina();
            vitals.change_stamina(drain);
        }

        run_round(&mut world);

        let lifecycle = world.get::<Lifecycle>(entity).unwrap();
        assert_eq!(lifecycle.age, TIME_PER_ROUND);
        assert_eq!(lifecycle.time_since_litter, TIME_PER_ROUND);
        let vitals = world.get::<Vitals>(entity).unwrap();
        assert_eq!(vitals.health(), full_health - 0.5);
    }

    #[test]
    fn test_dead_animal_only_counts_decomposition_rounds() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        world.get_mut::<Lifecycle>(entity).unwrap().kill();
        let stamina_before = world.get::<Vitals>(entity).unwrap().stamina();

        run_round(&mut world);
        run_round(&mut world);

        let lifecycle = world.get::<Lifecycle>(entity).unwrap();
        assert!(!lifecycle.is_alive());
        assert_eq!(lifecycle.rounds_dead, 2);
        // A dead animal takes no action.
        assert_eq!(world.get::<Vitals>(entity).unwrap().stamina(), stamina_before);
        assert_eq!(world.resource::<Grid>().get(Coord::new(5, 5)), Some(entity));
    }

    #[test]
    fn test_decomposed_animal_is_removed_once() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        {
            let mut lifecycle = world.get_mut::<Lifecycle>(entity).unwrap();
            lifecycle.kill();
            // Antelope decomposes after 10 rounds dead.
            lifecycle.rounds_dead = 10;
        }

        run_round(&mut world);

        assert_eq!(world.resource::<Grid>().occupied_count(), 0);
        assert_eq!(world.resource::<WorldState>().animals, 0);
        assert!(world.get::<Lifecycle>(entity).is_none());
        let events = world.resource::<RoundEvents>();
        assert!(events
            .events()
            .iter()
            .any(|event| event.kind == savanna_events::EventKind::Removal
                && event.detail.as_deref() == Some(removal_reasons::DECOMPOSED)));
    }

    #[test]
    fn test_not_yet_decomposed_corpse_stays() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        {
            let mut lifecycle = world.get_mut::<Lifecycle>(entity).unwrap();
            lifecycle.kill();
            lifecycle.rounds_dead = 4;
        }

        run_round(&mut world);

        assert_eq!(world.resource::<Grid>().occupied_count(), 1);
        assert_eq!(world.get::<Lifecycle>(entity).unwrap().rounds_dead, 5);
    }

    #[test]
    fn test_starvation_kills_and_reports_cause() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        {
            let mut vitals = world.get_mut::<Vitals>(entity).unwrap();
            let almost_all = vitals.health() - 0.25;
            vitals.damage(almost_all);
        }

        run_round(&mut world);

        assert!(!world.get::<Lifecycle>(entity).unwrap().is_alive());
        let events = world.resource::<RoundEvents>();
        assert!(events
            .events()
            .iter()
            .any(|event| event.kind == savanna_events::EventKind::Death
                && event.detail.as_deref() == Some(death_causes::STARVED)));
    }

    #[test]
    fn test_old_age_kills() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        // Antelope max age is 18.
        world.get_mut::<Lifecycle>(entity).unwrap().age = 18.0;

        run_round(&mut world);

        assert!(!world.get::<Lifecycle>(entity).unwrap().is_alive());
    }

    #[test]
    fn test_no_resurrection_across_rounds() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        world.get_mut::<Lifecycle>(entity).unwrap().kill();

        for _ in 0..5 {
            run_round(&mut world);
            if let Some(lifecycle) = world.get::<Lifecycle>(entity) {
                assert!(!lifecycle.is_alive());
            }
        }
    }

    #[test]
    fn test_faulty_species_is_removed_and_round_continues() {
        let mut world = setup::empty_world(10, 10, 1);
        world
            .resource_mut::<SpeciesRegistry>()
            .register(faulty_descriptor())
            .unwrap();
        let faulty = spawn(&mut world, 'G', Coord::new(0, 0));
        let bystander = spawn(&mut world, 'A', Coord::new(9, 9));

        run_round(&mut world);

        assert!(world.get::<Lifecycle>(faulty).is_none());
        assert!(world.get::<Lifecycle>(bystander).is_some());
        assert_eq!(world.resource::<WorldState>().round, 1);
        assert_eq!(world.resource::<WorldState>().animals, 1);
        let events = world.resource::<RoundEvents>();
        assert!(events
            .events()
            .iter()
            .any(|event| event.detail.as_deref() == Some(removal_reasons::CRASHED)));
    }
}
