//! Action Execution
//!
//! Applies a selected action to the world. Every action that spends stamina
//! re-validates affordability here, at the moment of execution; an
//! unaffordable action silently degrades to Rest. This is the engine's only
//! recovery path for under-resourced animals and is never surfaced as an
//! error.

use bevy_ecs::prelude::*;

use savanna_events::{death_causes, EventKind};

use crate::components::animal::{AnimalId, Attributes, Lifecycle, Vitals};
use crate::components::grid::{Coord, Grid};
use crate::movement::{self, Direction};
use crate::perception;
use crate::species::{closest_target, ACTION_STAMINA_COST, SLEEP_RECOVERY_FRACTION};
use crate::systems::record_event;
use crate::SimRng;

use super::Action;

/// Applies one action for the animal at `coord`.
pub fn execute(world: &mut World, entity: Entity, coord: Coord, action: Action) {
    match action {
        Action::Move(direction) => execute_move(world, entity, coord, direction),
        Action::Attack {
            target,
            cost,
            damage,
            heal_on_kill,
        } => execute_attack(world, entity, coord, target, cost, damage, heal_on_kill),
        Action::TrackScent { cost, prey } => execute_track_scent(world, entity, coord, cost, &prey),
        Action::Graze { cost, healing } => execute_graze(world, entity, cost, healing),
        Action::Roar { cost } => execute_roar(world, entity, cost),
        Action::Rest => rest(world, entity),
        Action::Sleep => sleep(world, entity),
    }
}

/// The universal fallback: recover a little stamina.
fn rest(world: &mut World, entity: Entity) {
    let Some(attributes) = world.get::<Attributes>(entity).copied() else {
        return;
    };
    if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
        vitals.change_stamina(attributes.rest_recovery());
    }
}

fn sleep(world: &mut World, entity: Entity) {
    if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
        let recovery = vitals.max_stamina() * SLEEP_RECOVERY_FRACTION;
        vitals.change_stamina(recovery);
    }
}

fn execute_move(world: &mut World, entity: Entity, coord: Coord, direction: Option<Direction>) {
    let affordable = world
        .get::<Vitals>(entity)
        .map_or(false, |vitals| vitals.can_afford(-ACTION_STAMINA_COST));
    match direction {
        Some(direction) if affordable => {
            if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
                vitals.change_stamina(-ACTION_STAMINA_COST);
            }
            world.resource_mut::<Grid>().step(coord, direction);
        }
        _ => rest(world, entity),
    }
}

fn execute_attack(
    world: &mut World,
    entity: Entity,
    coord: Coord,
    target: Entity,
    cost: f64,
    damage: f64,
    heal_on_kill: f64,
) {
    let affordable = world
        .get::<Vitals>(entity)
        .map_or(false, |vitals| vitals.can_afford(cost));
    if !affordable {
        rest(world, entity);
        return;
    }
    if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
        vitals.change_stamina(cost);
    }
    let killed = match world.get_mut::<Vitals>(target) {
        Some(mut target_vitals) => {
            target_vitals.damage(damage);
            target_vitals.is_drained()
        }
        None => return,
    };
    let target_id = world.get::<AnimalId>(target).map(|id| id.0);
    record_event(world, EventKind::Attack, entity, coord, target_id, None);
    if killed {
        if let Some(mut lifecycle) = world.get_mut::<Lifecycle>(target) {
            lifecycle.kill();
        }
        let target_coord = find_adjacent(world, coord, target).unwrap_or(coord);
        record_event(
            world,
            EventKind::Death,
            target,
            target_coord,
            None,
            Some(death_causes::KILLED),
        );
        if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
            vitals.heal(heal_on_kill);
        }
    }
}

/// Locates an entity in the 8 cells around `coord`. Attack targets are
/// always adjacent when the strike lands.
fn find_adjacent(world: &World, coord: Coord, entity: Entity) -> Option<Coord> {
    let grid = world.resource::<Grid>();
    Direction::ALL
        .iter()
        .filter_map(|&direction| grid.target(coord, direction))
        .find(|&candidate| grid.get(candidate) == Some(entity))
}

fn execute_track_scent(world: &mut World, entity: Entity, coord: Coord, cost: f64, prey: &str) {
    // The scent move pays both the tracking cost and the move itself.
    let affordable = world
        .get::<Vitals>(entity)
        .map_or(false, |vitals| vitals.can_afford(cost - ACTION_STAMINA_COST));
    if !affordable {
        rest(world, entity);
        return;
    }
    if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
        vitals.change_stamina(cost);
    }
    let view = perception::full_window(world, coord);
    let prey_positions = view.living_named(prey);
    let direction = {
        let mut rng = world.resource_mut::<SimRng>();
        let mut directions = movement::valid_directions(&view, view.self_local);
        if directions.is_empty() {
            None
        } else {
            if let Some((prey_coord, _)) = closest_target(&prey_positions, view.self_local, &mut rng.0) {
                directions =
                    movement::directions_toward(&view, &directions, view.self_local, prey_coord);
            }
            movement::random_direction(&directions, &mut rng.0)
        }
    };
    execute_move(world, entity, coord, direction);
}

fn execute_graze(world: &mut World, entity: Entity, cost: f64, healing: f64) {
    let affordable = world
        .get::<Vitals>(entity)
        .map_or(false, |vitals| vitals.can_afford(cost));
    if !affordable {
        rest(world, entity);
        return;
    }
    if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
        vitals.change_stamina(cost);
        vitals.heal(healing);
    }
}

fn execute_roar(world: &mut World, entity: Entity, cost: f64) {
    let affordable = world
        .get::<Vitals>(entity)
        .map_or(false, |vitals| vitals.can_afford(cost));
    if !affordable {
        rest(world, entity);
        return;
    }
    if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
        vitals.change_stamina(cost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::grid::Coord;
    use crate::setup;
    use crate::species::SpeciesRegistry;

    fn spawn(world: &mut World, key: char, coord: Coord) -> Entity {
        let species = world.resource::<SpeciesRegistry>().get(key).unwrap();
        setup::spawn_animal(world, species, coord).unwrap()
    }

    #[test]
    fn test_move_spends_stamina_and_relocates() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        let before = world.get::<Vitals>(entity).unwrap().stamina();

        execute(&mut world, entity, Coord::new(5, 5), Action::Move(Some(Direction::East)));

        let grid = world.resource::<Grid>();
        assert_eq!(grid.get(Coord::new(5, 6)), Some(entity));
        assert_eq!(grid.get(Coord::new(5, 5)), None);
        let after = world.get::<Vitals>(entity).unwrap().stamina();
        assert_eq!(after, before - ACTION_STAMINA_COST);
    }

    #[test]
    fn test_unaffordable_move_falls_back_to_rest() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        let attributes = *world.get::<Attributes>(entity).unwrap();
        {
            let mut vitals = world.get_mut::<Vitals>(entity).unwrap();
            let drain = -vitals.stamina();
            vitals.change_stamina(drain);
        }

        execute(&mut world, entity, Coord::new(5, 5), Action::Move(Some(Direction::East)));

        assert_eq!(world.resource::<Grid>().get(Coord::new(5, 5)), Some(entity));
        let stamina = world.get::<Vitals>(entity).unwrap().stamina();
        assert_eq!(stamina, attributes.rest_recovery());
    }

    #[test]
    fn test_directionless_move_rests() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        {
            let mut vitals = world.get_mut::<Vitals>(entity).unwrap();
            vitals.change_stamina(-30.0);
        }
        let before = world.get::<Vitals>(entity).unwrap().stamina();

        execute(&mut world, entity, Coord::new(5, 5), Action::Move(None));

        let attributes = *world.get::<Attributes>(entity).unwrap();
        let after = world.get::<Vitals>(entity).unwrap().stamina();
        assert_eq!(after, before + attributes.rest_recovery());
    }

    #[test]
    fn test_attack_damages_and_kill_heals() {
        let mut world = setup::empty_world(10, 10, 1);
        let lion = spawn(&mut world, 'L', Coord::new(5, 5));
        let prey = spawn(&mut world, 'A', Coord::new(5, 6));
        {
            // Wound both: the prey dies to one hit, the lion has room to heal.
            let mut prey_vitals = world.get_mut::<Vitals>(prey).unwrap();
            prey_vitals.damage(45.0);
            let mut lion_vitals = world.get_mut::<Vitals>(lion).unwrap();
            lion_vitals.damage(60.0);
        }

        execute(
            &mut world,
            lion,
            Coord::new(5, 5),
            Action::Attack {
                target: prey,
                cost: -5.0,
                damage: 20.0,
                heal_on_kill: 50.0,
            },
        );

        assert!(!world.get::<Lifecycle>(prey).unwrap().is_alive());
        assert_eq!(world.get::<Vitals>(prey).unwrap().health(), 0.0);
        // 100 - 60 + 50 = 90
        assert_eq!(world.get::<Vitals>(lion).unwrap().health(), 90.0);
        // The carcass stays on the grid until decomposed.
        assert_eq!(world.resource::<Grid>().get(Coord::new(5, 6)), Some(prey));
    }

    #[test]
    fn test_attack_on_survivor_does_not_heal() {
        let mut world = setup::empty_world(10, 10, 1);
        let lion = spawn(&mut world, 'L', Coord::new(5, 5));
        let prey = spawn(&mut world, 'A', Coord::new(5, 6));
        {
            let mut lion_vitals = world.get_mut::<Vitals>(lion).unwrap();
            lion_vitals.damage(60.0);
        }

        execute(
            &mut world,
            lion,
            Coord::new(5, 5),
            Action::Attack {
                target: prey,
                cost: -5.0,
                damage: 20.0,
                heal_on_kill: 50.0,
            },
        );

        assert!(world.get::<Lifecycle>(prey).unwrap().is_alive());
        assert_eq!(world.get::<Vitals>(prey).unwrap().health(), 30.0);
        assert_eq!(world.get::<Vitals>(lion).unwrap().health(), 40.0);
    }

    #[test]
    fn test_graze_heals_and_spends() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        {
            let mut vitals = world.get_mut::<Vitals>(entity).unwrap();
            vitals.damage(20.0);
        }

        execute(
            &mut world,
            entity,
            Coord::new(5, 5),
            Action::Graze {
                cost: -5.0,
                healing: 5.0,
            },
        );

        let vitals = world.get::<Vitals>(entity).unwrap();
        assert_eq!(vitals.health(), 35.0);
        assert_eq!(vitals.stamina(), 70.0);
    }

    #[test]
    fn test_sleep_restores_most_stamina() {
        let mut world = setup::empty_world(10, 10, 1);
        let entity = spawn(&mut world, 'A', Coord::new(5, 5));
        {
            let mut vitals = world.get_mut::<Vitals>(entity).unwrap();
            let drain = -vitals.stamina();
            vitals.change_stamina(drain);
        }

        execute(&mut world, entity, Coord::new(5, 5), Action::Sleep);

        // 0 + 75 * 0.75, clamped well below the max of 75.
        let vitals = world.get::<Vitals>(entity).unwrap();
        assert_eq!(vitals.stamina(), vitals.max_stamina() * SLEEP_RECOVERY_FRACTION);
    }
}
