use std::time::Duration;

use maze_chase_core::{Command, Event};
use maze_chase_system_clock::{Config, SimulationClock};
use maze_chase_world::{self as world, query, Level, Rules, World};

const LOOP: &str = "\
############
 P          
#.##########
#.......G..#
############";

fn build_world() -> World {
    World::new(Level::parse(LOOP).expect("valid layout"), Rules::default())
        .expect("valid rules")
}

fn pump(world: &mut World, clock: &mut SimulationClock, dt: Duration) -> Vec<Event> {
    let mut commands = Vec::new();
    clock.advance(dt, &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    clock.handle(&events);
    events
}

#[test]
fn one_second_drives_expected_moves() {
    let mut world = build_world();
    let mut clock = SimulationClock::new(Config::new(Duration::from_millis(10)));
    let events = pump(&mut world, &mut clock, Duration::from_secs(1));

    assert_eq!(query::tick_index(&world), 100);
    let player_moves = events
        .iter()
        .filter(|event| matches!(event, Event::PlayerMoved { .. }))
        .count();
    assert_eq!(player_moves, 12);
    assert_eq!(query::player(&world).cell.row(), 1);
}

#[test]
fn paused_clock_leaves_world_untouched() {
    let mut world = build_world();
    let mut clock = SimulationClock::new(Config::new(Duration::from_millis(10)));
    let _ = pump(&mut world, &mut clock, Duration::from_millis(250));

    let player = query::player(&world);
    let adversaries = query::adversary_view(&world).into_vec();
    let tick = query::tick_index(&world);

    clock.pause();
    let events = pump(&mut world, &mut clock, Duration::from_secs(3));
    assert!(events.is_empty());
    assert_eq!(query::player(&world), player);
    assert_eq!(query::adversary_view(&world).into_vec(), adversaries);
    assert_eq!(query::tick_index(&world), tick);

    clock.resume();
    let events = pump(&mut world, &mut clock, Duration::from_millis(10));
    assert_eq!(events.first(), Some(&Event::TimeAdvanced { tick: tick + 1 }));
}

#[test]
fn restarting_resets_cadence_to_level_zero() {
    let config = Config::new(Duration::from_millis(1)).with_speedup_per_level(3);
    let mut clock = SimulationClock::new(config);
    clock.handle(&[Event::LevelStarted { level: 1 }]);
    assert_eq!(clock.cadence().player, 5);

    let mut world = build_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::RestartSession, &mut events);
    clock.handle(&events);
    assert_eq!(clock.cadence().player, 8);
}
