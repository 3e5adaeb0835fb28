#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate simulation clock that turns elapsed wall time into world ticks.

use std::time::Duration;

use maze_chase_core::{Command, Event};

const DEFAULT_TICK_NANOS: u64 = 16_666_667;
const DEFAULT_PLAYER_PERIOD: u32 = 8;
const DEFAULT_ADVERSARY_PERIOD: u32 = 10;
const DEFAULT_PLAYER_FLOOR: u32 = 4;
const DEFAULT_ADVERSARY_FLOOR: u32 = 5;
const DEFAULT_SPEEDUP_PER_LEVEL: u32 = 1;

/// Configuration parameters required to construct the simulation clock.
///
/// Periods are expressed in ticks: an actor with period `n` moves on every
/// `n`-th tick. Each level shortens both periods by the speed-up, never below
/// their floors. A floor above the configured period leaves that period as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    tick: Duration,
    player_period: u32,
    adversary_period: u32,
    player_floor: u32,
    adversary_floor: u32,
    speedup_per_level: u32,
}

impl Config {
    /// Creates a configuration with the provided tick length and default cadences.
    #[must_use]
    pub const fn new(tick: Duration) -> Self {
        Self {
            tick,
            player_period: DEFAULT_PLAYER_PERIOD,
            adversary_period: DEFAULT_ADVERSARY_PERIOD,
            player_floor: DEFAULT_PLAYER_FLOOR,
            adversary_floor: DEFAULT_ADVERSARY_FLOOR,
            speedup_per_level: DEFAULT_SPEEDUP_PER_LEVEL,
        }
    }

    /// Overrides the level-zero movement periods of the player and adversaries.
    #[must_use]
    pub const fn with_periods(mut self, player: u32, adversary: u32) -> Self {
        self.player_period = player;
        self.adversary_period = adversary;
        self
    }

    /// Overrides the shortest periods reachable through level speed-up.
    #[must_use]
    pub const fn with_floors(mut self, player: u32, adversary: u32) -> Self {
        self.player_floor = player;
        self.adversary_floor = adversary;
        self
    }

    /// Overrides how many ticks each level removes from both periods.
    #[must_use]
    pub const fn with_speedup_per_level(mut self, speedup: u32) -> Self {
        self.speedup_per_level = speedup;
        self
    }

    fn period_for(&self, base: u32, floor: u32, level: u32) -> u32 {
        base.saturating_sub(level.saturating_mul(self.speedup_per_level))
            .max(floor.min(base))
            .max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_nanos(DEFAULT_TICK_NANOS))
    }
}

/// Movement cadence currently applied to each actor class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    /// Ticks between player moves.
    pub player: u32,
    /// Ticks between adversary moves.
    pub adversaries: u32,
}

/// Clock that accumulates elapsed time and emits one tick command per step.
#[derive(Debug)]
pub struct SimulationClock {
    config: Config,
    accumulator: Duration,
    cadence: Cadence,
    player_phase: u32,
    adversary_phase: u32,
    paused: bool,
}

impl SimulationClock {
    /// Creates a running clock using the level-zero cadence.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            cadence: cadence_for(&config, 0),
            player_phase: 0,
            adversary_phase: 0,
            paused: false,
        }
    }

    /// Consumes world events, adopting the cadence of each newly started level.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::LevelStarted { level } = event {
                self.cadence = cadence_for(&self.config, *level);
                self.player_phase = 0;
                self.adversary_phase = 0;
                tracing::debug!(
                    level,
                    player = self.cadence.player,
                    adversaries = self.cadence.adversaries,
                    "cadence updated"
                );
            }
        }
    }

    /// Accumulates `dt` and emits a tick command for every elapsed step.
    ///
    /// Time reported while paused is discarded.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.paused || self.config.tick.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.config.tick {
            self.accumulator -= self.config.tick;
            out.push(self.step());
        }
    }

    /// Emits exactly one tick command regardless of accumulated time.
    pub fn step(&mut self) -> Command {
        self.player_phase += 1;
        self.adversary_phase += 1;
        let move_player = self.player_phase >= self.cadence.player;
        let move_adversaries = self.adversary_phase >= self.cadence.adversaries;
        if move_player {
            self.player_phase = 0;
        }
        if move_adversaries {
            self.adversary_phase = 0;
        }
        Command::Tick {
            move_player,
            move_adversaries,
        }
    }

    /// Stops emitting ticks. Calling it on a paused clock has no effect.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes emitting ticks. Calling it on a running clock has no effect.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether the clock is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Cadence applied to the level being played.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn cadence_for(config: &Config, level: u32) -> Cadence {
    Cadence {
        player: config.period_for(config.player_period, config.player_floor, level),
        adversaries: config.period_for(config.adversary_period, config.adversary_floor, level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(commands: &[Command]) -> Vec<(bool, bool)> {
        commands
            .iter()
            .map(|command| match command {
                Command::Tick {
                    move_player,
                    move_adversaries,
                } => (*move_player, *move_adversaries),
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn emits_one_tick_per_elapsed_step() {
        let mut clock = SimulationClock::new(Config::new(Duration::from_millis(10)));
        let mut commands = Vec::new();
        clock.advance(Duration::from_millis(35), &mut commands);
        assert_eq!(commands.len(), 3);
        clock.advance(Duration::from_millis(5), &mut commands);
        assert_eq!(commands.len(), 4);
    }

    #[test]
    fn actors_move_on_their_own_cadence() {
        let config = Config::new(Duration::from_millis(1)).with_periods(2, 3);
        let mut clock = SimulationClock::new(config);
        let mut commands = Vec::new();
        clock.advance(Duration::from_millis(6), &mut commands);
        assert_eq!(
            ticks(&commands),
            vec![
                (false, false),
                (true, false),
                (false, true),
                (true, false),
                (false, false),
                (true, true),
            ]
        );
    }

    #[test]
    fn later_levels_speed_up_until_the_floor() {
        let config = Config::new(Duration::from_millis(1))
            .with_periods(8, 10)
            .with_floors(4, 5)
            .with_speedup_per_level(2);
        let mut clock = SimulationClock::new(config);
        assert_eq!(
            clock.cadence(),
            Cadence {
                player: 8,
                adversaries: 10
            }
        );

        clock.handle(&[Event::LevelStarted { level: 1 }]);
        assert_eq!(
            clock.cadence(),
            Cadence {
                player: 6,
                adversaries: 8
            }
        );

        clock.handle(&[Event::LevelStarted { level: 40 }]);
        assert_eq!(
            clock.cadence(),
            Cadence {
                player: 4,
                adversaries: 5
            }
        );

        clock.handle(&[Event::LevelStarted { level: 0 }]);
        assert_eq!(clock.cadence().player, 8);
    }

    #[test]
    fn periods_below_the_floor_are_kept() {
        let config = Config::new(Duration::from_millis(1)).with_periods(2, 3);
        let mut clock = SimulationClock::new(config);
        assert_eq!(
            clock.cadence(),
            Cadence {
                player: 2,
                adversaries: 3
            }
        );

        clock.handle(&[Event::LevelStarted { level: 5 }]);
        assert_eq!(
            clock.cadence(),
            Cadence {
                player: 2,
                adversaries: 3
            }
        );
    }

    #[test]
    fn periods_never_drop_below_one_tick() {
        let config = Config::new(Duration::from_millis(1))
            .with_periods(0, 0)
            .with_floors(0, 0);
        let mut clock = SimulationClock::new(config);
        let mut commands = Vec::new();
        clock.advance(Duration::from_millis(2), &mut commands);
        assert_eq!(ticks(&commands), vec![(true, true), (true, true)]);
    }

    #[test]
    fn pause_is_idempotent_and_discards_time() {
        let mut clock = SimulationClock::new(Config::new(Duration::from_millis(10)));
        let mut commands = Vec::new();
        clock.advance(Duration::from_millis(7), &mut commands);
        assert!(commands.is_empty());

        clock.pause();
        clock.pause();
        assert!(clock.is_paused());
        clock.advance(Duration::from_secs(5), &mut commands);
        assert!(commands.is_empty());

        clock.resume();
        clock.resume();
        assert!(!clock.is_paused());
        clock.advance(Duration::from_millis(3), &mut commands);
        assert_eq!(commands.len(), 1, "accumulated progress survives a pause");
    }

    #[test]
    fn zero_length_tick_emits_nothing() {
        let mut clock = SimulationClock::new(Config::new(Duration::ZERO));
        let mut commands = Vec::new();
        clock.advance(Duration::from_secs(1), &mut commands);
        assert!(commands.is_empty());
        assert!(matches!(clock.step(), Command::Tick { .. }));
    }
}
