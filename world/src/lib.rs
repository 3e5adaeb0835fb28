#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Chase.
//!
//! The [`World`] owns the maze, the player, every adversary and the session
//! scoreboard. It is only ever mutated through [`apply`], which executes one
//! command synchronously and reports the outcome as events.

mod actors;
mod grid;
mod level;

use maze_chase_core::{
    AdversaryId, CellCoord, CollectibleKind, Command, Event, RejectionReason, SessionStatus,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actors::{Adversary, Player};

pub use crate::grid::GridWorld;
pub use crate::level::{AdversaryProfile, AdversarySpawn, Level, LevelError, Rules};

/// Score, lives, level index and terminal status of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSessionState {
    score: u32,
    lives: u32,
    level: u32,
    status: SessionStatus,
}

impl GameSessionState {
    fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            level: 0,
            status: SessionStatus::Running,
        }
    }

    /// Score accumulated across every level played.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Lives left.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Zero-based index of the current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Status of the current level.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    fn finish(&mut self, status: SessionStatus) {
        debug_assert!(
            !self.status.is_terminal(),
            "terminal status is written once per level"
        );
        self.status = status;
    }
}

/// Represents the authoritative Maze Chase world state.
#[derive(Debug)]
pub struct World {
    level: Level,
    rules: Rules,
    grid: GridWorld,
    player: Player,
    adversaries: Vec<Adversary>,
    session: GameSessionState,
    catch_streak: u32,
    tick_index: u64,
    shift_countdown: Option<u32>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world playing the first level with the provided rules.
    pub fn new(level: Level, rules: Rules) -> Result<Self, LevelError> {
        rules.validate()?;
        let grid = level.grid().clone();
        let player = Player::new(level.player_spawn());
        let mut world = Self {
            session: GameSessionState::new(rules.lives),
            rng: ChaCha8Rng::seed_from_u64(rules.shift_seed),
            shift_countdown: rules.shift_interval_ticks,
            adversaries: Vec::new(),
            catch_streak: 0,
            tick_index: 0,
            player,
            grid,
            level,
            rules,
        };
        world.load_level();
        Ok(world)
    }

    fn load_level(&mut self) {
        self.grid = self.level.grid().clone();
        self.player = Player::new(self.level.player_spawn());
        self.adversaries = self
            .level
            .adversaries()
            .iter()
            .zip(0..)
            .map(|(spawn, index)| {
                Adversary::new(
                    AdversaryId::new(index),
                    spawn.cell,
                    spawn.profile.behavior,
                    spawn.profile.vision_radius,
                )
            })
            .collect();
        self.catch_streak = 0;
        self.tick_index = 0;
        self.shift_countdown = self.rules.shift_interval_ticks;
        self.session.status = SessionStatus::Running;
        tracing::info!(
            level = self.session.level,
            collectibles = self.grid.remaining_collectibles(),
            adversaries = self.adversaries.len(),
            "level started"
        );
    }

    fn step(&mut self, move_player: bool, move_adversaries: bool, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for adversary in &mut self.adversaries {
            if adversary.count_down() {
                out_events.push(Event::AdversaryRecovered {
                    adversary: adversary.id,
                });
            }
        }

        let player_before = self.player.mover.cell;
        let adversaries_before: Vec<CellCoord> = self
            .adversaries
            .iter()
            .map(|adversary| adversary.mover.cell)
            .collect();

        if move_player {
            self.advance_player(out_events);
        }
        if self.session.status.is_terminal() {
            return;
        }

        if move_adversaries {
            for adversary in &mut self.adversaries {
                if let Some(from) = adversary.mover.advance(&self.grid) {
                    out_events.push(Event::AdversaryMoved {
                        adversary: adversary.id,
                        from,
                        to: adversary.mover.cell,
                    });
                }
            }
        }

        self.resolve_collisions(player_before, &adversaries_before, out_events);
        if self.session.status.is_terminal() {
            return;
        }

        self.advance_shift(out_events);
    }

    fn advance_player(&mut self, out_events: &mut Vec<Event>) {
        let Some(from) = self.player.mover.advance(&self.grid) else {
            return;
        };
        let to = self.player.mover.cell;
        out_events.push(Event::PlayerMoved { from, to });

        let Some(kind) = self.grid.collect_at(to) else {
            return;
        };
        let award = match kind {
            CollectibleKind::Regular => self.rules.collectible_score,
            CollectibleKind::Power => self.rules.power_score,
        };
        self.session.award(award);
        out_events.push(Event::CollectiblePicked {
            cell: to,
            kind,
            award,
        });

        if kind == CollectibleKind::Power {
            self.catch_streak = 0;
            for adversary in &mut self.adversaries {
                adversary.frighten(self.rules.vulnerability_ticks);
            }
            out_events.push(Event::AdversariesFrightened {
                duration: self.rules.vulnerability_ticks,
            });
        }

        if self.grid.remaining_collectibles() == 0 {
            self.session.finish(SessionStatus::Won);
            tracing::info!(
                level = self.session.level,
                score = self.session.score,
                "level won"
            );
            out_events.push(Event::LevelWon {
                level: self.session.level,
            });
        }
    }

    fn resolve_collisions(
        &mut self,
        player_before: CellCoord,
        adversaries_before: &[CellCoord],
        out_events: &mut Vec<Event>,
    ) {
        let player_cell = self.player.mover.cell;
        for (index, before) in adversaries_before.iter().enumerate() {
            let adversary = &mut self.adversaries[index];
            let overlapping = adversary.mover.cell == player_cell;
            let swapped = adversary.mover.cell == player_before && *before == player_cell;
            if !overlapping && !swapped {
                continue;
            }

            if adversary.is_vulnerable() {
                let multiplier = 1_u32.checked_shl(self.catch_streak).unwrap_or(u32::MAX);
                let award = self.rules.catch_base_score.saturating_mul(multiplier);
                self.catch_streak = self.catch_streak.saturating_add(1);
                self.session.award(award);
                adversary.respawn();
                out_events.push(Event::AdversaryCaught {
                    adversary: adversary.id,
                    award,
                });
                continue;
            }

            self.session.lives -= 1;
            tracing::debug!(remaining = self.session.lives, "life lost");
            out_events.push(Event::LifeLost {
                remaining: self.session.lives,
            });
            if self.session.lives == 0 {
                self.session.finish(SessionStatus::Lost);
                tracing::info!(
                    level = self.session.level,
                    score = self.session.score,
                    "level lost"
                );
                out_events.push(Event::LevelLost {
                    level: self.session.level,
                });
            } else {
                self.reset_actors();
            }
            return;
        }
    }

    fn reset_actors(&mut self) {
        self.player.respawn();
        for adversary in &mut self.adversaries {
            adversary.respawn();
        }
        self.catch_streak = 0;
    }

    fn advance_shift(&mut self, out_events: &mut Vec<Event>) {
        let Some(countdown) = self.shift_countdown.as_mut() else {
            return;
        };
        *countdown = countdown.saturating_sub(1);
        if *countdown > 0 {
            return;
        }
        self.shift_countdown = self.rules.shift_interval_ticks;

        let mut avoid = Vec::with_capacity(2 + self.adversaries.len() * 2);
        avoid.push(self.player.mover.cell);
        avoid.push(self.player.spawn);
        for adversary in &self.adversaries {
            avoid.push(adversary.mover.cell);
            avoid.push(adversary.spawn);
        }
        let swaps = self.grid.shift(
            &mut self.rng,
            self.player.mover.cell,
            &avoid,
            self.rules.shift_max_swaps,
            self.rules.shift_min_distance,
        );
        tracing::debug!(swaps, tick = self.tick_index, "maze shifted");
        out_events.push(Event::MazeShifted { swaps });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let level_over = world.session.status.is_terminal();
    match command {
        Command::SetDesiredDirection { direction } => {
            if level_over {
                reject(out_events, RejectionReason::LevelOver);
            } else {
                world.player.mover.desired = direction;
            }
        }
        Command::SteerAdversary {
            adversary,
            direction,
        } => {
            if level_over {
                reject(out_events, RejectionReason::LevelOver);
                return;
            }
            match world
                .adversaries
                .iter_mut()
                .find(|candidate| candidate.id == adversary)
            {
                Some(found) => found.mover.desired = direction,
                None => reject(out_events, RejectionReason::UnknownAdversary),
            }
        }
        Command::Tick {
            move_player,
            move_adversaries,
        } => {
            if level_over {
                reject(out_events, RejectionReason::LevelOver);
            } else {
                world.step(move_player, move_adversaries, out_events);
            }
        }
        Command::StartNextLevel => {
            if world.session.status != SessionStatus::Won {
                reject(out_events, RejectionReason::LevelNotWon);
                return;
            }
            world.session.level = world.session.level.saturating_add(1);
            world.load_level();
            out_events.push(Event::LevelStarted {
                level: world.session.level,
            });
        }
        Command::RestartSession => {
            world.session = GameSessionState::new(world.rules.lives);
            world.rng = ChaCha8Rng::seed_from_u64(world.rules.shift_seed);
            world.load_level();
            out_events.push(Event::LevelStarted { level: 0 });
        }
    }
}

fn reject(out_events: &mut Vec<Event>, reason: RejectionReason) {
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_chase_core::{
        AdversaryId, AdversarySnapshot, AdversaryView, PlayerSnapshot, SessionSnapshot,
    };

    use super::{GameSessionState, GridWorld, Rules, World};

    /// Provides read-only access to the live maze.
    #[must_use]
    pub fn grid(world: &World) -> &GridWorld {
        &world.grid
    }

    /// Provides read-only access to the rules the world was built with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of the adversaries inhabiting the maze.
    #[must_use]
    pub fn adversary_view(world: &World) -> AdversaryView {
        AdversaryView::from_snapshots(
            world
                .adversaries
                .iter()
                .map(|adversary| adversary.snapshot(world.rules.blink_ticks))
                .collect(),
        )
    }

    /// Captures a single adversary's state.
    #[must_use]
    pub fn adversary(world: &World, id: AdversaryId) -> Option<AdversarySnapshot> {
        world
            .adversaries
            .iter()
            .find(|adversary| adversary.id == id)
            .map(|adversary| adversary.snapshot(world.rules.blink_ticks))
    }

    /// Provides read-only access to the session scoreboard.
    #[must_use]
    pub fn session(world: &World) -> &GameSessionState {
        &world.session
    }

    /// Number of steps executed in the current level.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Builds the summary handed to persistence sinks.
    #[must_use]
    pub fn session_snapshot(world: &World, timestamp: u64) -> SessionSnapshot {
        SessionSnapshot {
            score: world.session.score,
            level: world.session.level,
            lives: world.session.lives,
            status: world.session.status,
            timestamp,
        }
    }
}
