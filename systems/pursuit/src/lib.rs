#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adversary decision making expressed as interchangeable steering policies.

mod policy;

use maze_chase_core::{
    AdversarySnapshot, AdversaryView, Behavior, Command, Event, PlayerSnapshot,
};
use maze_chase_world::GridWorld;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use crate::policy::{
    candidates, AdversaryPolicy, Ambush, Candidate, Chase, Flee, Patrol, Situation,
};

const DEFAULT_AMBUSH_LOOKAHEAD: u32 = 4;
const DEFAULT_PATROL_CHASE_PROBABILITY: f64 = 0.3;

/// Configuration for the pursuit system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    rng_seed: u64,
    ambush_lookahead: u32,
    patrol_chase_probability: f64,
}

impl Config {
    /// Creates a configuration with default policy tuning and the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ambush_lookahead: DEFAULT_AMBUSH_LOOKAHEAD,
            patrol_chase_probability: DEFAULT_PATROL_CHASE_PROBABILITY,
        }
    }

    /// Overrides how many cells ahead of the player ambushers aim.
    #[must_use]
    pub const fn with_ambush_lookahead(mut self, lookahead: u32) -> Self {
        self.ambush_lookahead = lookahead;
        self
    }

    /// Overrides the chance that a patrolling adversary chases on a given step.
    #[must_use]
    pub const fn with_patrol_chase_probability(mut self, probability: f64) -> Self {
        self.patrol_chase_probability = probability;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Pure system that steers every adversary before it moves.
#[derive(Debug)]
pub struct Pursuit {
    policies: Policies,
    rng: ChaCha8Rng,
    level_over: bool,
}

#[derive(Debug)]
struct Policies {
    chase: Chase,
    ambush: Ambush,
    patrol: Patrol,
    flee: Flee,
}

impl Policies {
    fn select(
        &self,
        adversary: &AdversarySnapshot,
        player: &PlayerSnapshot,
    ) -> &dyn AdversaryPolicy {
        let in_sight = adversary
            .vision_radius
            .map_or(true, |radius| adversary.cell.manhattan_distance(player.cell) <= radius);
        if !in_sight {
            return &self.patrol;
        }
        if adversary.vulnerable {
            return &self.flee;
        }
        match adversary.behavior {
            Behavior::Chase => &self.chase,
            Behavior::Ambush => &self.ambush,
            Behavior::Patrol => &self.patrol,
        }
    }
}

impl Pursuit {
    /// Creates a pursuit system seeded from the configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            policies: Policies {
                chase: Chase,
                ambush: Ambush::new(config.ambush_lookahead),
                patrol: Patrol::new(config.patrol_chase_probability),
                flee: Flee,
            },
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            level_over: false,
        }
    }

    /// Consumes world events and immutable views to emit steering commands.
    ///
    /// Steering stops once a level is won or lost and resumes when the next
    /// level starts.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: &GridWorld,
        player: &PlayerSnapshot,
        adversaries: &AdversaryView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelWon { .. } | Event::LevelLost { .. } => self.level_over = true,
                Event::LevelStarted { .. } => self.level_over = false,
                _ => {}
            }
        }

        if self.level_over {
            return;
        }

        for adversary in adversaries.iter() {
            let options = candidates(grid, adversary.cell, adversary.heading);
            let situation = Situation {
                grid,
                position: adversary.cell,
                player: player.cell,
                player_heading: player.heading,
                candidates: &options,
            };
            let policy = self.policies.select(adversary, player);
            let Some(direction) = policy.choose(&situation, &mut self.rng) else {
                continue;
            };
            tracing::trace!(
                adversary = adversary.id.get(),
                policy = policy.name(),
                ?direction,
                "adversary steered"
            );
            out.push(Command::SteerAdversary {
                adversary: adversary.id,
                direction,
            });
        }
    }

    /// Policy that governs the adversary in its current state.
    ///
    /// Adversaries with limited vision patrol while the player is out of
    /// sight, frightened or not. Vulnerable adversaries that see the player flee.
    #[must_use]
    pub fn policy_for(
        &self,
        adversary: &AdversarySnapshot,
        player: &PlayerSnapshot,
    ) -> &dyn AdversaryPolicy {
        self.policies.select(adversary, player)
    }
}

impl Default for Pursuit {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{AdversaryId, CellCoord, Direction};

    fn adversary(behavior: Behavior, vision_radius: Option<u32>) -> AdversarySnapshot {
        AdversarySnapshot {
            id: AdversaryId::new(0),
            cell: CellCoord::new(1, 1),
            heading: Direction::Up,
            spawn: CellCoord::new(1, 1),
            behavior,
            vision_radius,
            vulnerable: false,
            vulnerability_remaining: 0,
            blinking: false,
        }
    }

    fn player(cell: CellCoord) -> PlayerSnapshot {
        PlayerSnapshot {
            cell,
            heading: Direction::Right,
            desired: Direction::Right,
            spawn: cell,
        }
    }

    #[test]
    fn behavior_selects_matching_policy() {
        let pursuit = Pursuit::default();
        let near = player(CellCoord::new(2, 1));
        assert_eq!(
            pursuit.policy_for(&adversary(Behavior::Chase, None), &near).name(),
            "chase"
        );
        assert_eq!(
            pursuit.policy_for(&adversary(Behavior::Ambush, None), &near).name(),
            "ambush"
        );
        assert_eq!(
            pursuit.policy_for(&adversary(Behavior::Patrol, None), &near).name(),
            "patrol"
        );
    }

    #[test]
    fn vulnerable_adversaries_flee() {
        let pursuit = Pursuit::default();
        let mut frightened = adversary(Behavior::Ambush, None);
        frightened.vulnerable = true;
        frightened.vulnerability_remaining = 10;
        let far = player(CellCoord::new(9, 9));
        assert_eq!(pursuit.policy_for(&frightened, &far).name(), "flee");
    }

    #[test]
    fn vision_gates_fleeing() {
        let pursuit = Pursuit::default();
        let mut frightened = adversary(Behavior::Chase, Some(2));
        frightened.vulnerable = true;
        frightened.vulnerability_remaining = 10;
        assert_eq!(
            pursuit
                .policy_for(&frightened, &player(CellCoord::new(9, 9)))
                .name(),
            "patrol"
        );
        assert_eq!(
            pursuit
                .policy_for(&frightened, &player(CellCoord::new(2, 2)))
                .name(),
            "flee"
        );
    }

    #[test]
    fn limited_vision_falls_back_to_patrol() {
        let pursuit = Pursuit::default();
        let watcher = adversary(Behavior::Chase, Some(3));
        assert_eq!(
            pursuit
                .policy_for(&watcher, &player(CellCoord::new(3, 2)))
                .name(),
            "chase"
        );
        assert_eq!(
            pursuit
                .policy_for(&watcher, &player(CellCoord::new(4, 2)))
                .name(),
            "patrol"
        );
    }
}
