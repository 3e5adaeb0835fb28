//! Interchangeable strategies that pick an adversary's next direction.

use std::fmt;

use maze_chase_core::{CellCoord, Direction};
use maze_chase_world::GridWorld;
use rand::{seq::SliceRandom, Rng, RngCore};

/// Direction an adversary may take together with the cell it leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Direction of travel.
    pub direction: Direction,
    /// Cell reached by travelling in `direction`, after tunnel wraparound.
    pub cell: CellCoord,
}

/// Enumerates the passable moves available from `cell`.
///
/// Reversing is excluded unless it is the only way out. Candidates are listed
/// in [`Direction::ALL`] order so that tie-breaks stay deterministic.
#[must_use]
pub fn candidates(grid: &GridWorld, cell: CellCoord, heading: Direction) -> Vec<Candidate> {
    let backwards = heading.reverse();
    let forward: Vec<Candidate> = Direction::ALL
        .into_iter()
        .filter(|direction| *direction != backwards)
        .filter_map(|direction| {
            grid.passable_neighbor(cell, direction)
                .map(|cell| Candidate { direction, cell })
        })
        .collect();
    if !forward.is_empty() {
        return forward;
    }
    grid.passable_neighbor(cell, backwards)
        .map(|cell| Candidate {
            direction: backwards,
            cell,
        })
        .into_iter()
        .collect()
}

/// Everything a policy may look at when choosing a move.
#[derive(Clone, Copy, Debug)]
pub struct Situation<'a> {
    /// Maze the adversary moves through.
    pub grid: &'a GridWorld,
    /// Cell the adversary occupies.
    pub position: CellCoord,
    /// Cell the player occupies.
    pub player: CellCoord,
    /// Direction the player is committed to.
    pub player_heading: Direction,
    /// Moves available to the adversary.
    pub candidates: &'a [Candidate],
}

/// Strategy interface implemented once per adversary behavior.
pub trait AdversaryPolicy: fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Picks one of the situation's candidates, or `None` when there are none.
    fn choose(&self, situation: &Situation<'_>, rng: &mut dyn RngCore) -> Option<Direction>;
}

/// Greedily minimises the Manhattan distance to the player.
#[derive(Clone, Copy, Debug, Default)]
pub struct Chase;

impl AdversaryPolicy for Chase {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn choose(&self, situation: &Situation<'_>, _rng: &mut dyn RngCore) -> Option<Direction> {
        closest_to(situation.candidates, situation.player)
    }
}

/// Heads for a point a fixed number of cells ahead of the player.
#[derive(Clone, Copy, Debug)]
pub struct Ambush {
    lookahead: u32,
}

impl Ambush {
    /// Creates an ambush policy targeting `lookahead` cells ahead of the player.
    #[must_use]
    pub const fn new(lookahead: u32) -> Self {
        Self { lookahead }
    }

    /// Virtual target ahead of the player, clamped to the grid bounds.
    #[must_use]
    pub fn target(&self, grid: &GridWorld, player: CellCoord, heading: Direction) -> CellCoord {
        let (dx, dy) = heading.offset();
        let reach = i64::from(self.lookahead);
        let max_column = i64::from(grid.columns().saturating_sub(1));
        let max_row = i64::from(grid.rows().saturating_sub(1));
        let column = (i64::from(player.column()) + dx * reach).clamp(0, max_column);
        let row = (i64::from(player.row()) + dy * reach).clamp(0, max_row);
        CellCoord::new(column as u32, row as u32)
    }
}

impl AdversaryPolicy for Ambush {
    fn name(&self) -> &'static str {
        "ambush"
    }

    fn choose(&self, situation: &Situation<'_>, _rng: &mut dyn RngCore) -> Option<Direction> {
        let target = self.target(situation.grid, situation.player, situation.player_heading);
        closest_to(situation.candidates, target)
    }
}

/// Wanders between candidates, occasionally chasing the player.
#[derive(Clone, Copy, Debug)]
pub struct Patrol {
    chase_probability: f64,
}

impl Patrol {
    /// Creates a patrol policy that chases with the provided probability.
    ///
    /// The probability is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn new(chase_probability: f64) -> Self {
        let chase_probability = if chase_probability.is_nan() {
            0.0
        } else {
            chase_probability.clamp(0.0, 1.0)
        };
        Self { chase_probability }
    }
}

impl AdversaryPolicy for Patrol {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn choose(&self, situation: &Situation<'_>, rng: &mut dyn RngCore) -> Option<Direction> {
        if situation.candidates.is_empty() {
            return None;
        }
        if rng.gen_bool(self.chase_probability) {
            return closest_to(situation.candidates, situation.player);
        }
        situation
            .candidates
            .choose(rng)
            .map(|candidate| candidate.direction)
    }
}

/// Maximises the Manhattan distance to the player while vulnerable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flee;

impl AdversaryPolicy for Flee {
    fn name(&self) -> &'static str {
        "flee"
    }

    fn choose(&self, situation: &Situation<'_>, _rng: &mut dyn RngCore) -> Option<Direction> {
        let mut best: Option<(u32, Direction)> = None;
        for candidate in situation.candidates {
            let distance = candidate.cell.manhattan_distance(situation.player);
            if best.map_or(true, |(farthest, _)| distance > farthest) {
                best = Some((distance, candidate.direction));
            }
        }
        best.map(|(_, direction)| direction)
    }
}

/// First candidate with the smallest distance to `target`.
fn closest_to(candidates: &[Candidate], target: CellCoord) -> Option<Direction> {
    candidates
        .iter()
        .min_by_key(|candidate| candidate.cell.manhattan_distance(target))
        .map(|candidate| candidate.direction)
}
