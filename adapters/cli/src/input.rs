//! Player input sources for headless sessions.

use std::collections::VecDeque;

use maze_chase_core::{AdversaryView, CellCoord, CellKind, Direction, PlayerSnapshot};
use maze_chase_world::GridWorld;
use thiserror::Error;

/// Errors raised while parsing a scripted input string.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// Entry lacks the `tick:direction` separator.
    #[error("entry `{entry}` must look like `tick:direction`")]
    MissingSeparator {
        /// Offending entry.
        entry: String,
    },
    /// Tick portion is not an unsigned integer.
    #[error("entry `{entry}` has an invalid tick")]
    InvalidTick {
        /// Offending entry.
        entry: String,
    },
    /// Direction portion is not one of the known names.
    #[error("entry `{entry}` names an unknown direction")]
    UnknownDirection {
        /// Offending entry.
        entry: String,
    },
    /// Entries must be listed in non-decreasing tick order.
    #[error("tick {tick} is listed after tick {previous}")]
    OutOfOrder {
        /// Tick of the offending entry.
        tick: u64,
        /// Tick of the entry before it.
        previous: u64,
    },
}

/// Timed direction changes such as `0:right 24:down 40:left`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Script {
    entries: VecDeque<(u64, Direction)>,
}

impl Script {
    pub(crate) fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut entries = VecDeque::new();
        let mut previous = 0;
        for entry in source.split(|c: char| c.is_whitespace() || c == ',') {
            if entry.is_empty() {
                continue;
            }
            let Some((tick, direction)) = entry.split_once(':') else {
                return Err(ScriptError::MissingSeparator {
                    entry: entry.to_owned(),
                });
            };
            let tick: u64 = tick.parse().map_err(|_| ScriptError::InvalidTick {
                entry: entry.to_owned(),
            })?;
            let direction =
                parse_direction(direction).ok_or_else(|| ScriptError::UnknownDirection {
                    entry: entry.to_owned(),
                })?;
            if tick < previous {
                return Err(ScriptError::OutOfOrder { tick, previous });
            }
            previous = tick;
            entries.push_back((tick, direction));
        }
        Ok(Self { entries })
    }

    /// Latest direction scheduled at or before `tick` that has not been issued.
    pub(crate) fn take_due(&mut self, tick: u64) -> Option<Direction> {
        let mut due = None;
        while let Some(&(at, direction)) = self.entries.front() {
            if at > tick {
                break;
            }
            due = Some(direction);
            let _ = self.entries.pop_front();
        }
        due
    }
}

fn parse_direction(name: &str) -> Option<Direction> {
    match name.to_ascii_lowercase().as_str() {
        "r" | "right" => Some(Direction::Right),
        "d" | "down" => Some(Direction::Down),
        "l" | "left" => Some(Direction::Left),
        "u" | "up" => Some(Direction::Up),
        _ => None,
    }
}

/// Steers toward the nearest reachable collectible while keeping clear of
/// dangerous adversaries.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autopilot {
    danger_radius: u32,
}

impl Autopilot {
    pub(crate) const fn new(danger_radius: u32) -> Self {
        Self { danger_radius }
    }

    pub(crate) fn choose(
        &self,
        grid: &GridWorld,
        player: &PlayerSnapshot,
        adversaries: &AdversaryView,
    ) -> Option<Direction> {
        let threatened = |cell: CellCoord| {
            adversaries.iter().any(|adversary| {
                !adversary.vulnerable && adversary.cell.manhattan_distance(cell) <= self.danger_radius
            })
        };
        first_step_to_collectible(grid, player.cell, threatened)
            .or_else(|| first_step_to_collectible(grid, player.cell, |_| false))
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Breadth-first search returning the first move on a shortest path to any
/// collectible that avoids cells rejected by `avoid`.
fn first_step_to_collectible(
    grid: &GridWorld,
    start: CellCoord,
    avoid: impl Fn(CellCoord) -> bool,
) -> Option<Direction> {
    let columns = grid.columns() as usize;
    let index = |cell: CellCoord| cell.row() as usize * columns + cell.column() as usize;
    let mut first_step: Vec<Option<Direction>> = vec![None; columns * grid.rows() as usize];
    let mut visited = vec![false; first_step.len()];
    let mut queue = VecDeque::new();
    visited[index(start)] = true;

    for direction in Direction::ALL {
        let Some(next) = grid.passable_neighbor(start, direction) else {
            continue;
        };
        if visited[index(next)] || avoid(next) {
            continue;
        }
        visited[index(next)] = true;
        first_step[index(next)] = Some(direction);
        queue.push_back(next);
    }

    while let Some(cell) = queue.pop_front() {
        let step = first_step[index(cell)];
        if grid.cell_kind(cell).and_then(CellKind::collectible).is_some() {
            return step;
        }
        for direction in Direction::ALL {
            let Some(next) = grid.passable_neighbor(cell, direction) else {
                continue;
            };
            if visited[index(next)] || avoid(next) {
                continue;
            }
            visited[index(next)] = true;
            first_step[index(next)] = step;
            queue.push_back(next);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{AdversaryId, AdversarySnapshot, Behavior};
    use maze_chase_world::Level;

    #[test]
    fn parses_timed_directions() {
        let mut script = Script::parse("0:right, 4:D  9:left 9:u").expect("valid script");
        assert_eq!(script.take_due(0), Some(Direction::Right));
        assert_eq!(script.take_due(3), None);
        assert_eq!(script.take_due(5), Some(Direction::Down));
        assert_eq!(script.take_due(20), Some(Direction::Up));
        assert_eq!(script.take_due(21), None);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            Script::parse("right"),
            Err(ScriptError::MissingSeparator {
                entry: "right".to_owned()
            })
        );
        assert_eq!(
            Script::parse("x:right"),
            Err(ScriptError::InvalidTick {
                entry: "x:right".to_owned()
            })
        );
        assert_eq!(
            Script::parse("3:sideways"),
            Err(ScriptError::UnknownDirection {
                entry: "3:sideways".to_owned()
            })
        );
        assert_eq!(
            Script::parse("5:up 2:down"),
            Err(ScriptError::OutOfOrder {
                tick: 2,
                previous: 5
            })
        );
    }

    #[test]
    fn empty_script_never_steers() {
        let mut script = Script::parse("  ").expect("empty script");
        assert_eq!(script.take_due(u64::MAX), None);
    }

    fn player_at(cell: CellCoord) -> PlayerSnapshot {
        PlayerSnapshot {
            cell,
            heading: Direction::Right,
            desired: Direction::Right,
            spawn: cell,
        }
    }

    fn adversary_at(cell: CellCoord, vulnerable: bool) -> AdversarySnapshot {
        AdversarySnapshot {
            id: AdversaryId::new(0),
            cell,
            heading: Direction::Up,
            spawn: cell,
            behavior: Behavior::Chase,
            vision_radius: None,
            vulnerable,
            vulnerability_remaining: if vulnerable { 100 } else { 0 },
            blinking: false,
        }
    }

    const FORK: &str = "\
#######
#.___.#
#.#_#.#
#__P__#
#######";

    #[test]
    fn autopilot_heads_for_nearest_collectible() {
        let level = Level::parse(FORK).expect("valid layout");
        let choice = Autopilot::default().choose(
            level.grid(),
            &player_at(level.player_spawn()),
            &AdversaryView::default(),
        );
        assert_eq!(choice, Some(Direction::Right));
    }

    #[test]
    fn autopilot_avoids_dangerous_adversaries() {
        let level = Level::parse(FORK).expect("valid layout");
        let guard = AdversaryView::from_snapshots(vec![adversary_at(CellCoord::new(5, 3), false)]);
        let choice =
            Autopilot::default().choose(level.grid(), &player_at(level.player_spawn()), &guard);
        assert_eq!(choice, Some(Direction::Left));

        let frightened =
            AdversaryView::from_snapshots(vec![adversary_at(CellCoord::new(5, 3), true)]);
        let choice = Autopilot::default().choose(
            level.grid(),
            &player_at(level.player_spawn()),
            &frightened,
        );
        assert_eq!(choice, Some(Direction::Right));
    }

    #[test]
    fn autopilot_pushes_through_when_cornered() {
        let level = Level::parse("#####\n#P._#\n#####").expect("valid layout");
        let threat = AdversaryView::from_snapshots(vec![adversary_at(CellCoord::new(3, 1), false)]);
        let choice =
            Autopilot::default().choose(level.grid(), &player_at(level.player_spawn()), &threat);
        assert_eq!(choice, Some(Direction::Right));
    }
}
