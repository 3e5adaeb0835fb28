use maze_chase_core::{AdversaryId, AdversarySnapshot, Behavior, CellCoord, Direction, PlayerSnapshot};

use crate::grid::GridWorld;

pub(crate) const PLAYER_HEADING: Direction = Direction::Right;
pub(crate) const ADVERSARY_HEADING: Direction = Direction::Up;

/// Grid position plus committed and buffered directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Mover {
    pub(crate) cell: CellCoord,
    pub(crate) heading: Direction,
    pub(crate) desired: Direction,
}

impl Mover {
    pub(crate) const fn new(cell: CellCoord, heading: Direction) -> Self {
        Self {
            cell,
            heading,
            desired: heading,
        }
    }

    /// Turns toward the desired direction when possible, then advances one cell.
    ///
    /// Returns the cell left behind when the mover advanced.
    pub(crate) fn advance(&mut self, grid: &GridWorld) -> Option<CellCoord> {
        if grid.passable_neighbor(self.cell, self.desired).is_some() {
            self.heading = self.desired;
        }
        let next = grid.passable_neighbor(self.cell, self.heading)?;
        let from = self.cell;
        self.cell = next;
        debug_assert!(grid.is_passable(self.cell), "mover entered a wall");
        Some(from)
    }

    pub(crate) fn reverse(&mut self) {
        self.heading = self.heading.reverse();
        self.desired = self.heading;
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) mover: Mover,
    pub(crate) spawn: CellCoord,
}

impl Player {
    pub(crate) const fn new(spawn: CellCoord) -> Self {
        Self {
            mover: Mover::new(spawn, PLAYER_HEADING),
            spawn,
        }
    }

    pub(crate) fn respawn(&mut self) {
        self.mover = Mover::new(self.spawn, PLAYER_HEADING);
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.mover.cell,
            heading: self.mover.heading,
            desired: self.mover.desired,
            spawn: self.spawn,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Adversary {
    pub(crate) id: AdversaryId,
    pub(crate) mover: Mover,
    pub(crate) spawn: CellCoord,
    pub(crate) behavior: Behavior,
    pub(crate) vision_radius: Option<u32>,
    pub(crate) vulnerable_for: u32,
}

impl Adversary {
    pub(crate) const fn new(
        id: AdversaryId,
        spawn: CellCoord,
        behavior: Behavior,
        vision_radius: Option<u32>,
    ) -> Self {
        Self {
            id,
            mover: Mover::new(spawn, ADVERSARY_HEADING),
            spawn,
            behavior,
            vision_radius,
            vulnerable_for: 0,
        }
    }

    pub(crate) const fn is_vulnerable(&self) -> bool {
        self.vulnerable_for > 0
    }

    pub(crate) fn frighten(&mut self, duration: u32) {
        self.vulnerable_for = duration;
        self.mover.reverse();
    }

    /// Counts down the vulnerability window, reporting when it just expired.
    pub(crate) fn count_down(&mut self) -> bool {
        if self.vulnerable_for == 0 {
            return false;
        }
        self.vulnerable_for -= 1;
        self.vulnerable_for == 0
    }

    pub(crate) fn respawn(&mut self) {
        self.mover = Mover::new(self.spawn, ADVERSARY_HEADING);
        self.vulnerable_for = 0;
    }

    pub(crate) fn snapshot(&self, blink_ticks: u32) -> AdversarySnapshot {
        AdversarySnapshot {
            id: self.id,
            cell: self.mover.cell,
            heading: self.mover.heading,
            spawn: self.spawn,
            behavior: self.behavior,
            vision_radius: self.vision_radius,
            vulnerable: self.is_vulnerable(),
            vulnerability_remaining: self.vulnerable_for,
            blinking: self.is_vulnerable() && self.vulnerable_for <= blink_ticks,
        }
    }
}
