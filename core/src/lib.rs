#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! presentation sinks react to. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Buffers the direction the player wants to travel next.
    SetDesiredDirection {
        /// Direction requested by the input source.
        direction: Direction,
    },
    /// Buffers the direction chosen for an adversary by its policy.
    SteerAdversary {
        /// Identifier of the adversary being steered.
        adversary: AdversaryId,
        /// Direction the adversary should attempt on its next move.
        direction: Direction,
    },
    /// Executes one logical simulation step.
    Tick {
        /// Whether the player advances during this step.
        move_player: bool,
        /// Whether the adversaries advance during this step.
        move_adversaries: bool,
    },
    /// Starts the following level after the current one was won.
    StartNextLevel,
    /// Discards the session and starts a new game from the first level.
    RestartSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that one logical step completed.
    TimeAdvanced {
        /// Index of the step that just completed within the level.
        tick: u64,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an adversary moved between two cells.
    AdversaryMoved {
        /// Identifier of the adversary that moved.
        adversary: AdversaryId,
        /// Cell the adversary occupied before moving.
        from: CellCoord,
        /// Cell the adversary occupies after moving.
        to: CellCoord,
    },
    /// Reports that the player consumed a collectible.
    CollectiblePicked {
        /// Cell the collectible was removed from.
        cell: CellCoord,
        /// Kind of collectible that was consumed.
        kind: CollectibleKind,
        /// Score awarded for the pickup.
        award: u32,
    },
    /// Announces that every adversary became vulnerable and reversed.
    AdversariesFrightened {
        /// Number of steps the vulnerability lasts.
        duration: u32,
    },
    /// Announces that an adversary's vulnerability expired.
    AdversaryRecovered {
        /// Identifier of the adversary that recovered.
        adversary: AdversaryId,
    },
    /// Reports that the player caught a vulnerable adversary.
    AdversaryCaught {
        /// Identifier of the adversary that was caught.
        adversary: AdversaryId,
        /// Score awarded for the catch.
        award: u32,
    },
    /// Reports that the player lost a life to a non-vulnerable adversary.
    LifeLost {
        /// Lives left after the loss.
        remaining: u32,
    },
    /// Announces that a level began.
    LevelStarted {
        /// Zero-based index of the level.
        level: u32,
    },
    /// Announces that every collectible of the level was consumed.
    LevelWon {
        /// Zero-based index of the level that was won.
        level: u32,
    },
    /// Announces that the player ran out of lives.
    LevelLost {
        /// Zero-based index of the level that was lost.
        level: u32,
    },
    /// Reports that the shifting maze rearranged some of its cells.
    MazeShifted {
        /// Number of wall swaps committed during the shift.
        swaps: u32,
    },
    /// Reports that a command could not be executed.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The level already reached a terminal status.
    LevelOver,
    /// The next level can only start after the current one is won.
    LevelNotWon,
    /// No adversary with the provided identifier exists.
    UnknownAdversary,
}

/// Cardinal movement directions, listed in tie-break preference order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward decreasing row indices.
    Up,
}

impl Direction {
    /// Every direction in deterministic preference order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Unit vector of the direction expressed as `(column, row)` deltas.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
        }
    }
}

/// Unique identifier assigned to an adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdversaryId(u32);

impl AdversaryId {
    /// Creates a new adversary identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Contents of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Impassable cell.
    Wall,
    /// Passable corridor without contents.
    Open,
    /// Passable cell holding a regular collectible.
    Collectible,
    /// Passable cell holding a power collectible.
    PowerCollectible,
    /// Passable cell whose collectible was already consumed.
    Empty,
}

impl CellKind {
    /// Reports whether actors may enter the cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Collectible stored in the cell, if any.
    #[must_use]
    pub const fn collectible(self) -> Option<CollectibleKind> {
        match self {
            Self::Collectible => Some(CollectibleKind::Regular),
            Self::PowerCollectible => Some(CollectibleKind::Power),
            Self::Wall | Self::Open | Self::Empty => None,
        }
    }
}

/// Kinds of collectibles the player can consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Ordinary collectible worth a small score.
    Regular,
    /// Collectible that turns every adversary vulnerable.
    Power,
}

/// Nominal behavior assigned to an adversary at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Greedily minimises the distance to the player.
    Chase,
    /// Targets a point ahead of the player along its heading.
    Ambush,
    /// Wanders, chasing only occasionally.
    Patrol,
}

/// Terminal status of the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The level is still being played.
    Running,
    /// Every collectible was consumed.
    Won,
    /// The player ran out of lives.
    Lost,
}

impl SessionStatus {
    /// Reports whether the status is terminal for the level.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Cell currently occupied by the player.
    pub cell: CellCoord,
    /// Direction the player is committed to.
    pub heading: Direction,
    /// Buffered direction the player will turn to when possible.
    pub desired: Direction,
    /// Cell the player returns to after losing a life.
    pub spawn: CellCoord,
}

/// Immutable representation of a single adversary used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdversarySnapshot {
    /// Unique identifier assigned to the adversary.
    pub id: AdversaryId,
    /// Cell currently occupied by the adversary.
    pub cell: CellCoord,
    /// Direction the adversary is committed to.
    pub heading: Direction,
    /// Cell the adversary returns to after being caught or reset.
    pub spawn: CellCoord,
    /// Nominal behavior tag selecting the adversary's policy.
    pub behavior: Behavior,
    /// Optional radius limiting what the adversary can perceive.
    pub vision_radius: Option<u32>,
    /// Whether the player can currently catch the adversary.
    pub vulnerable: bool,
    /// Steps left before the vulnerability expires.
    pub vulnerability_remaining: u32,
    /// Cosmetic hint that the vulnerability is about to expire.
    pub blinking: bool,
}

/// Read-only snapshot describing all adversaries within the maze.
#[derive(Clone, Debug, Default)]
pub struct AdversaryView {
    snapshots: Vec<AdversarySnapshot>,
}

impl AdversaryView {
    /// Creates a new adversary view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AdversarySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured adversary snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AdversarySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AdversarySnapshot> {
        self.snapshots
    }
}

/// Serializable summary handed to persistence sinks when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Score accumulated across every level played.
    pub score: u32,
    /// Zero-based index of the level being played.
    pub level: u32,
    /// Lives left.
    pub lives: u32,
    /// Status of the current level.
    pub status: SessionStatus,
    /// Caller-provided timestamp, typically seconds since the Unix epoch.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::{
        AdversaryId, Behavior, CellCoord, CellKind, CollectibleKind, Direction, SessionSnapshot,
        SessionStatus,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn reverse_is_an_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction.reverse(), direction);
            assert_eq!(direction.reverse().reverse(), direction);
            let (dx, dy) = direction.offset();
            let (rx, ry) = direction.reverse().offset();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
    }

    #[test]
    fn offsets_are_unit_vectors() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    #[test]
    fn only_walls_block_movement() {
        assert!(!CellKind::Wall.is_passable());
        assert!(CellKind::Open.is_passable());
        assert!(CellKind::Collectible.is_passable());
        assert!(CellKind::PowerCollectible.is_passable());
        assert!(CellKind::Empty.is_passable());
    }

    #[test]
    fn collectible_kinds_follow_cell_kinds() {
        assert_eq!(
            CellKind::Collectible.collectible(),
            Some(CollectibleKind::Regular)
        );
        assert_eq!(
            CellKind::PowerCollectible.collectible(),
            Some(CollectibleKind::Power)
        );
        assert_eq!(CellKind::Empty.collectible(), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!SessionStatus::Running.is_terminal());
        assert!(SessionStatus::Won.is_terminal());
        assert!(SessionStatus::Lost.is_terminal());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn adversary_id_round_trips_through_bincode() {
        assert_round_trip(&AdversaryId::new(7));
    }

    #[test]
    fn behavior_round_trips_through_bincode() {
        assert_round_trip(&Behavior::Ambush);
    }

    #[test]
    fn session_snapshot_round_trips_through_bincode() {
        let snapshot = SessionSnapshot {
            score: 1_250,
            level: 2,
            lives: 1,
            status: SessionStatus::Lost,
            timestamp: 1_700_000_000,
        };
        assert_round_trip(&snapshot);
    }
}
