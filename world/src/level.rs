//! Level layouts, tuning rules and the validation performed at load time.

use maze_chase_core::{Behavior, CellCoord, CellKind};
use serde::Deserialize;
use thiserror::Error;

use crate::grid::GridWorld;

const DEFAULT_BEHAVIORS: [Behavior; 3] = [Behavior::Chase, Behavior::Ambush, Behavior::Patrol];

/// Reasons a level or rule set is rejected at load time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The layout contains no rows.
    #[error("level layout is empty")]
    EmptyLayout,
    /// A row's width differs from the first row.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// The layout contains a character with no cell meaning.
    #[error("unknown symbol {symbol:?} at column {column}, row {row}")]
    UnknownSymbol {
        /// Character found in the layout.
        symbol: char,
        /// Column of the character.
        column: u32,
        /// Row of the character.
        row: u32,
    },
    /// A border cell is open outside a tunnel row.
    #[error("border cell at column {column}, row {row} must be a wall")]
    OpenBorder {
        /// Column of the open border cell.
        column: u32,
        /// Row of the open border cell.
        row: u32,
    },
    /// The layout has no player spawn.
    #[error("level has no player spawn")]
    MissingPlayerSpawn,
    /// The layout has more than one player spawn.
    #[error("level has a second player spawn at column {column}, row {row}")]
    DuplicatePlayerSpawn {
        /// Column of the second spawn.
        column: u32,
        /// Row of the second spawn.
        row: u32,
    },
    /// More adversary profiles were supplied than adversary spawns exist.
    #[error("{profiles} adversary profiles supplied for {spawns} spawns")]
    TooManyProfiles {
        /// Number of supplied profiles.
        profiles: usize,
        /// Number of adversary spawns in the layout.
        spawns: usize,
    },
    /// The layout holds no collectibles, so the level could never be won.
    #[error("level has no collectibles")]
    NoCollectibles,
    /// A collectible cannot be reached from the player spawn.
    #[error("collectible at column {column}, row {row} is unreachable from the player spawn")]
    UnreachableCollectible {
        /// Column of the unreachable collectible.
        column: u32,
        /// Row of the unreachable collectible.
        row: u32,
    },
    /// A row, column or spawn count does not fit in a `u32`.
    #[error("level layout has {found} {what}, more than {max} allowed", max = u32::MAX)]
    TooLarge {
        /// What overflowed: rows, columns or adversary spawns.
        what: &'static str,
        /// Count found in the layout.
        found: usize,
    },
    /// A rule value makes the session unplayable.
    #[error("invalid rules: {0}")]
    InvalidRules(&'static str),
}

/// Per-adversary configuration supplied alongside a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdversaryProfile {
    /// Nominal behavior of the adversary.
    pub behavior: Behavior,
    /// Optional perception radius; outside it the adversary patrols.
    #[serde(default)]
    pub vision_radius: Option<u32>,
}

impl AdversaryProfile {
    /// Creates a profile with unlimited vision.
    #[must_use]
    pub const fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            vision_radius: None,
        }
    }

    /// Limits the adversary's perception to the provided Manhattan radius.
    #[must_use]
    pub const fn with_vision(mut self, radius: u32) -> Self {
        self.vision_radius = Some(radius);
        self
    }
}

/// Adversary placement resolved from a layout and its profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdversarySpawn {
    /// Cell the adversary starts on and returns to.
    pub cell: CellCoord,
    /// Behavior and vision of the adversary.
    pub profile: AdversaryProfile,
}

/// Validated level ready to seed a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    grid: GridWorld,
    player_spawn: CellCoord,
    adversaries: Vec<AdversarySpawn>,
}

impl Level {
    /// Parses a layout, assigning default behaviors to adversary spawns.
    ///
    /// Symbols: `#` wall, space open, `.` collectible, `o` power collectible,
    /// `_` empty, `P` player spawn, `G` adversary spawn.
    pub fn parse(layout: &str) -> Result<Self, LevelError> {
        Self::with_adversaries(layout, &[])
    }

    /// Parses a layout and pairs adversary spawns with `profiles` in reading order.
    ///
    /// Spawns without a profile cycle through chase, ambush and patrol.
    pub fn with_adversaries(layout: &str, profiles: &[AdversaryProfile]) -> Result<Self, LevelError> {
        let rows = layout_rows(layout);
        let Some(first) = rows.first() else {
            return Err(LevelError::EmptyLayout);
        };
        let columns = fit_u32(first.chars().count(), "columns")?;
        if columns == 0 {
            return Err(LevelError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(columns as usize * rows.len());
        let row_count = fit_u32(rows.len(), "rows")?;
        let mut player_spawn = None;
        let mut adversary_cells = Vec::new();
        for (row_index, row) in (0..row_count).zip(&rows) {
            let width = fit_u32(row.chars().count(), "columns")?;
            if width != columns {
                return Err(LevelError::RaggedRow {
                    row: row_index,
                    expected: columns,
                    found: width,
                });
            }
            for (column_index, symbol) in (0..columns).zip(row.chars()) {
                let cell = CellCoord::new(column_index, row_index);
                let kind = match symbol {
                    '#' => CellKind::Wall,
                    ' ' => CellKind::Open,
                    '.' => CellKind::Collectible,
                    'o' => CellKind::PowerCollectible,
                    '_' => CellKind::Empty,
                    'P' => {
                        if player_spawn.is_some() {
                            return Err(LevelError::DuplicatePlayerSpawn {
                                column: cell.column(),
                                row: cell.row(),
                            });
                        }
                        player_spawn = Some(cell);
                        CellKind::Open
                    }
                    'G' => {
                        adversary_cells.push(cell);
                        CellKind::Open
                    }
                    other => {
                        return Err(LevelError::UnknownSymbol {
                            symbol: other,
                            column: cell.column(),
                            row: cell.row(),
                        })
                    }
                };
                cells.push(kind);
            }
        }

        let _ = fit_u32(adversary_cells.len(), "adversary spawns")?;
        let grid = GridWorld::from_cells(columns, row_count, cells);
        validate_border(&grid)?;

        let player_spawn = player_spawn.ok_or(LevelError::MissingPlayerSpawn)?;
        if profiles.len() > adversary_cells.len() {
            return Err(LevelError::TooManyProfiles {
                profiles: profiles.len(),
                spawns: adversary_cells.len(),
            });
        }
        validate_collectibles(&grid, player_spawn)?;

        let adversaries = adversary_cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| AdversarySpawn {
                cell,
                profile: profiles.get(index).copied().unwrap_or_else(|| {
                    AdversaryProfile::new(DEFAULT_BEHAVIORS[index % DEFAULT_BEHAVIORS.len()])
                }),
            })
            .collect();

        Ok(Self {
            grid,
            player_spawn,
            adversaries,
        })
    }

    /// Pristine grid the level starts from.
    #[must_use]
    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn player_spawn(&self) -> CellCoord {
        self.player_spawn
    }

    /// Adversary spawns in reading order.
    #[must_use]
    pub fn adversaries(&self) -> &[AdversarySpawn] {
        &self.adversaries
    }
}

/// Tuning values that govern scoring, lives and timed effects.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rules {
    /// Lives granted at the start of a session.
    pub lives: u32,
    /// Score awarded for a regular collectible.
    pub collectible_score: u32,
    /// Score awarded for a power collectible.
    pub power_score: u32,
    /// Award for the first catch in a power window; doubles per further catch.
    pub catch_base_score: u32,
    /// Steps a power collectible keeps adversaries vulnerable.
    pub vulnerability_ticks: u32,
    /// Final steps of vulnerability during which adversaries blink.
    pub blink_ticks: u32,
    /// Steps between maze shifts; `None` keeps the maze static.
    pub shift_interval_ticks: Option<u32>,
    /// Maximum wall swaps performed per shift.
    pub shift_max_swaps: u32,
    /// Minimum Manhattan distance between shifted cells and any actor or spawn.
    pub shift_min_distance: u32,
    /// Seed for the shifting maze's random source.
    pub shift_seed: u64,
}

impl Rules {
    pub(crate) fn validate(&self) -> Result<(), LevelError> {
        if self.lives == 0 {
            return Err(LevelError::InvalidRules("lives must be positive"));
        }
        if self.vulnerability_ticks == 0 {
            return Err(LevelError::InvalidRules(
                "vulnerability must last at least one tick",
            ));
        }
        if self.shift_interval_ticks == Some(0) {
            return Err(LevelError::InvalidRules("shift interval must be positive"));
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            lives: 3,
            collectible_score: 10,
            power_score: 50,
            catch_base_score: 200,
            vulnerability_ticks: 480,
            blink_ticks: 120,
            shift_interval_ticks: None,
            shift_max_swaps: 4,
            shift_min_distance: 3,
            shift_seed: 0x5eed_c0de_2f0e_1b77,
        }
    }
}

fn layout_rows(layout: &str) -> Vec<&str> {
    let mut rows: Vec<&str> = layout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    while rows.first().is_some_and(|row| row.is_empty()) {
        let _ = rows.remove(0);
    }
    while rows.last().is_some_and(|row| row.is_empty()) {
        let _ = rows.pop();
    }
    rows
}

fn validate_border(grid: &GridWorld) -> Result<(), LevelError> {
    let columns = grid.columns();
    let rows = grid.rows();
    for (cell, kind) in grid.iter() {
        let on_horizontal_edge = cell.row() == 0 || cell.row() + 1 == rows;
        let on_vertical_edge = cell.column() == 0 || cell.column() + 1 == columns;
        if !kind.is_passable() {
            continue;
        }
        if on_horizontal_edge || (on_vertical_edge && !grid.is_tunnel_row(cell.row())) {
            return Err(LevelError::OpenBorder {
                column: cell.column(),
                row: cell.row(),
            });
        }
    }
    Ok(())
}

fn validate_collectibles(grid: &GridWorld, player_spawn: CellCoord) -> Result<(), LevelError> {
    if grid.remaining_collectibles() == 0 {
        return Err(LevelError::NoCollectibles);
    }
    let reachable = grid.reachable_from(player_spawn);
    for ((cell, kind), reached) in grid.iter().zip(reachable) {
        if kind.collectible().is_some() && !reached {
            return Err(LevelError::UnreachableCollectible {
                column: cell.column(),
                row: cell.row(),
            });
        }
    }
    Ok(())
}

fn fit_u32(found: usize, what: &'static str) -> Result<u32, LevelError> {
    u32::try_from(found).map_err(|_| LevelError::TooLarge { what, found })
}
