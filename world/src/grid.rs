//! Static maze layout and the collectibles scattered across it.

use std::collections::VecDeque;

use maze_chase_core::{CellCoord, CellKind, CollectibleKind, Direction};
use rand::Rng;

/// Dense grid of cell kinds that owns the live collectible set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    remaining: usize,
}

impl GridWorld {
    /// Builds a grid from row-major cells. Callers guarantee `cells.len() == columns * rows`.
    pub(crate) fn from_cells(columns: u32, rows: u32, cells: Vec<CellKind>) -> Self {
        debug_assert_eq!(
            cells.len() as u64,
            u64::from(columns) * u64::from(rows),
            "cell buffer must match grid dimensions"
        );
        let remaining = cells
            .iter()
            .filter(|kind| kind.collectible().is_some())
            .count();
        Self {
            columns,
            rows,
            cells,
            remaining,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Kind of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn cell_kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Reports whether an actor may rest on the provided cell.
    ///
    /// Out-of-bounds cells are never passable; wraparound is applied by
    /// [`GridWorld::neighbor`] before this check is made.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.cell_kind(cell).is_some_and(CellKind::is_passable)
    }

    /// Reports whether the row is a horizontal tunnel that wraps at both edges.
    #[must_use]
    pub fn is_tunnel_row(&self, row: u32) -> bool {
        if self.columns == 0 || row >= self.rows {
            return false;
        }
        let first = CellCoord::new(0, row);
        let last = CellCoord::new(self.columns - 1, row);
        self.is_passable(first) && self.is_passable(last)
    }

    /// Applies horizontal tunnel wraparound to a signed position.
    ///
    /// Columns outside the grid are folded back in only on tunnel rows; every
    /// other position is returned unchanged.
    #[must_use]
    pub fn wrap(&self, column: i64, row: i64) -> (i64, i64) {
        let width = i64::from(self.columns);
        if width == 0 || (0..width).contains(&column) {
            return (column, row);
        }
        match u32::try_from(row) {
            Ok(row_index) if self.is_tunnel_row(row_index) => (column.rem_euclid(width), row),
            _ => (column, row),
        }
    }

    /// Cell reached by stepping once in `direction`, after wraparound.
    ///
    /// Returns `None` when the step leaves the grid. Passability is not checked.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let (column, row) = self.wrap(i64::from(cell.column()) + dx, i64::from(cell.row()) + dy);
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        if column < self.columns && row < self.rows {
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }

    /// Cell reached by stepping once in `direction` when that cell is passable.
    #[must_use]
    pub fn passable_neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        self.neighbor(cell, direction)
            .filter(|target| self.is_passable(*target))
    }

    /// Consumes the collectible stored at `cell`, returning its kind.
    ///
    /// Each collectible is returned exactly once; the cell becomes
    /// [`CellKind::Empty`] afterwards.
    pub fn collect_at(&mut self, cell: CellCoord) -> Option<CollectibleKind> {
        let index = self.index(cell)?;
        let kind = self.cells[index].collectible()?;
        self.cells[index] = CellKind::Empty;
        self.remaining -= 1;
        Some(kind)
    }

    /// Number of collectibles still present in the maze.
    #[must_use]
    pub const fn remaining_collectibles(&self) -> usize {
        self.remaining
    }

    /// Iterator over every cell and its kind in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    /// Flood-fills the passable region reachable from `start`, tunnels included.
    ///
    /// The returned buffer is indexed in row-major order.
    #[must_use]
    pub fn reachable_from(&self, start: CellCoord) -> Vec<bool> {
        let mut visited = vec![false; self.cells.len()];
        let Some(start_index) = self.index(start) else {
            return visited;
        };
        if !self.cells[start_index].is_passable() {
            return visited;
        }

        let mut frontier = VecDeque::new();
        visited[start_index] = true;
        frontier.push_back(start);
        while let Some(cell) = frontier.pop_front() {
            for direction in Direction::ALL {
                let Some(next) = self.passable_neighbor(cell, direction) else {
                    continue;
                };
                let Some(index) = self.index(next) else {
                    continue;
                };
                if !visited[index] {
                    visited[index] = true;
                    frontier.push_back(next);
                }
            }
        }
        visited
    }

    /// Reports whether every listed cell and every remaining collectible is
    /// reachable from `start`.
    #[must_use]
    pub fn is_connected(&self, start: CellCoord, required: &[CellCoord]) -> bool {
        let reachable = self.reachable_from(start);
        let collectibles_reachable = self
            .cells
            .iter()
            .zip(reachable.iter())
            .all(|(kind, reached)| kind.collectible().is_none() || *reached);
        collectibles_reachable
            && required
                .iter()
                .all(|cell| self.index(*cell).is_some_and(|index| reachable[index]))
    }

    /// Swaps up to `max_swaps` interior wall cells with interior passable cells.
    ///
    /// Candidate cells keep at least `min_distance` (and never less than one)
    /// from every cell in `avoid`. A swap is kept only when `anchor` still
    /// reaches every remaining collectible and every cell in `avoid`.
    /// Returns the number of committed swaps.
    pub(crate) fn shift<R>(
        &mut self,
        rng: &mut R,
        anchor: CellCoord,
        avoid: &[CellCoord],
        max_swaps: u32,
        min_distance: u32,
    ) -> u32
    where
        R: Rng + ?Sized,
    {
        let min_distance = min_distance.max(1);
        let mut walls = Vec::new();
        let mut floors = Vec::new();
        for (cell, kind) in self.iter() {
            if !self.is_interior(cell) {
                continue;
            }
            if avoid
                .iter()
                .any(|actor| actor.manhattan_distance(cell) < min_distance)
            {
                continue;
            }
            if kind.is_passable() {
                floors.push(cell);
            } else {
                walls.push(cell);
            }
        }

        let mut swaps = 0;
        let attempts = max_swaps.saturating_mul(4);
        for _ in 0..attempts {
            if swaps >= max_swaps || walls.is_empty() || floors.is_empty() {
                break;
            }
            let wall_slot = rng.gen_range(0..walls.len());
            let floor_slot = rng.gen_range(0..floors.len());
            let (Some(wall_index), Some(floor_index)) =
                (self.index(walls[wall_slot]), self.index(floors[floor_slot]))
            else {
                continue;
            };

            self.cells.swap(wall_index, floor_index);
            if self.is_connected(anchor, avoid) {
                let wall = walls[wall_slot];
                walls[wall_slot] = floors[floor_slot];
                floors[floor_slot] = wall;
                swaps += 1;
            } else {
                self.cells.swap(wall_index, floor_index);
            }
        }
        swaps
    }

    fn is_interior(&self, cell: CellCoord) -> bool {
        cell.column() > 0
            && cell.row() > 0
            && cell.column() + 1 < self.columns
            && cell.row() + 1 < self.rows
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid(rows: &[&str]) -> GridWorld {
        let columns = rows[0].len() as u32;
        let cells = rows
            .iter()
            .flat_map(|row| {
                row.chars().map(|symbol| match symbol {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Collectible,
                    'o' => CellKind::PowerCollectible,
                    '_' => CellKind::Empty,
                    _ => CellKind::Open,
                })
            })
            .collect();
        GridWorld::from_cells(columns, rows.len() as u32, cells)
    }

    #[test]
    fn passability_matches_cell_kinds() {
        let grid = grid(&["#####", "#.o_#", "#   #", "#####"]);
        for (cell, kind) in grid.iter() {
            assert_eq!(grid.is_passable(cell), kind != CellKind::Wall, "{cell:?}");
        }
        assert!(!grid.is_passable(CellCoord::new(5, 1)));
        assert!(!grid.is_passable(CellCoord::new(1, 4)));
    }

    #[test]
    fn tunnel_rows_wrap_horizontally() {
        let grid = grid(&["#####", ".   .", "#####"]);
        assert!(grid.is_tunnel_row(1));
        assert!(!grid.is_tunnel_row(0));
        assert_eq!(grid.wrap(-1, 1), (4, 1));
        assert_eq!(grid.wrap(5, 1), (0, 1));
        assert_eq!(grid.wrap(-1, 0), (-1, 0));
        assert_eq!(grid.wrap(2, 1), (2, 1));
        assert_eq!(
            grid.neighbor(CellCoord::new(0, 1), Direction::Left),
            Some(CellCoord::new(4, 1))
        );
        assert_eq!(
            grid.passable_neighbor(CellCoord::new(4, 1), Direction::Right),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn neighbor_outside_grid_is_none() {
        let grid = grid(&["###", "# #", "###"]);
        assert_eq!(grid.neighbor(CellCoord::new(0, 0), Direction::Up), None);
        assert_eq!(grid.neighbor(CellCoord::new(0, 0), Direction::Left), None);
        assert_eq!(
            grid.passable_neighbor(CellCoord::new(1, 1), Direction::Up),
            None
        );
    }

    #[test]
    fn collectibles_are_consumed_once() {
        let mut grid = grid(&["#####", "#.o #", "#####"]);
        assert_eq!(grid.remaining_collectibles(), 2);

        let cell = CellCoord::new(1, 1);
        assert_eq!(grid.collect_at(cell), Some(CollectibleKind::Regular));
        assert_eq!(grid.collect_at(cell), None);
        assert_eq!(grid.cell_kind(cell), Some(CellKind::Empty));
        assert_eq!(grid.remaining_collectibles(), 1);

        assert_eq!(
            grid.collect_at(CellCoord::new(2, 1)),
            Some(CollectibleKind::Power)
        );
        assert_eq!(grid.collect_at(CellCoord::new(3, 1)), None);
        assert_eq!(grid.collect_at(CellCoord::new(0, 0)), None);
        assert_eq!(grid.collect_at(CellCoord::new(9, 9)), None);
        assert_eq!(grid.remaining_collectibles(), 0);
    }

    #[test]
    fn reachability_stops_at_walls() {
        let grid = grid(&["#####", "#.#.#", "#####"]);
        let reachable = grid.reachable_from(CellCoord::new(1, 1));
        assert!(reachable[grid.index(CellCoord::new(1, 1)).unwrap()]);
        assert!(!reachable[grid.index(CellCoord::new(3, 1)).unwrap()]);
        assert!(!grid.is_connected(CellCoord::new(1, 1), &[]));
    }

    #[test]
    fn shift_preserves_connectivity_and_collectibles() {
        let mut grid = grid(&[
            "#########",
            "#.......#",
            "#.##.##.#",
            "#.......#",
            "#.##.##.#",
            "#.......#",
            "#########",
        ]);
        let before = grid.remaining_collectibles();
        let anchor = CellCoord::new(1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..10 {
            let _ = grid.shift(&mut rng, anchor, &[anchor], 3, 2);
            assert!(grid.is_connected(anchor, &[anchor]));
            assert_eq!(grid.remaining_collectibles(), before);
            assert_eq!(grid.cell_kind(anchor), Some(CellKind::Collectible));
        }
    }

    #[test]
    fn shift_never_touches_the_border() {
        let mut grid = grid(&["#######", "#.....#", "#.#.#.#", "#.....#", "#######"]);
        let border_before: Vec<_> = grid
            .iter()
            .filter(|(cell, _)| !grid.is_interior(*cell))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let _ = grid.shift(&mut rng, CellCoord::new(1, 1), &[], 5, 0);
        let border_after: Vec<_> = grid
            .iter()
            .filter(|(cell, _)| !grid.is_interior(*cell))
            .collect();
        assert_eq!(border_before, border_after);
    }
}
