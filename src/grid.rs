//! Occupancy grid module.
//!
//! This module contains the [`Grid`] type, the square wall/floor occupancy map every other part of
//! the game reads from. The grid is written once by the [`generator`](crate::generator) and stays
//! read-only for the rest of a session.

use std::fmt;

/// State of a single grid cell.
///
/// This enumeration holds the only two states a cell can be in. Walls block movement and are drawn
/// as solid blocks, open cells are the floor the player walks on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Impassable wall cell.
    Wall,
    /// Passable floor cell.
    Open,
}

/// Square occupancy grid with a wall border ring.
///
/// This structure holds `(size + 2) × (size + 2)` cells addressed by `(col, row)`, where both
/// indices run over `0..=size + 1`. The outermost ring is always [`Cell::Wall`] and the playable
/// area is `1..=size` on both axes. Cells are stored row by row in a single vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Playable size of the maze, without the border ring.
    size: usize,
    /// Cell states in row-major order.
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of the given playable size with every cell set to [`Cell::Wall`].
    #[must_use]
    pub fn filled(size: usize) -> Self {
        let side = size + 2;
        Self {
            size,
            cells: vec![Cell::Wall; side * side],
        }
    }

    /// Returns the playable size of the grid, not counting the border ring.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the full `(width, height)` of the grid including the border ring.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.size + 2, self.size + 2)
    }

    /// Returns the entrance cell, which is always `(1, 1)`.
    #[must_use]
    pub const fn entrance(&self) -> (usize, usize) {
        (1, 1)
    }

    /// Returns the exit cell, which is always `(size, size)`.
    #[must_use]
    pub const fn exit(&self) -> (usize, usize) {
        (self.size, self.size)
    }

    /// Returns the state of the cell at `(col, row)`, or [`None`] when it lies outside the grid.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        self.index(col, row)
            .and_then(|idx| self.cells.get(idx).copied())
    }

    /// Returns the state of the cell at `(col, row)`.
    ///
    /// Coordinates outside the grid read as [`Cell::Wall`], so callers never need to bounds-check
    /// before asking whether something is passable.
    #[must_use]
    pub fn cell_state(&self, col: usize, row: usize) -> Cell {
        self.get(col, row).unwrap_or(Cell::Wall)
    }

    /// Returns whether the cell at `(col, row)` exists and is open.
    #[must_use]
    pub fn is_open(&self, col: usize, row: usize) -> bool {
        self.cell_state(col, row) == Cell::Open
    }

    /// Sets the state of the cell at `(col, row)`. Writes outside the grid are ignored.
    pub(crate) fn set(&mut self, col: usize, row: usize, cell: Cell) {
        if let Some(slot) = self
            .index(col, row)
            .and_then(|idx| self.cells.get_mut(idx))
        {
            *slot = cell;
        }
    }

    /// Returns the in-grid 4-directional neighbours of `(col, row)`.
    ///
    /// The order is north, east, south, west. Neighbours falling outside the grid are skipped.
    pub fn neighbours(&self, col: usize, row: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        [(0_isize, -1_isize), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(move |(dc, dr)| {
                let next_col = col.checked_add_signed(dc)?;
                let next_row = row.checked_add_signed(dr)?;
                self.index(next_col, next_row)
                    .map(|_| (next_col, next_row))
            })
    }

    /// Returns every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (width, _) = self.dimensions();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Open)
            .map(move |(idx, _)| (idx % width, idx / width))
    }

    /// Maps `(col, row)` to an index into the cell vector.
    fn index(&self, col: usize, row: usize) -> Option<usize> {
        let (width, height) = self.dimensions();
        (col < width && row < height).then_some(row * width + col)
    }
}

impl fmt::Display for Grid {
    /// Renders the grid as text, one line per row, with `#` for walls and a space for open cells.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        for row in 0..height {
            for col in 0..width {
                let symbol = match self.cell_state(col, row) {
                    Cell::Wall => '#',
                    Cell::Open => ' ',
                };
                write!(formatter, "{symbol}")?;
            }
            if row + 1 < height {
                writeln!(formatter)?;
            }
        }

        Ok(())
    }
}
