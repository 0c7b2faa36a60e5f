//! Maze generation module.
//!
//! This module carves mazes with a randomized depth-first search (recursive backtracker) on the
//! odd-coordinate lattice of a [`Grid`], then braids the result by knocking out some of the
//! remaining interior walls. The carving phase yields a perfect maze; the braid phase adds loops
//! without ever opening a cell that is not attached to at least two open cells already.

use rand::{rngs::StdRng, seq::SliceRandom as _, thread_rng, Rng, SeedableRng as _};
use tracing::debug;

use crate::{
    grid::{Cell, Grid},
    pathfinding,
};

/// Probability with which the braid pass tries to knock out an interior wall.
pub const BRAID_CHANCE: f64 = 0.3;

/// Minimum number of open neighbours a wall needs before the braid pass may open it.
const BRAID_MIN_OPEN_NEIGHBOURS: usize = 2;

/// Lattice steps towards the north, east, south and west neighbouring rooms.
const DIRECTIONS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Generates a braided maze of the given size using the thread-local random source.
///
/// See [`generate_with`] for the guarantees of the returned grid.
#[must_use]
pub fn generate(size: usize) -> Grid {
    generate_with(size, &mut thread_rng())
}

/// Generates a braided maze of the given size drawing randomness from `rng`.
///
/// The returned grid is `(size + 2) × (size + 2)` with a solid wall border. The entrance `(1, 1)`
/// and the exit `(size, size)` are always open and every open cell is reachable from the entrance.
/// Passing a seeded generator makes the result reproducible.
#[must_use]
pub fn generate_with<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Grid {
    let mut grid = carve(size, rng);
    open_endpoints(&mut grid, rng);
    let braided = braid(&mut grid, rng, BRAID_CHANCE);

    debug!(
        size,
        open_cells = grid.open_cells().count(),
        reachable = pathfinding::reachable_from(&grid, grid.entrance()).len(),
        braided,
        "generated maze"
    );

    grid
}

/// Generates a braided maze of the given size, reproducibly when a seed is given.
///
/// A seeded run draws from a [`StdRng`] seeded with `seed`, so the same seed and size always yield
/// the same grid. Without a seed this is [`generate`].
#[must_use]
pub fn generate_seeded(size: usize, seed: Option<u64>) -> Grid {
    match seed {
        Some(seed) => generate_with(size, &mut StdRng::seed_from_u64(seed)),
        None => generate(size),
    }
}

/// Carves a perfect maze with an explicit-stack recursive backtracker.
///
/// Rooms are the odd-coordinate cells within `1..=size`. Starting at `(1, 1)`, the top-of-stack
/// room looks at the rooms two cells away in each direction; one still-walled candidate is picked
/// at random and both it and the wall between are opened. Rooms without candidates are popped.
fn carve<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Grid {
    let mut grid = Grid::filled(size);
    if size == 0 {
        return grid;
    }

    grid.set(1, 1, Cell::Open);
    let mut stack = vec![(1_usize, 1_usize)];

    while let Some(&(col, row)) = stack.last() {
        let candidates: Vec<((usize, usize), (usize, usize))> = DIRECTIONS
            .iter()
            .filter_map(|&(dc, dr)| {
                let room = (
                    col.checked_add_signed(2 * dc)?,
                    row.checked_add_signed(2 * dr)?,
                );
                let between = (col.checked_add_signed(dc)?, row.checked_add_signed(dr)?);
                let inside = (1..=size).contains(&room.0) && (1..=size).contains(&room.1);
                (inside && grid.cell_state(room.0, room.1) == Cell::Wall)
                    .then_some((between, room))
            })
            .collect();

        match candidates.choose(rng) {
            Some(&(between, room)) => {
                grid.set(between.0, between.1, Cell::Open);
                grid.set(room.0, room.1, Cell::Open);
                stack.push(room);
            }
            None => {
                let _ = stack.pop();
            }
        }
    }

    grid
}

/// Forces the entrance and exit open and makes sure the exit is attached to the maze.
///
/// For even sizes the exit is not a lattice room, so the carving phase never reaches it. In that
/// case one of its two interior neighbours next to the room `(size - 1, size - 1)` is opened as
/// well, picked at random.
fn open_endpoints<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let size = grid.size();
    if size == 0 {
        return;
    }

    let entrance = grid.entrance();
    let exit = grid.exit();
    grid.set(entrance.0, entrance.1, Cell::Open);
    grid.set(exit.0, exit.1, Cell::Open);

    let attached = grid
        .neighbours(exit.0, exit.1)
        .any(|(col, row)| grid.is_open(col, row));
    if attached || size < 2 {
        return;
    }

    let links = [(size - 1, size), (size, size - 1)];
    if let Some(&(col, row)) = links.choose(rng) {
        grid.set(col, row, Cell::Open);
    }
}

/// Opens some interior walls to add loops, returning how many were opened.
///
/// Every wall `(i, j)` with `2 <= i, j <= size - 1` is considered once, in column-major order. With
/// probability `chance` it is opened, but only if at least two of its in-range neighbours are open
/// at that moment. A newly opened cell always touches open cells, so connectivity is preserved.
fn braid<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R, chance: f64) -> usize {
    let size = grid.size();
    let mut opened = 0;

    for col in 2..size {
        for row in 2..size {
            if grid.cell_state(col, row) != Cell::Wall || !rng.gen_bool(chance) {
                continue;
            }

            let open_neighbours = grid
                .neighbours(col, row)
                .filter(|&(next_col, next_row)| {
                    (1..=size).contains(&next_col)
                        && (1..=size).contains(&next_row)
                        && grid.is_open(next_col, next_row)
                })
                .count();

            if open_neighbours >= BRAID_MIN_OPEN_NEIGHBOURS {
                grid.set(col, row, Cell::Open);
                opened += 1;
            }
        }
    }

    opened
}
