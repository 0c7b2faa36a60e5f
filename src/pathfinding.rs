//! Reachability and shortest-path queries over the occupancy grid.
//!
//! This module contains the breadth-first searches used to reason about maze connectivity. The
//! generator uses them for its diagnostics, and the test suite uses them both to check the
//! connectivity guarantees and to steer a player through a generated maze.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::grid::Grid;

/// Collects every open cell reachable from `start` through 4-directional open adjacency.
///
/// This function performs a breadth-first flood fill. The start cell itself is included when it is
/// open; a closed or out-of-range start yields an empty set.
#[must_use]
pub fn reachable_from(grid: &Grid, start: (usize, usize)) -> HashSet<(usize, usize)> {
    let mut seen = HashSet::new();
    if !grid.is_open(start.0, start.1) {
        return seen;
    }

    let mut queue = VecDeque::from([start]);
    let _ = seen.insert(start);

    while let Some((col, row)) = queue.pop_front() {
        for next in grid.neighbours(col, row) {
            if grid.is_open(next.0, next.1) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen
}

/// Finds a shortest path of open cells between `from` and `to`.
///
/// This function runs a breadth-first search and rebuilds the path from the predecessor map once
/// the target is dequeued. The returned path includes both end cells. [`None`] is returned when
/// either end is closed or when no path exists.
#[must_use]
pub fn shortest_path(
    grid: &Grid,
    from: (usize, usize),
    to: (usize, usize),
) -> Option<Vec<(usize, usize)>> {
    if !grid.is_open(from.0, from.1) || !grid.is_open(to.0, to.1) {
        return None;
    }

    let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    let mut seen = HashSet::from([from]);

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![current];
            let mut cursor = current;
            while let Some(&previous) = came_from.get(&cursor) {
                path.push(previous);
                cursor = previous;
            }
            path.reverse();
            return Some(path);
        }

        for next in grid.neighbours(current.0, current.1) {
            if grid.is_open(next.0, next.1) && seen.insert(next) {
                let _ = came_from.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}
