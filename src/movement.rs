//! Movement and collision engine.
//!
//! This module turns the held directional intents into a new heading and position for one tick and
//! checks the candidate position against the occupancy grid.
//!
//! # Coordinate system
//!
//! World units match grid cells one to one. Cell `n` is centred on the integer coordinate `n`, so
//! it covers `[n - 0.5, n + 0.5)` on its axis. `x` follows grid columns, `z` follows grid rows and
//! `y` is the constant eye height. A heading of `0°` looks towards decreasing `z` and increases
//! clockwise when seen from above, so `90°` looks towards increasing `x`.

use std::time::Duration;

use crate::{
    grid::{Cell, Grid},
    intent::{Intent, IntentSet},
};

/// Full turn in degrees.
const FULL_TURN: f32 = 360.0;

/// Per-tick movement quantities.
///
/// This structure holds how far the player may travel and turn during a single tick. It is usually
/// derived from a per-second [`MovementConfig`] with [`MovementConfig::per_tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Distance travelled along the heading per tick, in world units.
    pub speed: f32,
    /// Heading change per tick, in degrees.
    pub rotation_step: f32,
}

/// Per-second movement rates.
///
/// This structure keeps the core independent of the scheduler's cadence: the scheduler passes the
/// measured tick duration and the rates are scaled accordingly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementConfig {
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Turn rate in degrees per second.
    pub turn_rate: f32,
}

impl Default for MovementConfig {
    /// Rates giving `0.05` units and `3°` per tick at a 16 ms cadence.
    fn default() -> Self {
        Self {
            speed: 3.125,
            turn_rate: 187.5,
        }
    }
}

impl MovementConfig {
    /// Scales the per-second rates down to the quantities of a single tick of length `dt`.
    #[must_use]
    pub fn per_tick(&self, dt: Duration) -> Step {
        let seconds = dt.as_secs_f32();
        Step {
            speed: self.speed * seconds,
            rotation_step: self.turn_rate * seconds,
        }
    }
}

/// Result of one movement update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    /// Heading after rotation, in `[0, 360)`.
    pub heading: f32,
    /// Position after translation, `[x, y, z]`. Unchanged when the candidate was blocked.
    pub position: [f32; 3],
    /// Whether a translation was requested and rejected by the collision check.
    pub collided: bool,
}

/// Wraps a heading in degrees into `[0, 360)`.
#[must_use]
pub fn wrap_heading(heading: f32) -> f32 {
    let wrapped = heading.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= FULL_TURN {
        0.0
    } else {
        wrapped
    }
}

/// Returns the planar unit vector `(dx, dz)` the given heading looks along.
#[must_use]
pub fn forward_vector(heading: f32) -> (f32, f32) {
    let radians = heading.to_radians();
    (radians.sin(), -radians.cos())
}

/// Maps a continuous world coordinate to the index of the cell containing it.
///
/// The mapping rounds to the nearest integer, `floor(v + 0.5)`. Negative results and values that do
/// not fit are reported as [`None`].
#[must_use]
pub fn cell_index(value: f32) -> Option<usize> {
    let rounded = (value + 0.5).floor();
    if rounded.is_nan() || rounded < 0.0 {
        return None;
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "The value is a non-negative whole number and saturates on overflow."
    )]
    let index = rounded as usize;
    Some(index)
}

/// Checks whether a player standing at `(x, y, z)` would overlap a wall.
///
/// Positions whose cell falls outside the grid on either axis are always blocked. Movement is
/// planar, so `_y` does not take part in the check.
#[must_use]
pub fn is_blocked(grid: &Grid, x: f32, _y: f32, z: f32) -> bool {
    let (Some(col), Some(row)) = (cell_index(x), cell_index(z)) else {
        return true;
    };

    grid.get(col, row).map_or(true, |cell| cell == Cell::Wall)
}

/// Applies one tick of held intents to a heading and position.
///
/// Translation uses the heading from the start of the tick. Advance and retreat each add their own
/// displacement, so holding both cancels out. Turning left and right likewise each apply their own
/// rotation step. The translated candidate is validated as a whole: if it is blocked the position
/// stays exactly where it was, without sliding along the wall. Rotation is always kept.
#[must_use]
pub fn update(
    grid: &Grid,
    intents: &IntentSet,
    heading: f32,
    position: [f32; 3],
    step: Step,
) -> Outcome {
    let [x, y, z] = position;
    let (dx, dz) = forward_vector(heading);

    let mut candidate_x = x;
    let mut candidate_z = z;
    let advance = intents.is_active(Intent::Advance);
    let retreat = intents.is_active(Intent::Retreat);
    if advance {
        candidate_x += dx * step.speed;
        candidate_z += dz * step.speed;
    }
    if retreat {
        candidate_x -= dx * step.speed;
        candidate_z -= dz * step.speed;
    }

    let mut new_heading = heading;
    if intents.is_active(Intent::TurnLeft) {
        new_heading = wrap_heading(new_heading - step.rotation_step);
    }
    if intents.is_active(Intent::TurnRight) {
        new_heading = wrap_heading(new_heading + step.rotation_step);
    }

    let translating = advance || retreat;
    let collided = translating && is_blocked(grid, candidate_x, y, candidate_z);
    let position = if translating && !collided {
        [candidate_x, y, candidate_z]
    } else {
        position
    };

    Outcome {
        heading: new_heading,
        position,
        collided,
    }
}
