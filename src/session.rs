//! Game session state.
//!
//! This module contains the [`Session`] structure, the single world object the scheduler owns for
//! the lifetime of one maze run. It ties the generated [`Grid`], the [`Player`], the clock and the
//! display toggles together and advances them one tick at a time.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::{
    grid::Grid,
    intent::{Intent, IntentSet},
    movement::{self, MovementConfig},
};

/// Distance from the maze size beyond which both planar coordinates count as having reached the
/// goal.
const GOAL_MARGIN: f32 = 1.5;

/// Player pose in world coordinates.
///
/// Positions use one world unit per grid cell with cell centres on integer coordinates. The
/// heading is in degrees within `[0, 360)`; see [`movement`] for the axis conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    /// Position along the grid columns.
    pub x: f32,
    /// Eye height. Movement is planar, so this never changes.
    pub y: f32,
    /// Position along the grid rows.
    pub z: f32,
    /// Horizontal look angle in degrees.
    pub heading: f32,
    /// Fixed vertical look offset in degrees.
    pub pitch: f32,
}

impl Default for Player {
    /// Places the player at the corner of the entrance cell, facing north.
    fn default() -> Self {
        Self {
            x: 1.5,
            y: 0.5,
            z: 1.5,
            heading: 0.0,
            pitch: 0.0,
        }
    }
}

impl Player {
    /// Returns the position as `[x, y, z]`.
    #[must_use]
    pub const fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// State of one maze run.
///
/// The grid is read-only after construction. The player, the completion latch and the display
/// toggles are only ever changed by [`Session::tick`].
#[derive(Debug)]
pub struct Session {
    /// Occupancy grid of the maze being played.
    grid: Grid,
    /// Current player pose.
    player: Player,
    /// Per-second movement rates.
    movement: MovementConfig,
    /// Moment the session started.
    started_at: Instant,
    /// Elapsed time captured when the goal was reached. Set exactly once.
    finished_in: Option<Duration>,
    /// Whether the minimap should be drawn.
    minimap_visible: bool,
    /// Whether the completion overlay should be drawn. While shown, movement is suspended.
    overlay_visible: bool,
    /// Number of ticks processed so far.
    ticks: u64,
}

impl Session {
    /// Starts a session on the given grid with the player at the start pose and the clock running.
    #[must_use]
    pub fn new(grid: Grid, movement: MovementConfig) -> Self {
        Self {
            grid,
            player: Player::default(),
            movement,
            started_at: Instant::now(),
            finished_in: None,
            minimap_visible: true,
            overlay_visible: false,
            ticks: 0,
        }
    }

    /// Returns the maze grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the current player pose.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Returns whether the goal has been reached.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.finished_in.is_some()
    }

    /// Returns the duration captured when the goal was reached, if it has been.
    #[must_use]
    pub const fn final_duration(&self) -> Option<Duration> {
        self.finished_in
    }

    /// Returns the time shown on the clock: the final duration once complete, the running time
    /// otherwise.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.finished_in
            .unwrap_or_else(|| self.started_at.elapsed())
    }

    /// Returns whether the minimap should be drawn.
    #[must_use]
    pub const fn minimap_visible(&self) -> bool {
        self.minimap_visible
    }

    /// Returns whether the completion overlay should be drawn.
    #[must_use]
    pub const fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Returns the number of ticks processed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances the session by one tick of length `dt`.
    ///
    /// Pending one-shot commands are applied first. Movement then runs unless the completion
    /// overlay is up, and finally the goal condition is checked. Once the goal has been reached it
    /// is never evaluated again.
    pub fn tick(&mut self, intents: &mut IntentSet, dt: Duration) {
        self.ticks += 1;

        for command in intents.drain_commands() {
            match command {
                Intent::ToggleMinimap => {
                    self.minimap_visible = !self.minimap_visible;
                    debug!(visible = self.minimap_visible, "toggled minimap");
                }
                Intent::DismissOverlay if self.overlay_visible => {
                    self.overlay_visible = false;
                    debug!("dismissed completion overlay");
                }
                _ => {}
            }
        }

        if !self.overlay_visible {
            let outcome = movement::update(
                &self.grid,
                intents,
                self.player.heading,
                self.player.position(),
                self.movement.per_tick(dt),
            );
            self.player.heading = outcome.heading;
            [self.player.x, self.player.y, self.player.z] = outcome.position;
        }

        if !self.is_complete() && self.goal_reached() {
            let elapsed = self.started_at.elapsed();
            self.finished_in = Some(elapsed);
            self.overlay_visible = true;
            info!(
                seconds = elapsed.as_secs(),
                ticks = self.ticks,
                "maze completed in {}",
                format_clock(elapsed)
            );
        }
    }

    /// Returns whether the player stands in the goal area near the exit.
    fn goal_reached(&self) -> bool {
        #[expect(
            clippy::cast_precision_loss,
            reason = "Maze sizes are small enough to be represented exactly."
        )]
        let threshold = self.grid.size() as f32 - GOAL_MARGIN;
        self.player.x > threshold && self.player.z > threshold
    }
}

/// Formats a duration as `MM:SS`, truncating to whole seconds.
#[must_use]
pub fn format_clock(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
