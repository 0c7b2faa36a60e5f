//! First-person view rendering.
//!
//! This module contains a grid raycaster drawing the maze from the player's eyes into a terminal
//! buffer. Every terminal column casts one ray through the grid with a digital differential
//! analyser and draws a wall slice whose height falls off with the perpendicular distance to the
//! wall it hits. The start and goal cells carry coloured squares on the floor, projected with the
//! same camera and hidden by nearer walls.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::shade,
    widgets::Widget,
};

use crate::{
    grid::{Cell, Grid},
    movement,
    session::Player,
};

/// Horizontal field of view in degrees.
const FIELD_OF_VIEW: f32 = 60.0;

/// Ray direction component below which the ray counts as parallel to that axis.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Distance used in place of infinity for rays parallel to an axis.
const FAR_AWAY: f32 = 1e8;

/// Upper bound on grid cells a single ray may cross before giving up.
const MAX_RAY_STEPS: usize = 512;

/// Colour of wall faces crossing the x axis.
const WALL_X_COLOR: Color = Color::Rgb(128, 128, 179);

/// Colour of wall faces crossing the z axis.
const WALL_Z_COLOR: Color = Color::Rgb(96, 96, 140);

/// Background of the ceiling band.
const CEILING_COLOR: Color = Color::Rgb(51, 51, 51);

/// Background of the floor band.
const FLOOR_COLOR: Color = Color::Rgb(77, 77, 77);

/// Floor position `(x, z)` of the start marker.
const START_MARKER: (f32, f32) = (1.5, 1.5);

/// Colour of the start marker.
const START_MARKER_COLOR: Color = Color::Green;

/// Colour of the goal marker.
const GOAL_MARKER_COLOR: Color = Color::Red;

/// Side length of the square floor markers in world units.
const MARKER_SIZE: f32 = 0.3;

/// Depth below which a marker is too close to the eye to be projected.
const MARKER_NEAR_LIMIT: f32 = 0.05;

/// Axis of the grid line a ray crossed when it hit a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    /// The ray crossed a vertical grid line (constant x).
    X,
    /// The ray crossed a horizontal grid line (constant z).
    Z,
}

/// Wall hit reported by [`cast_ray`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hit {
    /// Distance to the wall measured along the view direction.
    pub(crate) distance: f32,
    /// Axis of the wall face that was hit.
    pub(crate) side: Side,
}

/// Returns whether the cell at signed `(col, row)` is a wall, counting anything outside as one.
fn is_wall(grid: &Grid, col: i64, row: i64) -> bool {
    match (usize::try_from(col), usize::try_from(row)) {
        (Ok(col), Ok(row)) => grid.cell_state(col, row) == Cell::Wall,
        _ => true,
    }
}

/// Converts a floored coordinate to a signed cell index.
fn floor_index(value: f32) -> i64 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Maze coordinates are tiny compared to the i64 range and the cast saturates."
    )]
    let index = value.floor() as i64;
    index
}

/// Converts a signed cell index back to a coordinate.
fn index_to_coord(index: i64) -> f32 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "Maze coordinates are small enough to be represented exactly."
    )]
    let coord = index as f32;
    coord
}

/// Casts a ray from `origin` along `direction` and reports the first wall it reaches.
///
/// Both arguments are `(x, z)` pairs in world units. Cells are centred on integer coordinates, so
/// the walk runs on coordinates shifted by half a cell. The cell containing the origin is never
/// reported. The returned distance is the length along `direction`, so passing
/// `forward + right * k` yields the perpendicular distance needed for a fish-eye free projection.
pub(crate) fn cast_ray(grid: &Grid, origin: (f32, f32), direction: (f32, f32)) -> Option<Hit> {
    let pos_x = origin.0 + 0.5;
    let pos_z = origin.1 + 0.5;
    let (dir_x, dir_z) = direction;

    let mut map_x = floor_index(pos_x);
    let mut map_z = floor_index(pos_z);

    let delta_x = if dir_x.abs() < PARALLEL_EPSILON {
        FAR_AWAY
    } else {
        dir_x.recip().abs()
    };
    let delta_z = if dir_z.abs() < PARALLEL_EPSILON {
        FAR_AWAY
    } else {
        dir_z.recip().abs()
    };

    let (step_x, mut side_x) = if dir_x < 0.0 {
        (-1, (pos_x - index_to_coord(map_x)) * delta_x)
    } else {
        (1, (index_to_coord(map_x) + 1.0 - pos_x) * delta_x)
    };
    let (step_z, mut side_z) = if dir_z < 0.0 {
        (-1, (pos_z - index_to_coord(map_z)) * delta_z)
    } else {
        (1, (index_to_coord(map_z) + 1.0 - pos_z) * delta_z)
    };

    for _ in 0..MAX_RAY_STEPS {
        let side = if side_x < side_z {
            side_x += delta_x;
            map_x += step_x;
            Side::X
        } else {
            side_z += delta_z;
            map_z += step_z;
            Side::Z
        };

        if is_wall(grid, map_x, map_z) {
            let distance = match side {
                Side::X => side_x - delta_x,
                Side::Z => side_z - delta_z,
            };
            return Some(Hit { distance, side });
        }
    }

    None
}

/// Picks the shade glyph for a wall slice at the given distance.
fn wall_shade(distance: f32) -> &'static str {
    if distance < 2.0 {
        shade::FULL
    } else if distance < 4.0 {
        shade::DARK
    } else if distance < 7.0 {
        shade::MEDIUM
    } else {
        shade::LIGHT
    }
}

/// First-person view of the maze from a player's pose.
pub(crate) struct FirstPersonView<'grid> {
    /// Maze being explored.
    grid: &'grid Grid,
    /// Pose the view is rendered from.
    player: &'grid Player,
}

impl<'grid> FirstPersonView<'grid> {
    /// Creates a view of `grid` seen by `player`.
    pub(crate) const fn new(grid: &'grid Grid, player: &'grid Player) -> Self {
        Self { grid, player }
    }
}

/// Camera basis shared by the wall and marker passes.
#[derive(Clone, Copy, Debug)]
struct Camera {
    /// Planar position of the eye, `(x, z)`.
    origin: (f32, f32),
    /// Unit view direction, `(x, z)`.
    forward: (f32, f32),
    /// Unit vector pointing to the right of the view direction, `(x, z)`.
    right: (f32, f32),
    /// Half-width of the camera plane at unit depth.
    plane: f32,
    /// Width of the view in terminal columns.
    width: f32,
    /// Rows spanned by a unit-height wall at unit depth.
    focal_rows: f32,
    /// Row coordinate of the eye level.
    horizon: f32,
}

impl Camera {
    /// Builds the camera for `player` rendering into `area`.
    fn new(player: &Player, area: Rect) -> Self {
        let forward = movement::forward_vector(player.heading);
        let plane = (FIELD_OF_VIEW / 2.0).to_radians().tan();
        let width = f32::from(area.width);

        Self {
            origin: (player.x, player.z),
            forward,
            right: (-forward.1, forward.0),
            plane,
            width,
            // Terminal cells are about twice as tall as they are wide.
            focal_rows: width / (4.0 * plane),
            horizon: f32::from(area.height) / 2.0,
        }
    }

    /// Returns the ray direction through the centre of `column`.
    fn ray(&self, column: u16) -> (f32, f32) {
        let offset = self.plane * (2.0 * (f32::from(column) + 0.5) / self.width - 1.0);
        (
            self.right.0.mul_add(offset, self.forward.0),
            self.right.1.mul_add(offset, self.forward.1),
        )
    }

    /// Projects a world point to `(depth, column)`, the column measured in fractional columns
    /// from the left edge of the view.
    fn project(&self, point: (f32, f32)) -> (f32, f32) {
        let relative = (point.0 - self.origin.0, point.1 - self.origin.1);
        let depth = relative.0.mul_add(self.forward.0, relative.1 * self.forward.1);
        let lateral = relative.0.mul_add(self.right.0, relative.1 * self.right.1);
        let camera = lateral / (depth * self.plane);
        (depth, (camera + 1.0) * self.width / 2.0)
    }

    /// Returns the row coordinate where the floor at `depth` meets the screen.
    fn floor_row(&self, depth: f32) -> f32 {
        self.horizon + self.focal_rows / (2.0 * depth)
    }
}

/// Returns the start and goal markers as floor centres `(x, z)` with their colours.
fn floor_markers(grid: &Grid) -> [((f32, f32), Color); 2] {
    #[expect(
        clippy::cast_precision_loss,
        reason = "Maze sizes are small enough to be represented exactly."
    )]
    let goal = grid.size() as f32 - 0.5;
    [
        (START_MARKER, START_MARKER_COLOR),
        ((goal, goal), GOAL_MARKER_COLOR),
    ]
}

/// Returns the terminal cells covered by the fractional span `[low, high]`, clipped to `limit`.
fn screen_span(low: f32, high: f32, limit: u16) -> Option<(u16, u16)> {
    let first = floor_index(low).max(0);
    let last = floor_index(high).min(i64::from(limit) - 1);
    if first > last {
        return None;
    }
    Some((u16::try_from(first).ok()?, u16::try_from(last).ok()?))
}

impl FirstPersonView<'_> {
    /// Draws the ceiling, wall slice and floor of every column, returning each column's wall
    /// distance.
    fn render_walls(&self, camera: &Camera, area: Rect, buf: &mut Buffer) -> Vec<f32> {
        let mut depths = Vec::with_capacity(area.width.into());

        for column in 0..area.width {
            let hit = cast_ray(self.grid, camera.origin, camera.ray(column));
            depths.push(hit.map_or(f32::INFINITY, |hit| hit.distance));

            let (top, bottom) = hit.map_or((camera.horizon, camera.horizon), |hit| {
                let half = camera.focal_rows / hit.distance.max(PARALLEL_EPSILON) / 2.0;
                (camera.horizon - half, camera.horizon + half)
            });

            for line in 0..area.height {
                let centre = f32::from(line) + 0.5;
                let Some(cell) = buf.cell_mut((area.x + column, area.y + line)) else {
                    continue;
                };

                if centre < top {
                    let _ = cell
                        .set_symbol(" ")
                        .set_style(Style::default().bg(CEILING_COLOR));
                } else if centre < bottom {
                    let (glyph, color) = hit.map_or((" ", WALL_X_COLOR), |hit| {
                        let color = match hit.side {
                            Side::X => WALL_X_COLOR,
                            Side::Z => WALL_Z_COLOR,
                        };
                        (wall_shade(hit.distance), color)
                    });
                    let _ = cell
                        .set_symbol(glyph)
                        .set_style(Style::default().fg(color).bg(Color::Black));
                } else {
                    let _ = cell
                        .set_symbol(" ")
                        .set_style(Style::default().bg(FLOOR_COLOR));
                }
            }
        }

        depths
    }

    /// Draws the start and goal markers as flat squares on the floor.
    ///
    /// A marker column is only drawn when the marker is nearer than the wall in that column, so
    /// walls hide markers behind them.
    fn render_markers(&self, camera: &Camera, area: Rect, buf: &mut Buffer, depths: &[f32]) {
        let half = MARKER_SIZE / 2.0;

        for (centre, color) in floor_markers(self.grid) {
            let (depth, middle) = camera.project(centre);
            if depth - half <= MARKER_NEAR_LIMIT {
                continue;
            }

            let spread = half / (depth * camera.plane) * camera.width / 2.0;
            let Some((first_column, last_column)) =
                screen_span(middle - spread, middle + spread, area.width)
            else {
                continue;
            };
            let Some((first_line, last_line)) = screen_span(
                camera.floor_row(depth + half),
                camera.floor_row(depth - half),
                area.height,
            ) else {
                continue;
            };

            for column in first_column..=last_column {
                let visible = depths
                    .get(usize::from(column))
                    .is_some_and(|wall| depth < *wall);
                if !visible {
                    continue;
                }

                for line in first_line..=last_line {
                    if let Some(cell) = buf.cell_mut((area.x + column, area.y + line)) {
                        let _ = cell
                            .set_symbol(shade::FULL)
                            .set_style(Style::default().fg(color).bg(FLOOR_COLOR));
                    }
                }
            }
        }
    }
}

impl Widget for FirstPersonView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let camera = Camera::new(self.player, area);
        let depths = self.render_walls(&camera, area, buf);
        self.render_markers(&camera, area, buf, &depths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    /// Tolerance used for float comparisons.
    const EPSILON: f32 = 1e-4;

    /// Builds a grid of the given size with every interior cell open.
    fn open_field(size: usize) -> Grid {
        let mut grid = Grid::filled(size);
        for col in 1..=size {
            for row in 1..=size {
                grid.set(col, row, Cell::Open);
            }
        }
        grid
    }

    #[test]
    fn test_ray_hits_border_straight_ahead() {
        let grid = open_field(5);

        // Facing north from the centre of cell (3, 3), the border row 0 starts at z = 0.5.
        let hit = cast_ray(&grid, (3.0, 3.0), (0.0, -1.0)).expect("border should be hit");
        assert_eq!(hit.side, Side::Z);
        assert!((hit.distance - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_ray_hits_inner_wall_on_x_side() {
        let mut grid = open_field(5);
        grid.set(5, 3, Cell::Wall);

        let hit = cast_ray(&grid, (3.0, 3.0), (1.0, 0.0)).expect("wall should be hit");
        assert_eq!(hit.side, Side::X);
        assert!((hit.distance - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_ray_ignores_the_origin_cell() {
        let mut grid = open_field(3);
        grid.set(2, 2, Cell::Wall);

        // (1.5, 1.5) rounds into the walled cell (2, 2); the ray still reaches the border.
        let hit = cast_ray(&grid, (1.5, 1.5), (-1.0, 0.0)).expect("border should be hit");
        assert_eq!(hit.side, Side::X);
        assert!((hit.distance - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_ray_reaches_far_border_row() {
        let grid = open_field(2);

        let hit = cast_ray(&grid, (1.0, 1.0), (0.0, 1.0)).expect("border should be hit");
        assert_eq!(hit.side, Side::Z);
        assert!((hit.distance - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_wall_shade_darkens_with_distance() {
        assert_eq!(wall_shade(1.0), shade::FULL);
        assert_eq!(wall_shade(3.0), shade::DARK);
        assert_eq!(wall_shade(5.0), shade::MEDIUM);
        assert_eq!(wall_shade(9.0), shade::LIGHT);
    }

    #[test]
    fn test_render_draws_wall_in_the_middle() {
        let grid = open_field(5);
        let player = Player {
            x: 3.0,
            z: 3.0,
            ..Player::default()
        };
        let mut terminal =
            Terminal::new(TestBackend::new(40, 20)).expect("failed to create test terminal");

        let result = terminal.draw(|frame| {
            frame.render_widget(FirstPersonView::new(&grid, &player), frame.area());
        });
        assert!(result.is_ok(), "rendering the view should succeed");

        let buffer = terminal.backend().buffer();
        let middle = buffer.cell((20, 10)).expect("middle cell should exist");
        assert_ne!(middle.symbol(), " ", "a wall slice should cover the horizon");
        let top = buffer.cell((20, 0)).expect("top cell should exist");
        assert_eq!(top.bg, CEILING_COLOR);
        let bottom = buffer.cell((20, 19)).expect("bottom cell should exist");
        assert_eq!(bottom.bg, FLOOR_COLOR);
    }

    /// Renders `grid` from a player at `(2.0, 4.5)` looking east at the goal square.
    fn render_towards_goal(grid: &Grid) -> Buffer {
        let player = Player {
            x: 2.0,
            z: 4.5,
            heading: 90.0,
            ..Player::default()
        };
        let mut terminal =
            Terminal::new(TestBackend::new(40, 20)).expect("failed to create test terminal");

        let result = terminal.draw(|frame| {
            frame.render_widget(FirstPersonView::new(grid, &player), frame.area());
        });
        assert!(result.is_ok(), "rendering the view should succeed");

        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_render_draws_goal_marker_on_the_floor() {
        let grid = open_field(5);

        let buffer = render_towards_goal(&grid);

        // The goal square sits 2.5 ahead, which lands just below the horizon in the middle.
        let marker = buffer.cell((20, 13)).expect("marker cell should exist");
        assert_eq!(marker.fg, GOAL_MARKER_COLOR);
        assert_eq!(marker.symbol(), shade::FULL);
        let floor = buffer.cell((20, 19)).expect("floor cell should exist");
        assert_ne!(floor.fg, GOAL_MARKER_COLOR);
    }

    #[test]
    fn test_render_hides_marker_behind_walls() {
        let mut grid = open_field(5);
        grid.set(4, 4, Cell::Wall);
        grid.set(4, 5, Cell::Wall);

        let buffer = render_towards_goal(&grid);

        assert!(
            buffer.content().iter().all(|cell| cell.fg != GOAL_MARKER_COLOR),
            "the wall between the player and the goal should hide its marker"
        );
    }

    #[test]
    fn test_floor_markers_sit_on_start_and_goal_cells() {
        let grid = open_field(4);

        let [(start, start_color), (goal, goal_color)] = floor_markers(&grid);

        assert_eq!(start_color, START_MARKER_COLOR);
        assert_eq!(goal_color, GOAL_MARKER_COLOR);
        assert!((start.0 - 1.5).abs() < EPSILON && (start.1 - 1.5).abs() < EPSILON);
        assert!((goal.0 - 3.5).abs() < EPSILON && (goal.1 - 3.5).abs() < EPSILON);
    }

    #[test]
    fn test_render_empty_area_is_a_no_op() {
        let grid = open_field(3);
        let player = Player::default();
        let mut buffer = Buffer::empty(Rect::new(0, 0, 0, 0));

        FirstPersonView::new(&grid, &player).render(Rect::new(0, 0, 0, 0), &mut buffer);

        assert_eq!(buffer.area.area(), 0);
    }
}
